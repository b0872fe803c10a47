use crate::error::CliResult;
use climscen_connection::Connection;
use comfy_table::{ContentArrangement, Table};

pub async fn run(conn: &Connection, long: bool) -> CliResult<()> {
    let projects = conn.list_projects().await?;
    if projects.is_empty() {
        println!("No projects found under the data root.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    if !long {
        table.set_header(vec!["PROJECT"]);
        for name in &projects {
            table.add_row(vec![name.clone()]);
        }
        println!("{table}");
        return Ok(());
    }

    table.set_header(vec!["PROJECT", "FILES", "REFERENCE", "DESCRIPTION"]);
    let session = conn.session();
    for name in &projects {
        match session.project(name).await {
            Ok(snapshot) => {
                let (start, end) = snapshot.reference_period();
                table.add_row(vec![
                    name.clone(),
                    snapshot.index().len().to_string(),
                    format!("{}-{}", start, end),
                    snapshot.settings().description.clone().unwrap_or_default(),
                ]);
            }
            Err(e) => {
                tracing::warn!(project = %name, error = %e, "project could not be loaded");
                table.add_row(vec![name.clone(), "-".into(), "-".into(), e.to_string()]);
            }
        }
    }
    println!("{table}");
    Ok(())
}
