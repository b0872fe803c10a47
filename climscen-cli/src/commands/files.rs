use crate::context;
use crate::error::CliResult;
use climscen_connection::Connection;
use comfy_table::{ContentArrangement, Table};

pub async fn run(conn: &Connection, project: &str, pattern: &str) -> CliResult<()> {
    let snapshot = context::project(conn, project).await?;
    let paths = snapshot.index().files_matching(pattern)?;
    if paths.is_empty() {
        println!("No files in '{}' match '{}'.", project, pattern);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["PATH", "BACKEND REF"]);
    for path in &paths {
        let reference = snapshot.index().backend_ref(path).unwrap_or("-");
        table.add_row(vec![path.as_str(), reference]);
    }
    println!("{table}");
    println!("{} file(s)", paths.len());
    Ok(())
}
