use crate::context;
use crate::error::CliResult;
use crate::selection::Selection;
use climscen_catalog::ArtifactLoader;
use climscen_connection::Connection;
use colored::Colorize;

/// Build the artifact path from the raw selections; no catalog resolution
/// happens, so any combination the grammar accepts can be inspected.
pub async fn run(conn: &Connection, project: &str, selection: &Selection) -> CliResult<()> {
    let snapshot = context::project(conn, project).await?;
    let ctx = selection.context(project)?;
    let loader = ArtifactLoader::new(snapshot);

    let path = loader.artifact_path(&ctx)?;
    println!("{path}");
    match loader.backend_ref(&ctx)? {
        Some(reference) => println!("{reference}"),
        None => eprintln!(
            "{} no such artifact in project '{}'",
            "warning:".yellow().bold(),
            project
        ),
    }
    Ok(())
}
