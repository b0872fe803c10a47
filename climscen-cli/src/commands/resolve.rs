use crate::context;
use crate::error::CliResult;
use crate::selection::Selection;
use climscen_catalog::{Context, Dim, ScenarioCatalog};
use climscen_connection::Connection;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

pub async fn run(
    conn: &Connection,
    project: &str,
    selection: &Selection,
    json: bool,
) -> CliResult<()> {
    let snapshot = context::project(conn, project).await?;
    let catalog = ScenarioCatalog::new(snapshot);

    let mut ctx = selection.context(project)?;
    catalog.refresh(&mut ctx).await?;

    for (dim, requested) in selection.pairs() {
        if ctx.selected_code(dim).is_none() {
            eprintln!(
                "{} {} '{}' is not available for the current selection",
                "warning:".yellow().bold(),
                dim,
                requested
            );
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&ctx)?);
    } else {
        print_table(&ctx);
    }
    Ok(())
}

fn print_table(ctx: &Context) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["DIMENSION", "SELECTED", "LEGAL VALUES"]);
    for dim in Dim::ALL {
        let selected = ctx.selected_code(dim).unwrap_or("");
        let values = ctx
            .catalog_entries(dim)
            .unwrap_or_default()
            .into_iter()
            .map(|(code, _)| {
                if code == selected {
                    format!("*{}", code)
                } else {
                    code.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        table.add_row(vec![dim.name().to_string(), selected.to_string(), values]);
    }
    println!("{table}");
}
