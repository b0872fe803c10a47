//! Cascading resolution over an in-memory project tree.

use climscen_catalog::{
    ArtifactLoader, CatalogError, Context, Dim, RcpDim, ScenarioCatalog, StatDim,
};
use climscen_connection::{Connection, ConnectionConfig};
use climscen_core::MemoryStorage;
use std::sync::Arc;

const SIM_45: &str = "CRCM5_NAM-22_CanESM2_rcp45";
const SIM_85: &str = "RCA4_NAM-44_MPI-ESM_rcp85";

fn storage() -> MemoryStorage {
    let storage = MemoryStorage::new();
    let files: &[(&str, &str)] = &[
        ("demo/demo.ini", "[project]\nreference_period = [1981,2010]\n"),
        (
            "demo/ts/pr/pr_rcp_False.csv",
            "year,ref,rcp45_moy,rcp45_min,rcp45_max\n1981,1.0,,,\n2050,,2.0,1.5,2.5\n",
        ),
        ("demo/ts/pr/pr_rcp_True.csv", "year,ref,rcp45_moy,rcp85_moy,rcp85_c090\n"),
        ("demo/ts/pr/pr_sim_False.csv", "year,CRCM5_NAM-22_CanESM2_rcp45,RCA4_NAM-44_MPI-ESM_rcp85\n"),
        ("demo/map/tas/1981-2010/tas_ref_1981_2010_mean.csv", "x,y,v\n"),
        ("demo/map/tas/1981-2010/tas_ref_1981_2010_c090.csv", "x,y,v\n"),
        ("demo/map/tas/2021-2050/tas_rcp45_2021_2050_c010.csv", "x,y,v\n"),
        ("demo/map/tas/2021-2050/tas_rcp45_2021_2050_mean.csv", "x,y,v\n1,2,3\n"),
        ("demo/map/tas/2021-2050/tas_rcp45_2021_2050_CRCM5_NAM-22_CanESM2_rcp45.csv", "x,y,v\n"),
        ("demo/map/tas/2021-2050/tas_rcp45_2021_2050_median.csv", "x,y,v\n"),
        ("demo/map/tas/2021-2050/tas_rcp85_2021_2050_mean_delta.csv", "x,y,v\n"),
        ("demo/map/tas/1981-2050/tas_rcp45_1981_2050_mean.csv", "x,y,v\n"),
        ("demo/map/tx_days_above/2021-2050/tx_days_above_rcp45_2021_2050_mean.csv", "x,y,v\n"),
        ("demo/map/tx_days_above_1/2021-2050/tx_days_above_1_rcp45_2021_2050_mean.csv", "x,y,v\n"),
        (
            "demo/tbl/pr/pr_rcp_False.csv",
            "hor,rcp,stat,value\n\
             1981_2010,ref,mean,1.0\n\
             2021_2050,rcp45,moy,2.0\n\
             2021_2050,rcp45,c10,1.5\n\
             2021_2050,rcp85,moy,2.4\n\
             2041_2070,rcp85,moy,2.9\n\
             1981_2070,rcp85,moy,2.2\n",
        ),
        ("context/regions.geojson", "{\"type\":\"FeatureCollection\"}"),
    ];
    for (path, contents) in files {
        storage.insert(*path, *contents);
    }
    storage
}

async fn catalog() -> ScenarioCatalog {
    let conn = Connection::new(ConnectionConfig::local("/unused"), Arc::new(storage()));
    let snapshot = conn.session().project("demo").await.unwrap();
    ScenarioCatalog::new(snapshot)
}

async fn resolve(catalog: &ScenarioCatalog, selections: &[(Dim, &str)]) -> Context {
    let mut ctx = Context::for_project("demo");
    for (dim, code) in selections {
        ctx.select(*dim, code).unwrap();
    }
    catalog.refresh(&mut ctx).await.unwrap();
    ctx
}

fn codes(ctx: &Context, dim: Dim) -> Vec<String> {
    ctx.catalog_entries(dim)
        .unwrap_or_default()
        .into_iter()
        .map(|(code, _)| code.to_string())
        .collect()
}

#[tokio::test]
async fn views_include_cluster_when_simulation_tables_exist() {
    let catalog = catalog().await;
    let ctx = resolve(&catalog, &[]).await;
    assert_eq!(codes(&ctx, Dim::View), vec!["tbl", "map", "ts", "cluster"]);
    assert!(Dim::ALL.iter().all(|d| !ctx.is_stale(*d)));
}

#[tokio::test]
async fn any_artifact_under_a_view_makes_it_legal() {
    let storage = storage();
    storage.insert("demo/cycle/notes.csv", "free-form\n");
    let conn = Connection::new(ConnectionConfig::local("/unused"), Arc::new(storage));
    let catalog = ScenarioCatalog::new(conn.session().project("demo").await.unwrap());
    let ctx = resolve(&catalog, &[]).await;
    assert_eq!(
        codes(&ctx, Dim::View),
        vec!["tbl", "map", "cycle", "ts", "cluster"]
    );

    // Nothing under cycle follows the grammar, so it offers no variables
    let cycle = resolve(&catalog, &[(Dim::View, "cycle")]).await;
    assert!(codes(&cycle, Dim::VarIdx).is_empty());
}

#[tokio::test]
async fn delta_legality_per_view() {
    let catalog = catalog().await;
    let map = resolve(&catalog, &[(Dim::View, "map")]).await;
    assert_eq!(codes(&map, Dim::Delta), vec!["False", "True"]);

    let cluster = resolve(&catalog, &[(Dim::View, "cluster")]).await;
    assert_eq!(codes(&cluster, Dim::Delta), vec!["False"]);

    // The table view offers deltas even without a delta table
    let tbl = resolve(&catalog, &[(Dim::View, "tbl")]).await;
    assert_eq!(codes(&tbl, Dim::Delta), vec!["False", "True"]);
}

#[tokio::test]
async fn template_instances_replace_bare_index() {
    let catalog = catalog().await;
    let ctx = resolve(&catalog, &[(Dim::View, "map")]).await;
    assert_eq!(codes(&ctx, Dim::VarIdx), vec!["tas", "tx_days_above_1"]);
    assert_eq!(
        ctx.catalog_entries(Dim::VarIdx).unwrap()[0].1,
        "Mean temperature"
    );
}

#[tokio::test]
async fn time_series_scenarios_put_reference_first() {
    let catalog = catalog().await;
    let ctx = resolve(
        &catalog,
        &[(Dim::View, "ts"), (Dim::VarIdx, "pr"), (Dim::Delta, "False")],
    )
    .await;
    let rcp = ctx.catalog::<RcpDim>().unwrap();
    assert_eq!(rcp.codes(), vec!["ref", "rcp45"]);
    assert_eq!(rcp.colors()[0], climscen_catalog::dimension::RcpCode::Ref.color());
    assert!(codes(&ctx, Dim::Hor).is_empty());
}

#[tokio::test]
async fn aggregate_scenario_needs_two_future_scenarios() {
    let catalog = catalog().await;
    let ctx = resolve(
        &catalog,
        &[(Dim::View, "ts"), (Dim::VarIdx, "pr"), (Dim::Delta, "True")],
    )
    .await;
    assert_eq!(codes(&ctx, Dim::Rcp), vec!["ref", "rcp45", "rcp85", "rcp"]);
    assert_eq!(
        ctx.catalog::<RcpDim>().unwrap().description_for_code("rcp"),
        Some("All scenarios")
    );
}

#[tokio::test]
async fn map_horizons_exclude_rollup() {
    let catalog = catalog().await;
    let ctx = resolve(
        &catalog,
        &[(Dim::View, "map"), (Dim::VarIdx, "tas"), (Dim::Delta, "False")],
    )
    .await;
    assert_eq!(codes(&ctx, Dim::Hor), vec!["1981-2010", "2021-2050"]);
}

#[tokio::test]
async fn gridded_statistics_and_simulations_share_the_slot() {
    let catalog = catalog().await;
    let ctx = resolve(
        &catalog,
        &[
            (Dim::View, "map"),
            (Dim::VarIdx, "tas"),
            (Dim::Delta, "False"),
            (Dim::Hor, "2021-2050"),
            (Dim::Rcp, "rcp45"),
        ],
    )
    .await;
    assert_eq!(codes(&ctx, Dim::Rcp), vec!["rcp45"]);
    assert_eq!(codes(&ctx, Dim::Stat), vec!["mean", "c010"]);
    assert_eq!(codes(&ctx, Dim::Sim), vec![SIM_45]);
}

#[tokio::test]
async fn reference_horizon_collapses_to_mean() {
    let catalog = catalog().await;
    let ctx = resolve(
        &catalog,
        &[
            (Dim::View, "map"),
            (Dim::VarIdx, "tas"),
            (Dim::Delta, "False"),
            (Dim::Hor, "1981-2010"),
            (Dim::Rcp, "ref"),
        ],
    )
    .await;
    assert_eq!(ctx.catalog::<StatDim>().unwrap().codes(), vec!["mean"]);
}

#[tokio::test]
async fn time_series_statistics_follow_selected_scenario() {
    let catalog = catalog().await;
    let base = [(Dim::View, "ts"), (Dim::VarIdx, "pr"), (Dim::Delta, "False")];

    let ctx = resolve(&catalog, &[&base[..], &[(Dim::Rcp, "rcp45")]].concat()).await;
    assert_eq!(codes(&ctx, Dim::Stat), vec!["mean", "min", "max"]);
    assert_eq!(codes(&ctx, Dim::Sim), vec![SIM_45]);

    let ctx = resolve(&catalog, &[&base[..], &[(Dim::Rcp, "ref")]].concat()).await;
    assert_eq!(codes(&ctx, Dim::Stat), vec!["mean"]);
}

#[tokio::test]
async fn cluster_simulations_filtered_by_scenario() {
    let catalog = catalog().await;
    let base = [(Dim::View, "cluster"), (Dim::VarIdx, "pr"), (Dim::Delta, "False")];

    let ctx = resolve(&catalog, &base).await;
    assert_eq!(codes(&ctx, Dim::Rcp), vec!["rcp45", "rcp85", "rcp"]);
    assert_eq!(codes(&ctx, Dim::Sim), vec![SIM_45, SIM_85]);
    assert!(codes(&ctx, Dim::Stat).is_empty());

    let ctx = resolve(&catalog, &[&base[..], &[(Dim::Rcp, "rcp")]].concat()).await;
    assert_eq!(codes(&ctx, Dim::Sim), vec![SIM_45, SIM_85]);

    let ctx = resolve(&catalog, &[&base[..], &[(Dim::Rcp, "rcp85")]].concat()).await;
    assert_eq!(codes(&ctx, Dim::Sim), vec![SIM_85]);
}

#[tokio::test]
async fn table_dimensions_come_from_columns() {
    let catalog = catalog().await;
    let ctx = resolve(
        &catalog,
        &[
            (Dim::View, "tbl"),
            (Dim::VarIdx, "pr"),
            (Dim::Delta, "False"),
            (Dim::Hor, "2021-2050"),
            (Dim::Rcp, "rcp45"),
        ],
    )
    .await;
    assert_eq!(
        codes(&ctx, Dim::Hor),
        vec!["1981-2010", "2021-2050", "2041-2070"]
    );
    assert_eq!(codes(&ctx, Dim::Rcp), vec!["rcp45", "rcp85"]);
    assert_eq!(codes(&ctx, Dim::Stat), vec!["mean", "c010"]);
}

#[tokio::test]
async fn upstream_change_revalidates_selections() {
    let catalog = catalog().await;
    let mut ctx = resolve(
        &catalog,
        &[
            (Dim::View, "map"),
            (Dim::VarIdx, "tx_days_above_1"),
            (Dim::Delta, "False"),
            (Dim::Hor, "2021-2050"),
        ],
    )
    .await;
    assert_eq!(ctx.selected_code(Dim::VarIdx), Some("tx_days_above_1"));

    // Only `tas` has delta maps
    ctx.select(Dim::Delta, "True").unwrap();
    assert!(ctx.is_stale(Dim::VarIdx));
    catalog.refresh(&mut ctx).await.unwrap();
    assert_eq!(codes(&ctx, Dim::VarIdx), vec!["tas"]);
    assert_eq!(ctx.selected_code(Dim::VarIdx), None);

    // With the variable unselected, horizons span every variable
    assert_eq!(ctx.selected_code(Dim::Hor), Some("2021-2050"));
    assert_eq!(codes(&ctx, Dim::Rcp), vec!["rcp85"]);
}

#[tokio::test]
async fn selection_outside_current_catalog_is_rejected() {
    let catalog = catalog().await;
    let mut ctx = resolve(&catalog, &[]).await;
    let err = ctx.select(Dim::View, "cycle").unwrap_err();
    assert!(matches!(err, CatalogError::UnknownCode { .. }));
}

#[tokio::test]
async fn refresh_rejects_context_of_another_project() {
    let catalog = catalog().await;
    let mut ctx = Context::for_project("other");
    let err = catalog.refresh(&mut ctx).await.unwrap_err();
    assert!(matches!(err, CatalogError::ProjectMismatch { .. }));

    let mut unbound = Context::new();
    catalog.refresh(&mut unbound).await.unwrap();
    assert_eq!(unbound.project(), Some("demo"));
}

#[tokio::test]
async fn loader_fetches_selected_artifact() {
    let catalog = catalog().await;
    let loader = ArtifactLoader::new(catalog.snapshot().clone());

    let ctx = resolve(
        &catalog,
        &[
            (Dim::View, "map"),
            (Dim::VarIdx, "tas"),
            (Dim::Delta, "False"),
            (Dim::Hor, "2021-2050"),
            (Dim::Rcp, "rcp45"),
            (Dim::Stat, "mean"),
        ],
    )
    .await;
    assert_eq!(
        loader.artifact_path(&ctx).unwrap(),
        "map/tas/2021-2050/tas_rcp45_2021_2050_mean.csv"
    );
    assert_eq!(
        loader.backend_ref(&ctx).unwrap().as_deref(),
        Some("demo/map/tas/2021-2050/tas_rcp45_2021_2050_mean.csv")
    );
    assert_eq!(loader.load_text(&ctx).await.unwrap().as_deref(), Some("x,y,v\n1,2,3\n"));
    let table = loader.load_table(&ctx).await.unwrap().unwrap();
    assert_eq!(table.header(), ["x", "y", "v"]);

    let cluster = resolve(
        &catalog,
        &[(Dim::View, "cluster"), (Dim::VarIdx, "pr"), (Dim::Delta, "False")],
    )
    .await;
    assert_eq!(loader.artifact_path(&cluster).unwrap(), "ts/pr/pr_sim_False.csv");

    assert!(loader.load_shared("regions.geojson").await.unwrap().is_some());
    assert!(loader.load_shared("missing.geojson").await.unwrap().is_none());
}

#[tokio::test]
async fn loader_reports_missing_and_incomplete_selections() {
    let catalog = catalog().await;
    let loader = ArtifactLoader::new(catalog.snapshot().clone());

    let mut ctx = Context::for_project("demo");
    for (dim, code) in [
        (Dim::View, "map"),
        (Dim::VarIdx, "tas"),
        (Dim::Delta, "False"),
        (Dim::Hor, "2021-2050"),
        (Dim::Rcp, "rcp45"),
        (Dim::Stat, "c090"),
    ] {
        ctx.select(dim, code).unwrap();
    }
    assert_eq!(loader.load_text(&ctx).await.unwrap(), None);

    ctx.clear(Dim::Hor);
    let err = loader.artifact_path(&ctx).unwrap_err();
    assert!(matches!(err, CatalogError::Incomplete { dimension: "hor" }));
}

#[tokio::test]
async fn local_tree_resolves_like_memory() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("demo/ts/tas/tas_rcp_False.csv");
    std::fs::create_dir_all(file.parent().unwrap()).unwrap();
    std::fs::write(&file, "year,ref,rcp26_moy,rcp85_moy\n").unwrap();

    let conn = climscen_connection::connect_local(dir.path());
    let snapshot = conn.session().project("demo").await.unwrap();
    let catalog = ScenarioCatalog::new(snapshot);
    let ctx = resolve(
        &catalog,
        &[(Dim::View, "ts"), (Dim::VarIdx, "tas"), (Dim::Delta, "False")],
    )
    .await;
    assert_eq!(codes(&ctx, Dim::View), vec!["ts"]);
    assert_eq!(codes(&ctx, Dim::Rcp), vec!["ref", "rcp26", "rcp85", "rcp"]);
}
