//! # climscen catalog
//!
//! Dimension catalogs and cascading resolution over a project's artifacts.
//!
//! This crate provides:
//! - [`Entity`] / [`EntityCatalog`], specialized by the seven dimensions in
//!   [`dimension`]
//! - The naming grammar ([`PathBuilder`], [`ArtifactPath`]) shared by
//!   resolvers and loaders
//! - [`Context`], the selection cursor with its dependency order
//! - [`ScenarioCatalog`], resolving the legal values of each dimension
//! - [`ArtifactLoader`], fetching the artifact a context selects
//!
//! ## Quick Start
//!
//! ```ignore
//! use climscen_catalog::{ArtifactLoader, Context, Dim, ScenarioCatalog};
//!
//! let snapshot = session.project("demo").await?;
//! let catalog = ScenarioCatalog::new(snapshot.clone());
//!
//! let mut ctx = Context::for_project("demo");
//! ctx.select(Dim::View, "ts")?;
//! ctx.select(Dim::VarIdx, "pr")?;
//! ctx.select(Dim::Delta, "False")?;
//! catalog.refresh(&mut ctx).await?;
//! println!("{:?}", ctx.catalog_entries(Dim::Rcp));
//!
//! let text = ArtifactLoader::new(snapshot).load_text(&ctx).await?;
//! ```

pub mod context;
pub mod dimension;
pub mod entity;
pub mod error;
pub mod grammar;
pub mod loader;
pub mod resolve;
pub mod tabular;

pub use context::{Context, ContextSlot, Dim, DimensionState};
pub use dimension::{
    DeltaDim, HorDim, HorizonInput, HorizonSpan, RcpDim, SimCode, SimDim, StatCode, StatDim,
    VarIdxDim, ViewCode, ViewDim,
};
pub use entity::{Dimension, Entity, EntityCatalog, IntoEntities};
pub use error::{CatalogError, Result};
pub use grammar::{ArtifactPath, PathBuilder, PathSpec, Slot, TabularMode};
pub use loader::ArtifactLoader;
pub use resolve::ScenarioCatalog;
pub use tabular::CsvTable;
