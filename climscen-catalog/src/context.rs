//! Selection cursor over the seven dimensions
//!
//! A [`Context`] holds, per dimension, the catalog of legal values (or
//! nothing, when it is stale and must be resolved again) and the selected
//! value. Changing a selection marks every downstream catalog stale; the
//! selections of stale dimensions are kept as pending choices and checked
//! against the new catalog when it is resolved.
//!
//! Dependency order: `project → view → delta → varIdx → hor → rcp → {stat, sim}`.
//! `stat` and `sim` are siblings and never invalidate each other.

use crate::dimension::{
    parse_delta, DeltaDim, HorDim, RcpDim, SimDim, StatDim, VarIdxDim, ViewCode, ViewDim,
};
use crate::entity::{Dimension, Entity, EntityCatalog};
use crate::error::{CatalogError, Result};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use std::fmt;

/// Dimension tag, declared in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dim {
    View,
    Delta,
    VarIdx,
    Hor,
    Rcp,
    Stat,
    Sim,
}

impl Dim {
    pub const ALL: [Dim; 7] = [
        Dim::View,
        Dim::Delta,
        Dim::VarIdx,
        Dim::Hor,
        Dim::Rcp,
        Dim::Stat,
        Dim::Sim,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Dim::View => "view",
            Dim::Delta => "delta",
            Dim::VarIdx => "var_idx",
            Dim::Hor => "hor",
            Dim::Rcp => "rcp",
            Dim::Stat => "stat",
            Dim::Sim => "sim",
        }
    }

    pub fn parse(name: &str) -> Option<Dim> {
        match name {
            "var" | "varidx" | "var_idx" => Some(Dim::VarIdx),
            _ => Self::ALL.into_iter().find(|d| d.name() == name),
        }
    }

    /// True if `self` must be recomputed when `upstream` changes.
    pub fn depends_on(self, upstream: Dim) -> bool {
        upstream < self && !(self == Dim::Sim && upstream == Dim::Stat)
    }

    /// Dimensions invalidated by a change to `self`, in order.
    pub fn downstream(self) -> impl Iterator<Item = Dim> {
        Self::ALL.into_iter().filter(move |d| d.depends_on(self))
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Catalog and selection of one dimension.
#[derive(Debug)]
pub struct DimensionState<D: Dimension> {
    catalog: Option<EntityCatalog<D>>,
    selected: Option<Entity<D>>,
}

impl<D: Dimension> Clone for DimensionState<D> {
    fn clone(&self) -> Self {
        Self {
            catalog: self.catalog.clone(),
            selected: self.selected.clone(),
        }
    }
}

impl<D: Dimension> Default for DimensionState<D> {
    fn default() -> Self {
        Self {
            catalog: None,
            selected: None,
        }
    }
}

impl<D: Dimension> DimensionState<D> {
    /// Current catalog; `None` while stale.
    pub fn catalog(&self) -> Option<&EntityCatalog<D>> {
        self.catalog.as_ref()
    }

    pub fn selected(&self) -> Option<&Entity<D>> {
        self.selected.as_ref()
    }

    pub fn selected_code(&self) -> Option<&str> {
        self.selected.as_ref().map(Entity::code)
    }

    pub fn is_stale(&self) -> bool {
        self.catalog.is_none()
    }

    /// Select a code. Checked against the catalog when it is current,
    /// otherwise kept pending until the next resolution.
    pub fn select(&mut self, code: &str) -> Result<()> {
        if code.is_empty() {
            self.selected = None;
            return Ok(());
        }
        if let Some(catalog) = &self.catalog {
            if !catalog.contains(code) {
                return Err(CatalogError::unknown_code(D::DIM.name(), code));
            }
        }
        self.selected = Some(Entity::new(code));
        Ok(())
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn invalidate(&mut self) {
        self.catalog = None;
    }

    /// Install a freshly resolved catalog, dropping a selection it lacks.
    pub(crate) fn set_catalog(&mut self, catalog: EntityCatalog<D>) {
        if let Some(selected) = &self.selected {
            if !catalog.contains(selected.code()) {
                tracing::debug!(
                    dimension = D::DIM.name(),
                    code = selected.code(),
                    "selection no longer legal, cleared"
                );
                self.selected = None;
            }
        }
        self.catalog = Some(catalog);
    }
}

/// Type-erased access to a dimension's state, for code indexed by [`Dim`].
trait AnyState: fmt::Debug + Send + Sync {
    fn selected_code(&self) -> Option<&str>;
    fn select(&mut self, code: &str) -> Result<()>;
    fn clear(&mut self);
    fn invalidate(&mut self);
    fn is_stale(&self) -> bool;
    fn entries(&self) -> Option<Vec<(&str, &str)>>;
}

impl<D: Dimension> AnyState for DimensionState<D> {
    fn selected_code(&self) -> Option<&str> {
        DimensionState::selected_code(self)
    }

    fn select(&mut self, code: &str) -> Result<()> {
        DimensionState::select(self, code)
    }

    fn clear(&mut self) {
        DimensionState::clear(self)
    }

    fn invalidate(&mut self) {
        DimensionState::invalidate(self)
    }

    fn is_stale(&self) -> bool {
        DimensionState::is_stale(self)
    }

    fn entries(&self) -> Option<Vec<(&str, &str)>> {
        self.catalog
            .as_ref()
            .map(|c| c.iter().map(|e| (e.code(), e.description())).collect())
    }
}

/// Per-dimension slot lookup on a [`Context`].
pub trait ContextSlot: Dimension {
    fn state(ctx: &Context) -> &DimensionState<Self>;
    fn state_mut(ctx: &mut Context) -> &mut DimensionState<Self>;
}

macro_rules! context_slot {
    ($dim:ty, $field:ident) => {
        impl ContextSlot for $dim {
            fn state(ctx: &Context) -> &DimensionState<Self> {
                &ctx.$field
            }

            fn state_mut(ctx: &mut Context) -> &mut DimensionState<Self> {
                &mut ctx.$field
            }
        }
    };
}

context_slot!(ViewDim, view);
context_slot!(DeltaDim, delta);
context_slot!(VarIdxDim, var_idx);
context_slot!(HorDim, hor);
context_slot!(RcpDim, rcp);
context_slot!(StatDim, stat);
context_slot!(SimDim, sim);

/// Selection state for one project within one session.
#[derive(Debug, Clone, Default)]
pub struct Context {
    project: Option<String>,
    view: DimensionState<ViewDim>,
    delta: DimensionState<DeltaDim>,
    var_idx: DimensionState<VarIdxDim>,
    hor: DimensionState<HorDim>,
    rcp: DimensionState<RcpDim>,
    stat: DimensionState<StatDim>,
    sim: DimensionState<SimDim>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_project(project: impl Into<String>) -> Self {
        Self {
            project: Some(project.into()),
            ..Self::default()
        }
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// Switch project. Every catalog and selection is reset.
    pub fn set_project(&mut self, project: impl Into<String>) {
        let project = project.into();
        if self.project.as_deref() == Some(project.as_str()) {
            return;
        }
        *self = Self::for_project(project);
    }

    pub fn state<D: ContextSlot>(&self) -> &DimensionState<D> {
        D::state(self)
    }

    pub(crate) fn state_mut<D: ContextSlot>(&mut self) -> &mut DimensionState<D> {
        D::state_mut(self)
    }

    pub fn catalog<D: ContextSlot>(&self) -> Option<&EntityCatalog<D>> {
        D::state(self).catalog()
    }

    pub fn selected<D: ContextSlot>(&self) -> Option<&Entity<D>> {
        D::state(self).selected()
    }

    fn slot(&self, dim: Dim) -> &dyn AnyState {
        match dim {
            Dim::View => &self.view,
            Dim::Delta => &self.delta,
            Dim::VarIdx => &self.var_idx,
            Dim::Hor => &self.hor,
            Dim::Rcp => &self.rcp,
            Dim::Stat => &self.stat,
            Dim::Sim => &self.sim,
        }
    }

    fn slot_mut(&mut self, dim: Dim) -> &mut dyn AnyState {
        match dim {
            Dim::View => &mut self.view,
            Dim::Delta => &mut self.delta,
            Dim::VarIdx => &mut self.var_idx,
            Dim::Hor => &mut self.hor,
            Dim::Rcp => &mut self.rcp,
            Dim::Stat => &mut self.stat,
            Dim::Sim => &mut self.sim,
        }
    }

    /// Select a value and mark downstream catalogs stale.
    ///
    /// An empty code clears the selection. Selecting the current value is a
    /// no-op.
    pub fn select(&mut self, dim: Dim, code: &str) -> Result<()> {
        if self.selected_code(dim).unwrap_or("") == code {
            return Ok(());
        }
        self.slot_mut(dim).select(code)?;
        self.invalidate_downstream(dim);
        Ok(())
    }

    /// Select a value in a typed dimension.
    pub fn select_entity<D: ContextSlot>(&mut self, entity: &Entity<D>) -> Result<()> {
        self.select(D::DIM, entity.code())
    }

    pub fn clear(&mut self, dim: Dim) {
        if self.slot(dim).selected_code().is_some() {
            self.slot_mut(dim).clear();
            self.invalidate_downstream(dim);
        }
    }

    /// Mark a dimension and its dependents stale.
    pub fn invalidate(&mut self, dim: Dim) {
        self.slot_mut(dim).invalidate();
        self.invalidate_downstream(dim);
    }

    fn invalidate_downstream(&mut self, dim: Dim) {
        for d in dim.downstream() {
            self.slot_mut(d).invalidate();
        }
    }

    pub fn selected_code(&self, dim: Dim) -> Option<&str> {
        self.slot(dim).selected_code()
    }

    pub fn is_stale(&self, dim: Dim) -> bool {
        self.slot(dim).is_stale()
    }

    /// `(code, description)` pairs of a current catalog.
    pub fn catalog_entries(&self, dim: Dim) -> Option<Vec<(&str, &str)>> {
        self.slot(dim).entries()
    }

    pub fn view_code(&self) -> Option<ViewCode> {
        self.selected_code(Dim::View).and_then(ViewCode::parse)
    }

    /// Whether values are shown as change from the reference period.
    pub fn delta_mode(&self) -> bool {
        self.selected_code(Dim::Delta)
            .and_then(parse_delta)
            .unwrap_or(false)
    }
}

// === Serde: {project, dimensions: {<dim>: {selected, stale, entries}}} ===

struct SlotView<'a>(&'a dyn AnyState);

impl Serialize for SlotView<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let entries: Vec<_> = self
            .0
            .entries()
            .unwrap_or_default()
            .into_iter()
            .map(|(code, description)| EntryView { code, description })
            .collect();
        let mut slot = serializer.serialize_struct("Dimension", 3)?;
        slot.serialize_field("selected", &self.0.selected_code())?;
        slot.serialize_field("stale", &self.0.is_stale())?;
        slot.serialize_field("entries", &entries)?;
        slot.end()
    }
}

#[derive(Serialize)]
struct EntryView<'a> {
    code: &'a str,
    description: &'a str,
}

struct DimensionsView<'a>(&'a Context);

impl Serialize for DimensionsView<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(Dim::ALL.len()))?;
        for dim in Dim::ALL {
            map.serialize_entry(dim.name(), &SlotView(self.0.slot(dim)))?;
        }
        map.end()
    }
}

impl Serialize for Context {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut ctx = serializer.serialize_struct("Context", 2)?;
        ctx.serialize_field("project", &self.project)?;
        ctx.serialize_field("dimensions", &DimensionsView(self))?;
        ctx.end()
    }
}
