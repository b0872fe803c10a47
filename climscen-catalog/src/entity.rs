//! Coded, described values and ordered catalogs of them
//!
//! An [`Entity`] is a `(code, description)` pair whose description is always
//! computed from the code by its [`Dimension`]. An [`EntityCatalog`] is an
//! ordered set of entities with unique codes. Mutating operations come in two
//! forms: `add`/`remove` change the catalog in place, `with`/`without` leave
//! it untouched and return a modified copy.

use crate::context::Dim;
use serde::{Serialize, Serializer};
use std::fmt::{self, Debug, Display};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Dimension-specific behaviour of entities.
pub trait Dimension: Sized + Debug + Send + Sync + 'static {
    /// Which dimension this is
    const DIM: Dim;

    /// Human-readable description of a code
    fn describe(code: &str) -> String;

    /// Put entities into the dimension's canonical order.
    ///
    /// The default keeps insertion order.
    fn canonicalize(_entities: &mut Vec<Entity<Self>>) {}
}

/// One coded value of a dimension. Equality and hashing use the code only.
pub struct Entity<D: Dimension> {
    code: String,
    description: String,
    _dim: PhantomData<fn() -> D>,
}

impl<D: Dimension> Entity<D> {
    pub fn new(code: impl Into<String>) -> Self {
        let code = code.into();
        let description = D::describe(&code);
        Self {
            code,
            description,
            _dim: PhantomData,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl<D: Dimension> Clone for Entity<D> {
    fn clone(&self) -> Self {
        Self {
            code: self.code.clone(),
            description: self.description.clone(),
            _dim: PhantomData,
        }
    }
}

impl<D: Dimension> Debug for Entity<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("dim", &D::DIM)
            .field("code", &self.code)
            .field("description", &self.description)
            .finish()
    }
}

impl<D: Dimension> Display for Entity<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

impl<D: Dimension> PartialEq for Entity<D> {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl<D: Dimension> Eq for Entity<D> {}

impl<D: Dimension> Hash for Entity<D> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

// === Serde: entities as {code, description}, catalogs as sequences ===

impl<D: Dimension> Serialize for Entity<D> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut entity = serializer.serialize_struct("Entity", 2)?;
        entity.serialize_field("code", &self.code)?;
        entity.serialize_field("description", &self.description)?;
        entity.end()
    }
}

impl<D: Dimension> From<&str> for Entity<D> {
    fn from(code: &str) -> Self {
        Entity::new(code)
    }
}

impl<D: Dimension> From<String> for Entity<D> {
    fn from(code: String) -> Self {
        Entity::new(code)
    }
}

impl<D: Dimension> From<&String> for Entity<D> {
    fn from(code: &String) -> Self {
        Entity::new(code.as_str())
    }
}

/// Anything that can be added to a catalog: an entity, a code, or a list of either.
pub trait IntoEntities<D: Dimension> {
    fn into_entities(self) -> Vec<Entity<D>>;
}

impl<D: Dimension> IntoEntities<D> for Entity<D> {
    fn into_entities(self) -> Vec<Entity<D>> {
        vec![self]
    }
}

impl<D: Dimension> IntoEntities<D> for &str {
    fn into_entities(self) -> Vec<Entity<D>> {
        vec![Entity::new(self)]
    }
}

impl<D: Dimension> IntoEntities<D> for String {
    fn into_entities(self) -> Vec<Entity<D>> {
        vec![Entity::new(self)]
    }
}

impl<D: Dimension, T: Into<Entity<D>>> IntoEntities<D> for Vec<T> {
    fn into_entities(self) -> Vec<Entity<D>> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<D: Dimension, T: Into<Entity<D>> + Clone> IntoEntities<D> for &[T] {
    fn into_entities(self) -> Vec<Entity<D>> {
        self.iter().cloned().map(Into::into).collect()
    }
}

impl<D: Dimension> IntoEntities<D> for EntityCatalog<D> {
    fn into_entities(self) -> Vec<Entity<D>> {
        self.entities
    }
}

/// Ordered collection of entities with unique codes.
pub struct EntityCatalog<D: Dimension> {
    entities: Vec<Entity<D>>,
}

impl<D: Dimension> EntityCatalog<D> {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
        }
    }

    /// Catalog built from codes or entities, in canonical order.
    pub fn from_codes(items: impl IntoEntities<D>) -> Self {
        let mut catalog = Self::new();
        catalog.add(items);
        catalog
    }

    /// Add entities in place. Codes already present are ignored.
    pub fn add(&mut self, items: impl IntoEntities<D>) -> &mut Self {
        for entity in items.into_entities() {
            if !self.contains(entity.code()) {
                self.entities.push(entity);
            }
        }
        D::canonicalize(&mut self.entities);
        self
    }

    /// Copy of this catalog with entities added.
    pub fn with(&self, items: impl IntoEntities<D>) -> Self {
        let mut copy = self.clone();
        copy.add(items);
        copy
    }

    /// Remove an entity in place, returning it if it was present.
    pub fn remove(&mut self, code: &str) -> Option<Entity<D>> {
        let pos = self.entities.iter().position(|e| e.code == code)?;
        Some(self.entities.remove(pos))
    }

    /// Copy of this catalog without the given code.
    pub fn without(&self, code: &str) -> Self {
        let mut copy = self.clone();
        copy.remove(code);
        copy
    }

    /// Keep only entities matching a predicate, in place.
    pub fn retain(&mut self, mut keep: impl FnMut(&Entity<D>) -> bool) -> &mut Self {
        self.entities.retain(|e| keep(e));
        self
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entities.iter().any(|e| e.code == code)
    }

    pub fn get(&self, code: &str) -> Option<&Entity<D>> {
        self.entities.iter().find(|e| e.code == code)
    }

    pub fn code_for_description(&self, description: &str) -> Option<&str> {
        self.entities
            .iter()
            .find(|e| e.description == description)
            .map(Entity::code)
    }

    pub fn description_for_code(&self, code: &str) -> Option<&str> {
        self.get(code).map(Entity::description)
    }

    pub fn codes(&self) -> Vec<&str> {
        self.entities.iter().map(Entity::code).collect()
    }

    pub fn descriptions(&self) -> Vec<&str> {
        self.entities.iter().map(Entity::description).collect()
    }

    pub fn first(&self) -> Option<&Entity<D>> {
        self.entities.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity<D>> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl<D: Dimension> Default for EntityCatalog<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Dimension> Clone for EntityCatalog<D> {
    fn clone(&self) -> Self {
        Self {
            entities: self.entities.clone(),
        }
    }
}

impl<D: Dimension> Debug for EntityCatalog<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityCatalog")
            .field("dim", &D::DIM)
            .field("codes", &self.codes())
            .finish()
    }
}

impl<D: Dimension> PartialEq for EntityCatalog<D> {
    fn eq(&self, other: &Self) -> bool {
        self.entities == other.entities
    }
}

impl<D: Dimension> Eq for EntityCatalog<D> {}

impl<D: Dimension> Serialize for EntityCatalog<D> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(&self.entities)
    }
}

impl<D: Dimension, T: Into<Entity<D>>> FromIterator<T> for EntityCatalog<D> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_codes(iter.into_iter().map(Into::into).collect::<Vec<Entity<D>>>())
    }
}

impl<'a, D: Dimension> IntoIterator for &'a EntityCatalog<D> {
    type Item = &'a Entity<D>;
    type IntoIter = std::slice::Iter<'a, Entity<D>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}
