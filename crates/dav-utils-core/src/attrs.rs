//! Attribute reflection over an explicit schema.
//!
//! An [`AttrStore`] holds the attributes of one object: declared slots
//! (validated through a [`TypeChecker`]), free attributes (any value), and
//! the names of the owner's methods, which can never be overwritten or
//! listed. Names starting with [`PRIVATE_PREFIX`] are private.

use crate::field::{FieldError, TypeChecker};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Prefix that marks an attribute as private.
pub const PRIVATE_PREFIX: char = '_';

/// Errors raised when setting attributes.
#[derive(Debug, thiserror::Error)]
pub enum AttrError {
    /// A declared slot rejected the value.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// The name belongs to a method of the owner.
    #[error("`{name}` is a method and cannot be assigned")]
    Reserved {
        /// The attribute name.
        name: String,
    },
}

/// Returns `true` if `name` is private.
#[must_use]
pub fn is_private(name: &str) -> bool {
    name.starts_with(PRIVATE_PREFIX)
}

/// The attribute table of one object.
#[derive(Debug, Default)]
pub struct AttrStore {
    fields: BTreeMap<String, TypeChecker>,
    free: BTreeMap<String, Value>,
    reserved: BTreeSet<String>,
}

impl AttrStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a declared slot.
    #[must_use]
    pub fn with_field(mut self, field: TypeChecker) -> Self {
        self.declare(field);
        self
    }

    /// Marks member names as methods of the owner.
    #[must_use]
    pub fn with_reserved<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.reserved.extend(names.into_iter().map(String::from));
        self
    }

    /// Adds or replaces a declared slot.
    ///
    /// A free attribute with the same name is dropped.
    pub fn declare(&mut self, field: TypeChecker) {
        self.free.remove(field.name());
        self.fields.insert(field.name().to_string(), field);
    }

    /// Returns `true` if `name` is a method of the owner.
    #[must_use]
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(name)
    }

    /// Returns the declared slot for `name`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&TypeChecker> {
        self.fields.get(name)
    }

    /// Sets an attribute, validating it if a slot is declared for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`AttrError::Reserved`] for method names and
    /// [`AttrError::Field`] if the declared slot rejects the value.
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), AttrError> {
        if self.is_reserved(name) {
            return Err(AttrError::Reserved {
                name: name.to_string(),
            });
        }
        match self.fields.get_mut(name) {
            Some(field) => field.set(value)?,
            None => {
                self.free.insert(name.to_string(), value);
            }
        }
        Ok(())
    }

    /// Returns the current value of an attribute.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self.fields.get(name) {
            Some(field) => field.value(),
            None => self.free.get(name),
        }
    }

    /// Removes an attribute, returning its value.
    ///
    /// A declared slot stays declared but becomes unset.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        match self.fields.get_mut(name) {
            Some(field) => field.clear(),
            None => self.free.remove(name),
        }
    }

    /// Returns every set, public attribute, sorted by name.
    #[must_use]
    pub fn public_attrs(&self) -> Map<String, Value> {
        let declared = self
            .fields
            .iter()
            .filter_map(|(name, field)| field.value().map(|v| (name, v)));

        declared
            .chain(self.free.iter())
            .filter(|(name, _)| !is_private(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Bulk-assigns attributes from `mapping`.
    ///
    /// Private keys and keys naming a method are skipped; the remaining keys
    /// are lower-cased and stored, unknown ones as free attributes. Every
    /// value is validated before anything is written, so a rejected value
    /// leaves the store untouched.
    ///
    /// # Errors
    ///
    /// Returns the first validation error.
    pub fn update(&mut self, mapping: &Map<String, Value>) -> Result<(), AttrError> {
        let mut accepted = Vec::with_capacity(mapping.len());

        for (key, value) in mapping {
            if is_private(key) {
                tracing::debug!("Skipping private attribute {key}");
                continue;
            }
            let name = key.to_lowercase();
            if self.is_reserved(&name) {
                tracing::debug!("Skipping method name {key}");
                continue;
            }
            if let Some(field) = self.fields.get(&name) {
                field.check(value)?;
            }
            accepted.push((name, value.clone()));
        }

        for (name, value) in accepted {
            self.set(&name, value)?;
        }
        Ok(())
    }
}

/// Attribute reflection for types backed by an [`AttrStore`].
pub trait Reflect {
    /// Returns the attribute table.
    fn attrs(&self) -> &AttrStore;

    /// Returns the attribute table mutably.
    fn attrs_mut(&mut self) -> &mut AttrStore;

    /// See [`AttrStore::public_attrs`].
    fn public_attrs(&self) -> Map<String, Value> {
        self.attrs().public_attrs()
    }

    /// See [`AttrStore::update`].
    ///
    /// # Errors
    ///
    /// Returns the first validation error.
    fn update(&mut self, mapping: &Map<String, Value>) -> Result<(), AttrError> {
        self.attrs_mut().update(mapping)
    }
}
