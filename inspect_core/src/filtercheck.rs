//! The filter-check catalog.
//!
//! The expression compiler resolves field names through a [`FilterCheckList`]
//! it is handed explicitly. Each entry is a prototype ([`FilterCheck`]) that
//! allocates one bound, independently stateful instance
//! ([`BoundFilterCheck`]) per use of a field in an expression.

use liblogger::log_debug;

use crate::error::{ExtractError, PluginError};
use crate::event::Event;
use crate::field_info::FieldInfo;

/// A named family of fields that can be instantiated per field.
pub trait FilterCheck: Send + Sync {
    fn name(&self) -> &str;

    fn fields(&self) -> &[FieldInfo];

    /// Creates an instance bound to `fields()[field_index]`.
    fn allocate(&self, field_index: usize) -> Result<Box<dyn BoundFilterCheck>, PluginError>;

    fn field_index(&self, field_name: &str) -> Option<usize> {
        self.fields().iter().position(|f| f.name() == field_name)
    }
}

/// A filter check bound to one field, evaluated against events.
pub trait BoundFilterCheck: Send {
    fn check_name(&self) -> &str;

    fn field(&self) -> &FieldInfo;

    /// Extracts the field from `evt`.
    ///
    /// `Ok(None)` means the field does not apply to this event. The returned
    /// bytes are valid until the next call on this instance.
    fn extract(&mut self, evt: &Event) -> Result<Option<&[u8]>, ExtractError>;

    fn clone_box(&self) -> Box<dyn BoundFilterCheck>;
}

impl Clone for Box<dyn BoundFilterCheck> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Registered filter-check prototypes, in registration order.
#[derive(Default)]
pub struct FilterCheckList {
    checks: Vec<Box<dyn FilterCheck>>,
}

impl FilterCheckList {
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    pub fn add_filter_check(&mut self, check: Box<dyn FilterCheck>) {
        log_debug!(&format!(
            "Registering filter check {} ({} fields)",
            check.name(),
            check.fields().len()
        ));
        self.checks.push(check);
    }

    pub fn get(&self, name: &str) -> Option<&dyn FilterCheck> {
        self.checks.iter().find(|c| c.name() == name).map(|c| c.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn FilterCheck> {
        self.checks.iter().map(|c| c.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Allocates an instance for the first registered check declaring `field_name`.
    ///
    /// `Ok(None)` when no check declares it.
    pub fn new_filter_check_from_field_name(
        &self,
        field_name: &str,
    ) -> Result<Option<Box<dyn BoundFilterCheck>>, PluginError> {
        for check in &self.checks {
            if let Some(index) = check.field_index(field_name) {
                return check.allocate(index).map(Some);
            }
        }
        Ok(None)
    }

    /// Removes the check registered under `name`.
    pub fn remove(&mut self, name: &str) -> Option<Box<dyn FilterCheck>> {
        let position = self.checks.iter().position(|c| c.name() == name)?;
        Some(self.checks.remove(position))
    }

    pub fn clear(&mut self) {
        self.checks.clear();
    }
}
