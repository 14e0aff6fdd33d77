//! Holds the module set of one scheduler.

use crate::common::ModuleId;
use crate::components::module::Module;
use crate::config::normalize_names;
use crate::error::{FauxError, Result};
use slotmap::SlotMap;
use std::sync::Arc;

/// The full module universe a scheduler can choose from.
#[derive(Clone)]
pub struct ModuleRegistry {
    modules: SlotMap<ModuleId, Arc<dyn Module>>,
}

impl ModuleRegistry {
    /// Builds a registry, failing if `modules` is empty.
    pub fn from_modules(modules: Vec<Arc<dyn Module>>) -> Result<Self> {
        if modules.is_empty() {
            return Err(FauxError::NoModules);
        }
        let mut map = SlotMap::with_key();
        for module in modules {
            map.insert(module);
        }
        Ok(Self { modules: map })
    }

    pub fn get(&self, id: ModuleId) -> Option<&Arc<dyn Module>> {
        self.modules.get(id)
    }

    /// Finds a module by name, ignoring case and surrounding whitespace.
    pub fn find(&self, name: &str) -> Option<ModuleId> {
        let wanted = name.trim();
        self.modules
            .iter()
            .find(|(_, m)| m.name().eq_ignore_ascii_case(wanted))
            .map(|(id, _)| id)
    }

    /// Ids of the modules eligible for selection.
    ///
    /// An empty filter (after dropping blank entries) enables every module;
    /// otherwise exactly the modules whose name matches an entry are kept.
    /// The result is in registration order and may be empty.
    pub fn enabled<S: AsRef<str>>(&self, filter: &[S]) -> Vec<ModuleId> {
        let wanted = normalize_names(filter);
        self.modules
            .iter()
            .filter(|(_, m)| {
                wanted.is_empty() || wanted.iter().any(|w| m.name().to_lowercase() == *w)
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// Module names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modules.values().map(|m| m.name()).collect();
        names.sort_unstable();
        names
    }

    /// Iterates over all registered modules in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (ModuleId, &Arc<dyn Module>)> {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
