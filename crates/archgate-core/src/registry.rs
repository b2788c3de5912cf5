//! Typed registry of validator plugins.

use crate::plugin::ValidatorPlugin;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

/// Maps stable plugin ids to plugin implementations.
///
/// Registration happens once at process start; the registry is read-only
/// while validators are being loaded and run.
#[derive(Default, Clone)]
pub struct PluginRegistry {
    plugins: BTreeMap<&'static str, Arc<dyn ValidatorPlugin>>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin under its own id.
    ///
    /// A plugin registered under an existing id replaces the earlier one.
    pub fn register<P: ValidatorPlugin + 'static>(&mut self, plugin: P) {
        self.register_arc(Arc::new(plugin));
    }

    /// Registers a shared plugin under its own id.
    pub fn register_arc(&mut self, plugin: Arc<dyn ValidatorPlugin>) {
        let id = plugin.id();
        if self.plugins.insert(id, plugin).is_some() {
            warn!("Plugin `{}` registered twice; keeping the later one", id);
        }
    }

    /// Builder-style registration.
    #[must_use]
    pub fn with<P: ValidatorPlugin + 'static>(mut self, plugin: P) -> Self {
        self.register(plugin);
        self
    }

    /// Looks up a plugin by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<dyn ValidatorPlugin>> {
        self.plugins.get(id).cloned()
    }

    /// Returns true if a plugin with this id is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.plugins.contains_key(id)
    }

    /// Returns registered ids in sorted order.
    #[must_use]
    pub fn ids(&self) -> Vec<&'static str> {
        self.plugins.keys().copied().collect()
    }

    /// Iterates over registered plugins in id order.
    pub fn plugins(&self) -> impl Iterator<Item = &Arc<dyn ValidatorPlugin>> {
        self.plugins.values()
    }

    /// Returns the number of registered plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns true if no plugin is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.ids())
            .finish()
    }
}
