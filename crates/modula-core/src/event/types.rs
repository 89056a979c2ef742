use std::any::Any;
use std::fmt;

use crate::event::Event;

/// Lifecycle events emitted by the module manager and the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleEvent {
    /// A fresh discovery produced `count` modules
    Discovered { count: usize },
    /// A module was switched on
    Enabled { name: String },
    /// A module was switched off
    Disabled { name: String },
    /// Discovery results were written to the cache store
    CacheRefreshed { count: usize },
    /// Cached discovery results were dropped
    CacheCleared,
    /// A module's components were registered with the host
    Loaded { name: String },
    /// The application finished loading `count` modules
    Booted { count: usize },
}

impl ModuleEvent {
    pub const DISCOVERED: &'static str = "module.discovered";
    pub const ENABLED: &'static str = "module.enabled";
    pub const DISABLED: &'static str = "module.disabled";
    pub const CACHE_REFRESHED: &'static str = "module.cache_refreshed";
    pub const CACHE_CLEARED: &'static str = "module.cache_cleared";
    pub const LOADED: &'static str = "module.loaded";
    pub const BOOTED: &'static str = "module.booted";

    /// Module the event is about, for per-module events
    pub fn module_name(&self) -> Option<&str> {
        match self {
            ModuleEvent::Enabled { name } | ModuleEvent::Disabled { name } | ModuleEvent::Loaded { name } => {
                Some(name)
            }
            _ => None,
        }
    }
}

impl Event for ModuleEvent {
    fn name(&self) -> &'static str {
        match self {
            ModuleEvent::Discovered { .. } => Self::DISCOVERED,
            ModuleEvent::Enabled { .. } => Self::ENABLED,
            ModuleEvent::Disabled { .. } => Self::DISABLED,
            ModuleEvent::CacheRefreshed { .. } => Self::CACHE_REFRESHED,
            ModuleEvent::CacheCleared => Self::CACHE_CLEARED,
            ModuleEvent::Loaded { .. } => Self::LOADED,
            ModuleEvent::Booted { .. } => Self::BOOTED,
        }
    }

    fn clone_event(&self) -> Box<dyn Event> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Display for ModuleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.module_name() {
            Some(module) => write!(f, "{} ({})", self.name(), module),
            None => write!(f, "{}", self.name()),
        }
    }
}

#[cfg(test)]
#[derive(Debug, Clone)]
pub struct TestEvent {
    name: &'static str,
}

#[cfg(test)]
impl TestEvent {
    pub fn new(name: &'static str) -> Self {
        TestEvent { name }
    }
}

#[cfg(test)]
impl Event for TestEvent {
    fn name(&self) -> &'static str {
        self.name
    }

    fn clone_event(&self) -> Box<dyn Event> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
