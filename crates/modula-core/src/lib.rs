pub mod event;
pub mod host;
pub mod kernel;
pub mod module_system;
pub mod storage;
pub mod utils;

// Re-export key public types/traits for easier use by the binary and host integrations
pub use kernel::Application;
pub use kernel::error::{Error, Result};
pub use module_system::{
    ComponentLoader, DefaultModuleManager, Module, ModuleManager, ModuleRecord, ModulesConfig,
};
pub use event::{Event, ModuleEvent, SharedEventDispatcher};
pub use host::{Host, InMemoryHost};
pub use storage::{CacheStore, StorageProvider};
