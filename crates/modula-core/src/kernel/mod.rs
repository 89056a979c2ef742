//! # Modula Core Kernel
//!
//! Application wiring, shared constants and the crate-wide error type.
//!
//! - **Application Bootstrapping**: [`Application`](bootstrap::Application)
//!   builds storage, cache, events, the module manager and the component
//!   loader from a [`ModulesConfig`](crate::module_system::ModulesConfig),
//!   then boots every enabled module.
//! - **Core Constants**: file names and directory conventions in
//!   [`constants`].
//! - **Error Handling**: [`Error`](error::Error) and the `Result` alias.
pub mod bootstrap;
pub mod constants;
pub mod error;

pub use bootstrap::Application;
pub use error::{Error, Result};

// Test module declaration
#[cfg(test)]
mod tests;
