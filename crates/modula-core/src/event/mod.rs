//! # Modula Core Event System
//!
//! Lifecycle notifications for the module system.
//!
//! - **[`dispatcher`]**: [`EventDispatcher`] and its shareable wrapper
//!   [`SharedEventDispatcher`], which route events to handlers registered by
//!   event name or by concrete event type.
//! - **[`types`]**: the [`ModuleEvent`] enum emitted by the manager and the
//!   application.
//! - **[`error`]**: [`EventSystemError`](error::EventSystemError).
pub mod dispatcher;
pub mod error;
pub mod types;

use std::any::Any;
use std::fmt;

use async_trait::async_trait;

/// Type for event handler identifiers
pub type EventId = u64;

/// Result of event processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Event was processed successfully and propagation should continue
    Continue,
    /// Event was processed and propagation should stop
    Stop,
}

/// Core event trait
pub trait Event: Any + fmt::Debug + Send + Sync {
    /// Get the name of this event
    fn name(&self) -> &'static str;

    /// Clone this event
    fn clone_event(&self) -> Box<dyn Event>;

    /// Cast to Any for downcasting
    fn as_any(&self) -> &dyn Any;
}

/// Asynchronous event handler trait
#[async_trait]
pub trait AsyncEventHandler: Send + Sync {
    async fn handle(&self, event: &dyn Event) -> EventResult;
}

pub use dispatcher::{EventDispatcher, SharedEventDispatcher, sync_event_handler, sync_typed_handler};
pub use types::ModuleEvent;

#[cfg(test)]
mod tests;
