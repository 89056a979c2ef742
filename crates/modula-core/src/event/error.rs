//! # Modula Core Event System Errors
//!
//! Handler bookkeeping failures.
use crate::event::EventId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventSystemError {
    #[error("No event handler registered with ID {id}")]
    UnknownHandler { id: EventId },
}
