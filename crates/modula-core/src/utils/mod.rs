//! # Modula Core Utilities
//!
//! Small helpers shared across subsystems: name casing and the mapping from
//! module-relative file paths to class names.
pub mod case;
pub mod fs;

pub use case::{camel, lower, studly};
pub use fs::{class_name, file_stem, files_with_extension};
