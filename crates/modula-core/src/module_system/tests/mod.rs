pub mod support;

pub mod config_tests;
pub mod context_tests;
pub mod manifest_tests;
