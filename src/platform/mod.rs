// CaseAlert - platform/mod.rs
//
// Platform abstraction layer: config file location and file reading.
// Dependencies: standard library, directories crate.
// Must NOT depend on: app.

pub mod config;
pub mod fs;
