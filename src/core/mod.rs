// CaseAlert - core/mod.rs
//
// Core business logic: record model, rule engine, table loading, batch
// evaluation, reporting, and export.
// Dependencies: standard library, chrono, csv, regex, serde.
// Must NOT depend on: app, platform.

pub mod batch;
pub mod dates;
pub mod export;
pub mod model;
pub mod report;
pub mod rules;
pub mod table;
pub mod text;
