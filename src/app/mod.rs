// CaseAlert - app/mod.rs
//
// Application layer: run orchestration from input file to export.
// Dependencies: core, platform.

pub mod pipeline;
