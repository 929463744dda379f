// Analysis: upload intake, frame selection, rubric calls and reports.
// All model calls go through llm_client; all video decoding through media.

pub mod analyzer;
pub mod handlers;
pub mod models;
pub mod report;
