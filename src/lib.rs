//! Atasco - Pure Rust page-load trace analyzer
//!
//! This library analyzes a single page-load execution trace to surface the
//! main-thread tasks most responsible for blocking responsiveness, and
//! attributes each such task to the resource (script URL, browser-internal
//! work, or garbage collection) that caused it.

pub mod attribution;
pub mod audit;
pub mod cache;
pub mod cli;
pub mod csv_output;
pub mod json_output;
pub mod network;
pub mod report;
pub mod selector;
pub mod task_forest;
pub mod trace_event;
