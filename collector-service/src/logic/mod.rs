//! Logic Module - Collector Engines
//!
//! One engine per concern: file tracking, tail extraction, severity
//! classification, cloud upload, and the poll cycle that drives them.

pub mod cloud_sync;
pub mod collect_loop;
pub mod config;
pub mod severity;
pub mod tailer;
pub mod tracker;
