//! HTTP handlers

pub mod agent;
pub mod analysis;
pub mod health;
pub mod logs;
pub mod statistics;

use serde::Serialize;

/// Standard read-view envelope: the payload rides in a `msg` field, which
/// is what the analysis collaborator and dashboards consume.
#[derive(Debug, Serialize)]
pub struct MsgResponse<T> {
    pub msg: T,
}

impl<T> MsgResponse<T> {
    pub fn new(msg: T) -> Self {
        Self { msg }
    }
}
