//! Metadata API
//!
//! Option lists the client renders in its product and stock forms.

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::core::ServerState;

const COLORS: [&str; 3] = ["골드", "로즈", "실버"];

/// Ring sizes run from 3호 to 23호
const RING_SIZE_RANGE: std::ops::RangeInclusive<u32> = 3..=23;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataResponse {
    pub colors: Vec<&'static str>,
    pub ring_sizes: Vec<String>,
}

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/metadata", get(metadata))
}

fn build_metadata() -> MetadataResponse {
    MetadataResponse {
        colors: COLORS.to_vec(),
        ring_sizes: RING_SIZE_RANGE.map(|n| format!("{n}호")).collect(),
    }
}

/// GET /api/metadata
async fn metadata() -> Json<MetadataResponse> {
    Json(build_metadata())
}
