//! Build and deployment information endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::config::INFO_MESSAGE;
use crate::lifecycle::timestamp;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub message: &'static str,
    pub version: String,
    pub environment: String,
    pub timestamp: String,
    pub pod: PodInfo,
}

/// Identity of the pod serving the request
#[derive(Debug, Serialize)]
pub struct PodInfo {
    pub name: String,
    pub namespace: String,
}

pub async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    let config = &state.config;
    Json(InfoResponse {
        message: INFO_MESSAGE,
        version: config.version.clone(),
        environment: config.environment.clone(),
        timestamp: timestamp(),
        pod: PodInfo {
            name: config.pod_name.clone(),
            namespace: config.namespace.clone(),
        },
    })
}
