//! Automation trigger endpoints: run-now, one-shot scheduling, and the
//! recurring-job on/off switch.

use std::sync::atomic::Ordering;

use axum::{
    extract::State,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use trendcast_core::{RunConfig, RunKind, Tone};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

/// Optional overrides applied on top of the default run configuration.
#[derive(Debug, Default, Deserialize)]
pub(super) struct RunOverrides {
    pub sources: Option<Vec<String>>,
    pub max_trends: Option<usize>,
    pub max_posts_per_day: Option<usize>,
    pub tones: Option<Vec<Tone>>,
    pub filter_duplicates: Option<bool>,
}

impl RunOverrides {
    fn into_config(self) -> RunConfig {
        let mut config = RunConfig::default();
        if let Some(sources) = self.sources {
            config.sources = sources;
        }
        if let Some(max_trends) = self.max_trends {
            config.max_trends = max_trends;
        }
        if let Some(max_posts) = self.max_posts_per_day {
            config.max_posts_per_day = max_posts;
        }
        if let Some(tones) = self.tones {
            config.tones = tones;
        }
        if let Some(filter) = self.filter_duplicates {
            config.filter_duplicates = filter;
        }
        config
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ScheduleRequest {
    pub run_at: DateTime<Utc>,
    #[serde(flatten)]
    pub overrides: RunOverrides,
}

#[derive(Debug, Serialize)]
pub(super) struct AcceptedData {
    pub status: &'static str,
    pub kind: &'static str,
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub(super) struct AutomationStatusData {
    pub running: bool,
    pub jobs: Vec<JobInfo>,
}

#[derive(Debug, Serialize)]
pub(super) struct JobInfo {
    pub name: &'static str,
    pub schedule: &'static str,
}

/// POST /api/v1/automation/run: fire-and-forget full pipeline run.
///
/// The caller gets an immediate acknowledgment; the summary lands in the
/// run log and is readable via `GET /api/v1/runs`.
pub(super) async fn run_now(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Option<Json<RunOverrides>>,
) -> Result<Json<ApiResponse<AcceptedData>>, ApiError> {
    let config = body.map(|Json(o)| o).unwrap_or_default().into_config();
    config
        .validate()
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    let Some(permit) = state.gate.try_begin(RunKind::Manual) else {
        return Err(ApiError::new(
            req_id.0,
            "run_in_flight",
            "a manual run is already in progress",
        ));
    };

    let engine = state.engine.clone();
    tokio::spawn(async move {
        let _permit = permit;
        match engine.run_pipeline(RunKind::Manual, config).await {
            Ok(summary) => {
                tracing::info!(
                    run_id = %summary.run_id,
                    scheduled = summary.posts_scheduled,
                    "manual run complete"
                );
            }
            Err(e) => tracing::error!(error = %e, "manual run rejected"),
        }
    });

    Ok(Json(ApiResponse {
        data: AcceptedData {
            status: "accepted",
            kind: "manual",
            detail: "run started; read the summary from /api/v1/runs".to_string(),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/automation/schedule: one-shot custom run at a future time.
pub(super) async fn schedule_custom_run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<ScheduleRequest>,
) -> Result<Json<ApiResponse<AcceptedData>>, ApiError> {
    let now = Utc::now();
    if request.run_at <= now {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "run_at must be in the future",
        ));
    }

    let config = request.overrides.into_config();
    config
        .validate()
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    let delay = (request.run_at - now)
        .to_std()
        .unwrap_or(std::time::Duration::ZERO);
    let engine = state.engine.clone();
    let gate = state.gate.clone();
    let run_at = request.run_at;

    tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        let Some(permit) = gate.try_begin(RunKind::Custom) else {
            tracing::warn!("skipping scheduled custom run: one is already in progress");
            return;
        };
        let _permit = permit;

        match engine.run_pipeline(RunKind::Custom, config).await {
            Ok(summary) => {
                tracing::info!(
                    run_id = %summary.run_id,
                    scheduled = summary.posts_scheduled,
                    "custom run complete"
                );
            }
            Err(e) => tracing::error!(error = %e, "custom run rejected"),
        }
    });

    Ok(Json(ApiResponse {
        data: AcceptedData {
            status: "accepted",
            kind: "custom",
            detail: format!("run scheduled for {run_at}"),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/automation/start: enable the recurring jobs.
pub(super) async fn start(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<AcceptedData>>, ApiError> {
    let was_running = state.automation.enabled.swap(true, Ordering::SeqCst);
    if was_running {
        return Err(ApiError::new(
            req_id.0,
            "conflict",
            "automation already running",
        ));
    }

    tracing::info!("automation enabled");
    Ok(Json(ApiResponse {
        data: AcceptedData {
            status: "started",
            kind: "automation",
            detail: "recurring jobs enabled".to_string(),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/automation/stop: disable the recurring jobs.
pub(super) async fn stop(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<AcceptedData>>, ApiError> {
    let was_running = state.automation.enabled.swap(false, Ordering::SeqCst);
    if !was_running {
        return Err(ApiError::new(req_id.0, "conflict", "automation not running"));
    }

    tracing::info!("automation disabled");
    Ok(Json(ApiResponse {
        data: AcceptedData {
            status: "stopped",
            kind: "automation",
            detail: "recurring jobs disabled".to_string(),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// GET /api/v1/automation/status
pub(super) async fn status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<AutomationStatusData>> {
    Json(ApiResponse {
        data: AutomationStatusData {
            running: state.automation.enabled.load(Ordering::SeqCst),
            jobs: vec![
                JobInfo {
                    name: "daily pipeline",
                    schedule: "08:00 UTC daily",
                },
                JobInfo {
                    name: "trend refresh",
                    schedule: "08:00, 12:00, 16:00, 20:00 UTC",
                },
            ],
        },
        meta: ResponseMeta::new(req_id.0),
    })
}
