use std::time::Instant;

use axum::{Json, Router, extract::State, routing::post};
use proposalgen_core::{PipelineOutcome, ResearchTitle};
use serde::Deserialize;
use tracing::instrument;

use crate::error::AppError;
use crate::metrics;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProposalRequest {
    #[serde(default)]
    pub research_title: String,
}

pub fn api_router() -> Router<AppState> {
    Router::new().route("/proposals", post(create_proposal))
}

#[instrument(skip_all)]
async fn create_proposal(
    State(state): State<AppState>,
    Json(payload): Json<ProposalRequest>,
) -> Result<Json<PipelineOutcome>, AppError> {
    let title = ResearchTitle::parse(&payload.research_title).map_err(|err| {
        metrics::proposal_rejected(&err.to_string());
        AppError::from(err)
    })?;

    metrics::proposal_started(title.as_str());
    let started = Instant::now();

    match state.pipeline().run(&title).await {
        Ok(outcome) => {
            metrics::proposal_completed(
                &outcome.run_id,
                started.elapsed().as_millis(),
                outcome.result.len(),
            );
            Ok(Json(outcome))
        }
        Err(err) => {
            metrics::proposal_failed(started.elapsed().as_millis(), &format!("{err:#}"));
            Err(AppError::from(err))
        }
    }
}
