use std::time::Instant;

use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use proposalgen_core::ResearchTitle;
use serde::Deserialize;
use tracing::{error, instrument};

use crate::metrics;
use crate::state::AppState;
use crate::views::{Panel, render_page};

#[derive(Debug, Deserialize)]
pub struct ProposalForm {
    #[serde(default)]
    pub research_title: String,
}

pub fn form_router() -> Router<AppState> {
    Router::new().route("/", get(show_form).post(submit_form))
}

async fn show_form() -> Html<String> {
    Html(render_page("", Panel::Empty))
}

/// Runs the whole pipeline before answering; the page stays pending until
/// the final stage has finished or one has failed.
#[instrument(skip_all)]
async fn submit_form(State(state): State<AppState>, Form(form): Form<ProposalForm>) -> Response {
    let title = match ResearchTitle::parse(&form.research_title) {
        Ok(title) => title,
        Err(err) => {
            let message = err.to_string();
            metrics::proposal_rejected(&message);
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(render_page(&form.research_title, Panel::Validation(&message))),
            )
                .into_response();
        }
    };

    metrics::proposal_started(title.as_str());
    let started = Instant::now();

    match state.pipeline().run(&title).await {
        Ok(outcome) => {
            metrics::proposal_completed(
                &outcome.run_id,
                started.elapsed().as_millis(),
                outcome.result.len(),
            );
            Html(render_page(title.as_str(), Panel::Result(&outcome))).into_response()
        }
        Err(err) => {
            let message = format!("{err:#}");
            error!(error = %message, "proposal generation failed");
            metrics::proposal_failed(started.elapsed().as_millis(), &message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render_page(title.as_str(), Panel::Failure(&message))),
            )
                .into_response()
        }
    }
}
