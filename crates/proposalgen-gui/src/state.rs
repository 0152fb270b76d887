use proposalgen_core::{ProposalPipeline, Secrets};

/// Shared, immutable service state. Built once at start; each request runs
/// its own isolated pipeline invocation.
#[derive(Clone)]
pub struct AppState {
    pipeline: ProposalPipeline,
}

impl AppState {
    pub fn new(pipeline: ProposalPipeline) -> Self {
        Self { pipeline }
    }

    pub fn from_secrets(secrets: &Secrets) -> anyhow::Result<Self> {
        Ok(Self::new(ProposalPipeline::from_secrets(secrets)?))
    }

    pub fn pipeline(&self) -> &ProposalPipeline {
        &self.pipeline
    }
}
