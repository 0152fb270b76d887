use crate::llm::{ChatModel, OpenAiCompatibleClient};
use crate::roster::ROSTER;
use crate::search::{InternetSearchTool, SerperClient};
use crate::tasks::{
    PIPELINE_CONTEXT_KEY, PIPELINE_TRACE_KEY, PipelineContext, ResearchTitle, Stage, StageOutput,
    StageTask,
};
use crate::trace::{TraceCollector, TraceEvent};
use crate::Secrets;
use anyhow::{Result, anyhow};
use graph_flow::{
    ExecutionStatus, FlowRunner, Graph, GraphBuilder, GraphError, InMemorySessionStorage,
    Session, SessionStorage, Task,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Result of one complete run. `result` is the final stage's text, unchanged.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub run_id: String,
    pub result: String,
    pub stages: Vec<StageOutput>,
    pub trace: Vec<TraceEvent>,
}

/// The seven-stage proposal pipeline. Holds only immutable, shareable
/// collaborators; every [`run`](Self::run) builds a fresh graph and session.
#[derive(Clone)]
pub struct ProposalPipeline {
    model: Arc<dyn ChatModel>,
    search: InternetSearchTool,
}

impl ProposalPipeline {
    pub fn new(model: Arc<dyn ChatModel>, search: InternetSearchTool) -> Self {
        Self { model, search }
    }

    /// Wire the production model and search clients from loaded secrets.
    pub fn from_secrets(secrets: &Secrets) -> Result<Self> {
        let model: Arc<dyn ChatModel> = Arc::new(OpenAiCompatibleClient::from_secrets(secrets)?);
        let search = InternetSearchTool::new(Arc::new(SerperClient::from_secrets(secrets)?));
        Ok(Self::new(model, search))
    }

    pub fn model_id(&self) -> &str {
        self.model.model_id()
    }

    fn build_graph(&self) -> (Arc<Graph>, Vec<Arc<StageTask>>) {
        let last = ROSTER.len() - 1;
        let tasks: Vec<Arc<StageTask>> = ROSTER
            .iter()
            .enumerate()
            .map(|(idx, descriptor)| {
                let stage = Stage::new(descriptor, self.model.clone(), Some(self.search.clone()));
                Arc::new(StageTask::new(stage, idx == last))
            })
            .collect();

        let mut builder = GraphBuilder::new("proposal_pipeline");
        for task in &tasks {
            builder = builder.add_task(task.clone());
        }
        for pair in tasks.windows(2) {
            builder = builder.add_edge(pair[0].id(), pair[1].id());
        }
        let builder = builder.set_start_task(tasks[0].id());

        (Arc::new(builder.build()), tasks)
    }

    /// Run all stages in order for `title`.
    ///
    /// The first failing stage aborts the run; its error is returned and no
    /// later stage executes.
    #[instrument(name = "pipeline.run", skip(self), fields(title = %title))]
    pub async fn run(&self, title: &ResearchTitle) -> Result<PipelineOutcome> {
        let (graph, tasks) = self.build_graph();

        let storage = Arc::new(InMemorySessionStorage::new());
        let runner = FlowRunner::new(graph, storage.clone());

        let run_id = Uuid::new_v4().to_string();
        let session = Session::new_from_task(run_id.clone(), tasks[0].id());
        session
            .context
            .set(PIPELINE_CONTEXT_KEY, PipelineContext::new(title.clone()))
            .await;
        session
            .context
            .set(PIPELINE_TRACE_KEY, TraceCollector::new())
            .await;

        storage
            .save(session)
            .await
            .map_err(|err| anyhow!("failed to persist session: {err}"))?;

        info!(%run_id, stages = tasks.len(), "pipeline started");

        loop {
            let result = runner.run(&run_id).await.map_err(abort_reason)?;

            match result.status {
                ExecutionStatus::Completed => break,
                ExecutionStatus::Error(message) => {
                    return Err(anyhow!("pipeline aborted: {message}"));
                }
                _ => continue,
            }
        }

        let session = storage
            .get(&run_id)
            .await
            .map_err(|err| anyhow!("failed to reload session: {err}"))?
            .ok_or_else(|| anyhow!("session missing after execution"))?;

        let pipeline: PipelineContext = session
            .context
            .get(PIPELINE_CONTEXT_KEY)
            .await
            .ok_or_else(|| anyhow!("pipeline context missing after execution"))?;
        let trace: TraceCollector = session
            .context
            .get(PIPELINE_TRACE_KEY)
            .await
            .unwrap_or_default();

        if pipeline.outputs.len() != ROSTER.len() {
            return Err(anyhow!(
                "pipeline ended after {} of {} stages",
                pipeline.outputs.len(),
                ROSTER.len()
            ));
        }

        let result = pipeline
            .outputs
            .last()
            .map(|output| output.text.clone())
            .unwrap_or_default();

        info!(%run_id, chars = result.len(), "pipeline completed");

        Ok(PipelineOutcome {
            run_id,
            result,
            stages: pipeline.outputs,
            trace: trace.into_events(),
        })
    }
}

/// The detail of a task failure already names the task; drop the variant prefix.
fn abort_reason(err: GraphError) -> anyhow::Error {
    match err {
        GraphError::TaskExecutionFailed(detail) => anyhow!("pipeline aborted: {detail}"),
        other => anyhow!("pipeline aborted: {other}"),
    }
}
