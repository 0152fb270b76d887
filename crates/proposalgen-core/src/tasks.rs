use std::fmt::{self, Write as _};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use graph_flow::{Context, GraphError, NextAction, Task, TaskResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::keywords::parse_keywords;
use crate::llm::{ChatMessage, ChatModel};
use crate::roster::{MIN_UNIQUE_LINKS, TaskDescriptor, ToolRef};
use crate::search::{InternetSearchTool, SearchResults, unique_link_count};
use crate::trace::TraceCollector;
use crate::ProposalError;

/// Context key holding the [`PipelineContext`] of a run.
pub const PIPELINE_CONTEXT_KEY: &str = "pipeline.context";
/// Context key holding the run's [`TraceCollector`].
pub const PIPELINE_TRACE_KEY: &str = "pipeline.trace";

pub const EMPTY_TITLE_MESSAGE: &str = "Please enter a research title";

const VERBOSE_PREVIEW_CHARS: usize = 240;

/// The single user-supplied input: trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResearchTitle(String);

impl ResearchTitle {
    pub fn parse(raw: &str) -> Result<Self, ProposalError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ProposalError::InvalidTitle(EMPTY_TITLE_MESSAGE.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResearchTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageOutput {
    pub stage_id: String,
    pub role: String,
    pub text: String,
}

/// Title plus every stage output produced so far, in pipeline order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineContext {
    pub title: ResearchTitle,
    pub outputs: Vec<StageOutput>,
}

impl PipelineContext {
    pub fn new(title: ResearchTitle) -> Self {
        Self {
            title,
            outputs: Vec::new(),
        }
    }
}

/// One agent bound to its task, ready to be invoked.
pub struct Stage {
    task: &'static TaskDescriptor,
    model: Arc<dyn ChatModel>,
    search: Option<InternetSearchTool>,
}

impl Stage {
    /// The search tool is only kept when the stage's agent is equipped with it.
    pub fn new(
        task: &'static TaskDescriptor,
        model: Arc<dyn ChatModel>,
        search: Option<InternetSearchTool>,
    ) -> Self {
        let search = search.filter(|_| task.agent.uses(ToolRef::InternetSearch));
        Self {
            task,
            model,
            search,
        }
    }

    pub fn id(&self) -> &'static str {
        self.task.id
    }

    pub fn descriptor(&self) -> &'static TaskDescriptor {
        self.task
    }

    /// Run this stage against the title and all prior outputs.
    pub async fn perform(&self, title: &ResearchTitle, prior: &[StageOutput]) -> Result<StageOutput> {
        let observations = if self.task.agent.uses(ToolRef::InternetSearch) {
            Some(self.gather_search_results(title, prior).await?)
        } else {
            None
        };

        let messages = build_messages(self.task, title, prior, observations.as_deref());
        let text = self.model.complete(&messages).await?;

        Ok(StageOutput {
            stage_id: self.task.id.to_string(),
            role: self.task.agent.role.to_string(),
            text,
        })
    }

    async fn gather_search_results(
        &self,
        title: &ResearchTitle,
        prior: &[StageOutput],
    ) -> Result<String> {
        let tool = self.search.as_ref().ok_or_else(|| {
            anyhow!(
                "agent `{}` requires the internet search tool",
                self.task.agent.role
            )
        })?;

        let mut queries = prior
            .last()
            .map(|output| parse_keywords(&output.text))
            .unwrap_or_default();
        if queries.is_empty() {
            warn!(stage = self.task.id, "no keywords found; searching for the title");
            queries.push(title.to_string());
        }

        let mut results = Vec::with_capacity(queries.len());
        for query in &queries {
            results.push(tool.search(query).await?);
        }

        let unique_links = unique_link_count(results.iter());
        if unique_links < MIN_UNIQUE_LINKS {
            warn!(
                stage = self.task.id,
                unique_links,
                required = MIN_UNIQUE_LINKS,
                "search gathered fewer unique links than requested"
            );
        }
        debug!(queries = queries.len(), unique_links, "search observations gathered");

        Ok(render_observations(&queries, &results))
    }
}

/// Build the system and user prompt for one stage.
pub fn build_messages(
    task: &TaskDescriptor,
    title: &ResearchTitle,
    prior: &[StageOutput],
    observations: Option<&str>,
) -> Vec<ChatMessage> {
    let agent = task.agent;
    let system = format!(
        "You are {}. {}\nYour personal goal is: {}",
        agent.role, agent.backstory, agent.goal
    );

    let mut user = format!(
        "Current Task: {}\n\nThis is the expected criteria for your final answer: {}\n\
         You MUST return the actual complete content as the final answer, not a summary.\n\n\
         Research title: {}\n",
        task.description, task.expected_output, title
    );

    if !prior.is_empty() {
        user.push_str("\nThis is the context you're working with:\n");
        for output in prior {
            let _ = write!(user, "\n### {} ({})\n{}\n", output.role, output.stage_id, output.text);
        }
    }

    if let Some(observations) = observations {
        user.push_str("\nResults from the internet search tool:\n");
        user.push_str(observations);
    }

    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

fn render_observations(queries: &[String], results: &[SearchResults]) -> String {
    let mut output = String::new();
    for (query, result) in queries.iter().zip(results) {
        let _ = writeln!(output, "\nQuery: {query}");
        if result.organic.is_empty() {
            output.push_str("  (no results)\n");
            continue;
        }
        for (idx, hit) in result.organic.iter().enumerate() {
            let _ = writeln!(output, "  {}. {}\n     {}", idx + 1, hit.title, hit.link);
            if !hit.snippet.is_empty() {
                let _ = writeln!(output, "     {}", hit.snippet);
            }
        }
    }
    output
}

/// `graph_flow` adapter: moves the [`PipelineContext`] in and out of the
/// session context around a [`Stage::perform`] call.
pub struct StageTask {
    stage: Stage,
    is_last: bool,
}

impl StageTask {
    pub fn new(stage: Stage, is_last: bool) -> Self {
        Self { stage, is_last }
    }
}

#[async_trait]
impl Task for StageTask {
    fn id(&self) -> &str {
        self.stage.id()
    }

    #[instrument(name = "task.stage", skip(self, context))]
    async fn run(&self, context: Context) -> graph_flow::Result<TaskResult> {
        let stage_id = self.stage.id();
        let agent = self.stage.descriptor().agent;

        let mut pipeline: PipelineContext = context
            .get(PIPELINE_CONTEXT_KEY)
            .await
            .ok_or_else(|| GraphError::ContextError("pipeline context missing".to_string()))?;
        let mut trace: TraceCollector = context.get(PIPELINE_TRACE_KEY).await.unwrap_or_default();

        info!(stage = stage_id, role = agent.role, prior_outputs = pipeline.outputs.len(), "stage started");
        let started = Instant::now();

        let output = self
            .stage
            .perform(&pipeline.title, &pipeline.outputs)
            .await
            .map_err(|err| {
                warn!(stage = stage_id, error = %format!("{err:#}"), "stage failed");
                GraphError::Other(err)
            })?;

        let elapsed_ms = started.elapsed().as_millis();
        if agent.verbose {
            let preview: String = output.text.chars().take(VERBOSE_PREVIEW_CHARS).collect();
            info!(role = agent.role, elapsed_ms, chars = output.text.len(), %preview, "stage completed");
        }
        trace.record(
            stage_id,
            format!("{} completed in {elapsed_ms} ms ({} chars)", agent.role, output.text.len()),
        );

        pipeline.outputs.push(output);
        context.set(PIPELINE_CONTEXT_KEY, &pipeline).await;
        context.set(PIPELINE_TRACE_KEY, &trace).await;

        let next = if self.is_last {
            NextAction::End
        } else {
            NextAction::ContinueAndExecute
        };

        Ok(TaskResult::new(
            Some(format!("{} finished", agent.role)),
            next,
        ))
    }
}
