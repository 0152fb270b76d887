//! ProposalGen core: a fixed seven-stage agent pipeline built on `graph_flow`.
//!
//! A research title goes in; keyword extraction, web search, summarisation
//! and four writing stages run in order, each seeing every earlier output;
//! the statistical methods section comes out.

mod config;
mod error;
mod keywords;
mod llm;
mod roster;
mod search;
mod security;
mod tasks;
mod telemetry;
mod trace;
mod workflow;

pub use config::{MODEL_API_KEY, MODEL_ENDPOINT, SEARCH_API_KEY, Secrets, SecretsLoader};
pub use error::ProposalError;
pub use keywords::parse_keywords;
pub use llm::{ChatMessage, ChatModel, ChatRole, MODEL_ID, OpenAiCompatibleClient, REQUEST_TIMEOUT};
pub use roster::{AgentDescriptor, KEYWORD_COUNT, MIN_UNIQUE_LINKS, ROSTER, TaskDescriptor, ToolRef};
pub use search::{
    InternetSearchTool, RESULTS_PER_QUERY, SearchHit, SearchProvider, SearchResults,
    SerperClient, unique_link_count,
};
pub use security::SecretValue;
pub use tasks::{
    EMPTY_TITLE_MESSAGE, PipelineContext, ResearchTitle, Stage, StageOutput, build_messages,
};
pub use telemetry::{TelemetryOptions, init_telemetry};
pub use trace::{TraceCollector, TraceEvent, TraceStep, TraceSummary};
pub use workflow::{PipelineOutcome, ProposalPipeline};
