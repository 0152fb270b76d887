//! The fixed agent roster and its one-to-one task list.
//!
//! Order of [`ROSTER`] is the pipeline order.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolRef {
    InternetSearch,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct AgentDescriptor {
    pub role: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
    pub tools: &'static [ToolRef],
    pub verbose: bool,
}

impl AgentDescriptor {
    pub fn uses(&self, tool: ToolRef) -> bool {
        self.tools.contains(&tool)
    }
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct TaskDescriptor {
    pub id: &'static str,
    pub description: &'static str,
    pub expected_output: &'static str,
    pub agent: &'static AgentDescriptor,
}

pub static KEYWORD_EXTRACTOR: AgentDescriptor = AgentDescriptor {
    role: "Keyword Extractor",
    goal: "Extract 10 most relevant keywords based on the research title",
    backstory: "Expert in keyword extraction using natural language processing techniques.",
    tools: &[],
    verbose: true,
};

pub static INTERNET_RESEARCHER: AgentDescriptor = AgentDescriptor {
    role: "Internet Researcher",
    goal: "Perform internet search using extracted keywords and extract top 3 relevant links for each keyword",
    backstory: "Skilled in performing comprehensive internet searches and filtering relevant information.",
    tools: &[ToolRef::InternetSearch],
    verbose: true,
};

pub static CONTENT_SUMMARIZER: AgentDescriptor = AgentDescriptor {
    role: "Content Summarizer",
    goal: "Summarize the content of each link in relation to the user-provided research title",
    backstory: "Proficient in summarizing web content effectively and efficiently.",
    tools: &[],
    verbose: true,
};

pub static LITERATURE_REVIEWER: AgentDescriptor = AgentDescriptor {
    role: "Literature Reviewer",
    goal: "Perform a comprehensive literature review and write the literature review section",
    backstory: "Expert in academic writing and literature review.",
    tools: &[],
    verbose: true,
};

pub static INTRODUCTION_WRITER: AgentDescriptor = AgentDescriptor {
    role: "Introduction Writer",
    goal: "Write the introduction section for the medical research proposal",
    backstory: "Experienced in writing engaging and informative introduction sections for research proposals.",
    tools: &[],
    verbose: true,
};

pub static METHODOLOGY_WRITER: AgentDescriptor = AgentDescriptor {
    role: "Methodology Writer",
    goal: "Write the methodology section based on the literature review and introduction",
    backstory: "Skilled in writing detailed and clear methodology sections for research proposals.",
    tools: &[],
    verbose: true,
};

pub static STATISTICAL_METHODS_WRITER: AgentDescriptor = AgentDescriptor {
    role: "Statistical Methods Writer",
    goal: "Write the statistical methods section, performing all necessary calculations and explanations",
    backstory: "Proficient in statistical analysis and writing detailed statistical methods.",
    tools: &[],
    verbose: true,
};

pub static ROSTER: [TaskDescriptor; 7] = [
    TaskDescriptor {
        id: "extract_keywords",
        description: "Extract the 10 most relevant keywords based on the research title provided by the user.",
        expected_output: "A list of 10 relevant keywords for performing a literature search.",
        agent: &KEYWORD_EXTRACTOR,
    },
    TaskDescriptor {
        id: "internet_search",
        description: "Perform an internet search using the extracted keywords, extract the top 3 most relevant links for each keyword, and ensure at least 30 unique links.",
        expected_output: "A list of at least 30 unique links relevant to the research title.",
        agent: &INTERNET_RESEARCHER,
    },
    TaskDescriptor {
        id: "summarize_content",
        description: "Summarize the content of each link in relation to the user-provided research title.",
        expected_output: "A list of summarized contents for each link.",
        agent: &CONTENT_SUMMARIZER,
    },
    TaskDescriptor {
        id: "write_literature_review",
        description: "Perform a comprehensive literature review based on the user-provided research title and write the literature review section, including a numbered list of references.",
        expected_output: "A complete literature review section with a numbered list of references.",
        agent: &LITERATURE_REVIEWER,
    },
    TaskDescriptor {
        id: "write_introduction",
        description: "Write the introduction section for the medical research proposal based on the research title and literature review, including a numbered list of references.",
        expected_output: "A complete introduction section with a numbered list of references.",
        agent: &INTRODUCTION_WRITER,
    },
    TaskDescriptor {
        id: "write_methodology",
        description: "Write the methodology section based on the literature review and introduction, including a numbered list of references.",
        expected_output: "A complete methodology section with a numbered list of references.",
        agent: &METHODOLOGY_WRITER,
    },
    TaskDescriptor {
        id: "write_statistical_methods",
        description: "Write the statistical methods section, performing all necessary calculations step-by-step and explaining each step in detail, including a numbered list of references.",
        expected_output: "A complete statistical methods section with a numbered list of references.",
        agent: &STATISTICAL_METHODS_WRITER,
    },
];

/// Minimum number of distinct links the search stage is asked to gather.
pub const MIN_UNIQUE_LINKS: usize = 30;

/// Number of keywords the extraction stage is asked to produce.
pub const KEYWORD_COUNT: usize = 10;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn roster_order_is_fixed() {
        let ids: Vec<_> = ROSTER.iter().map(|task| task.id).collect();
        assert_eq!(
            ids,
            [
                "extract_keywords",
                "internet_search",
                "summarize_content",
                "write_literature_review",
                "write_introduction",
                "write_methodology",
                "write_statistical_methods",
            ]
        );
    }

    #[test]
    fn each_task_has_its_own_agent() {
        let roles: HashSet<_> = ROSTER.iter().map(|task| task.agent.role).collect();
        assert_eq!(roles.len(), ROSTER.len());
    }

    #[test]
    fn only_the_researcher_searches() {
        let searching: Vec<_> = ROSTER
            .iter()
            .filter(|task| task.agent.uses(ToolRef::InternetSearch))
            .map(|task| task.id)
            .collect();
        assert_eq!(searching, ["internet_search"]);
    }
}
