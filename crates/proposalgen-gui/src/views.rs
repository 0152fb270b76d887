//! Server-rendered HTML for the proposal form.

use proposalgen_core::{PipelineOutcome, TraceSummary};

pub const PAGE_TITLE: &str = "Medical Research Proposal Generator";
pub const INPUT_LABEL: &str = "Enter your research title:";
pub const SUBMIT_LABEL: &str = "Generate Proposal";

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:52rem;margin:2rem auto;padding:0 1rem}\
label{display:block;margin-bottom:.4rem}\
input[type=text]{width:100%;padding:.5rem;box-sizing:border-box}\
button{margin-top:.8rem;padding:.5rem 1rem}\
.error{color:#b00020;font-weight:600}\
pre{white-space:pre-wrap;background:#f6f6f6;padding:1rem}";

/// What to show beneath the form.
pub enum Panel<'a> {
    Empty,
    Validation(&'a str),
    Result(&'a PipelineOutcome),
    Failure(&'a str),
}

pub fn render_page(title_value: &str, panel: Panel<'_>) -> String {
    let body = match panel {
        Panel::Empty => String::new(),
        Panel::Validation(message) => {
            format!("<p class=\"error\" role=\"alert\">{}</p>", escape_html(message))
        }
        Panel::Result(outcome) => render_result(outcome),
        Panel::Failure(message) => format!(
            "<section class=\"failure\"><p class=\"error\" role=\"alert\">Proposal generation failed</p><pre>{}</pre></section>",
            escape_html(message)
        ),
    };

    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{PAGE_TITLE}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n<main>\n\
         <h1>{PAGE_TITLE}</h1>\n\
         <form method=\"post\" action=\"/\">\n\
         <label for=\"research_title\">{INPUT_LABEL}</label>\n\
         <input id=\"research_title\" name=\"research_title\" type=\"text\" value=\"{}\">\n\
         <button type=\"submit\">{SUBMIT_LABEL}</button>\n\
         </form>\n{body}\n</main>\n</body>\n</html>\n",
        escape_html(title_value)
    )
}

fn render_result(outcome: &PipelineOutcome) -> String {
    let trace = TraceSummary::from_events(&outcome.trace).render_markdown();
    format!(
        "<section class=\"result\" data-run-id=\"{}\">\n<pre>{}</pre>\n</section>\n\
         <details>\n<summary>Pipeline trace</summary>\n<pre>{}</pre>\n</details>",
        escape_html(&outcome.run_id),
        escape_html(&outcome.result),
        escape_html(&trace)
    )
}

pub fn escape_html(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#39;"),
            other => output.push(other),
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn form_keeps_submitted_value_and_message() {
        let page = render_page("  ", Panel::Validation("Please enter a research title"));
        assert!(page.contains(INPUT_LABEL));
        assert!(page.contains(SUBMIT_LABEL));
        assert!(page.contains("value=\"  \""));
        assert!(page.contains("role=\"alert\">Please enter a research title</p>"));
    }
}
