use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::roster::KEYWORD_COUNT;

static LIST_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[-*•+]|\(?\d{1,2}[.):])\s*").expect("invalid list marker regex")
});

/// Pull the keyword list out of the extraction stage's free text.
///
/// When the reply contains a numbered or bulleted list, only the list items
/// count; surrounding prose is ignored. Otherwise a single comma-separated
/// line (optionally led by a `Label:` prefix) or one keyword per line is
/// accepted. Lines ending in `:` are treated as headings. At most
/// [`KEYWORD_COUNT`] keywords are returned, duplicates removed.
pub fn parse_keywords(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.ends_with(':'))
        .collect();

    let listed: Vec<&str> = lines
        .iter()
        .copied()
        .filter(|line| LIST_MARKER.is_match(line))
        .collect();

    let candidates: Vec<String> = if !listed.is_empty() {
        listed.into_iter().map(clean).collect()
    } else {
        match lines.as_slice() {
            [single] if single.contains(',') => {
                strip_label(single).split(',').map(clean).collect()
            }
            _ => lines.iter().map(|line| clean(line)).collect(),
        }
    };

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|keyword| !keyword.is_empty())
        .filter(|keyword| seen.insert(keyword.to_lowercase()))
        .take(KEYWORD_COUNT)
        .collect()
}

/// Drop a leading `Keywords:`-style label from a comma-separated line.
fn strip_label(line: &str) -> &str {
    match line.split_once(':') {
        Some((label, rest)) if !label.contains(',') => rest,
        _ => line,
    }
}

fn clean(raw: &str) -> String {
    let stripped = LIST_MARKER.replace(raw, "");
    stripped
        .trim()
        .trim_matches(|c| matches!(c, '*' | '"' | '\'' | '`' | '.'))
        .trim()
        .to_string()
}
