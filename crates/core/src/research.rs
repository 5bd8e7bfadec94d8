//! Research data model: sources, planned queries, and the accumulator.
//!
//! The accumulator is plain data. The orchestrator builds one per branch and
//! folds completed branches into the parent with [`Research::merge`].

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A single fetched web page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub title: String,

    /// Unique key of a source
    pub url: String,

    pub content: String,

    #[serde(default)]
    pub published_date: String,

    #[serde(default)]
    pub favicon: String,
}

impl Source {
    /// A copy of this source with `content` cut to `max_chars` characters.
    pub fn with_content_limit(&self, max_chars: usize) -> Self {
        Self {
            content: truncate_chars(&self.content, max_chars).to_string(),
            ..self.clone()
        }
    }

    /// A copy suitable for a response payload: content cut to `max_chars`
    /// characters followed by `...`.
    pub fn preview(&self, max_chars: usize) -> Self {
        Self {
            content: format!("{}...", truncate_chars(&self.content, max_chars)),
            ..self.clone()
        }
    }
}

/// A planned search query and the goal it serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    #[serde(rename = "query")]
    pub text: String,
    pub research_goal: String,
}

/// Merged research state produced by a subtree of the traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Research {
    pub learnings: Vec<String>,
    pub sources: Vec<Source>,
    pub questions_explored: Vec<String>,
    pub search_queries: Vec<String>,
}

impl Research {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.learnings.is_empty()
            && self.sources.is_empty()
            && self.questions_explored.is_empty()
            && self.search_queries.is_empty()
    }

    /// Append everything from `other`, keeping order on both sides.
    pub fn merge(&mut self, other: Research) {
        self.learnings.extend(other.learnings);
        self.sources.extend(other.sources);
        self.questions_explored.extend(other.questions_explored);
        self.search_queries.extend(other.search_queries);
    }

    /// Sources with duplicate URLs removed.
    ///
    /// Each URL keeps the position where it was first seen, but holds the
    /// record of its latest occurrence.
    pub fn distinct_sources(&self) -> Vec<Source> {
        let mut slots: HashMap<&str, usize> = HashMap::new();
        let mut distinct: Vec<Source> = Vec::new();
        for source in &self.sources {
            match slots.get(source.url.as_str()) {
                Some(&slot) => distinct[slot] = source.clone(),
                None => {
                    slots.insert(source.url.as_str(), distinct.len());
                    distinct.push(source.clone());
                }
            }
        }
        distinct
    }

    /// Number of distinct source URLs.
    pub fn distinct_url_count(&self) -> usize {
        self.sources
            .iter()
            .map(|s| s.url.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// The synthesized narrative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchReport {
    /// Markdown body
    pub report: String,
    pub title: String,
}

/// The payload returned to a deep-research caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepResearchOutput {
    pub report: ResearchReport,
    pub research: Research,
}

/// Cut `s` to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
