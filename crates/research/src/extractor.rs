//! Learning extraction: distill the pages found for one query into a few
//! dense learnings and the questions worth chasing next.

use std::collections::HashSet;

use chrono::Utc;
use delve_core::error::{GenerationError, ResearchError};
use delve_core::research::Source;
use serde::Deserialize;
use tracing::debug;

use crate::generate::Generator;
use crate::prompts;

/// What one query taught us.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    pub learnings: Vec<String>,
    pub follow_up_questions: Vec<String>,
}

pub struct LearningExtractor {
    generator: Generator,
}

impl LearningExtractor {
    pub fn new(generator: Generator) -> Self {
        Self { generator }
    }

    pub async fn extract(
        &self,
        query: &str,
        sources: &[Source],
        max_learnings: usize,
        max_follow_ups: usize,
    ) -> Result<Extraction, ResearchError> {
        let fail = |source: GenerationError| ResearchError::Extraction {
            query: query.to_string(),
            source,
        };

        let raw: Extraction = self
            .generator
            .generate_object(
                &prompts::system_prompt(Utc::now()),
                &prompts::learnings_prompt(query, sources, max_learnings),
                "learnings",
                prompts::learnings_schema(max_learnings, max_follow_ups),
            )
            .await
            .map_err(fail)?;

        let extraction = Extraction {
            learnings: distinct_non_blank(raw.learnings, max_learnings),
            follow_up_questions: raw
                .follow_up_questions
                .into_iter()
                .filter(|q| !q.trim().is_empty())
                .take(max_follow_ups)
                .collect(),
        };

        if extraction.learnings.is_empty() && extraction.follow_up_questions.is_empty() {
            return Err(fail(GenerationError::Schema(
                "learnings: no learnings or follow-up questions returned".into(),
            )));
        }

        debug!(
            query,
            learnings = extraction.learnings.len(),
            follow_ups = extraction.follow_up_questions.len(),
            "Extracted learnings"
        );
        Ok(extraction)
    }
}

fn distinct_non_blank(items: Vec<String>, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| !item.trim().is_empty())
        .filter(|item| seen.insert(item.clone()))
        .take(limit)
        .collect()
}
