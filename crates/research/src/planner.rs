//! Query planning: turn a research prompt into a bounded list of search
//! queries, each with the goal it serves.

use chrono::Utc;
use delve_core::error::{GenerationError, ResearchError};
use delve_core::research::Query;
use serde::Deserialize;
use tracing::debug;

use crate::generate::Generator;
use crate::prompts;

#[derive(Debug, Deserialize)]
struct PlannedQueries {
    queries: Vec<Query>,
}

pub struct QueryPlanner {
    generator: Generator,
}

impl QueryPlanner {
    pub fn new(generator: Generator) -> Self {
        Self { generator }
    }

    /// Plan at most `breadth` queries for `prompt`, sharpened by any
    /// learnings from earlier research.
    pub async fn plan(
        &self,
        prompt: &str,
        breadth: usize,
        learnings: &[String],
    ) -> Result<Vec<Query>, ResearchError> {
        let planned: PlannedQueries = self
            .generator
            .generate_object(
                &prompts::system_prompt(Utc::now()),
                &prompts::plan_prompt(prompt, breadth, learnings),
                "search_queries",
                prompts::plan_schema(breadth),
            )
            .await
            .map_err(ResearchError::Planning)?;

        let mut queries = planned.queries;

        if queries.is_empty() {
            return Err(ResearchError::Planning(GenerationError::Schema(
                "search_queries: no queries returned".into(),
            )));
        }

        if queries.iter().any(|q| q.text.trim().is_empty()) {
            return Err(ResearchError::Planning(GenerationError::Schema(
                "search_queries: blank query text".into(),
            )));
        }

        if queries.len() > breadth {
            debug!(returned = queries.len(), breadth, "Truncating planned queries");
            queries.truncate(breadth);
        }

        Ok(queries)
    }
}
