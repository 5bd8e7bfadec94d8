//! Recursive research orchestration.
//!
//! One level of research plans up to `breadth` queries, then runs a branch
//! per query concurrently. Each branch searches, extracts learnings, and
//! recurses one level shallower on its follow-up questions with half the
//! breadth. Branches never share state: each returns its own [`Research`],
//! and the level folds them into the caller's accumulator once every branch
//! has finished.
//!
//! ```text
//!             research(prompt, depth, breadth)
//!                        │
//!                      plan
//!            ┌───────────┼───────────┐
//!            ▼           ▼           ▼
//!         branch      branch      branch     search → extract → recurse
//!            └───────────┼───────────┘
//!                     join_all
//!                        │
//!              merge in query order
//! ```

use std::sync::Arc;
use std::time::Duration;

use delve_core::error::ResearchError;
use delve_core::progress::ProgressReporter;
use delve_core::research::{Query, Research, Source};
use delve_core::search::{SearchOptions, SearchProvider};
use futures::future::{BoxFuture, FutureExt, join_all};
use tracing::{debug, info};

use crate::extractor::LearningExtractor;
use crate::generate::Generator;
use crate::planner::QueryPlanner;
use crate::prompts;

const DEFAULT_MAX_LEARNINGS: usize = 3;

/// Breadth used one level down: half, rounded up, never below one.
pub fn child_breadth(breadth: usize) -> usize {
    breadth.div_ceil(2).max(1)
}

pub struct ResearchOrchestrator {
    planner: QueryPlanner,
    extractor: LearningExtractor,
    search: Arc<dyn SearchProvider>,
    search_options: SearchOptions,
    max_learnings: usize,
    source_pace: Duration,
}

impl ResearchOrchestrator {
    pub fn new(generator: Generator, search: Arc<dyn SearchProvider>) -> Self {
        Self {
            planner: QueryPlanner::new(generator.clone()),
            extractor: LearningExtractor::new(generator),
            search,
            search_options: SearchOptions::default(),
            max_learnings: DEFAULT_MAX_LEARNINGS,
            source_pace: Duration::ZERO,
        }
    }

    pub fn with_search_options(mut self, options: SearchOptions) -> Self {
        self.search_options = options;
        self
    }

    pub fn with_max_learnings(mut self, max_learnings: usize) -> Self {
        self.max_learnings = max_learnings;
        self
    }

    /// Delay between consecutive source events of one branch.
    pub fn with_source_pace(mut self, pace: Duration) -> Self {
        self.source_pace = pace;
        self
    }

    /// Research `prompt` to `depth` levels and fold the findings into
    /// `accumulator`.
    ///
    /// A failure in any branch fails the whole call, but only after every
    /// sibling branch has finished; nothing gathered so far is returned.
    pub fn research<'a>(
        &'a self,
        prompt: &'a str,
        depth: usize,
        breadth: usize,
        accumulator: Research,
        reporter: &'a ProgressReporter,
    ) -> BoxFuture<'a, Result<Research, ResearchError>> {
        async move {
            if depth == 0 {
                return Ok(accumulator);
            }

            reporter.status(format!("Generating search queries for \"{prompt}\""));
            let queries = self
                .planner
                .plan(prompt, breadth, &accumulator.learnings)
                .await?;
            reporter.status(format!("Generated search queries for \"{prompt}\""));

            info!(depth, breadth, queries = queries.len(), "Researching level");

            let branches = queries
                .into_iter()
                .map(|query| self.branch(query, depth, breadth, reporter));
            let results = join_all(branches).await;

            let mut accumulator = accumulator;
            for result in results {
                accumulator.merge(result?);
            }

            debug!(
                depth,
                learnings = accumulator.learnings.len(),
                sources = accumulator.sources.len(),
                "Level complete"
            );
            Ok(accumulator)
        }
        .boxed()
    }

    async fn branch(
        &self,
        query: Query,
        depth: usize,
        breadth: usize,
        reporter: &ProgressReporter,
    ) -> Result<Research, ResearchError> {
        // ── Search ──
        reporter.status(format!("Searching the web for \"{}\"", query.text));
        let sources = self
            .search
            .search(&query.text, &self.search_options)
            .await
            .map_err(|source| ResearchError::Search {
                query: query.text.clone(),
                source,
            })?;
        self.announce_sources(&sources, reporter).await;

        // ── Extract ──
        reporter.status(format!("Analyzing search results for \"{}\"", query.text));
        let extraction = self
            .extractor
            .extract(&query.text, &sources, self.max_learnings, breadth)
            .await?;

        // ── Recurse ──
        let next_prompt = prompts::next_prompt(&query.research_goal, &extraction.follow_up_questions);
        let headline = extraction
            .follow_up_questions
            .iter()
            .take(3)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        reporter.status(format!("Diving deeper to understand \"{headline}\""));

        let child = self
            .research(
                &next_prompt,
                depth - 1,
                child_breadth(breadth),
                Research::new(),
                reporter,
            )
            .await?;
        self.announce_sources(&child.sources, reporter).await;

        let mut research = Research {
            learnings: extraction.learnings,
            sources,
            questions_explored: extraction.follow_up_questions,
            search_queries: vec![query.text],
        };
        research.merge(child);
        Ok(research)
    }

    async fn announce_sources(&self, sources: &[Source], reporter: &ProgressReporter) {
        for (i, source) in sources.iter().enumerate() {
            if i > 0 && !self.source_pace.is_zero() {
                tokio::time::sleep(self.source_pace).await;
            }
            reporter.source(source);
        }
    }
}
