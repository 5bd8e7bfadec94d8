//! The research engine behind Delve.
//!
//! A deep research run is **Plan → Search → Learn → Recurse → Report**:
//!
//! 1. **Plan** search queries for the prompt ([`QueryPlanner`])
//! 2. **Search** the web for each query, concurrently
//! 3. **Learn** from the pages found ([`LearningExtractor`])
//! 4. **Recurse** on the follow-up questions with less depth and breadth
//!    ([`ResearchOrchestrator`])
//! 5. **Report**: synthesize a titled markdown report ([`ReportSynthesizer`])
//!
//! [`DeepResearchTool`] ties the steps together behind the `deep_research`
//! tool interface.

pub mod extractor;
pub mod generate;
pub mod orchestrator;
pub mod planner;
pub mod prompts;
pub mod synthesizer;
pub mod tool;

pub use extractor::{Extraction, LearningExtractor};
pub use generate::Generator;
pub use orchestrator::{ResearchOrchestrator, child_breadth};
pub use planner::QueryPlanner;
pub use synthesizer::ReportSynthesizer;
pub use tool::{DeepResearchArgs, DeepResearchTool};

#[cfg(test)]
pub(crate) mod test_helpers;
