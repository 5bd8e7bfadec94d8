//! Report synthesis: write the final markdown report, then title it.

use chrono::Utc;
use delve_core::error::{GenerationError, ResearchError};
use delve_core::research::{Research, ResearchReport};
use serde::Deserialize;
use tracing::info;

use crate::generate::Generator;
use crate::prompts;

const DEFAULT_CITATION_CHARS: usize = 350;

#[derive(Debug, Deserialize)]
struct ReportTitle {
    title: String,
}

pub struct ReportSynthesizer {
    writer: Generator,
    titler: Generator,
    citation_chars: usize,
}

impl ReportSynthesizer {
    /// `writer` drafts the report; `titler` (usually a smaller model) names it.
    pub fn new(writer: Generator, titler: Generator) -> Self {
        Self {
            writer,
            titler,
            citation_chars: DEFAULT_CITATION_CHARS,
        }
    }

    /// Characters of each source's content quoted in the report prompt.
    pub fn with_citation_chars(mut self, citation_chars: usize) -> Self {
        self.citation_chars = citation_chars;
        self
    }

    pub async fn synthesize(
        &self,
        prompt: &str,
        research: &Research,
    ) -> Result<ResearchReport, ResearchError> {
        let now = Utc::now();

        let report = self
            .writer
            .generate_text(
                &prompts::report_system_prompt(now),
                &prompts::report_prompt(prompt, research, self.citation_chars),
            )
            .await
            .map_err(ResearchError::Synthesis)?;

        if report.is_empty() {
            return Err(ResearchError::Synthesis(GenerationError::Schema(
                "report: empty report".into(),
            )));
        }

        let ReportTitle { title } = self
            .titler
            .generate_object(
                "",
                &prompts::title_prompt(&report),
                "report_title",
                prompts::title_schema(),
            )
            .await
            .map_err(ResearchError::Synthesis)?;

        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(ResearchError::Synthesis(GenerationError::Schema(
                "report_title: empty title".into(),
            )));
        }

        info!(title = %title, chars = report.len(), "Report synthesized");
        Ok(ResearchReport { report, title })
    }
}
