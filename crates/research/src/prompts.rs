//! Prompt and schema builders for every generation call in a research run.

use chrono::{DateTime, Utc};
use delve_core::research::{Research, Source};

/// The researcher persona shared by planning, extraction, and reporting.
pub fn system_prompt(now: DateTime<Utc>) -> String {
    format!(
        "You are an expert researcher. Today is {}. Follow these instructions when responding:\n\
  - You may be asked to research subjects that is after your knowledge cutoff, assume the user is right when presented with news.\n\
  - The user is a highly experienced analyst, no need to simplify it, be as detailed as possible and make sure your response is correct.\n\
  - Be highly organized.\n\
  - Suggest solutions that I didn't think about.\n\
  - Be proactive and anticipate my needs.\n\
  - Treat me as an expert in all subject matter.\n\
  - Mistakes erode my trust, so be accurate and thorough.\n\
  - Provide detailed explanations, I'm comfortable with lots of detail.\n\
  - Value good arguments over authorities, the source is irrelevant.\n\
  - Consider new technologies and contrarian ideas, not just the conventional wisdom.\n\
  - You may use high levels of speculation or prediction, just flag it for me.\n\
  - You must provide links to sources used. Ideally these are inline e.g. [this documentation](https://documentation.com/this)",
        now.to_rfc3339()
    )
}

/// System prompt for the report body.
pub fn report_system_prompt(now: DateTime<Utc>) -> String {
    format!("{}\n  - Write in markdown syntax.", system_prompt(now))
}

pub fn plan_prompt(prompt: &str, breadth: usize, learnings: &[String]) -> String {
    let mut text = format!(
        "Given the following prompt from the user, generate a list of SERP queries to research the topic. \
Ensure at least one is almost identical to the initial prompt. \
Return a maximum of {breadth} queries, but feel free to return less if the original prompt is clear. \
Make sure each query is unique and not similar to each other: <prompt>{prompt}</prompt>\n\n"
    );
    if !learnings.is_empty() {
        text.push_str(
            "Here are some learnings from previous research, use them to generate more specific queries: ",
        );
        text.push_str(&learnings.join("\n"));
    }
    text
}

pub fn plan_schema(breadth: usize) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "queries": {
                "type": "array",
                "description": format!("List of SERP queries, max of {breadth}"),
                "items": {
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "The SERP query"
                        },
                        "researchGoal": {
                            "type": "string",
                            "description": "First talk about the goal of the research that this query is meant to accomplish, then go deeper into how to advance the research once the results are found, mention additional research directions. Be as specific as possible, especially for additional research directions."
                        }
                    },
                    "required": ["query", "researchGoal"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["queries"],
        "additionalProperties": false
    })
}

pub fn learnings_prompt(query: &str, sources: &[Source], max_learnings: usize) -> String {
    let contents = sources
        .iter()
        .map(|s| format!("<content>\n{}\n</content>", s.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Given the following contents from a SERP search for the query <query>{query}</query>, \
generate a list of learnings from the contents. \
Return a maximum of {max_learnings} learnings, but feel free to return less if the contents are clear. \
Make sure each learning is unique and not similar to each other. \
The learnings should be concise and to the point, as detailed and information dense as possible. \
Make sure to include any entities like people, places, companies, products, things, etc in the learnings, \
as well as any exact metrics, numbers, or dates. \
The learnings will be used to research the topic further.\n\n<contents>{contents}</contents>"
    )
}

pub fn learnings_schema(max_learnings: usize, max_follow_ups: usize) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "learnings": {
                "type": "array",
                "items": { "type": "string" },
                "description": format!("List of learnings, max of {max_learnings}")
            },
            "followUpQuestions": {
                "type": "array",
                "items": { "type": "string" },
                "description": format!(
                    "List of follow-up questions to research the topic further, max of {max_follow_ups}"
                )
            }
        },
        "required": ["learnings", "followUpQuestions"],
        "additionalProperties": false
    })
}

/// The prompt a branch hands to its child level.
pub fn next_prompt(research_goal: &str, follow_ups: &[String]) -> String {
    let directions: String = follow_ups.iter().map(|q| format!("\n{q}")).collect();
    format!("Previous research goal: {research_goal} Follow-up directions:{directions}")
}

pub fn report_prompt(prompt: &str, research: &Research, citation_chars: usize) -> String {
    let learnings: String = research
        .learnings
        .iter()
        .map(|l| format!("\n<learning>{l}</learning>"))
        .collect();
    let queries: String = research
        .search_queries
        .iter()
        .map(|q| format!("\n<query>{q}</query>"))
        .collect();
    let questions: String = research
        .questions_explored
        .iter()
        .map(|q| format!("\n<question>{q}</question>"))
        .collect();
    let sources: String = research
        .sources
        .iter()
        .map(|s| {
            let cited = s.with_content_limit(citation_chars);
            let json = serde_json::to_string(&cited).unwrap_or_default();
            format!("\n<source>{json}</source>")
        })
        .collect();

    format!(
        "Generate a comprehensive report focused on \"{prompt}\". \
The main research findings should be drawn from the learnings below, \
with the search queries and related questions explored serving as supplementary context. \
Focus on synthesizing the key insights into a coherent narrative around the main topic.\n\n\
<learnings>{learnings}\n</learnings>\n\n\
<searchQueries>{queries}\n</searchQueries>\n\n\
<relatedQuestions>{questions}\n</relatedQuestions>\n\n\
<sources>{sources}\n</sources>\n"
    )
}

pub fn title_prompt(report: &str) -> String {
    format!("Generate a punchy title (5 words) for the following report:\n\n{report}")
}

pub fn title_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": { "title": { "type": "string" } },
        "required": ["title"],
        "additionalProperties": false
    })
}
