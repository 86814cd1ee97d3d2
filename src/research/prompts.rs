//! Prompt templates for the planning and synthesis stages.

use super::state::Focus;

/// Search-query suffixes used when the planner's output cannot be parsed,
/// in sub-task id order.
pub const FALLBACK_SUFFIXES: [(Focus, &str); 3] = [
    (Focus::Fundamentals, "fundamentals basics principles"),
    (Focus::Trends, "latest developments 2025 trends"),
    (Focus::Applications, "applications use cases implementation"),
];

/// Returned by synthesis when there is nothing to synthesize.
pub const NO_SOURCES_MESSAGE: &str = "No sources found to synthesize.";

/// Prompt asking the model to decompose `query` into three labeled sub-tasks.
pub fn planning_prompt(query: &str) -> String {
    format!(
        r#"You are a Lead Research Agent. Break down this query into 3 specialized subtasks for parallel execution:

"{query}"

Create 3 distinct subtasks:
1. FUNDAMENTALS: Core concepts, definitions, principles
2. TRENDS: Latest developments, 2025 updates, recent progress
3. APPLICATIONS: Real-world use cases, implementations, impact

For each subtask, provide a focused search query.

Format your response EXACTLY like this:
SUBTASK 1: [search query for fundamentals]
SUBTASK 2: [search query for latest trends]
SUBTASK 3: [search query for applications]"#
    )
}

/// Prompt asking the model to turn the gathered `context` into a report.
pub fn synthesis_prompt(context: &str, total_sources: usize) -> String {
    format!(
        r#"{context}

As the Lead Agent, synthesize these parallel findings into a comprehensive research report:

EXECUTIVE SUMMARY:
[2-3 sentences covering the most important insights across all agents]

INTEGRATED FINDINGS:
• [Key finding from Fundamentals research]
• [Key finding from Trends research]
• [Key finding from Applications research]
• [Cross-cutting insight that emerged]

RESEARCH QUALITY:
- Total sources analyzed: {total_sources}
- Coverage assessment: [Brief note on how well the research covered the topic]"#
    )
}
