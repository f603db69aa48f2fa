//! Terminal rendering of backend responses.
//!
//! One typed pass over the response schema. Answers render first, then all
//! explanations as a second section, so a skim of the top gives every
//! result before any prose.

use std::fmt::Write;

use crate::types::{ParseResponse, SolveResponse, Source};

/// Render a solve response as displayable text.
///
/// LaTeX answers are emitted on their own `$$…$$` line, delimiters intact,
/// for whatever typesets them downstream.
pub fn render_solution(solution: &SolveResponse) -> String {
    let mut out = String::new();

    if solution.results.is_empty() {
        out.push_str("No results returned.\n");
        return out;
    }

    let _ = writeln!(out, "Total problems solved: {}", solution.total_problems);

    for (i, item) in solution.results.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Q{}: {}", i + 1, item.question);
        let _ = writeln!(out, "Answer: {}", item.final_answer.text);
        if let Some(latex) = &item.final_answer.latex {
            let _ = writeln!(out, "$${latex}$$");
        }
        for (n, step) in item.steps.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", n + 1, step);
        }
        let _ = writeln!(out, "Source: {}", answer_source(item.source.as_ref()));
    }

    for (i, item) in solution.results.iter().enumerate() {
        let Some(explanation) = &item.explanation else {
            continue;
        };
        let _ = writeln!(out);
        let _ = writeln!(out, "Q{} - Explanation:", i + 1);
        let _ = writeln!(out, "{explanation}");
        let _ = writeln!(out, "Source: {}", explanation_source(item.source.as_ref()));
    }

    out
}

/// Render a parse response as a short review block.
pub fn render_parse_summary(parse: &ParseResponse) -> String {
    let mut out = String::new();
    let problem = &parse.parsed_problem;

    let _ = writeln!(out, "Problem: {}", problem.problem_text);
    let _ = writeln!(out, "Topic: {}", problem.topic);
    let _ = writeln!(
        out,
        "Operation: {}",
        problem.operation.as_deref().unwrap_or("none")
    );
    if !problem.variables.is_empty() {
        let _ = writeln!(out, "Variables: {}", problem.variables.join(", "));
    }
    let _ = writeln!(out, "Confidence: {}", parse.confidence);
    if parse.needs_hitl || problem.needs_clarification {
        let _ = writeln!(out, "Needs review before solving.");
    }

    out
}

fn answer_source(source: Option<&Source>) -> &str {
    source.map(Source::answer_label).unwrap_or("unknown")
}

fn explanation_source(source: Option<&Source>) -> &str {
    source.map(Source::explanation_label).unwrap_or("unknown")
}
