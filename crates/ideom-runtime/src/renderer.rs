//! Template renderer: fills the best match's response template from the
//! snapshot's most active ideoms.
//!
//! Supported variables:
//!
//! | Variable | Replacement |
//! |----------|-------------|
//! | `{most_active_ideom}` | name of the most active ideom |
//! | `{ideom_N}` | name of the N-th most active ideom (1-based) |
//! | `{active_ideom_count}` | number of active ideoms |
//! | `{active_ideoms_list}` | active ideom names, "a, b and c" |
//!
//! Missing values read as "that". Unknown variables are left untouched.

use ideom_core::collaborators::Renderer;
use ideom_core::prefab::Prefab;
use ideom_core::snapshot::ActivationSnapshot;
use ideom_core::topology::IdeomGraph;
use ideom_core::types::IdeomId;

const FALLBACK: &str = "that";

/// Leading words that mark a question.
const QUESTION_WORDS: &[&str] = &[
    "what", "who", "how", "why", "when", "where", "is", "are", "can", "do", "does",
];

#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    active_threshold: f64,
}

impl TemplateRenderer {
    pub fn new(active_threshold: f64) -> Self {
        Self { active_threshold }
    }

    /// Replace every `{variable}` in `template`.
    pub fn fill(&self, template: &str, snapshot: &ActivationSnapshot, graph: &dyn IdeomGraph) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                out.push_str(&rest[open..]);
                return out;
            };
            let variable = &after[..close];
            match self.resolve(variable, snapshot, graph) {
                Some(value) => out.push_str(&value),
                None => {
                    out.push('{');
                    out.push_str(variable);
                    out.push('}');
                }
            }
            rest = &after[close + 1..];
        }
        out.push_str(rest);
        out
    }

    fn resolve(&self, variable: &str, snapshot: &ActivationSnapshot, graph: &dyn IdeomGraph) -> Option<String> {
        match variable {
            "most_active_ideom" => Some(name_at(snapshot, graph, 0)),
            "active_ideom_count" => Some(snapshot.active(self.active_threshold).len().to_string()),
            "active_ideoms_list" => {
                let names: Vec<String> = snapshot
                    .active(self.active_threshold)
                    .iter()
                    .map(|id| name_of(graph, id))
                    .collect();
                Some(join_names(&names))
            }
            other => {
                let index: usize = other.strip_prefix("ideom_")?.parse().ok()?;
                Some(if index == 0 {
                    FALLBACK.to_string()
                } else {
                    name_at(snapshot, graph, index - 1)
                })
            }
        }
    }

    /// Response used when no match carries a template.
    pub fn generic_response(&self, snapshot: &ActivationSnapshot, graph: &dyn IdeomGraph) -> String {
        let names: Vec<String> = snapshot
            .most_active(5)
            .iter()
            .filter_map(|id| graph.get(id).map(|i| i.name.clone()))
            .collect();
        if names.is_empty() {
            return "I don't understand that yet. You can teach me by making simple statements \
                    or asking me about things I already know."
                .to_string();
        }
        let listed = names.join(", ");
        let is_question = names
            .iter()
            .any(|n| QUESTION_WORDS.contains(&n.to_lowercase().as_str()));
        if is_question {
            format!(
                "I don't have enough information to answer questions about {}. \
                 You can teach me by making statements about these topics.",
                listed
            )
        } else {
            format!(
                "I understand you're talking about {}, but I don't have enough knowledge \
                 to provide a detailed response. You can teach me more about these topics.",
                listed
            )
        }
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Renderer for TemplateRenderer {
    fn render(&self, snapshot: &ActivationSnapshot, matches: &[Prefab], graph: &dyn IdeomGraph) -> String {
        matches
            .iter()
            .find_map(|prefab| prefab.response_template.as_deref())
            .map(|template| self.fill(template, snapshot, graph))
            .unwrap_or_else(|| self.generic_response(snapshot, graph))
    }
}

fn name_of(graph: &dyn IdeomGraph, id: &IdeomId) -> String {
    graph
        .get(id)
        .map(|i| i.name.clone())
        .unwrap_or_else(|| FALLBACK.to_string())
}

fn name_at(snapshot: &ActivationSnapshot, graph: &dyn IdeomGraph, index: usize) -> String {
    snapshot
        .most_active(index + 1)
        .get(index)
        .map(|id| name_of(graph, id))
        .unwrap_or_else(|| FALLBACK.to_string())
}

fn join_names(names: &[String]) -> String {
    match names {
        [] => FALLBACK.to_string(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}
