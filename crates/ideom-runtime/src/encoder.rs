//! Lexicon encoder: maps words and word pairs to ideoms by name.
//!
//! Text is lower-cased and split on anything that is not alphanumeric.
//! Stop words are dropped. Word pairs are tried before single words, and a
//! word already covered by a matched pair is not matched again. Unknown
//! single words become new ideoms when creation is enabled.

use ideom_core::collaborators::Encoder;
use ideom_core::config::GraphConfig;
use ideom_core::topology::IdeomGraph;
use ideom_core::types::{Ideom, IdeomId};
use std::collections::HashSet;
use tracing::debug;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "been", "but", "by", "for", "from", "has", "have",
    "i", "in", "into", "it", "its", "me", "my", "of", "on", "or", "so", "that", "the", "their",
    "them", "then", "there", "these", "they", "this", "to", "was", "we", "were", "will", "with",
    "you", "your",
];

/// Strength given to an ideom created for an unseen word, relative to the
/// initial activation.
const NEW_IDEOM_FACTOR: f64 = 0.7;

#[derive(Debug, Clone)]
pub struct LexiconEncoder {
    stop_words: HashSet<String>,
    initial_activation: f64,
    create_unknown: bool,
    graph_defaults: GraphConfig,
}

impl LexiconEncoder {
    pub fn new() -> Self {
        Self {
            stop_words: STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            initial_activation: 1.0,
            create_unknown: true,
            graph_defaults: GraphConfig::default(),
        }
    }

    pub fn with_initial_activation(mut self, activation: f64) -> Self {
        self.initial_activation = activation;
        self
    }

    pub fn with_create_unknown(mut self, create: bool) -> Self {
        self.create_unknown = create;
        self
    }

    /// Threshold and decay rate for ideoms this encoder creates.
    pub fn with_graph_defaults(mut self, defaults: GraphConfig) -> Self {
        self.graph_defaults = defaults;
        self
    }

    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words = words.into_iter().map(Into::into).collect();
        self
    }

    /// Lower-cased content words of `text`, stop words removed.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty() && !self.stop_words.contains(*t))
            .map(str::to_string)
            .collect()
    }
}

impl Default for LexiconEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder for LexiconEncoder {
    fn encode(&mut self, text: &str, graph: &mut dyn IdeomGraph) -> Vec<(IdeomId, f64)> {
        let tokens = self.tokenize(text);
        let mut covered = vec![false; tokens.len()];
        let mut seeds: Vec<(IdeomId, f64)> = Vec::new();

        for i in 0..tokens.len().saturating_sub(1) {
            let pair = format!("{} {}", tokens[i], tokens[i + 1]);
            let matches: Vec<IdeomId> = graph.by_name(&pair).into_iter().map(|n| n.id.clone()).collect();
            if !matches.is_empty() {
                covered[i] = true;
                covered[i + 1] = true;
                for id in matches {
                    push(&mut seeds, id, self.initial_activation);
                }
            }
        }

        let mut created = 0;
        for (i, token) in tokens.iter().enumerate() {
            if covered[i] {
                continue;
            }
            let matches: Vec<IdeomId> = graph.by_name(token).into_iter().map(|n| n.id.clone()).collect();
            if !matches.is_empty() {
                for id in matches {
                    push(&mut seeds, id, self.initial_activation);
                }
            } else if self.create_unknown {
                let ideom = Ideom::named(token.clone())
                    .with_threshold(self.graph_defaults.default_activation_threshold)
                    .with_decay_rate(self.graph_defaults.default_decay_rate);
                let id = graph.add(ideom);
                push(&mut seeds, id, self.initial_activation * NEW_IDEOM_FACTOR);
                created += 1;
            }
        }

        debug!(tokens = tokens.len(), seeds = seeds.len(), created, "encoded text");
        seeds
    }
}

fn push(seeds: &mut Vec<(IdeomId, f64)>, id: IdeomId, level: f64) {
    if !seeds.iter().any(|(seen, _)| *seen == id) {
        seeds.push((id, level));
    }
}
