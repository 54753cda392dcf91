//! The reasoner: one request cycle over the graph and the prefab library.
//!
//! A cycle encodes the input, optionally learns the raw input pattern,
//! propagates, matches prefabs, renders a response and finally learns from
//! the propagated snapshot. Learning always sees the matches produced by the
//! same propagation.

use crate::encoder::LexiconEncoder;
use crate::graph_impl::PetIdeomGraph;
use crate::learning::{LearningEngine, LearningReport};
use crate::library::PrefabLibrary;
use crate::matcher::{prefabs_of, AdvancedMatcher, PrefabMatch};
use crate::persistence;
use crate::propagation::SignalPropagator;
use crate::reasoner_builder::ReasonerBuilder;
use crate::renderer::TemplateRenderer;
use ideom_core::collaborators::{Encoder, Renderer};
use ideom_core::config::EngineConfig;
use ideom_core::error::Result;
use ideom_core::feedback::Feedback;
use ideom_core::prefab::Prefab;
use ideom_core::snapshot::ActivationSnapshot;
use ideom_core::topology::IdeomGraph;
use ideom_core::types::{Ideom, IdeomId, PrefabId};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Outcome of one `process` call.
#[derive(Debug, Clone)]
pub struct ReasoningResult {
    pub snapshot: ActivationSnapshot,
    /// Best first.
    pub matches: Vec<PrefabMatch>,
    pub response: String,
    /// Score of the best match, 0 when nothing matched.
    pub confidence: f64,
}

pub struct Reasoner {
    pub(crate) graph: PetIdeomGraph,
    pub(crate) library: PrefabLibrary,
    pub(crate) propagator: SignalPropagator,
    pub(crate) matcher: AdvancedMatcher,
    pub(crate) learning: LearningEngine,
    pub(crate) encoder: Box<dyn Encoder>,
    pub(crate) renderer: Box<dyn Renderer>,
    pub(crate) config: EngineConfig,
}

impl Reasoner {
    /// Reasoner with the default encoder and renderer and an empty state.
    pub fn new(config: EngineConfig) -> Result<Self> {
        ReasonerBuilder::new().with_config(config).build()
    }

    pub fn builder() -> ReasonerBuilder {
        ReasonerBuilder::new()
    }

    pub(crate) fn from_parts(
        config: EngineConfig,
        encoder: Option<Box<dyn Encoder>>,
        renderer: Option<Box<dyn Renderer>>,
    ) -> Result<Self> {
        config.validate()?;
        let encoder = encoder.unwrap_or_else(|| {
            Box::new(
                LexiconEncoder::new()
                    .with_initial_activation(config.reasoning.initial_strength)
                    .with_create_unknown(config.reasoning.create_unknown_ideoms)
                    .with_graph_defaults(config.graph.clone()),
            )
        });
        let renderer = renderer
            .unwrap_or_else(|| Box::new(TemplateRenderer::new(config.matching.active_threshold)));
        Ok(Self {
            graph: PetIdeomGraph::new(),
            library: PrefabLibrary::new(config.matching.prefab_threshold),
            propagator: SignalPropagator::new(config.propagation.clone())?,
            matcher: AdvancedMatcher::new(config.matching.clone()),
            learning: LearningEngine::new(config.learning.clone(), config.matching.prefab_threshold),
            encoder,
            renderer,
            config,
        })
    }

    /// Run one full cycle on `text`. `context` ideoms are activated
    /// alongside at `context_strength`; unknown ids are ignored.
    #[instrument(skip(self, context), fields(context = context.len()))]
    pub fn process(&mut self, text: &str, context: &[IdeomId]) -> ReasoningResult {
        let encoded = self.encoder.encode(text, &mut self.graph);
        if self.config.reasoning.learn_from_input && !encoded.is_empty() {
            let input = ActivationSnapshot::from_activations(encoded.iter().cloned());
            self.learning
                .learn_from_activation(&mut self.graph, &mut self.library, &input);
        }

        let seeds: Vec<IdeomId> = encoded.into_iter().map(|(id, _)| id).collect();
        let mut snapshot = self.propagate(&seeds, context);

        let matches = self.matcher.find_matching(&self.library, &self.graph, &mut snapshot);
        let response = self.renderer.render(&snapshot, &prefabs_of(&matches), &self.graph);
        let confidence = matches.iter().map(PrefabMatch::score).fold(0.0, f64::max);

        let report = self
            .learning
            .learn_from_activation(&mut self.graph, &mut self.library, &snapshot);
        debug!(
            seeds = seeds.len(),
            activated = snapshot.len(),
            matches = matches.len(),
            confidence,
            ?report,
            "processed input"
        );

        ReasoningResult {
            snapshot,
            matches,
            response,
            confidence,
        }
    }

    fn propagate(&mut self, seeds: &[IdeomId], context: &[IdeomId]) -> ActivationSnapshot {
        let reasoning = &self.config.reasoning;
        let propagation = &self.config.propagation;
        let strength = reasoning.initial_strength;

        if !reasoning.use_temporal_context {
            return self.propagator.propagate_with_context(
                &mut self.graph,
                seeds,
                context,
                strength,
                reasoning.context_strength,
            );
        }

        let mut snapshot = if reasoning.use_pattern_prediction {
            self.propagator.propagate_with_pattern_prediction(
                &mut self.graph,
                seeds,
                strength,
                propagation.prediction_weight,
            )
        } else {
            self.propagator.propagate_with_temporal_context(
                &mut self.graph,
                seeds,
                strength,
                propagation.temporal_influence,
                propagation.trend_influence,
            )
        };
        for id in context {
            if self.graph.contains(id) {
                snapshot.add_activation(id.clone(), reasoning.context_strength);
            }
        }
        snapshot
    }

    /// Apply external feedback on an earlier result.
    #[instrument(skip(self, feedback), fields(score = feedback.score))]
    pub fn learn(&mut self, feedback: &Feedback) -> LearningReport {
        self.learning.learn_from_feedback(
            &mut self.graph,
            &mut self.library,
            self.encoder.as_mut(),
            feedback,
        )
    }

    /// Add an ideom with the configured default threshold and decay rate.
    pub fn create_ideom(&mut self, name: impl Into<String>) -> IdeomId {
        let ideom = Ideom::named(name)
            .with_threshold(self.config.graph.default_activation_threshold)
            .with_decay_rate(self.config.graph.default_decay_rate);
        self.graph.add(ideom)
    }

    /// Connect two ideoms in both directions.
    pub fn connect(&mut self, a: &IdeomId, b: &IdeomId, weight: f64) -> Result<()> {
        self.graph.connect(a, b, weight)
    }

    pub fn create_prefab<W, T, S>(
        &mut self,
        name: impl Into<String>,
        weights: W,
        response_template: Option<String>,
        tags: T,
    ) -> PrefabId
    where
        W: IntoIterator<Item = (IdeomId, f64)>,
        T: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut prefab = Prefab::new(name)
            .with_weights(weights)
            .with_threshold(self.library.default_threshold())
            .with_tags(tags);
        prefab.response_template = response_template;
        self.library.add(prefab)
    }

    pub fn optimize(&mut self) -> LearningReport {
        self.learning.optimize(&mut self.graph, &mut self.library)
    }

    /// Let every ideom's activation fall by its decay rate.
    pub fn decay(&mut self) {
        self.graph.decay_all();
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        persistence::save_state(&self.graph, &self.library, dir)
    }

    /// Replace the graph and the library with the state saved in `dir`.
    /// On failure the current state is kept.
    pub fn load(&mut self, dir: &Path) -> Result<()> {
        let (graph, library) = persistence::load_state(dir, self.config.matching.prefab_threshold)?;
        self.graph = graph;
        self.library = library;
        info!(
            dir = %dir.display(),
            ideoms = self.graph.len(),
            prefabs = self.library.len(),
            "reasoner state loaded"
        );
        Ok(())
    }

    pub fn graph(&self) -> &PetIdeomGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut PetIdeomGraph {
        &mut self.graph
    }

    pub fn library(&self) -> &PrefabLibrary {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut PrefabLibrary {
        &mut self.library
    }

    pub fn propagator(&self) -> &SignalPropagator {
        &self.propagator
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
