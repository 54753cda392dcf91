//! Reasoner sessions
//!
//! End-to-end request cycles, feedback and save/load of the full state.

use ideom_runtime::prelude::*;
use std::path::Path;

fn seeded_reasoner() -> (Reasoner, IdeomId, IdeomId) {
    let mut reasoner = Reasoner::new(EngineConfig::default()).unwrap();
    let dog = reasoner.create_ideom("dog");
    let bark = reasoner.create_ideom("bark");
    reasoner.connect(&dog, &bark, 0.8).unwrap();
    reasoner.create_prefab(
        "dog barks",
        [(dog.clone(), 1.0), (bark.clone(), 0.5)],
        Some("When a {ideom_1} is around you hear {ideom_2}.".to_string()),
        ["animals", "sound"],
    );
    (reasoner, dog, bark)
}

#[test]
fn full_cycle_renders_the_matching_template() {
    let (mut reasoner, _dog, bark) = seeded_reasoner();
    let result = reasoner.process("A dog!", &[]);

    assert!(result.snapshot.contains(&bark));
    assert_eq!(result.response, "When a dog is around you hear bark.");
    assert!(result.confidence >= 0.5);
    assert_eq!(result.matches[0].prefab.name, "dog barks");
    assert_eq!(reasoner.propagator().history().len(), 1);
}

#[test]
fn corrected_feedback_teaches_a_new_answer() {
    let mut reasoner = Reasoner::new(EngineConfig::default()).unwrap();
    let first = reasoner.process("sky colour", &[]);
    assert!(first.matches.is_empty());

    let feedback = Feedback::new("sky colour", first.snapshot, 0.0).with_correction("The sky is blue.");
    let report = reasoner.learn(&feedback);
    assert_eq!(report.prefabs_created, 1);

    let second = reasoner.process("sky colour", &[]);
    assert_eq!(second.response, "The sky is blue.");
}

#[test]
fn history_grows_to_capacity() {
    let mut reasoner = Reasoner::new(EngineConfig::default()).unwrap();
    for _ in 0..15 {
        reasoner.process("rain clouds", &[]);
    }
    assert_eq!(reasoner.propagator().history().len(), 10);
}

#[test]
fn saved_state_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let (mut reasoner, dog, bark) = seeded_reasoner();
    reasoner.process("dog", &[]);
    reasoner.save(dir.path()).unwrap();

    let mut restored = Reasoner::new(EngineConfig::default()).unwrap();
    restored.load(dir.path()).unwrap();

    assert_eq!(restored.graph().len(), reasoner.graph().len());
    for id in reasoner.graph().ids() {
        let before = reasoner.graph().get(&id).unwrap();
        let after = restored.graph().get(&id).unwrap();
        assert_eq!(after.name, before.name);
        assert_eq!(after.activation_threshold, before.activation_threshold);
        assert_eq!(after.decay_rate, before.decay_rate);
        let mut edges_before = reasoner.graph().connections(&id);
        let mut edges_after = restored.graph().connections(&id);
        edges_before.sort_by(|a, b| a.0.cmp(&b.0));
        edges_after.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(edges_after, edges_before);
    }
    assert!(restored.graph().weight(&dog, &bark) > 0.0);

    assert_eq!(restored.library().len(), reasoner.library().len());
    for before in reasoner.library().all() {
        let after = restored.library().get(&before.id).unwrap();
        assert_eq!(after.name, before.name);
        assert_eq!(after.ideom_weights, before.ideom_weights);
        assert_eq!(after.activation_threshold, before.activation_threshold);
        assert_eq!(after.response_template, before.response_template);
        assert_eq!(after.tags, before.tags);
    }
}

#[test]
fn failed_load_keeps_current_state() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(IDEOMS_FILE), "[1, 2").unwrap();

    let (mut reasoner, _, _) = seeded_reasoner();
    let err = reasoner.load(dir.path()).unwrap_err();
    assert!(matches!(err, IdeomError::LoadFailure { .. }));
    assert_eq!(reasoner.graph().len(), 2);
    assert_eq!(reasoner.library().len(), 1);
}

#[test]
fn config_file_drives_the_reasoner() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ideom.toml");
    std::fs::write(
        &path,
        "[reasoning]\nuse_temporal_context = false\n\n[propagation]\nmax_steps = 1\n",
    )
    .unwrap();

    let config = EngineConfig::load(Path::new(&path)).unwrap();
    assert!(!config.reasoning.use_temporal_context);
    let mut reasoner = ReasonerBuilder::new().with_config(config).build().unwrap();
    let result = reasoner.process("alpha beta", &[]);
    assert_eq!(result.snapshot.len(), 2);
    assert_eq!(reasoner.config().propagation.max_steps, 1);
}
