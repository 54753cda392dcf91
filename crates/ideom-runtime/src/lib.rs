//! # Ideom Runtime
//!
//! Graph arena, propagation, prefab matching, learning and the reasoner.
//!
//! The runtime owns all mutable state: a petgraph-backed ideom graph, the
//! prefab library and the temporal history kept by the propagator. The
//! [`reasoner::Reasoner`] ties them into one request cycle.

pub mod graph_impl;
pub mod temporal;
pub mod propagation;
pub mod library;
pub mod similarity;
pub mod matcher;
pub mod learning;
pub mod encoder;
pub mod renderer;
pub mod persistence;
pub mod reasoner;
pub mod reasoner_builder;
pub mod prelude;
