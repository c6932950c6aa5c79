//! Cinder build lane - build configuration resolver for the Cinder kernel
//!
//! This crate resolves a declared build intent (board, benchmark selection,
//! crash-safety mode, fault-injection parameters, optimization toggles) into
//! a single deterministic cargo invocation: a feature-token set, an ordered
//! environment vector, a target triple, and a command token list.

pub mod config;
pub mod envs;
pub mod features;
pub mod invocation;
pub mod launch;
pub mod options;
pub mod target;

pub use features::{compose, ComposeError, Composition, FeatureSet};
pub use invocation::{resolve, BuildInvocation, Mode, Profile};
pub use options::{Bench, Board, BuildOptions, InjectedFeature, PfFreq};
