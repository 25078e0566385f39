//! skinnerbox - embodied agents learning by operant conditioning
//!
//! A discrete-tick simulation core: a [`world::World`] advances named
//! [`entity::Entity`]s through strictly ordered phases (physics, trigger
//! dispatch, signal propagation, action selection, action execution,
//! measurement), and an [`agent::OperantAgent`] plugged into an entity learns
//! a joint probability distribution over its motor-signal space from reward.
//!
//! The crate is a library; experiment setups, rendering, and entry points
//! live with its consumers.

pub mod agent;
pub mod core;
pub mod entity;
pub mod log;
pub mod prob;
pub mod signal;
pub mod world;
