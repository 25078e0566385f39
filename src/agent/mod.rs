//! Agent variants that can be installed on an entity
//!
//! The world and the entity only ever see the [`Agent`] trait; which variant
//! is installed is decided by the experiment setup through explicit
//! construction, never by matching on type strings at runtime.

pub mod operant;
pub mod replay;

use crate::core::{Assignment, Result, Value};
use crate::prob::SignalSpace;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub use operant::{OperantAgent, UpdatePolicy};
pub use replay::ReplayAgent;

/// Decision policy plugged into an entity.
///
/// `init` is called once before the first tick with the entity's motor-signal
/// space; `sense` delivers one perceived pair during the world's delivery
/// phase; `act` returns the motor command for this tick.
pub trait Agent {
    fn init(&mut self, space: &SignalSpace) -> Result<()>;

    fn sense(&mut self, name: &str, value: &Value);

    fn act(&mut self) -> Result<Vec<(String, Value)>>;
}

/// Structured events emitted by a learning policy, replacing ad hoc prints.
#[derive(Debug, Clone)]
pub enum PolicyEvent {
    /// A probability update after a reward verdict.
    Update {
        action: Assignment,
        old: f64,
        new: f64,
        rewarded: bool,
    },
    /// A weighted selection draw.
    Selection {
        action: Assignment,
        weight: f64,
        total_weight: f64,
        draw: f64,
    },
}

/// Injected sink for [`PolicyEvent`]s; the core has no hidden output.
pub trait PolicySink {
    fn record(&mut self, event: PolicyEvent);
}

/// Sink collecting events into a vector, mainly for tests and analysis.
#[derive(Debug, Default)]
pub struct VecSink {
    pub events: Vec<PolicyEvent>,
}

impl PolicySink for VecSink {
    fn record(&mut self, event: PolicyEvent) {
        self.events.push(event);
    }
}

/// Picks a uniformly random value for every motor signal, independently,
/// every tick. The baseline agent for control conditions.
pub struct RandomAgent {
    space: Option<SignalSpace>,
    rng: ChaCha8Rng,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        Self {
            space: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn init(&mut self, space: &SignalSpace) -> Result<()> {
        self.space = Some(space.clone());
        Ok(())
    }

    fn sense(&mut self, _name: &str, _value: &Value) {}

    fn act(&mut self) -> Result<Vec<(String, Value)>> {
        let space = self
            .space
            .as_ref()
            .ok_or_else(|| crate::core::SimError::MechanismNotInitialized("random".into()))?;

        Ok(space
            .variables()
            .iter()
            .map(|var| {
                let pick = self.rng.gen_range(0..var.domain.len());
                (var.name.clone(), var.domain[pick].clone())
            })
            .collect())
    }
}
