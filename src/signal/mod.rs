//! Sensory signals, sensors, and causal links between entities

use crate::core::{Params, Value};
use serde::{Deserialize, Serialize};

/// One sensory emission: a modality, the kind of thing it reports, and the
/// reported value. Signals carry no identity; duplicates are independent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub modality: String,
    pub kind: String,
    pub value: Value,
}

impl Signal {
    pub fn new(modality: &str, kind: &str, value: impl Into<Value>) -> Self {
        Self {
            modality: modality.to_string(),
            kind: kind.to_string(),
            value: value.into(),
        }
    }
}

/// A sensor picks up every signal in its modality and supplies a default
/// observation per signal kind for ticks in which nothing was emitted.
#[derive(Debug, Clone)]
pub struct Sensor {
    modality: String,
    defaults: Vec<(String, Value)>,
}

impl Sensor {
    pub fn new(modality: &str) -> Self {
        Self {
            modality: modality.to_string(),
            defaults: Vec::new(),
        }
    }

    /// Declare a signal kind this sensor reports, with the observation value
    /// assumed when no such signal arrives during a tick.
    pub fn with_default(mut self, kind: &str, value: impl Into<Value>) -> Self {
        self.defaults.push((kind.to_string(), value.into()));
        self
    }

    pub fn detects_modality(&self, modality: &str) -> bool {
        self.modality == modality
    }

    pub fn defaults(&self) -> &[(String, Value)] {
        &self.defaults
    }
}

/// A causal link: when `causing`'s `attribute` raises `event`, the handler
/// registered for `event` on `affected` runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub causing: String,
    pub attribute: String,
    pub event: String,
    pub affected: String,
}

impl Trigger {
    pub fn new(causing: &str, attribute: &str, event: &str, affected: &str) -> Self {
        Self {
            causing: causing.to_string(),
            attribute: attribute.to_string(),
            event: event.to_string(),
            affected: affected.to_string(),
        }
    }
}

/// An event recorded on an entity's outgoing queue when one of its
/// attributes changed, waiting for trigger dispatch.
#[derive(Debug, Clone)]
pub struct CausalEvent {
    pub attribute: String,
    pub event: String,
    pub params: Params,
}
