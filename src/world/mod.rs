//! World - owns the entity registry and trigger table, advances time
//!
//! One tick executes a fixed sequence of phases, visiting every entity before
//! the next phase begins:
//!
//! 1. physics
//! 2. trigger dispatch (drained to fixpoint, bounded)
//! 3. signal queueing
//! 4. signal delivery
//! 5. action preparation
//! 6. action execution
//! 7. measurement
//! 8. scheduled trigger add/remove
//!
//! Preparation and execution are split so no entity selects an action after a
//! subset of entities has already acted: every entity chooses on the same
//! post-delivery observation snapshot.

use crate::core::{Result, SimError, Tick};
use crate::entity::Entity;
use crate::log::RunLog;
use crate::signal::{Signal, Trigger};
use std::collections::VecDeque;

/// Trigger chains legitimately span a few events within a tick; a dispatch
/// needing more passes than this is assumed to be cycling.
pub const MAX_TRIGGER_PASSES: usize = 32;

/// Configuration for one run.
#[derive(Default)]
pub struct RunConfig {
    pub iterations: Tick,
    /// For a tick index, triggers to add after that tick completes.
    pub add_triggers: ahash::AHashMap<Tick, Vec<Trigger>>,
    /// For a tick index, triggers to remove after that tick completes.
    pub remove_triggers: ahash::AHashMap<Tick, Vec<Trigger>>,
}

impl RunConfig {
    pub fn iterations(iterations: Tick) -> Self {
        Self {
            iterations,
            ..Self::default()
        }
    }
}

pub struct World {
    entities: Vec<Entity>,
    index: ahash::AHashMap<String, usize>,
    triggers: Vec<Trigger>,
    pending_signals: VecDeque<(usize, Signal)>,
    time: Tick,
    log: RunLog,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            index: ahash::AHashMap::default(),
            triggers: Vec::new(),
            pending_signals: VecDeque::new(),
            time: 0,
            log: RunLog::new(),
        }
    }

    // --- setup -----------------------------------------------------------

    pub fn add_entity(&mut self, entity: Entity) -> Result<()> {
        if self.index.contains_key(entity.name()) {
            return Err(SimError::DuplicateEntity(entity.name().to_string()));
        }
        self.index
            .insert(entity.name().to_string(), self.entities.len());
        self.entities.push(entity);
        Ok(())
    }

    pub fn entity(&self, name: &str) -> Result<&Entity> {
        self.index
            .get(name)
            .map(|&i| &self.entities[i])
            .ok_or_else(|| SimError::UnknownEntity(name.to_string()))
    }

    pub fn entity_mut(&mut self, name: &str) -> Result<&mut Entity> {
        match self.index.get(name) {
            Some(&i) => Ok(&mut self.entities[i]),
            None => Err(SimError::UnknownEntity(name.to_string())),
        }
    }

    /// Position of a trigger tuple in the table, if present.
    pub fn has_trigger(&self, trigger: &Trigger) -> Option<usize> {
        self.triggers.iter().position(|t| t == trigger)
    }

    /// Add a causal link. Adding a tuple that is already present keeps a
    /// single entry.
    pub fn add_trigger(&mut self, trigger: Trigger) {
        if self.has_trigger(&trigger).is_none() {
            self.triggers.push(trigger);
        }
    }

    /// Remove a causal link. Removing an absent tuple is a no-op.
    pub fn remove_trigger(&mut self, trigger: &Trigger) {
        if let Some(i) = self.has_trigger(trigger) {
            self.triggers.remove(i);
        }
    }

    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    pub fn time(&self) -> Tick {
        self.time
    }

    pub fn log(&self) -> &RunLog {
        &self.log
    }

    pub fn take_log(&mut self) -> RunLog {
        std::mem::take(&mut self.log)
    }

    // --- run -------------------------------------------------------------

    /// Run the simulation for the configured number of ticks.
    pub fn run(&mut self, config: &RunConfig) -> Result<()> {
        self.validate_triggers()?;

        for entity in &mut self.entities {
            entity.start()?;
        }

        for tick in 0..config.iterations {
            self.time = tick;
            tracing::debug!(tick, "tick");

            self.do_physics()?;
            self.dispatch_triggers()?;
            self.queue_signals();
            self.deliver_signals();
            self.prepare_actions()?;
            self.execute_actions()?;
            self.measure();
            self.apply_schedule(config, tick)?;
        }
        Ok(())
    }

    /// Every trigger must reference entities present in the registry; a
    /// dangling name is a setup mistake, caught before the first tick.
    fn validate_triggers(&self) -> Result<()> {
        for trigger in &self.triggers {
            for name in [&trigger.causing, &trigger.affected] {
                if !self.index.contains_key(name) {
                    return Err(SimError::UnknownEntity(name.clone()));
                }
            }
        }
        Ok(())
    }

    fn do_physics(&mut self) -> Result<()> {
        for entity in &mut self.entities {
            entity.run_physics()?;
        }
        Ok(())
    }

    /// Drain every entity's event queue, dispatching each event to every
    /// matching trigger's affected entity. Handlers may enqueue follow-on
    /// events for the same tick; draining repeats until no events remain,
    /// bounded by [`MAX_TRIGGER_PASSES`].
    fn dispatch_triggers(&mut self) -> Result<()> {
        let mut passes = 0;
        loop {
            let mut work = Vec::new();
            for (i, entity) in self.entities.iter_mut().enumerate() {
                for event in entity.drain_events() {
                    work.push((i, event));
                }
            }
            if work.is_empty() {
                return Ok(());
            }

            passes += 1;
            if passes > MAX_TRIGGER_PASSES {
                return Err(SimError::TriggerCycle {
                    max_passes: MAX_TRIGGER_PASSES,
                });
            }

            for (cause_idx, event) in work {
                let cause = self.entities[cause_idx].name().to_string();
                let affected: Vec<usize> = self
                    .triggers
                    .iter()
                    .filter(|t| {
                        t.causing == cause
                            && t.attribute == event.attribute
                            && t.event == event.event
                    })
                    .filter_map(|t| self.index.get(&t.affected).copied())
                    .collect();

                // No matching trigger is the common case, not an error.
                for idx in affected {
                    tracing::trace!(
                        cause = %cause,
                        attribute = %event.attribute,
                        event = %event.event,
                        affected = %self.entities[idx].name(),
                        "trigger fired"
                    );
                    self.entities[idx].call_trigger(&event.event, &event.params)?;
                }
            }
        }
    }

    /// Ask every entity to emit signals and queue a delivery for every other
    /// entity with a sensor matching the signal's modality.
    fn queue_signals(&mut self) {
        for entity in &mut self.entities {
            entity.reset_observations();
        }

        for sender in 0..self.entities.len() {
            for signal in self.entities[sender].emit() {
                for receiver in 0..self.entities.len() {
                    if receiver != sender && self.entities[receiver].senses_modality(&signal.modality)
                    {
                        self.pending_signals.push_back((receiver, signal.clone()));
                    }
                }
            }
        }
    }

    /// Drain the pending-delivery queue into the receivers' observation sets.
    fn deliver_signals(&mut self) {
        while let Some((receiver, signal)) = self.pending_signals.pop_front() {
            self.entities[receiver].sense(&signal.kind, &signal.value);
        }
    }

    fn prepare_actions(&mut self) -> Result<()> {
        for entity in &mut self.entities {
            entity.prepare_action()?;
        }
        Ok(())
    }

    fn execute_actions(&mut self) -> Result<()> {
        for entity in &mut self.entities {
            entity.execute_prepared()?;
        }
        Ok(())
    }

    /// Record every entity's attributes for analysis. Pure observation.
    fn measure(&mut self) {
        for entity in &self.entities {
            let mut attributes = serde_json::Map::new();
            for name in entity.attribute_names() {
                let value = entity.attribute(name).expect("listed attribute exists");
                attributes.insert(
                    name.to_string(),
                    serde_json::to_value(value).expect("value serializes"),
                );
            }
            self.log.record(
                self.time,
                "measure",
                serde_json::json!({
                    "entity": entity.name(),
                    "attributes": attributes,
                }),
            );
        }
    }

    fn apply_schedule(&mut self, config: &RunConfig, tick: Tick) -> Result<()> {
        if let Some(removals) = config.remove_triggers.get(&tick) {
            for trigger in removals {
                self.remove_trigger(trigger);
            }
        }
        if let Some(additions) = config.add_triggers.get(&tick) {
            for trigger in additions.clone() {
                for name in [&trigger.causing, &trigger.affected] {
                    if !self.index.contains_key(name) {
                        return Err(SimError::UnknownEntity(name.clone()));
                    }
                }
                self.add_trigger(trigger);
            }
        }
        Ok(())
    }
}
