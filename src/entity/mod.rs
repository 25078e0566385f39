//! Entities: named bearers of attributes, sensors, and an optional agent
//!
//! All entity callbacks (physics, emission, change effects, trigger and motor
//! handlers) are stored as cloneable `Rc` handles so a handler can take
//! `&mut Entity` without aliasing the table it was looked up in.

use crate::agent::Agent;
use crate::core::{Params, Result, SimError, Value};
use crate::prob::SignalSpace;
use crate::signal::{CausalEvent, Sensor, Signal};
use std::collections::VecDeque;
use std::rc::Rc;

/// Per-tick mutation of an entity's own attributes (e.g. passive decay).
pub type PhysicsFn = Rc<dyn Fn(&mut Entity) -> Result<()>>;
/// Signals an entity emits reflecting its current state.
pub type EmissionFn = Rc<dyn Fn(&Entity) -> Vec<Signal>>;
/// Maps an attribute change `(old, new)` to the causal event it raises, if
/// any. `None` means the change is not observable through triggers.
pub type ChangeEffectFn = Rc<dyn Fn(&Value, &Value) -> Option<(String, Params)>>;
/// Reaction of an affected entity to a dispatched causal event.
pub type TriggerHandlerFn = Rc<dyn Fn(&mut Entity, &Params) -> Result<()>>;
/// Applies one motor-signal value to the acting entity's attributes.
pub type MotorHandlerFn = Rc<dyn Fn(&mut Entity, &Value) -> Result<()>>;

/// Attribute state: current value, legal domain, and the change effect that
/// records causal events when the value moves.
pub struct Attribute {
    value: Value,
    domain: Vec<Value>,
    effect: ChangeEffectFn,
}

struct MotorAction {
    name: String,
    domain: Vec<Value>,
    /// Executed when the agent's command leaves this motor unspecified.
    default: Value,
    handler: MotorHandlerFn,
}

pub struct Entity {
    name: String,
    attributes: ahash::AHashMap<String, Attribute>,
    /// Registration order defines the motor-signal space's variable order.
    actions: Vec<MotorAction>,
    sensors: Vec<Sensor>,
    trigger_handlers: ahash::AHashMap<String, TriggerHandlerFn>,
    physics: Option<PhysicsFn>,
    emission: Option<EmissionFn>,
    agent: Option<Box<dyn Agent>>,

    event_queue: VecDeque<CausalEvent>,
    observations: ahash::AHashMap<String, Value>,
    prepared: Vec<(String, Value)>,
}

impl Entity {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: ahash::AHashMap::default(),
            actions: Vec::new(),
            sensors: Vec::new(),
            trigger_handlers: ahash::AHashMap::default(),
            physics: None,
            emission: None,
            agent: None,
            event_queue: VecDeque::new(),
            observations: ahash::AHashMap::default(),
            prepared: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // --- setup -----------------------------------------------------------

    pub fn add_attribute(
        &mut self,
        name: &str,
        initial: impl Into<Value>,
        domain: Vec<Value>,
        effect: impl Fn(&Value, &Value) -> Option<(String, Params)> + 'static,
    ) {
        self.attributes.insert(
            name.to_string(),
            Attribute {
                value: initial.into(),
                domain,
                effect: Rc::new(effect),
            },
        );
    }

    /// Register a motor signal: its name, ordered value domain, the default
    /// value executed on ticks where no command names this motor, and the
    /// handler that turns a chosen value into attribute changes.
    pub fn add_action(
        &mut self,
        name: &str,
        domain: Vec<Value>,
        default: impl Into<Value>,
        handler: impl Fn(&mut Entity, &Value) -> Result<()> + 'static,
    ) {
        self.actions.push(MotorAction {
            name: name.to_string(),
            domain,
            default: default.into(),
            handler: Rc::new(handler),
        });
    }

    pub fn add_sensor(&mut self, sensor: Sensor) {
        self.sensors.push(sensor);
    }

    /// Register the reaction to one causal event name.
    pub fn on_event(&mut self, event: &str, handler: impl Fn(&mut Entity, &Params) -> Result<()> + 'static) {
        self.trigger_handlers.insert(event.to_string(), Rc::new(handler));
    }

    pub fn set_physics(&mut self, physics: impl Fn(&mut Entity) -> Result<()> + 'static) {
        self.physics = Some(Rc::new(physics));
    }

    pub fn set_emission(&mut self, emission: impl Fn(&Entity) -> Vec<Signal> + 'static) {
        self.emission = Some(Rc::new(emission));
    }

    pub fn set_agent(&mut self, agent: Box<dyn Agent>) {
        self.agent = Some(agent);
    }

    // --- attribute access ------------------------------------------------

    pub fn attribute(&self, name: &str) -> Result<&Value> {
        self.attributes
            .get(name)
            .map(|a| &a.value)
            .ok_or_else(|| SimError::UnknownAttribute {
                entity: self.name.clone(),
                attribute: name.to_string(),
            })
    }

    /// Names of all attributes, sorted for deterministic measurement output.
    pub fn attribute_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.attributes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Domain-validated attribute write.
    ///
    /// A value outside the declared domain is an error, never clamped. When
    /// the value actually changes, the attribute's change effect runs and the
    /// resulting causal event is queued for the next trigger-dispatch phase.
    pub fn try_change(&mut self, name: &str, new: impl Into<Value>) -> Result<()> {
        let new = new.into();
        let attribute =
            self.attributes
                .get_mut(name)
                .ok_or_else(|| SimError::UnknownAttribute {
                    entity: self.name.clone(),
                    attribute: name.to_string(),
                })?;
        if !attribute.domain.contains(&new) {
            return Err(SimError::DomainViolation {
                name: name.to_string(),
                value: new,
            });
        }
        if attribute.value == new {
            return Ok(());
        }

        let old = std::mem::replace(&mut attribute.value, new.clone());
        let effect = Rc::clone(&attribute.effect);
        if let Some((event, params)) = effect(&old, &new) {
            tracing::trace!(entity = %self.name, attribute = name, %old, %new, event, "attribute change");
            self.event_queue.push_back(CausalEvent {
                attribute: name.to_string(),
                event,
                params,
            });
        }
        Ok(())
    }

    // --- perception ------------------------------------------------------

    pub fn senses_modality(&self, modality: &str) -> bool {
        self.sensors.iter().any(|s| s.detects_modality(modality))
    }

    /// Merge one perceived pair into this tick's observation set and forward
    /// it to the agent, if any.
    pub fn sense(&mut self, kind: &str, value: &Value) {
        self.observations.insert(kind.to_string(), value.clone());
        if let Some(agent) = self.agent.as_mut() {
            agent.sense(kind, value);
        }
    }

    pub fn observations(&self) -> &ahash::AHashMap<String, Value> {
        &self.observations
    }

    // --- tick phases (driven by the world) -------------------------------

    /// The motor-signal space spanned by the registered actions, in
    /// registration order.
    pub fn signal_space(&self) -> SignalSpace {
        SignalSpace::new(
            self.actions
                .iter()
                .map(|a| (a.name.clone(), a.domain.clone()))
                .collect(),
        )
    }

    /// One-time setup before the first tick: wires the agent to the
    /// motor-signal space.
    pub(crate) fn start(&mut self) -> Result<()> {
        let space = self.signal_space();
        if let Some(agent) = self.agent.as_mut() {
            agent.init(&space)?;
        }
        Ok(())
    }

    pub(crate) fn run_physics(&mut self) -> Result<()> {
        if let Some(physics) = self.physics.clone() {
            physics(self)?;
        }
        Ok(())
    }

    pub(crate) fn drain_events(&mut self) -> Vec<CausalEvent> {
        self.event_queue.drain(..).collect()
    }

    /// React to a dispatched event. An event with no registered handler is a
    /// silent no-op, not an error.
    pub(crate) fn call_trigger(&mut self, event: &str, params: &Params) -> Result<()> {
        if let Some(handler) = self.trigger_handlers.get(event).cloned() {
            handler(self, params)?;
        }
        Ok(())
    }

    pub(crate) fn reset_observations(&mut self) {
        self.observations.clear();
    }

    pub(crate) fn emit(&self) -> Vec<Signal> {
        match &self.emission {
            Some(emission) => emission(self),
            None => Vec::new(),
        }
    }

    /// Choose this tick's action from the post-delivery observation snapshot;
    /// execution is deferred so all entities choose before any acts.
    pub(crate) fn prepare_action(&mut self) -> Result<()> {
        let Some(agent) = self.agent.as_mut() else {
            return Ok(());
        };

        // Sensor defaults stand in for signal kinds nothing emitted this tick.
        for sensor in &self.sensors {
            for (kind, value) in sensor.defaults() {
                if !self.observations.contains_key(kind) {
                    self.observations.insert(kind.clone(), value.clone());
                    agent.sense(kind, value);
                }
            }
        }

        self.prepared = agent.act()?;
        Ok(())
    }

    /// Run every motor handler: prepared commands first, then each motor the
    /// command left out with its default value. The handler always runs, so
    /// defaults with side effects behave the same as explicit commands.
    pub(crate) fn execute_prepared(&mut self) -> Result<()> {
        let mut commands = std::mem::take(&mut self.prepared);
        for action in &self.actions {
            if !commands.iter().any(|(motor, _)| motor == &action.name) {
                commands.push((action.name.clone(), action.default.clone()));
            }
        }

        for (motor, value) in commands {
            let handler = {
                let action = self
                    .actions
                    .iter()
                    .find(|a| a.name == motor)
                    .ok_or_else(|| SimError::UnknownMotorSignal {
                        entity: self.name.clone(),
                        motor: motor.clone(),
                    })?;
                if !action.domain.contains(&value) {
                    return Err(SimError::DomainViolation {
                        name: motor.clone(),
                        value: value.clone(),
                    });
                }
                Rc::clone(&action.handler)
            };
            handler(self, &value)?;
        }
        Ok(())
    }
}
