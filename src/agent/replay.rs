//! Log replay agent
//!
//! Plays back the motion of an entity recorded in a previous run: each tick it
//! compares the watched attribute's logged value with the previous tick's and
//! translates the pair into a motor command. Used for yoked control
//! conditions, where one entity mechanically reproduces another's behavior.

use crate::agent::Agent;
use crate::core::{Result, Value};
use crate::log::RunLog;
use crate::prob::SignalSpace;
use std::rc::Rc;

pub struct ReplayAgent {
    /// Motor signal the translated values are emitted on.
    motor: String,
    /// Logged values of the watched attribute, one per tick.
    history: Vec<Value>,
    /// Maps (previous value, current value) to a motor value.
    translate: Rc<dyn Fn(&Value, &Value) -> Value>,
    tick: usize,
}

impl ReplayAgent {
    /// Watch `attribute` of `entity` in a recorded log and replay it on
    /// `motor`. `translate` turns consecutive attribute values into the motor
    /// value (e.g. two positions into a direction of movement).
    pub fn from_log(
        log: &RunLog,
        entity: &str,
        attribute: &str,
        motor: &str,
        translate: impl Fn(&Value, &Value) -> Value + 'static,
    ) -> Self {
        let history = log
            .attribute_history(entity, attribute)
            .into_iter()
            .map(|(_, value)| value)
            .collect();
        Self {
            motor: motor.to_string(),
            history,
            translate: Rc::new(translate),
            tick: 0,
        }
    }
}

impl Agent for ReplayAgent {
    fn init(&mut self, _space: &SignalSpace) -> Result<()> {
        Ok(())
    }

    fn sense(&mut self, _name: &str, _value: &Value) {}

    fn act(&mut self) -> Result<Vec<(String, Value)>> {
        let tick = self.tick;
        self.tick += 1;

        // Before the second logged value exists (and after the recording
        // ends) there is no movement to reproduce.
        let command = match (tick.checked_sub(1).and_then(|t| self.history.get(t)), self.history.get(tick)) {
            (Some(prev), Some(cur)) => Some((self.motor.clone(), (self.translate)(prev, cur))),
            _ => None,
        };
        Ok(command.into_iter().collect())
    }
}
