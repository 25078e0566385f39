//! Operant conditioning: reinforce motor signals that are followed by reward
//!
//! The agent keeps a joint probability distribution over its whole
//! motor-signal space. Each cycle it first judges whether the current
//! observations contain a rewarding stimulus, nudges the probability of the
//! previously chosen action up or down accordingly, renormalizes, and then
//! samples the next action from the adjusted distribution.

use crate::agent::{Agent, PolicyEvent, PolicySink};
use crate::core::{Assignment, Result, SimError, Value};
use crate::prob::{ProbabilityTable, SignalSpace};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::rc::Rc;

/// Which assignments receive credit when a reward arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePolicy {
    /// Only the exact assignment that was chosen (the default).
    Exact,
    /// Every assignment sharing at least one motor-signal value with the
    /// chosen action. Punishment still targets the exact assignment.
    SharedValue,
}

pub struct OperantAgent {
    /// Stimuli that count as rewarding; one match suffices.
    rewards: Vec<(String, Value)>,
    observations: ahash::AHashMap<String, Value>,
    /// Slot index of the action performed last cycle.
    last_action: Option<usize>,
    table: Option<ProbabilityTable>,

    delta_pos: f64,
    delta_neg: f64,
    min_probability: f64,

    valuation: Rc<dyn Fn(&Assignment) -> f64>,
    valuation_bias: f64,

    policy: UpdatePolicy,
    rng: ChaCha8Rng,
    sink: Option<Box<dyn PolicySink>>,
}

impl OperantAgent {
    pub fn new(rewards: Vec<(String, Value)>, seed: u64) -> Self {
        Self {
            rewards,
            observations: ahash::AHashMap::default(),
            last_action: None,
            table: None,
            delta_pos: 0.1,
            delta_neg: 0.05,
            min_probability: 0.01,
            valuation: Rc::new(|_| 1.0),
            valuation_bias: 1.0,
            policy: UpdatePolicy::Exact,
            rng: ChaCha8Rng::seed_from_u64(seed),
            sink: None,
        }
    }

    /// Override the reward increment, punishment decrement, and probability
    /// floor. The floor keeps every assignment selectable forever; there is
    /// no absorbing zero-probability state.
    pub fn with_parameters(mut self, delta_pos: f64, delta_neg: f64, min_probability: f64) -> Self {
        self.delta_pos = delta_pos;
        self.delta_neg = delta_neg;
        self.min_probability = min_probability;
        self
    }

    /// Weight action desirability independent of probability.
    ///
    /// Selection weight becomes `p · (1 + bias·(valuation − 1))`: bias 1
    /// applies the valuation as given, bias 0 ignores it.
    pub fn with_valuation(
        mut self,
        valuation: impl Fn(&Assignment) -> f64 + 'static,
        bias: f64,
    ) -> Self {
        self.valuation = Rc::new(valuation);
        self.valuation_bias = bias;
        self
    }

    pub fn with_policy(mut self, policy: UpdatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_sink(mut self, sink: Box<dyn PolicySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn probabilities(&self) -> Option<&ProbabilityTable> {
        self.table.as_ref()
    }

    pub fn take_sink(&mut self) -> Option<Box<dyn PolicySink>> {
        self.sink.take()
    }

    fn got_reward(&self) -> bool {
        self.rewards
            .iter()
            .any(|(name, value)| self.observations.get(name) == Some(value))
    }

    fn table_mut(&mut self) -> Result<&mut ProbabilityTable> {
        self.table
            .as_mut()
            .ok_or_else(|| SimError::MechanismNotInitialized("operant".into()))
    }

    fn emit(&mut self, event: PolicyEvent) {
        if let Some(sink) = self.sink.as_mut() {
            sink.record(event);
        }
    }

    /// Nudge the last action's probability and restore total mass to 1.
    ///
    /// Renormalization divides every slot by `1 + (new − old)`; exact because
    /// precisely one slot changed and the table summed to 1 before.
    fn update_probabilities(&mut self, rewarded: bool) -> Result<()> {
        let Some(last) = self.last_action else {
            // Nothing was chosen yet, so there is nothing to judge.
            return Ok(());
        };

        if rewarded && self.policy == UpdatePolicy::SharedValue {
            return self.update_shared_value(last);
        }

        let delta_pos = self.delta_pos;
        let delta_neg = self.delta_neg;
        let floor = self.min_probability;

        let table = self.table_mut()?;
        let old = table.get_index(last);
        let new = if rewarded {
            old + delta_pos
        } else {
            (old - delta_neg).max(floor)
        };
        table.set_index(last, new);
        table.map(|p| p / (1.0 + (new - old)));

        tracing::debug!(
            old,
            new,
            rewarded,
            normalized = table.get_index(last),
            "probability update"
        );
        let action = table.space().assignment_at(last);
        self.emit(PolicyEvent::Update {
            action,
            old,
            new,
            rewarded,
        });
        Ok(())
    }

    /// Reward variant: credit every assignment sharing at least one
    /// motor-signal value with the chosen action.
    fn update_shared_value(&mut self, last: usize) -> Result<()> {
        let delta_pos = self.delta_pos;
        let table = self.table_mut()?;
        let chosen = table.space().assignment_at(last);
        let old = table.get_index(last);

        let mut added = 0.0;
        for i in 0..table.len() {
            let candidate = table.space().assignment_at(i);
            let shares_value = chosen
                .iter()
                .any(|(name, value)| candidate.get(name) == Some(value));
            if shares_value {
                table.set_index(i, table.get_index(i) + delta_pos);
                added += delta_pos;
            }
        }
        table.map(|p| p / (1.0 + added));

        let new = table.get_index(last);
        tracing::debug!(old, new, added, "shared-value probability update");
        self.emit(PolicyEvent::Update {
            action: chosen,
            old,
            new,
            rewarded: true,
        });
        Ok(())
    }

    /// Weighted sample over the enumerated assignment space.
    fn select_action(&mut self) -> Result<usize> {
        let valuation = Rc::clone(&self.valuation);
        let bias = self.valuation_bias;
        let table = self
            .table
            .as_ref()
            .ok_or_else(|| SimError::MechanismNotInitialized("operant".into()))?;

        let weights: Vec<f64> = (0..table.len())
            .map(|i| {
                let value = valuation(&table.space().assignment_at(i));
                table.get_index(i) * (1.0 + bias * (value - 1.0))
            })
            .collect();
        let total: f64 = weights.iter().sum();

        // All weights zero leaves the draw undefined; fall back to a uniform
        // pick from the same generator so runs stay reproducible.
        if total <= 0.0 {
            let pick = self.rng.gen_range(0..weights.len());
            tracing::debug!(pick, "zero total weight, uniform fallback");
            return Ok(pick);
        }

        let draw = self.rng.gen::<f64>() * total;
        let mut cumulative = 0.0;
        let mut chosen = weights.len() - 1;
        for (i, w) in weights.iter().enumerate() {
            cumulative += w;
            if cumulative >= draw {
                chosen = i;
                break;
            }
        }

        tracing::debug!(
            chosen,
            weight = weights[chosen],
            total,
            draw,
            "selected action"
        );
        let action = table.space().assignment_at(chosen);
        let event = PolicyEvent::Selection {
            action,
            weight: weights[chosen],
            total_weight: total,
            draw,
        };
        self.emit(event);
        Ok(chosen)
    }
}

impl Agent for OperantAgent {
    fn init(&mut self, space: &SignalSpace) -> Result<()> {
        self.table = Some(ProbabilityTable::uniform(space.clone()));
        Ok(())
    }

    fn sense(&mut self, name: &str, value: &Value) {
        self.observations.insert(name.to_string(), value.clone());
    }

    fn act(&mut self) -> Result<Vec<(String, Value)>> {
        if self.last_action.is_some() {
            let rewarded = self.got_reward();
            self.update_probabilities(rewarded)?;
        }

        let chosen = self.select_action()?;
        self.last_action = Some(chosen);
        // Observations are tick-local; the next delivery phase rebuilds them.
        self.observations.clear();

        let table = self
            .table
            .as_ref()
            .ok_or_else(|| SimError::MechanismNotInitialized("operant".into()))?;
        let assignment = table.space().assignment_at(chosen);
        // Emit pairs in variable order so motor execution stays deterministic.
        Ok(table
            .space()
            .variables()
            .iter()
            .map(|var| (var.name.clone(), assignment[&var.name].clone()))
            .collect())
    }
}
