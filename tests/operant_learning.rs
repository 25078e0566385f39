//! Properties of the operant conditioning mechanism
//!
//! - the probability table sums to 1 after every update, for any sequence of
//!   reward and non-reward outcomes
//! - no entry falls below the probability floor under repeated punishment
//! - reinforcement concentrates probability mass on the rewarded action
//! - the policy sink receives structured update and selection events

use proptest::prelude::*;
use skinnerbox::agent::{Agent, OperantAgent, PolicyEvent, PolicySink};
use skinnerbox::core::Value;
use skinnerbox::prob::SignalSpace;
use std::cell::RefCell;
use std::rc::Rc;

fn limb_space() -> SignalSpace {
    SignalSpace::new(vec![
        (
            "left-hand".into(),
            vec![Value::sym("up"), Value::sym("still"), Value::sym("down")],
        ),
        (
            "right-foot".into(),
            vec![Value::sym("up"), Value::sym("still"), Value::sym("down")],
        ),
    ])
}

fn conditioned_agent(seed: u64) -> OperantAgent {
    let mut agent = OperantAgent::new(vec![("movement".into(), Value::Bool(true))], seed);
    agent.init(&limb_space()).unwrap();
    agent
}

proptest! {
    #[test]
    fn normalization_survives_any_outcome_sequence(
        verdicts in proptest::collection::vec(any::<bool>(), 1..200),
        seed in any::<u64>(),
    ) {
        let mut agent = conditioned_agent(seed);

        // First act establishes a previous action without updating.
        agent.act().unwrap();

        for rewarded in verdicts {
            agent.sense("movement", &Value::Bool(rewarded));
            agent.act().unwrap();

            let total = agent.probabilities().unwrap().total();
            prop_assert!((total - 1.0).abs() < 1e-9, "total drifted to {}", total);
        }
    }

    #[test]
    fn floor_holds_under_sustained_punishment(rounds in 1usize..300) {
        let mut agent = conditioned_agent(11);
        agent.act().unwrap();

        for _ in 0..rounds {
            // Never rewarding: no observation matches the specification.
            agent.sense("movement", &Value::Bool(false));
            agent.act().unwrap();
        }

        let table = agent.probabilities().unwrap();
        for (assignment, p) in table.iter() {
            prop_assert!(
                p >= 0.01 - 1e-9,
                "{:?} fell to {} under punishment-only updates",
                assignment,
                p
            );
        }
    }
}

#[test]
fn reinforcement_concentrates_mass_on_the_rewarded_choice() {
    let space = SignalSpace::new(vec![(
        "left".into(),
        vec![Value::sym("down"), Value::sym("up")],
    )]);
    let mut agent = OperantAgent::new(vec![("movement".into(), Value::Bool(true))], 3);
    agent.init(&space).unwrap();

    // Reward exactly when the previous choice was "down". Every update then
    // shifts mass toward it, whichever branch fires.
    let mut action = agent.act().unwrap();
    for _ in 0..500 {
        let chose_down = action[0].1 == Value::sym("down");
        agent.sense("movement", &Value::Bool(chose_down));
        action = agent.act().unwrap();
    }

    let table = agent.probabilities().unwrap();
    let p_of = |value: Value| {
        table
            .iter()
            .find(|(a, _)| a["left"] == value)
            .map(|(_, p)| p)
            .unwrap()
    };
    let p_down = p_of(Value::sym("down"));
    let p_up = p_of(Value::sym("up"));

    assert!(p_down > 0.9, "p(down) only reached {}", p_down);
    assert!((p_down + p_up - 1.0).abs() < 1e-9);
}

#[test]
fn sink_receives_update_and_selection_events() {
    struct SharedSink(Rc<RefCell<Vec<PolicyEvent>>>);

    impl PolicySink for SharedSink {
        fn record(&mut self, event: PolicyEvent) {
            self.0.borrow_mut().push(event);
        }
    }

    let events = Rc::new(RefCell::new(Vec::new()));
    let mut agent = OperantAgent::new(vec![("movement".into(), Value::Bool(true))], 5)
        .with_sink(Box::new(SharedSink(Rc::clone(&events))));
    agent.init(&limb_space()).unwrap();

    agent.act().unwrap();
    agent.sense("movement", &Value::Bool(true));
    agent.act().unwrap();

    let events = events.borrow();
    let updates = events
        .iter()
        .filter(|e| matches!(e, PolicyEvent::Update { .. }))
        .count();
    let selections = events
        .iter()
        .filter(|e| matches!(e, PolicyEvent::Selection { .. }))
        .count();

    // Two cycles: one selection each, and one update (the first cycle has no
    // previous action to judge).
    assert_eq!(selections, 2);
    assert_eq!(updates, 1);

    let Some(PolicyEvent::Update { old, new, rewarded, .. }) = events
        .iter()
        .find(|e| matches!(e, PolicyEvent::Update { .. }))
    else {
        unreachable!();
    };
    assert!(*rewarded);
    assert!((new - old - 0.1).abs() < 1e-12);
}
