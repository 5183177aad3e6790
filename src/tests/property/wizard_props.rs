//! Property-based tests for the wizard session
//!
//! Tests invariants:
//! - A try-on only begins with both selections and nothing pending
//! - Reset always keeps the person and clears the outfit
//! - Loading history never grows the log
//! - Result is never reachable by jumping

use proptest::prelude::*;

use crate::core::generation::{Completion, TryOnOutput};
use crate::core::wizard::{PendingOperation, WizardStep};
use crate::tests::common::{create_test_session, result_image};

#[derive(Debug, Clone)]
enum Op {
    SelectPerson(&'static str),
    SelectClothing(&'static str),
    Advance,
    Back,
    JumpTo(WizardStep),
    Reset,
    TryOn,
    Complete,
    LoadLatest,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        prop_oneof![Just("p1"), Just("p2"), Just("nope")].prop_map(Op::SelectPerson),
        prop_oneof![Just("c1"), Just("c2"), Just("nope")].prop_map(Op::SelectClothing),
        Just(Op::Advance),
        Just(Op::Back),
        prop_oneof![
            Just(WizardStep::SelectPerson),
            Just(WizardStep::SelectClothing),
            Just(WizardStep::Result)
        ]
        .prop_map(Op::JumpTo),
        Just(Op::Reset),
        Just(Op::TryOn),
        Just(Op::Complete),
        Just(Op::LoadLatest),
    ]
}

proptest! {
    #[test]
    fn wizard_gates_hold(ops in prop::collection::vec(arb_op(), 0..40)) {
        let mut session = create_test_session();
        let mut in_flight = None;

        for op in ops {
            match op {
                Op::SelectPerson(id) => { session.select_person(id); }
                Op::SelectClothing(id) => { session.select_clothing(id); }
                Op::Advance => { session.advance(); }
                Op::Back => { session.back(); }
                Op::JumpTo(step) => {
                    let moved = session.jump_to(step);
                    prop_assert!(!(moved && step == WizardStep::Result));
                }
                Op::Reset => {
                    let person = session.state().selected_person_id().map(str::to_string);
                    session.reset();
                    let state = session.state();
                    prop_assert_eq!(state.selected_person_id().map(str::to_string), person);
                    prop_assert!(state.selected_clothing.is_none());
                    prop_assert!(state.result_image.is_none());
                    prop_assert!(state.critique.is_none());
                    prop_assert_eq!(state.step, WizardStep::SelectPerson);
                    prop_assert_eq!(state.pending, PendingOperation::None);
                }
                Op::TryOn => {
                    let allowed = session.state().can_try_on();
                    let job = session.request_try_on();
                    prop_assert_eq!(job.is_some(), allowed);
                    if let Some(job) = job {
                        prop_assert_eq!(session.state().step, WizardStep::Result);
                        in_flight = Some(job);
                    }
                }
                Op::Complete => {
                    if let Some(job) = in_flight.take() {
                        let before = session.history().len();
                        session.apply(Completion::TryOn {
                            ticket: job.ticket,
                            person: job.person,
                            clothing: job.clothing,
                            outcome: Ok(TryOnOutput { image: result_image("r"), critique: "c".to_string() }),
                        });
                        prop_assert_eq!(session.history().len(), before + 1);
                        prop_assert!(!session.is_pending());
                    }
                }
                Op::LoadLatest => {
                    let before = session.history().len();
                    if let Some(id) = session.history().latest().map(|i| i.id.clone()) {
                        if session.load_history_item(&id) {
                            prop_assert_eq!(session.state().step, WizardStep::Result);
                        }
                    }
                    prop_assert_eq!(session.history().len(), before);
                }
            }
        }
    }
}
