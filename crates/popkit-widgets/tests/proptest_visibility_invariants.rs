//! Property-based invariant tests for popover visibility.
//!
//! 1. After any sequence of activate / close / outside calls, `is_open()`
//!    equals folding the transition table over the sequence.
//! 2. Driving the same sequence through the document (trigger clicks,
//!    close-button clicks, outside presses) lands in the same state.
//! 3. `activate` is idempotent.
//! 4. An effective transition is reported exactly when the state changes.

use popkit_runtime::Document;
use popkit_widgets::popover::view::CLOSE_CLASS;
use popkit_widgets::popover::{Popover, PopoverConfig, PopoverProps, PopoverState, Visibility};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Call {
    Activate,
    RequestClose,
    Outside,
}

fn calls() -> impl Strategy<Value = Vec<Call>> {
    proptest::collection::vec(
        prop_oneof![
            Just(Call::Activate),
            Just(Call::RequestClose),
            Just(Call::Outside),
        ],
        0..64,
    )
}

/// Reference fold of the transition table.
fn fold(initial: bool, calls: &[Call]) -> bool {
    calls.iter().fold(initial, |_, call| match call {
        Call::Activate => true,
        Call::RequestClose | Call::Outside => false,
    })
}

proptest! {
    #[test]
    fn state_matches_fold(initial in any::<bool>(), calls in calls()) {
        let mut state = PopoverState::new(initial);
        let mut open = initial;
        for call in &calls {
            let before = state.visibility();
            let transition = match call {
                Call::Activate => state.activate(),
                Call::RequestClose => state.request_close(),
                Call::Outside => state.outside_interaction_detected(),
            };
            open = fold(open, std::slice::from_ref(call));
            prop_assert_eq!(transition.is_some(), before != state.visibility());
        }
        prop_assert_eq!(state.is_open(), fold(initial, &calls));
        prop_assert_eq!(state.is_open(), open);
    }
}

proptest! {
    #[test]
    fn activate_twice_equals_once(initial in any::<bool>(), calls in calls()) {
        let mut once = PopoverState::new(initial);
        let mut twice = PopoverState::new(initial);
        for call in &calls {
            for state in [&mut once, &mut twice] {
                match call {
                    Call::Activate => { state.activate(); }
                    Call::RequestClose => { state.request_close(); }
                    Call::Outside => { state.outside_interaction_detected(); }
                }
            }
        }
        once.activate();
        twice.activate();
        twice.activate();
        prop_assert_eq!(once, twice);
        prop_assert_eq!(twice.visibility(), Visibility::Open);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn document_driven_matches_fold(initial in any::<bool>(), calls in calls()) {
        let mut doc = Document::new();
        let tree = doc.tree_mut();
        let trigger = tree.create_element("button");
        let item = tree.create_text("x");

        let props = PopoverProps::new(trigger)
            .content(item)
            .config(PopoverConfig::default().initially_visible(initial));
        let mut popover = Popover::mount(&mut doc, props).unwrap();

        for call in &calls {
            match call {
                Call::Activate => { doc.click(trigger); }
                // Nothing has bounds, so this resolves to the root.
                Call::Outside => { doc.pointer_down_at(0, 0); }
                Call::RequestClose => {
                    // The close affordance only exists while open.
                    match doc.tree().find_by_class(CLOSE_CLASS) {
                        Some(close) => { doc.click(close); }
                        None => { popover.request_close(); }
                    }
                }
            }
            popover.sync(&mut doc).unwrap();
        }
        prop_assert_eq!(popover.is_open(), fold(initial, &calls));
    }
}
