//! Property tests for ordering and removal.
//!
//! Random sequences of add and remove operations are applied to an injector
//! and to a plain `Vec` model. After every sequence the execute bucket must
//! hold exactly the live sources of the model, in the model's order.


use fakepass_core::prelude::*;
use proptest::prelude::*;
use std::sync::Arc;
use test_utils::{Journal, MockInjector, Point, Recorder};

#[derive(Debug, Clone)]
enum Op {
    Add(usize),
    Remove(usize),
}

fn arb_ops(sources: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            (0..sources).prop_map(Op::Add),
            (0..sources).prop_map(Op::Remove),
        ],
        0..40,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Execute order equals the order of live additions, whatever was added
    /// twice or removed in between.
    #[test]
    fn prop_dispatch_order_matches_model(ops in arb_ops(6)) {
        let injector = MockInjector::new();
        let journal = Journal::new();
        let sources: Vec<Arc<Recorder>> = (0..6)
            .map(|i| Recorder::new(format!("s{i}"), &journal))
            .collect();
        let mut model: Vec<usize> = Vec::new();

        for op in &ops {
            match *op {
                Op::Add(i) => {
                    let registration = injector.add(&sources[i]);
                    if model.contains(&i) {
                        prop_assert!(registration.is_duplicate());
                    } else {
                        prop_assert!(registration.is_clean());
                        model.push(i);
                    }
                }
                Op::Remove(i) => {
                    injector.remove(&sources[i].source_id());
                    model.retain(|live| *live != i);
                }
            }
        }

        let mut ctx = Vec::new();
        let report = injector.on_execute(Point::BeforePostProcess, &mut ctx);
        let expected: Vec<String> = model.iter().map(|i| format!("s{i}")).collect();

        prop_assert_eq!(report.invoked(), model.len());
        prop_assert_eq!(ctx, expected);
        prop_assert_eq!(injector.source_count(), model.len());
    }

    /// A removed source leaves no callback in any bucket.
    #[test]
    fn prop_removed_sources_leave_nothing(ops in arb_ops(4)) {
        let injector = MockInjector::new();
        let journal = Journal::new();
        let sources: Vec<Arc<Recorder>> = (0..4)
            .map(|i| Recorder::new(format!("s{i}"), &journal))
            .collect();

        for op in &ops {
            match *op {
                Op::Add(i) => {
                    injector.add(&sources[i]);
                }
                Op::Remove(i) => {
                    injector.remove(&sources[i].source_id());
                }
            }
        }

        for source in &sources {
            let id = source.source_id();
            prop_assert_eq!(injector.contains(&id), injector.has_callbacks(&id));
        }
        for stage in StageKind::ALL {
            prop_assert_eq!(
                injector.callback_count(stage, Point::BeforePostProcess),
                injector.source_count()
            );
        }
    }
}
