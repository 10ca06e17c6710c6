//! Property tests for jobage-filter

use jobage_filter::{ExclusionRule, PredicateSet, Selection, apply};
use jobage_testkit::proptest::{strategy_center, strategy_records, strategy_service_type, strategy_warranty};
use proptest::prelude::*;

fn strategy_selection(values: impl Strategy<Value = String>) -> impl Strategy<Value = Selection> {
    prop_oneof![
        1 => Just(Selection::All),
        2 => values.prop_map(Selection::Only),
    ]
}

fn strategy_predicate_set() -> impl Strategy<Value = PredicateSet> {
    (
        strategy_selection(strategy_warranty()),
        strategy_selection(strategy_service_type()),
        strategy_selection(strategy_center()),
    )
        .prop_map(|(warranty_status, service_type, service_center)| PredicateSet {
            warranty_status,
            service_type,
            service_center,
            parts_picking_status: Selection::All,
        })
}

proptest! {
    #[test]
    fn filtering_is_idempotent(records in strategy_records(50), set in strategy_predicate_set()) {
        let rules = ExclusionRule::default_rules();
        let once = apply(&records, &set, &rules);
        let twice = apply(&once, &set, &rules);
        let once_ids: Vec<_> = once.iter().map(|r| r.order_id.clone()).collect();
        let twice_ids: Vec<_> = twice.iter().map(|r| r.order_id.clone()).collect();
        prop_assert_eq!(once_ids, twice_ids);
    }

    #[test]
    fn filtering_preserves_order_and_subset(records in strategy_records(50), set in strategy_predicate_set()) {
        let out = apply(&records, &set, &ExclusionRule::default_rules());
        let positions: Vec<usize> = out
            .iter()
            .map(|r| records.iter().position(|x| std::ptr::eq(x, *r)).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(out.iter().all(|r| set.matches(r)));
    }

    #[test]
    fn oow_inspection_is_always_empty(records in strategy_records(50)) {
        let set = PredicateSet::new().with_warranty("OOW").with_service_type("Inspection");
        prop_assert!(apply(&records, &set, &ExclusionRule::default_rules()).is_empty());
    }

    #[test]
    fn unconstrained_set_keeps_everything(records in strategy_records(50)) {
        let out = apply(&records, &PredicateSet::new(), &ExclusionRule::default_rules());
        prop_assert_eq!(out.len(), records.len());
    }
}
