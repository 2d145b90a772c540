//! Property-based tests for ticket algebra and fairness convergence.

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;

use prometheus_fair_queue::config::FairQueueConfig;
use prometheus_fair_queue::core::{FairQueue, ResourceTicket};

/// Component range keeps sums well inside u32, so algebra never overflows.
fn ticket() -> impl Strategy<Value = ResourceTicket> {
    (0u32..=65_535, 0u32..=65_535).prop_map(|(w, s)| ResourceTicket::new(w, s))
}

proptest! {
    #[test]
    fn addition_then_subtraction_round_trips(a in ticket(), b in ticket()) {
        prop_assert_eq!((a + b) - b, a);
    }

    #[test]
    fn addition_is_component_wise(a in ticket(), b in ticket()) {
        let sum = a + b;
        prop_assert_eq!(sum.weight(), a.weight() + b.weight());
        prop_assert_eq!(sum.size(), a.size() + b.size());
    }

    #[test]
    fn strictly_less_is_a_strict_partial_order(a in ticket(), b in ticket()) {
        // Irreflexive and asymmetric.
        prop_assert!(!a.strictly_less(a));
        if a.strictly_less(b) {
            prop_assert!(!b.strictly_less(a));
        }
    }

    #[test]
    fn zero_ticket_iff_both_components_zero(a in ticket()) {
        prop_assert_eq!(a.is_non_zero(), a.weight() > 0 || a.size() > 0);
    }

    #[test]
    fn normalize_is_scale_invariant(a in ticket(), k in 1u32..=16) {
        let axis = ResourceTicket::new(1 << 20, 1 << 20);
        let scaled_axis = ResourceTicket::new(axis.weight() * k, axis.size() * k);
        let scaled = ResourceTicket::new(a.weight() * k, a.size() * k);
        let diff = (scaled.normalize(scaled_axis) - a.normalize(axis)).abs();
        prop_assert!(diff < 1e-9);
    }
}

/// Strategy for a set of classes with random share counts under sustained
/// load: every class always has pending work, so fairness can be measured
/// cleanly against the share proportions.
fn share_scenario() -> impl Strategy<Value = Vec<u32>> {
    proptest::collection::vec(1u32..=5, 2..=4)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Under sustained identical-cost load, each class's served fraction
    /// lands within 10% of `shares / total_shares`.
    #[test]
    fn service_is_proportional_to_shares(shares in share_scenario()) {
        let per_round = 10u32;
        let rounds = 40usize;
        let mut q = FairQueue::new(FairQueueConfig::with_capacity(per_round, u32::MAX));
        let log = Rc::new(RefCell::new(Vec::new()));

        let classes: Vec<_> = shares
            .iter()
            .map(|&s| q.register_priority_class(s))
            .collect();

        for _ in 0..rounds {
            for (tag, class) in classes.iter().enumerate() {
                for _ in 0..per_round {
                    let log = Rc::clone(&log);
                    q.queue(
                        class,
                        ResourceTicket::new(1, 128),
                        Box::new(move || {
                            log.borrow_mut().push(tag);
                            Ok(())
                        }),
                    );
                }
            }
            q.dispatch_requests();
            let executing = q.resources_currently_executing();
            let nr = q.requests_currently_executing();
            q.notify_requests_finished(executing, nr);
        }

        let served = log.borrow();
        let total = served.len();
        prop_assert_eq!(total, rounds * per_round as usize);

        let total_shares: u32 = shares.iter().sum();
        for (tag, &weight) in shares.iter().enumerate() {
            let expected = f64::from(weight) / f64::from(total_shares);
            let count = served.iter().filter(|&&t| t == tag).count();
            #[allow(clippy::cast_precision_loss)]
            let actual = count as f64 / total as f64;
            prop_assert!(
                (actual - expected).abs() <= 0.10,
                "class {} (shares={}): expected share {:.3}, got {:.3} ({}/{})",
                tag, weight, expected, actual, count, total
            );
        }
    }
}
