// =====================================================================
// File: tests/property.rs
//
// Description:
//   Property-based and randomized coverage that unit/integration tests
//   don't exercise directly: order-independence of a key set (property
//   4), the full insert-then-delete empty/full cycle for an arbitrary
//   key set (property 8), and a true randomized 1000-key permutation
//   stress test (the randomized counterpart of scenario S6).
// =====================================================================
use std::collections::HashSet;

use bptree_index::index::Tree;
use quickcheck::{Arbitrary, Gen, QuickCheck, TestResult};
use quickcheck_macros::quickcheck;
use rand::prelude::SliceRandom;
use rand::SeedableRng;

/// A small set of distinct keys, used as the base for permutation tests.
#[derive(Clone, Debug)]
struct DistinctKeys(Vec<i64>);

impl Arbitrary for DistinctKeys {
    fn arbitrary(g: &mut Gen) -> Self {
        let raw: Vec<i64> = Vec::<i64>::arbitrary(g);
        let mut seen = HashSet::new();
        let distinct: Vec<i64> = raw
            .into_iter()
            .map(|k| k % 2000)
            .filter(|k| seen.insert(*k))
            .take(60)
            .collect();
        DistinctKeys(distinct)
    }
}

#[quickcheck]
fn property_order_independence(keys: DistinctKeys, shuffle_seed: u64) -> TestResult {
    if keys.0.is_empty() {
        return TestResult::discard();
    }
    let mut order_a = keys.0.clone();
    let mut order_b = keys.0.clone();
    let mut rng = rand::rngs::StdRng::seed_from_u64(shuffle_seed);
    order_b.shuffle(&mut rng);

    let mut tree_a = Tree::new(4, 4);
    for &k in &order_a {
        tree_a.insert(k, k * 10).unwrap();
    }
    let mut tree_b = Tree::new(4, 4);
    for &k in &order_b {
        tree_b.insert(k, k * 10).unwrap();
    }

    order_a.sort_unstable();
    for &k in &order_a {
        if tree_a.search(k) != tree_b.search(k) {
            return TestResult::failed();
        }
    }
    TestResult::passed()
}

#[quickcheck]
fn property_empty_full_cycle(keys: DistinctKeys, shuffle_seed: u64) -> TestResult {
    if keys.0.is_empty() {
        return TestResult::discard();
    }
    let mut insert_order = keys.0.clone();
    let mut delete_order = keys.0.clone();
    let mut rng = rand::rngs::StdRng::seed_from_u64(shuffle_seed);
    insert_order.shuffle(&mut rng);
    delete_order.shuffle(&mut rng);

    let mut tree = Tree::new(4, 4);
    for &k in &insert_order {
        tree.insert(k, k).unwrap();
    }
    if tree.check_invariants().is_err() {
        return TestResult::failed();
    }
    for &k in &delete_order {
        tree.delete(k).unwrap();
    }
    TestResult::from_bool(tree.is_empty())
}

#[test]
fn randomized_1000_key_permutation_insert_and_delete() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0xB9_1000);
    let mut keys: Vec<i64> = (1..=1000).collect();
    keys.shuffle(&mut rng);

    let mut t = Tree::new(7, 10);
    for &k in &keys {
        t.insert(k, k * 10).unwrap();
    }
    t.check_invariants().unwrap();
    for &k in &keys {
        assert_eq!(t.search(k), Some(k * 10));
    }

    let mut delete_order = keys.clone();
    delete_order.shuffle(&mut rng);
    for &k in &delete_order {
        t.delete(k).unwrap();
        t.check_invariants().unwrap();
    }
    assert!(t.is_empty());
}

#[test]
fn quickcheck_runs_with_a_modest_test_count() {
    fn prop_search_after_insert(keys: DistinctKeys) -> TestResult {
        if keys.0.is_empty() {
            return TestResult::discard();
        }
        let mut t = Tree::new(3, 5);
        for &k in &keys.0 {
            t.insert(k, k + 1).unwrap();
        }
        for &k in &keys.0 {
            if t.search(k) != Some(k + 1) {
                return TestResult::failed();
            }
        }
        TestResult::passed()
    }
    QuickCheck::new()
        .tests(200)
        .quickcheck(prop_search_after_insert as fn(DistinctKeys) -> TestResult);
}
