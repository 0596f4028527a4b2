//! Property-based tests for graph construction.
//!
//! Tests the following invariants across each family's parameter space:
//! - GRAPH-1: every parent index is strictly below its node
//! - GRAPH-2: parent lists contain no duplicates
//! - GRAPH-3: construction with equal parameters and id is reproducible

#![allow(unused_imports)]
use pospace::{Graph, GraphFamily, KvStore};
use proptest::prelude::*;

fn build(family: GraphFamily, id: u64) -> (tempfile::TempDir, Graph) {
    let dir = tempfile::tempdir().unwrap();
    let db = sled::open(dir.path()).unwrap();
    let graph = family
        .construct(KvStore::new(db.open_tree("graph").unwrap()), id)
        .unwrap();
    (dir, graph)
}

fn check_parent_invariants(graph: &Graph) -> Result<(), TestCaseError> {
    for idx in 0..graph.size() {
        let parents = graph.parents(idx).unwrap();
        for (i, &p) in parents.iter().enumerate() {
            prop_assert!((0..idx).contains(&p), "node {} has parent {}", idx, p);
            prop_assert!(!parents[..i].contains(&p), "node {} repeats parent {}", idx, p);
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// GRAPH-1/2 for the double butterfly.
    #[test]
    fn prop_butterfly_invariants(g in 1i64..4, l in 1i64..4) {
        let (_dir, graph) = build(GraphFamily::DoubleButterfly { g, l }, 0);
        check_parent_invariants(&graph)?;
    }

    /// GRAPH-1/2 for stacked expanders, both expander constructions.
    #[test]
    fn prop_stacked_invariants(
        n_exp in 3u32..6,
        k in 1i64..4,
        d in 1i64..5,
        localize in any::<bool>(),
    ) {
        let n = 1i64 << n_exp;
        let (_dir, graph) = build(GraphFamily::StackedExpanders { n, k, d, localize }, 0);
        prop_assert_eq!(graph.size(), n * (k + 1));
        check_parent_invariants(&graph)?;
    }

    /// GRAPH-1/2 for the linear super-concentrator.
    #[test]
    fn prop_super_concentrator_invariants(
        n_exp in 4u32..9,
        k in 1i64..3,
        d in 1i64..4,
        localize in any::<bool>(),
    ) {
        let n = 1i64 << n_exp;
        let (_dir, graph) = build(GraphFamily::LinearSuperConcentrator { n, k, d, localize }, 0);
        check_parent_invariants(&graph)?;
    }

    /// GRAPH-3: equal parameters and id reproduce the same edges.
    #[test]
    fn prop_construction_reproducible(n_exp in 3u32..5, id in 0u64..8) {
        let family = GraphFamily::StackedExpanders {
            n: 1i64 << n_exp,
            k: 2,
            d: 3,
            localize: false,
        };
        let (_da, a) = build(family, id);
        let (_db, b) = build(family, id);
        for idx in 0..a.size() {
            prop_assert_eq!(a.parents(idx).unwrap(), b.parents(idx).unwrap());
        }
    }
}
