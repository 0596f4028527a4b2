//! Linear super-concentrator.
//!
//! `k` shrinking stages flank a middle block: stage `i` holds `nᵢ` vertices
//! with `nᵢ₊₁ = 3nᵢ/4`, laid out left stages first, then the middle block
//! of `n_k` vertices, then the right stages mirrored back out to full
//! width. Each stage contributes a forward concentrator (a Pinsker expander
//! over its last three quarters plus 3-for-1 leftover edges from the first
//! quarter), a mirrored reverse concentrator, and a perfect matching onto
//! its reflection; a middle matching closes the construction.

use rand::rngs::StdRng;

use super::stacked_expanders::pinsker_expander;
use super::Graph;
use crate::error::Result;

/// Stage sizes `n₀..n_k`.
fn stage_sizes(n: i64, k: i64) -> Vec<i64> {
    let mut sizes = Vec::with_capacity(k as usize + 1);
    let mut cur = n;
    for _ in 0..=k {
        sizes.push(cur);
        cur = 3 * cur / 4;
    }
    sizes
}

/// Total vertex count: both flanks plus the middle block.
pub(super) fn total_size(n: i64, k: i64) -> i64 {
    let sizes = stage_sizes(n, k);
    2 * sizes[..k as usize].iter().sum::<i64>() + sizes[k as usize]
}

/// The middle block is the smallest expander block; `d` may not exceed it.
pub(super) fn smallest_stage(n: i64, k: i64) -> i64 {
    stage_sizes(n, k)[k as usize]
}

pub(super) fn construct(
    graph: &mut Graph,
    rng: &mut StdRng,
    n: i64,
    k: i64,
    d: i64,
    localize: bool,
) -> Result<()> {
    let sizes = stage_sizes(n, k);
    let size = graph.size();
    let stages = k as usize;

    // left stage offsets; the entry at `stages` is the middle block
    let mut left = Vec::with_capacity(stages + 1);
    let mut off = 0;
    for &s in sizes.iter().take(stages + 1) {
        left.push(off);
        off += s;
    }
    // right stage offsets, mirrored outward from the middle
    let mut right = vec![0i64; stages];
    let mut roff = left[stages] + sizes[stages];
    for i in (0..stages).rev() {
        right[i] = roff;
        roff += sizes[i];
    }
    debug_assert_eq!(roff, size);

    for i in 0..stages {
        let (m, ni, nn) = (left[i], sizes[i], sizes[i + 1]);

        // forward concentrator into the next block: expander over the last
        // 3/4 of the stage, 3-for-1 leftovers from the first quarter
        pinsker_expander(graph, rng, m + ni - nn, nn, d, localize)?;
        for t in 0..ni - nn {
            for s in 0..3 {
                let mut nd = graph.get(m + ni + 3 * t + s)?;
                nd.add_parent(m + t);
                graph.put(&nd)?;
            }
        }

        // reverse concentrator out of the preceding block; the last quarter
        // of the stage absorbs three consecutive leftover sources each
        let q = right[i] - nn;
        pinsker_expander(graph, rng, q, nn, d, localize)?;
        for t in 0..ni - nn {
            let mut nd = graph.get(q + 2 * nn + t)?;
            for s in 0..3 {
                nd.add_parent(q + 3 * t + s);
            }
            graph.put(&nd)?;
        }
    }

    // mirror matching: every right-flank vertex and every upper-middle
    // vertex takes its reflection as parent, pairing each stage with its
    // mirror and closing the middle block
    for idx in (size + 1) / 2..size {
        let mut nd = graph.get(idx)?;
        nd.add_parent(size - 1 - idx);
        graph.put(&nd)?;
    }
    graph.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphFamily;
    use crate::store::KvStore;

    fn build(n: i64, k: i64, d: i64, localize: bool) -> (tempfile::TempDir, crate::graph::Graph) {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        let store = KvStore::new(db.open_tree("graph").unwrap());
        let graph = GraphFamily::LinearSuperConcentrator { n, k, d, localize }
            .construct(store, 0)
            .unwrap();
        (dir, graph)
    }

    #[test]
    fn test_stage_sizes_shrink_by_three_quarters() {
        assert_eq!(stage_sizes(256, 3), vec![256, 192, 144, 108]);
        assert_eq!(total_size(256, 3), 2 * (256 + 192 + 144) + 108);
    }

    #[test]
    fn test_default_constructs_localized() {
        let (_dir, graph) = build(256, 3, 4, true);
        assert_eq!(graph.size(), 1292);
    }

    #[test]
    fn test_middle_matching_is_a_bijection() {
        let (_dir, graph) = build(256, 3, 4, true);
        let middle_off = 256 + 192 + 144;
        let middle = 108;
        let mut matched = vec![false; middle / 2];
        for idx in middle_off + middle as i64 / 2..middle_off + middle as i64 {
            let mirror = graph.size() - 1 - idx;
            let slot = (mirror - middle_off) as usize;
            assert!(
                graph.parents(idx).unwrap().contains(&mirror),
                "middle node {idx} misses its mirror {mirror}"
            );
            assert!(!matched[slot], "mirror {mirror} matched twice");
            matched[slot] = true;
        }
        assert!(matched.iter().all(|&m| m));
    }

    #[test]
    fn test_flank_matching_pairs_reflections() {
        let (_dir, graph) = build(16, 2, 2, false);
        let size = graph.size();
        for idx in (size + 1) / 2..size {
            assert!(graph.parents(idx).unwrap().contains(&(size - 1 - idx)));
        }
    }

    #[test]
    fn test_leftover_edges_forward() {
        let (_dir, graph) = build(16, 2, 2, false);
        // stage 0: sources 0..16, next block 16..28; the first quarter
        // (nodes 0..4) feeds three consecutive sinks each
        for t in 0..4i64 {
            for s in 0..3 {
                assert!(graph.parents(16 + 3 * t + s).unwrap().contains(&t));
            }
        }
    }
}
