//! Double butterfly graph.
//!
//! Rows of `2^g` vertices are grouped into sections of `2g` rows. Each
//! vertex takes a sequential edge from its predecessor, a vertical edge
//! from the vertex one row up, and a diagonal edge whose horizontal spread
//! `j` halves once per row through the first half of a section and doubles
//! through the second, alternating direction at every multiple of `j`.

use super::Graph;
use crate::error::Result;
use crate::math::pow2;

pub(super) fn construct(graph: &mut Graph, g: i64, l: i64) -> Result<()> {
    let verts_per_row = pow2(g);
    let rows_per_section = 2 * g;
    let section_size = verts_per_row * rows_per_section;
    let size = graph.size();
    debug_assert_eq!(size, verts_per_row * (l * (rows_per_section - 1) + 1));

    let mut j = verts_per_row;
    let mut k = 0i64;
    let mut add = false;
    for i in 1..size {
        let mut nd = graph.get(i)?;
        // sequential edge
        nd.add_parent(i - 1);
        if i >= verts_per_row {
            // vertical edge
            nd.add_parent(i - verts_per_row);
            // new section: the spread resets to a full row
            if (i + k) % section_size == 0 {
                j = verts_per_row;
                k += verts_per_row;
            }
            // halve the spread through the first half of the section,
            // double it through the second; flip direction at multiples
            if i % verts_per_row == 0 {
                if (i + k) % section_size / verts_per_row > g {
                    j <<= 1;
                } else {
                    j >>= 1;
                }
                add = true;
            } else if i % j == 0 {
                add = !add;
            }
            // diagonal edge, skipped when the spread leaves the graph
            let diagonal = if add {
                i - verts_per_row + j
            } else {
                i - verts_per_row - j
            };
            if (0..i).contains(&diagonal) {
                nd.add_parent(diagonal);
            }
        }
        graph.put(&nd)?;
    }
    graph.flush()
}

#[cfg(test)]
mod tests {
    use crate::graph::GraphFamily;
    use crate::store::KvStore;

    fn build(g: i64, l: i64) -> (tempfile::TempDir, crate::graph::Graph) {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        let store = KvStore::new(db.open_tree("graph").unwrap());
        let graph = GraphFamily::DoubleButterfly { g, l }
            .construct(store, 0)
            .unwrap();
        (dir, graph)
    }

    #[test]
    fn test_sequential_and_vertical_edges() {
        let (_dir, graph) = build(3, 4);
        let w = 8;
        for i in 1..graph.size() {
            let parents = graph.parents(i).unwrap();
            assert!(parents.contains(&(i - 1)), "node {i} misses sequential edge");
            if i >= w {
                assert!(parents.contains(&(i - w)), "node {i} misses vertical edge");
            }
        }
    }

    #[test]
    fn test_first_row_has_only_sequential_edges() {
        let (_dir, graph) = build(3, 4);
        for i in 1..8 {
            assert_eq!(graph.parents(i).unwrap(), vec![i - 1]);
        }
        assert!(graph.parents(0).unwrap().is_empty());
    }

    #[test]
    fn test_small_butterfly() {
        // g=1: two vertices per row, two rows per section
        let (_dir, graph) = build(1, 2);
        assert_eq!(graph.size(), 2 * (2 * 1 + 1));
        for i in 0..graph.size() {
            for p in graph.parents(i).unwrap() {
                assert!(p < i);
            }
        }
    }
}
