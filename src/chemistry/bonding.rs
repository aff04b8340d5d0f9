use crate::chemistry::elements::{is_metal, vdw_radius};
use crate::core::graph::{Offset, PeriodicGraph};
use crate::core::structure::{AtomRecord, Cell};
use crate::options::PipelineOptions;
use nalgebra::Vector3;

const MIN_BOND_DISTANCE: f64 = 0.4;

fn effective_radius(element: &str, widen_metal: bool) -> f64 {
    let r = vdw_radius(element);
    if widen_metal && is_metal(element) {
        r * 1.5
    } else {
        r
    }
}

/// Guesses bonds from geometry alone (§4.4): for each ordered pair `i <= j`
/// and each offset `k` in `{-1,0,1}^3` (excluding the degenerate self-pair),
/// emits an edge iff `0.4 < d < c0*(r_i+r_j)`. No H-H edges.
pub fn guess_bonds(atoms: &[AtomRecord], cell: &Cell, options: &PipelineOptions) -> Vec<(usize, usize, Offset)> {
    let n = atoms.len();
    let mut out = Vec::new();
    let c0 = options.bond_cutoff_coefficient;

    for i in 0..n {
        for j in i..n {
            if atoms[i].element == "H" && atoms[j].element == "H" {
                continue;
            }
            let ri = effective_radius(&atoms[i].element, options.widen_metal_radii);
            let rj = effective_radius(&atoms[j].element, options.widen_metal_radii);
            let threshold = c0 * (ri + rj);

            for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        if i == j && dx == 0 && dy == 0 && dz == 0 {
                            continue;
                        }
                        let offset = [dx, dy, dz];
                        let shifted = atoms[j].fractional_coords + Vector3::new(dx as f64, dy as f64, dz as f64);
                        let d = cell.to_cartesian(&(shifted - atoms[i].fractional_coords)).norm();
                        if d > MIN_BOND_DISTANCE && d < threshold {
                            out.push((i, j, offset));
                        }
                    }
                }
            }
        }
    }
    out
}

/// Builds a `PeriodicGraph` from a raw edge list, collapsing exact
/// duplicates via `PeriodicGraph::add_edge`.
pub fn graph_from_edges(n: usize, edges: &[(usize, usize, Offset)]) -> PeriodicGraph {
    let mut graph = PeriodicGraph::new(n);
    for &(u, v, o) in edges {
        graph.add_edge(u, v, o);
    }
    graph
}
