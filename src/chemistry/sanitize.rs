use crate::chemistry::elements::{is_metal, valence_rule};
use crate::core::graph::{sub, Offset, PeriodicGraph};
use crate::core::structure::{AtomRecord, Cell};
use crate::diagnostics::Diagnostics;
use std::collections::HashSet;

fn edge_vector(cell: &Cell, atoms: &[AtomRecord], u: usize, v: usize, offset: Offset) -> nalgebra::Vector3<f64> {
    let target = atoms[v].fractional_coords
        + nalgebra::Vector3::new(offset[0] as f64, offset[1] as f64, offset[2] as f64);
    cell.to_cartesian(&(target - atoms[u].fractional_coords))
}

fn bond_length(cell: &Cell, atoms: &[AtomRecord], u: usize, v: usize, offset: Offset) -> f64 {
    edge_vector(cell, atoms, u, v, offset).norm()
}

/// Step 1 (§4.5): for each vertex with >=2 neighbors, if two neighbor
/// directions subtend an angle under 10 degrees, the farther one is a
/// spurious collinear bond and is removed. Repeats to a fixpoint.
pub fn remove_atom_on_a_bond(graph: &mut PeriodicGraph, atoms: &[AtomRecord], cell: &Cell) {
    let max_rounds = graph.edges().len() + 1;
    for _ in 0..max_rounds {
        let mut removed_any = false;
        for v in 0..graph.vertex_count() {
            let neighbors: Vec<(usize, Offset)> = graph.neighbors(v).to_vec();
            if neighbors.len() < 2 {
                continue;
            }
            'pairs: for i in 0..neighbors.len() {
                for j in (i + 1)..neighbors.len() {
                    let (n1, o1) = neighbors[i];
                    let (n2, o2) = neighbors[j];
                    let v1 = edge_vector(cell, atoms, v, n1, o1);
                    let v2 = edge_vector(cell, atoms, v, n2, o2);
                    let cos_angle = (v1.dot(&v2) / (v1.norm() * v2.norm())).clamp(-1.0, 1.0);
                    let angle_deg = cos_angle.acos().to_degrees();
                    if angle_deg < 10.0 {
                        let (far_n, far_o) = if v1.norm() > v2.norm() { (n1, o1) } else { (n2, o2) };
                        graph.remove_edge(v, far_n, far_o);
                        removed_any = true;
                        break 'pairs;
                    }
                }
            }
        }
        if !removed_any {
            break;
        }
    }
}

/// Step 2 (§4.5): removes edges completing a long, spurious triangle.
pub fn remove_triangles(graph: &mut PeriodicGraph, atoms: &[AtomRecord], cell: &Cell) {
    loop {
        let edges = graph.edges();
        let mut to_remove = Vec::new();

        for edge in &edges {
            let metal_endpoint = is_metal(&atoms[edge.u].element) || is_metal(&atoms[edge.v].element);
            let cutoff = if metal_endpoint { 2.5 } else { 3.0 };
            let len_e = bond_length(cell, atoms, edge.u, edge.v, edge.offset);
            if len_e <= cutoff {
                continue;
            }

            for &(x, o1) in graph.neighbors(edge.u) {
                if x == edge.v {
                    continue;
                }
                let o2 = sub(o1, edge.offset);
                if !graph.neighbors(edge.v).contains(&(x, o2)) {
                    continue;
                }
                let l1 = bond_length(cell, atoms, edge.u, x, o1);
                let l2 = bond_length(cell, atoms, edge.v, x, o2);
                if len_e * len_e > (l1 * l1 + l2 * l2).min(9.0) {
                    to_remove.push(*edge);
                    break;
                }
            }
        }

        if to_remove.is_empty() {
            break;
        }
        for edge in to_remove {
            graph.remove_edge(edge.u, edge.v, edge.offset);
        }
    }
}

/// Step 3 (§4.5). `apply == false` is report-only: returns the atoms below
/// their lower bound without mutating the graph. `apply == true` removes
/// the weakest (longest) excess edges first, never pulling an H-neighbor
/// off a C/N/O atom, then returns the residual invalid set.
pub fn fix_valence(graph: &mut PeriodicGraph, atoms: &[AtomRecord], cell: &Cell, mof_mode: bool, apply: bool) -> HashSet<usize> {
    let mut invalid = HashSet::new();

    for v in 0..graph.vertex_count() {
        let Some(rule) = valence_rule(&atoms[v].element, mof_mode) else {
            continue;
        };

        if apply {
            let degree = graph.degree(v);
            if degree > rule.max {
                let protect_h = matches!(atoms[v].element.as_str(), "C" | "N" | "O");
                let mut candidates: Vec<(usize, Offset, f64)> = graph
                    .neighbors(v)
                    .iter()
                    .filter(|&&(w, _)| !(protect_h && atoms[w].element == "H"))
                    .map(|&(w, o)| (w, o, bond_length(cell, atoms, v, w, o)))
                    .collect();
                candidates.sort_by(|a, b| b.2.total_cmp(&a.2));
                let excess = degree - rule.max;
                for (w, o, _) in candidates.into_iter().take(excess) {
                    graph.remove_edge(v, w, o);
                }
            }
        }

        if graph.degree(v) < rule.min {
            invalid.insert(v);
        }
    }

    invalid
}

/// Step 4 (§4.5): flags and removes unphysically long (>4A) or unphysically
/// short (<0.65A, non-H) bonds. Returns whether any edge was deleted.
pub fn sanity_check(graph: &mut PeriodicGraph, atoms: &[AtomRecord], cell: &Cell, diagnostics: &mut Diagnostics) -> bool {
    let mut any_deleted = false;
    for edge in graph.edges() {
        let len = bond_length(cell, atoms, edge.u, edge.v, edge.offset);
        let both_heavy = atoms[edge.u].element != "H" && atoms[edge.v].element != "H";
        if len > 4.0 {
            diagnostics.warn(format!(
                "deleting suspiciously long bond {}-{} ({:.2} A)",
                atoms[edge.u].label, atoms[edge.v].label, len
            ));
            graph.remove_edge(edge.u, edge.v, edge.offset);
            any_deleted = true;
        } else if len < 0.65 && both_heavy {
            diagnostics.warn(format!(
                "deleting suspiciously short bond {}-{} ({:.2} A)",
                atoms[edge.u].label, atoms[edge.v].label, len
            ));
            graph.remove_edge(edge.u, edge.v, edge.offset);
            any_deleted = true;
        }
    }
    any_deleted
}

/// Step 5 (§4.5): strips homoatomic bonds of the configured target elements.
pub fn remove_homoatomic(graph: &mut PeriodicGraph, atoms: &[AtomRecord], targets: &[String]) {
    for edge in graph.edges() {
        if atoms[edge.u].element == atoms[edge.v].element && targets.iter().any(|t| t == &atoms[edge.u].element) {
            graph.remove_edge(edge.u, edge.v, edge.offset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::structure::AtomRecord;
    use nalgebra::{Matrix3, Vector3};

    fn cubic_cell(a: f64) -> Cell {
        Cell::new(Matrix3::identity() * a, Vec::new(), None).unwrap()
    }

    #[test]
    fn collinear_third_neighbor_is_pruned() {
        let cell = cubic_cell(20.0);
        let atoms = vec![
            AtomRecord::new("C1", "C", Vector3::new(0.5, 0.5, 0.5)),
            AtomRecord::new("C2", "C", Vector3::new(0.5 + 1.5 / 20.0, 0.5, 0.5)),
            AtomRecord::new("C3", "C", Vector3::new(0.5 + 3.0 / 20.0, 0.5, 0.5)),
        ];
        let mut graph = PeriodicGraph::new(3);
        graph.add_edge(0, 1, [0, 0, 0]);
        graph.add_edge(0, 2, [0, 0, 0]);
        remove_atom_on_a_bond(&mut graph, &atoms, &cell);
        assert_eq!(graph.degree(0), 1);
        assert!(graph.neighbors(0).contains(&(1, [0, 0, 0])));
    }

    #[test]
    fn fix_valence_trims_excess_non_hydrogen_neighbors() {
        let cell = cubic_cell(20.0);
        let atoms = vec![
            AtomRecord::new("N1", "N", Vector3::new(0.5, 0.5, 0.5)),
            AtomRecord::new("X1", "C", Vector3::new(0.55, 0.5, 0.5)),
            AtomRecord::new("X2", "C", Vector3::new(0.45, 0.5, 0.5)),
            AtomRecord::new("X3", "C", Vector3::new(0.5, 0.56, 0.5)),
            AtomRecord::new("X4", "C", Vector3::new(0.5, 0.44, 0.5)),
            AtomRecord::new("X5", "C", Vector3::new(0.5, 0.5, 0.57)),
        ];
        let mut graph = PeriodicGraph::new(6);
        for i in 1..6 {
            graph.add_edge(0, i, [0, 0, 0]);
        }
        let invalid = fix_valence(&mut graph, &atoms, &cell, false, true);
        assert_eq!(graph.degree(0), 4);
        assert!(invalid.is_empty());
    }

    #[test]
    fn fix_valence_reports_below_minimum() {
        let cell = cubic_cell(20.0);
        let atoms = vec![
            AtomRecord::new("N1", "N", Vector3::new(0.5, 0.5, 0.5)),
            AtomRecord::new("X1", "C", Vector3::new(0.55, 0.5, 0.5)),
        ];
        let mut graph = PeriodicGraph::new(2);
        graph.add_edge(0, 1, [0, 0, 0]);
        let invalid = fix_valence(&mut graph, &atoms, &cell, false, false);
        assert!(invalid.contains(&0));
        assert_eq!(graph.degree(0), 1, "report-only mode must not mutate");
    }
}
