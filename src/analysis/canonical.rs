//! Canonical topological genome computation (§4.6), the core of the whole
//! identification pipeline. For a single connected component of a
//! `PeriodicGraph` this:
//!
//! 1. reduces to the effective periodicity rank by collapsing a spanning
//!    tree and collecting the residual cycle offsets into a spanning
//!    integer lattice (`math::lattice::IntLatticeBasis`);
//! 2. solves the exact barycentric (equilibrium) embedding, used only to
//!    detect degenerate ("unstable") nets, not for labeling;
//! 3. reduces the cycle lattice to a fixed-tiebreak minimal basis, reusing
//!    `math::lll`'s Lagrange-Gauss and LLL reduction;
//! 4. tries every vertex as a BFS root, re-expressing offsets in the
//!    reduced basis for each, and keeps the lexicographically smallest
//!    resulting edge list as the canonical genome.

use crate::core::graph::{sub, Edge, Offset, PeriodicGraph};
use crate::error::NetError;
use crate::math::lattice::IntLatticeBasis;
use crate::math::lll::{lll_reduce, reduce_2d_integer};
use crate::math::rational::{from_i64, solve_exact, zero};
use nalgebra::{Matrix3, Vector3};
use num_rational::BigRational;
use num_traits::ToPrimitive;
use std::collections::VecDeque;

/// A topological genome: `rank` integer offset components per edge, over
/// `vertex_count` vertices, in canonical direct-edge order (§4.1, §4.6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalNet {
    pub rank: usize,
    pub vertex_count: usize,
    pub edges: Vec<(usize, usize, Vec<i32>)>,
    pub unstable: bool,
}

fn bfs_label(graph: &PeriodicGraph, root: usize) -> Option<(Vec<usize>, Vec<Offset>)> {
    let n = graph.vertex_count();
    let mut new_index: Vec<Option<usize>> = vec![None; n];
    let mut coordinate: Vec<Offset> = vec![[0, 0, 0]; n];
    new_index[root] = Some(0);
    let mut order_len = 1usize;
    let mut queue = VecDeque::new();
    queue.push_back(root);

    while let Some(v) = queue.pop_front() {
        let mut neighbors: Vec<(usize, Offset)> = graph.neighbors(v).to_vec();
        neighbors.sort_by_key(|&(w, o)| (o, w));
        for (w, o) in neighbors {
            if new_index[w].is_none() {
                new_index[w] = Some(order_len);
                order_len += 1;
                coordinate[w] = sub(coordinate[v], o);
                queue.push_back(w);
            }
        }
    }

    if order_len != n {
        return None;
    }

    let perm: Vec<usize> = (0..n).map(|old| new_index[old].unwrap()).collect();
    let mut coordinate_by_new = vec![[0, 0, 0]; n];
    for old in 0..n {
        coordinate_by_new[perm[old]] = coordinate[old];
    }
    Some((perm, coordinate_by_new))
}

/// Collects the cycle-offset lattice of a tree-collapsed graph and returns
/// its rank and a spanning (not yet reduced) integer basis.
fn cycle_lattice(reframed: &PeriodicGraph) -> (usize, Vec<[i64; 3]>) {
    let mut basis = IntLatticeBasis::new();
    for edge in reframed.edges() {
        basis.add(edge.offset);
    }
    (basis.rank(), basis.basis_vectors())
}

/// Reduces a spanning basis to a fixed-tiebreak minimal form (§4.6 step 3).
/// Rank 1 reuses a gcd-style primitive reduction, rank 2 reuses the
/// teacher's Lagrange-Gauss pair reduction, rank 3 reuses its LLL reduction.
fn reduce_basis(rank: usize, vectors: &[[i64; 3]]) -> Vec<[i64; 3]> {
    match rank {
        0 => Vec::new(),
        1 => {
            let v = vectors[0];
            let g = gcd3(v[0], v[1], v[2]).max(1);
            let mut reduced = [v[0] / g, v[1] / g, v[2] / g];
            normalize_sign_arr(&mut reduced);
            vec![reduced]
        }
        2 => {
            let u = Vector3::new(vectors[0][0] as i32, vectors[0][1] as i32, vectors[0][2] as i32);
            let v = Vector3::new(vectors[1][0] as i32, vectors[1][1] as i32, vectors[1][2] as i32);
            let (mut a, mut b) = reduce_2d_integer(u, v);
            normalize_sign(&mut a);
            normalize_sign(&mut b);
            let mut pair = [[a.x as i64, a.y as i64, a.z as i64], [b.x as i64, b.y as i64, b.z as i64]];
            pair.sort_by_key(|v| (v[0] * v[0] + v[1] * v[1] + v[2] * v[2], v[0], v[1], v[2]));
            pair.to_vec()
        }
        3 => {
            let cols: Vec<Vector3<f64>> = vectors
                .iter()
                .map(|v| Vector3::new(v[0] as f64, v[1] as f64, v[2] as f64))
                .collect();
            let m = Matrix3::from_columns(&cols);
            let reduced = lll_reduce(m);
            let mut out: Vec<[i64; 3]> = (0..3)
                .map(|c| {
                    let col = reduced.column(c);
                    [col[0].round() as i64, col[1].round() as i64, col[2].round() as i64]
                })
                .collect();
            for v in out.iter_mut() {
                let mut as_i32 = [v[0] as i32, v[1] as i32, v[2] as i32];
                normalize_sign_arr(&mut as_i32);
                *v = [as_i32[0] as i64, as_i32[1] as i64, as_i32[2] as i64];
            }
            out.sort_by_key(|v| (v[0] * v[0] + v[1] * v[1] + v[2] * v[2], v[0], v[1], v[2]));
            out
        }
        _ => unreachable!("periodicity rank never exceeds the embedding dimension"),
    }
}

fn gcd3(a: i64, b: i64, c: i64) -> i64 {
    fn gcd2(a: i64, b: i64) -> i64 {
        let (mut a, mut b) = (a.abs(), b.abs());
        while b != 0 {
            let t = b;
            b = a % b;
            a = t;
        }
        a
    }
    gcd2(gcd2(a, b), c)
}

fn normalize_sign(v: &mut Vector3<i32>) {
    for k in 0..3 {
        if v[k] != 0 {
            if v[k] < 0 {
                *v = -*v;
            }
            return;
        }
    }
}

fn normalize_sign_arr(v: &mut [i32; 3]) {
    for &c in v.iter() {
        if c != 0 {
            if c < 0 {
                *v = [-v[0], -v[1], -v[2]];
            }
            return;
        }
    }
}

/// Expresses `offset` as exact integer coefficients of `basis` (which always
/// spans it, by construction of `cycle_lattice`).
fn express_in_basis(basis: &[[i64; 3]], offset: Offset) -> Vec<i32> {
    let r = basis.len();
    if r == 0 {
        return Vec::new();
    }
    let o = [offset[0] as i64, offset[1] as i64, offset[2] as i64];
    let mut bt_b = vec![vec![zero(); r]; r];
    let mut bt_o = vec![zero(); r];
    for i in 0..r {
        for j in 0..r {
            let dot: i64 = (0..3).map(|k| basis[i][k] * basis[j][k]).sum();
            bt_b[i][j] = from_i64(dot);
        }
        let dot_o: i64 = (0..3).map(|k| basis[i][k] * o[k]).sum();
        bt_o[i] = from_i64(dot_o);
    }
    let solution = solve_exact(bt_b, bt_o).expect("cycle basis vectors are linearly independent by construction");
    solution.iter().map(to_integer_exact).collect()
}

fn to_integer_exact(r: &BigRational) -> i32 {
    debug_assert!(r.is_integer(), "offset must lie exactly in the span of its own generating basis");
    r.to_integer().to_i32().unwrap_or(0)
}

/// Exact barycentric (Tutte-style) embedding of every vertex in the
/// reduced-rank coordinate system, one vertex pinned at the origin. Used
/// only to flag unstable nets: if the solved positions are not pairwise
/// distinct modulo the lattice, the embedding has degenerated.
fn equilibrium_positions(graph: &PeriodicGraph, rank: usize, basis: &[[i64; 3]]) -> Vec<Vec<BigRational>> {
    let n = graph.vertex_count();
    if rank == 0 || n <= 1 {
        return vec![vec![zero(); rank]; n];
    }

    let mut matrix = vec![vec![zero(); n - 1]; n - 1];
    let mut rhs_per_axis = vec![vec![zero(); n - 1]; rank];

    for v in 1..n {
        let row = v - 1;
        matrix[row][row] = from_i64(graph.degree(v) as i64);
        for &(w, o) in graph.neighbors(v) {
            if w != 0 {
                matrix[row][w - 1] = matrix[row][w - 1].clone() - from_i64(1);
            }
            let coeffs = express_in_basis(basis, o);
            for axis in 0..rank {
                rhs_per_axis[axis][row] = rhs_per_axis[axis][row].clone() + from_i64(coeffs[axis] as i64);
            }
        }
    }

    let mut positions = vec![vec![zero(); rank]; n];
    for axis in 0..rank {
        let solved = solve_exact(matrix.clone(), rhs_per_axis[axis].clone())
            .expect("barycentric Laplacian of a connected graph is nonsingular once pinned");
        for v in 1..n {
            positions[v][axis] = solved[v - 1].clone();
        }
    }
    positions
}

fn wrap_unit(r: &BigRational) -> BigRational {
    let one = from_i64(1);
    let mut x = r.clone();
    while x < zero() {
        x = x + one.clone();
    }
    while x >= one {
        x = x - one.clone();
    }
    x
}

fn positions_collide(positions: &[Vec<BigRational>]) -> bool {
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            if positions[i].iter().zip(&positions[j]).all(|(a, b)| wrap_unit(a) == wrap_unit(b)) {
                return true;
            }
        }
    }
    false
}

/// Canonicalizes a single connected component. Disconnected or empty input
/// is a caller error (components are expected to already be split via
/// `PeriodicGraph::connected_components`).
pub fn canonicalize(graph: &PeriodicGraph) -> Result<CanonicalNet, NetError> {
    let n = graph.vertex_count();
    if n == 0 {
        return Err(NetError::NonPeriodic);
    }

    let mut best: Option<(Vec<Edge>, usize, Vec<[i64; 3]>, PeriodicGraph)> = None;
    let mut achieving_roots: Vec<usize> = Vec::new();

    for root in 0..n {
        let Some((perm, coordinate)) = bfs_label(graph, root) else {
            continue;
        };
        let relabeled = graph.relabel(&perm);
        let reframed = relabeled.offset_representatives(&coordinate);
        let (rank, spanning_basis) = cycle_lattice(&reframed);
        if rank == 0 {
            continue;
        }
        let reduced_basis = reduce_basis(rank, &spanning_basis);

        let mut candidate_edges: Vec<Edge> = Vec::new();
        for edge in reframed.edges() {
            let coeffs = express_in_basis(&reduced_basis, edge.offset);
            let mut padded = [0i32; 3];
            for (k, c) in coeffs.iter().enumerate() {
                padded[k] = *c;
            }
            candidate_edges.push(Edge { u: edge.u, v: edge.v, offset: padded });
        }
        candidate_edges.sort();

        let is_better = match &best {
            None => true,
            Some((best_edges, best_rank, _, _)) => {
                rank < *best_rank || (rank == *best_rank && candidate_edges < *best_edges)
            }
        };
        if is_better {
            best = Some((candidate_edges.clone(), rank, reduced_basis.clone(), reframed.clone()));
            achieving_roots = vec![root];
        } else if let Some((best_edges, best_rank, _, _)) = &best {
            if rank == *best_rank && candidate_edges == *best_edges {
                achieving_roots.push(root);
            }
        }
    }

    let Some((edges, rank, basis, winning_graph)) = best else {
        return Err(NetError::NonPeriodic);
    };

    let positions = equilibrium_positions(&winning_graph, rank, &basis);
    let unstable = achieving_roots.len() > 1 && positions_collide(&positions);

    let trimmed_edges = edges
        .into_iter()
        .map(|e| (e.u, e.v, e.offset[..rank].to_vec()))
        .collect();

    Ok(CanonicalNet {
        rank,
        vertex_count: n,
        edges: trimmed_edges,
        unstable,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_lattice() -> PeriodicGraph {
        let mut g = PeriodicGraph::new(1);
        g.add_edge(0, 0, [1, 0, 0]);
        g.add_edge(0, 0, [0, 1, 0]);
        g
    }

    #[test]
    fn a_single_vertex_square_net_has_rank_two() {
        let g = square_lattice();
        let net = canonicalize(&g).unwrap();
        assert_eq!(net.rank, 2);
        assert_eq!(net.edges.len(), 2);
    }

    #[test]
    fn an_acyclic_component_is_reported_non_periodic() {
        let mut g = PeriodicGraph::new(3);
        g.add_edge(0, 1, [0, 0, 0]);
        g.add_edge(1, 2, [0, 0, 0]);
        assert!(matches!(canonicalize(&g), Err(NetError::NonPeriodic)));
    }

    #[test]
    fn canonicalization_is_invariant_under_relabeling() {
        let mut g = PeriodicGraph::new(2);
        g.add_edge(0, 1, [0, 0, 0]);
        g.add_edge(0, 1, [1, 0, 0]);
        g.add_edge(0, 0, [0, 1, 0]);

        let relabeled = g.relabel(&[1, 0]);

        let net_a = canonicalize(&g).unwrap();
        let net_b = canonicalize(&relabeled).unwrap();
        assert_eq!(net_a.rank, net_b.rank);
        assert_eq!(net_a.edges, net_b.edges);
    }

    #[test]
    fn canonicalization_is_invariant_under_an_axis_swap() {
        let mut g = PeriodicGraph::new(2);
        g.add_edge(0, 1, [0, 0, 0]);
        g.add_edge(0, 1, [1, 0, 0]);
        g.add_edge(0, 0, [0, 1, 0]);

        let swapped = g.swap_axes([1, 0, 2]);

        let net_a = canonicalize(&g).unwrap();
        let net_b = canonicalize(&swapped).unwrap();
        assert_eq!(net_a.rank, net_b.rank);
        assert_eq!(net_a.edges, net_b.edges);
    }
}
