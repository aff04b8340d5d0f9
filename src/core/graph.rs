use std::collections::HashMap;

/// Integer lattice offset of an edge endpoint, in units of the embedding
/// cell's basis vectors (§3: `o ∈ ℤᴰ`, embedding is always 3-wide here —
/// dimensionality reduction to the effective rank happens in
/// `crate::analysis::canonical`).
pub type Offset = [i32; 3];

pub fn neg(o: Offset) -> Offset {
    [-o[0], -o[1], -o[2]]
}

pub fn add(a: Offset, b: Offset) -> Offset {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub fn sub(a: Offset, b: Offset) -> Offset {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Lexicographic positivity test used by the direct-edge convention (§3):
/// the first nonzero component must be positive.
pub fn is_lex_positive(o: Offset) -> bool {
    for c in o {
        if c != 0 {
            return c > 0;
        }
    }
    false
}

/// A single direct-form edge, as yielded by `PeriodicGraph::edges`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Edge {
    pub u: usize,
    pub v: usize,
    pub offset: Offset,
}

/// A finite quotient of an infinite periodic graph: `n` vertices, each edge
/// an ordered `(u, v, offset)` triple meaning "u in cell 0 connects to v in
/// cell `offset`" (§3, §4.1). Stored as a sorted adjacency list arena per
/// §9's design note — no pointer graph, vertices are plain indices.
#[derive(Debug, Clone, Default)]
pub struct PeriodicGraph {
    adjacency: Vec<Vec<(usize, Offset)>>,
}

impl PeriodicGraph {
    pub fn new(n: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); n],
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Adds the edge `(u, v, offset)` if it is not already present (in
    /// either its or its reverse's exact form). Self-loops with `offset ==
    /// [0,0,0]` are rejected (§3 invariant).
    pub fn add_edge(&mut self, u: usize, v: usize, offset: Offset) {
        if u == v && offset == [0, 0, 0] {
            return;
        }
        if !self.adjacency[u].contains(&(v, offset)) {
            self.adjacency[u].push((v, offset));
        }
        let rev = (u, neg(offset));
        if !self.adjacency[v].contains(&rev) {
            self.adjacency[v].push(rev);
        }
        self.adjacency[u].sort_unstable();
        if u != v {
            self.adjacency[v].sort_unstable();
        }
    }

    pub fn remove_edge(&mut self, u: usize, v: usize, offset: Offset) {
        self.adjacency[u].retain(|&(w, o)| !(w == v && o == offset));
        self.adjacency[v].retain(|&(w, o)| !(w == u && o == neg(offset)));
    }

    pub fn neighbors(&self, v: usize) -> &[(usize, Offset)] {
        &self.adjacency[v]
    }

    pub fn degree(&self, v: usize) -> usize {
        self.adjacency[v].len()
    }

    /// Yields every edge exactly once, in its direct orientation (§3):
    /// `u < v`, or `u == v` and `offset` is lexicographically positive.
    pub fn edges(&self) -> Vec<Edge> {
        let mut out = Vec::new();
        for (u, neighbors) in self.adjacency.iter().enumerate() {
            for &(v, offset) in neighbors {
                let direct = if u < v {
                    true
                } else if u == v {
                    is_lex_positive(offset)
                } else {
                    false
                };
                if direct {
                    out.push(Edge { u, v, offset });
                }
            }
        }
        out.sort();
        out
    }

    /// Relabels vertices under a permutation `perm` where `perm[old] = new`.
    /// A bijection on `0..n`.
    pub fn relabel(&self, perm: &[usize]) -> Self {
        let n = self.vertex_count();
        let mut out = Self::new(n);
        for u in 0..n {
            for &(v, offset) in &self.adjacency[u] {
                out.add_edge(perm[u], perm[v], offset);
            }
        }
        out
    }

    /// Permutes the offset coordinates of every edge by `axes`, i.e. offset
    /// component `i` of the new graph is component `axes[i]` of the old one.
    /// Also used when a basis-change permutes which lattice vector is which.
    pub fn swap_axes(&self, axes: [usize; 3]) -> Self {
        let n = self.vertex_count();
        let mut out = Self::new(n);
        for u in 0..n {
            for &(v, offset) in &self.adjacency[u] {
                let permuted = [offset[axes[0]], offset[axes[1]], offset[axes[2]]];
                out.add_edge(u, v, permuted);
            }
        }
        out
    }

    /// Shifts the chosen cell-0 representative of every vertex `v` by
    /// `deltas[v]`. For a directed occurrence `(a, b, o)` meaning "a's cell-0
    /// to b's cell o", the new offset is `o - deltas[a] + deltas[b]` (§4.1).
    pub fn offset_representatives(&self, deltas: &[Offset]) -> Self {
        let n = self.vertex_count();
        let mut out = Self::new(n);
        for a in 0..n {
            for &(b, o) in &self.adjacency[a] {
                let new_o = add(sub(o, deltas[a]), deltas[b]);
                out.add_edge(a, b, new_o);
            }
        }
        out
    }

    /// Connected components of the *quotient* graph (ignoring offsets),
    /// via plain BFS over the adjacency lists.
    pub fn connected_components(&self) -> Vec<Vec<usize>> {
        let n = self.vertex_count();
        let mut visited = vec![false; n];
        let mut components = Vec::new();
        for start in 0..n {
            if visited[start] {
                continue;
            }
            let mut component = Vec::new();
            let mut queue = std::collections::VecDeque::new();
            queue.push_back(start);
            visited[start] = true;
            while let Some(v) = queue.pop_front() {
                component.push(v);
                for &(w, _) in &self.adjacency[v] {
                    if !visited[w] {
                        visited[w] = true;
                        queue.push_back(w);
                    }
                }
            }
            component.sort_unstable();
            components.push(component);
        }
        components
    }

    /// Builds the induced subgraph on `vertices` (sorted, unique), relabeled
    /// to `0..vertices.len()`.
    pub fn induced_subgraph(&self, vertices: &[usize]) -> Self {
        let mut index_of: HashMap<usize, usize> = HashMap::new();
        for (new_idx, &old_idx) in vertices.iter().enumerate() {
            index_of.insert(old_idx, new_idx);
        }
        let mut out = Self::new(vertices.len());
        for &old_u in vertices {
            let new_u = index_of[&old_u];
            for &(old_v, offset) in &self.adjacency[old_u] {
                if let Some(&new_v) = index_of.get(&old_v) {
                    out.add_edge(new_u, new_v, offset);
                }
            }
        }
        out
    }

    /// Removes `remove` from the graph, returning the induced subgraph over
    /// the remainder (compactly relabeled) plus the old -> new index map
    /// (`None` for a removed vertex) (§4.1).
    pub fn remove_vertices(&self, remove: &[usize]) -> (Self, Vec<Option<usize>>) {
        let removed: std::collections::HashSet<usize> = remove.iter().copied().collect();
        let keep: Vec<usize> = (0..self.vertex_count()).filter(|v| !removed.contains(v)).collect();
        let mut map = vec![None; self.vertex_count()];
        for (new_idx, &old_idx) in keep.iter().enumerate() {
            map[old_idx] = Some(new_idx);
        }
        (self.induced_subgraph(&keep), map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_edge_is_unique_representative() {
        let mut g = PeriodicGraph::new(2);
        g.add_edge(1, 0, [0, 0, -1]);
        let edges = g.edges();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0], Edge { u: 0, v: 1, offset: [0, 0, 1] });
    }

    #[test]
    fn self_loop_yields_two_neighbor_directions() {
        let mut g = PeriodicGraph::new(1);
        g.add_edge(0, 0, [1, 0, 0]);
        let neighbors = g.neighbors(0);
        assert_eq!(neighbors.len(), 2);
        assert!(neighbors.contains(&(0, [1, 0, 0])));
        assert!(neighbors.contains(&(0, [-1, 0, 0])));
    }

    #[test]
    fn self_loop_at_zero_offset_is_rejected() {
        let mut g = PeriodicGraph::new(1);
        g.add_edge(0, 0, [0, 0, 0]);
        assert_eq!(g.degree(0), 0);
    }

    #[test]
    fn offset_representatives_matches_single_vertex_formula() {
        let mut g = PeriodicGraph::new(2);
        g.add_edge(0, 1, [1, 0, 0]);
        let shifted = g.offset_representatives(&[[1, 0, 0], [0, 0, 0]]);
        let edges = shifted.edges();
        assert_eq!(edges[0].offset, [0, 0, 0]);
    }

    #[test]
    fn relabel_is_a_bijective_reindex() {
        let mut g = PeriodicGraph::new(3);
        g.add_edge(0, 1, [0, 0, 0]);
        g.add_edge(1, 2, [0, 0, 1]);
        let relabeled = g.relabel(&[2, 0, 1]);
        assert_eq!(relabeled.vertex_count(), 3);
        let mut edges = relabeled.edges();
        edges.sort();
        assert_eq!(edges[0], Edge { u: 0, v: 2, offset: [0, 0, 0] });
        assert_eq!(edges[1], Edge { u: 1, v: 2, offset: [0, 0, 1] });
    }

    #[test]
    fn remove_vertices_relabels_the_remainder_and_reports_the_index_map() {
        let mut g = PeriodicGraph::new(3);
        g.add_edge(0, 1, [0, 0, 0]);
        g.add_edge(1, 2, [0, 0, 1]);

        let (remaining, map) = g.remove_vertices(&[1]);

        assert_eq!(map, vec![Some(0), None, Some(1)]);
        assert_eq!(remaining.vertex_count(), 2);
        assert!(remaining.edges().is_empty());
    }

    #[test]
    fn connected_components_splits_independent_pieces() {
        let mut g = PeriodicGraph::new(4);
        g.add_edge(0, 1, [0, 0, 0]);
        g.add_edge(2, 3, [0, 0, 1]);
        let mut components = g.connected_components();
        components.sort();
        assert_eq!(components, vec![vec![0, 1], vec![2, 3]]);
    }
}
