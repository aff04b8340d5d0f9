use crate::core::structure::{AtomRecord, Cell};

const COLLISION_DISTANCE: f64 = 0.55;

/// Union-find over the atom index space, used to collapse chains of
/// pairwise collisions into one surviving cluster representative.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self { parent: (0..n).collect() }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[ra.max(rb)] = ra.min(rb);
        }
    }
}

/// Finds duplicate atoms introduced by symmetry expansion or input error
/// (§4.3): any pair closer than 0.55 Å under the minimum-image convention
/// collapses into one cluster, of which only the lowest-indexed atom
/// survives. Returns the indices to remove.
pub fn prune_collisions(atoms: &[AtomRecord], cell: &Cell) -> Vec<usize> {
    let n = atoms.len();
    let mut uf = UnionFind::new(n);
    let cutoff_sq = COLLISION_DISTANCE * COLLISION_DISTANCE;

    for i in 0..n {
        for j in (i + 1)..n {
            let dist_vec = cell.get_shortest_distance_vector(&atoms[i].fractional_coords, &atoms[j].fractional_coords);
            if dist_vec.norm_squared() < cutoff_sq {
                uf.union(i, j);
            }
        }
    }

    let mut remove = Vec::new();
    for i in 0..n {
        if uf.find(i) != i {
            remove.push(i);
        }
    }
    remove
}
