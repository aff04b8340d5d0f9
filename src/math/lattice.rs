//! Integer lattice span accumulation for the dimensionality-reduction step
//! of canonicalization (§4.6 step 1): collects the per-edge offsets of a
//! tree-collapsed quotient graph and tracks the rank and a spanning basis
//! of the ℤ-module they generate, via an incremental extended-Euclidean
//! row reduction.

fn ext_gcd(a: i64, b: i64) -> (i64, i64, i64) {
    let (mut old_r, mut r) = (a, b);
    let (mut old_s, mut s) = (1i64, 0i64);
    let (mut old_t, mut t) = (0i64, 1i64);
    while r != 0 {
        let q = old_r.div_euclid(r);
        let tmp_r = old_r - q * r;
        old_r = r;
        r = tmp_r;
        let tmp_s = old_s - q * s;
        old_s = s;
        s = tmp_s;
        let tmp_t = old_t - q * t;
        old_t = t;
        t = tmp_t;
    }
    if old_r < 0 {
        (-old_r, -old_s, -old_t)
    } else {
        (old_r, old_s, old_t)
    }
}

/// Accumulates integer 3-vectors into a reduced spanning basis, tracking
/// rank as vectors are added. Each row carries a distinct pivot column;
/// inserted vectors are reduced against every existing row before being
/// either folded in (rank unchanged) or appended as a new basis row.
#[derive(Debug, Default)]
pub struct IntLatticeBasis {
    rows: Vec<(usize, [i64; 3])>,
}

impl IntLatticeBasis {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add(&mut self, v: [i32; 3]) {
        let mut working = [v[0] as i64, v[1] as i64, v[2] as i64];
        for (pivot, row) in self.rows.iter_mut() {
            if working[*pivot] != 0 {
                let (g, a, b) = ext_gcd(row[*pivot], working[*pivot]);
                let new_row = [
                    a * row[0] + b * working[0],
                    a * row[1] + b * working[1],
                    a * row[2] + b * working[2],
                ];
                let bb = row[*pivot] / g;
                let ww = working[*pivot] / g;
                let new_working = [
                    bb * working[0] - ww * row[0],
                    bb * working[1] - ww * row[1],
                    bb * working[2] - ww * row[2],
                ];
                *row = new_row;
                working = new_working;
            }
        }
        if let Some(pivot) = (0..3).find(|&k| working[k] != 0) {
            self.rows.push((pivot, working));
            self.rows.sort_by_key(|r| r.0);
        }
    }

    pub fn rank(&self) -> usize {
        self.rows.len()
    }

    pub fn basis_vectors(&self) -> Vec<[i64; 3]> {
        self.rows.iter().map(|&(_, v)| v).collect()
    }
}
