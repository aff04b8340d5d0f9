use nalgebra::{Matrix3, Vector3};

// ============================================================================
// SYMMETRY
// ============================================================================

/// A crystallographic equivalent position: an integer rotation/reflection
/// matrix plus a rational translation vector, applied as `p' = R*p + t`.
/// The identity operation is never stored here (§3: "implicit").
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetryOp {
    pub rotation: Matrix3<i32>,
    pub translation: Vector3<f64>,
}

impl SymmetryOp {
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    pub fn apply(&self, p: &Vector3<f64>) -> Vector3<f64> {
        let r = self.rotation.map(|x| x as f64);
        r * p + self.translation
    }
}

// ============================================================================
// CELL
// ============================================================================

/// A crystallographic unit cell: lattice matrix, equivalent positions, and
/// the Hall number identifying the space group representation (§3).
#[derive(Debug, Clone)]
pub struct Cell {
    pub matrix: Matrix3<f64>,
    pub reciprocal_matrix: Matrix3<f64>,
    pub equivalents: Vec<SymmetryOp>,
    pub hall_number: Option<i32>,
}

impl Cell {
    pub fn new(matrix: Matrix3<f64>, equivalents: Vec<SymmetryOp>, hall_number: Option<i32>) -> Result<Self, &'static str> {
        if matrix.determinant() <= 1e-9 {
            return Err("Cell has zero, negative, or near-zero volume.");
        }
        let reciprocal_matrix = matrix
            .try_inverse()
            .ok_or("Cell matrix is not invertible.")?
            .transpose();
        Ok(Self {
            matrix,
            reciprocal_matrix,
            equivalents,
            hall_number,
        })
    }

    pub fn from_parameters(
        a: f64,
        b: f64,
        c: f64,
        alpha: f64,
        beta: f64,
        gamma: f64,
        equivalents: Vec<SymmetryOp>,
        hall_number: Option<i32>,
    ) -> Result<Self, &'static str> {
        let alpha_r = alpha.to_radians();
        let beta_r = beta.to_radians();
        let gamma_r = gamma.to_radians();

        let term = 1.0 - alpha_r.cos().powi(2) - beta_r.cos().powi(2) - gamma_r.cos().powi(2)
            + 2.0 * alpha_r.cos() * beta_r.cos() * gamma_r.cos();

        if term <= 0.0 {
            return Err("Invalid lattice angles.");
        }

        let v_factor = term.sqrt();
        let matrix = Matrix3::new(
            a, b * gamma_r.cos(), c * beta_r.cos(),
            0.0, b * gamma_r.sin(), c * (alpha_r.cos() - beta_r.cos() * gamma_r.cos()) / gamma_r.sin(),
            0.0, 0.0, a * b * c * v_factor / (a * b * gamma_r.sin()),
        );
        Self::new(matrix, equivalents, hall_number)
    }

    pub fn to_cartesian(&self, frac: &Vector3<f64>) -> Vector3<f64> {
        self.matrix * frac
    }

    pub fn to_fractional(&self, cart: &Vector3<f64>) -> Vector3<f64> {
        self.reciprocal_matrix.transpose() * cart
    }

    /// Minimum-image Cartesian vector from `f1` to `f2` under PBC.
    pub fn get_shortest_distance_vector(&self, f1: &Vector3<f64>, f2: &Vector3<f64>) -> Vector3<f64> {
        let mut d = f2 - f1;
        d.x -= d.x.round();
        d.y -= d.y.round();
        d.z -= d.z.round();
        self.to_cartesian(&d)
    }
}

/// Normalizes each component of a fractional coordinate into `[0, 1)`.
pub fn wrap_fractional(p: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(p.x - p.x.floor(), p.y - p.y.floor(), p.z - p.z.floor())
}

// ============================================================================
// ATOMS AND DECLARED BONDS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    pub label: String,
    pub element: String,
    pub fractional_coords: Vector3<f64>,
    pub occupancy: Option<f64>,
    pub residue: Option<String>,
}

impl AtomRecord {
    pub fn new(label: impl Into<String>, element: impl Into<String>, coords: Vector3<f64>) -> Self {
        Self {
            label: label.into(),
            element: element.into(),
            fractional_coords: wrap_fractional(&coords),
            occupancy: None,
            residue: None,
        }
    }
}

/// A bond declared explicitly in the input (e.g. CIF `geom_bond_*` loop),
/// referencing atoms by label rather than index.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredBond {
    pub label_a: String,
    pub label_b: String,
    pub distance: f64,
}

/// The raw ingested structure: one cell, its asymmetric-unit atoms, and any
/// declared bonds. Constructed once per input and not mutated afterwards
/// (§3 lifecycle) — symmetry expansion and sanitation consume it to build a
/// `PeriodicGraph` over the expanded atom list.
#[derive(Debug, Clone)]
pub struct Structure {
    pub cell: Cell,
    pub atoms: Vec<AtomRecord>,
    pub bonds: Vec<DeclaredBond>,
}
