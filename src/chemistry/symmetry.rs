use crate::core::structure::{wrap_fractional, AtomRecord, Cell, DeclaredBond};
use crate::core::graph::Offset;
use nalgebra::Vector3;

const POSITION_TOLERANCE: f64 = 1e-4;
const BOND_DISTANCE_TOLERANCE: f64 = 0.05;

fn cyclic_close(a: &Vector3<f64>, b: &Vector3<f64>, tol: f64) -> bool {
    for i in 0..3 {
        let mut d = (a[i] - b[i]).rem_euclid(1.0);
        if d > 0.5 {
            d = 1.0 - d;
        }
        if d > tol {
            return false;
        }
    }
    true
}

/// Applies every crystallographic equivalent position in `cell` to every
/// atom in `atoms`, removing duplicate images (§4.2): two positions are
/// equal if their component-wise difference is within `1e-4` after
/// reduction to `[0,1)`.
pub fn expand_atoms(cell: &Cell, atoms: &[AtomRecord]) -> Vec<AtomRecord> {
    let mut expanded: Vec<AtomRecord> = Vec::with_capacity(atoms.len() * (cell.equivalents.len() + 1));

    for atom in atoms {
        push_unique(&mut expanded, atom.clone());
        for op in &cell.equivalents {
            let mut image = atom.clone();
            image.fractional_coords = wrap_fractional(&op.apply(&atom.fractional_coords));
            push_unique(&mut expanded, image);
        }
    }
    expanded
}

fn push_unique(expanded: &mut Vec<AtomRecord>, candidate: AtomRecord) {
    let duplicate = expanded.iter().any(|existing| {
        existing.element == candidate.element
            && cyclic_close(&existing.fractional_coords, &candidate.fractional_coords, POSITION_TOLERANCE)
    });
    if !duplicate {
        expanded.push(candidate);
    }
}

/// Expands bonds declared on atom labels (e.g. CIF `geom_bond_*`) to every
/// image pair of the expanded atom list whose minimum-image-search distance
/// matches the declared one (§4.2).
pub fn expand_declared_bonds(
    cell: &Cell,
    expanded_atoms: &[AtomRecord],
    bonds: &[DeclaredBond],
) -> Vec<(usize, usize, Offset)> {
    let mut out = Vec::new();
    for bond in bonds {
        let a_indices: Vec<usize> = expanded_atoms
            .iter()
            .enumerate()
            .filter(|(_, a)| a.label == bond.label_a)
            .map(|(i, _)| i)
            .collect();
        let b_indices: Vec<usize> = expanded_atoms
            .iter()
            .enumerate()
            .filter(|(_, a)| a.label == bond.label_b)
            .map(|(i, _)| i)
            .collect();

        for &i in &a_indices {
            for &j in &b_indices {
                for dx in -1..=1 {
                    for dy in -1..=1 {
                        for dz in -1..=1 {
                            if i == j && dx == 0 && dy == 0 && dz == 0 {
                                continue;
                            }
                            let offset = [dx, dy, dz];
                            let shifted = expanded_atoms[j].fractional_coords
                                + Vector3::new(dx as f64, dy as f64, dz as f64);
                            let d = cell
                                .to_cartesian(&(shifted - expanded_atoms[i].fractional_coords))
                                .norm();
                            if (d - bond.distance).abs() < BOND_DISTANCE_TOLERANCE {
                                out.push((i, j, offset));
                            }
                        }
                    }
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::structure::SymmetryOp;
    use nalgebra::Matrix3;

    #[test]
    fn inversion_symmetry_doubles_a_generic_atom() {
        let cell = Cell::new(
            Matrix3::identity() * 10.0,
            vec![SymmetryOp {
                rotation: Matrix3::from_diagonal(&Vector3::new(-1, -1, -1)),
                translation: Vector3::zeros(),
            }],
            None,
        )
        .unwrap();
        let atoms = vec![AtomRecord::new("C1", "C", Vector3::new(0.2, 0.3, 0.4))];
        let expanded = expand_atoms(&cell, &atoms);
        assert_eq!(expanded.len(), 2);
    }

    #[test]
    fn atom_on_an_inversion_center_is_not_duplicated() {
        let cell = Cell::new(
            Matrix3::identity() * 10.0,
            vec![SymmetryOp {
                rotation: Matrix3::from_diagonal(&Vector3::new(-1, -1, -1)),
                translation: Vector3::zeros(),
            }],
            None,
        )
        .unwrap();
        let atoms = vec![AtomRecord::new("M1", "Mg", Vector3::new(0.0, 0.0, 0.0))];
        let expanded = expand_atoms(&cell, &atoms);
        assert_eq!(expanded.len(), 1);
    }
}
