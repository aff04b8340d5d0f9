use crate::core::structure::{AtomRecord, Cell, DeclaredBond, Structure, SymmetryOp};
use crate::error::NetError;
use anyhow::{anyhow, Context, Result};
use nalgebra::{Matrix3, Vector3};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Parses a float value from a CIF string, safely removing uncertainty
/// parentheses. Example: "1.234(5)" -> 1.234.
fn parse_cif_float(s: &str) -> Result<f64> {
    let clean_s = s.split('(').next().unwrap_or(s);
    clean_s.parse::<f64>().with_context(|| format!("failed to parse '{s}' as float"))
}

fn parse_symmetry_component(component: &str) -> Result<([i32; 3], f64)> {
    let mut row = [0i32; 3];
    let mut translation = 0.0;

    let mut tokens: Vec<String> = Vec::new();
    let mut current = String::new();
    for c in component.chars() {
        if (c == '+' || c == '-') && !current.is_empty() {
            tokens.push(current.clone());
            current.clear();
        }
        current.push(c);
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    for tok in tokens {
        let tok = tok.trim();
        let (sign, rest) = match tok.strip_prefix('-') {
            Some(r) => (-1i32, r),
            None => match tok.strip_prefix('+') {
                Some(r) => (1, r),
                None => (1, tok),
            },
        };
        let rest = rest.trim();
        if rest.eq_ignore_ascii_case("x") {
            row[0] += sign;
        } else if rest.eq_ignore_ascii_case("y") {
            row[1] += sign;
        } else if rest.eq_ignore_ascii_case("z") {
            row[2] += sign;
        } else if !rest.is_empty() {
            let value = if let Some((num, den)) = rest.split_once('/') {
                let n: f64 = num.trim().parse().with_context(|| format!("bad symmetry fraction `{rest}`"))?;
                let d: f64 = den.trim().parse().with_context(|| format!("bad symmetry fraction `{rest}`"))?;
                n / d
            } else {
                rest.parse::<f64>().with_context(|| format!("bad symmetry translation `{rest}`"))?
            };
            translation += sign as f64 * value;
        }
    }
    Ok((row, translation))
}

/// Parses a `symmetry_equiv_pos_as_xyz`-style string such as `-x+1/2,y,-z`
/// into a `SymmetryOp` (§6).
fn parse_symmetry_op(text: &str) -> Result<SymmetryOp> {
    let cleaned = text.trim().trim_matches('\'').trim_matches('"');
    let parts: Vec<&str> = cleaned.split(',').collect();
    if parts.len() != 3 {
        return Err(anyhow!("symmetry operation `{text}` does not have exactly 3 components"));
    }
    let mut rotation_rows = [[0i32; 3]; 3];
    let mut translation = Vector3::zeros();
    for (i, part) in parts.iter().enumerate() {
        let (row, t) = parse_symmetry_component(part)?;
        rotation_rows[i] = row;
        translation[i] = t;
    }
    let rotation = Matrix3::new(
        rotation_rows[0][0], rotation_rows[0][1], rotation_rows[0][2],
        rotation_rows[1][0], rotation_rows[1][1], rotation_rows[1][2],
        rotation_rows[2][0], rotation_rows[2][1], rotation_rows[2][2],
    );
    Ok(SymmetryOp { rotation, translation })
}

struct ParsedLoop<'a> {
    headers: Vec<&'a str>,
    rows: Vec<Vec<&'a str>>,
}

/// Parses a CIF file into a `Structure` (§6): unit cell, asymmetric-unit
/// atoms, declared bonds, and the space group's equivalent positions. A
/// manual tokenizer (`loop_` header collection plus `_cell_*` key-value
/// scanning), extended with symmetry, occupancy, residue, and
/// `_geom_bond_*` awareness.
pub fn from_cif(path: &Path) -> Result<Structure> {
    let contents = fs::read_to_string(path).with_context(|| format!("could not read CIF file: {path:?}"))?;
    let lines: Vec<&str> = contents.lines().map(str::trim).filter(|l| !l.is_empty() && !l.starts_with('#')).collect();

    let mut scalars: HashMap<&str, &str> = HashMap::new();
    let mut loops: Vec<ParsedLoop> = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];

        if line.starts_with('_') {
            let mut parts = line.splitn(2, char::is_whitespace);
            let key = parts.next().unwrap_or_default();
            let value = parts.next().unwrap_or_default().trim();
            if !value.is_empty() {
                scalars.insert(key, value.trim_matches('\'').trim_matches('"'));
            }
            i += 1;
            continue;
        }

        if line.starts_with("loop_") {
            i += 1;
            let mut headers = Vec::new();
            while i < lines.len() && lines[i].starts_with('_') {
                headers.push(lines[i]);
                i += 1;
            }
            let mut rows = Vec::new();
            while i < lines.len() && !lines[i].starts_with('_') && !lines[i].starts_with("loop_") {
                rows.push(lines[i].split_whitespace().collect::<Vec<&str>>());
                i += 1;
            }
            loops.push(ParsedLoop { headers, rows });
            continue;
        }

        i += 1;
    }

    let get_scalar_f64 = |key: &str| -> Result<f64> {
        scalars.get(key).copied().ok_or_else(|| anyhow!("CIF missing tag: {key}")).and_then(parse_cif_float)
    };

    let a = get_scalar_f64("_cell_length_a")?;
    let b = get_scalar_f64("_cell_length_b")?;
    let c = get_scalar_f64("_cell_length_c")?;
    let alpha = get_scalar_f64("_cell_angle_alpha")?;
    let beta = get_scalar_f64("_cell_angle_beta")?;
    let gamma = get_scalar_f64("_cell_angle_gamma")?;

    let hall_number = scalars.get("_symmetry_Int_Tables_number").and_then(|v| v.parse::<i32>().ok());

    let mut equivalents = Vec::new();
    for l in &loops {
        let sym_col = l
            .headers
            .iter()
            .position(|h| *h == "_symmetry_equiv_pos_as_xyz" || *h == "_space_group_symop_operation_xyz");
        if let Some(col) = sym_col {
            for row in &l.rows {
                if let Some(text) = row.get(col) {
                    let op = parse_symmetry_op(text)?;
                    // The identity operation is implicit (§3) and never stored,
                    // even when a CIF's symmetry loop lists it explicitly.
                    if op.rotation != Matrix3::identity() || op.translation != Vector3::zeros() {
                        equivalents.push(op);
                    }
                }
            }
        }
    }

    let cell = Cell::from_parameters(a, b, c, alpha, beta, gamma, equivalents, hall_number)
        .map_err(|e| anyhow!("{e}"))?;

    let mut atoms = Vec::new();
    for l in &loops {
        if !l.headers.contains(&"_atom_site_fract_x") {
            continue;
        }
        let label_idx = l.headers.iter().position(|&h| h == "_atom_site_label");
        let symbol_idx = l.headers.iter().position(|&h| h == "_atom_site_type_symbol");
        let x_idx = l.headers.iter().position(|&h| h == "_atom_site_fract_x").context("CIF missing '_atom_site_fract_x'")?;
        let y_idx = l.headers.iter().position(|&h| h == "_atom_site_fract_y").context("CIF missing '_atom_site_fract_y'")?;
        let z_idx = l.headers.iter().position(|&h| h == "_atom_site_fract_z").context("CIF missing '_atom_site_fract_z'")?;
        let occ_idx = l.headers.iter().position(|&h| h == "_atom_site_occupancy");
        let residue_idx = l.headers.iter().position(|&h| h == "_atom_site_residue");

        if label_idx.is_none() && symbol_idx.is_none() {
            return Err(NetError::MissingAtomInformation(
                "neither `_atom_site_label` nor `_atom_site_type_symbol` present".to_string(),
            )
            .into());
        }

        for row in &l.rows {
            let label = label_idx.and_then(|idx| row.get(idx)).copied().unwrap_or("?").to_string();
            let element = symbol_idx
                .and_then(|idx| row.get(idx))
                .map(|s| s.to_string())
                .unwrap_or_else(|| label.chars().take_while(|c| c.is_alphabetic()).collect());
            let x = parse_cif_float(row[x_idx])?;
            let y = parse_cif_float(row[y_idx])?;
            let z = parse_cif_float(row[z_idx])?;

            let mut atom = AtomRecord::new(label, element, Vector3::new(x, y, z));
            if let Some(idx) = occ_idx {
                atom.occupancy = row.get(idx).and_then(|s| parse_cif_float(s).ok());
            }
            if let Some(idx) = residue_idx {
                atom.residue = row.get(idx).map(|s| s.to_string());
            }
            atoms.push(atom);
        }
    }

    if atoms.is_empty() {
        return Err(NetError::MissingAtomInformation("no `_atom_site_fract_*` loop found".to_string()).into());
    }

    let mut bonds = Vec::new();
    for l in &loops {
        let a_idx = l.headers.iter().position(|&h| h == "_geom_bond_atom_site_label_1");
        let b_idx = l.headers.iter().position(|&h| h == "_geom_bond_atom_site_label_2");
        let d_idx = l.headers.iter().position(|&h| h == "_geom_bond_distance");
        if let (Some(a_idx), Some(b_idx), Some(d_idx)) = (a_idx, b_idx, d_idx) {
            for row in &l.rows {
                if row.len() <= a_idx.max(b_idx).max(d_idx) {
                    continue;
                }
                bonds.push(DeclaredBond {
                    label_a: row[a_idx].to_string(),
                    label_b: row[b_idx].to_string(),
                    distance: parse_cif_float(row[d_idx])?,
                });
            }
        }
    }

    Ok(Structure { cell, atoms, bonds })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_identity_symmetry() {
        let op = parse_symmetry_op("x,y,z").unwrap();
        assert_eq!(op.rotation, Matrix3::identity());
        assert_eq!(op.translation, Vector3::zeros());
    }

    #[test]
    fn parses_an_inversion_with_a_half_cell_shift() {
        let op = parse_symmetry_op("-x+1/2,-y,-z+1/2").unwrap();
        assert_eq!(op.rotation, Matrix3::from_diagonal(&Vector3::new(-1, -1, -1)));
        assert_eq!(op.translation, Vector3::new(0.5, 0.0, 0.5));
    }

    #[test]
    fn parses_a_quoted_operation_with_internal_spaces() {
        let op = parse_symmetry_op("'x, y, z'").unwrap();
        assert_eq!(op.rotation, Matrix3::identity());
    }

    #[test]
    fn an_explicit_identity_row_in_the_symmetry_loop_is_not_stored() {
        let cif = "\
_cell_length_a 5.0
_cell_length_b 5.0
_cell_length_c 5.0
_cell_angle_alpha 90.0
_cell_angle_beta 90.0
_cell_angle_gamma 90.0
loop_
_symmetry_equiv_pos_as_xyz
x,y,z
-x,-y,-z
loop_
_atom_site_label
_atom_site_type_symbol
_atom_site_fract_x
_atom_site_fract_y
_atom_site_fract_z
C1 C 0.1 0.2 0.3
";
        let mut path = std::env::temp_dir();
        path.push(format!("crystal_nets_test_identity_{}.cif", std::process::id()));
        fs::write(&path, cif).unwrap();

        let structure = from_cif(&path).unwrap();
        fs::remove_file(&path).ok();

        // Only the non-identity inversion survives (§3: identity is implicit).
        assert_eq!(structure.cell.equivalents.len(), 1);
        assert_eq!(structure.cell.equivalents[0].rotation, Matrix3::from_diagonal(&Vector3::new(-1, -1, -1)));
    }
}
