/// Van der Waals radius, in Angstrom, for a chemical element symbol.
/// Data source: Alvarez, S. (2013). Dalton Trans., 42, 8617-8636.
pub fn vdw_radius(element: &str) -> f64 {
    match element {
        "H" => 1.20, "He" => 1.40,
        "Li" => 1.82, "Be" => 1.53, "B" => 1.92, "C" => 1.70,
        "N" => 1.55, "O" => 1.52, "F" => 1.47, "Ne" => 1.54,
        "Na" => 2.27, "Mg" => 1.73, "Al" => 1.84, "Si" => 2.10,
        "P" => 1.80, "S" => 1.80, "Cl" => 1.75, "Ar" => 1.88,
        "K" => 2.75, "Ca" => 2.31, "Sc" => 2.11, "Ti" => 2.00, "V" => 2.00, "Cr" => 2.00,
        "Mn" => 2.00, "Fe" => 2.00, "Co" => 2.00, "Ni" => 1.63, "Cu" => 1.40, "Zn" => 1.39,
        "Ga" => 1.87, "Ge" => 2.11, "As" => 1.85, "Se" => 1.90, "Br" => 1.85, "Kr" => 2.02,
        "Rb" => 3.03, "Sr" => 2.49, "Pd" => 1.63, "Ag" => 1.72, "Cd" => 1.58,
        "In" => 1.93, "Sn" => 2.17, "Sb" => 2.06, "Te" => 2.06, "I" => 1.98, "Xe" => 2.16,
        "Cs" => 3.43, "Ba" => 2.68, "Pt" => 1.75, "Au" => 1.66, "Hg" => 1.55,
        "Tl" => 1.96, "Pb" => 2.02, "Bi" => 2.07, "Po" => 1.97, "At" => 2.02, "Rn" => 2.20,
        _ => 1.80,
    }
}

/// Whether an element is flagged as a metal for bond-guess widening and
/// triangle-removal cutoff purposes (§4.4, §4.5 step 2).
pub fn is_metal(element: &str) -> bool {
    matches!(
        element,
        "Li" | "Na" | "K" | "Rb" | "Cs" | "Fr"
            | "Be" | "Mg" | "Ca" | "Sr" | "Ba" | "Ra"
            | "Sc" | "Ti" | "V" | "Cr" | "Mn" | "Fe" | "Co" | "Ni" | "Cu" | "Zn"
            | "Y" | "Zr" | "Nb" | "Mo" | "Tc" | "Ru" | "Rh" | "Pd" | "Ag" | "Cd"
            | "Hf" | "Ta" | "W" | "Re" | "Os" | "Ir" | "Pt" | "Au" | "Hg"
            | "Al" | "Ga" | "In" | "Sn" | "Tl" | "Pb" | "Bi"
            | "La" | "Ce" | "Pr" | "Nd" | "Sm" | "Eu" | "Gd" | "Tb" | "Dy" | "Ho" | "Er" | "Tm" | "Yb" | "Lu"
    )
}

/// Target valence rule for the fix-valence sanitation step (§4.5 step 3).
#[derive(Debug, Clone, Copy)]
pub struct ValenceRule {
    pub min: usize,
    pub max: usize,
}

/// Looks up the valence target for `element`, widened per MOF mode (§4.5).
/// Returns `None` for elements with no configured target (no valence
/// fixing is applied to them).
pub fn valence_rule(element: &str, mof_mode: bool) -> Option<ValenceRule> {
    match element {
        "H" => Some(ValenceRule { min: 1, max: 1 }),
        "O" => Some(ValenceRule { min: 1, max: if mof_mode { 4 } else { 2 } }),
        "C" | "N" => Some(ValenceRule {
            min: 2,
            max: if mof_mode { 5 } else { 4 },
        }),
        _ => None,
    }
}
