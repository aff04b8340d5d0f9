/// How the candidate edge set for a structure is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondingMode {
    /// Use bonds declared in the input file only; error if none are present.
    Input,
    /// Ignore declared bonds and guess them from geometry (see `chemistry::bonding`).
    Guess,
    /// Prefer declared bonds, fall back to guessing, and re-guess if sanitation
    /// deletes a bond during the sanity check (§4.5 step 4).
    Auto,
}

/// The `-c <structure-type>` CLI switch; governs sanitation tuning (MOF mode
/// widens valence targets and enables metal-aware triangle/bond-guess cutoffs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureType {
    Auto,
    Mof,
    Cluster,
    Zeolite,
    Guess,
    Atom,
}

impl StructureType {
    pub fn is_mof(self) -> bool {
        matches!(self, StructureType::Mof)
    }
}

/// Threaded by reference through every pipeline phase.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub bonding_mode: BondingMode,
    pub structure_type: StructureType,
    /// c0 in §4.4: `d < c0 * (r_i + r_j)`.
    pub bond_cutoff_coefficient: f64,
    /// Widen Van der Waals radii by 1.5x for metals during bond guessing.
    pub widen_metal_radii: bool,
    /// Elements whose homoatomic bonds are stripped in sanitation step 5.
    pub remove_homoatomic_for: Vec<String>,
    pub warnings_enabled: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            bonding_mode: BondingMode::Auto,
            structure_type: StructureType::Auto,
            bond_cutoff_coefficient: 0.9,
            widen_metal_radii: true,
            remove_homoatomic_for: vec!["O".to_string()],
            warnings_enabled: true,
        }
    }
}

impl PipelineOptions {
    pub fn mof_mode(mut self) -> Self {
        self.structure_type = StructureType::Mof;
        self
    }
}
