//! Top-level orchestration (§2's data flow): CIF ingestion through
//! symmetry expansion, collision pruning, bond resolution, the fixed-order
//! sanitation pipeline, per-component canonicalization, and archive
//! lookup. A config struct and an accumulating diagnostics sink are
//! threaded through a sequence of named phases.

use crate::analysis::canonical::{canonicalize, CanonicalNet};
use crate::chemistry::{bonding, collision, sanitize, symmetry};
use crate::core::graph::PeriodicGraph;
use crate::core::structure::Structure;
use crate::diagnostics::Diagnostics;
use crate::error::NetError;
use crate::options::{BondingMode, PipelineOptions, StructureType};
use anyhow::Result;

const MAX_AUTO_RESTARTS: usize = 2;

/// Runs the full pipeline over an already-parsed `Structure`, returning one
/// `CanonicalNet` per connected component (§2, §4).
pub fn run(structure: &Structure, options: &PipelineOptions, diagnostics: &mut Diagnostics) -> Result<Vec<CanonicalNet>> {
    if options.structure_type == StructureType::Cluster {
        if let Some(atom) = structure.atoms.iter().position(|a| a.residue.is_none()) {
            return Err(NetError::ResidueAssignment(atom).into());
        }
    }

    let expanded = symmetry::expand_atoms(&structure.cell, &structure.atoms);
    let removed = collision::prune_collisions(&expanded, &structure.cell);
    let remove_flags: Vec<bool> = (0..expanded.len()).map(|i| removed.contains(&i)).collect();

    let mut remap = vec![None; expanded.len()];
    let mut atoms = Vec::new();
    for (old, flag) in remove_flags.iter().enumerate() {
        if !flag {
            remap[old] = Some(atoms.len());
            atoms.push(expanded[old].clone());
        }
    }

    let declared_raw = symmetry::expand_declared_bonds(&structure.cell, &expanded, &structure.bonds);
    let declared: Vec<(usize, usize, crate::core::graph::Offset)> = declared_raw
        .into_iter()
        .filter_map(|(u, v, o)| match (remap[u], remap[v]) {
            (Some(nu), Some(nv)) => Some((nu, nv, o)),
            _ => None,
        })
        .collect();

    let mut edges = match options.bonding_mode {
        BondingMode::Input => {
            if declared.is_empty() {
                return Err(NetError::BondingUnavailable.into());
            }
            declared
        }
        BondingMode::Guess => bonding::guess_bonds(&atoms, &structure.cell, options),
        BondingMode::Auto => {
            if !declared.is_empty() {
                declared
            } else {
                bonding::guess_bonds(&atoms, &structure.cell, options)
            }
        }
    };

    let mof_mode = options.structure_type.is_mof();
    let mut graph = bonding::graph_from_edges(atoms.len(), &edges);

    for restart in 0..=MAX_AUTO_RESTARTS {
        sanitize::remove_atom_on_a_bond(&mut graph, &atoms, &structure.cell);
        sanitize::remove_triangles(&mut graph, &atoms, &structure.cell);
        sanitize::fix_valence(&mut graph, &atoms, &structure.cell, mof_mode, true);
        let deleted_any = sanitize::sanity_check(&mut graph, &atoms, &structure.cell, diagnostics);

        if !deleted_any || options.bonding_mode != BondingMode::Auto || restart == MAX_AUTO_RESTARTS {
            break;
        }
        diagnostics.warn("sanity check deleted a bond; re-guessing geometry-derived bonds");
        edges = bonding::guess_bonds(&atoms, &structure.cell, options);
        graph = bonding::graph_from_edges(atoms.len(), &edges);
    }

    sanitize::remove_homoatomic(&mut graph, &atoms, &options.remove_homoatomic_for);

    canonicalize_components(&graph)
}

fn canonicalize_components(graph: &PeriodicGraph) -> Result<Vec<CanonicalNet>> {
    let mut nets = Vec::new();
    for component in graph.connected_components() {
        let induced = graph.induced_subgraph(&component);
        nets.push(canonicalize(&induced)?);
    }
    Ok(nets)
}
