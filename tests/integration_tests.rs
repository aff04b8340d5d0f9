use crystal_nets::{pipeline, Archive, BondingMode, CanonicalNet, Diagnostics, Genome, NetError, PipelineOptions};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

fn write_fixture(name: &str, contents: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("crystal_nets_test_{}_{}.cif", std::process::id(), name));
    fs::write(&path, contents).expect("failed to write fixture CIF");
    path
}

/// Nets whose equilibrium placement is known to degenerate (§8, §9):
/// canonicalization must still succeed, but whether the `unstable` flag ends
/// up set is not asserted either way.
const KNOWN_UNSTABLE_NETS: &[&str] = &["sxt", "llw-z"];

/// "Expected failure" harness for `KNOWN_UNSTABLE_NETS` (§9): unlike a plain
/// `assert_eq!` on the canonical genome, this only requires canonicalization
/// to *succeed* for a net on the allow-list — a regression is a hard error
/// (panic, `Err`), not a change in the `unstable` flag.
fn assert_expected_unstable(name: &str, result: &Result<CanonicalNet, NetError>) {
    assert!(
        KNOWN_UNSTABLE_NETS.contains(&name),
        "`{name}` is not on the known-unstable allow-list; use a plain assertion instead"
    );
    assert!(
        result.is_ok(),
        "canonicalizing known-unstable net `{name}` must still succeed (only `unstable` may vary), got {result:?}"
    );
}

#[test]
#[ignore = "no sxt/llw-z archive fixtures are bundled with this crate yet"]
fn known_unstable_nets_canonicalize_without_erroring() {
    // Scaffolding for §9's expected-failure harness: once sxt/llw-z fixture
    // CIFs or archive genomes are available, replace `synthetic_result` with
    // a real `pipeline::run`/`canonicalize` call per name, still funneled
    // through `assert_expected_unstable`.
    for name in KNOWN_UNSTABLE_NETS {
        let synthetic_result: Result<CanonicalNet, NetError> = Ok(CanonicalNet {
            rank: 3,
            vertex_count: 1,
            edges: vec![],
            unstable: true,
        });
        assert_expected_unstable(name, &synthetic_result);
    }
}

const CUBIC_CELL: &str = "\
_cell_length_a 3.0
_cell_length_b 3.0
_cell_length_c 3.0
_cell_angle_alpha 90.0
_cell_angle_beta 90.0
_cell_angle_gamma 90.0
";

/// A single-atom primitive cubic net (§3's `pcu`-shaped topology): one vertex,
/// bonded to itself across each of the three cell faces.
fn primitive_cubic_net_cif() -> String {
    format!(
        "{CUBIC_CELL}\
loop_
_atom_site_label
_atom_site_type_symbol
_atom_site_fract_x
_atom_site_fract_y
_atom_site_fract_z
Si1 Si 0.0 0.0 0.0
loop_
_geom_bond_atom_site_label_1
_geom_bond_atom_site_label_2
_geom_bond_distance
Si1 Si1 3.0
"
    )
}

/// A two-atom 1-periodic chain: A1 at x=0.0, B1 at x=0.5, bonded across the
/// midpoint and across the cell boundary. `rows_swapped` controls only the
/// order the two atom rows appear in the CIF loop, not their positions.
fn chain_cif(rows_swapped: bool) -> String {
    let a_row = "A1 C 0.0 0.0 0.0";
    let b_row = "B1 N 0.5 0.0 0.0";
    let rows = if rows_swapped {
        format!("{b_row}\n{a_row}")
    } else {
        format!("{a_row}\n{b_row}")
    };
    format!(
        "{CUBIC_CELL}\
loop_
_atom_site_label
_atom_site_type_symbol
_atom_site_fract_x
_atom_site_fract_y
_atom_site_fract_z
{rows}
loop_
_geom_bond_atom_site_label_1
_geom_bond_atom_site_label_2
_geom_bond_distance
A1 B1 1.5
"
    )
}

fn input_options() -> PipelineOptions {
    PipelineOptions {
        bonding_mode: BondingMode::Input,
        ..PipelineOptions::default()
    }
}

#[test]
fn a_single_atom_self_bonded_across_three_faces_canonicalizes_to_a_rank_three_net() {
    let path = write_fixture("pcu", &primitive_cubic_net_cif());
    let structure = crystal_nets::parser::from_cif(&path).expect("CIF should parse");
    let mut diagnostics = Diagnostics::new(false);

    let nets = pipeline::run(&structure, &input_options(), &mut diagnostics).expect("pipeline should succeed");

    assert_eq!(nets.len(), 1);
    let net = &nets[0];
    assert_eq!(net.rank, 3);
    assert_eq!(net.vertex_count, 1);
    assert_eq!(net.edges.len(), 3);
    assert!(!net.unstable);

    fs::remove_file(&path).ok();
}

#[test]
fn atom_listing_order_does_not_change_the_canonical_genome() {
    let path_a = write_fixture("chain_ab", &chain_cif(false));
    let path_b = write_fixture("chain_ba", &chain_cif(true));

    let structure_a = crystal_nets::parser::from_cif(&path_a).expect("CIF A should parse");
    let structure_b = crystal_nets::parser::from_cif(&path_b).expect("CIF B should parse");

    let mut diagnostics = Diagnostics::new(false);
    let nets_a = pipeline::run(&structure_a, &input_options(), &mut diagnostics).expect("pipeline A should succeed");
    let nets_b = pipeline::run(&structure_b, &input_options(), &mut diagnostics).expect("pipeline B should succeed");

    assert_eq!(nets_a.len(), 1);
    assert_eq!(nets_b.len(), 1);

    let genome_a: Genome = nets_a.into_iter().next().unwrap().into();
    let genome_b: Genome = nets_b.into_iter().next().unwrap().into();
    assert_eq!(genome_a.to_string(), genome_b.to_string());

    fs::remove_file(&path_a).ok();
    fs::remove_file(&path_b).ok();
}

#[test]
fn input_mode_without_declared_bonds_is_a_fatal_error() {
    let cif = format!(
        "{CUBIC_CELL}\
loop_
_atom_site_label
_atom_site_type_symbol
_atom_site_fract_x
_atom_site_fract_y
_atom_site_fract_z
Si1 Si 0.0 0.0 0.0
"
    );
    let path = write_fixture("no_bonds", &cif);
    let structure = crystal_nets::parser::from_cif(&path).expect("CIF should parse");
    let mut diagnostics = Diagnostics::new(false);

    let result = pipeline::run(&structure, &input_options(), &mut diagnostics);
    assert!(matches!(result.unwrap_err().downcast_ref::<NetError>(), Some(NetError::BondingUnavailable)));

    fs::remove_file(&path).ok();
}

#[test]
fn a_computed_genome_round_trips_through_an_archive_file() {
    let path = write_fixture("pcu_archive", &primitive_cubic_net_cif());
    let structure = crystal_nets::parser::from_cif(&path).expect("CIF should parse");
    let mut diagnostics = Diagnostics::new(false);
    let nets = pipeline::run(&structure, &input_options(), &mut diagnostics).expect("pipeline should succeed");
    let genome: Genome = nets.into_iter().next().unwrap().into();

    let mut archive = Archive::new();
    archive.insert(&genome.to_string(), "pcu").unwrap();
    let text = archive.serialize();

    let reloaded = Archive::parse(&text).unwrap();
    assert_eq!(reloaded.lookup(&genome.to_string()), Some("pcu"));
    assert!(!reloaded.is_external);

    fs::remove_file(&path).ok();
}

#[test]
fn an_unrecognized_genome_reports_unknown_rather_than_erroring() {
    let archive = Archive::new();
    let genome = Genome::from_str("3 1 1 1 0 0 1 1 0 1 0 1 1 0 0 1").unwrap();
    assert_eq!(archive.lookup(&genome.to_string()), None);
}
