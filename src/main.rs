use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use crystal_nets::{parser, Archive, BondingMode, Diagnostics, Genome, PipelineOptions, StructureType};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliStructureType {
    Auto,
    Mof,
    Cluster,
    Zeolite,
    Guess,
    Atom,
}

impl From<CliStructureType> for StructureType {
    fn from(t: CliStructureType) -> Self {
        match t {
            CliStructureType::Auto => StructureType::Auto,
            CliStructureType::Mof => StructureType::Mof,
            CliStructureType::Cluster => StructureType::Cluster,
            CliStructureType::Zeolite => StructureType::Zeolite,
            CliStructureType::Guess => StructureType::Guess,
            CliStructureType::Atom => StructureType::Atom,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "CrystalNets",
    about = "Topological identification of periodic nets",
    override_usage = "CrystalNets [OPTIONS] [PATH]",
    help_template = "usage: {usage}\n\n{about}\n\n{all-args}\n"
)]
struct Cli {
    /// Structure file to identify. Mutually exclusive with `-g`.
    path: Option<PathBuf>,

    /// Look up a genome string directly, bypassing ingestion.
    #[arg(short = 'g', long = "genome")]
    genome: Option<String>,

    /// Archive file to read identifiers from (defaults to an empty archive).
    #[arg(short = 'a', long = "archive")]
    archive: Option<PathBuf>,

    /// Structure type, governing sanitation tuning.
    #[arg(short = 'c', long = "structure-type", value_enum, default_value_t = CliStructureType::Auto)]
    structure_type: CliStructureType,

    /// Suppress sanitation warnings on the diagnostic stream.
    #[arg(long)]
    no_warnings: bool,
}

fn load_archive(path: Option<&PathBuf>) -> Result<Archive> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("could not read archive: {path:?}"))?;
            let mut archive = Archive::parse(&text)?;
            if archive.is_external {
                archive.recanonicalize()?;
            }
            Ok(archive)
        }
        None => Ok(Archive::new()),
    }
}

/// Reports one net's lookup result on stdout, returning whether it was
/// recognized (§7's exit-code contract: 0 if every subnet resolved, 1 if
/// any genome was computed but not found in the archive).
fn report(genome: &Genome, archive: &Archive) -> (String, bool) {
    let text = genome.to_string();
    match archive.lookup(&text) {
        Some(identifier) => (identifier.to_string(), true),
        None => ("UNKNOWN".to_string(), false),
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let archive = load_archive(cli.archive.as_ref())?;

    if let Some(genome_text) = &cli.genome {
        let genome = Genome::from_str(genome_text).map_err(|e| anyhow!(e))?;
        let (identifier, recognized) = report(&genome, &archive);
        println!("{identifier}");
        return Ok(if recognized { ExitCode::SUCCESS } else { ExitCode::from(1) });
    }

    let path = cli.path.ok_or_else(|| anyhow!("expected a structure file path or `-g <genome>`"))?;
    let structure = parser::from_cif(&path)?;

    let options = PipelineOptions {
        bonding_mode: BondingMode::Auto,
        structure_type: cli.structure_type.into(),
        warnings_enabled: !cli.no_warnings,
        ..PipelineOptions::default()
    };
    let mut diagnostics = Diagnostics::new(options.warnings_enabled);

    let nets = crystal_nets::pipeline::run(&structure, &options, &mut diagnostics)?;

    let mut identifiers = Vec::with_capacity(nets.len());
    let mut all_recognized = true;
    for net in nets {
        let genome: Genome = net.into();
        let (identifier, recognized) = report(&genome, &archive);
        all_recognized &= recognized;
        println!("{identifier}");
        identifiers.push(identifier);
    }

    if identifiers.len() > 1 {
        println!("{}", identifiers.join(" + "));
    }

    Ok(if all_recognized { ExitCode::SUCCESS } else { ExitCode::from(1) })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
