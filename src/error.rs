use thiserror::Error;

/// Named error kinds surfaced by the ingestion and canonicalization pipeline.
///
/// These propagate through `anyhow::Result` at the pipeline boundary (see
/// `crate::pipeline`), but callers that need to match on the kind of
/// failure (a batch orchestrator isolating per-input failures, say) can
/// downcast via `anyhow::Error::downcast_ref::<NetError>()`.
#[derive(Debug, Error)]
pub enum NetError {
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("missing atom information: {0}")]
    MissingAtomInformation(String),

    #[error("bonding mode is `input` but no bonds were specified")]
    BondingUnavailable,

    #[error("residue assignment required but atom {0} has no residue label")]
    ResidueAssignment(usize),

    #[error("archive format error: {0}")]
    ArchiveFormat(String),

    #[error("effective lattice rank is 0: structure is molecular, not periodic")]
    NonPeriodic,
}
