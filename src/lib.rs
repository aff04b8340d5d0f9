// ============================================================================
// MODULE DECLARATIONS
// ============================================================================
pub mod analysis;
pub mod chemistry;
pub mod core;
pub mod diagnostics;
pub mod error;
pub mod io;
pub mod math;
pub mod options;
pub mod pipeline;

// ============================================================================
// RE-EXPORTS (Public API)
// ============================================================================
pub use crate::analysis::canonical::CanonicalNet;
pub use crate::analysis::genome::Genome;
pub use crate::core::graph::{Edge, Offset, PeriodicGraph};
pub use crate::core::structure::{AtomRecord, Cell, DeclaredBond, Structure, SymmetryOp};
pub use crate::diagnostics::Diagnostics;
pub use crate::error::NetError;
pub use crate::io::archive::Archive;
pub use crate::io::parser;
pub use crate::options::{BondingMode, PipelineOptions, StructureType};
