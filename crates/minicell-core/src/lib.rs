//! Core types and traits for the minicell hybrid simulator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the abstractions shared by the discrete (CME) and continuous (ODE)
//! halves of the simulator: typed IDs, the error taxonomy, the species
//! store traits used at communication boundaries, and the unit
//! conversion between particle counts and concentrations.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod species;
pub mod traits;
pub mod units;

pub use error::{ConfigError, DefinitionError, NumericError, SimError};
pub use id::ReactionId;
pub use species::SpeciesMap;
pub use traits::{SpeciesReader, SpeciesWriter};
pub use units::{
    is_surface_area_species, mm_to_part, part_to_mm, volume_from_surface_area, CellVolume,
    ConversionError, AVOGADRO, CAPPED_VOLUME_RECORD, CELL_SA, CELL_SA_LIP, CELL_SA_PROT, CELL_V,
    MAX_CELL_VOLUME_LITRES,
};
