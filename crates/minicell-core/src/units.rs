//! Particle count ↔ concentration conversion and cell volume.
//!
//! Concentrations are in mM, volumes in litres, surface areas in nm².
//! The cell is treated as a sphere whose surface area is tracked by the
//! `CellSA` pseudo-species; the resulting volume is the only bridge between
//! the discrete and continuous representations.

use std::error::Error;
use std::f64::consts::PI;
use std::fmt;

/// Avogadro's number, molecules per mole.
pub const AVOGADRO: f64 = 6.022e23;

/// Upper bound on the cell volume, in litres.
pub const MAX_CELL_VOLUME_LITRES: f64 = 6.70e-17;

/// `CellV` record stored when the volume is capped.
pub const CAPPED_VOLUME_RECORD: i64 = 670;

/// Total cell surface area pseudo-species (nm²).
pub const CELL_SA: &str = "CellSA";
/// Lipid contribution to the surface area (nm²).
pub const CELL_SA_LIP: &str = "CellSA_Lip";
/// Membrane protein contribution to the surface area (nm²).
pub const CELL_SA_PROT: &str = "CellSA_Prot";
/// Cell volume record, in units of 10⁻¹⁹ L.
pub const CELL_V: &str = "CellV";

/// Whether a key is one of the surface-area pseudo-species.
///
/// These are recomputed from counts after every communication step and
/// are never overwritten with integrated values.
pub fn is_surface_area_species(key: &str) -> bool {
    key == CELL_SA || key == CELL_SA_LIP || key == CELL_SA_PROT
}

/// Cell volume derived from surface area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellVolume {
    /// Volume in litres, clamped at [`MAX_CELL_VOLUME_LITRES`].
    pub litres: f64,
    /// Integer record for the `CellV` pseudo-species.
    pub record: i64,
    /// Whether the clamp was applied.
    pub capped: bool,
}

/// Compute the spherical cell volume for a surface area in nm².
pub fn volume_from_surface_area(surface_area_nm2: f64) -> CellVolume {
    let radius_m = (surface_area_nm2 / (4.0 * PI)).sqrt() * 1e-9;
    let litres = (4.0 / 3.0) * PI * radius_m.powi(3) * 1000.0;
    if litres > MAX_CELL_VOLUME_LITRES {
        CellVolume {
            litres: MAX_CELL_VOLUME_LITRES,
            record: CAPPED_VOLUME_RECORD,
            capped: true,
        }
    } else {
        CellVolume {
            litres,
            record: (litres * 1e19).round() as i64,
            capped: false,
        }
    }
}

/// A count/concentration conversion produced a non-finite result.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConversionError {
    /// The value being converted.
    pub value: f64,
    /// The volume used, in litres.
    pub volume_litres: f64,
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "conversion of {} with volume {} L is not finite",
            self.value, self.volume_litres
        )
    }
}

impl Error for ConversionError {}

/// Convert a particle count to a concentration in mM.
pub fn part_to_mm(particles: f64, volume_litres: f64) -> Result<f64, ConversionError> {
    let concentration = (particles * 1000.0) / (AVOGADRO * volume_litres);
    if concentration.is_finite() {
        Ok(concentration)
    } else {
        Err(ConversionError {
            value: particles,
            volume_litres,
        })
    }
}

/// Convert a concentration in mM to a whole particle count.
///
/// Rounds to the nearest particle, then floors.
pub fn mm_to_part(concentration: f64, volume_litres: f64) -> Result<i64, ConversionError> {
    let particles = ((concentration / 1000.0) * AVOGADRO * volume_litres)
        .round()
        .floor();
    if particles.is_finite() && particles.abs() < i64::MAX as f64 {
        Ok(particles as i64)
    } else {
        Err(ConversionError {
            value: concentration,
            volume_litres,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn volume_of_200nm_sphere() {
        // r = 200 nm  =>  SA = 4π r² nm²
        let sa = 4.0 * PI * 200.0f64.powi(2);
        let v = volume_from_surface_area(sa);
        let expected = (4.0 / 3.0) * PI * (2.0e-7f64).powi(3) * 1000.0;
        assert_relative_eq!(v.litres, expected, max_relative = 1e-12);
        assert!(!v.capped);
        assert_eq!(v.record, (expected * 1e19).round() as i64);
    }

    #[test]
    fn volume_is_capped() {
        let v = volume_from_surface_area(1e9);
        assert!(v.capped);
        assert_eq!(v.litres, MAX_CELL_VOLUME_LITRES);
        assert_eq!(v.record, 670);
    }

    #[test]
    fn zero_volume_conversion_fails() {
        assert!(part_to_mm(10.0, 0.0).is_err());
        assert!(mm_to_part(f64::NAN, 1e-17).is_err());
    }

    #[test]
    fn known_conversion() {
        let v = 3.35e-17;
        let c = part_to_mm(1000.0, v).unwrap();
        assert_relative_eq!(c, 1000.0 * 1000.0 / (AVOGADRO * v), max_relative = 1e-12);
        assert_eq!(mm_to_part(c, v).unwrap(), 1000);
    }

    #[test]
    fn surface_area_species_are_recognized() {
        assert!(is_surface_area_species(CELL_SA));
        assert!(is_surface_area_species(CELL_SA_LIP));
        assert!(is_surface_area_species(CELL_SA_PROT));
        assert!(!is_surface_area_species(CELL_V));
    }

    proptest! {
        #[test]
        fn count_round_trip_at_fixed_volume(
            n in 0i64..10_000_000,
            volume in 1e-18f64..6.7e-17,
        ) {
            let c = part_to_mm(n as f64, volume).unwrap();
            prop_assert_eq!(mm_to_part(c, volume).unwrap(), n);
        }
    }
}
