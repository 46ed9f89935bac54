//! Cell geometry refresh.
//!
//! The membrane surface area is recomputed from lipid and membrane protein
//! counts after every communication step and stored in the `CellSA*`
//! pseudo-species. The derived spherical volume feeds the next
//! count/concentration conversion.

use indexmap::IndexMap;
use minicell_core::{
    volume_from_surface_area, CellVolume, ConfigError, SimError, SpeciesReader,
    SpeciesWriter, CELL_SA, CELL_SA_LIP, CELL_SA_PROT, CELL_V,
};

/// Membrane loci of the minimal cell counted toward protein surface area.
///
/// ATP synthase subunits outside the membrane (0793, 0794, 0796) are left
/// out.
const MEMBRANE_LOCI: [&str; 93] = [
    "0005", "0008", "0009", "0010", "0011", "0030", "0034", "0060", "0095", "0113", "0114",
    "0116", "0117", "0132", "0143", "0146", "0164", "0165", "0166", "0167", "0168", "0169",
    "0195", "0196", "0197", "0235", "0239", "0248", "0249", "0296", "0304", "0314", "0317",
    "0326", "0332", "0338", "0345", "0346", "0371", "0372", "0379", "0388", "0398", "0399",
    "0411", "0425", "0426", "0427", "0428", "0439", "0440", "0478", "0481", "0505", "0516",
    "0601", "0639", "0641", "0642", "0643", "0652", "0685", "0686", "0691", "0696", "0706",
    "0707", "0708", "0774", "0777", "0778", "0779", "0787", "0789", "0790", "0791", "0792",
    "0795", "0797", "0822", "0827", "0830", "0835", "0836", "0839", "0852", "0870", "0872",
    "0876", "0878", "0879", "0881", "0908",
];

/// Lipid species and their per-molecule area in nm².
const LIPID_AREAS: [(&str, f64); 9] = [
    ("M_clpn_c", 0.4),
    ("M_chsterol_c", 0.35),
    ("M_sm_c", 0.45),
    ("M_pc_c", 0.55),
    ("M_pg_c", 0.6),
    ("M_galfur12dgr_c", 0.6),
    ("M_12dgr_c", 0.5),
    ("M_pa_c", 0.5),
    ("M_cdpdag_c", 0.5),
];

/// Species key(s) holding the protein of a membrane locus.
///
/// The glucose transporter is tracked as two species (free and
/// phosphorylated) instead of the usual `M_PTN_JCVISYN3A_<locus>_c`.
fn protein_keys(locus: &str) -> Vec<String> {
    match locus {
        "0779" => vec!["ptsg".to_string(), "ptsg_P".to_string()],
        _ => vec![format!("M_PTN_JCVISYN3A_{locus}_c")],
    }
}

/// Parameters of the surface area model.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometryConfig {
    /// Lipid species → area per molecule (nm²).
    pub lipid_areas: IndexMap<String, f64>,
    /// Fraction of the summed lipid area that forms the outer leaflet.
    pub outer_leaflet_fraction: f64,
    /// Average area of one membrane protein (nm²).
    pub protein_area: f64,
    /// Species keys whose counts are membrane proteins.
    pub membrane_proteins: Vec<String>,
}

impl GeometryConfig {
    /// The minimal-cell membrane composition.
    pub fn minimal_cell() -> Self {
        Self {
            lipid_areas: LIPID_AREAS
                .iter()
                .map(|&(k, a)| (k.to_string(), a))
                .collect(),
            outer_leaflet_fraction: 0.513,
            protein_area: 28.0,
            membrane_proteins: MEMBRANE_LOCI.iter().flat_map(|l| protein_keys(l)).collect(),
        }
    }

    /// Check fraction and areas.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let f = self.outer_leaflet_fraction;
        if !(f.is_finite() && f > 0.0 && f <= 1.0) {
            return Err(ConfigError::InvalidFraction { value: f });
        }
        if !(self.protein_area.is_finite() && self.protein_area >= 0.0) {
            return Err(ConfigError::InvalidArea {
                species: "membrane protein".to_string(),
                value: self.protein_area,
            });
        }
        for (species, &area) in &self.lipid_areas {
            if !(area.is_finite() && area >= 0.0) {
                return Err(ConfigError::InvalidArea {
                    species: species.clone(),
                    value: area,
                });
            }
        }
        Ok(())
    }

    /// Surface area implied by the current counts.
    ///
    /// Species missing from the store contribute nothing.
    pub fn surface_area<S: SpeciesReader + ?Sized>(&self, store: &S) -> SurfaceArea {
        let lipid_sum: f64 = self
            .lipid_areas
            .iter()
            .map(|(k, &a)| store.count(k).unwrap_or(0) as f64 * a)
            .sum();
        let proteins: i64 = self
            .membrane_proteins
            .iter()
            .map(|k| store.count(k).unwrap_or(0))
            .sum();
        let lipid = (lipid_sum * self.outer_leaflet_fraction).round() as i64;
        let protein = (proteins as f64 * self.protein_area).round() as i64;
        SurfaceArea {
            lipid,
            protein,
            total: lipid + protein,
        }
    }

    /// Recompute the surface area, write the `CellSA*` and `CellV`
    /// pseudo-species, and return the new volume.
    ///
    /// # Errors
    ///
    /// [`minicell_core::DefinitionError::UndeclaredSpecies`] if a pseudo-species is
    /// missing from the store.
    pub fn refresh<S: SpeciesWriter + ?Sized>(&self, store: &mut S) -> Result<CellVolume, SimError> {
        let area = self.surface_area(store);
        let volume = volume_from_surface_area(area.total as f64);
        store.write_count(CELL_SA_LIP, area.lipid)?;
        store.write_count(CELL_SA_PROT, area.protein)?;
        store.write_count(CELL_SA, area.total)?;
        store.write_count(CELL_V, volume.record)?;
        Ok(volume)
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self::minimal_cell()
    }
}

/// Membrane surface area split by contribution, in whole nm².
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceArea {
    /// Outer-leaflet lipid area.
    pub lipid: i64,
    /// Membrane protein area.
    pub protein: i64,
    /// Sum of both.
    pub total: i64,
}

/// Volume stored in the geometry state: derived from `CellSA`, with the
/// capped `CellV` record written back.
pub(crate) fn snapshot_volume<S: SpeciesWriter + ?Sized>(
    store: &mut S,
) -> Result<CellVolume, SimError> {
    let sa = store.require(CELL_SA)?;
    let volume = volume_from_surface_area(sa as f64);
    store.write_count(CELL_V, volume.record)?;
    Ok(volume)
}

#[cfg(test)]
mod tests {
    use super::*;
    use minicell_core::{DefinitionError, SpeciesMap};

    fn store_with(extra: &[(&str, i64)]) -> SpeciesMap {
        let mut m: SpeciesMap = [(CELL_SA, 0), (CELL_SA_LIP, 0), (CELL_SA_PROT, 0), (CELL_V, 0)]
            .into_iter()
            .collect();
        for &(k, v) in extra {
            m.declare(k);
            m.set_count(k, v);
        }
        m
    }

    #[test]
    fn minimal_cell_lists_every_membrane_protein() {
        let g = GeometryConfig::minimal_cell();
        assert_eq!(g.membrane_proteins.len(), 94);
        assert!(g.membrane_proteins.iter().any(|k| k == "ptsg_P"));
        assert!(g
            .membrane_proteins
            .iter()
            .any(|k| k == "M_PTN_JCVISYN3A_0005_c"));
        assert!(!g
            .membrane_proteins
            .iter()
            .any(|k| k == "M_PTN_JCVISYN3A_0779_c"));
        assert_eq!(g.lipid_areas.len(), 9);
        assert!(g.validate().is_ok());
    }

    #[test]
    fn lipid_and_protein_areas_are_rounded_separately() {
        let g = GeometryConfig::minimal_cell();
        let m = store_with(&[
            ("M_pc_c", 1000),
            ("M_clpn_c", 10),
            ("M_PTN_JCVISYN3A_0005_c", 3),
            ("ptsg", 1),
            ("ptsg_P", 1),
        ]);
        let sa = g.surface_area(&m);
        // (1000 * 0.55 + 10 * 0.4) * 0.513 = 284.202
        assert_eq!(sa.lipid, 284);
        assert_eq!(sa.protein, 140);
        assert_eq!(sa.total, 424);
    }

    #[test]
    fn refresh_writes_pseudo_species() {
        let g = GeometryConfig::minimal_cell();
        let mut m = store_with(&[("M_pc_c", 2_000_000)]);
        let v = g.refresh(&mut m).unwrap();
        let total = m.count(CELL_SA).unwrap();
        assert_eq!(total, m.count(CELL_SA_LIP).unwrap() + m.count(CELL_SA_PROT).unwrap());
        assert_eq!(v, volume_from_surface_area(total as f64));
        assert_eq!(m.count(CELL_V), Some(v.record));
    }

    #[test]
    fn refresh_requires_pseudo_species() {
        let g = GeometryConfig::minimal_cell();
        let mut m = SpeciesMap::new();
        let err = g.refresh(&mut m).unwrap_err();
        assert!(matches!(
            err,
            SimError::Definition(DefinitionError::UndeclaredSpecies { .. })
        ));
    }

    #[test]
    fn snapshot_caps_large_cells() {
        let mut m = store_with(&[]);
        m.set_count(CELL_SA, 10_000_000_000);
        let v = snapshot_volume(&mut m).unwrap();
        assert!(v.capped);
        assert_eq!(m.count(CELL_V), Some(670));
    }

    #[test]
    fn invalid_geometry_is_rejected() {
        let mut g = GeometryConfig::minimal_cell();
        g.outer_leaflet_fraction = 1.5;
        assert_eq!(
            g.validate(),
            Err(ConfigError::InvalidFraction { value: 1.5 })
        );
        let mut g = GeometryConfig::minimal_cell();
        g.lipid_areas.insert("M_pc_c".into(), f64::NAN);
        assert!(matches!(g.validate(), Err(ConfigError::InvalidArea { .. })));
    }
}
