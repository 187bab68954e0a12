//! Staged and production record shapes.

use crate::config::PopulationLineage;
use crate::gmu_list::{GmuId, UnitExplode};

/// One staged row per (herd, year) as extracted from a source document.
///
/// Both population lineages stage into this shape; the legacy herd lineage
/// leaves `state` and `species` unset.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedPopulationRecord {
    pub state: Option<String>,
    pub species: Option<String>,
    pub herd_name: String,
    /// Data analysis unit, when the source carried one
    pub dau: Option<String>,
    pub post_hunt_estimate: Option<i64>,
    /// Male:female (bull:cow, buck:doe) ratio per 100 females
    pub sex_ratio: Option<f64>,
    pub year: i32,
    /// Raw unit-list field in either encoding
    pub gmu_list: Option<String>,
}

/// Why a staged row cannot reach production
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordDefect {
    /// Jurisdiction lineage row without a state
    MissingState,
    /// Jurisdiction lineage row without a species
    MissingSpecies,
    NegativeEstimate,
    NegativeRatio,
}

impl std::fmt::Display for RecordDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordDefect::MissingState => write!(f, "missing state"),
            RecordDefect::MissingSpecies => write!(f, "missing species"),
            RecordDefect::NegativeEstimate => write!(f, "negative post-hunt estimate"),
            RecordDefect::NegativeRatio => write!(f, "negative sex ratio"),
        }
    }
}

impl StagedPopulationRecord {
    /// Check the row against the identity rules of its lineage.
    pub fn defect(&self, lineage: PopulationLineage) -> Option<RecordDefect> {
        if lineage == PopulationLineage::Jurisdiction {
            if !matches!(self.state.as_deref(), Some(s) if !s.is_empty()) {
                return Some(RecordDefect::MissingState);
            }
            if !matches!(self.species.as_deref(), Some(s) if !s.is_empty()) {
                return Some(RecordDefect::MissingSpecies);
            }
        }
        if self.post_hunt_estimate.is_some_and(|e| e < 0) {
            return Some(RecordDefect::NegativeEstimate);
        }
        if self.sex_ratio.is_some_and(|r| r < 0.0) {
            return Some(RecordDefect::NegativeRatio);
        }
        None
    }
}

impl UnitExplode for StagedPopulationRecord {
    type Row = PopulationRecord;

    fn unit_list_field(&self) -> Option<&str> {
        self.gmu_list.as_deref()
    }

    fn at_unit(&self, gmu: GmuId) -> PopulationRecord {
        PopulationRecord {
            state: self.state.clone(),
            species: self.species.clone(),
            herd_name: self.herd_name.clone(),
            dau: self.dau.clone(),
            gmu,
            post_hunt_estimate: self.post_hunt_estimate,
            sex_ratio: self.sex_ratio,
            year: self.year,
        }
    }
}

/// An estimate and sex ratio attributed to one unit in one year.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationRecord {
    pub state: Option<String>,
    pub species: Option<String>,
    pub herd_name: String,
    pub dau: Option<String>,
    pub gmu: GmuId,
    pub post_hunt_estimate: Option<i64>,
    pub sex_ratio: Option<f64>,
    pub year: i32,
}

/// Natural identity of a production population row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PopulationKey {
    Jurisdiction {
        state: String,
        species: String,
        year: i32,
        gmu: GmuId,
    },
    Herd {
        herd_name: String,
        year: i32,
        gmu: GmuId,
    },
}

impl PopulationRecord {
    /// The smallest key that identifies this measurement: jurisdiction,
    /// species, year and unit when both are known, otherwise herd, year and
    /// unit.
    pub fn key(&self) -> PopulationKey {
        match (&self.state, &self.species) {
            (Some(state), Some(species)) => PopulationKey::Jurisdiction {
                state: state.clone(),
                species: species.clone(),
                year: self.year,
                gmu: self.gmu,
            },
            _ => PopulationKey::Herd {
                herd_name: self.herd_name.clone(),
                year: self.year,
                gmu: self.gmu,
            },
        }
    }
}

/// One harvest row per (unit, year, season) within a state and species.
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestRecord {
    pub state: String,
    pub species: String,
    pub season: String,
    pub unit: GmuId,
    pub year: i32,
    /// Bulls or bucks
    pub adult_male: Option<i64>,
    /// Cows or does
    pub adult_female: Option<i64>,
    /// Calves or fawns
    pub young: Option<i64>,
    pub total_harvest: Option<i64>,
    pub total_hunters: Option<i64>,
    pub percent_success: Option<f64>,
    pub total_rec_days: Option<i64>,
}
