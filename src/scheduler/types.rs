use crate::model::{CellStatus, ShiftIndex};
use chrono::NaiveDate;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Erreurs structurelles : bug d'intégration, jamais un résultat métier.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("date {0} is outside the planning horizon")]
    DateOutOfHorizon(NaiveDate),
    #[error("unknown employee: {0}")]
    UnknownEmployee(String),
    #[error("unknown shift: {0}")]
    UnknownShift(String),
    #[error("cell already assigned for employee {employee} on {date}")]
    AlreadyAssigned { employee: String, date: NaiveDate },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid roster: {0}")]
    InvalidRoster(String),
    #[error("invalid horizon: {0}")]
    InvalidHorizon(&'static str),
    #[error("inconsistent plan data: {0}")]
    InconsistentPlan(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Verdict d'éligibilité pour (employé, jour, poste).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Ineligible(Ineligibility),
}

impl Eligibility {
    pub fn is_eligible(self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    /// Case déjà posée (poste, repos ou congés).
    CellTaken(CellStatus),
    YearlyCapReached,
    WeeklyCapReached,
    /// Poste de la veille incompatible avec celui du jour.
    IllegalTransition { after: ShiftIndex },
}

/// Compteurs d'un calcul complet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunStats {
    pub assignments: u32,
    pub fallback_assignments: u32,
    pub forced_rests: u32,
    /// Couples (jour, poste) terminés sous `min_persons`.
    pub understaffed: u32,
}
