use crate::model::{ShiftCode, ShiftIndex, ShiftType};
use crate::scheduler::PlanError;
use chrono::{Datelike, NaiveDate, Weekday};
#[cfg(feature = "serde")]
use anyhow::{Context, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "serde")]
use std::fs;
#[cfg(feature = "serde")]
use std::path::Path;

/// Configuration globale, partagée en lecture seule pendant tout le calcul.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlanningConfig {
    /// Types de poste, dans l'ordre où ils sont pourvus chaque jour.
    pub shifts: Vec<ShiftType>,
    /// Heures annuelles d'un temps plein (mis à l'échelle par la capacité).
    pub max_hours_year_employee: f64,
    /// Heures hebdomadaires d'un temps plein (mis à l'échelle par la capacité).
    pub max_hours_week_employee: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rules: Rules,
}

impl PlanningConfig {
    pub fn new(shifts: Vec<ShiftType>, max_hours_year: f64, max_hours_week: f64) -> Self {
        Self {
            shifts,
            max_hours_year_employee: max_hours_year,
            max_hours_week_employee: max_hours_week,
            rules: Rules::default(),
        }
    }

    pub fn with_rules(mut self, rules: Rules) -> Self {
        self.rules = rules;
        self
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        if self.shifts.is_empty() {
            return Err(invalid("config must define at least one shift"));
        }
        for (i, shift) in self.shifts.iter().enumerate() {
            if shift.code.as_str().trim().is_empty() {
                return Err(invalid("shift code cannot be empty"));
            }
            if self.shifts[..i].iter().any(|s| s.code == shift.code) {
                return Err(invalid(format!("duplicate shift code {}", shift.code)));
            }
            if !shift.hours.is_finite() || shift.hours <= 0.0 {
                return Err(invalid(format!("hours_per_shift of {} must be > 0", shift.code)));
            }
            if shift.min_persons > shift.max_persons {
                return Err(invalid(format!(
                    "min_persons > max_persons for shift {}",
                    shift.code
                )));
            }
            if let Some(unknown) = shift
                .forbidden_after
                .iter()
                .find(|code| self.shift_index(code).is_none())
            {
                return Err(PlanError::UnknownShift(unknown.as_str().to_string()));
            }
        }
        if !self.max_hours_year_employee.is_finite() || self.max_hours_year_employee <= 0.0 {
            return Err(invalid("max_hours_year_employee must be > 0"));
        }
        if !self.max_hours_week_employee.is_finite() || self.max_hours_week_employee <= 0.0 {
            return Err(invalid("max_hours_week_employee must be > 0"));
        }
        if self.rules.trailing_window_days == 0 {
            return Err(invalid("trailing_window_days must be > 0"));
        }
        Ok(())
    }

    pub fn shift(&self, index: ShiftIndex) -> Option<&ShiftType> {
        self.shifts.get(index.get())
    }

    pub fn shift_index(&self, code: &ShiftCode) -> Option<ShiftIndex> {
        self.shifts
            .iter()
            .position(|s| &s.code == code)
            .map(ShiftIndex::new)
    }

    /// Au moins un enchaînement interdit est déclaré.
    pub fn has_transition_rules(&self) -> bool {
        self.shifts.iter().any(|s| !s.forbidden_after.is_empty())
    }

    pub fn shift_indices(&self) -> Vec<ShiftIndex> {
        (0..self.shifts.len()).map(ShiftIndex::new).collect()
    }
}

fn invalid<S: Into<String>>(msg: S) -> PlanError {
    PlanError::InvalidConfig(msg.into())
}

/// Jours considérés comme week-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WeekendDays {
    #[default]
    SaturdaySunday,
    FridayToSunday,
}

impl WeekendDays {
    pub fn contains(self, date: NaiveDate) -> bool {
        match self {
            WeekendDays::SaturdaySunday => matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
            WeekendDays::FridayToSunday => {
                matches!(date.weekday(), Weekday::Fri | Weekday::Sat | Weekday::Sun)
            }
        }
    }

    pub fn first_day(self) -> Weekday {
        match self {
            WeekendDays::SaturdaySunday => Weekday::Sat,
            WeekendDays::FridayToSunday => Weekday::Fri,
        }
    }

    pub fn starts_on(self, date: NaiveDate) -> bool {
        date.weekday() == self.first_day()
    }
}

/// Règles du moteur. Chaque bloc a des valeurs par défaut (variante canonique).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Rules {
    pub weekend: WeekendDays,
    /// Fenêtre glissante (jours, aujourd'hui inclus) du plafond hebdomadaire.
    pub trailing_window_days: u32,
    pub equity: EquityRules,
    pub ranking: RankingRules,
    pub fallback: FallbackRules,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            weekend: WeekendDays::default(),
            trailing_window_days: 6,
            equity: EquityRules::default(),
            ranking: RankingRules::default(),
            fallback: FallbackRules::default(),
        }
    }
}

/// Sous-conditions du repos forcé de week-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EquityRules {
    pub enabled: bool,
    /// Au moins deux candidats restants.
    pub team_size: bool,
    /// Le jour traité est un jour de week-end.
    pub weekend: bool,
    /// L'employé a pris moins de `max_week_rest_days` jours de repos cette semaine.
    pub week_rest_history: bool,
    pub max_week_rest_days: u32,
    /// L'employé n'a pas plus de jours de repos que de jours travaillés les week-ends du mois.
    pub month_weekend_history: bool,
    /// Pas de second repos forcé dans le mois quand il reste peu de week-ends.
    pub remaining_weekends_backoff: bool,
    pub min_remaining_weekends: u32,
}

impl EquityRules {
    /// Variante simple : taille d'équipe + week-end.
    pub fn count_based() -> Self {
        Self {
            enabled: true,
            team_size: true,
            weekend: true,
            week_rest_history: false,
            max_week_rest_days: 2,
            month_weekend_history: false,
            remaining_weekends_backoff: false,
            min_remaining_weekends: 1,
        }
    }

    /// Variante stricte : toutes les sous-conditions actives.
    pub fn majority_fairness() -> Self {
        Self {
            week_rest_history: true,
            month_weekend_history: true,
            remaining_weekends_backoff: true,
            ..Self::count_based()
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::count_based()
        }
    }
}

impl Default for EquityRules {
    fn default() -> Self {
        Self::count_based()
    }
}

/// Clés de tri des candidats, dans l'ordre de priorité.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RankingRules {
    /// Favorise qui a tenu le même poste la veille.
    pub continuity: bool,
    /// Favorise qui a eu le moins de repos de week-end forcés ce mois.
    pub weekend_rest_balance: bool,
    /// Relègue qui a moins de `min_week_rest_days` jours de repos cette semaine.
    pub week_rest: bool,
    pub min_week_rest_days: u32,
}

impl Default for RankingRules {
    fn default() -> Self {
        Self {
            continuity: true,
            weekend_rest_balance: true,
            week_rest: false,
            min_week_rest_days: 2,
        }
    }
}

/// Passe de rattrapage quand le minimum d'effectif n'est pas atteint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FallbackRules {
    pub enabled: bool,
    /// Marge sur la fenêtre glissante, même poste seulement, plafond temps plein.
    pub window_headroom: bool,
    /// Repos la veille.
    pub rested_yesterday: bool,
    /// Jamais un jour de week-end.
    pub outside_weekend: bool,
    /// Seulement qui a déjà eu un repos de week-end forcé dans le mois.
    pub granted_weekend_rest: bool,
}

impl Default for FallbackRules {
    fn default() -> Self {
        Self {
            enabled: true,
            window_headroom: true,
            rested_yesterday: true,
            outside_weekend: true,
            granted_weekend_rest: true,
        }
    }
}

#[cfg(feature = "serde")]
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> Result<PlanningConfig> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
    let config: PlanningConfig = serde_json::from_slice(&data)
        .with_context(|| format!("parsing config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

#[cfg(feature = "serde")]
pub fn export_config_json<P: AsRef<Path>>(path: P, config: &PlanningConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)?;
    Ok(())
}
