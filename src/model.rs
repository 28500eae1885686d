use crate::config::PlanningConfig;
use crate::scheduler::PlanError;
use chrono::{Days, NaiveDate};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifiant fort pour un employé
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EmployeeId(String);

impl EmployeeId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Employé tel que fourni en entrée (capacité = fraction de temps plein).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Employee {
    pub id: EmployeeId,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub name: Option<String>,
    pub capacity: f64,
}

impl Employee {
    pub fn new<S: AsRef<str>>(id: S, capacity: f64) -> Self {
        Self {
            id: EmployeeId::new(id),
            name: None,
            capacity,
        }
    }

    pub fn with_name<N: Into<String>>(mut self, name: N) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Employé avec ses budgets horaires dérivés de la capacité.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Member {
    pub employee: Employee,
    pub max_hours_year: f64,
    pub max_hours_week: f64,
}

/// Roster figé pour toute la durée du calcul.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Roster {
    members: Vec<Member>,
}

impl Roster {
    /// Construit le roster en dérivant `max_hours_year` / `max_hours_week` de la config.
    pub fn new(employees: Vec<Employee>, config: &PlanningConfig) -> Result<Self, PlanError> {
        let mut members: Vec<Member> = Vec::with_capacity(employees.len());
        for employee in employees {
            if !employee.capacity.is_finite() || employee.capacity <= 0.0 {
                return Err(PlanError::InvalidRoster(format!(
                    "capacity of {} must be > 0",
                    employee.id
                )));
            }
            if members.iter().any(|m| m.employee.id == employee.id) {
                return Err(PlanError::InvalidRoster(format!(
                    "duplicate employee id {}",
                    employee.id
                )));
            }
            members.push(Member {
                max_hours_year: config.max_hours_year_employee * employee.capacity,
                max_hours_week: config.max_hours_week_employee * employee.capacity,
                employee,
            });
        }
        Ok(Self { members })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
    pub fn members(&self) -> &[Member] {
        &self.members
    }
    pub fn get(&self, index: usize) -> Option<&Member> {
        self.members.get(index)
    }
    pub fn position(&self, id: &EmployeeId) -> Option<usize> {
        self.members.iter().position(|m| &m.employee.id == id)
    }
    pub fn find(&self, id: &EmployeeId) -> Option<&Member> {
        self.members.iter().find(|m| &m.employee.id == id)
    }
}

/// Code court d'un type de poste (`M`, `T`, `N`...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShiftCode(String);

impl ShiftCode {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShiftCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Type de poste et ses bornes d'effectif.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShiftType {
    pub code: ShiftCode,
    #[cfg_attr(feature = "serde", serde(rename = "hours_per_shift"))]
    pub hours: f64,
    pub min_persons: u32,
    pub max_persons: u32,
    /// Postes qui, tenus la veille, interdisent celui-ci (ex. `M` après `T`).
    ///
    /// Vide par défaut : aucun enchaînement n'est interdit tant que la config
    /// ne le déclare pas. Le planner avertit quand plusieurs postes existent
    /// sans aucune règle.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub forbidden_after: Vec<ShiftCode>,
}

impl ShiftType {
    pub fn new<S: AsRef<str>>(code: S, hours: f64, min_persons: u32, max_persons: u32) -> Self {
        Self {
            code: ShiftCode::new(code),
            hours,
            min_persons,
            max_persons,
            forbidden_after: Vec::new(),
        }
    }

    pub fn forbid_after<S: AsRef<str>>(mut self, code: S) -> Self {
        self.forbidden_after.push(ShiftCode::new(code));
        self
    }
}

/// Position d'un type de poste dans l'ordre configuré.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShiftIndex(usize);

impl ShiftIndex {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }
    pub const fn get(self) -> usize {
        self.0
    }
}

/// État d'une case (employé, jour).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CellStatus {
    #[default]
    Unassigned,
    Working(ShiftIndex),
    Rest,
    Vacation,
}

impl CellStatus {
    pub fn is_unassigned(self) -> bool {
        matches!(self, CellStatus::Unassigned)
    }
    pub fn working_shift(self) -> Option<ShiftIndex> {
        match self {
            CellStatus::Working(shift) => Some(shift),
            _ => None,
        }
    }
    /// Repos ou congés : les deux comptent comme jour non travaillé.
    pub fn is_off(self) -> bool {
        matches!(self, CellStatus::Rest | CellStatus::Vacation)
    }
}

/// Horizon de planification : `days` jours consécutifs à partir de `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Horizon {
    start: NaiveDate,
    days: u32,
}

impl Horizon {
    pub fn new(start: NaiveDate, days: u32) -> Result<Self, PlanError> {
        if days == 0 {
            return Err(PlanError::InvalidHorizon("horizon must cover at least one day"));
        }
        if start.checked_add_days(Days::new(u64::from(days - 1))).is_none() {
            return Err(PlanError::InvalidHorizon("horizon end overflows the calendar"));
        }
        Ok(Self { start, days })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }
    pub fn days(&self) -> u32 {
        self.days
    }
    /// Dernier jour inclus.
    pub fn end(&self) -> NaiveDate {
        self.date_at(self.days as usize - 1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.index_of(date).is_some()
    }

    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        let offset = date.signed_duration_since(self.start).num_days();
        if offset < 0 || offset >= i64::from(self.days) {
            return None;
        }
        Some(offset as usize)
    }

    pub fn date_at(&self, index: usize) -> NaiveDate {
        self.start + Days::new(index as u64)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.days as usize).map(move |i| self.date_at(i))
    }
}

/// Congés par employé, appliqués avant le calcul.
pub type VacationPlan = BTreeMap<EmployeeId, Vec<NaiveDate>>;
