use super::{types::PlanError, util};
use crate::config::WeekendDays;
use crate::model::{CellStatus, EmployeeId, Horizon, Roster, ShiftIndex};
use chrono::NaiveDate;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Compteurs mensuels d'un employé, uniquement incrémentés par le filtre d'équité.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MonthlyAggregate {
    pub rest_weekends: u32,
}

/// Grille (employé, jour) -> état, et (jour, poste) -> effectif.
///
/// Les employés et postes sont désignés par leur position dans le roster
/// et dans la config.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalendarGrid {
    horizon: Horizon,
    weekend: WeekendDays,
    employees: Vec<EmployeeId>,
    shifts: usize,
    /// Indexé par `jour * employés + employé`.
    cells: Vec<CellStatus>,
    /// Indexé par `jour * postes + poste`.
    counts: Vec<u32>,
    /// Cumul depuis le début, indexé par `employé * postes + poste`.
    worked: Vec<u32>,
    first_month: i64,
    /// Indexé par `mois * employés + employé`.
    monthly: Vec<MonthlyAggregate>,
}

impl CalendarGrid {
    pub fn new(horizon: Horizon, roster: &Roster, shifts: usize, weekend: WeekendDays) -> Self {
        let employees: Vec<EmployeeId> = roster
            .members()
            .iter()
            .map(|m| m.employee.id.clone())
            .collect();
        let days = horizon.days() as usize;
        let first_month = util::month_ordinal(horizon.start());
        let months = (util::month_ordinal(horizon.end()) - first_month + 1) as usize;
        Self {
            cells: vec![CellStatus::Unassigned; days * employees.len()],
            counts: vec![0; days * shifts],
            worked: vec![0; employees.len() * shifts],
            monthly: vec![MonthlyAggregate::default(); months * employees.len()],
            horizon,
            weekend,
            employees,
            shifts,
            first_month,
        }
    }

    pub fn horizon(&self) -> &Horizon {
        &self.horizon
    }
    pub fn weekend(&self) -> WeekendDays {
        self.weekend
    }
    pub fn employee_count(&self) -> usize {
        self.employees.len()
    }
    pub fn shift_type_count(&self) -> usize {
        self.shifts
    }
    pub fn employee_id(&self, employee: usize) -> Option<&EmployeeId> {
        self.employees.get(employee)
    }

    pub fn get_status(&self, employee: usize, date: NaiveDate) -> Result<CellStatus, PlanError> {
        let idx = self.cell_index(employee, date)?;
        Ok(self.cells[idx])
    }

    /// Pose l'état d'une case encore `Unassigned`.
    pub fn set_status(
        &mut self,
        employee: usize,
        date: NaiveDate,
        status: CellStatus,
    ) -> Result<(), PlanError> {
        let idx = self.cell_index(employee, date)?;
        if !self.cells[idx].is_unassigned() {
            return Err(self.already_assigned(employee, date));
        }
        if let CellStatus::Working(shift) = status {
            self.check_shift(shift)?;
            self.worked[employee * self.shifts + shift.get()] += 1;
        }
        self.cells[idx] = status;
        Ok(())
    }

    /// Pose des congés avant le calcul ; seule une case travaillée est refusée.
    pub fn seed_vacation(&mut self, employee: usize, date: NaiveDate) -> Result<(), PlanError> {
        let idx = self.cell_index(employee, date)?;
        if self.cells[idx].working_shift().is_some() {
            return Err(self.already_assigned(employee, date));
        }
        self.cells[idx] = CellStatus::Vacation;
        Ok(())
    }

    pub fn increment_shift_count(
        &mut self,
        date: NaiveDate,
        shift: ShiftIndex,
    ) -> Result<u32, PlanError> {
        let idx = self.count_index(date, shift)?;
        self.counts[idx] += 1;
        Ok(self.counts[idx])
    }

    pub fn get_shift_count(&self, date: NaiveDate, shift: ShiftIndex) -> Result<u32, PlanError> {
        let idx = self.count_index(date, shift)?;
        Ok(self.counts[idx])
    }

    pub fn is_weekend(&self, date: NaiveDate) -> bool {
        self.weekend.contains(date)
    }

    /// Passe en `Rest` toutes les cases encore vides du jour ; renvoie leur nombre.
    pub fn finalize_day(&mut self, date: NaiveDate) -> Result<u32, PlanError> {
        let day = self.day_index(date)?;
        let n = self.employees.len();
        let mut rested = 0;
        for cell in &mut self.cells[day * n..(day + 1) * n] {
            if cell.is_unassigned() {
                *cell = CellStatus::Rest;
                rested += 1;
            }
        }
        Ok(rested)
    }

    /// États de tous les employés pour un jour, dans l'ordre du roster.
    pub fn day(&self, date: NaiveDate) -> Result<&[CellStatus], PlanError> {
        let day = self.day_index(date)?;
        let n = self.employees.len();
        Ok(&self.cells[day * n..(day + 1) * n])
    }

    /// Nombre de postes `shift` tenus par l'employé depuis le début de l'horizon.
    pub fn worked_total(&self, employee: usize, shift: ShiftIndex) -> Result<u32, PlanError> {
        self.check_employee(employee)?;
        self.check_shift(shift)?;
        Ok(self.worked[employee * self.shifts + shift.get()])
    }

    pub fn monthly(&self, employee: usize, date: NaiveDate) -> Result<MonthlyAggregate, PlanError> {
        let idx = self.month_index(employee, date)?;
        Ok(self.monthly[idx])
    }

    pub(crate) fn record_weekend_rest(
        &mut self,
        employee: usize,
        date: NaiveDate,
    ) -> Result<u32, PlanError> {
        let idx = self.month_index(employee, date)?;
        self.monthly[idx].rest_weekends += 1;
        Ok(self.monthly[idx].rest_weekends)
    }

    /// Vérifie la cohérence d'une grille relue depuis un fichier : horizon valide,
    /// tailles des tableaux et indices de postes.
    pub fn validate(&self) -> Result<(), PlanError> {
        let horizon = Horizon::new(self.horizon.start(), self.horizon.days())?;
        let days = horizon.days() as usize;
        let employees = self.employees.len();
        let first_month = util::month_ordinal(horizon.start());
        let months = (util::month_ordinal(horizon.end()) - first_month + 1) as usize;

        if self.first_month != first_month {
            return Err(inconsistent(format!(
                "first_month is {}, horizon starts in {}",
                self.first_month, first_month
            )));
        }
        for (name, actual, expected) in [
            ("cells", self.cells.len(), days * employees),
            ("counts", self.counts.len(), days * self.shifts),
            ("worked", self.worked.len(), employees * self.shifts),
            ("monthly", self.monthly.len(), months * employees),
        ] {
            if actual != expected {
                return Err(inconsistent(format!(
                    "{name} has {actual} entries, expected {expected}"
                )));
            }
        }
        if let Some(shift) = self
            .cells
            .iter()
            .filter_map(|c| c.working_shift())
            .find(|s| s.get() >= self.shifts)
        {
            return Err(PlanError::UnknownShift(format!("#{}", shift.get())));
        }
        Ok(())
    }

    /// Accès direct par indice de jour, bornes déjà vérifiées par l'appelant.
    pub(super) fn status_at(&self, employee: usize, day: usize) -> CellStatus {
        self.cells[day * self.employees.len() + employee]
    }

    pub(super) fn day_index(&self, date: NaiveDate) -> Result<usize, PlanError> {
        self.horizon
            .index_of(date)
            .ok_or(PlanError::DateOutOfHorizon(date))
    }

    pub(super) fn check_employee(&self, employee: usize) -> Result<(), PlanError> {
        if employee >= self.employees.len() {
            return Err(PlanError::UnknownEmployee(format!("#{employee}")));
        }
        Ok(())
    }

    fn check_shift(&self, shift: ShiftIndex) -> Result<(), PlanError> {
        if shift.get() >= self.shifts {
            return Err(PlanError::UnknownShift(format!("#{}", shift.get())));
        }
        Ok(())
    }

    fn cell_index(&self, employee: usize, date: NaiveDate) -> Result<usize, PlanError> {
        self.check_employee(employee)?;
        let day = self.day_index(date)?;
        Ok(day * self.employees.len() + employee)
    }

    fn count_index(&self, date: NaiveDate, shift: ShiftIndex) -> Result<usize, PlanError> {
        self.check_shift(shift)?;
        let day = self.day_index(date)?;
        Ok(day * self.shifts + shift.get())
    }

    fn month_index(&self, employee: usize, date: NaiveDate) -> Result<usize, PlanError> {
        self.check_employee(employee)?;
        self.day_index(date)?;
        let month = (util::month_ordinal(date) - self.first_month) as usize;
        Ok(month * self.employees.len() + employee)
    }

    fn already_assigned(&self, employee: usize, date: NaiveDate) -> PlanError {
        PlanError::AlreadyAssigned {
            employee: self
                .employees
                .get(employee)
                .map(|id| id.as_str().to_string())
                .unwrap_or_default(),
            date,
        }
    }
}

fn inconsistent(msg: String) -> PlanError {
    PlanError::InconsistentPlan(msg)
}
