use super::{grid::CalendarGrid, types::PlanError, util, window::RollingWindow};
use crate::config::{EquityRules, WeekendDays};
use crate::model::{CellStatus, ShiftIndex};
use chrono::NaiveDate;
use tracing::trace;

/// Qui a déjà été mis au repos ce week-end, par poste et par employé.
/// Remis à zéro le premier jour de chaque week-end.
#[derive(Debug, Clone)]
pub struct WeekendLedger {
    shift_rested: Vec<bool>,
    employee_forced: Vec<bool>,
}

impl WeekendLedger {
    pub fn new(shifts: usize, employees: usize) -> Self {
        Self {
            shift_rested: vec![false; shifts],
            employee_forced: vec![false; employees],
        }
    }

    pub fn reset(&mut self) {
        self.shift_rested.fill(false);
        self.employee_forced.fill(false);
    }

    pub fn shift_rested(&self, shift: ShiftIndex) -> bool {
        self.shift_rested.get(shift.get()).copied().unwrap_or(false)
    }

    pub fn employee_forced(&self, employee: usize) -> bool {
        self.employee_forced.get(employee).copied().unwrap_or(false)
    }

    fn mark(&mut self, shift: ShiftIndex, employee: usize) {
        if let Some(flag) = self.shift_rested.get_mut(shift.get()) {
            *flag = true;
        }
        if let Some(flag) = self.employee_forced.get_mut(employee) {
            *flag = true;
        }
    }
}

/// Repos forcé appliqué à un employé.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForcedRest {
    pub employee: usize,
    /// Samedi et dimanche concernés (dans l'horizon).
    pub days: Vec<NaiveDate>,
}

/// Force un candidat au repos le week-end pour répartir la charge.
#[derive(Debug, Clone, Copy)]
pub struct EquityFilter<'a> {
    rules: &'a EquityRules,
}

impl<'a> EquityFilter<'a> {
    pub fn new(rules: &'a EquityRules) -> Self {
        Self { rules }
    }

    /// Conditions portant sur la journée et le poste.
    pub fn applies(
        &self,
        weekend: WeekendDays,
        date: NaiveDate,
        candidates: usize,
        shift_already_rested: bool,
    ) -> bool {
        self.rules.enabled
            && !shift_already_rested
            && (!self.rules.team_size || team_size_allows(candidates))
            && (!self.rules.weekend || weekend_allows(weekend, date))
    }

    /// Conditions portant sur l'historique de l'employé.
    pub fn employee_allows(
        &self,
        grid: &CalendarGrid,
        employee: usize,
        date: NaiveDate,
    ) -> Result<bool, PlanError> {
        let window = RollingWindow::new(grid);
        if self.rules.week_rest_history {
            let rested = window.rest_in_current_week(employee, date)?;
            if !week_rest_allows(rested, self.rules.max_week_rest_days) {
                return Ok(false);
            }
        }
        if self.rules.month_weekend_history {
            let worked = window.weekend_work_count(employee, date)?;
            let rested = window.weekend_rest_count(employee, date)?;
            if !month_history_allows(worked, rested) {
                return Ok(false);
            }
        }
        if self.rules.remaining_weekends_backoff {
            let remaining = window.remaining_weekends_in_month(date);
            let granted = grid.monthly(employee, date)?.rest_weekends;
            if !remaining_weekends_allow(remaining, granted, self.rules.min_remaining_weekends) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Choisit le premier candidat (ordre du tri) admissible, le met au repos
    /// samedi et dimanche et le retire de `ranked`.
    pub fn apply(
        &self,
        grid: &mut CalendarGrid,
        ledger: &mut WeekendLedger,
        date: NaiveDate,
        shift: ShiftIndex,
        ranked: &mut Vec<usize>,
    ) -> Result<Option<ForcedRest>, PlanError> {
        if !self.applies(grid.weekend(), date, ranked.len(), ledger.shift_rested(shift)) {
            return Ok(None);
        }
        let days = rest_block(grid, date);
        if days.is_empty() {
            return Ok(None);
        }

        let mut chosen = None;
        for (pos, &employee) in ranked.iter().enumerate() {
            if ledger.employee_forced(employee) {
                continue;
            }
            if self.employee_allows(grid, employee, date)? {
                chosen = Some(pos);
                break;
            }
            trace!(%date, employee, "equity sub-condition keeps candidate working");
        }
        let Some(pos) = chosen else {
            return Ok(None);
        };

        let employee = ranked.remove(pos);
        for day in &days {
            if grid.get_status(employee, *day)?.is_unassigned() {
                grid.set_status(employee, *day, CellStatus::Rest)?;
            }
        }
        grid.record_weekend_rest(employee, date)?;
        ledger.mark(shift, employee);
        Ok(Some(ForcedRest { employee, days }))
    }
}

/// Samedi et dimanche de la semaine, à partir de `date`, dans l'horizon.
fn rest_block(grid: &CalendarGrid, date: NaiveDate) -> Vec<NaiveDate> {
    let (saturday, sunday) = util::saturday_sunday(date);
    [saturday, sunday]
        .into_iter()
        .filter(|d| *d >= date && grid.horizon().contains(*d))
        .collect()
}

/// Plus d'un candidat : il en reste au moins un pour le poste.
pub fn team_size_allows(candidates: usize) -> bool {
    candidates > 1
}

pub fn weekend_allows(weekend: WeekendDays, date: NaiveDate) -> bool {
    weekend.contains(date)
}

pub fn week_rest_allows(rested_this_week: u32, max_week_rest_days: u32) -> bool {
    rested_this_week < max_week_rest_days
}

/// Au moins autant de jours de week-end travaillés que chômés ce mois.
pub fn month_history_allows(weekend_worked: u32, weekend_rested: u32) -> bool {
    weekend_worked >= weekend_rested
}

/// Premier repos du mois toujours accordé ; les suivants seulement s'il reste
/// au moins `min_remaining` week-ends.
pub fn remaining_weekends_allow(remaining: u32, already_granted: u32, min_remaining: u32) -> bool {
    already_granted == 0 || remaining >= min_remaining
}
