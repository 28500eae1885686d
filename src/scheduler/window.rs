use super::{grid::CalendarGrid, types::PlanError, util};
use crate::model::{CellStatus, ShiftIndex};
use chrono::NaiveDate;

/// Vues glissantes sur la grille, recalculées à chaque appel.
///
/// Chaque requête parcourt au plus une fenêtre ou un mois, jamais l'année entière ;
/// le cumul annuel vient des totaux tenus par la grille.
#[derive(Debug, Clone, Copy)]
pub struct RollingWindow<'a> {
    grid: &'a CalendarGrid,
}

impl<'a> RollingWindow<'a> {
    pub fn new(grid: &'a CalendarGrid) -> Self {
        Self { grid }
    }

    /// Postes tenus (parmi `shifts`) sur `[date - window + 1, date]`.
    pub fn worked_in_trailing_days(
        &self,
        employee: usize,
        date: NaiveDate,
        window: u32,
        shifts: &[ShiftIndex],
    ) -> Result<u32, PlanError> {
        self.grid.check_employee(employee)?;
        let day = self.grid.day_index(date)?;
        if window == 0 {
            return Ok(0);
        }
        let first = day.saturating_sub(window as usize - 1);
        let worked = (first..=day)
            .filter_map(|d| self.grid.status_at(employee, d).working_shift())
            .filter(|shift| shifts.contains(shift))
            .count();
        Ok(worked as u32)
    }

    /// Jours de repos ou de congés depuis le lundi (borné au début de l'horizon).
    pub fn rest_in_current_week(&self, employee: usize, date: NaiveDate) -> Result<u32, PlanError> {
        self.grid.check_employee(employee)?;
        let day = self.grid.day_index(date)?;
        let first = self
            .grid
            .horizon()
            .index_of(util::monday_of(date))
            .unwrap_or(0);
        let rested = (first..=day)
            .filter(|&d| self.grid.status_at(employee, d).is_off())
            .count();
        Ok(rested as u32)
    }

    /// Jours de week-end de repos (ou congés) dans le mois de `month`.
    pub fn weekend_rest_count(&self, employee: usize, month: NaiveDate) -> Result<u32, PlanError> {
        Ok(self
            .weekend_cells(employee, month)?
            .filter(|status| status.is_off())
            .count() as u32)
    }

    /// Jours de week-end travaillés dans le mois de `month`.
    pub fn weekend_work_count(&self, employee: usize, month: NaiveDate) -> Result<u32, PlanError> {
        Ok(self
            .weekend_cells(employee, month)?
            .filter(|status| status.working_shift().is_some())
            .count() as u32)
    }

    /// Week-ends commençant strictement après `date` et finissant dans le même mois.
    pub fn remaining_weekends_in_month(&self, date: NaiveDate) -> u32 {
        let (_, last) = util::month_span(date);
        let weekend = self.grid.weekend();
        date.iter_days()
            .skip(1)
            .take_while(|d| *d <= last)
            .filter(|d| weekend.starts_on(*d) && util::saturday_sunday(*d).1 <= last)
            .count() as u32
    }

    pub fn year_to_date_worked(
        &self,
        employee: usize,
        shifts: &[ShiftIndex],
    ) -> Result<u32, PlanError> {
        let mut total = 0;
        for shift in shifts {
            total += self.grid.worked_total(employee, *shift)?;
        }
        Ok(total)
    }

    /// État de la veille, `None` le premier jour de l'horizon.
    pub fn yesterday(&self, employee: usize, date: NaiveDate) -> Result<Option<CellStatus>, PlanError> {
        self.grid.check_employee(employee)?;
        let day = self.grid.day_index(date)?;
        Ok(day.checked_sub(1).map(|d| self.grid.status_at(employee, d)))
    }

    fn weekend_cells(
        &self,
        employee: usize,
        month: NaiveDate,
    ) -> Result<impl Iterator<Item = CellStatus> + 'a, PlanError> {
        self.grid.check_employee(employee)?;
        let grid = self.grid;
        let horizon = *grid.horizon();
        let weekend = grid.weekend();
        let (first, last) = util::month_span(month);
        Ok(first
            .iter_days()
            .take_while(move |d| *d <= last)
            .filter(move |d| weekend.contains(*d))
            .filter_map(move |d| horizon.index_of(d))
            .map(move |day| grid.status_at(employee, day)))
    }
}
