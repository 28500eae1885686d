use super::{
    grid::CalendarGrid,
    types::{Eligibility, Ineligibility, PlanError},
    window::RollingWindow,
};
use crate::config::PlanningConfig;
use crate::model::{CellStatus, Member, Roster, ShiftIndex, ShiftType};
use chrono::NaiveDate;

/// Contraintes dures (plafonds horaires, enchaînements interdits) pour
/// (employé, jour, poste). Un échec métier n'est jamais une erreur.
#[derive(Debug, Clone)]
pub struct EligibilityEvaluator<'a> {
    config: &'a PlanningConfig,
    roster: &'a Roster,
    all_shifts: Vec<ShiftIndex>,
}

impl<'a> EligibilityEvaluator<'a> {
    pub fn new(config: &'a PlanningConfig, roster: &'a Roster) -> Self {
        Self {
            config,
            roster,
            all_shifts: config.shift_indices(),
        }
    }

    pub fn evaluate(
        &self,
        grid: &CalendarGrid,
        employee: usize,
        date: NaiveDate,
        shift: ShiftIndex,
    ) -> Result<Eligibility, PlanError> {
        let member = self.member(employee)?;
        let kind = self.shift_type(shift)?;

        let status = grid.get_status(employee, date)?;
        if !status.is_unassigned() {
            return Ok(Eligibility::Ineligible(Ineligibility::CellTaken(status)));
        }

        let worked_hours = self.year_to_date_hours(grid, employee)?;
        if yearly_cap_reached(worked_hours, member.max_hours_year) {
            return Ok(Eligibility::Ineligible(Ineligibility::YearlyCapReached));
        }

        let window = RollingWindow::new(grid);
        let trailing = window.worked_in_trailing_days(
            employee,
            date,
            self.config.rules.trailing_window_days,
            &self.all_shifts,
        )?;
        if weekly_cap_reached(trailing, kind.hours, member.max_hours_week) {
            return Ok(Eligibility::Ineligible(Ineligibility::WeeklyCapReached));
        }

        let yesterday = window.yesterday(employee, date)?;
        if let Some(after) = illegal_transition(self.config, yesterday, kind) {
            return Ok(Eligibility::Ineligible(Ineligibility::IllegalTransition { after }));
        }

        Ok(Eligibility::Eligible)
    }

    /// Prédicat assoupli de la passe de rattrapage : ignore le plafond annuel,
    /// garde l'interdiction d'enchaînement. Par défaut, seul un employé déjà
    /// passé par un repos de week-end forcé ce mois peut être repris.
    pub fn relaxed(
        &self,
        grid: &CalendarGrid,
        employee: usize,
        date: NaiveDate,
        shift: ShiftIndex,
    ) -> Result<bool, PlanError> {
        self.member(employee)?;
        let kind = self.shift_type(shift)?;
        let rules = &self.config.rules.fallback;

        if !grid.get_status(employee, date)?.is_unassigned() {
            return Ok(false);
        }

        let window = RollingWindow::new(grid);
        let yesterday = window.yesterday(employee, date)?;
        if illegal_transition(self.config, yesterday, kind).is_some() {
            return Ok(false);
        }
        if rules.rested_yesterday && !rested_yesterday(yesterday) {
            return Ok(false);
        }
        if rules.outside_weekend && grid.is_weekend(date) {
            return Ok(false);
        }
        if rules.granted_weekend_rest
            && !granted_weekend_rest(grid.monthly(employee, date)?.rest_weekends)
        {
            return Ok(false);
        }
        if rules.window_headroom {
            let same_shift = window.worked_in_trailing_days(
                employee,
                date,
                self.config.rules.trailing_window_days,
                &[shift],
            )?;
            if !window_headroom(same_shift, kind.hours, self.config.max_hours_week_employee) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Heures effectuées depuis le début de l'horizon.
    pub fn year_to_date_hours(&self, grid: &CalendarGrid, employee: usize) -> Result<f64, PlanError> {
        let mut hours = 0.0;
        for (shift, kind) in self.all_shifts.iter().zip(&self.config.shifts) {
            hours += f64::from(grid.worked_total(employee, *shift)?) * kind.hours;
        }
        Ok(hours)
    }

    fn member(&self, employee: usize) -> Result<&'a Member, PlanError> {
        self.roster
            .get(employee)
            .ok_or_else(|| PlanError::UnknownEmployee(format!("#{employee}")))
    }

    fn shift_type(&self, shift: ShiftIndex) -> Result<&'a ShiftType, PlanError> {
        self.config
            .shift(shift)
            .ok_or_else(|| PlanError::UnknownShift(format!("#{}", shift.get())))
    }
}

/// Budget annuel épuisé.
pub fn yearly_cap_reached(worked_hours: f64, max_hours_year: f64) -> bool {
    worked_hours >= max_hours_year
}

/// Le poste du jour ferait atteindre le plafond hebdomadaire (`+ 1` = ce poste).
pub fn weekly_cap_reached(trailing_worked: u32, hours_per_shift: f64, max_hours_week: f64) -> bool {
    f64::from(trailing_worked + 1) * hours_per_shift >= max_hours_week
}

/// Poste tenu la veille et interdit avant `today`, s'il y en a un.
pub fn illegal_transition(
    config: &PlanningConfig,
    yesterday: Option<CellStatus>,
    today: &ShiftType,
) -> Option<ShiftIndex> {
    let previous = yesterday?.working_shift()?;
    let code = &config.shift(previous)?.code;
    today.forbidden_after.contains(code).then_some(previous)
}

/// Marge restante sur la fenêtre, comptée au plafond temps plein.
pub fn window_headroom(same_shift_worked: u32, hours_per_shift: f64, base_week_hours: f64) -> bool {
    f64::from(same_shift_worked + 1) * hours_per_shift < base_week_hours
}

/// Au moins un repos de week-end forcé accordé ce mois.
pub fn granted_weekend_rest(rest_weekends: u32) -> bool {
    rest_weekends > 0
}

/// Repos la veille ; avant l'horizon compte comme repos.
pub fn rested_yesterday(yesterday: Option<CellStatus>) -> bool {
    matches!(yesterday, None | Some(CellStatus::Rest))
}
