mod assignment;
mod eligibility;
mod equity;
mod grid;
mod ranking;
mod types;
mod util;
mod window;

pub use assignment::{AssignmentOutcome, ShiftAssigner};
pub use eligibility::{
    granted_weekend_rest, illegal_transition, rested_yesterday, weekly_cap_reached,
    window_headroom, yearly_cap_reached, EligibilityEvaluator,
};
pub use equity::{
    month_history_allows, remaining_weekends_allow, team_size_allows, week_rest_allows,
    weekend_allows, EquityFilter, ForcedRest, WeekendLedger,
};
pub use grid::{CalendarGrid, MonthlyAggregate};
pub use ranking::{candidate_facts, rank, rank_key, CandidateFacts, RankKey};
pub use types::{Eligibility, Ineligibility, PlanError, RunStats};
pub use window::RollingWindow;

use crate::config::PlanningConfig;
use crate::model::{CellStatus, EmployeeId, Horizon, Roster, ShiftCode, ShiftIndex, VacationPlan};
use chrono::NaiveDate;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

/// Planner : parcourt l'horizon jour par jour et fige chaque décision.
///
/// La grille n'appartient qu'au planner pendant le calcul ; `run` la consomme
/// et rend un [`Plan`] en lecture seule.
#[derive(Debug)]
pub struct Planner<'a> {
    config: &'a PlanningConfig,
    roster: &'a Roster,
    grid: CalendarGrid,
}

impl<'a> Planner<'a> {
    pub fn new(
        config: &'a PlanningConfig,
        roster: &'a Roster,
        horizon: Horizon,
    ) -> Result<Self, PlanError> {
        config.validate()?;
        let grid = CalendarGrid::new(horizon, roster, config.shifts.len(), config.rules.weekend);
        Ok(Self {
            config,
            roster,
            grid,
        })
    }

    pub fn grid(&self) -> &CalendarGrid {
        &self.grid
    }

    pub fn seed_vacation(&mut self, employee: &EmployeeId, date: NaiveDate) -> Result<(), PlanError> {
        let index = self.employee_index(employee)?;
        self.grid.seed_vacation(index, date)
    }

    /// Applique un plan de congés ; les jours hors horizon sont ignorés.
    pub fn seed_vacations(&mut self, vacations: &VacationPlan) -> Result<usize, PlanError> {
        let mut seeded = 0;
        for (id, dates) in vacations {
            let index = self.employee_index(id)?;
            for date in dates {
                if !self.grid.horizon().contains(*date) {
                    trace!(employee = %id, %date, "vacation outside horizon ignored");
                    continue;
                }
                self.grid.seed_vacation(index, *date)?;
                seeded += 1;
            }
        }
        Ok(seeded)
    }

    /// Calcule tout l'horizon dans l'ordre chronologique.
    pub fn run(mut self) -> Result<Plan, PlanError> {
        let config = self.config;
        let evaluator = EligibilityEvaluator::new(config, self.roster);
        let day_loop = DayLoop {
            config,
            evaluator: &evaluator,
            equity: EquityFilter::new(&config.rules.equity),
            assigner: ShiftAssigner::new(config, &evaluator),
        };
        let shifts = config.shift_indices();
        let mut ledger = WeekendLedger::new(shifts.len(), self.roster.len());
        let mut stats = RunStats::default();
        let horizon = *self.grid.horizon();

        info!(
            start = %horizon.start(),
            days = horizon.days(),
            employees = self.roster.len(),
            shifts = shifts.len(),
            "planning run started"
        );
        if shifts.len() > 1 && !config.has_transition_rules() {
            warn!(
                shifts = shifts.len(),
                "no forbidden transitions configured, any shift may follow any other"
            );
        }

        for date in horizon.dates() {
            if config.rules.weekend.starts_on(date) {
                ledger.reset();
            }
            for &shift in &shifts {
                day_loop.plan_shift(&mut self.grid, &mut ledger, &mut stats, date, shift)?;
            }
            let rested = self.grid.finalize_day(date)?;
            trace!(%date, rested, "day finalized");
        }

        info!(
            assignments = stats.assignments,
            fallback = stats.fallback_assignments,
            forced_rests = stats.forced_rests,
            understaffed = stats.understaffed,
            "planning run finished"
        );

        Ok(Plan {
            config: config.clone(),
            roster: self.roster.clone(),
            grid: self.grid,
            stats,
        })
    }

    fn employee_index(&self, employee: &EmployeeId) -> Result<usize, PlanError> {
        self.roster
            .position(employee)
            .ok_or_else(|| PlanError::UnknownEmployee(employee.as_str().to_string()))
    }
}

struct DayLoop<'a> {
    config: &'a PlanningConfig,
    evaluator: &'a EligibilityEvaluator<'a>,
    equity: EquityFilter<'a>,
    assigner: ShiftAssigner<'a>,
}

impl DayLoop<'_> {
    fn plan_shift(
        &self,
        grid: &mut CalendarGrid,
        ledger: &mut WeekendLedger,
        stats: &mut RunStats,
        date: NaiveDate,
        shift: ShiftIndex,
    ) -> Result<(), PlanError> {
        let kind = self
            .config
            .shift(shift)
            .ok_or_else(|| PlanError::UnknownShift(format!("#{}", shift.get())))?;
        if grid.get_shift_count(date, shift)? >= kind.max_persons {
            trace!(%date, shift = %kind.code, "shift already full");
            return Ok(());
        }

        let mut candidates = Vec::new();
        for employee in 0..grid.employee_count() {
            match self.evaluator.evaluate(grid, employee, date, shift)? {
                Eligibility::Eligible => {
                    candidates.push(candidate_facts(grid, employee, date, shift)?);
                }
                Eligibility::Ineligible(Ineligibility::CellTaken(_)) => {}
                Eligibility::Ineligible(reason) => {
                    trace!(%date, shift = %kind.code, employee, ?reason, "ineligible");
                }
            }
        }
        rank(&mut candidates, &self.config.rules.ranking);
        let mut ranked: Vec<usize> = candidates.iter().map(|c| c.employee).collect();

        if let Some(forced) = self.equity.apply(grid, ledger, date, shift, &mut ranked)? {
            stats.forced_rests += 1;
            debug!(
                %date,
                shift = %kind.code,
                employee = %display_id(grid, forced.employee),
                "forced weekend rest"
            );
        }

        let outcome = self.assigner.assign(grid, date, shift, &ranked)?;
        stats.assignments += outcome.primary + outcome.fallback;
        stats.fallback_assignments += outcome.fallback;
        if outcome.understaffed {
            stats.understaffed += 1;
            warn!(
                %date,
                shift = %kind.code,
                assigned = outcome.count,
                min = kind.min_persons,
                "shift understaffed"
            );
        }
        Ok(())
    }
}

fn display_id(grid: &CalendarGrid, employee: usize) -> &str {
    grid.employee_id(employee).map(EmployeeId::as_str).unwrap_or("?")
}

/// Résultat figé d'un calcul : config, roster et grille finale.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Plan {
    config: PlanningConfig,
    roster: Roster,
    grid: CalendarGrid,
    stats: RunStats,
}

impl Plan {
    pub fn config(&self) -> &PlanningConfig {
        &self.config
    }
    pub fn roster(&self) -> &Roster {
        &self.roster
    }
    pub fn grid(&self) -> &CalendarGrid {
        &self.grid
    }
    pub fn stats(&self) -> RunStats {
        self.stats
    }
    pub fn horizon(&self) -> &Horizon {
        self.grid.horizon()
    }

    /// Contrôle un plan relu : config valide, grille cohérente et alignée sur
    /// le roster et les postes.
    pub fn validate(&self) -> Result<(), PlanError> {
        self.config.validate()?;
        self.grid.validate()?;
        if self.grid.shift_type_count() != self.config.shifts.len() {
            return Err(PlanError::InconsistentPlan(format!(
                "grid has {} shift type(s), config has {}",
                self.grid.shift_type_count(),
                self.config.shifts.len()
            )));
        }
        if self.grid.employee_count() != self.roster.len() {
            return Err(PlanError::InconsistentPlan(format!(
                "grid has {} employee(s), roster has {}",
                self.grid.employee_count(),
                self.roster.len()
            )));
        }
        for (index, member) in self.roster.members().iter().enumerate() {
            if self.grid.employee_id(index) != Some(&member.employee.id) {
                return Err(PlanError::InconsistentPlan(format!(
                    "employee {} is not at position {index} of the grid",
                    member.employee.id
                )));
            }
        }
        Ok(())
    }

    pub fn status(&self, employee: &EmployeeId, date: NaiveDate) -> Result<CellStatus, PlanError> {
        let index = self
            .roster
            .position(employee)
            .ok_or_else(|| PlanError::UnknownEmployee(employee.as_str().to_string()))?;
        self.grid.get_status(index, date)
    }

    pub fn shift_count(&self, date: NaiveDate, code: &ShiftCode) -> Result<u32, PlanError> {
        let shift = self
            .config
            .shift_index(code)
            .ok_or_else(|| PlanError::UnknownShift(code.as_str().to_string()))?;
        self.grid.get_shift_count(date, shift)
    }

    /// Libellé court d'une case : code du poste, `-` repos, `V` congés.
    pub fn label(&self, status: CellStatus) -> &str {
        match status {
            CellStatus::Working(shift) => self
                .config
                .shift(shift)
                .map(|s| s.code.as_str())
                .unwrap_or("?"),
            CellStatus::Rest => "-",
            CellStatus::Vacation => "V",
            CellStatus::Unassigned => "",
        }
    }
}
