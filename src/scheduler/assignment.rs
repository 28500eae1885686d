use super::{eligibility::EligibilityEvaluator, grid::CalendarGrid, types::PlanError};
use crate::config::PlanningConfig;
use crate::model::{CellStatus, ShiftIndex};
use chrono::NaiveDate;
use tracing::trace;

/// Résultat des deux passes pour un (jour, poste).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentOutcome {
    pub primary: u32,
    pub fallback: u32,
    /// Effectif final du poste.
    pub count: u32,
    pub understaffed: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ShiftAssigner<'a> {
    config: &'a PlanningConfig,
    evaluator: &'a EligibilityEvaluator<'a>,
}

impl<'a> ShiftAssigner<'a> {
    pub fn new(config: &'a PlanningConfig, evaluator: &'a EligibilityEvaluator<'a>) -> Self {
        Self { config, evaluator }
    }

    /// Pourvoit le poste avec les candidats classés jusqu'à `max_persons`,
    /// puis rattrape jusqu'à `min_persons` si besoin.
    pub fn assign(
        &self,
        grid: &mut CalendarGrid,
        date: NaiveDate,
        shift: ShiftIndex,
        ranked: &[usize],
    ) -> Result<AssignmentOutcome, PlanError> {
        let kind = self
            .config
            .shift(shift)
            .ok_or_else(|| PlanError::UnknownShift(format!("#{}", shift.get())))?;

        let mut count = grid.get_shift_count(date, shift)?;
        let mut primary = 0;
        for &employee in ranked {
            if count >= kind.max_persons {
                break;
            }
            count = commit(grid, employee, date, shift)?;
            primary += 1;
        }

        let mut fallback = 0;
        if count < kind.min_persons && self.config.rules.fallback.enabled {
            for employee in 0..grid.employee_count() {
                if count >= kind.min_persons || count >= kind.max_persons {
                    break;
                }
                if !self.evaluator.relaxed(grid, employee, date, shift)? {
                    continue;
                }
                count = commit(grid, employee, date, shift)?;
                fallback += 1;
                trace!(%date, shift = %kind.code, employee, "fallback assignment");
            }
        }

        Ok(AssignmentOutcome {
            primary,
            fallback,
            count,
            understaffed: count < kind.min_persons,
        })
    }
}

fn commit(
    grid: &mut CalendarGrid,
    employee: usize,
    date: NaiveDate,
    shift: ShiftIndex,
) -> Result<u32, PlanError> {
    grid.set_status(employee, date, CellStatus::Working(shift))?;
    grid.increment_shift_count(date, shift)
}
