use super::{grid::CalendarGrid, types::PlanError, window::RollingWindow};
use crate::config::RankingRules;
use crate::model::{CellStatus, ShiftIndex};
use chrono::NaiveDate;

/// Ce que le tri sait d'un candidat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateFacts {
    pub employee: usize,
    /// A tenu le même poste la veille.
    pub continues_shift: bool,
    /// Repos de week-end forcés ce mois.
    pub weekend_rests: u32,
    /// Jours de repos depuis lundi.
    pub week_rest_days: u32,
}

/// Clé de tri croissante : la plus petite passe en premier.
pub type RankKey = (bool, u32, bool);

pub fn rank_key(facts: &CandidateFacts, rules: &RankingRules) -> RankKey {
    (
        rules.continuity && !facts.continues_shift,
        if rules.weekend_rest_balance {
            facts.weekend_rests
        } else {
            0
        },
        rules.week_rest && facts.week_rest_days < rules.min_week_rest_days,
    )
}

/// Tri stable : à clé égale, l'ordre d'énumération est conservé.
pub fn rank(candidates: &mut [CandidateFacts], rules: &RankingRules) {
    candidates.sort_by_key(|c| rank_key(c, rules));
}

pub fn candidate_facts(
    grid: &CalendarGrid,
    employee: usize,
    date: NaiveDate,
    shift: ShiftIndex,
) -> Result<CandidateFacts, PlanError> {
    let window = RollingWindow::new(grid);
    Ok(CandidateFacts {
        employee,
        continues_shift: window.yesterday(employee, date)? == Some(CellStatus::Working(shift)),
        weekend_rests: grid.monthly(employee, date)?.rest_weekends,
        week_rest_days: window.rest_in_current_week(employee, date)?,
    })
}
