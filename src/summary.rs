use crate::model::{CellStatus, EmployeeId, ShiftCode};
use crate::scheduler::{Plan, PlanError};
use chrono::{Datelike, NaiveDate};

/// Bilan annuel d'un employé : heures effectuées contre budget.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeSummary {
    pub employee: EmployeeId,
    pub worked_shifts: u32,
    pub worked_hours: f64,
    pub budget_hours: f64,
    /// Budget moins heures effectuées ; négatif en cas de dépassement.
    pub difference: f64,
    pub weekend_days_worked: u32,
    pub rest_days: u32,
    pub vacation_days: u32,
}

/// Poste resté sous son effectif minimum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffingGap {
    pub date: NaiveDate,
    pub shift: ShiftCode,
    pub assigned: u32,
    pub min_persons: u32,
}

/// Effectif total d'une journée, tous postes confondus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub working: u32,
    pub min_persons: u32,
}

impl DailyTotal {
    pub fn is_understaffed(&self) -> bool {
        self.working < self.min_persons
    }
}

/// Heures d'un employé sur un mois.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyHours {
    pub employee: EmployeeId,
    pub worked_shifts: u32,
    pub worked_hours: f64,
}

/// Bilan d'un mois civil, limité aux jours couverts par l'horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthSummary {
    pub year: i32,
    pub month: u32,
    /// Dans l'ordre du roster.
    pub employees: Vec<MonthlyHours>,
    pub daily: Vec<DailyTotal>,
}

impl MonthSummary {
    pub fn total_shifts(&self) -> u32 {
        self.employees.iter().map(|e| e.worked_shifts).sum()
    }

    pub fn total_hours(&self) -> f64 {
        self.employees.iter().map(|e| e.worked_hours).sum()
    }

    pub fn understaffed_days(&self) -> usize {
        self.daily.iter().filter(|d| d.is_understaffed()).count()
    }
}

pub fn summarize(plan: &Plan) -> Result<Vec<EmployeeSummary>, PlanError> {
    let grid = plan.grid();
    let shifts = &plan.config().shifts;
    let mut out: Vec<EmployeeSummary> = plan
        .roster()
        .members()
        .iter()
        .map(|m| EmployeeSummary {
            employee: m.employee.id.clone(),
            worked_shifts: 0,
            worked_hours: 0.0,
            budget_hours: m.max_hours_year,
            difference: 0.0,
            weekend_days_worked: 0,
            rest_days: 0,
            vacation_days: 0,
        })
        .collect();

    for date in plan.horizon().dates() {
        let weekend = grid.is_weekend(date);
        for (summary, status) in out.iter_mut().zip(grid.day(date)?) {
            match status {
                CellStatus::Working(shift) => {
                    summary.worked_shifts += 1;
                    summary.worked_hours += shifts.get(shift.get()).map_or(0.0, |s| s.hours);
                    if weekend {
                        summary.weekend_days_worked += 1;
                    }
                }
                CellStatus::Rest => summary.rest_days += 1,
                CellStatus::Vacation => summary.vacation_days += 1,
                CellStatus::Unassigned => {}
            }
        }
    }

    for summary in &mut out {
        summary.difference = summary.budget_hours - summary.worked_hours;
    }
    Ok(out)
}

pub fn staffing_gaps(plan: &Plan) -> Result<Vec<StaffingGap>, PlanError> {
    let mut out = Vec::new();
    for date in plan.horizon().dates() {
        let config = plan.config();
        for (shift, kind) in config.shift_indices().into_iter().zip(&config.shifts) {
            let assigned = plan.grid().get_shift_count(date, shift)?;
            if assigned < kind.min_persons {
                out.push(StaffingGap {
                    date,
                    shift: kind.code.clone(),
                    assigned,
                    min_persons: kind.min_persons,
                });
            }
        }
    }
    Ok(out)
}

pub fn daily_totals(plan: &Plan) -> Result<Vec<DailyTotal>, PlanError> {
    let min_persons: u32 = plan.config().shifts.iter().map(|s| s.min_persons).sum();
    plan.horizon()
        .dates()
        .map(|date| {
            let working = plan
                .grid()
                .day(date)?
                .iter()
                .filter(|s| s.working_shift().is_some())
                .count() as u32;
            Ok::<_, PlanError>(DailyTotal {
                date,
                working,
                min_persons,
            })
        })
        .collect()
}

/// Découpe le plan par mois civil : heures par employé et effectif par jour.
pub fn monthly_summary(plan: &Plan) -> Result<Vec<MonthSummary>, PlanError> {
    let shifts = &plan.config().shifts;
    let mut out: Vec<MonthSummary> = Vec::new();
    for total in daily_totals(plan)? {
        let (year, month) = (total.date.year(), total.date.month());
        if out.last().map_or(true, |m| (m.year, m.month) != (year, month)) {
            out.push(MonthSummary {
                year,
                month,
                employees: plan
                    .roster()
                    .members()
                    .iter()
                    .map(|m| MonthlyHours {
                        employee: m.employee.id.clone(),
                        worked_shifts: 0,
                        worked_hours: 0.0,
                    })
                    .collect(),
                daily: Vec::new(),
            });
        }
        let last = out.len() - 1;
        let current = &mut out[last];
        for (hours, status) in current.employees.iter_mut().zip(plan.grid().day(total.date)?) {
            if let Some(shift) = status.working_shift() {
                hours.worked_shifts += 1;
                hours.worked_hours += shifts.get(shift.get()).map_or(0.0, |s| s.hours);
            }
        }
        current.daily.push(total);
    }
    Ok(out)
}
