use crate::model::{Employee, EmployeeId, VacationPlan};
use crate::scheduler::Plan;
use crate::summary::{EmployeeSummary, MonthSummary, StaffingGap};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::Path;

/// Import des employés depuis CSV : header `id,capacity[,name]`
pub fn import_employees_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Employee>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let id = rec.get(0).context("missing id")?.trim();
        let capacity = rec.get(1).context("missing capacity")?.trim();
        if id.is_empty() {
            bail!("invalid employee row (empty id)");
        }
        let capacity: f64 = capacity
            .parse()
            .with_context(|| format!("invalid capacity for employee {id}"))?;
        let mut employee = Employee::new(id, capacity);
        if let Some(name) = rec.get(2).map(str::trim).filter(|n| !n.is_empty()) {
            employee = employee.with_name(name);
        }
        out.push(employee);
    }
    Ok(out)
}

/// Import des congés : header `employee,dates`, `dates` = `YYYY-MM-DD` ou
/// `YYYY-MM-DD..YYYY-MM-DD` séparés par `;`. Plusieurs lignes par employé possibles.
pub fn import_vacations_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<VacationPlan> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = VacationPlan::new();
    for rec in rdr.records() {
        let rec = rec?;
        let employee = rec.get(0).context("missing employee")?.trim();
        let dates = rec.get(1).context("missing dates")?.trim();
        if employee.is_empty() {
            bail!("invalid vacation row (empty employee)");
        }
        let days = parse_vacation_days(dates)
            .with_context(|| format!("invalid vacations value for employee {employee}"))?;
        out.entry(EmployeeId::new(employee)).or_default().extend(days);
    }
    for days in out.values_mut() {
        days.sort();
        days.dedup();
    }
    Ok(out)
}

fn parse_vacation_days(raw: &str) -> anyhow::Result<Vec<NaiveDate>> {
    let mut out = Vec::new();
    for chunk in raw.split(';').map(str::trim).filter(|c| !c.is_empty()) {
        if let Some((start_raw, end_raw)) = chunk.split_once("..") {
            let start = parse_day(start_raw.trim())?;
            let end = parse_day(end_raw.trim())?;
            if end < start {
                bail!("vacation range end before start: {chunk}");
            }
            out.extend(start.iter_days().take_while(|d| *d <= end));
        } else {
            out.push(parse_day(chunk)?);
        }
    }
    Ok(out)
}

fn parse_day(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("invalid date: {raw}"))
}

/// Export JSON du plan (jolie mise en forme)
pub fn export_plan_json<P: AsRef<Path>>(path: P, plan: &Plan) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(plan)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV de la grille : header `date,<employés...>`, une ligne par jour.
pub fn export_grid_csv<P: AsRef<Path>>(path: P, plan: &Plan) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    write_grid(&mut w, plan)?;
    w.flush()?;
    Ok(())
}

/// Même contenu que [`export_grid_csv`], en mémoire.
pub fn grid_to_csv_string(plan: &Plan) -> anyhow::Result<String> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(Vec::new());
    write_grid(&mut w, plan)?;
    let bytes = w
        .into_inner()
        .map_err(|err| anyhow::anyhow!("flushing csv buffer: {err}"))?;
    Ok(String::from_utf8(bytes)?)
}

fn write_grid<W: std::io::Write>(w: &mut csv::Writer<W>, plan: &Plan) -> anyhow::Result<()> {
    let mut header = vec!["date"];
    header.extend(plan.roster().members().iter().map(|m| m.employee.id.as_str()));
    w.write_record(&header)?;
    for date in plan.horizon().dates() {
        let day = date.format("%Y-%m-%d").to_string();
        let mut row = vec![day.as_str()];
        row.extend(plan.grid().day(date)?.iter().map(|status| plan.label(*status)));
        w.write_record(&row)?;
    }
    Ok(())
}

/// Export CSV du bilan : header `employee,worked_shifts,worked_hours,budget_hours,difference`
pub fn export_summary_csv<P: AsRef<Path>>(
    path: P,
    summaries: &[EmployeeSummary],
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "employee",
        "worked_shifts",
        "worked_hours",
        "budget_hours",
        "difference",
    ])?;
    let mut shifts = itoa::Buffer::new();
    for s in summaries {
        let worked_hours = format!("{:.2}", s.worked_hours);
        let budget = format!("{:.2}", s.budget_hours);
        let difference = format!("{:.2}", s.difference);
        w.write_record([
            s.employee.as_str(),
            shifts.format(s.worked_shifts),
            worked_hours.as_str(),
            budget.as_str(),
            difference.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV mensuel : header `month,employee,worked_shifts,worked_hours`,
/// puis une ligne `Total` par mois.
pub fn export_monthly_csv<P: AsRef<Path>>(path: P, months: &[MonthSummary]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["month", "employee", "worked_shifts", "worked_hours"])?;
    let mut shifts = itoa::Buffer::new();
    for m in months {
        let month = format!("{:04}-{:02}", m.year, m.month);
        for e in &m.employees {
            let hours = format!("{:.2}", e.worked_hours);
            w.write_record([
                month.as_str(),
                e.employee.as_str(),
                shifts.format(e.worked_shifts),
                hours.as_str(),
            ])?;
        }
        let hours = format!("{:.2}", m.total_hours());
        w.write_record([
            month.as_str(),
            "Total",
            shifts.format(m.total_shifts()),
            hours.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV des sous-effectifs : header `date,shift,assigned,min_persons`
pub fn export_gaps_csv<P: AsRef<Path>>(path: P, gaps: &[StaffingGap]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["date", "shift", "assigned", "min_persons"])?;
    let mut assigned = itoa::Buffer::new();
    let mut min = itoa::Buffer::new();
    for gap in gaps {
        let date = gap.date.format("%Y-%m-%d").to_string();
        w.write_record([
            date.as_str(),
            gap.shift.as_str(),
            assigned.format(gap.assigned),
            min.format(gap.min_persons),
        ])?;
    }
    w.flush()?;
    Ok(())
}
