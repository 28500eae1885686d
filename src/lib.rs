#![forbid(unsafe_code)]
//! Roulement — planification annuelle de postes (matin/après-midi/nuit) sans BD.
//!
//! - Moteur glouton déterministe, jour par jour, sans retour arrière.
//! - Plafonds horaires annuels/hebdomadaires proratisés par la capacité.
//! - Enchaînements interdits, repos forcés de week-end, passe de rattrapage.
//! - Stockage fichiers (JSON/CSV) et bilans en dehors du moteur.

pub mod config;
#[cfg(feature = "serde")]
pub mod io;
pub mod model;
pub mod scheduler;
#[cfg(feature = "serde")]
pub mod storage;
pub mod summary;

pub use config::{EquityRules, FallbackRules, PlanningConfig, RankingRules, Rules, WeekendDays};
#[cfg(feature = "serde")]
pub use config::{export_config_json, load_config_from_file};
pub use model::{
    CellStatus, Employee, EmployeeId, Horizon, Member, Roster, ShiftCode, ShiftIndex, ShiftType,
    VacationPlan,
};
pub use scheduler::{CalendarGrid, Plan, PlanError, Planner, RollingWindow, RunStats};
#[cfg(feature = "serde")]
pub use storage::{JsonStorage, Storage};
pub use summary::{
    daily_totals, monthly_summary, staffing_gaps, summarize, DailyTotal, EmployeeSummary,
    MonthSummary, MonthlyHours, StaffingGap,
};
