#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use roulement::{
    config::load_config_from_file,
    io,
    model::{EmployeeId, Horizon, Roster},
    scheduler::{Plan, Planner},
    storage::{JsonStorage, Storage},
    summary::{monthly_summary, staffing_gaps, summarize},
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de planification annuelle des roulements
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`, filtre via RUST_LOG)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du plan calculé
    #[arg(long, global = true, default_value = "plan.json")]
    plan: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Calculer un plan et l'enregistrer
    Plan {
        /// Config JSON (postes, plafonds, règles)
        #[arg(long)]
        config: String,
        /// CSV `id,capacity[,name]`
        #[arg(long)]
        employees: String,
        /// CSV `employee,dates`
        #[arg(long)]
        vacations: Option<String>,
        /// Premier jour (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        #[arg(long, default_value_t = 365)]
        days: u32,
        /// Export CSV de la grille (optionnel)
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Afficher la grille, ou la ligne d'un employé
    Show {
        #[arg(long)]
        employee: Option<String>,
    },

    /// Heures effectuées contre budget annuel
    Summary {
        #[arg(long)]
        out_csv: Option<String>,
        /// Détail mois par mois
        #[arg(long)]
        monthly: bool,
        /// Export CSV du détail mensuel (optionnel)
        #[arg(long)]
        monthly_csv: Option<String>,
    },

    /// Vérifier les effectifs minimums
    Check {
        /// Export CSV des sous-effectifs (optionnel)
        #[arg(long)]
        report: Option<String>,
    },

    /// Exporter le plan
    Export {
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },
}

fn load_plan(storage: &JsonStorage) -> Result<Plan> {
    if !storage.exists() {
        bail!("no plan at {} (run `plan` first)", storage.path().display());
    }
    storage.load()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .try_init();
    }

    let storage = JsonStorage::open(&cli.plan)?;

    let code = match cli.cmd {
        Commands::Plan {
            config,
            employees,
            vacations,
            start,
            days,
            out_csv,
        } => {
            let config = load_config_from_file(&config)?;
            let employees = io::import_employees_csv(&employees)?;
            let roster = Roster::new(employees, &config)?;
            let start = NaiveDate::parse_from_str(&start, "%Y-%m-%d")
                .with_context(|| format!("invalid start date: {start}"))?;
            let horizon = Horizon::new(start, days)?;

            let mut planner = Planner::new(&config, &roster, horizon)?;
            if let Some(path) = vacations {
                let vacations = io::import_vacations_csv(path)?;
                planner.seed_vacations(&vacations)?;
            }
            let plan = planner.run()?;
            storage.save(&plan)?;
            if let Some(path) = out_csv {
                io::export_grid_csv(path, &plan)?;
            }

            let stats = plan.stats();
            println!(
                "Planned {} day(s) for {} employee(s): {} assignment(s) ({} fallback), {} forced weekend rest(s), {} understaffed slot(s)",
                horizon.days(),
                roster.len(),
                stats.assignments,
                stats.fallback_assignments,
                stats.forced_rests,
                stats.understaffed
            );
            println!("Plan saved to {}", storage.path().display());
            0
        }
        Commands::Show { employee } => {
            let plan = load_plan(&storage)?;
            match employee {
                Some(handle) => {
                    let id = EmployeeId::new(&handle);
                    for date in plan.horizon().dates() {
                        let status = plan.status(&id, date)?;
                        println!("{} | {}", date, plan.label(status));
                    }
                }
                None => {
                    let ids: Vec<&str> = plan
                        .roster()
                        .members()
                        .iter()
                        .map(|m| m.employee.id.as_str())
                        .collect();
                    println!("date       | {}", ids.join(" "));
                    for date in plan.horizon().dates() {
                        let cells: Vec<&str> = plan
                            .grid()
                            .day(date)?
                            .iter()
                            .map(|s| plan.label(*s))
                            .collect();
                        println!("{} | {}", date, cells.join(" "));
                    }
                }
            }
            0
        }
        Commands::Summary {
            out_csv,
            monthly,
            monthly_csv,
        } => {
            let plan = load_plan(&storage)?;
            if monthly || monthly_csv.is_some() {
                let months = monthly_summary(&plan)?;
                if monthly {
                    for m in &months {
                        println!(
                            "{:04}-{:02} | {} shift(s) | {:.2} h | {} understaffed day(s)",
                            m.year,
                            m.month,
                            m.total_shifts(),
                            m.total_hours(),
                            m.understaffed_days()
                        );
                        for e in &m.employees {
                            println!(
                                "  {} | {} shift(s) | {:.2} h",
                                e.employee, e.worked_shifts, e.worked_hours
                            );
                        }
                    }
                }
                if let Some(path) = monthly_csv {
                    io::export_monthly_csv(path, &months)?;
                }
            }
            let summaries = summarize(&plan)?;
            for s in &summaries {
                println!(
                    "{} | {} shift(s) | {:.2} h / {:.2} h | diff {:.2}",
                    s.employee, s.worked_shifts, s.worked_hours, s.budget_hours, s.difference
                );
            }
            if let Some(path) = out_csv {
                io::export_summary_csv(path, &summaries)?;
            }
            0
        }
        Commands::Check { report } => {
            let plan = load_plan(&storage)?;
            let gaps = staffing_gaps(&plan)?;
            if gaps.is_empty() {
                println!("OK: staffing minimums met");
                0
            } else {
                eprintln!("Found {} understaffed slot(s)", gaps.len());
                if let Some(path) = report {
                    io::export_gaps_csv(path, &gaps)?;
                }
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::Export { out_json, out_csv } => {
            let plan = load_plan(&storage)?;
            if let Some(path) = out_json {
                io::export_plan_json(path, &plan)?;
            }
            if let Some(path) = out_csv {
                io::export_grid_csv(path, &plan)?;
            }
            0
        }
    };

    std::process::exit(code);
}
