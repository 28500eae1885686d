#![forbid(unsafe_code)]
use chrono::NaiveDate;
use roulement::scheduler::{
    granted_weekend_rest, illegal_transition, month_history_allows, rank, rank_key, remaining_weekends_allow,
    rested_yesterday, team_size_allows, week_rest_allows, weekend_allows, weekly_cap_reached,
    window_headroom, yearly_cap_reached, CandidateFacts, Eligibility, EligibilityEvaluator,
    EquityFilter, ForcedRest, Ineligibility, WeekendLedger,
};
use roulement::{
    CalendarGrid, CellStatus, Employee, EquityRules, FallbackRules, Horizon, PlanningConfig,
    RankingRules, Roster, Rules, ShiftIndex, ShiftType, WeekendDays,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

const M: ShiftIndex = ShiftIndex::new(0);
const T: ShiftIndex = ShiftIndex::new(1);

fn two_shifts(max_year: f64, max_week: f64) -> PlanningConfig {
    PlanningConfig::new(
        vec![
            ShiftType::new("M", 8.0, 1, 1).forbid_after("T"),
            ShiftType::new("T", 8.0, 1, 1),
        ],
        max_year,
        max_week,
    )
}

fn roster(config: &PlanningConfig, capacities: &[f64]) -> Roster {
    let people = capacities
        .iter()
        .enumerate()
        .map(|(i, c)| Employee::new(format!("E{}", i + 1), *c))
        .collect();
    Roster::new(people, config).unwrap()
}

fn grid(config: &PlanningConfig, roster: &Roster, start: NaiveDate, days: u32) -> CalendarGrid {
    CalendarGrid::new(
        Horizon::new(start, days).unwrap(),
        roster,
        config.shifts.len(),
        config.rules.weekend,
    )
}

#[test]
fn hour_caps() {
    assert!(yearly_cap_reached(1720.0, 1720.0));
    assert!(!yearly_cap_reached(1712.0, 1720.0));

    // (n + 1) * h >= max
    assert!(!weekly_cap_reached(3, 8.0, 40.0));
    assert!(weekly_cap_reached(4, 8.0, 40.0));

    // (n + 1) * h < max
    assert!(window_headroom(3, 8.0, 40.0));
    assert!(!window_headroom(4, 8.0, 40.0));
}

#[test]
fn rested_yesterday_accepts_horizon_start() {
    assert!(rested_yesterday(None));
    assert!(rested_yesterday(Some(CellStatus::Rest)));
    assert!(!rested_yesterday(Some(CellStatus::Vacation)));
    assert!(!rested_yesterday(Some(CellStatus::Working(M))));
}

#[test]
fn forbidden_transitions() {
    let config = two_shifts(1720.0, 40.0);
    let morning = &config.shifts[0];
    let afternoon = &config.shifts[1];

    assert_eq!(
        illegal_transition(&config, Some(CellStatus::Working(T)), morning),
        Some(T)
    );
    assert_eq!(illegal_transition(&config, Some(CellStatus::Working(M)), morning), None);
    assert_eq!(illegal_transition(&config, Some(CellStatus::Working(T)), afternoon), None);
    assert_eq!(illegal_transition(&config, Some(CellStatus::Rest), morning), None);
    assert_eq!(illegal_transition(&config, None, morning), None);
}

#[test]
fn transitions_are_allowed_unless_declared() {
    let open = PlanningConfig::new(
        vec![ShiftType::new("M", 8.0, 1, 1), ShiftType::new("T", 8.0, 1, 1)],
        1720.0,
        40.0,
    );
    assert!(!open.has_transition_rules());
    assert!(open.validate().is_ok());
    assert_eq!(illegal_transition(&open, Some(CellStatus::Working(T)), &open.shifts[0]), None);

    assert!(two_shifts(1720.0, 40.0).has_transition_rules());
}

#[test]
fn equity_sub_conditions() {
    assert!(!team_size_allows(1));
    assert!(team_size_allows(2));

    assert!(weekend_allows(WeekendDays::SaturdaySunday, d(2025, 1, 4)));
    assert!(!weekend_allows(WeekendDays::SaturdaySunday, d(2025, 1, 3)));
    assert!(weekend_allows(WeekendDays::FridayToSunday, d(2025, 1, 3)));

    assert!(week_rest_allows(1, 2));
    assert!(!week_rest_allows(2, 2));

    assert!(month_history_allows(2, 2));
    assert!(!month_history_allows(1, 2));

    assert!(remaining_weekends_allow(0, 0, 1));
    assert!(!remaining_weekends_allow(0, 1, 1));
    assert!(remaining_weekends_allow(2, 1, 1));
}

fn facts(employee: usize, continues: bool, weekend_rests: u32, week_rest: u32) -> CandidateFacts {
    CandidateFacts {
        employee,
        continues_shift: continues,
        weekend_rests,
        week_rest_days: week_rest,
    }
}

fn order(candidates: &[CandidateFacts]) -> Vec<usize> {
    candidates.iter().map(|c| c.employee).collect()
}

#[test]
fn ranking_prefers_continuity_then_fewer_weekend_rests() {
    let base = vec![
        facts(0, false, 1, 0),
        facts(1, true, 3, 0),
        facts(2, false, 0, 0),
        facts(3, false, 0, 2),
    ];

    let mut ranked = base.clone();
    rank(&mut ranked, &RankingRules::default());
    assert_eq!(order(&ranked), vec![1, 2, 3, 0]);

    let with_week_rest = RankingRules {
        week_rest: true,
        ..RankingRules::default()
    };
    let mut ranked = base.clone();
    rank(&mut ranked, &with_week_rest);
    assert_eq!(order(&ranked), vec![1, 3, 2, 0]);

    let no_continuity = RankingRules {
        continuity: false,
        ..RankingRules::default()
    };
    assert_eq!(rank_key(&base[1], &no_continuity), (false, 3, false));
    let mut ranked = base;
    rank(&mut ranked, &no_continuity);
    assert_eq!(order(&ranked), vec![2, 3, 0, 1]);
}

#[test]
fn ranking_is_stable_on_ties() {
    let mut ranked = vec![facts(4, false, 0, 0), facts(1, false, 0, 0), facts(2, false, 0, 0)];
    rank(&mut ranked, &RankingRules::default());
    assert_eq!(order(&ranked), vec![4, 1, 2]);
}

#[test]
fn evaluator_reports_reasons() {
    let config = two_shifts(16.0, 40.0);
    let roster = roster(&config, &[1.0, 1.0]);
    let mut g = grid(&config, &roster, d(2025, 1, 6), 7);
    let evaluator = EligibilityEvaluator::new(&config, &roster);

    g.set_status(0, d(2025, 1, 6), CellStatus::Working(M)).unwrap();
    g.set_status(0, d(2025, 1, 7), CellStatus::Working(M)).unwrap();
    assert_eq!(
        evaluator.evaluate(&g, 0, d(2025, 1, 8), M).unwrap(),
        Eligibility::Ineligible(Ineligibility::YearlyCapReached)
    );
    assert_eq!(evaluator.year_to_date_hours(&g, 0).unwrap(), 16.0);

    g.set_status(1, d(2025, 1, 6), CellStatus::Working(T)).unwrap();
    assert_eq!(
        evaluator.evaluate(&g, 1, d(2025, 1, 7), M).unwrap(),
        Eligibility::Ineligible(Ineligibility::IllegalTransition { after: T })
    );
    assert!(evaluator.evaluate(&g, 1, d(2025, 1, 7), T).unwrap().is_eligible());

    g.seed_vacation(1, d(2025, 1, 9)).unwrap();
    assert_eq!(
        evaluator.evaluate(&g, 1, d(2025, 1, 9), T).unwrap(),
        Eligibility::Ineligible(Ineligibility::CellTaken(CellStatus::Vacation))
    );
}

#[test]
fn weekly_cap_is_prorated_but_relaxed_check_is_not() {
    let config = two_shifts(1720.0, 40.0);
    // mi-temps : 20 h par fenêtre
    let roster = roster(&config, &[0.5]);
    let mut g = grid(&config, &roster, d(2025, 1, 6), 7);
    let evaluator = EligibilityEvaluator::new(&config, &roster);

    g.set_status(0, d(2025, 1, 6), CellStatus::Working(M)).unwrap();
    g.set_status(0, d(2025, 1, 7), CellStatus::Working(M)).unwrap();
    assert_eq!(
        evaluator.evaluate(&g, 0, d(2025, 1, 8), M).unwrap(),
        Eligibility::Ineligible(Ineligibility::WeeklyCapReached)
    );
    // travaillé la veille
    assert!(!evaluator.relaxed(&g, 0, d(2025, 1, 8), M).unwrap());

    g.set_status(0, d(2025, 1, 8), CellStatus::Rest).unwrap();
    assert!(!evaluator.evaluate(&g, 0, d(2025, 1, 9), M).unwrap().is_eligible());
    // pas encore de repos de week-end forcé en janvier
    assert!(!evaluator.relaxed(&g, 0, d(2025, 1, 9), M).unwrap());

    let any_month = two_shifts(1720.0, 40.0).with_rules(Rules {
        fallback: FallbackRules {
            granted_weekend_rest: false,
            ..FallbackRules::default()
        },
        ..Rules::default()
    });
    let lenient = EligibilityEvaluator::new(&any_month, &roster);
    assert!(lenient.relaxed(&g, 0, d(2025, 1, 9), M).unwrap());

    // samedi 11 : jamais en rattrapage
    g.set_status(0, d(2025, 1, 10), CellStatus::Rest).unwrap();
    assert!(!lenient.relaxed(&g, 0, d(2025, 1, 11), M).unwrap());
}

#[test]
fn fallback_defaults_require_a_granted_weekend_rest() {
    assert!(!granted_weekend_rest(0));
    assert!(granted_weekend_rest(1));

    let fallback = FallbackRules::default();
    assert!(fallback.enabled);
    assert!(fallback.granted_weekend_rest);
    assert!(fallback.rested_yesterday && fallback.outside_weekend && fallback.window_headroom);

    // le repos forcé du 4 janvier ouvre le rattrapage pour le reste du mois
    let config = two_shifts(1720.0, 40.0);
    let roster = roster(&config, &[0.5, 1.0]);
    let mut g = grid(&config, &roster, d(2025, 1, 1), 31);
    g.set_status(0, d(2025, 1, 8), CellStatus::Rest).unwrap();
    g.set_status(1, d(2025, 1, 8), CellStatus::Rest).unwrap();
    let evaluator = EligibilityEvaluator::new(&config, &roster);
    assert!(!evaluator.relaxed(&g, 0, d(2025, 1, 9), M).unwrap());

    let rules = EquityRules::count_based();
    let mut ledger = WeekendLedger::new(2, 2);
    let mut ranked = vec![0, 1];
    EquityFilter::new(&rules)
        .apply(&mut g, &mut ledger, d(2025, 1, 4), M, &mut ranked)
        .unwrap();
    assert!(evaluator.relaxed(&g, 0, d(2025, 1, 9), M).unwrap());
    assert!(!evaluator.relaxed(&g, 1, d(2025, 1, 9), M).unwrap());
}

#[test]
fn equity_forces_the_best_ranked_candidate_to_rest() {
    let config = two_shifts(1720.0, 40.0);
    let roster = roster(&config, &[1.0, 1.0, 1.0]);
    let mut g = grid(&config, &roster, d(2025, 1, 1), 10);
    let rules = EquityRules::count_based();
    let filter = EquityFilter::new(&rules);
    let mut ledger = WeekendLedger::new(2, 3);

    let mut ranked = vec![0, 1, 2];
    assert_eq!(
        filter.apply(&mut g, &mut ledger, d(2025, 1, 3), M, &mut ranked).unwrap(),
        None
    );

    let forced = filter
        .apply(&mut g, &mut ledger, d(2025, 1, 4), M, &mut ranked)
        .unwrap();
    assert_eq!(
        forced,
        Some(ForcedRest {
            employee: 0,
            days: vec![d(2025, 1, 4), d(2025, 1, 5)],
        })
    );
    assert_eq!(ranked, vec![1, 2]);
    assert_eq!(g.get_status(0, d(2025, 1, 4)).unwrap(), CellStatus::Rest);
    assert_eq!(g.get_status(0, d(2025, 1, 5)).unwrap(), CellStatus::Rest);
    assert_eq!(g.monthly(0, d(2025, 1, 4)).unwrap().rest_weekends, 1);
    assert!(ledger.shift_rested(M));
    assert!(ledger.employee_forced(0));

    // une seule fois par poste et par week-end
    assert_eq!(
        filter.apply(&mut g, &mut ledger, d(2025, 1, 4), M, &mut ranked).unwrap(),
        None
    );
    // E1 déjà au repos : E2 pour l'autre poste
    let mut ranked = vec![1, 2];
    let forced = filter
        .apply(&mut g, &mut ledger, d(2025, 1, 4), T, &mut ranked)
        .unwrap();
    assert_eq!(forced.map(|f| f.employee), Some(1));

    ledger.reset();
    assert!(!ledger.shift_rested(M));
    let mut alone = vec![2];
    assert_eq!(
        filter.apply(&mut g, &mut ledger, d(2025, 1, 5), M, &mut alone).unwrap(),
        None
    );
}

#[test]
fn equity_keeps_vacations() {
    let config = two_shifts(1720.0, 40.0);
    let roster = roster(&config, &[1.0, 1.0]);
    let mut g = grid(&config, &roster, d(2025, 1, 1), 10);
    g.seed_vacation(0, d(2025, 1, 5)).unwrap();
    let rules = EquityRules::count_based();
    let filter = EquityFilter::new(&rules);
    let mut ledger = WeekendLedger::new(2, 2);

    let mut ranked = vec![0, 1];
    filter
        .apply(&mut g, &mut ledger, d(2025, 1, 4), M, &mut ranked)
        .unwrap();
    assert_eq!(g.get_status(0, d(2025, 1, 4)).unwrap(), CellStatus::Rest);
    assert_eq!(g.get_status(0, d(2025, 1, 5)).unwrap(), CellStatus::Vacation);
}

#[test]
fn friday_weekend_rests_saturday_and_sunday_only() {
    let config = two_shifts(1720.0, 40.0);
    let roster = roster(&config, &[1.0, 1.0]);
    let mut g = CalendarGrid::new(
        Horizon::new(d(2025, 1, 1), 10).unwrap(),
        &roster,
        2,
        WeekendDays::FridayToSunday,
    );
    let rules = EquityRules::count_based();
    let filter = EquityFilter::new(&rules);
    let mut ledger = WeekendLedger::new(2, 2);

    let mut ranked = vec![0, 1];
    let forced = filter
        .apply(&mut g, &mut ledger, d(2025, 1, 3), M, &mut ranked)
        .unwrap()
        .unwrap();
    assert_eq!(forced.days, vec![d(2025, 1, 4), d(2025, 1, 5)]);
    assert!(g.get_status(0, d(2025, 1, 3)).unwrap().is_unassigned());
}

#[test]
fn majority_fairness_checks_the_month_history() {
    let config = two_shifts(1720.0, 40.0);
    let roster = roster(&config, &[1.0, 1.0, 1.0]);
    let mut g = grid(&config, &roster, d(2025, 1, 1), 31);
    let count_based = EquityRules::count_based();
    let strict = EquityRules::majority_fairness();
    let mut ledger = WeekendLedger::new(2, 3);

    let mut ranked = vec![0, 1, 2];
    EquityFilter::new(&count_based)
        .apply(&mut g, &mut ledger, d(2025, 1, 4), M, &mut ranked)
        .unwrap();
    ledger.reset();

    // E1 : deux jours de week-end chômés, aucun travaillé ce mois
    let mut lenient = g.clone();
    let mut ranked = vec![0, 1, 2];
    let forced = EquityFilter::new(&count_based)
        .apply(&mut lenient, &mut ledger.clone(), d(2025, 1, 25), M, &mut ranked)
        .unwrap();
    assert_eq!(forced.map(|f| f.employee), Some(0));

    let mut ranked = vec![0, 1, 2];
    let forced = EquityFilter::new(&strict)
        .apply(&mut g, &mut ledger, d(2025, 1, 25), M, &mut ranked)
        .unwrap();
    assert_eq!(forced.map(|f| f.employee), Some(1));
    assert_eq!(ranked, vec![0, 2]);
}

#[test]
fn week_rest_history_keeps_a_rested_employee_working() {
    let config = two_shifts(1720.0, 40.0);
    let roster = roster(&config, &[1.0, 1.0, 1.0]);
    let mut g = grid(&config, &roster, d(2025, 1, 1), 31);
    // E1 a déjà deux jours de repos dans la semaine du lundi 20
    g.set_status(0, d(2025, 1, 20), CellStatus::Rest).unwrap();
    g.set_status(0, d(2025, 1, 21), CellStatus::Rest).unwrap();

    let rules = EquityRules {
        week_rest_history: true,
        ..EquityRules::count_based()
    };
    let filter = EquityFilter::new(&rules);
    assert!(!filter.employee_allows(&g, 0, d(2025, 1, 25)).unwrap());
    assert!(filter.employee_allows(&g, 1, d(2025, 1, 25)).unwrap());

    let mut ledger = WeekendLedger::new(2, 3);
    let mut ranked = vec![0, 1, 2];
    let forced = filter
        .apply(&mut g, &mut ledger, d(2025, 1, 25), M, &mut ranked)
        .unwrap();
    assert_eq!(forced.map(|f| f.employee), Some(1));
    assert_eq!(ranked, vec![0, 2]);
    assert!(g.get_status(0, d(2025, 1, 25)).unwrap().is_unassigned());
}

#[test]
fn remaining_weekends_backoff_stops_a_late_second_rest() {
    let config = two_shifts(1720.0, 40.0);
    let roster = roster(&config, &[1.0, 1.0, 1.0]);
    let mut g = grid(&config, &roster, d(2025, 1, 1), 31);
    let rules = EquityRules {
        remaining_weekends_backoff: true,
        min_remaining_weekends: 1,
        ..EquityRules::count_based()
    };
    let filter = EquityFilter::new(&rules);
    let mut ledger = WeekendLedger::new(2, 3);

    // premier repos du mois : toujours accordé
    let mut ranked = vec![0, 1, 2];
    let forced = filter.apply(&mut g, &mut ledger, d(2025, 1, 4), M, &mut ranked).unwrap();
    assert_eq!(forced.map(|f| f.employee), Some(0));
    ledger.reset();

    // le 11, il reste les week-ends du 18 et du 25
    let mut ranked = vec![0, 1, 2];
    let forced = filter.apply(&mut g, &mut ledger, d(2025, 1, 11), M, &mut ranked).unwrap();
    assert_eq!(forced.map(|f| f.employee), Some(0));
    assert_eq!(g.monthly(0, d(2025, 1, 11)).unwrap().rest_weekends, 2);
    ledger.reset();

    assert!(filter.employee_allows(&g, 0, d(2025, 1, 18)).unwrap());
    // dernier week-end de janvier : plus de repos supplémentaire pour E1
    assert!(!filter.employee_allows(&g, 0, d(2025, 1, 25)).unwrap());
    let mut ranked = vec![0, 1, 2];
    let forced = filter.apply(&mut g, &mut ledger, d(2025, 1, 25), M, &mut ranked).unwrap();
    assert_eq!(forced.map(|f| f.employee), Some(1));
    assert_eq!(g.get_status(0, d(2025, 1, 25)).unwrap(), CellStatus::Unassigned);
}

#[test]
fn disabled_equity_never_forces() {
    let config = two_shifts(1720.0, 40.0);
    let roster = roster(&config, &[1.0, 1.0]);
    let mut g = grid(&config, &roster, d(2025, 1, 1), 10);
    let rules = EquityRules::disabled();
    let mut ledger = WeekendLedger::new(2, 2);
    let mut ranked = vec![0, 1];
    assert!(EquityFilter::new(&rules)
        .apply(&mut g, &mut ledger, d(2025, 1, 4), M, &mut ranked)
        .unwrap()
        .is_none());
    assert_eq!(ranked, vec![0, 1]);
}
