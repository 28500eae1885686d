use chrono::{Datelike, Days, NaiveDate};

/// Lundi de la semaine de `date`.
pub(super) fn monday_of(date: NaiveDate) -> NaiveDate {
    let back = Days::new(u64::from(date.weekday().num_days_from_monday()));
    date.checked_sub_days(back).unwrap_or(date)
}

/// Samedi et dimanche de la semaine de `date`.
pub(super) fn saturday_sunday(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = monday_of(date);
    let saturday = monday.checked_add_days(Days::new(5)).unwrap_or(monday);
    let sunday = monday.checked_add_days(Days::new(6)).unwrap_or(monday);
    (saturday, sunday)
}

/// Premier et dernier jour du mois de `date`.
pub(super) fn month_span(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let next_month = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };
    let last = next_month.and_then(|d| d.pred_opt()).unwrap_or(date);
    (first, last)
}

/// Numéro de mois absolu, pour indexer les agrégats mensuels.
pub(super) fn month_ordinal(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}
