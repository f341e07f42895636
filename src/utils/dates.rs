use chrono::{DateTime, Duration, Months, NaiveTime, Utc};
use rand::Rng;

/// Drop the time-of-day component, keeping the date at midnight UTC.
pub fn normalize_day(t: DateTime<Utc>) -> DateTime<Utc> {
    t.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// One calendar year later. Feb 29 clamps to Feb 28.
fn add_one_year(t: DateTime<Utc>) -> DateTime<Utc> {
    t.checked_add_months(Months::new(12)).unwrap_or(t)
}

/// Deterministic core of the surprise day draw.
///
/// The candidate window is `[now + 7 days, now + 1 year - 1 day]`, both ends
/// day-normalized. `t` selects a point in the window by interpolating on unix
/// timestamps rather than calendar fields, so leap years and DST shifts need
/// no special handling.
pub fn random_surprise_day_with(now: DateTime<Utc>, t: f64) -> DateTime<Utc> {
    let now = normalize_day(now);

    let start = now + Duration::days(7);
    let end = add_one_year(now) - Duration::days(1);

    let ts = start.timestamp() as f64 * t + end.timestamp() as f64 * (1.0 - t);

    // The interpolated point always lies between start and end, both valid.
    DateTime::from_timestamp(ts as i64, 0)
        .map(normalize_day)
        .unwrap_or(start)
}

/// Pick a surprise day uniformly at random from the candidate window.
pub fn random_surprise_day(now: DateTime<Utc>) -> DateTime<Utc> {
    random_surprise_day_with(now, rand::thread_rng().gen::<f64>())
}

/// Generate a fresh `(surprise_day, reset_day)` pair for a record.
///
/// The reset day is exactly one calendar year after the day-normalized `now`,
/// without the one-day pullback applied to the surprise day window.
pub fn generate_random_days(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let surprise_day = random_surprise_day(now);
    let reset_day = add_one_year(normalize_day(now));
    (surprise_day, reset_day)
}

/// How long until the next UTC midnight, for scheduling the daily rollover.
pub fn until_next_midnight(now: DateTime<Utc>) -> std::time::Duration {
    let next = normalize_day(now) + Duration::days(1);
    (next - now).to_std().unwrap_or_default()
}
