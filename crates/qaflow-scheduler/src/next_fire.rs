use std::str::FromStr;

use chrono::TimeZone;
use chrono_tz::Tz;
use cron::Schedule;
use qaflow_core::QaError;

/// Result of advancing a schedule entry past a due instant (§4.F "Catch-up
/// policy"): the next future fire time, and how many additional firing
/// instants were skipped because the tick loop hadn't polled in a while.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleAdvance {
    pub next_run_ts_ms: u64,
    pub missed: u64,
}

/// Validates a cron expression and timezone without computing a fire time,
/// used by `create`/`update` to reject malformed entries up front.
pub fn validate_cron(cron_expression: &str, timezone: &str) -> Result<(), QaError> {
    Schedule::from_str(cron_expression)
        .map_err(|error| QaError::validation(format!("invalid cron expression '{cron_expression}': {error}")))?;
    timezone
        .parse::<Tz>()
        .map_err(|_| QaError::validation(format!("invalid timezone '{timezone}'")))?;
    Ok(())
}

/// First cron occurrence strictly after `from_unix_ms` in `timezone`.
pub fn next_fire_unix_ms(cron_expression: &str, timezone: &str, from_unix_ms: u64) -> Result<u64, QaError> {
    let schedule = parse_schedule(cron_expression)?;
    let tz = parse_timezone(timezone)?;
    let from = to_tz_datetime(tz, from_unix_ms)?;
    schedule
        .after(&from)
        .next()
        .map(|next| next.timestamp_millis() as u64)
        .ok_or_else(|| QaError::validation(format!("cron expression '{cron_expression}' has no future occurrence")))
}

/// Advances `due_run_ts_ms` (a next-fire that is now `<= now_unix_ms`) to
/// the next future fire time, counting any additional occurrences that
/// elapsed in between as missed (§4.F: "if multiple firing instants were
/// missed, only one run is scheduled (most recent); the missed counter is
/// incremented").
pub fn advance(
    cron_expression: &str,
    timezone: &str,
    due_run_ts_ms: u64,
    now_unix_ms: u64,
) -> Result<ScheduleAdvance, QaError> {
    let schedule = parse_schedule(cron_expression)?;
    let tz = parse_timezone(timezone)?;
    let from = to_tz_datetime(tz, due_run_ts_ms)?;

    let mut missed: u64 = 0;
    let mut next_run_ts_ms = None;
    for occurrence in schedule.after(&from) {
        let occurrence_ms = occurrence.timestamp_millis() as u64;
        if occurrence_ms <= now_unix_ms {
            missed = missed.saturating_add(1);
            continue;
        }
        next_run_ts_ms = Some(occurrence_ms);
        break;
    }

    let next_run_ts_ms = next_run_ts_ms
        .ok_or_else(|| QaError::validation(format!("cron expression '{cron_expression}' has no future occurrence")))?;
    Ok(ScheduleAdvance {
        next_run_ts_ms,
        missed,
    })
}

fn parse_schedule(cron_expression: &str) -> Result<Schedule, QaError> {
    Schedule::from_str(cron_expression)
        .map_err(|error| QaError::validation(format!("invalid cron expression '{cron_expression}': {error}")))
}

fn parse_timezone(timezone: &str) -> Result<Tz, QaError> {
    timezone
        .parse::<Tz>()
        .map_err(|_| QaError::validation(format!("invalid timezone '{timezone}'")))
}

fn to_tz_datetime(tz: Tz, unix_ms: u64) -> Result<chrono::DateTime<Tz>, QaError> {
    tz.timestamp_millis_opt(i64::try_from(unix_ms).unwrap_or(i64::MAX))
        .single()
        .ok_or_else(|| QaError::internal("ambiguous or invalid local timestamp for schedule"))
}
