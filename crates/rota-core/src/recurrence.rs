//! Recurrence schedule computation.
//!
//! Expands a [`RecurrenceRule`] into the sequence of candidate due dates the
//! generator considers, bounded by the caps in [`GenerationLimits`]. The
//! computation is pure and takes `today` explicitly so callers and tests can
//! pin it; the storage side of generation lives in the repository layer.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::models::{InvalidRuleError, RecurrenceRule, RuleType};
use crate::settings::{self, DEFAULT_MAX_ADVANCE_MONTHS, DEFAULT_MAX_INSTANCES};

/// The two caps bounding a single generation call, resolved from the
/// settings store once at the start of the call and passed down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationLimits {
    /// Count cap: new instances created per call. Existing instances that
    /// match a candidate date consume none of this budget.
    pub max_instances: i64,
    /// Horizon cap, in months of lookahead from today.
    pub max_advance_months: i64,
}

impl Default for GenerationLimits {
    fn default() -> Self {
        Self {
            max_instances: DEFAULT_MAX_INSTANCES,
            max_advance_months: DEFAULT_MAX_ADVANCE_MONTHS,
        }
    }
}

impl GenerationLimits {
    /// Builds limits from raw stored overrides, falling back per key.
    pub fn from_overrides(max_instances: Option<&str>, max_advance_months: Option<&str>) -> Self {
        Self {
            max_instances: settings::resolve(max_instances, DEFAULT_MAX_INSTANCES),
            max_advance_months: settings::resolve(max_advance_months, DEFAULT_MAX_ADVANCE_MONTHS),
        }
    }

    /// The farthest due date generation may produce. Months are approximated
    /// as 30 days each, not calendar months; the cap boundary deliberately
    /// matches that approximation.
    pub fn horizon_end(&self, today: NaiveDate) -> NaiveDate {
        today + Duration::days(self.max_advance_months * 30)
    }
}

/// Normalizes a candidate date to the stored due timestamp: midnight UTC.
/// The date is the significant part; instances dedup on this exact value.
pub fn due_datetime(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0).unwrap().and_utc()
}

/// Candidate dates for a weekly rule: the first date on or after `today`
/// falling on the target weekday, then every 7 days within the horizon.
#[derive(Debug)]
pub struct WeeklyDates {
    next: NaiveDate,
    horizon_end: NaiveDate,
}

impl WeeklyDates {
    fn new(weekly_day: u32, today: NaiveDate, horizon_end: NaiveDate) -> Self {
        // 1 (Monday) through 7 (Sunday) to a Monday=0 index. The mod-7 wrap
        // rolls an already-passed weekday into next week; today's own
        // weekday yields today itself.
        let target = weekly_day as i64 - 1;
        let days_ahead =
            (target - today.weekday().num_days_from_monday() as i64).rem_euclid(7);
        Self {
            next: today + Duration::days(days_ahead),
            horizon_end,
        }
    }
}

impl Iterator for WeeklyDates {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        if self.next > self.horizon_end {
            return None;
        }
        let current = self.next;
        self.next += Duration::days(7);
        Some(current)
    }
}

/// Candidate dates for a monthly rule, starting at the current month.
///
/// The target day is taken literally: a month that does not contain it
/// (day 31 in February) contributes nothing, with no rollover to a nearby
/// valid day. Iteration is additionally capped at `max_advance_months + 2`
/// months as a termination guard independent of the date horizon.
#[derive(Debug)]
pub struct MonthlyDates {
    year: i32,
    month: u32,
    day: u32,
    today: NaiveDate,
    horizon_end: NaiveDate,
    months_remaining: i64,
}

impl MonthlyDates {
    fn new(day: u32, today: NaiveDate, limits: &GenerationLimits) -> Self {
        Self {
            year: today.year(),
            month: today.month(),
            day,
            today,
            horizon_end: limits.horizon_end(today),
            months_remaining: (limits.max_advance_months + 2).max(0),
        }
    }
}

impl Iterator for MonthlyDates {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        while self.months_remaining > 0 {
            self.months_remaining -= 1;
            let candidate = NaiveDate::from_ymd_opt(self.year, self.month, self.day);

            // Advance to the first day of the following month regardless of
            // whether this month produced a date.
            if self.month == 12 {
                self.year += 1;
                self.month = 1;
            } else {
                self.month += 1;
            }

            match candidate {
                // Day does not exist in this month: skip the whole month.
                None => continue,
                // A past occurrence in the current month is never backfilled.
                Some(date) if date < self.today => continue,
                // Dates are monotonic, so the first over-horizon candidate
                // ends generation for the rule.
                Some(date) if date > self.horizon_end => {
                    self.months_remaining = 0;
                    return None;
                }
                Some(date) => return Some(date),
            }
        }
        None
    }
}

/// Candidate due dates for either rule form.
#[derive(Debug)]
pub enum DueDates {
    Weekly(WeeklyDates),
    Monthly(MonthlyDates),
}

impl DueDates {
    /// Builds the candidate sequence for `rule` as seen from `today`.
    pub fn for_rule(
        rule: &RecurrenceRule,
        today: NaiveDate,
        limits: &GenerationLimits,
    ) -> Result<Self, InvalidRuleError> {
        match rule.rule_type {
            RuleType::Weekly => {
                let day = rule
                    .weekly_recurring_day
                    .ok_or(InvalidRuleError::MissingWeeklyDay)?;
                if !(1..=7).contains(&day) {
                    return Err(InvalidRuleError::WeeklyDayOutOfRange(day));
                }
                Ok(DueDates::Weekly(WeeklyDates::new(
                    day,
                    today,
                    limits.horizon_end(today),
                )))
            }
            RuleType::Monthly => {
                let day = rule
                    .monthly_recurring_day
                    .ok_or(InvalidRuleError::MissingMonthlyDay)?;
                if !(1..=31).contains(&day) {
                    return Err(InvalidRuleError::MonthlyDayOutOfRange(day));
                }
                Ok(DueDates::Monthly(MonthlyDates::new(day, today, limits)))
            }
        }
    }
}

impl Iterator for DueDates {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        match self {
            DueDates::Weekly(dates) => dates.next(),
            DueDates::Monthly(dates) => dates.next(),
        }
    }
}

/// Counts from a single generation call.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerationOutcome {
    /// New pending instances inserted.
    pub created: usize,
    /// Stale future-pending instances deleted before regeneration.
    pub purged: usize,
}

/// Counts from a refresh pass over every recurring definition.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerationSummary {
    pub definitions_processed: usize,
    pub instances_created: usize,
    pub instances_purged: usize,
}

impl GenerationSummary {
    pub fn absorb(&mut self, outcome: GenerationOutcome) {
        self.definitions_processed += 1;
        self.instances_created += outcome.created;
        self.instances_purged += outcome.purged;
    }
}
