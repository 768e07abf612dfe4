//! Candidate enumeration: the wall-clock timestamps a rule produces before
//! they are resolved against its timezone.
//!
//! Each FREQ x INTERVAL step is a *period*. A period is expanded into the
//! days that pass the BY-day filters, crossed with the times of day that pass
//! the BY-time filters, then trimmed by BYSETPOS. Period `n` can be located
//! directly from the anchor, which is what makes `seek` cheap.

use std::collections::VecDeque;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::rfc::ical::core::{Frequency, RRule};

/// Last year a generator will enter.
const MAX_YEAR: i32 = 9999;

/// Scope an ordinal BYDAY (`2MO`, `-1FR`) counts within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NthScope {
    Month,
    Year,
}

/// A rule's constraints with the implicit values taken from DTSTART filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    freq: Frequency,
    interval: u32,
    dtstart: NaiveDateTime,
    /// Start of period 0.
    anchor: NaiveDateTime,
    by_month: Vec<u32>,
    by_weekno: Vec<i32>,
    by_yearday: Vec<i32>,
    by_monthday: Vec<i32>,
    by_weekday: Vec<chrono::Weekday>,
    by_nth_weekday: Vec<(i32, chrono::Weekday)>,
    nth_scope: NthScope,
    by_hour: Vec<u32>,
    by_minute: Vec<u32>,
    by_second: Vec<u32>,
    by_setpos: Vec<i32>,
}

fn sorted<T: Ord>(mut values: Vec<T>) -> Vec<T> {
    values.sort_unstable();
    values.dedup();
    values
}

impl Expansion {
    /// Builds the expansion of `rrule` anchored at the local `dtstart`.
    #[must_use]
    pub fn new(freq: Frequency, rrule: &RRule, dtstart: NaiveDateTime) -> Self {
        let mut by_month: Vec<u32> = rrule.by_month.iter().copied().map(u32::from).collect();
        let mut by_monthday: Vec<i32> = rrule.by_monthday.iter().copied().map(i32::from).collect();
        let mut by_weekday = Vec::new();
        let mut by_nth_weekday = Vec::new();

        let nth_scope = if freq == Frequency::Yearly && by_month.is_empty() {
            NthScope::Year
        } else {
            NthScope::Month
        };
        let ordinals_apply = matches!(freq, Frequency::Monthly | Frequency::Yearly);

        for day in &rrule.by_day {
            match day.ordinal {
                Some(n) if ordinals_apply => {
                    by_nth_weekday.push((i32::from(n), day.weekday.to_chrono()));
                }
                _ => by_weekday.push(day.weekday.to_chrono()),
            }
        }

        // RFC 5545 §3.3.10: missing day-level parts are taken from DTSTART
        let no_day_parts = rrule.by_day.is_empty()
            && rrule.by_monthday.is_empty()
            && rrule.by_yearday.is_empty()
            && rrule.by_weekno.is_empty();
        if no_day_parts {
            match freq {
                Frequency::Yearly => {
                    if by_month.is_empty() {
                        by_month.push(dtstart.month());
                    }
                    by_monthday.push(date_day(dtstart.date()));
                }
                Frequency::Monthly => by_monthday.push(date_day(dtstart.date())),
                Frequency::Weekly => by_weekday.push(dtstart.weekday()),
                _ => {}
            }
        }

        let time_default = |values: &[u8], field: u32, finer_than: Frequency| -> Vec<u32> {
            if values.is_empty() && freq > finer_than {
                vec![field]
            } else {
                sorted(values.iter().copied().map(u32::from).collect())
            }
        };
        let by_hour = time_default(&rrule.by_hour, dtstart.hour(), Frequency::Hourly);
        let by_minute = time_default(&rrule.by_minute, dtstart.minute(), Frequency::Minutely);
        let by_second = time_default(&rrule.by_second, dtstart.second(), Frequency::Secondly);

        let anchor = period_anchor(freq, dtstart, rrule.effective_wkst().to_chrono());

        Self {
            freq,
            interval: rrule.effective_interval(),
            dtstart,
            anchor,
            by_month: sorted(by_month),
            by_weekno: rrule.by_weekno.iter().copied().map(i32::from).collect(),
            by_yearday: rrule.by_yearday.iter().copied().map(i32::from).collect(),
            by_monthday,
            by_weekday,
            by_nth_weekday,
            nth_scope,
            by_hour,
            by_minute,
            by_second,
            by_setpos: rrule.by_setpos.iter().copied().map(i32::from).collect(),
        }
    }

    #[must_use]
    pub const fn freq(&self) -> Frequency {
        self.freq
    }

    #[must_use]
    pub const fn dtstart(&self) -> NaiveDateTime {
        self.dtstart
    }

    /// Iterates candidates from the first period on.
    #[must_use]
    pub fn candidates(&self, max_empty_periods: u32) -> CandidateIter<'_> {
        CandidateIter {
            expansion: self,
            next_index: 0,
            buffer: VecDeque::new(),
            empty_run: 0,
            max_empty_periods,
            periods_visited: 0,
            exhausted: false,
        }
    }

    /// Start of period `index`, or `None` past the supported calendar range.
    #[must_use]
    pub fn period_start(&self, index: u64) -> Option<NaiveDateTime> {
        let step = i64::try_from(index)
            .ok()?
            .checked_mul(i64::from(self.interval))?;

        let start = match self.freq {
            Frequency::Yearly => {
                let year = i64::from(self.anchor.year()).checked_add(step)?;
                first_of_month(i32::try_from(year).ok()?, 1)?.and_time(NaiveTime::MIN)
            }
            Frequency::Monthly => {
                let month0 = i64::from(self.anchor.year()) * 12 + i64::from(self.anchor.month0());
                let total = month0.checked_add(step)?;
                let year = i32::try_from(total.div_euclid(12)).ok()?;
                let month = u32::try_from(total.rem_euclid(12)).ok()? + 1;
                first_of_month(year, month)?.and_time(NaiveTime::MIN)
            }
            Frequency::Weekly => self
                .anchor
                .checked_add_signed(Duration::try_days(step.checked_mul(7)?)?)?,
            Frequency::Daily => self.anchor.checked_add_signed(Duration::try_days(step)?)?,
            Frequency::Hourly | Frequency::Minutely | Frequency::Secondly => {
                let unit = self.freq.fixed_seconds()?;
                self.anchor
                    .checked_add_signed(Duration::try_seconds(step.checked_mul(unit)?)?)?
            }
        };

        (start.year() <= MAX_YEAR).then_some(start)
    }

    /// Index of the period containing `local`; 0 for anything before the anchor.
    #[must_use]
    pub fn period_index_of(&self, local: NaiveDateTime) -> u64 {
        if local <= self.anchor {
            return 0;
        }
        let interval = i64::from(self.interval);
        let elapsed = match self.freq {
            Frequency::Yearly => i64::from(local.year() - self.anchor.year()) / interval,
            Frequency::Monthly => {
                let months = i64::from(local.year() - self.anchor.year()) * 12
                    + i64::from(local.month0())
                    - i64::from(self.anchor.month0());
                months / interval
            }
            Frequency::Weekly => {
                (local.date() - self.anchor.date()).num_days() / (7 * interval)
            }
            Frequency::Daily => (local.date() - self.anchor.date()).num_days() / interval,
            Frequency::Hourly | Frequency::Minutely | Frequency::Secondly => {
                let unit = self.freq.fixed_seconds().unwrap_or(1);
                (local - self.anchor).num_seconds() / (unit * interval)
            }
        };
        u64::try_from(elapsed).unwrap_or(0)
    }

    /// Candidates of the period starting at `start`, sorted, BYSETPOS applied.
    #[must_use]
    pub fn expand_period(&self, start: NaiveDateTime) -> Vec<NaiveDateTime> {
        let times = self.period_times(start);
        if times.is_empty() {
            return Vec::new();
        }

        let set: Vec<NaiveDateTime> = self
            .period_days(start.date())
            .into_iter()
            .filter(|day| self.day_matches(*day))
            .flat_map(|day| times.iter().map(move |time| day.and_time(*time)))
            .collect();

        self.apply_setpos(set)
    }

    fn period_days(&self, first: NaiveDate) -> Vec<NaiveDate> {
        let len = match self.freq {
            Frequency::Yearly => days_in_year(first.year()),
            Frequency::Monthly => days_in_month(first.year(), first.month()),
            Frequency::Weekly => 7,
            Frequency::Daily | Frequency::Hourly | Frequency::Minutely | Frequency::Secondly => 1,
        };
        first.iter_days().take(len as usize).collect()
    }

    fn period_times(&self, start: NaiveDateTime) -> Vec<NaiveTime> {
        let pick = |values: &[u32], field: u32, coarse: bool| -> Vec<u32> {
            if coarse {
                values.to_vec()
            } else if values.is_empty() || values.contains(&field) {
                vec![field]
            } else {
                Vec::new()
            }
        };
        let hours = pick(&self.by_hour, start.hour(), self.freq > Frequency::Hourly);
        let minutes = pick(&self.by_minute, start.minute(), self.freq > Frequency::Minutely);
        let seconds = pick(&self.by_second, start.second(), self.freq > Frequency::Secondly);

        let mut times = Vec::with_capacity(hours.len() * minutes.len() * seconds.len());
        for hour in &hours {
            for minute in &minutes {
                for second in &seconds {
                    if let Some(time) = NaiveTime::from_hms_opt(*hour, *minute, *second) {
                        times.push(time);
                    }
                }
            }
        }
        times
    }

    fn day_matches(&self, day: NaiveDate) -> bool {
        if !self.by_month.is_empty() && !self.by_month.contains(&day.month()) {
            return false;
        }
        if !self.by_weekno.is_empty() && !self.weekno_matches(day) {
            return false;
        }
        if !self.by_yearday.is_empty() {
            let ordinal = date_ordinal(day);
            let len = date_len(days_in_year(day.year()));
            if !self
                .by_yearday
                .iter()
                .any(|n| signed_position_matches(*n, ordinal, len))
            {
                return false;
            }
        }
        if !self.by_monthday.is_empty() {
            let len = date_len(days_in_month(day.year(), day.month()));
            if !self
                .by_monthday
                .iter()
                .any(|n| signed_position_matches(*n, date_day(day), len))
            {
                return false;
            }
        }
        if !(self.by_weekday.is_empty() && self.by_nth_weekday.is_empty()) {
            return self.weekday_matches(day);
        }
        true
    }

    fn weekday_matches(&self, day: NaiveDate) -> bool {
        let weekday = day.weekday();
        if self.by_weekday.contains(&weekday) {
            return true;
        }

        let (position, len) = match self.nth_scope {
            NthScope::Month => (
                date_day(day),
                date_len(days_in_month(day.year(), day.month())),
            ),
            NthScope::Year => (date_ordinal(day), date_len(days_in_year(day.year()))),
        };
        let forward = (position - 1) / 7 + 1;
        let backward = (len - position) / 7 + 1;

        self.by_nth_weekday.iter().any(|(n, wd)| {
            *wd == weekday && ((*n > 0 && *n == forward) || (*n < 0 && -*n == backward))
        })
    }

    /// ISO 8601 week numbers, whatever WKST says.
    fn weekno_matches(&self, day: NaiveDate) -> bool {
        let iso = day.iso_week();
        let week = i32::try_from(iso.week()).unwrap_or(0);
        let weeks_in_year =
            if NaiveDate::from_isoywd_opt(iso.year(), 53, chrono::Weekday::Mon).is_some() {
                53
            } else {
                52
            };
        self.by_weekno
            .iter()
            .any(|n| signed_position_matches(*n, week, weeks_in_year))
    }

    fn apply_setpos(&self, set: Vec<NaiveDateTime>) -> Vec<NaiveDateTime> {
        if self.by_setpos.is_empty() || set.is_empty() {
            return set;
        }
        let len = i64::try_from(set.len()).unwrap_or(i64::MAX);
        let picked = self
            .by_setpos
            .iter()
            .filter_map(|pos| {
                let pos = i64::from(*pos);
                let index = if pos > 0 { pos - 1 } else { len + pos };
                usize::try_from(index).ok().and_then(|i| set.get(i).copied())
            })
            .collect();
        sorted(picked)
    }

    /// Index of the first period that starts on or after the day following `start`.
    fn next_day_index(&self, start: NaiveDateTime) -> Option<u64> {
        let midnight = start.date().succ_opt()?.and_time(NaiveTime::MIN);
        let index = self.period_index_of(midnight);
        match self.period_start(index) {
            Some(period) if period < midnight => Some(index + 1),
            _ => Some(index),
        }
    }
}

/// Start of period 0 for a rule anchored at `dtstart`.
fn period_anchor(freq: Frequency, dtstart: NaiveDateTime, wkst: chrono::Weekday) -> NaiveDateTime {
    let date = dtstart.date();
    match freq {
        Frequency::Yearly => date.with_ordinal(1).unwrap_or(date).and_time(NaiveTime::MIN),
        Frequency::Monthly => date.with_day(1).unwrap_or(date).and_time(NaiveTime::MIN),
        Frequency::Weekly => {
            let back = (7 + date.weekday().num_days_from_monday() - wkst.num_days_from_monday()) % 7;
            (date - Duration::days(i64::from(back))).and_time(NaiveTime::MIN)
        }
        Frequency::Daily => date.and_time(NaiveTime::MIN),
        Frequency::Hourly => dtstart
            .with_minute(0)
            .and_then(|dt| dt.with_second(0))
            .unwrap_or(dtstart),
        Frequency::Minutely => dtstart.with_second(0).unwrap_or(dtstart),
        Frequency::Secondly => dtstart,
    }
}

/// Matches a 1-based position counted from the front (`n > 0`) or back (`n < 0`).
fn signed_position_matches(n: i32, position: i32, len: i32) -> bool {
    if n > 0 { n == position } else { len + n + 1 == position }
}

fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    if year > MAX_YEAR {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    match (
        NaiveDate::from_ymd_opt(year, month, 1),
        NaiveDate::from_ymd_opt(next_year, next_month, 1),
    ) {
        (Some(first), Some(next)) => u32::try_from((next - first).num_days()).unwrap_or(31),
        _ => 31,
    }
}

fn days_in_year(year: i32) -> u32 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() { 366 } else { 365 }
}

#[expect(
    clippy::cast_possible_wrap,
    reason = "Calendar positions are at most 366"
)]
const fn date_len(len: u32) -> i32 {
    len as i32
}

fn date_day(day: NaiveDate) -> i32 {
    date_len(day.day())
}

fn date_ordinal(day: NaiveDate) -> i32 {
    date_len(day.ordinal())
}

/// Lazy, restartable walk over a rule's wall-clock candidates.
#[derive(Debug, Clone)]
pub struct CandidateIter<'a> {
    expansion: &'a Expansion,
    next_index: u64,
    buffer: VecDeque<NaiveDateTime>,
    empty_run: u32,
    max_empty_periods: u32,
    periods_visited: u64,
    exhausted: bool,
}

impl CandidateIter<'_> {
    /// Number of periods expanded so far.
    #[must_use]
    pub const fn periods_visited(&self) -> u64 {
        self.periods_visited
    }

    /// Jumps forward to the period containing `target` without expanding the
    /// periods in between. Never moves backwards.
    pub fn seek(&mut self, target: NaiveDateTime) {
        let index = self.expansion.period_index_of(target);
        if index >= self.next_index {
            tracing::trace!(from = self.next_index, to = index, "Seeking candidate cursor");
            self.buffer.clear();
            self.next_index = index;
            self.empty_run = 0;
        }
    }

    fn fill_next_period(&mut self) {
        let Some(start) = self.expansion.period_start(self.next_index) else {
            tracing::trace!(index = self.next_index, "Candidate cursor left the calendar range");
            self.exhausted = true;
            return;
        };
        self.periods_visited += 1;

        let fixed = self.expansion.freq.fixed_seconds().is_some();
        if fixed && !self.expansion.day_matches(start.date()) {
            // Sub-daily periods share their day filter, skip the rest of the day
            self.next_index = self
                .expansion
                .next_day_index(start)
                .map_or(u64::MAX, |index| index.max(self.next_index + 1));
            self.record_empty();
            return;
        }
        self.next_index += 1;

        let dtstart = self.expansion.dtstart;
        let candidates: Vec<NaiveDateTime> = self
            .expansion
            .expand_period(start)
            .into_iter()
            .filter(|candidate| *candidate >= dtstart)
            .collect();

        if candidates.is_empty() {
            self.record_empty();
        } else {
            self.empty_run = 0;
            self.buffer.extend(candidates);
        }
    }

    fn record_empty(&mut self) {
        self.empty_run += 1;
        if self.empty_run >= self.max_empty_periods {
            tracing::warn!(
                empty_periods = self.empty_run,
                freq = %self.expansion.freq,
                "Recurrence produced no candidates for too long, stopping"
            );
            self.exhausted = true;
        }
    }
}

impl Iterator for CandidateIter<'_> {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(candidate) = self.buffer.pop_front() {
                return Some(candidate);
            }
            if self.exhausted {
                return None;
            }
            self.fill_next_period();
        }
    }
}
