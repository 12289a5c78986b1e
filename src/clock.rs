/*
 *  NitroVote - Discord bot tracking monthly Veil votes and Nitro rewards.
 *  Copyright (C) 2025  NitroVote contributors
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */
use crate::ranking::RankError;
use chrono::{
    DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Offset, TimeDelta, TimeZone, Utc,
};
use chrono_tz::Tz;
use getset::CopyGetters;
use std::fmt;

/// Half-open interval of absolute instants, `[start, end)`.
///
/// Windows can only be built with `start < end`, so every consumer may rely on a non-empty range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, CopyGetters)]
pub struct TimeWindow {
    /// First instant included in the window.
    #[getset(get_copy = "pub")]
    start: DateTime<Utc>,
    /// First instant after the window.
    #[getset(get_copy = "pub")]
    end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<TimeWindow, RankError> {
        if start >= end {
            return Err(RankError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

/**
 * Calendar-month arithmetic anchored to a named civil timezone.
 *
 * Month boundaries are civil midnights of day 1 in the anchor zone, converted to UTC with the
 * zone's own DST table (never a fixed offset).
 */
#[derive(Clone, Copy, Debug)]
pub struct MonthClock {
    tz: Tz,
}

impl MonthClock {
    pub fn new(tz: Tz) -> MonthClock {
        Self { tz }
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Window of the calendar month `now` falls in, as seen from the anchor zone.
    ///
    /// In the last representable month the window ends at `DateTime::<Utc>::MAX_UTC`.
    pub fn current_month<Z: TimeZone>(&self, now: &DateTime<Z>) -> TimeWindow {
        let first = self.first_of_month(now);
        // Consecutive civil midnights are strictly increasing instants in every zone.
        TimeWindow {
            start: civil_midnight_utc(&self.tz, first),
            end: first
                .checked_add_months(Months::new(1))
                .map_or(DateTime::<Utc>::MAX_UTC, |next| {
                    civil_midnight_utc(&self.tz, next)
                }),
        }
    }

    /// Window of the calendar month before the one `now` falls in. Its end is always the start of
    /// `current_month(now)`.
    ///
    /// In the first representable month the window starts at `DateTime::<Utc>::MIN_UTC`.
    pub fn previous_month<Z: TimeZone>(&self, now: &DateTime<Z>) -> TimeWindow {
        let first = self.first_of_month(now);
        TimeWindow {
            start: first
                .checked_sub_months(Months::new(1))
                .map_or(DateTime::<Utc>::MIN_UTC, |prev| {
                    civil_midnight_utc(&self.tz, prev)
                }),
            end: civil_midnight_utc(&self.tz, first),
        }
    }

    pub fn current_month_now(&self) -> TimeWindow {
        self.current_month(&Utc::now())
    }

    pub fn previous_month_now(&self) -> TimeWindow {
        self.previous_month(&Utc::now())
    }

    /**
     * Formats the start of a window in the anchor zone, e.g. `"%B"` gives "March".
     */
    pub fn label(&self, window: &TimeWindow, fmt: &str) -> String {
        self.format(window.start(), fmt)
    }

    pub fn format(&self, instant: DateTime<Utc>, fmt: &str) -> String {
        instant.with_timezone(&self.tz).format(fmt).to_string()
    }

    fn first_of_month<Z: TimeZone>(&self, now: &DateTime<Z>) -> NaiveDate {
        let date = now.with_timezone(&self.tz).date_naive();
        date - Days::new(u64::from(date.day0()))
    }
}

/**
 * Resolves 00:00 of `date` in `tz` to an absolute instant.
 *
 * A midnight repeated by a backward transition resolves to its earliest occurrence. A midnight
 * skipped by a forward transition resolves to the transition itself, which is the first instant
 * whose civil date is `date`.
 */
fn civil_midnight_utc(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    if let Some(instant) = tz.from_local_datetime(&midnight).earliest() {
        return instant.with_timezone(&Utc);
    }

    let before = tz
        .offset_from_utc_datetime(&(midnight - TimeDelta::days(1)))
        .fix();
    Utc.from_utc_datetime(&(midnight - TimeDelta::seconds(i64::from(before.local_minus_utc()))))
}
