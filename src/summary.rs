//! Daily weather summaries
//!
//! Each day's hours are run-length encoded into a few segments. Consecutive hours
//! join the open segment when their weather codes are considered alike; the
//! segment then carries the worse (numerically larger) code. Two time-of-day rules
//! keep the night from fragmenting the summary: a short pre-dawn segment is thrown
//! away when the weather changes again before 06:00, and late-night hours always
//! join a segment founded at or after 22:00.

use hashlink::LinkedHashMap;

use crate::data::{
    DailyAggregate, Day, DaySummary, HourlySample, Segment, Timestamp, WeatherCode,
    WeatherOverview,
};

/// WMO codes that merge with each other regardless of leading digit
///
/// Group A runs from clear sky to overcast, group B is the drizzle/rain/shower family.
pub const SIMILARITY_GROUPS: [&[WeatherCode]; 2] = [
    &[0, 1, 2, 3],
    &[51, 53, 55, 56, 57, 61, 63, 65, 66, 67, 80, 81, 82],
];

/// Last hour (inclusive) an incoming sample may have for the pre-dawn drop
const PRE_DAWN_LAST_HOUR: u32 = 6;
/// Segments founded before this hour count as pre-dawn
const PRE_DAWN_FOUNDED_BEFORE: u32 = 6;
/// Incoming samples after this hour count as late night
const LATE_NIGHT_AFTER: u32 = 22;
/// Segments founded at or after this hour count as late night
const LATE_NIGHT_FOUNDED_FROM: u32 = 22;

/// What happens to the open segment when the next hour arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Same code: the segment just grows
    Extend,
    /// Alike code: the segment grows and keeps the worse code
    ExtendWorse,
    /// Pre-dawn change: the open segment is discarded and a new one opens
    Drop,
    /// Anything else: the open segment is closed and a new one opens
    Split,
}

/// Segments of one day plus the number of hours dropped by the pre-dawn rule
#[derive(Debug, Clone, PartialEq)]
pub struct DayCompression {
    pub segments: Vec<Segment>,
    pub dropped_hours: u32,
}

/// First character of the decimal representation, used as a coarse code family
///
/// For two-digit WMO codes this equals `code / 10`; `5` and `51` share a family.
fn leading_char(code: WeatherCode) -> Option<char> {
    code.to_string().chars().next()
}

fn same_family(a: WeatherCode, b: WeatherCode) -> bool {
    leading_char(a) == leading_char(b)
}

fn same_group(a: WeatherCode, b: WeatherCode) -> bool {
    SIMILARITY_GROUPS
        .iter()
        .any(|group| group.contains(&a) && group.contains(&b))
}

/// Decides how an incoming hour affects the open segment
///
/// Rules are tried in order and the first match wins.
pub fn classify(open: &Segment, time: Timestamp, code: WeatherCode) -> Step {
    if code == open.weather_code {
        return Step::Extend;
    }
    if same_family(code, open.weather_code) || same_group(code, open.weather_code) {
        return Step::ExtendWorse;
    }

    let hour = time.hour();
    let founded = open.start_time.hour();
    if hour <= PRE_DAWN_LAST_HOUR && founded < PRE_DAWN_FOUNDED_BEFORE {
        Step::Drop
    } else if hour > LATE_NIGHT_AFTER && founded >= LATE_NIGHT_FOUNDED_FROM {
        Step::ExtendWorse
    } else {
        Step::Split
    }
}

/// Compresses one day's hours, given in chronological order
///
/// The open segment is always the last entry of the list, so dropping it is a pop.
/// After a drop the incoming hour founds the next open segment.
pub fn compress_day<'a>(
    day: &DailyAggregate,
    hours: impl IntoIterator<Item = (&'a Timestamp, &'a HourlySample)>,
) -> DayCompression {
    let mut segments: Vec<Segment> = Vec::new();
    let mut dropped_hours = 0;

    for (&time, sample) in hours {
        let Some(open) = segments.last_mut() else {
            segments.push(Segment::found(time, sample, day));
            continue;
        };

        match classify(open, time, sample.weather_code) {
            Step::Extend => open.arrow_length += 1,
            Step::ExtendWorse => {
                open.weather_code = open.weather_code.max(sample.weather_code);
                open.arrow_length += 1;
            }
            Step::Drop => {
                if let Some(dropped) = segments.pop() {
                    tracing::trace!(
                        start = %dropped.start_time,
                        hours = dropped.arrow_length,
                        "Dropping pre-dawn segment"
                    );
                    dropped_hours += dropped.arrow_length;
                }
                segments.push(Segment::found(time, sample, day));
            }
            Step::Split => segments.push(Segment::found(time, sample, day)),
        }
    }

    DayCompression {
        segments,
        dropped_hours,
    }
}

/// Summarizes every day of an overview
///
/// Days come out in the order of `overview.daily`; each day's summary maps a
/// segment's start time to the segment. Hours whose date has no daily entry are
/// not summarized.
pub fn summarize(overview: &WeatherOverview) -> LinkedHashMap<Day, DaySummary> {
    let (summaries, orphaned) = summarize_days(overview);
    if orphaned > 0 {
        tracing::debug!(
            hours = orphaned,
            "Hours without a daily entry left out of summaries"
        );
    }
    summaries
}

/// Summaries plus the number of hours that matched no day
fn summarize_days(overview: &WeatherOverview) -> (LinkedHashMap<Day, DaySummary>, usize) {
    let mut hours_by_day: LinkedHashMap<Day, Vec<(&Timestamp, &HourlySample)>> =
        LinkedHashMap::new();
    for (time, sample) in &overview.hourly {
        hours_by_day
            .entry(time.day())
            .or_insert_with(Vec::new)
            .push((time, sample));
    }

    let summaries: LinkedHashMap<Day, DaySummary> = overview
        .daily
        .iter()
        .map(|(day, aggregate)| {
            let hours = hours_by_day.remove(day).unwrap_or_default();
            let compression = compress_day(aggregate, hours);
            tracing::debug!(
                %day,
                segments = compression.segments.len(),
                dropped = compression.dropped_hours,
                "Summarized day"
            );
            let summary: DaySummary = compression
                .segments
                .into_iter()
                .map(|segment| (segment.start_time, segment))
                .collect();
            (*day, summary)
        })
        .collect();

    let orphaned: usize = hours_by_day.values().map(Vec::len).sum();
    (summaries, orphaned)
}
