//! End-to-end tests of the overview pipeline on a saved Open-Meteo response
//!
//! The fixture covers two days at Vancouver. Day one mixes clear, fog, rain and
//! snow hours; day two is partly cloudy throughout.

use wxdigest::data::{Day, EnhancedOverview, RawForecast, Timestamp};
use wxdigest::{build_overview, DetailLevel, Overview};

const FIXTURE: &str = include_str!("fixtures/forecast.json");

fn raw() -> RawForecast {
    serde_json::from_str(FIXTURE).expect("Fixture should parse")
}

fn enhanced() -> EnhancedOverview {
    match build_overview(raw(), DetailLevel::Enhanced).expect("Fixture should build") {
        Overview::Enhanced(overview) => overview,
        other => panic!("Expected enhanced overview, got {:?}", other),
    }
}

fn day(s: &str) -> Day {
    Day::parse(s).unwrap()
}

fn ts(s: &str) -> Timestamp {
    Timestamp::parse(s).unwrap()
}

#[test]
fn test_first_day_segments() {
    let overview = enhanced();
    let summary = &overview.daily[&day("2024-07-15")].summary;

    let segments: Vec<(String, i32, u32)> = summary
        .values()
        .map(|s| (s.start_time.to_string(), s.weather_code, s.arrow_length))
        .collect();

    assert_eq!(
        segments,
        vec![
            // 00:00-04:00 clear to partly cloudy, dropped when fog rolls in at 05:00
            ("2024-07-15T05:00".to_string(), 45, 2),
            ("2024-07-15T07:00".to_string(), 3, 5),
            ("2024-07-15T12:00".to_string(), 81, 4),
            ("2024-07-15T16:00".to_string(), 3, 6),
            // 23:00 snow joins the 22:00 fog segment
            ("2024-07-15T22:00".to_string(), 71, 2),
        ]
    );

    // Keys and start times agree
    for (key, segment) in summary {
        assert_eq!(*key, segment.start_time);
    }
}

#[test]
fn test_segment_values_come_from_day_and_founding_hour() {
    let overview = enhanced();
    let rain = &overview.daily[&day("2024-07-15")].summary[&ts("2024-07-15T12:00")];

    assert!((rain.temperature_2m_max - 22.0).abs() < 0.01);
    assert!((rain.temperature_2m_min - 14.0).abs() < 0.01);
    assert!((rain.precipitation_probability - 60.0).abs() < 0.01);
    assert!((rain.precipitation - 0.4).abs() < 0.01);
    assert!((rain.showers - 0.0).abs() < 0.01);
}

#[test]
fn test_uniform_second_day_is_single_segment() {
    let overview = enhanced();
    let summary = &overview.daily[&day("2024-07-16")].summary;

    assert_eq!(summary.len(), 1);
    let segment = &summary[&ts("2024-07-16T00:00")];
    assert_eq!(segment.weather_code, 2);
    assert_eq!(segment.arrow_length, 24);
}

#[test]
fn test_summary_properties_hold_for_every_day() {
    let overview = enhanced();

    for (day_key, day) in &overview.daily {
        let hours: Vec<&Timestamp> = overview
            .hourly
            .keys()
            .filter(|t| t.day() == *day_key)
            .collect();
        let starts: Vec<&Timestamp> = day.summary.keys().collect();

        assert!(starts.windows(2).all(|w| w[0] < w[1]), "{} not ordered", day_key);
        assert!(starts.iter().all(|s| hours.contains(s)), "{} has foreign start", day_key);

        let covered: u32 = day.summary.values().map(|s| s.arrow_length).sum();
        assert!(covered as usize <= hours.len());
    }
}

#[test]
fn test_current_wind_is_beaufort_scaled() {
    // 12.5 km/h is about 3.47 m/s
    assert_eq!(enhanced().current.beaufort_wind_scale, 3);
}

#[test]
fn test_plain_overview_json_matches_upstream_records() {
    let overview = build_overview(raw(), DetailLevel::Plain).unwrap();
    let json = serde_json::to_value(&overview).unwrap();

    assert_eq!(json["hourly"].as_object().unwrap().len(), 48);
    assert_eq!(json["hourly"]["2024-07-15T23:00"]["snowfall"], 0.7);
    assert_eq!(json["daily"]["2024-07-16"]["sunrise"], "2024-07-16T05:31");
    assert_eq!(json["hourly_units"]["precipitation_probability"], "%");
    assert!(json["daily"]["2024-07-15"].get("summary").is_none());
}

#[test]
fn test_pipeline_is_deterministic() {
    let first = serde_json::to_string(&enhanced()).unwrap();
    let second = serde_json::to_string(&enhanced()).unwrap();
    assert_eq!(first, second);
}
