// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for offset resolution and zone conversion.

mod common;

use std::sync::Arc;

use aimcal_recur::{
    CalendarTime, Frequency, Observance, RecurrenceRule, Timezone, TimezoneDefinition, UtcOffset,
    Zone, registry,
};

use common::{collect, collect_all, new_york, new_york_definition};

fn registered_new_york() -> Zone {
    let tz = registry::get("America/New_York").unwrap_or_else(|| registry::register(new_york()));
    Zone::Tz(tz)
}

#[test]
fn timezone_resolves_offsets_around_transitions() {
    let tz = new_york();
    let at = |month, day, hour, minute| {
        tz.utc_offset(&CalendarTime::datetime(2024, month, day, hour, minute, 0))
    };
    assert_eq!(at(3, 10, 1, 59), -18_000);
    assert_eq!(at(3, 10, 3, 0), -14_400);
    assert_eq!(at(11, 3, 0, 59), -14_400);
    // The repeated hour resolves to standard time
    assert_eq!(at(11, 3, 1, 30), -18_000);
    assert_eq!(at(11, 3, 2, 0), -18_000);
}

#[test]
fn timezone_lists_transitions_up_to_a_year() {
    let tz = new_york();
    let transitions: Vec<_> = tz
        .transitions(2024)
        .into_iter()
        .filter(|t| t.time().year() == 2024)
        .collect();
    let instants: Vec<String> = transitions.iter().map(|t| t.time().to_string()).collect();
    assert_eq!(instants, vec!["20240310T070000Z", "20241103T060000Z"]);
    assert!(transitions[0].is_daylight);
    assert_eq!(transitions[1].prev_utc_offset, -14_400);
}

#[test]
fn timezone_converts_between_zones() {
    let ny = registered_new_york();
    let noon = CalendarTime::datetime(2024, 7, 1, 12, 0, 0).with_zone(ny.clone());
    let utc = noon.convert_to_zone(&Zone::Utc);
    assert_eq!(utc.to_string(), "20240701T160000Z");
    assert_eq!(utc, noon);

    let back = utc.convert_to_zone(&ny);
    assert_eq!(back.hour(), 12);
    assert_eq!(back.zone().tzid(), Some("America/New_York"));
}

#[test]
fn timezone_keeps_wall_clock_of_occurrences_across_transition() {
    let ny = registered_new_york();
    let rule = RecurrenceRule::builder(Frequency::Daily).count(3).build().unwrap();
    let start = CalendarTime::datetime(2024, 3, 9, 9, 0, 0).with_zone(ny);
    let occurrences: Vec<CalendarTime> = rule.iterator(&start).map(Result::unwrap).collect();

    let local: Vec<String> = occurrences.iter().map(ToString::to_string).collect();
    assert_eq!(local, vec!["20240309T090000", "20240310T090000", "20240311T090000"]);

    let utc = collect(
        occurrences.iter().map(|t| Ok(t.convert_to_zone(&Zone::Utc))),
        3,
    );
    assert_eq!(utc, vec!["20240309T140000Z", "20240310T130000Z", "20240311T130000Z"]);

    let elapsed = occurrences[1].subtract_date_tz(&occurrences[0]);
    assert_eq!(elapsed.to_seconds(), 23 * 3600);
    let wall = occurrences[1].subtract_date(&occurrences[0]);
    assert_eq!(wall.to_seconds(), 24 * 3600);
}

#[test]
fn timezone_resolves_serialized_tzid_through_registry() {
    let ny = registered_new_york();
    let time = CalendarTime::datetime(2024, 1, 15, 8, 30, 0).with_zone(ny);
    let json = serde_json::to_string(&time).unwrap();
    assert!(json.contains("America/New_York"));

    let restored: CalendarTime = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.zone().tzid(), Some("America/New_York"));
    assert_eq!(restored.utc_offset(), -18_000);
    assert_eq!(restored, time);
}

#[test]
fn timezone_degrades_unknown_tzid_to_floating() {
    let json = r#"{"year":2024,"month":1,"day":15,"hour":8,"tzid":"Nowhere/Unknown"}"#;
    let restored: CalendarTime = serde_json::from_str(json).unwrap();
    assert!(restored.zone().is_floating());
    assert_eq!(restored.utc_offset(), 0);
}

#[test]
fn timezone_definition_survives_serialization() {
    let json = serde_json::to_string(&new_york_definition()).unwrap();
    let definition: TimezoneDefinition = serde_json::from_str(&json).unwrap();
    assert_eq!(definition, new_york_definition());

    let tz = Arc::new(Timezone::new(definition));
    let summer = CalendarTime::datetime(2030, 7, 1, 12, 0, 0).with_zone(Zone::from(tz));
    assert_eq!(summer.utc_offset(), -14_400);
}

#[test]
fn timezone_without_observances_has_zero_offset() {
    let tz = Timezone::new(TimezoneDefinition::new("Etc/Empty"));
    assert_eq!(tz.utc_offset(&CalendarTime::datetime(2024, 6, 1, 0, 0, 0)), 0);
    assert!(tz.transitions(2024).is_empty());
}

#[test]
fn timezone_keeps_local_occurrences_before_utc_until_across_new_year() {
    let plus_two = Timezone::new(TimezoneDefinition::new("Test/Plus2").with_standard(
        Observance::new(
            CalendarTime::datetime(2000, 1, 1, 0, 0, 0),
            UtcOffset::hm(2, 0),
            UtcOffset::hm(2, 0),
        ),
    ));
    let rule = RecurrenceRule::builder(Frequency::Daily)
        .until(CalendarTime::datetime(2024, 12, 31, 23, 30, 0).utc())
        .build()
        .unwrap();
    let start = CalendarTime::datetime(2024, 12, 30, 1, 0, 0).with_zone(Zone::from(plus_two));
    assert_eq!(
        collect_all(rule.iterator(&start)),
        vec!["20241230T010000", "20241231T010000", "20250101T010000"]
    );
}
