// Copyright (C) 2017 Hove and/or its affiliates.
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by the
// Free Software Foundation, version 3.

// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more
// details.

// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>

use pretty_assertions::assert_eq;
use transit_feed::objects::{Date, Time};
use transit_feed::Dataset;

const FIXTURE: &str = "tests/fixtures/minimal_feed";

fn date(year: i32, month: u32, day: u32) -> Date {
    Date::from_ymd_opt(year, month, day).unwrap()
}

fn time(s: &str) -> Time {
    s.parse().unwrap()
}

fn load() -> Dataset {
    Dataset::load("minimal", FIXTURE, None::<&str>).unwrap()
}

#[test]
fn tables_are_loaded() {
    let dataset = load();
    assert_eq!("minimal", dataset.name);
    assert_eq!(1, dataset.agencies().len());
    assert_eq!(2, dataset.routes().len());
    assert_eq!(3, dataset.schedules().len());
    assert_eq!(4, dataset.stops().len());
    assert_eq!(vec!["T1", "T2", "T3", "T4"], dataset.trip_ids());

    let feed = dataset.feed.as_ref().unwrap();
    assert_eq!("Transit Co", feed.publisher_name);
    assert_eq!(Some(date(2024, 1, 1)), feed.start_date);

    assert_eq!("AG1", dataset.find_agency("Test Transit").unwrap().id);
    assert_eq!("SC", dataset.find_stop("Harbourfront").unwrap().id);
    assert_eq!("Airport Express", dataset.route("R2").unwrap().name());
}

#[test]
fn trips_on_a_weekday() {
    // 2024-01-02 is a Tuesday
    let dataset = load().on_date(date(2024, 1, 2));
    assert_eq!(vec!["T1", "T3"], dataset.trip_ids());
}

#[test]
fn trips_on_an_added_saturday() {
    // 2024-01-06 is a Saturday, added to the weekday service by exception
    let dataset = load().on_date(date(2024, 1, 6));
    assert_eq!(vec!["T1", "T2", "T3"], dataset.trip_ids());
}

#[test]
fn trips_on_a_removed_holiday() {
    // 2024-01-01 is a Monday, removed from the weekday service by exception
    let dataset = load().on_date(date(2024, 1, 1));
    assert!(dataset.trip_ids().is_empty());
}

#[test]
fn trips_of_an_exception_only_service() {
    // 2024-02-15 is a Thursday; XTRA runs on that single date
    let dataset = load().on_date(date(2024, 2, 15));
    assert_eq!(vec!["T1", "T3", "T4"], dataset.trip_ids());

    let extra = dataset.schedule("XTRA").unwrap();
    assert_eq!(None, extra.first_date());
    assert_eq!(None, extra.last_date());
}

#[test]
fn connecting_trips_follow_travel_direction() {
    let dataset = load();
    assert_eq!(vec!["T1"], dataset.connecting("SA", "SB").trip_ids());
    assert_eq!(vec!["T2"], dataset.connecting("SB", "SA").trip_ids());
    assert_eq!(vec!["T3"], dataset.connecting("SA", "SD").trip_ids());
}

#[test]
fn trips_on_a_route() {
    let dataset = load();
    assert_eq!(vec!["T1", "T2"], dataset.on_route("R1").trip_ids());
    assert_eq!(vec!["T3", "T4"], dataset.on_route("R2").trip_ids());
}

#[test]
fn trips_in_a_time_window() {
    let dataset = load();
    let morning = dataset.between(time("09:00:00"), time("10:00:00"));
    assert_eq!(vec!["T2", "T4"], morning.trip_ids());
}

#[test]
fn queries_chain_as_intersections() {
    // Saturday, route R1, leaving SB towards SA: only the weekend return trip
    let dataset = load()
        .on_date(date(2024, 1, 6))
        .on_route("R1")
        .connecting("SB", "SA");
    assert_eq!(vec!["T2"], dataset.trip_ids());
}

#[test]
fn after_midnight_times_keep_their_service_date() {
    let dataset = load();
    let last_visit = dataset.trip("T3").unwrap().timetable.end().clone();
    assert_eq!("SD", last_visit.stop_id);
    assert!(last_visit.ends_next_day());
    assert_eq!(
        "01:10:00",
        last_visit.end_time().unwrap().time_of_day().to_string()
    );
    assert_eq!("25:10:00", last_visit.end_time().unwrap().to_string());
}

#[test]
fn snapshot_short_circuits_the_raw_parse() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let snapshot_path = tmp_dir.path().join("minimal.json");

    let parsed = Dataset::load("minimal", FIXTURE, Some(&snapshot_path)).unwrap();
    assert!(snapshot_path.exists());

    // the source is gone but the snapshot still answers
    let cached = Dataset::load("minimal", "no/such/feed", Some(&snapshot_path)).unwrap();
    assert_eq!(parsed, cached);
    assert_eq!(
        vec!["T1", "T3"],
        cached.on_date(Date::from_ymd_opt(2024, 1, 2).unwrap()).trip_ids()
    );
}
