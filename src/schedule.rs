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

//! Resolution of `calendar.txt` and `calendar_dates.txt` into one
//! [`Schedule`] per service, able to answer whether the service runs on a
//! given date.

use crate::file_handler::FileHandler;
use crate::objects::{Date, ExceptionType};
use crate::parser::read_objects;
use crate::serde_utils::*;
use crate::Result;
use anyhow::bail;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use typed_index_collection::{CollectionWithId, Id};

#[derive(Deserialize, Debug)]
struct Calendar {
    service_id: String,
    #[serde(deserialize_with = "de_from_u8")]
    monday: bool,
    #[serde(deserialize_with = "de_from_u8")]
    tuesday: bool,
    #[serde(deserialize_with = "de_from_u8")]
    wednesday: bool,
    #[serde(deserialize_with = "de_from_u8")]
    thursday: bool,
    #[serde(deserialize_with = "de_from_u8")]
    friday: bool,
    #[serde(deserialize_with = "de_from_u8")]
    saturday: bool,
    #[serde(deserialize_with = "de_from_u8")]
    sunday: bool,
    #[serde(deserialize_with = "de_from_date_string")]
    start_date: Date,
    #[serde(deserialize_with = "de_from_date_string")]
    end_date: Date,
}

impl Calendar {
    fn weekdays(&self) -> [bool; 7] {
        [
            self.monday,
            self.tuesday,
            self.wednesday,
            self.thursday,
            self.friday,
            self.saturday,
            self.sunday,
        ]
    }
}

#[derive(Deserialize, Debug)]
struct CalendarDate {
    service_id: String,
    #[serde(deserialize_with = "de_from_date_string")]
    date: Date,
    exception_type: ExceptionType,
}

/// An inclusive validity period with a weekly service pattern.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    /// First date of the period
    pub start: Date,
    /// Last date of the period
    pub end: Date,
    /// Days of the week the service runs on, Monday first
    pub weekdays: [bool; 7],
}

impl DateRange {
    /// Whether the date falls within the period, weekday pattern aside.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// The resolved service calendar of one `service_id`: its weekly validity
/// periods and its dated exceptions.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    /// Identifier of the service
    pub id: String,
    /// Validity periods, kept in feed order
    pub ranges: Vec<DateRange>,
    /// Dates the service runs on regardless of the periods
    pub additions: BTreeSet<Date>,
    /// Dates the service is cancelled on regardless of the periods
    pub removals: BTreeSet<Date>,
}

impl Id<Schedule> for Schedule {
    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Schedule {
    /// An empty schedule for the given service: no periods, no exceptions,
    /// never active.
    pub fn new(id: String) -> Self {
        Schedule {
            id,
            ranges: Vec::new(),
            additions: BTreeSet::new(),
            removals: BTreeSet::new(),
        }
    }

    /// Whether the service runs on the date.
    ///
    /// Added dates win over everything, removed dates win over the periods,
    /// then the first period containing the date decides through its weekday
    /// pattern. Periods are examined in feed order; feeds with overlapping
    /// periods for one service get the first match, not a guaranteed
    /// combination.
    pub fn active(&self, date: Date) -> bool {
        if self.additions.contains(&date) {
            return true;
        }
        if self.removals.contains(&date) {
            return false;
        }
        self.ranges
            .iter()
            .find(|range| range.contains(date))
            .map_or(false, |range| {
                range.weekdays[date.weekday().num_days_from_monday() as usize]
            })
    }

    /// First date covered by a validity period; `None` for exception-only
    /// services.
    pub fn first_date(&self) -> Option<Date> {
        self.ranges.iter().map(|range| range.start).min()
    }

    /// Last date covered by a validity period; `None` for exception-only
    /// services.
    pub fn last_date(&self) -> Option<Date> {
        self.ranges.iter().map(|range| range.end).max()
    }
}

/// Reads both calendar files and resolves them into one [`Schedule`] per
/// service; a service appearing only in `calendar_dates.txt` gets an
/// exception-only schedule.
pub fn read_schedules<H>(file_handler: &mut H) -> Result<CollectionWithId<Schedule>>
where
    for<'a> &'a mut H: FileHandler,
{
    let calendars: Vec<Calendar> = read_objects(file_handler, "calendar.txt", false)?;
    let calendar_dates: Vec<CalendarDate> =
        read_objects(file_handler, "calendar_dates.txt", false)?;
    if calendars.is_empty() && calendar_dates.is_empty() {
        bail!("calendar_dates.txt or calendar.txt not found");
    }

    let mut schedules = BTreeMap::<String, Schedule>::new();
    for calendar in calendars {
        let schedule = schedules
            .entry(calendar.service_id.clone())
            .or_insert_with(|| Schedule::new(calendar.service_id.clone()));
        schedule.ranges.push(DateRange {
            start: calendar.start_date,
            end: calendar.end_date,
            weekdays: calendar.weekdays(),
        });
    }
    for calendar_date in calendar_dates {
        let schedule = schedules
            .entry(calendar_date.service_id.clone())
            .or_insert_with(|| Schedule::new(calendar_date.service_id.clone()));
        match calendar_date.exception_type {
            ExceptionType::Add => {
                schedule.additions.insert(calendar_date.date);
            }
            ExceptionType::Remove => {
                schedule.removals.insert(calendar_date.date);
            }
        }
    }
    Ok(CollectionWithId::new(
        schedules.into_iter().map(|(_, schedule)| schedule).collect(),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_handler::PathFileHandler;
    use crate::test_utils::create_file_with_content;
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> Date {
        Date::from_ymd_opt(year, month, day).unwrap()
    }

    fn weekday_schedule() -> Schedule {
        let mut schedule = Schedule::new("WKDY".to_string());
        schedule.ranges.push(DateRange {
            start: date(2024, 1, 1),
            end: date(2024, 6, 30),
            weekdays: [true, true, true, true, true, false, false],
        });
        // 2024-01-06 is a Saturday, 2024-01-01 a Monday
        schedule.additions.insert(date(2024, 1, 6));
        schedule.removals.insert(date(2024, 1, 1));
        schedule
    }

    #[test]
    fn weekday_pattern_inside_range() {
        let schedule = weekday_schedule();
        assert!(schedule.active(date(2024, 1, 2))); // Tuesday
        assert!(!schedule.active(date(2024, 1, 7))); // Sunday
    }

    #[test]
    fn added_date_overrides_weekday_pattern() {
        let schedule = weekday_schedule();
        assert!(schedule.active(date(2024, 1, 6))); // added Saturday
    }

    #[test]
    fn removed_date_overrides_range() {
        let schedule = weekday_schedule();
        assert!(!schedule.active(date(2024, 1, 1))); // removed Monday
    }

    #[test]
    fn outside_every_range() {
        let schedule = weekday_schedule();
        assert!(!schedule.active(date(2024, 7, 1))); // Monday after the range
    }

    #[test]
    fn first_containing_range_decides() {
        let mut schedule = Schedule::new("S".to_string());
        schedule.ranges.push(DateRange {
            start: date(2024, 1, 1),
            end: date(2024, 12, 31),
            weekdays: [false; 7],
        });
        schedule.ranges.push(DateRange {
            start: date(2024, 1, 1),
            end: date(2024, 12, 31),
            weekdays: [true; 7],
        });
        // the first period already contains the date, the second is not consulted
        assert!(!schedule.active(date(2024, 3, 4)));
    }

    #[test]
    fn exception_only_service_has_no_dates() {
        let mut schedule = Schedule::new("XTRA".to_string());
        schedule.additions.insert(date(2024, 2, 15));
        assert!(schedule.active(date(2024, 2, 15)));
        assert!(!schedule.active(date(2024, 2, 16)));
        assert_eq!(None, schedule.first_date());
        assert_eq!(None, schedule.last_date());
    }

    #[test]
    fn schedule_bounds() {
        let mut schedule = weekday_schedule();
        schedule.ranges.push(DateRange {
            start: date(2024, 7, 1),
            end: date(2024, 12, 31),
            weekdays: [false, false, false, false, false, true, true],
        });
        assert_eq!(Some(date(2024, 1, 1)), schedule.first_date());
        assert_eq!(Some(date(2024, 12, 31)), schedule.last_date());
    }

    #[test]
    fn read_from_both_files() {
        let tmp_dir = tempfile::tempdir().unwrap();
        create_file_with_content(
            tmp_dir.path(),
            "calendar.txt",
            "service_id,monday,tuesday,wednesday,thursday,friday,saturday,sunday,start_date,end_date\n\
             WKDY,1,1,1,1,1,0,0,20240101,20240630",
        );
        create_file_with_content(
            tmp_dir.path(),
            "calendar_dates.txt",
            "service_id,date,exception_type\n\
             WKDY,20240106,1\n\
             WKDY,20240101,2\n\
             XTRA,20240215,1",
        );
        let mut file_handler = PathFileHandler::new(tmp_dir.path().to_path_buf());
        let schedules = read_schedules(&mut file_handler).unwrap();

        assert_eq!(2, schedules.len());
        let weekday = schedules.get("WKDY").unwrap();
        assert_eq!(1, weekday.ranges.len());
        assert!(weekday.active(date(2024, 1, 6)));
        assert!(!weekday.active(date(2024, 1, 1)));

        let extra = schedules.get("XTRA").unwrap();
        assert!(extra.ranges.is_empty());
        assert!(extra.active(date(2024, 2, 15)));
    }

    #[test]
    fn read_with_calendar_dates_only() {
        let tmp_dir = tempfile::tempdir().unwrap();
        create_file_with_content(
            tmp_dir.path(),
            "calendar_dates.txt",
            "service_id,date,exception_type\n\
             XTRA,20240215,1",
        );
        let mut file_handler = PathFileHandler::new(tmp_dir.path().to_path_buf());
        let schedules = read_schedules(&mut file_handler).unwrap();
        assert_eq!(1, schedules.len());
    }

    #[test]
    fn malformed_calendar_date_is_fatal() {
        let tmp_dir = tempfile::tempdir().unwrap();
        create_file_with_content(
            tmp_dir.path(),
            "calendar.txt",
            "service_id,monday,tuesday,wednesday,thursday,friday,saturday,sunday,start_date,end_date\n\
             WKDY,1,1,1,1,1,0,0,20240101,20240630\n\
             BAD,1,1,1,1,1,0,0,2024010X,20240630",
        );
        let mut file_handler = PathFileHandler::new(tmp_dir.path().to_path_buf());
        assert!(read_schedules(&mut file_handler).is_err());
    }

    #[test]
    fn malformed_exception_date_is_fatal() {
        let tmp_dir = tempfile::tempdir().unwrap();
        create_file_with_content(
            tmp_dir.path(),
            "calendar_dates.txt",
            "service_id,date,exception_type\n\
             XTRA,2024-02-15,1",
        );
        let mut file_handler = PathFileHandler::new(tmp_dir.path().to_path_buf());
        assert!(read_schedules(&mut file_handler).is_err());
    }

    #[test]
    fn read_without_any_calendar_file() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let mut file_handler = PathFileHandler::new(tmp_dir.path().to_path_buf());
        let error = read_schedules(&mut file_handler).unwrap_err();
        assert_eq!(
            "calendar_dates.txt or calendar.txt not found",
            error.to_string()
        );
    }
}
