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

//! The records of the transit model and their field-level conventions.
//!
//! Every identified record implements [`Id`] so the tables of a
//! [`Dataset`](crate::Dataset) can be stored as
//! [`CollectionWithId`](typed_index_collection::CollectionWithId).

use crate::serde_utils::*;
use crate::timetable::Timetable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::error;
use typed_index_collection::Id;

/// Calendar date, in the local timezone of the feed.
pub type Date = chrono::NaiveDate;

const SECONDS_PER_DAY: u32 = 86_400;

macro_rules! impl_id {
    ($ty:ty) => {
        impl Id<$ty> for $ty {
            fn id(&self) -> &str {
                &self.id
            }
            fn set_id(&mut self, id: String) {
                self.id = id;
            }
        }
    };
}

/// A time of day relative to midnight of the service date, in seconds.
///
/// GTFS times may exceed `24:00:00` to express stops served after midnight
/// but belonging to the previous day's schedule; such values compare greater
/// than any same-day time and report [`Time::is_next_day`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(u32);

impl Time {
    /// Creates a `Time` from hours, minutes and seconds; hours may be 24 or
    /// more for times past midnight of the service date.
    pub fn new(hours: u32, minutes: u32, seconds: u32) -> Self {
        Time(hours * 3600 + minutes * 60 + seconds)
    }

    /// Hours since midnight of the service date (may be 24 or more).
    pub fn hours(self) -> u32 {
        self.0 / 3600
    }

    /// Minutes within the hour.
    pub fn minutes(self) -> u32 {
        (self.0 % 3600) / 60
    }

    /// Seconds within the minute.
    pub fn seconds(self) -> u32 {
        self.0 % 60
    }

    /// Total number of seconds since midnight of the service date.
    pub fn total_seconds(self) -> u32 {
        self.0
    }

    /// Whether this time falls on the calendar day after the service date.
    pub fn is_next_day(self) -> bool {
        self.0 >= SECONDS_PER_DAY
    }

    /// The wall-clock time of day, with hours reduced modulo 24.
    ///
    /// `25:10:00` becomes `01:10:00`; combined with [`Time::is_next_day`]
    /// this recovers the exact calendar instant of a stop.
    pub fn time_of_day(self) -> Time {
        Time(self.0 % SECONDS_PER_DAY)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours(),
            self.minutes(),
            self.seconds()
        )
    }
}

/// Error while parsing a GTFS `HH:MM:SS` time.
#[derive(Debug, Error, PartialEq)]
pub enum TimeError {
    /// The string is not made of 3 `:`-separated numeric fields.
    #[error("time format should be HH:MM:SS")]
    WrongFormat,
    /// Minutes or seconds are out of the [0, 59] range, or the hour field is
    /// too large to count in seconds.
    #[error("time value out of range")]
    WrongValue,
}

impl FromStr for Time {
    type Err = TimeError;
    fn from_str(time: &str) -> Result<Self, Self::Err> {
        let mut fields = time.trim().split(':');
        let mut next = || {
            fields
                .next()
                .ok_or(TimeError::WrongFormat)?
                .parse::<u32>()
                .map_err(|_| TimeError::WrongFormat)
        };
        let (hours, minutes, seconds) = (next()?, next()?, next()?);
        if fields.next().is_some() {
            return Err(TimeError::WrongFormat);
        }
        if minutes > 59 || seconds > 59 {
            return Err(TimeError::WrongValue);
        }
        hours
            .checked_mul(3600)
            .and_then(|total| total.checked_add(minutes * 60 + seconds))
            .map(Time)
            .ok_or(TimeError::WrongValue)
    }
}

impl Serialize for Time {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Time {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Is a calendar exception adding or removing a day of service.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionType {
    /// Service runs on the date even if no calendar range covers it.
    #[serde(rename = "1")]
    Add,
    /// Service does not run on the date even if a calendar range covers it.
    #[serde(rename = "2")]
    Remove,
}

/// The kind of vehicle serving a route, from the GTFS `route_type` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteType {
    /// Tram, streetcar or light rail (0)
    LightRail,
    /// Subway or metro (1)
    Subway,
    /// Intercity or long-distance rail (2)
    Rail,
    /// Bus (3)
    Bus,
    /// Ferry (4)
    Ferry,
    /// Cable tram (5)
    CableTram,
    /// Aerial lift or suspended cable car (6)
    AerialLift,
    /// Funicular (7)
    Funicular,
    /// Trolleybus (11)
    Trolleybus,
    /// Monorail (12)
    Monorail,
}

impl RouteType {
    fn code(self) -> u16 {
        match self {
            RouteType::LightRail => 0,
            RouteType::Subway => 1,
            RouteType::Rail => 2,
            RouteType::Bus => 3,
            RouteType::Ferry => 4,
            RouteType::CableTram => 5,
            RouteType::AerialLift => 6,
            RouteType::Funicular => 7,
            RouteType::Trolleybus => 11,
            RouteType::Monorail => 12,
        }
    }
}

impl Serialize for RouteType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u16(self.code())
    }
}

impl<'de> Deserialize<'de> for RouteType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let code = u16::deserialize(deserializer)?;
        let route_type = match code {
            0 => RouteType::LightRail,
            1 => RouteType::Subway,
            2 => RouteType::Rail,
            3 => RouteType::Bus,
            4 => RouteType::Ferry,
            5 => RouteType::CableTram,
            6 => RouteType::AerialLift,
            7 => RouteType::Funicular,
            11 => RouteType::Trolleybus,
            12 => RouteType::Monorail,
            _ => {
                error!("illegal route_type: '{}', using '3' as fallback", code);
                RouteType::Bus
            }
        };
        Ok(route_type)
    }
}

/// Wheelchair accessibility of a trip or a stop.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessibility {
    /// No accessibility information (0)
    #[serde(rename = "0")]
    Unknown,
    /// At least one wheelchair boarding is possible (1)
    #[serde(rename = "1")]
    Accessible,
    /// No wheelchair boarding is possible (2)
    #[serde(rename = "2")]
    Inaccessible,
}

impl Default for Accessibility {
    fn default() -> Self {
        Accessibility::Unknown
    }
}

/// Whether bikes are allowed on a trip.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BikesAllowed {
    /// No bike information (0)
    #[serde(rename = "0")]
    Unknown,
    /// At least one bicycle can be carried (1)
    #[serde(rename = "1")]
    Allowed,
    /// No bicycles allowed (2)
    #[serde(rename = "2")]
    Disallowed,
}

impl Default for BikesAllowed {
    fn default() -> Self {
        BikesAllowed::Unknown
    }
}

/// The nature of a transit location in `stops.txt`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationType {
    /// A place where passengers board or leave a vehicle (0)
    #[serde(rename = "0")]
    StopOrPlatform,
    /// A physical structure grouping stops or platforms (1)
    #[serde(rename = "1")]
    Station,
    /// A station entrance or exit (2)
    #[serde(rename = "2")]
    EntranceOrExit,
    /// A pathway node inside a station (3)
    #[serde(rename = "3")]
    GenericNode,
    /// A boarding location on a platform (4)
    #[serde(rename = "4")]
    BoardingArea,
}

impl Default for LocationType {
    fn default() -> Self {
        LocationType::StopOrPlatform
    }
}

/// How pickup or drop off is arranged at a stop.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupDropOffType {
    /// Regularly scheduled (0)
    #[serde(rename = "0")]
    Regular,
    /// Not available (1)
    #[serde(rename = "1")]
    NotAvailable,
    /// Must phone the agency (2)
    #[serde(rename = "2")]
    ByPhone,
    /// Must coordinate with the driver (3)
    #[serde(rename = "3")]
    CoordinateWithDriver,
}

impl Default for PickupDropOffType {
    fn default() -> Self {
        PickupDropOffType::Regular
    }
}

/// Continuous stopping behavior along a route or between stop times.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuity {
    /// Continuous stopping pickup or drop off (0)
    #[serde(rename = "0")]
    Continuous,
    /// No continuous stopping (1)
    #[serde(rename = "1")]
    NotAvailable,
    /// Must phone the agency (2)
    #[serde(rename = "2")]
    ByPhone,
    /// Must coordinate with the driver (3)
    #[serde(rename = "3")]
    CoordinateWithDriver,
}

impl Default for Continuity {
    fn default() -> Self {
        Continuity::NotAvailable
    }
}

/// Whether a stop time is exact or approximate.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timepoint {
    /// Times are approximate (0)
    #[serde(rename = "0")]
    Approximate,
    /// Times are exact (1)
    #[serde(rename = "1")]
    Exact,
}

impl Default for Timepoint {
    fn default() -> Self {
        Timepoint::Exact
    }
}

/// A transit operator, from `agency.txt`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Agency {
    /// Identifier of the agency; feeds with a single agency may omit it.
    #[serde(rename = "agency_id", default)]
    pub id: String,
    /// Full name of the agency
    #[serde(rename = "agency_name")]
    pub name: String,
    /// URL of the agency's website
    #[serde(rename = "agency_url")]
    pub url: String,
    /// Timezone where the agency is located
    #[serde(rename = "agency_timezone")]
    pub timezone: String,
    /// Primary language of the agency
    #[serde(rename = "agency_lang", default)]
    pub lang: Option<String>,
    /// Voice telephone number
    #[serde(rename = "agency_phone", default)]
    pub phone: Option<String>,
    /// URL of a fare or ticket website
    #[serde(rename = "agency_fare_url", default)]
    pub fare_url: Option<String>,
    /// Customer service email address
    #[serde(rename = "agency_email", default)]
    pub email: Option<String>,
}
impl_id!(Agency);

fn default_stop_name() -> String {
    "unnamed".to_string()
}

fn de_stop_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let option = Option::<String>::deserialize(deserializer)?;
    Ok(option
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(default_stop_name))
}

/// A transit location, from `stops.txt`: a stop or platform, a station, an
/// entrance, a pathway node or a boarding area (see [`LocationType`]).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Stop {
    /// Identifier of the transit location
    #[serde(rename = "stop_id")]
    pub id: String,
    /// Short text or number identifying the location for riders
    #[serde(rename = "stop_code", default)]
    pub code: Option<String>,
    /// Name of the location
    #[serde(
        rename = "stop_name",
        default = "default_stop_name",
        deserialize_with = "de_stop_name"
    )]
    pub name: String,
    /// Description of the location
    #[serde(rename = "stop_desc", default)]
    pub desc: Option<String>,
    /// Latitude of the location
    #[serde(rename = "stop_lat", default)]
    pub lat: Option<f64>,
    /// Longitude of the location
    #[serde(rename = "stop_lon", default)]
    pub lon: Option<f64>,
    /// Fare zone of the location
    #[serde(rename = "zone_id", default)]
    pub zone_id: Option<String>,
    /// URL of a web page about the location
    #[serde(rename = "stop_url", default)]
    pub url: Option<String>,
    /// Nature of the location
    #[serde(
        rename = "location_type",
        default,
        deserialize_with = "de_with_empty_default"
    )]
    pub location_type: LocationType,
    /// Identifier of the parent location, if any
    #[serde(rename = "parent_station", default)]
    pub parent_id: Option<String>,
    /// Timezone of the location when it differs from the agency's
    #[serde(rename = "stop_timezone", default)]
    pub timezone: Option<String>,
    /// Wheelchair accessibility of boardings at the location
    #[serde(
        rename = "wheelchair_boarding",
        default,
        deserialize_with = "de_with_empty_default"
    )]
    pub accessibility: Accessibility,
    /// Level of the location inside a station
    #[serde(rename = "level_id", default)]
    pub level_id: Option<String>,
    /// Platform identifier, without the station name
    #[serde(rename = "platform_code", default)]
    pub platform_code: Option<String>,
    /// Readable version of the stop name for text-to-speech systems
    #[serde(rename = "tts_stop_name", default)]
    pub tts_name: Option<String>,
}
impl_id!(Stop);

fn default_route_color() -> String {
    "FFFFFF".to_string()
}

fn default_route_text_color() -> String {
    "000000".to_string()
}

/// A named transit line, from `routes.txt`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Route {
    /// Identifier of the route
    #[serde(rename = "route_id")]
    pub id: String,
    /// Identifier of the operating agency
    #[serde(rename = "agency_id", default)]
    pub agency_id: String,
    /// Short name, typically a line number
    #[serde(rename = "route_short_name", default)]
    pub short_name: Option<String>,
    /// Full, descriptive name
    #[serde(rename = "route_long_name", default)]
    pub long_name: Option<String>,
    /// Description of the route
    #[serde(rename = "route_desc", default)]
    pub desc: Option<String>,
    /// Kind of vehicle serving the route
    pub route_type: RouteType,
    /// URL of a web page about the route
    #[serde(rename = "route_url", default)]
    pub url: Option<String>,
    /// Color of the route, as a 6-digit hexadecimal string
    #[serde(rename = "route_color", default = "default_route_color")]
    pub color: String,
    /// Color of text drawn against [`Route::color`]
    #[serde(rename = "route_text_color", default = "default_route_text_color")]
    pub text_color: String,
    /// Position of the route when presenting them in a list
    #[serde(
        rename = "route_sort_order",
        default,
        deserialize_with = "de_with_empty_default"
    )]
    pub sort_order: u32,
    /// Continuous pickup behavior along the whole route
    #[serde(
        rename = "continuous_pickup",
        default,
        deserialize_with = "de_with_empty_default"
    )]
    pub continuous_pickup: Continuity,
    /// Continuous drop-off behavior along the whole route
    #[serde(
        rename = "continuous_drop_off",
        default,
        deserialize_with = "de_with_empty_default"
    )]
    pub continuous_drop_off: Continuity,
    /// Identifier of the network the route belongs to
    #[serde(rename = "network_id", default)]
    pub network_id: Option<String>,
}
impl_id!(Route);

impl Route {
    /// The display name of the route: the long name when present, else the
    /// short name, else the identifier.
    pub fn name(&self) -> &str {
        self.long_name
            .as_deref()
            .or_else(|| self.short_name.as_deref())
            .unwrap_or(&self.id)
    }
}

/// One scheduled visit of a trip at a stop, from `stop_times.txt`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StopTime {
    /// Identifier of the trip this visit belongs to
    #[serde(rename = "trip_id")]
    pub trip_id: String,
    /// Identifier of the serviced stop
    #[serde(rename = "stop_id", default)]
    pub stop_id: String,
    /// Order of the visit along the trip; strictly increasing, not
    /// necessarily consecutive
    #[serde(rename = "stop_sequence")]
    pub sequence: u32,
    /// Arrival time at the stop
    #[serde(rename = "arrival_time", default)]
    pub arrival_time: Option<Time>,
    /// Departure time from the stop
    #[serde(rename = "departure_time", default)]
    pub departure_time: Option<Time>,
    /// Beginning of the flexible pickup/drop-off window
    #[serde(rename = "start_pickup_drop_off_window", default)]
    pub start_window: Option<Time>,
    /// End of the flexible pickup/drop-off window
    #[serde(rename = "end_pickup_drop_off_window", default)]
    pub end_window: Option<Time>,
    /// Headsign to display when this stop is the destination
    #[serde(rename = "stop_headsign", default)]
    pub headsign: Option<String>,
    /// How pickup is arranged at this stop
    #[serde(
        rename = "pickup_type",
        default,
        deserialize_with = "de_with_empty_default"
    )]
    pub pickup_type: PickupDropOffType,
    /// How drop off is arranged at this stop
    #[serde(
        rename = "drop_off_type",
        default,
        deserialize_with = "de_with_empty_default"
    )]
    pub drop_off_type: PickupDropOffType,
    /// Continuous pickup behavior from this stop to the next
    #[serde(
        rename = "continuous_pickup",
        default,
        deserialize_with = "de_with_empty_default"
    )]
    pub continuous_pickup: Continuity,
    /// Continuous drop-off behavior from this stop to the next
    #[serde(
        rename = "continuous_drop_off",
        default,
        deserialize_with = "de_with_empty_default"
    )]
    pub continuous_drop_off: Continuity,
    /// Distance traveled from the first stop of the trip
    #[serde(rename = "shape_dist_traveled", default)]
    pub shape_dist_traveled: Option<f32>,
    /// Whether the times of this visit are exact or approximate
    #[serde(rename = "timepoint", default, deserialize_with = "de_with_empty_default")]
    pub timepoint: Timepoint,
}

impl StopTime {
    /// The effective start time of the visit: the arrival time, falling back
    /// to the start of the pickup/drop-off window.
    pub fn start_time(&self) -> Option<Time> {
        self.arrival_time.or(self.start_window)
    }

    /// The effective end time of the visit: the departure time, falling back
    /// to the end of the pickup/drop-off window.
    pub fn end_time(&self) -> Option<Time> {
        self.departure_time.or(self.end_window)
    }

    /// Whether the effective start time falls on the day after the service
    /// date; `false` when no time is known.
    pub fn starts_next_day(&self) -> bool {
        self.start_time().map_or(false, Time::is_next_day)
    }

    /// Whether the effective end time falls on the day after the service
    /// date; `false` when no time is known.
    pub fn ends_next_day(&self) -> bool {
        self.end_time().map_or(false, Time::is_next_day)
    }
}

/// A single scheduled vehicle run along a route, carrying its resolved
/// [`Timetable`]. Built once during dataset assembly and immutable after.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Trip {
    /// Identifier of the trip
    pub id: String,
    /// Identifier of the route the trip runs along
    pub route_id: String,
    /// Identifier of the service deciding the dates the trip runs on
    pub service_id: String,
    /// Identifier of the geographic shape of the trip, if any
    pub shape_id: Option<String>,
    /// Identifier of the block of consecutive trips sharing a vehicle
    pub block_id: Option<String>,
    /// Headsign to display for the trip
    pub headsign: Option<String>,
    /// Short rider-facing name of the trip
    pub short_name: Option<String>,
    /// Direction of travel, `false` for outbound and `true` for inbound
    pub direction: Option<bool>,
    /// Wheelchair accessibility of the trip
    pub accessibility: Accessibility,
    /// Whether bikes are allowed on the trip
    pub bikes_allowed: BikesAllowed,
    /// The ordered stop visits of the trip
    pub timetable: Timetable,
}
impl_id!(Trip);

/// Metadata about the feed itself, from `feed_info.txt`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FeedInfo {
    /// Name of the organization publishing the dataset
    #[serde(rename = "feed_publisher_name")]
    pub publisher_name: String,
    /// URL of the publishing organization's website
    #[serde(rename = "feed_publisher_url")]
    pub publisher_url: String,
    /// Default language of the text in the dataset
    #[serde(rename = "feed_lang")]
    pub lang: String,
    /// Language to use when the rider's language is unknown
    #[serde(rename = "default_lang", default)]
    pub default_lang: Option<String>,
    /// First date covered by the dataset
    #[serde(
        rename = "feed_start_date",
        default,
        deserialize_with = "de_option_date",
        serialize_with = "ser_option_date"
    )]
    pub start_date: Option<Date>,
    /// Last date covered by the dataset
    #[serde(
        rename = "feed_end_date",
        default,
        deserialize_with = "de_option_date",
        serialize_with = "ser_option_date"
    )]
    pub end_date: Option<Date>,
    /// Version string of the dataset
    #[serde(rename = "feed_version", default)]
    pub version: Option<String>,
    /// Email address for communication about the dataset
    #[serde(rename = "feed_contact_email", default)]
    pub contact_email: Option<String>,
    /// URL for information about the dataset
    #[serde(rename = "feed_contact_url", default)]
    pub contact_url: Option<String>,
}
