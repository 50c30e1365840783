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

use crate::file_handler::FileHandler;
use crate::objects::{Accessibility, Agency, BikesAllowed, FeedInfo, Route, Stop, StopTime, Trip};
use crate::parser::{read_collection, read_objects, read_objects_loose};
use crate::serde_utils::*;
use crate::timetable::{group_by_trip, Timetable};
use crate::Result;
use anyhow::anyhow;
use serde::Deserialize;
use tracing::warn;
use typed_index_collection::CollectionWithId;

pub(crate) fn read_agencies<H>(file_handler: &mut H) -> Result<CollectionWithId<Agency>>
where
    for<'a> &'a mut H: FileHandler,
{
    read_collection(file_handler, "agency.txt")
}

pub(crate) fn read_stops<H>(file_handler: &mut H) -> Result<CollectionWithId<Stop>>
where
    for<'a> &'a mut H: FileHandler,
{
    read_collection(file_handler, "stops.txt")
}

pub(crate) fn read_routes<H>(file_handler: &mut H) -> Result<CollectionWithId<Route>>
where
    for<'a> &'a mut H: FileHandler,
{
    read_collection(file_handler, "routes.txt")
}

/// Reads `feed_info.txt` when present; the table is optional metadata, so a
/// record that does not deserialize is skipped with a warning instead of
/// failing the load.
pub(crate) fn read_feed_info<H>(file_handler: &mut H) -> Result<Option<FeedInfo>>
where
    for<'a> &'a mut H: FileHandler,
{
    let feed_infos: Vec<FeedInfo> = read_objects_loose(file_handler, "feed_info.txt", false)?;
    Ok(feed_infos.into_iter().next())
}

#[derive(Deserialize, Debug)]
struct TripRecord {
    #[serde(rename = "trip_id")]
    id: String,
    route_id: String,
    service_id: String,
    #[serde(rename = "trip_headsign", default)]
    headsign: Option<String>,
    #[serde(rename = "trip_short_name", default)]
    short_name: Option<String>,
    #[serde(
        rename = "direction_id",
        default,
        deserialize_with = "de_option_bool_from_u8"
    )]
    direction: Option<bool>,
    #[serde(default)]
    block_id: Option<String>,
    #[serde(default)]
    shape_id: Option<String>,
    #[serde(
        rename = "wheelchair_accessible",
        default,
        deserialize_with = "de_with_empty_default"
    )]
    accessibility: Accessibility,
    #[serde(
        rename = "bikes_allowed",
        default,
        deserialize_with = "de_with_empty_default"
    )]
    bikes_allowed: BikesAllowed,
}

/// Reads `trips.txt` and `stop_times.txt` together: every trip is built once,
/// already carrying its resolved [`Timetable`]. A trip without any stop time
/// is an error.
pub(crate) fn read_trips<H>(file_handler: &mut H) -> Result<CollectionWithId<Trip>>
where
    for<'a> &'a mut H: FileHandler,
{
    let records: Vec<TripRecord> = read_objects(file_handler, "trips.txt", true)?;
    let stop_times: Vec<StopTime> = read_objects(file_handler, "stop_times.txt", true)?;
    let mut groups = group_by_trip(stop_times);

    let mut trips = Vec::with_capacity(records.len());
    for record in records {
        let stop_times = groups
            .remove(&record.id)
            .ok_or_else(|| anyhow!("trip '{}' has no stop times", record.id))?;
        trips.push(Trip {
            timetable: Timetable::new(stop_times)?,
            id: record.id,
            route_id: record.route_id,
            service_id: record.service_id,
            shape_id: record.shape_id,
            block_id: record.block_id,
            headsign: record.headsign,
            short_name: record.short_name,
            direction: record.direction,
            accessibility: record.accessibility,
            bikes_allowed: record.bikes_allowed,
        });
    }
    for trip_id in groups.keys() {
        warn!("stop times of unknown trip '{}' skipped", trip_id);
    }
    CollectionWithId::new(trips).map_err(|e| anyhow!("{}", e))
}
