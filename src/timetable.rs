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

//! The ordered stop sequence of one trip and the topological questions it
//! answers: stop order, connectivity and time-window overlap.

use crate::objects::{StopTime, Time};
use crate::Result;
use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The stop visits of one trip, keyed by stop identifier.
///
/// A trip revisiting the same stop keeps only the last visit; loop trips are
/// therefore flattened to their final pass through each stop.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Timetable {
    data: BTreeMap<String, StopTime>,
}

impl Timetable {
    /// Builds a timetable from the stop times of one trip; at least one stop
    /// time is required.
    pub fn new(stop_times: Vec<StopTime>) -> Result<Self> {
        if stop_times.is_empty() {
            bail!("a timetable needs at least one stop time");
        }
        let data = stop_times
            .into_iter()
            .map(|stop_time| (stop_time.stop_id.clone(), stop_time))
            .collect();
        Ok(Timetable { data })
    }

    /// The stop visits ordered by their sequence along the trip.
    pub fn stops(&self) -> Vec<&StopTime> {
        let mut stops: Vec<&StopTime> = self.data.values().collect();
        stops.sort_by_key(|stop_time| stop_time.sequence);
        stops
    }

    /// The identifiers of the served stops, in trip order.
    pub fn stop_ids(&self) -> Vec<&str> {
        self.stops()
            .into_iter()
            .map(|stop_time| stop_time.stop_id.as_str())
            .collect()
    }

    /// The visit at the given stop, if the trip serves it.
    pub fn get(&self, stop_id: &str) -> Option<&StopTime> {
        self.data.get(stop_id)
    }

    /// Number of served stops.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always `false`: a timetable has at least one stop time.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The first visit of the trip.
    pub fn start(&self) -> &StopTime {
        self.data
            .values()
            .min_by_key(|stop_time| stop_time.sequence)
            .expect("a timetable is never empty")
    }

    /// The last visit of the trip.
    pub fn end(&self) -> &StopTime {
        self.data
            .values()
            .max_by_key(|stop_time| stop_time.sequence)
            .expect("a timetable is never empty")
    }

    /// Whether the trip can carry a rider from `from` to `to`: both stops
    /// are served and `from` comes strictly before `to`.
    pub fn connects(&self, from: &str, to: &str) -> bool {
        match (self.data.get(from), self.data.get(to)) {
            (Some(origin), Some(destination)) => origin.sequence < destination.sequence,
            _ => false,
        }
    }

    /// Whether the trip's running interval overlaps `[start, end]`.
    ///
    /// The interval goes from the effective start time of the first stop to
    /// the effective end time of the last one; a trip missing either of those
    /// times overlaps nothing.
    pub fn overlaps(&self, start: Time, end: Time) -> bool {
        match (self.start().start_time(), self.end().end_time()) {
            (Some(first), Some(last)) => first <= end && last >= start,
            _ => false,
        }
    }
}

/// Groups stop times by their trip, keeping each trip's rows in input order.
pub fn group_by_trip(stop_times: Vec<StopTime>) -> BTreeMap<String, Vec<StopTime>> {
    let mut groups = BTreeMap::<String, Vec<StopTime>>::new();
    for stop_time in stop_times {
        groups
            .entry(stop_time.trip_id.clone())
            .or_insert_with(Vec::new)
            .push(stop_time);
    }
    groups
}
