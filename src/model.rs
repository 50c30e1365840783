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

use crate::objects::{Agency, Date, FeedInfo, Route, Stop, Time, Trip};
use crate::schedule::Schedule;
use crate::{gtfs, snapshot, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use typed_index_collection::CollectionWithId;

/// An immutable GTFS dataset and its query API.
///
/// Every query returns a new `Dataset` whose trips table is filtered down;
/// the other tables are shared with the parent through `Arc`, so chaining
/// queries intersects their results without copying the feed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Name of the dataset
    pub name: String,
    /// Feed metadata, when the feed provides `feed_info.txt`
    pub feed: Option<FeedInfo>,
    agencies: Arc<CollectionWithId<Agency>>,
    routes: Arc<CollectionWithId<Route>>,
    schedules: Arc<CollectionWithId<Schedule>>,
    stops: Arc<CollectionWithId<Stop>>,
    trips: Arc<CollectionWithId<Trip>>,
}

impl Dataset {
    pub(crate) fn new(
        name: String,
        feed: Option<FeedInfo>,
        agencies: CollectionWithId<Agency>,
        routes: CollectionWithId<Route>,
        schedules: CollectionWithId<Schedule>,
        stops: CollectionWithId<Stop>,
        trips: CollectionWithId<Trip>,
    ) -> Self {
        Dataset {
            name,
            feed,
            agencies: Arc::new(agencies),
            routes: Arc::new(routes),
            schedules: Arc::new(schedules),
            stops: Arc::new(stops),
            trips: Arc::new(trips),
        }
    }

    /// Loads a dataset from a directory, a `.zip` archive or an `http(s)`
    /// URL, going through the snapshot at `snapshot_path` when one is given:
    /// a readable snapshot short-circuits the raw parse, and a raw parse
    /// refreshes the snapshot.
    pub fn load<P: AsRef<Path>>(
        name: &str,
        source: &str,
        snapshot_path: Option<P>,
    ) -> Result<Dataset> {
        if let Some(path) = &snapshot_path {
            if let Some(dataset) = snapshot::load(path.as_ref())? {
                return Ok(dataset);
            }
        }
        let dataset = if source.starts_with("http://") || source.starts_with("https://") {
            gtfs::read_from_url(source, None, name)?
        } else {
            gtfs::read_from_path(source, name)?
        };
        if let Some(path) = &snapshot_path {
            snapshot::save(&dataset, path.as_ref())?;
        }
        Ok(dataset)
    }

    fn with_trips(&self, trips: CollectionWithId<Trip>) -> Dataset {
        Dataset {
            name: self.name.clone(),
            feed: self.feed.clone(),
            agencies: Arc::clone(&self.agencies),
            routes: Arc::clone(&self.routes),
            schedules: Arc::clone(&self.schedules),
            stops: Arc::clone(&self.stops),
            trips: Arc::new(trips),
        }
    }

    /// The trips whose service runs on the date.
    pub fn on_date(&self, date: Date) -> Dataset {
        let active: HashSet<&str> = self
            .schedules
            .values()
            .filter(|schedule| schedule.active(date))
            .map(|schedule| schedule.id.as_str())
            .collect();
        let mut trips = (*self.trips).clone();
        trips.retain(|trip| active.contains(trip.service_id.as_str()));
        self.with_trips(trips)
    }

    /// The trips whose service runs today, in the system's local timezone.
    pub fn today(&self) -> Dataset {
        self.on_date(chrono::Local::now().date_naive())
    }

    /// The trips carrying a rider from stop `from` to stop `to`.
    pub fn connecting(&self, from: &str, to: &str) -> Dataset {
        let mut trips = (*self.trips).clone();
        trips.retain(|trip| trip.timetable.connects(from, to));
        self.with_trips(trips)
    }

    /// The trips running along the route.
    pub fn on_route(&self, route_id: &str) -> Dataset {
        let mut trips = (*self.trips).clone();
        trips.retain(|trip| trip.route_id == route_id);
        self.with_trips(trips)
    }

    /// The trips whose running interval overlaps `[start, end]`.
    pub fn between(&self, start: Time, end: Time) -> Dataset {
        let mut trips = (*self.trips).clone();
        trips.retain(|trip| trip.timetable.overlaps(start, end));
        self.with_trips(trips)
    }

    /// The agencies table.
    pub fn agencies(&self) -> &CollectionWithId<Agency> {
        &self.agencies
    }

    /// The routes table.
    pub fn routes(&self) -> &CollectionWithId<Route> {
        &self.routes
    }

    /// The resolved service calendars table.
    pub fn schedules(&self) -> &CollectionWithId<Schedule> {
        &self.schedules
    }

    /// The stops table.
    pub fn stops(&self) -> &CollectionWithId<Stop> {
        &self.stops
    }

    /// The trips table; queries narrow this table only.
    pub fn trips(&self) -> &CollectionWithId<Trip> {
        &self.trips
    }

    /// The agency with the given identifier.
    pub fn agency(&self, id: &str) -> Option<&Agency> {
        self.agencies.get(id)
    }

    /// The route with the given identifier.
    pub fn route(&self, id: &str) -> Option<&Route> {
        self.routes.get(id)
    }

    /// The service calendar with the given identifier.
    pub fn schedule(&self, id: &str) -> Option<&Schedule> {
        self.schedules.get(id)
    }

    /// The stop with the given identifier.
    pub fn stop(&self, id: &str) -> Option<&Stop> {
        self.stops.get(id)
    }

    /// The trip with the given identifier.
    pub fn trip(&self, id: &str) -> Option<&Trip> {
        self.trips.get(id)
    }

    /// The identifiers of the trips in this dataset, in table order.
    pub fn trip_ids(&self) -> Vec<&str> {
        self.trips.values().map(|trip| trip.id.as_str()).collect()
    }

    /// The first agency with the given name.
    pub fn find_agency(&self, name: &str) -> Option<&Agency> {
        self.agencies.values().find(|agency| agency.name == name)
    }

    /// The first stop with the given name.
    pub fn find_stop(&self, name: &str) -> Option<&Stop> {
        self.stops.values().find(|stop| stop.name == name)
    }
}
