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

//! [GTFS](https://gtfs.org/documentation/schedule/reference/) reading: turns
//! a feed directory, archive or remote URI into a [`Dataset`].

mod read;

use crate::file_handler::{FileHandler, PathFileHandler, ZipHandler};
use crate::schedule::read_schedules;
use crate::{Dataset, Result};
use anyhow::Context;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::info;

/// Assembles a [`Dataset`] from the GTFS tables behind the file handler.
///
/// Required tables: `agency.txt`, `stops.txt`, `routes.txt`, `trips.txt`,
/// `stop_times.txt`, and at least one of `calendar.txt` /
/// `calendar_dates.txt`; `feed_info.txt` is used when present.
pub fn read<H>(file_handler: &mut H, name: &str) -> Result<Dataset>
where
    for<'a> &'a mut H: FileHandler,
{
    info!("Loading GTFS from {}", file_handler.source_name());
    let feed = read::read_feed_info(file_handler)?;
    let agencies = read::read_agencies(file_handler)?;
    let stops = read::read_stops(file_handler)?;
    let routes = read::read_routes(file_handler)?;
    let schedules = read_schedules(file_handler)?;
    let trips = read::read_trips(file_handler)?;
    Ok(Dataset::new(
        name.to_string(),
        feed,
        agencies,
        routes,
        schedules,
        stops,
        trips,
    ))
}

/// Reads a feed from a directory, or from a flat `.zip` archive when the
/// path ends in `.zip`.
pub fn read_from_path<P: AsRef<Path>>(path: P, name: &str) -> Result<Dataset> {
    let path = path.as_ref();
    if path.extension().map_or(false, |extension| extension == "zip") {
        let reader =
            File::open(path).with_context(|| format!("Error reading {:?}", path))?;
        let mut file_handler = ZipHandler::new(reader, path)?;
        read(&mut file_handler, name)
    } else {
        let mut file_handler = PathFileHandler::new(path.to_path_buf());
        read(&mut file_handler, name)
    }
}

/// Fetches a zipped feed over HTTP(S) and reads it in memory; any fetch
/// failure is fatal.
///
/// Some publishers wrap the feed in an outer archive; `sub_archive` names
/// the inner zip to read in that case.
pub fn read_from_url(url: &str, sub_archive: Option<&str>, name: &str) -> Result<Dataset> {
    info!("Fetching GTFS from {}", url);
    let response = reqwest::blocking::get(url)
        .and_then(reqwest::blocking::Response::error_for_status)
        .with_context(|| format!("Error fetching {}", url))?;
    let bytes = response
        .bytes()
        .with_context(|| format!("Error downloading {}", url))?;
    let mut file_handler = ZipHandler::new(Cursor::new(bytes.to_vec()), url)?;
    match sub_archive {
        None => read(&mut file_handler, name),
        Some(inner_name) => {
            let mut inner_bytes = Vec::new();
            let (mut reader, path) = file_handler.get_file(inner_name)?;
            reader
                .read_to_end(&mut inner_bytes)
                .with_context(|| format!("Error reading {:?}", path))?;
            drop(reader);
            let mut inner_handler = ZipHandler::new(Cursor::new(inner_bytes), path)?;
            read(&mut inner_handler, name)
        }
    }
}
