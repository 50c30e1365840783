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

//! The `transit_feed` crate reads [GTFS](https://gtfs.org/) datasets into an
//! immutable in-memory relational model and answers temporal and topological
//! queries against it: which trips run on a given date, which trips connect
//! one stop to another, which trips belong to a route or run within a time
//! window.
//!
//! The entry point is [`Dataset::load`], which reads a feed from a directory,
//! a zip archive or a remote URI, optionally short-circuiting through a
//! pre-parsed [`snapshot`] on repeat loads.

#![deny(missing_docs)]

pub mod file_handler;
pub mod gtfs;
mod model;
pub mod objects;
pub mod parser;
pub mod schedule;
mod serde_utils;
pub mod snapshot;
#[doc(hidden)]
pub mod test_utils;
pub mod timetable;

/// The error type used by the crate.
pub type Error = anyhow::Error;

/// The corresponding result type used by the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub use crate::model::Dataset;
