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

//! Pre-parsed dataset cache: one JSON document mirroring a [`Dataset`],
//! written atomically and read tolerantly so a broken cache never breaks a
//! load.

use crate::{Dataset, Result};
use anyhow::Context;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// Writes the dataset as a JSON document at `path`, atomically: the document
/// is serialized into a temporary file next to `path` and renamed over it, so
/// readers never observe a half-written snapshot. The parent directory must
/// exist.
pub fn save(dataset: &Dataset, path: &Path) -> Result<()> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file = NamedTempFile::new_in(dir)
        .with_context(|| format!("Error creating a temporary file in {:?}", dir))?;
    let mut writer = BufWriter::new(&file);
    serde_json::to_writer(&mut writer, dataset)
        .with_context(|| format!("Error writing snapshot {:?}", path))?;
    writer
        .flush()
        .with_context(|| format!("Error writing snapshot {:?}", path))?;
    drop(writer);
    file.persist(path)
        .with_context(|| format!("Error writing snapshot {:?}", path))?;
    info!("Saved snapshot {:?}", path);
    Ok(())
}

/// Reads a snapshot back; `Ok(None)` when the file is absent, unreadable or
/// corrupt (logged), so callers fall back to parsing the raw feed.
pub fn load(path: &Path) -> Result<Option<Dataset>> {
    if !path.exists() {
        return Ok(None);
    }
    let file = match File::open(path) {
        Ok(file) => file,
        Err(error) => {
            warn!("Ignoring unreadable snapshot {:?}: {}", path, error);
            return Ok(None);
        }
    };
    match serde_json::from_reader(BufReader::new(file)) {
        Ok(dataset) => {
            info!("Loaded snapshot {:?}", path);
            Ok(Some(dataset))
        }
        Err(error) => {
            warn!("Ignoring corrupt snapshot {:?}: {}", path, error);
            Ok(None)
        }
    }
}
