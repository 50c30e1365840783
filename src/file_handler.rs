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

//! Provides an easy way to access directory or flat zip archive

use crate::Result;
use anyhow::{anyhow, Context};
use std::{
    collections::BTreeMap,
    fs::File,
    io::{Read, Seek},
    path::{Path, PathBuf},
};

/// Allows files in a directory or ZipArchive to be read either
pub trait FileHandler
where
    Self: std::marker::Sized,
{
    /// Reader
    type Reader: Read;

    /// Return a file if exist
    fn get_file_if_exists(self, name: &str) -> Result<(Option<Self::Reader>, PathBuf)>;

    /// Return a file or an error if not exist
    fn get_file(self, name: &str) -> Result<(Self::Reader, PathBuf)> {
        let (reader, path) = self.get_file_if_exists(name)?;
        Ok((
            reader.ok_or_else(|| anyhow!("file {:?} not found", path))?,
            path,
        ))
    }

    /// Allows to have nicer error messages
    fn source_name(&self) -> &str;
}

/// PathFileHandler is used to read files for a directory
pub struct PathFileHandler<P: AsRef<Path>> {
    base_path: P,
}

impl<P: AsRef<Path>> PathFileHandler<P> {
    /// Constructs a new PathFileHandler
    pub fn new(path: P) -> Self {
        PathFileHandler { base_path: path }
    }
}

impl<'a, P: AsRef<Path>> FileHandler for &'a mut PathFileHandler<P> {
    type Reader = File;
    fn get_file_if_exists(self, name: &str) -> Result<(Option<Self::Reader>, PathBuf)> {
        let f = self.base_path.as_ref().join(name);
        if f.exists() {
            Ok((
                Some(File::open(&f).with_context(|| format!("Error reading {:?}", &f))?),
                f,
            ))
        } else {
            Ok((None, f))
        }
    }
    fn source_name(&self) -> &str {
        self.base_path.as_ref().to_str().unwrap_or_else(|| {
            panic!(
                "the path '{:?}' should be valid UTF-8",
                self.base_path.as_ref()
            )
        })
    }
}

/// ZipHandler is a wrapper around a ZipArchive
/// It provides a way to access the archive's file by their names
///
/// Unlike ZipArchive, it gives access to a file by its name not regarding its path in the ZipArchive
/// It thus cannot be correct if there are 2 files with the same name in the archive,
/// but for transport data it makes it possible to handle a zip with a sub directory
pub struct ZipHandler<R: Seek + Read> {
    archive: zip::ZipArchive<R>,
    archive_path: PathBuf,
    index_by_name: BTreeMap<String, usize>,
}

impl<R> ZipHandler<R>
where
    R: Seek + Read,
{
    /// Constructs a new ZipHandler; `path` is only used in error messages
    pub fn new<P: AsRef<Path>>(r: R, path: P) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(r)?;
        Ok(ZipHandler {
            index_by_name: Self::files_by_name(&mut archive),
            archive,
            archive_path: path.as_ref().to_path_buf(),
        })
    }

    fn files_by_name(archive: &mut zip::ZipArchive<R>) -> BTreeMap<String, usize> {
        (0..archive.len())
            .filter_map(|i| {
                let file = archive.by_index(i).ok()?;
                // we get the name of the file, not regarding its path in the ZipArchive
                let real_name = Path::new(file.name()).file_name()?;
                let real_name: String = real_name.to_str()?.into();
                Some((real_name, i))
            })
            .collect()
    }
}

impl<'a, R> FileHandler for &'a mut ZipHandler<R>
where
    R: Seek + Read,
{
    type Reader = zip::read::ZipFile<'a>;
    fn get_file_if_exists(self, name: &str) -> Result<(Option<Self::Reader>, PathBuf)> {
        let p = self.archive_path.join(name);
        match self.index_by_name.get(name) {
            None => Ok((None, p)),
            Some(i) => Ok((Some(self.archive.by_index(*i)?), p)),
        }
    }
    fn source_name(&self) -> &str {
        self.archive_path
            .to_str()
            .unwrap_or_else(|| panic!("the path '{:?}' should be valid UTF-8", self.archive_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_file_with_content;
    use pretty_assertions::assert_eq;
    use std::io::{Cursor, Write};

    fn zip_with_subdir() -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let mut writer = zip::ZipWriter::new(Cursor::new(&mut buffer));
            let options = zip::write::FileOptions::default();
            writer.start_file("agency.txt", options).unwrap();
            writer.write_all(b"agency content").unwrap();
            writer.start_file("feed/stops.txt", options).unwrap();
            writer.write_all(b"stops content").unwrap();
            writer.finish().unwrap();
        }
        buffer
    }

    fn read_to_string(mut reader: impl Read) -> String {
        let mut content = String::new();
        reader.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn path_file_handler() {
        let tmp_dir = tempfile::tempdir().unwrap();
        create_file_with_content(tmp_dir.path(), "agency.txt", "agency content");
        let mut file_handler = PathFileHandler::new(tmp_dir.path().to_path_buf());

        let (agency, _) = file_handler.get_file("agency.txt").unwrap();
        assert_eq!("agency content", read_to_string(agency));

        let (missing, path) = file_handler.get_file_if_exists("routes.txt").unwrap();
        assert!(missing.is_none());
        assert_eq!(tmp_dir.path().join("routes.txt"), path);
    }

    #[test]
    fn zip_file_handler_flattens_sub_directories() {
        let mut file_handler =
            ZipHandler::new(Cursor::new(zip_with_subdir()), "feed.zip").unwrap();

        {
            let (agency, _) = file_handler.get_file("agency.txt").unwrap();
            assert_eq!("agency content", read_to_string(agency));
        }

        // nested under "feed/" in the archive, found by its base name
        {
            let (stops, _) = file_handler.get_file("stops.txt").unwrap();
            assert_eq!("stops content", read_to_string(stops));
        }

        match file_handler.get_file("routes.txt") {
            Ok(_) => panic!("routes.txt should not be in the archive"),
            Err(error) => assert!(error.to_string().contains("routes.txt")),
        };
    }
}
