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

//! Helpers to write fixture files in tests.

use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes `content` into `dir/file_name`, panicking on any error.
pub fn create_file_with_content(dir: &Path, file_name: &str, content: &str) {
    let file_path = dir.join(file_name);
    let mut file = File::create(&file_path)
        .unwrap_or_else(|error| panic!("cannot create {:?}: {}", file_path, error));
    file.write_all(content.as_bytes())
        .unwrap_or_else(|error| panic!("cannot write {:?}: {}", file_path, error));
}
