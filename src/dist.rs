// Copyright 2025 Chisomo Makombo Sakala
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use crate::error::DistError;
use std::collections::BTreeMap;
use std::env;
use std::path::Path;
use std::path::PathBuf;
use walkdir::WalkDir;

pub const TOOL_BINARY: &str = "vitis_hls";

/// A Vitis HLS installation, rooted at the directory holding `bin/` and
/// `include/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
  root: PathBuf,
}

impl Distribution {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// `<root>/bin/vitis_hls` -> `<root>`.
  pub fn from_bin_path(bin: &Path) -> Result<Self, DistError> {
    bin
      .parent()
      .and_then(Path::parent)
      .map(Self::new)
      .ok_or_else(|| DistError::NoRoot(bin.to_path_buf()))
  }

  /// Searches `PATH` for the tool binary.
  pub fn auto_find() -> Result<Self, DistError> {
    let path_var = env::var_os("PATH").ok_or(DistError::NotFound {
      binary: TOOL_BINARY,
    })?;
    let bin = env::split_paths(&path_var)
      .map(|dir| dir.join(exe_name()))
      .find(|candidate| candidate.is_file())
      .ok_or(DistError::NotFound {
        binary: TOOL_BINARY,
      })?;
    tracing::debug!(bin = %bin.display(), "Found tool binary on PATH");
    Self::from_bin_path(&bin)
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn bin_dir(&self) -> PathBuf {
    self.root.join("bin")
  }

  pub fn tool_binary(&self) -> PathBuf {
    self.bin_dir().join(exe_name())
  }

  pub fn include_dir(&self) -> PathBuf {
    self.root.join("include")
  }

  /// Every `*.h` below the include directory, keyed by file name.
  pub fn includes(&self) -> Result<BTreeMap<String, PathBuf>, DistError> {
    let include_dir = self.include_dir();
    let mut includes = BTreeMap::new();
    for entry in WalkDir::new(&include_dir).sort_by_file_name() {
      let entry = entry.map_err(|source| DistError::ScanIncludes {
        path: include_dir.clone(),
        source,
      })?;
      let path = entry.path();
      if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "h") {
        let name = entry.file_name().to_string_lossy().into_owned();
        includes.entry(name).or_insert_with(|| path.to_path_buf());
      }
    }
    Ok(includes)
  }
}

/// Appends ".bat" on Windows, where the tool ships a batch launcher.
fn exe_name() -> String {
  if cfg!(target_os = "windows") {
    format!("{TOOL_BINARY}.bat")
  } else {
    TOOL_BINARY.to_string()
  }
}
