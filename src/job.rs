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

//! TOML job and sweep files.
//!
//! A job file is a list of `[[command]]` tables. Each table names its
//! operation with `op` and carries that operation's parameters:
//!
//! ```toml
//! [[command]]
//! op = "open_project"
//! name = "prj"
//! reset = true
//!
//! [[command]]
//! op = "add_files"
//! files = ["mm.cpp", "mm.h"]
//! ```

use crate::command::Command;
use crate::command::Operation;
use crate::command::Value;
use crate::error::JobError;
use crate::sweep::Job;
use crate::sweep::Sweep;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct JobFile {
  #[serde(default)]
  command: Vec<toml::Table>,
}

#[derive(Debug, Deserialize)]
struct SweepFile {
  root: PathBuf,
  max_parallel: Option<usize>,
  #[serde(default)]
  collect_reports: bool,
  #[serde(default)]
  job: Vec<SweepJob>,
}

#[derive(Debug, Deserialize)]
struct SweepJob {
  name: String,
  #[serde(default)]
  command: Vec<toml::Table>,
}

fn read(path: &Path) -> Result<String, JobError> {
  fs::read_to_string(path).map_err(|source| JobError::Read {
    path: path.to_path_buf(),
    source,
  })
}

pub fn load_commands(path: &Path) -> Result<Vec<Command>, JobError> {
  parse_commands(&read(path)?)
}

pub fn parse_commands(text: &str) -> Result<Vec<Command>, JobError> {
  let file: JobFile = toml::from_str(text)?;
  to_commands(file.command)
}

/// Loads a sweep file. `max_parallel` falls back to `default_parallel`.
pub fn load_sweep(path: &Path, default_parallel: usize) -> Result<Sweep, JobError> {
  parse_sweep(&read(path)?, default_parallel)
}

pub fn parse_sweep(text: &str, default_parallel: usize) -> Result<Sweep, JobError> {
  let file: SweepFile = toml::from_str(text)?;
  let jobs = file
    .job
    .into_iter()
    .map(|j| {
      Ok(Job {
        name: j.name,
        commands: to_commands(j.command)?,
      })
    })
    .collect::<Result<Vec<_>, JobError>>()?;
  Ok(Sweep {
    root: file.root,
    jobs,
    max_parallel: file.max_parallel.unwrap_or(default_parallel),
    collect_reports: file.collect_reports,
  })
}

fn to_commands(tables: Vec<toml::Table>) -> Result<Vec<Command>, JobError> {
  tables
    .into_iter()
    .enumerate()
    .map(|(index, table)| to_command(index, table))
    .collect()
}

fn to_command(index: usize, mut table: toml::Table) -> Result<Command, JobError> {
  let op = match table.remove("op") {
    Some(toml::Value::String(op)) => op,
    _ => return Err(JobError::MissingOp { index }),
  };
  let op: Operation = op
    .parse()
    .map_err(|source| JobError::InvalidCommand { index, source })?;

  let params = table
    .into_iter()
    .map(|(key, value)| {
      let value = to_value(value).ok_or_else(|| JobError::UnsupportedValue {
        index,
        field: key.clone(),
      })?;
      Ok((key, value))
    })
    .collect::<Result<Vec<(String, Value)>, JobError>>()?;

  Command::new(op, params).map_err(|source| JobError::InvalidCommand { index, source })
}

/// Numbers become their textual form so `period = 3.33` works like
/// `period = "3.33"`.
fn to_value(value: toml::Value) -> Option<Value> {
  match value {
    toml::Value::Boolean(b) => Some(Value::Bool(b)),
    toml::Value::String(s) => Some(Value::Text(s)),
    toml::Value::Integer(i) => Some(Value::Text(i.to_string())),
    toml::Value::Float(f) => Some(Value::Text(f.to_string())),
    toml::Value::Array(items) => items
      .into_iter()
      .map(|item| match item {
        toml::Value::String(s) => Some(s),
        _ => None,
      })
      .collect::<Option<Vec<String>>>()
      .map(Value::List),
    _ => None,
  }
}
