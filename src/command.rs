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

//! Typed Vitis HLS Tcl commands.
//!
//! Every tool operation is described by a static field table. A [`Command`]
//! is an [`Operation`] plus validated parameter values, and renders itself as
//! one script line by walking that table in declared order:
//!
//! ```text
//! <keyword> [-<flag> [<value>]]* [<positional>]*
//! ```
//!
//! Validation happens on every mutation, so a `Command` that exists is always
//! renderable.

use crate::error::CommandError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

/// How a parameter is typed and rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
  /// Bare `-flag` when true, omitted when false.
  Switch,
  /// `-flag value`, omitted when empty.
  Valued,
  /// `-flag value` where value must be one of the allowed set.
  Choice(&'static [&'static str]),
  /// Bare positional word.
  Positional,
  /// Path list: bare when one path, quoted and space-joined otherwise.
  Paths,
  /// Word list, space-joined.
  Words,
  /// Emitted exactly as given. Trusted input only.
  Verbatim,
}

/// One entry in an operation's field table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
  pub key: &'static str,
  pub kind: FieldKind,
  pub required: bool,
}

const fn switch(key: &'static str) -> Field {
  Field {
    key,
    kind: FieldKind::Switch,
    required: false,
  }
}

const fn valued(key: &'static str) -> Field {
  Field {
    key,
    kind: FieldKind::Valued,
    required: false,
  }
}

const fn choice(key: &'static str, allowed: &'static [&'static str]) -> Field {
  Field {
    key,
    kind: FieldKind::Choice(allowed),
    required: false,
  }
}

const fn positional(key: &'static str) -> Field {
  Field {
    key,
    kind: FieldKind::Positional,
    required: false,
  }
}

const fn required(field: Field) -> Field {
  Field {
    required: true,
    ..field
  }
}

const fn paths(key: &'static str) -> Field {
  Field {
    key,
    kind: FieldKind::Paths,
    required: false,
  }
}

const fn words(key: &'static str) -> Field {
  Field {
    key,
    kind: FieldKind::Words,
    required: false,
  }
}

const fn verbatim(key: &'static str) -> Field {
  Field {
    key,
    kind: FieldKind::Verbatim,
    required: true,
  }
}

pub const FLOW_TARGETS: &[&str] = &["vitis", "vivado"];
pub const EXPORT_FLOWS: &[&str] = &["syn", "impl"];
pub const EXPORT_FORMATS: &[&str] = &["ip_catalog", "xo", "syn_dcp", "sysgen"];
pub const EXPORT_RTL: &[&str] = &["verilog", "VHDL"];
pub const COSIM_RTL: &[&str] = &["verilog", "vhdl"];
pub const TRACE_LEVELS: &[&str] = &["none", "all", "port", "port_hier"];

// --- Field tables, in rendering order ---

const ADD_FILES: &[Field] = &[
  valued("blackbox"),
  valued("cflags"),
  valued("csimflags"),
  switch("tb"),
  required(paths("files")),
];

const COSIM_DESIGN: &[Field] = &[
  switch("O"),
  valued("argv"),
  valued("compiled_library_dir"),
  switch("coverage"),
  switch("disable_binary_tv"),
  switch("disable_deadlock_detection"),
  switch("disable_dependency_check"),
  switch("enable_dataflow_profiling"),
  switch("enable_fifo_sizing"),
  valued("hwemu_trace_dir"),
  valued("ldflags"),
  valued("mflags"),
  switch("random_stall"),
  choice("rtl", COSIM_RTL),
  switch("setup"),
  switch("stable_axilite_update"),
  choice("trace_level", TRACE_LEVELS),
  valued("user_stall"),
  switch("wave_debug"),
];

const COSIM_STALL: &[Field] = &[valued("check"), valued("generate"), switch("list")];

const CREATE_CLOCK: &[Field] = &[valued("name"), valued("period")];

const CSIM_DESIGN: &[Field] = &[
  switch("O"),
  valued("argv"),
  switch("clean"),
  valued("ldflags"),
  valued("mflags"),
  switch("profile"),
  switch("setup"),
];

const CSYNTH_DESIGN: &[Field] = &[
  switch("dump_cfg"),
  switch("dump_post_cfg"),
  switch("synthesis_check"),
];

const NAMED: &[Field] = &[required(positional("name"))];

const ENABLE_BETA_DEVICE: &[Field] = &[required(positional("pattern"))];

const EXPORT_DESIGN: &[Field] = &[
  valued("description"),
  valued("display_name"),
  choice("flow", EXPORT_FLOWS),
  choice("format", EXPORT_FORMATS),
  valued("ipname"),
  valued("library"),
  valued("output"),
  choice("rtl", EXPORT_RTL),
  valued("taxonomy"),
  valued("vendor"),
  valued("version"),
];

const GET_CLOCK_PERIOD: &[Field] = &[switch("default"), valued("name"), switch("ns")];

const GET_CLOCK_UNCERTAINTY: &[Field] = &[positional("clock_name")];

const GET_FILES: &[Field] = &[switch("cflags"), switch("fullpath"), switch("tb")];

const GET_PROJECT: &[Field] = &[switch("directory"), switch("name"), switch("solutions")];

const GET_SOLUTION: &[Field] = &[
  switch("directory"),
  switch("flow_target"),
  switch("json"),
  switch("name"),
];

const HELP: &[Field] = &[positional("command")];

const LIST_PART: &[Field] = &[
  positional("family"),
  valued("name"),
  switch("board"),
  switch("clock_regions"),
  switch("slr_pblocks"),
];

const OPEN_PROJECT: &[Field] = &[
  switch("reset"),
  switch("upgrade"),
  required(positional("name")),
];

const OPEN_SOLUTION: &[Field] = &[
  choice("flow_target", FLOW_TARGETS),
  switch("reset"),
  required(positional("name")),
];

const OPEN_TCL_PROJECT: &[Field] = &[required(paths("tclfile"))];

const SET_CLOCK_UNCERTAINTY: &[Field] = &[required(positional("uncertainty")), words("clocks")];

const SET_PART: &[Field] = &[required(positional("device"))];

const USER_TCL: &[Field] = &[verbatim("tcl")];

const EXEC: &[Field] = &[verbatim("command")];

/// A Vitis HLS Tcl operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
  AddFiles,
  CloseProject,
  CloseSolution,
  CosimDesign,
  CosimStall,
  CreateClock,
  CsimDesign,
  CsynthDesign,
  DeleteProject,
  DeleteSolution,
  EnableBetaDevice,
  ExportDesign,
  GetClockPeriod,
  GetClockUncertainty,
  GetFiles,
  GetPart,
  GetProject,
  GetSolution,
  GetTop,
  Help,
  ListPart,
  OpenProject,
  OpenSolution,
  OpenTclProject,
  SetClockUncertainty,
  SetPart,
  SetTop,
  /// A raw Tcl line, emitted verbatim.
  UserTcl,
  /// A host command wrapped in Tcl `exec`.
  Exec,
}

impl Operation {
  pub const ALL: &'static [Operation] = &[
    Operation::AddFiles,
    Operation::CloseProject,
    Operation::CloseSolution,
    Operation::CosimDesign,
    Operation::CosimStall,
    Operation::CreateClock,
    Operation::CsimDesign,
    Operation::CsynthDesign,
    Operation::DeleteProject,
    Operation::DeleteSolution,
    Operation::EnableBetaDevice,
    Operation::ExportDesign,
    Operation::GetClockPeriod,
    Operation::GetClockUncertainty,
    Operation::GetFiles,
    Operation::GetPart,
    Operation::GetProject,
    Operation::GetSolution,
    Operation::GetTop,
    Operation::Help,
    Operation::ListPart,
    Operation::OpenProject,
    Operation::OpenSolution,
    Operation::OpenTclProject,
    Operation::SetClockUncertainty,
    Operation::SetPart,
    Operation::SetTop,
    Operation::UserTcl,
    Operation::Exec,
  ];

  /// The operation's name, which is also its Tcl keyword.
  pub fn keyword(self) -> &'static str {
    match self {
      Operation::AddFiles => "add_files",
      Operation::CloseProject => "close_project",
      Operation::CloseSolution => "close_solution",
      Operation::CosimDesign => "cosim_design",
      Operation::CosimStall => "cosim_stall",
      Operation::CreateClock => "create_clock",
      Operation::CsimDesign => "csim_design",
      Operation::CsynthDesign => "csynth_design",
      Operation::DeleteProject => "delete_project",
      Operation::DeleteSolution => "delete_solution",
      Operation::EnableBetaDevice => "enable_beta_device",
      Operation::ExportDesign => "export_design",
      Operation::GetClockPeriod => "get_clock_period",
      Operation::GetClockUncertainty => "get_clock_uncertainty",
      Operation::GetFiles => "get_files",
      Operation::GetPart => "get_part",
      Operation::GetProject => "get_project",
      Operation::GetSolution => "get_solution",
      Operation::GetTop => "get_top",
      Operation::Help => "help",
      Operation::ListPart => "list_part",
      Operation::OpenProject => "open_project",
      Operation::OpenSolution => "open_solution",
      Operation::OpenTclProject => "open_tcl_project",
      Operation::SetClockUncertainty => "set_clock_uncertainty",
      Operation::SetPart => "set_part",
      Operation::SetTop => "set_top",
      Operation::UserTcl => "user_tcl",
      Operation::Exec => "exec",
    }
  }

  /// The field table, in rendering order.
  pub fn fields(self) -> &'static [Field] {
    match self {
      Operation::AddFiles => ADD_FILES,
      Operation::CloseProject
      | Operation::CloseSolution
      | Operation::GetPart
      | Operation::GetTop => &[],
      Operation::CosimDesign => COSIM_DESIGN,
      Operation::CosimStall => COSIM_STALL,
      Operation::CreateClock => CREATE_CLOCK,
      Operation::CsimDesign => CSIM_DESIGN,
      Operation::CsynthDesign => CSYNTH_DESIGN,
      Operation::DeleteProject | Operation::DeleteSolution | Operation::SetTop => NAMED,
      Operation::EnableBetaDevice => ENABLE_BETA_DEVICE,
      Operation::ExportDesign => EXPORT_DESIGN,
      Operation::GetClockPeriod => GET_CLOCK_PERIOD,
      Operation::GetClockUncertainty => GET_CLOCK_UNCERTAINTY,
      Operation::GetFiles => GET_FILES,
      Operation::GetProject => GET_PROJECT,
      Operation::GetSolution => GET_SOLUTION,
      Operation::Help => HELP,
      Operation::ListPart => LIST_PART,
      Operation::OpenProject => OPEN_PROJECT,
      Operation::OpenSolution => OPEN_SOLUTION,
      Operation::OpenTclProject => OPEN_TCL_PROJECT,
      Operation::SetClockUncertainty => SET_CLOCK_UNCERTAINTY,
      Operation::SetPart => SET_PART,
      Operation::UserTcl => USER_TCL,
      Operation::Exec => EXEC,
    }
  }

  pub fn field(self, key: &str) -> Option<&'static Field> {
    self.fields().iter().find(|f| f.key == key)
  }

  // The raw Tcl escape hatch is the only operation without a leading keyword.
  fn renders_keyword(self) -> bool {
    self != Operation::UserTcl
  }
}

impl fmt::Display for Operation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.keyword())
  }
}

impl FromStr for Operation {
  type Err = CommandError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Operation::ALL
      .iter()
      .copied()
      .find(|op| op.keyword() == s)
      .ok_or_else(|| CommandError::UnknownOperation(s.to_string()))
  }
}

/// A parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
  Bool(bool),
  Text(String),
  Paths(Vec<PathBuf>),
  List(Vec<String>),
}

impl From<bool> for Value {
  fn from(v: bool) -> Self {
    Value::Bool(v)
  }
}

impl From<&str> for Value {
  fn from(v: &str) -> Self {
    Value::Text(v.to_string())
  }
}

impl From<String> for Value {
  fn from(v: String) -> Self {
    Value::Text(v)
  }
}

impl From<PathBuf> for Value {
  fn from(v: PathBuf) -> Self {
    Value::Paths(vec![v])
  }
}

impl From<&Path> for Value {
  fn from(v: &Path) -> Self {
    Value::Paths(vec![v.to_path_buf()])
  }
}

impl From<Vec<PathBuf>> for Value {
  fn from(v: Vec<PathBuf>) -> Self {
    Value::Paths(v)
  }
}

impl From<Vec<String>> for Value {
  fn from(v: Vec<String>) -> Self {
    Value::List(v)
  }
}

impl From<Vec<&str>> for Value {
  fn from(v: Vec<&str>) -> Self {
    Value::List(v.into_iter().map(str::to_string).collect())
  }
}

/// A validated tool command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Command {
  op: Operation,
  params: BTreeMap<&'static str, Value>,
}

impl Command {
  /// Builds a command from parameter pairs, validating each one and checking
  /// that every required parameter is present.
  pub fn new<K, V, I>(op: Operation, params: I) -> Result<Self, CommandError>
  where
    K: AsRef<str>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
  {
    let mut cmd = Command {
      op,
      params: BTreeMap::new(),
    };
    for (key, value) in params {
      cmd.set(key.as_ref(), value.into())?;
    }
    if let Some(missing) = op
      .fields()
      .iter()
      .find(|f| f.required && !cmd.params.contains_key(f.key))
    {
      return Err(CommandError::MissingParameter {
        op: op.keyword(),
        field: missing.key,
      });
    }
    Ok(cmd)
  }

  /// A command with no parameters. Only valid for operations without
  /// required fields.
  fn bare(op: Operation) -> Self {
    Command {
      op,
      params: BTreeMap::new(),
    }
  }

  /// Returns a copy of this command with one more parameter set.
  pub fn with(mut self, key: &str, value: impl Into<Value>) -> Result<Self, CommandError> {
    self.set(key, value.into())?;
    Ok(self)
  }

  /// Shorthand for `with(key, true)`.
  pub fn flag(self, key: &str) -> Result<Self, CommandError> {
    self.with(key, true)
  }

  pub fn op(&self) -> Operation {
    self.op
  }

  pub fn get(&self, key: &str) -> Option<&Value> {
    self.params.get(key)
  }

  pub fn text(&self, key: &str) -> Option<&str> {
    match self.params.get(key) {
      Some(Value::Text(t)) => Some(t),
      _ => None,
    }
  }

  fn set(&mut self, key: &str, value: Value) -> Result<(), CommandError> {
    let op = self.op.keyword();
    let field = self
      .op
      .field(key)
      .ok_or_else(|| CommandError::UnknownParameter {
        op,
        field: key.to_string(),
      })?;
    let value = normalize(op, field, value)?;
    self.params.insert(field.key, value);
    Ok(())
  }

  // --- Typed constructors ---

  pub fn add_files<P: Into<PathBuf>>(
    files: impl IntoIterator<Item = P>,
  ) -> Result<Self, CommandError> {
    let files: Vec<PathBuf> = files.into_iter().map(Into::into).collect();
    Command::new(Operation::AddFiles, [("files", files)])
  }

  pub fn close_project() -> Self {
    Command::bare(Operation::CloseProject)
  }

  pub fn close_solution() -> Self {
    Command::bare(Operation::CloseSolution)
  }

  pub fn cosim_design() -> Self {
    Command::bare(Operation::CosimDesign)
  }

  pub fn create_clock(name: &str, period: &str) -> Result<Self, CommandError> {
    Command::new(
      Operation::CreateClock,
      [("name", name), ("period", period)],
    )
  }

  pub fn csim_design() -> Self {
    Command::bare(Operation::CsimDesign)
  }

  pub fn csynth_design() -> Self {
    Command::bare(Operation::CsynthDesign)
  }

  pub fn export_design() -> Self {
    Command::bare(Operation::ExportDesign)
  }

  pub fn list_part() -> Self {
    Command::bare(Operation::ListPart)
  }

  pub fn open_project(name: &str) -> Result<Self, CommandError> {
    Command::new(Operation::OpenProject, [("name", name)])
  }

  pub fn open_solution(name: &str) -> Result<Self, CommandError> {
    Command::new(Operation::OpenSolution, [("name", name)])
  }

  pub fn set_part(device: &str) -> Result<Self, CommandError> {
    Command::new(Operation::SetPart, [("device", device)])
  }

  pub fn set_top(name: &str) -> Result<Self, CommandError> {
    Command::new(Operation::SetTop, [("name", name)])
  }

  /// Raw Tcl, emitted as-is. Trusted input only.
  pub fn user_tcl(tcl: &str) -> Result<Self, CommandError> {
    Command::new(Operation::UserTcl, [("tcl", tcl)])
  }

  /// Runs a host command through Tcl `exec`. Trusted input only.
  pub fn exec(command: &str) -> Result<Self, CommandError> {
    Command::new(Operation::Exec, [("command", command)])
  }
}

/// Checks a value against its field and coerces it into the stored shape.
fn normalize(op: &'static str, field: &Field, value: Value) -> Result<Value, CommandError> {
  let mismatch = |expected| CommandError::TypeMismatch {
    op,
    field: field.key,
    expected,
  };
  let empty = || CommandError::EmptyValue {
    op,
    field: field.key,
  };

  match field.kind {
    FieldKind::Switch => match value {
      Value::Bool(b) => Ok(Value::Bool(b)),
      _ => Err(mismatch("a boolean")),
    },
    FieldKind::Valued | FieldKind::Positional | FieldKind::Verbatim => match value {
      Value::Text(t) if field.required && t.trim().is_empty() => Err(empty()),
      Value::Text(t) => Ok(Value::Text(t)),
      _ => Err(mismatch("a string")),
    },
    FieldKind::Choice(allowed) => match value {
      Value::Text(t) if t.is_empty() || allowed.contains(&t.as_str()) => Ok(Value::Text(t)),
      Value::Text(t) => Err(CommandError::InvalidParameter {
        op,
        field: field.key,
        value: t,
        allowed,
      }),
      _ => Err(mismatch("a string")),
    },
    FieldKind::Paths => {
      let paths = match value {
        Value::Paths(p) => p,
        Value::Text(t) => vec![PathBuf::from(t)],
        Value::List(l) => l.into_iter().map(PathBuf::from).collect(),
        Value::Bool(_) => return Err(mismatch("a path or list of paths")),
      };
      if field.required && paths.is_empty() {
        return Err(empty());
      }
      Ok(Value::Paths(paths))
    }
    FieldKind::Words => match value {
      Value::List(l) => Ok(Value::List(l)),
      Value::Text(t) => Ok(Value::List(vec![t])),
      _ => Err(mismatch("a list of strings")),
    },
  }
}

fn push_word(line: &mut String, word: &str) {
  if !line.is_empty() {
    line.push(' ');
  }
  line.push_str(word);
}

/// Wraps a flag value in double quotes when it would otherwise split into
/// several Tcl words.
fn quote_value(value: &str) -> String {
  let quoted = value.starts_with('"') || value.starts_with('{');
  if !quoted && value.chars().any(char::is_whitespace) {
    format!("\"{value}\"")
  } else {
    value.to_string()
  }
}

fn render_paths(paths: &[PathBuf]) -> String {
  match paths {
    [single] => single.display().to_string(),
    many => {
      let joined: Vec<String> = many.iter().map(|p| p.display().to_string()).collect();
      format!("\"{}\"", joined.join(" "))
    }
  }
}

impl fmt::Display for Command {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut line = String::new();
    if self.op.renders_keyword() {
      line.push_str(self.op.keyword());
    }

    for field in self.op.fields() {
      let Some(value) = self.params.get(field.key) else {
        continue;
      };
      match (field.kind, value) {
        (FieldKind::Switch, Value::Bool(true)) => push_word(&mut line, &format!("-{}", field.key)),
        (FieldKind::Valued | FieldKind::Choice(_), Value::Text(t)) if !t.is_empty() => {
          push_word(&mut line, &format!("-{}", field.key));
          push_word(&mut line, &quote_value(t));
        }
        (FieldKind::Positional | FieldKind::Verbatim, Value::Text(t)) if !t.is_empty() => {
          push_word(&mut line, t)
        }
        (FieldKind::Paths, Value::Paths(p)) if !p.is_empty() => {
          push_word(&mut line, &render_paths(p))
        }
        (FieldKind::Words, Value::List(w)) if !w.is_empty() => push_word(&mut line, &w.join(" ")),
        _ => {}
      }
    }

    f.write_str(&line)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_keyword_parses_back() {
    for op in Operation::ALL {
      assert_eq!(op.keyword().parse::<Operation>().unwrap(), *op);
    }
  }

  #[test]
  fn field_keys_are_unique_per_operation() {
    for op in Operation::ALL {
      let fields = op.fields();
      for (i, f) in fields.iter().enumerate() {
        assert!(
          fields[i + 1..].iter().all(|g| g.key != f.key),
          "{op} declares '{}' twice",
          f.key
        );
      }
    }
  }

  #[test]
  fn quote_value_leaves_single_words_alone() {
    assert_eq!(quote_value("-O3"), "-O3");
    assert_eq!(quote_value("-O3 -Wall"), "\"-O3 -Wall\"");
    assert_eq!(quote_value("{-O3 -Wall}"), "{-O3 -Wall}");
  }
}
