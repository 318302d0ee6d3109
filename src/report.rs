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

//! Typed view of the `csynth.xml` synthesis report.
//!
//! Every element the parser reads is mandatory. A missing element fails the
//! whole parse with [`ReportError::MalformedReport`] naming its path, at the
//! first element found missing.

use crate::error::ReportError;
use roxmltree::Document;
use roxmltree::Node;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;
use walkdir::WalkDir;

/// Latency text the tool writes for data-dependent designs.
pub const UNDEF_LATENCY: &str = "undef";

const NS_PER_SECOND: f64 = 1_000_000_000.0;

/// What to do with an `undef` latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UndefLatency {
  /// Report the latency as absent.
  #[default]
  Absent,
  /// Fail the parse with [`ReportError::UndefinedLatency`].
  Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ResourceKind {
  #[serde(rename = "BRAM_18K")]
  Bram18K,
  #[serde(rename = "DSP")]
  Dsp,
  #[serde(rename = "FF")]
  Ff,
  #[serde(rename = "LUT")]
  Lut,
  #[serde(rename = "URAM")]
  Uram,
}

impl ResourceKind {
  pub const ALL: [ResourceKind; 5] = [
    ResourceKind::Bram18K,
    ResourceKind::Dsp,
    ResourceKind::Ff,
    ResourceKind::Lut,
    ResourceKind::Uram,
  ];

  /// Element name in the report.
  pub fn tag(self) -> &'static str {
    match self {
      ResourceKind::Bram18K => "BRAM_18K",
      ResourceKind::Dsp => "DSP",
      ResourceKind::Ff => "FF",
      ResourceKind::Lut => "LUT",
      ResourceKind::Uram => "URAM",
    }
  }
}

impl fmt::Display for ResourceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.tag())
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopLevelLatencyData {
  /// Target clock period in seconds.
  pub clock_period: f64,

  pub best_case_latency_c: Option<u64>,
  pub average_case_latency_c: Option<u64>,
  pub worst_case_latency_c: Option<u64>,

  pub best_case_latency_t: Option<f64>,
  pub average_case_latency_t: Option<f64>,
  pub worst_case_latency_t: Option<f64>,
}

impl TopLevelLatencyData {
  pub fn latency_c(&self) -> Option<u64> {
    self.average_case_latency_c
  }

  pub fn latency_t(&self) -> Option<f64> {
    self.average_case_latency_t
  }

  pub fn is_latency_fully_estimated(&self) -> bool {
    self.best_case_latency_c.is_some()
      && self.average_case_latency_c.is_some()
      && self.worst_case_latency_c.is_some()
  }
}

/// Used and available counts for every resource kind, with their ratio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopLevelResourceData {
  used_abs: BTreeMap<ResourceKind, u64>,
  available_abs: BTreeMap<ResourceKind, u64>,
  used_percent: BTreeMap<ResourceKind, f64>,
}

impl TopLevelResourceData {
  /// Fails unless all five resource kinds appear in all three maps.
  pub fn new(
    used_abs: BTreeMap<ResourceKind, u64>,
    available_abs: BTreeMap<ResourceKind, u64>,
    used_percent: BTreeMap<ResourceKind, f64>,
  ) -> Result<Self, ReportError> {
    for kind in ResourceKind::ALL {
      let missing = |map| ReportError::MissingResourceKind {
        kind: kind.to_string(),
        map,
      };
      if !used_abs.contains_key(&kind) {
        return Err(missing("used_abs"));
      }
      if !available_abs.contains_key(&kind) {
        return Err(missing("available_abs"));
      }
      if !used_percent.contains_key(&kind) {
        return Err(missing("used_percent"));
      }
    }
    Ok(Self {
      used_abs,
      available_abs,
      used_percent,
    })
  }

  /// Computes `used / available` for every kind. A zero available count is
  /// an error rather than an infinite ratio.
  pub fn from_counts(
    used_abs: BTreeMap<ResourceKind, u64>,
    available_abs: BTreeMap<ResourceKind, u64>,
  ) -> Result<Self, ReportError> {
    let mut used_percent = BTreeMap::new();
    for (kind, used) in &used_abs {
      let Some(&available) = available_abs.get(kind) else {
        continue;
      };
      if available == 0 {
        return Err(ReportError::ZeroAvailable {
          kind: kind.to_string(),
        });
      }
      used_percent.insert(*kind, *used as f64 / available as f64);
    }
    Self::new(used_abs, available_abs, used_percent)
  }

  pub fn used(&self, kind: ResourceKind) -> u64 {
    self.used_abs[&kind]
  }

  pub fn available(&self, kind: ResourceKind) -> u64 {
    self.available_abs[&kind]
  }

  pub fn used_percent(&self, kind: ResourceKind) -> f64 {
    self.used_percent[&kind]
  }

  pub fn resource_kinds(&self) -> Vec<ResourceKind> {
    self.used_abs.keys().copied().collect()
  }
}

/// One hardware port inferred for the top-level function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RtlPort {
  pub name: String,
  pub object: String,
  pub port_type: String,
  pub io_protocol: String,
  pub dir: String,
  pub bits: u32,
  pub attribute: String,
  pub c_type: String,
  pub has_ctrl: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct InterfaceSummary {
  pub rtl_ports: Vec<RtlPort>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesisReport {
  pub top_level_latency_data: TopLevelLatencyData,
  pub top_level_resource_data: TopLevelResourceData,
  pub interface_summary: InterfaceSummary,
}

impl SynthesisReport {
  pub fn parse(xml: &str) -> Result<Self, ReportError> {
    ReportParser::default().parse(xml)
  }

  pub fn parse_from_disk(path: &Path) -> Result<Self, ReportError> {
    ReportParser::default().parse_from_disk(path)
  }
}

/// Report parser with a configurable `undef` latency policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportParser {
  undef_latency: UndefLatency,
}

impl ReportParser {
  pub fn new(undef_latency: UndefLatency) -> Self {
    Self { undef_latency }
  }

  pub fn parse_from_disk(&self, path: &Path) -> Result<SynthesisReport, ReportError> {
    let xml = fs::read_to_string(path).map_err(|source| ReportError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    tracing::debug!(report = %path.display(), "Parsing synthesis report");
    self.parse(&xml)
  }

  pub fn parse(&self, xml: &str) -> Result<SynthesisReport, ReportError> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();

    let clock_period_ns: f64 = parse_at(root, &["UserAssignments", "TargetClockPeriod"])?;
    let clock_period = clock_period_ns / NS_PER_SECOND;

    let summary = ["PerformanceEstimates", "SummaryOfOverallLatency"];
    let (best_c, best_t) = self.latency(root, &summary, "Best-caseLatency", clock_period)?;
    let (avg_c, avg_t) = self.latency(root, &summary, "Average-caseLatency", clock_period)?;
    let (worst_c, worst_t) = self.latency(root, &summary, "Worst-caseLatency", clock_period)?;

    let top_level_latency_data = TopLevelLatencyData {
      clock_period,
      best_case_latency_c: best_c,
      average_case_latency_c: avg_c,
      worst_case_latency_c: worst_c,
      best_case_latency_t: best_t,
      average_case_latency_t: avg_t,
      worst_case_latency_t: worst_t,
    };

    let mut used = BTreeMap::new();
    let mut available = BTreeMap::new();
    for kind in ResourceKind::ALL {
      used.insert(
        kind,
        parse_at(root, &["AreaEstimates", "Resources", kind.tag()])?,
      );
      available.insert(
        kind,
        parse_at(root, &["AreaEstimates", "AvailableResources", kind.tag()])?,
      );
    }
    let top_level_resource_data = TopLevelResourceData::from_counts(used, available)?;

    let interface = required(root, &["InterfaceSummary"])?;
    let rtl_ports = interface
      .children()
      .filter(|n| n.has_tag_name("RTLPorts"))
      .map(rtl_port)
      .collect::<Result<Vec<_>, _>>()?;

    Ok(SynthesisReport {
      top_level_latency_data,
      top_level_resource_data,
      interface_summary: InterfaceSummary { rtl_ports },
    })
  }

  fn latency(
    &self,
    root: Node,
    summary: &[&str],
    case: &'static str,
    clock_period: f64,
  ) -> Result<(Option<u64>, Option<f64>), ReportError> {
    let path: Vec<&str> = summary.iter().copied().chain([case]).collect();
    let raw = text_at(root, &path)?;
    if raw == UNDEF_LATENCY {
      return match self.undef_latency {
        UndefLatency::Absent => Ok((None, None)),
        UndefLatency::Reject => Err(ReportError::UndefinedLatency { case }),
      };
    }
    let cycles: u64 = parse_text(&path.join("/"), raw)?;
    Ok((Some(cycles), Some(cycles as f64 * clock_period)))
  }
}

fn rtl_port(node: Node) -> Result<RtlPort, ReportError> {
  // Descriptive fields are taken as written; an empty element is "".
  let field = |name: &str| {
    required(node, &[name]).map(|n| n.text().map(str::trim).unwrap_or("").to_string())
  };
  Ok(RtlPort {
    name: field("Name")?,
    object: field("Object")?,
    port_type: field("Type")?,
    io_protocol: field("IOProtocol")?,
    dir: field("Dir")?,
    bits: parse_at(node, &["Bits"])?,
    attribute: field("Attribute")?,
    c_type: field("CType")?,
    has_ctrl: parse_at(node, &["HasCtrl"])?,
  })
}

fn display_path(node: Node, path: &[&str]) -> String {
  let mut parts: Vec<&str> = Vec::new();
  if !node.is_root() && node.parent().is_some_and(|p| !p.is_root()) {
    parts.push(node.tag_name().name());
  }
  parts.extend_from_slice(path);
  parts.join("/")
}

/// Walks `path` from `node`, taking the first child with each name.
pub fn required<'a, 'input>(
  node: Node<'a, 'input>,
  path: &[&str],
) -> Result<Node<'a, 'input>, ReportError> {
  let mut current = node;
  for name in path {
    current = current
      .children()
      .find(|c| c.has_tag_name(*name))
      .ok_or_else(|| ReportError::MalformedReport {
        path: display_path(node, path),
      })?;
  }
  Ok(current)
}

/// Trimmed text of a required element. An element with no text is treated
/// as missing.
pub fn text_at<'a>(node: Node<'a, '_>, path: &[&str]) -> Result<&'a str, ReportError> {
  required(node, path)?
    .text()
    .map(str::trim)
    .ok_or_else(|| ReportError::MalformedReport {
      path: display_path(node, path),
    })
}

fn parse_at<T: FromStr>(node: Node, path: &[&str]) -> Result<T, ReportError> {
  let raw = text_at(node, path)?;
  parse_text(&display_path(node, path), raw)
}

fn parse_text<T: FromStr>(path: &str, raw: &str) -> Result<T, ReportError> {
  raw.parse().map_err(|_| ReportError::InvalidValue {
    path: path.to_string(),
    value: raw.to_string(),
  })
}

/// Finds `<root>/<project>/<solution>/**/csynth.xml`, first in sorted order.
pub fn locate_csynth_report(
  root: &Path,
  project: &str,
  solution: &str,
) -> Result<PathBuf, ReportError> {
  let solution_dir = root.join(project).join(solution);
  WalkDir::new(&solution_dir)
    .sort_by_file_name()
    .into_iter()
    .filter_map(Result::ok)
    .find(|e| e.file_type().is_file() && e.file_name() == "csynth.xml")
    .map(|e| e.into_path())
    .ok_or(ReportError::ReportNotFound(solution_dir))
}
