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

//! Views over the free-text `vitis_hls.log`.
//!
//! Every view is recomputed from the immutable text on each call. Empty text
//! yields empty views.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static RUNTIME_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(concat!(
    r"Finished ([^:]+): CPU user time:\s*([0-9.]+) seconds\. ",
    r"CPU system time:\s*([0-9.]+) seconds\. ",
    r"Elapsed time:\s*([0-9.]+) seconds",
  ))
  .expect("runtime pattern must compile")
});

static MESSAGE_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"^(INFO|WARNING|ERROR|CRITICAL WARNING): \[([^\]]+)\]\s*(.*)$")
    .expect("message pattern must compile")
});

/// CPU and wall-clock time the tool reported for one finished phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimeInfo {
  pub phase: String,
  pub cpu_user: f64,
  pub cpu_sys: f64,
  pub elapsed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
  Info,
  Warning,
  Error,
}

/// A tagged log line such as `WARNING: [HLS 200-2053] ...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogMessage {
  pub severity: Severity,
  pub id: String,
  pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HlsLog {
  text: String,
}

impl HlsLog {
  pub fn new(text: impl Into<String>) -> Self {
    Self { text: text.into() }
  }

  pub fn text(&self) -> &str {
    &self.text
  }

  pub fn lines(&self) -> Vec<&str> {
    self.text.lines().collect()
  }

  pub fn warnings(&self) -> Vec<&str> {
    self.lines_containing("WARNING:")
  }

  pub fn errors(&self) -> Vec<&str> {
    self.lines_containing("ERROR:")
  }

  pub fn infos(&self) -> Vec<&str> {
    self.lines_containing("INFO:")
  }

  fn lines_containing(&self, marker: &str) -> Vec<&str> {
    self.text.lines().filter(|l| l.contains(marker)).collect()
  }

  /// Every `Finished <phase>: CPU user time: ...` entry, in order of
  /// appearance.
  pub fn runtimes(&self) -> Vec<RuntimeInfo> {
    RUNTIME_RE
      .captures_iter(&self.text)
      .filter_map(|caps| {
        let number = |i: usize| caps[i].parse::<f64>().ok();
        match (number(2), number(3), number(4)) {
          (Some(cpu_user), Some(cpu_sys), Some(elapsed)) => Some(RuntimeInfo {
            phase: caps[1].trim().to_string(),
            cpu_user,
            cpu_sys,
            elapsed,
          }),
          _ => {
            tracing::warn!(line = &caps[0], "Skipping runtime entry with unparsable time");
            None
          }
        }
      })
      .collect()
  }

  /// Sum of the elapsed seconds of every runtime entry.
  pub fn total_elapsed(&self) -> f64 {
    self.runtimes().iter().map(|r| r.elapsed).sum()
  }

  /// Tagged lines split into severity, message id and text. Critical
  /// warnings count as warnings.
  pub fn messages(&self) -> Vec<LogMessage> {
    self
      .text
      .lines()
      .filter_map(|line| {
        let caps = MESSAGE_RE.captures(line.trim_end())?;
        let severity = match &caps[1] {
          "INFO" => Severity::Info,
          "ERROR" => Severity::Error,
          _ => Severity::Warning,
        };
        Some(LogMessage {
          severity,
          id: caps[2].to_string(),
          text: caps[3].to_string(),
        })
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn skips_runtime_with_bad_number() {
    let log = HlsLog::new(
      "Finished A: CPU user time: 1..2 seconds. CPU system time: 0.1 seconds. Elapsed time: 0.2 seconds",
    );
    assert!(log.runtimes().is_empty());
  }

  #[test]
  fn critical_warning_is_a_warning() {
    let log = HlsLog::new("CRITICAL WARNING: [HLS 200-999] something odd");
    let msgs = log.messages();
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0].severity, Severity::Warning);
    assert_eq!(msgs[0].id, "HLS 200-999");
  }
}
