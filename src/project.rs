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
use crate::error::ProjectError;
use roxmltree::Document;
use roxmltree::Node;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

pub const DESCRIPTOR_FILE: &str = "hls.app";

/// Classification of a design file by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
  Source,
  Header,
  Other,
}

impl SourceKind {
  pub fn of(path: &Path) -> Self {
    let ext = path
      .extension()
      .map(|e| e.to_string_lossy().to_ascii_lowercase())
      .unwrap_or_default();
    match ext.as_str() {
      "c" | "cpp" | "cc" | "cxx" => SourceKind::Source,
      "h" | "hpp" | "hh" | "hxx" => SourceKind::Header,
      _ => SourceKind::Other,
    }
  }
}

/// A `<file>` entry of `hls.app`. Absent attributes stay `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectFile {
  pub name: Option<String>,
  pub kind: SourceKind,
  pub sc: Option<String>,
  pub tb: Option<String>,
  pub cflags: Option<String>,
  pub csimflags: Option<String>,
  pub blackbox: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolutionEntry {
  pub name: Option<String>,
  pub status: Option<String>,
}

/// The project descriptor written by `open_project`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HlsApp {
  pub project_type: Option<String>,
  pub top: Option<String>,
  pub name: Option<String>,
  pub files: Vec<ProjectFile>,
  pub solutions: Vec<SolutionEntry>,
}

fn attr(node: Node, name: &str) -> Option<String> {
  node.attribute(name).map(str::to_string)
}

/// Children named `item` of the first root child named `group`.
fn entries<'a, 'input>(
  root: Node<'a, 'input>,
  group: &'a str,
  item: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
  root
    .children()
    .find(|n| n.has_tag_name(group))
    .into_iter()
    .flat_map(move |g| g.children().filter(move |n| n.has_tag_name(item)))
}

impl HlsApp {
  pub fn parse(xml: &str) -> Result<Self, ProjectError> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();

    let files = entries(root, "files", "file")
      .map(|f| {
        let name = attr(f, "name");
        ProjectFile {
          kind: name
            .as_deref()
            .map(|n| SourceKind::of(Path::new(n)))
            .unwrap_or(SourceKind::Other),
          name,
          sc: attr(f, "sc"),
          tb: attr(f, "tb"),
          cflags: attr(f, "cflags"),
          csimflags: attr(f, "csimflags"),
          blackbox: attr(f, "blackbox"),
        }
      })
      .collect();

    let solutions = entries(root, "solutions", "solution")
      .map(|s| SolutionEntry {
        name: attr(s, "name"),
        status: attr(s, "status"),
      })
      .collect();

    Ok(HlsApp {
      project_type: attr(root, "projectType"),
      top: attr(root, "top"),
      name: attr(root, "name"),
      files,
      solutions,
    })
  }
}

/// A solution directory inside a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Solution {
  pub dir: PathBuf,
}

impl Solution {
  pub fn name(&self) -> Option<&str> {
    self.dir.file_name().and_then(|n| n.to_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
  pub dir: PathBuf,
  pub hls_app: HlsApp,
}

impl Project {
  pub fn open(dir: &Path) -> Result<Self, ProjectError> {
    let descriptor = dir.join(DESCRIPTOR_FILE);
    if !descriptor.is_file() {
      return Err(ProjectError::MissingDescriptor(dir.to_path_buf()));
    }
    let xml = fs::read_to_string(&descriptor).map_err(|source| ProjectError::Read {
      path: descriptor.clone(),
      source,
    })?;
    Ok(Self {
      dir: dir.to_path_buf(),
      hls_app: HlsApp::parse(&xml)?,
    })
  }

  /// Solutions listed in the descriptor, resolved against the project
  /// directory.
  pub fn solutions(&self) -> Vec<Solution> {
    self
      .hls_app
      .solutions
      .iter()
      .filter_map(|s| s.name.as_deref())
      .map(|name| Solution {
        dir: self.dir.join(name),
      })
      .collect()
  }
}
