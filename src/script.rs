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
use crate::command::Command;

/// Renders an ordered command sequence into one Tcl script.
///
/// Kept apart from [`crate::runner::Runner`] so a script can be inspected
/// without invoking the tool.
#[derive(Debug, Default, Clone, Copy)]
pub struct Composer;

impl Composer {
  /// One line per command, each terminated by a newline.
  pub fn compose(&self, commands: &[Command]) -> String {
    let mut script = String::new();
    for cmd in commands {
      script.push_str(&cmd.to_string());
      script.push('\n');
    }
    script
  }
}
