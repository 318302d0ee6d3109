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

//! # vhls
//!
//! `vhls` drives the Vitis HLS synthesis tool through typed commands and
//! turns its outputs into typed data. Callers build a list of [`command::Command`]s,
//! a [`runner::Runner`] renders them into one Tcl script, runs the tool on it
//! and returns a [`runner::RunnerResult`]; the synthesis report and tool log
//! are then parsed with [`report`] and [`log`].
//!
//! ## Core Modules
//!
//! * [`command`]: The validated, table-driven command model and its Tcl rendering.
//! * [`script`]: The `Composer` that joins rendered commands into a script.
//! * [`runner`]: Writes the script, invokes the tool and captures its output and log.
//! * [`report`]: Parses `csynth.xml` into latency, resource and interface records.
//! * [`log`]: Filtered views and phase runtimes over `vitis_hls.log`.
//!
//! ## Supporting Modules
//!
//! * [`dist`]: Locates a tool installation.
//! * [`project`]: Reads the `hls.app` project descriptor.
//! * [`sweep`]: Runs independent jobs in parallel, one directory each.
//! * [`job`]: Loads commands and sweeps from TOML files.
//! * [`config`]: Layered `Settings` (defaults, `vhls.toml`, `VHLS_*`, CLI).
//! * [`cli`]: Defines the `clap`-based command-line interface.
//! * [`error`]: Defines the custom error types for the library.
//! * [`logging`]: Provides the `setup_tracing` utility.

pub mod cli;
pub mod command;
pub mod config;
pub mod dist;
pub mod error;
pub mod job;
pub mod log;
pub mod logging;
pub mod project;
pub mod report;
pub mod runner;
pub mod script;
pub mod sweep;
