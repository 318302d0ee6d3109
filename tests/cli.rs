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
use assert_cmd::cargo;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use std::sync::Mutex;
use std::sync::MutexGuard;
use tempfile::tempdir;

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde_json::Value;

static SERIAL: Mutex<()> = Mutex::new(());

// Tests write executables and spawn processes; interleaving the two can make
// exec fail with ETXTBSY.
fn serial() -> MutexGuard<'static, ()> {
  SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn vhls() -> Command {
  let mut cmd = Command::new(cargo::cargo_bin!("vhls"));
  cmd.env("CLICOLOR", "0").env_remove("VHLS_LOG_FILE");
  cmd
}

#[test]
fn test_script_prints_composed_commands() {
  let _serial = serial();
  vhls()
    .arg("script")
    .arg("tests/fixtures/job.toml")
    .assert()
    .success()
    .stdout(concat!(
      "open_project -reset mm_prj\n",
      "add_files \"mm_design/mm.cpp mm_design/mm.h\"\n",
      "open_solution -flow_target vitis -reset solution1\n",
      "create_clock -name default -period 3.33\n",
      "set_part xcu50-fsvh2104-2-e\n",
      "set_top blockmatmul\n",
      "csynth_design\n",
    ));
}

#[test]
fn test_script_rejects_invalid_job() {
  let _serial = serial();
  vhls()
    .arg("script")
    .arg("tests/fixtures/bad_job.toml")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Invalid value 'quartus'"));
}

#[test]
fn test_report_prints_json() {
  let _serial = serial();
  let output = vhls()
    .arg("report")
    .arg("tests/fixtures/csynth.xml")
    .output()
    .unwrap();
  assert!(output.status.success());

  let json: Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["top_level_latency_data"]["worst_case_latency_c"], 4122);
  assert_eq!(json["top_level_resource_data"]["available_abs"]["URAM"], 640);
  assert_eq!(
    json["interface_summary"]["rtl_ports"][1]["name"],
    "Arows_dout"
  );
}

#[test]
fn test_report_strict_latency() {
  let _serial = serial();
  let temp = tempdir().unwrap();
  let report = temp.path().join("csynth.xml");
  let xml = fs::read_to_string("tests/fixtures/csynth.xml")
    .unwrap()
    .replace(
      "<Worst-caseLatency>4122</Worst-caseLatency>",
      "<Worst-caseLatency>undef</Worst-caseLatency>",
    );
  fs::write(&report, xml).unwrap();

  let output = vhls().arg("report").arg(&report).output().unwrap();
  assert!(output.status.success());
  let json: Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(
    json["top_level_latency_data"]["worst_case_latency_c"],
    Value::Null
  );

  vhls()
    .arg("report")
    .arg(&report)
    .arg("--strict-latency")
    .assert()
    .failure()
    .stderr(predicate::str::contains(
      "Worst-caseLatency latency is undefined",
    ));
}

#[test]
fn test_log_summary() {
  let _serial = serial();
  let output = vhls()
    .arg("log")
    .arg("tests/fixtures/vitis_hls.log")
    .output()
    .unwrap();
  assert!(output.status.success());

  let json: Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["warnings"], 4);
  assert_eq!(json["errors"], 0);
  assert_eq!(json["infos"], 38);
  assert_eq!(json["runtimes"].as_array().unwrap().len(), 8);
  assert_eq!(json["runtimes"][2]["phase"], "Compiling Optimization and Transform");
}

#[test]
fn test_project_prints_descriptor() {
  let _serial = serial();
  let temp = tempdir().unwrap();
  fs::copy("tests/fixtures/hls.app", temp.path().join("hls.app")).unwrap();

  vhls()
    .arg("project")
    .arg(temp.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("\"top\": \"blockmatmul\""));

  vhls()
    .arg("project")
    .arg(temp.path().join("missing"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("Could not find hls.app"));
}

#[test]
fn test_dist_with_explicit_root() {
  let _serial = serial();
  let temp = tempdir().unwrap();
  let output = vhls().arg("dist").arg(temp.path()).output().unwrap();
  assert!(output.status.success());

  let json: Value = serde_json::from_slice(&output.stdout).unwrap();
  let binary = PathBuf::from(json["tool_binary"].as_str().unwrap());
  assert!(binary.starts_with(temp.path().join("bin")));
  assert_eq!(
    Path::new(json["include_dir"].as_str().unwrap()),
    temp.path().join("include")
  );
}

#[cfg(unix)]
fn install_fake_tool(root: &Path, body: &str) -> PathBuf {
  use std::os::unix::fs::PermissionsExt;

  let bin = root.join("bin");
  fs::create_dir_all(&bin).unwrap();
  let tool = bin.join("vitis_hls");
  fs::write(&tool, format!("#!/bin/sh\n{body}\n")).unwrap();
  fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();
  tool
}

#[cfg(unix)]
#[test]
fn test_run_with_tool_path() {
  let _serial = serial();
  let temp = tempdir().unwrap();
  let tool = install_fake_tool(&temp.path().join("tool"), r#"cp "$1" vitis_hls.log"#);
  let work = temp.path().join("work");
  fs::create_dir_all(&work).unwrap();

  let output = vhls()
    .arg("run")
    .arg("tests/fixtures/job.toml")
    .arg("--tool-path")
    .arg(&tool)
    .arg("--working-dir")
    .arg(&work)
    .output()
    .unwrap();
  assert!(output.status.success());

  let json: Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["exit_code"], 0);
  assert_eq!(json["log"], json["script"]);
  assert_eq!(json["commands"].as_array().unwrap().len(), 7);
  assert!(work.join("vitis_hls.log").is_file());
}

#[cfg(unix)]
#[test]
fn test_run_check_fails_on_tool_failure() {
  let _serial = serial();
  let temp = tempdir().unwrap();
  let tool = install_fake_tool(&temp.path().join("tool"), "echo x > vitis_hls.log\nexit 2");

  vhls()
    .arg("run")
    .arg("tests/fixtures/job.toml")
    .arg("--check")
    .arg("--tool-path")
    .arg(&tool)
    .arg("--working-dir")
    .arg(temp.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("Tool invocation failed with exit code Some(2)"));
}

#[cfg(unix)]
#[test]
fn test_sweep_prints_one_line_per_job() {
  let _serial = serial();
  let temp = tempdir().unwrap();
  let tool = install_fake_tool(&temp.path().join("tool"), r#"cp "$1" vitis_hls.log"#);
  let runs = temp.path().join("runs");
  let sweep_file = temp.path().join("sweep.toml");
  fs::write(
    &sweep_file,
    format!(
      r#"
root = "{}"
max_parallel = 2

[[job]]
name = "second"

[[job.command]]
op = "open_project"
name = "prj"

[[job]]
name = "first"

[[job.command]]
op = "csynth_design"
"#,
      runs.display()
    ),
  )
  .unwrap();

  let output = vhls()
    .arg("sweep")
    .arg(&sweep_file)
    .arg("--tool-path")
    .arg(&tool)
    .output()
    .unwrap();
  assert!(output.status.success());

  let stdout = String::from_utf8(output.stdout).unwrap();
  let lines: Vec<Value> = stdout
    .lines()
    .map(|l| serde_json::from_str(l).unwrap())
    .collect();
  assert_eq!(lines.len(), 2);
  assert_eq!(lines[0]["name"], "first");
  assert_eq!(lines[1]["name"], "second");
  assert!(lines.iter().all(|l| l["status"] == "SUCCESS"));
  assert!(runs.join("first/vitis_hls.log").is_file());
}
