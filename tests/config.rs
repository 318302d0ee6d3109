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
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tempfile::tempdir;
use vhls::cli::GlobalArgs;
use vhls::command::Command;
use vhls::config::Settings;
use vhls::error::ConfigError;
use vhls::error::VhlsError;
use vhls::logging::setup_tracing;
use vhls::runner::DEFAULT_LOG_FILE;

#[test]
fn test_defaults_without_config_file() {
  let temp = tempdir().unwrap();
  let settings: Settings = Settings::figment(&temp.path().join("vhls.toml"))
    .extract()
    .unwrap();

  assert_eq!(settings.tool_path, None);
  assert_eq!(settings.working_dir, PathBuf::from("."));
  assert_eq!(settings.log_file_name, DEFAULT_LOG_FILE);
  assert!(!settings.keep_script);
  assert!(!settings.strict_latency);
  assert!(settings.max_parallel >= 1);
}

#[test]
fn test_config_file_and_cli_overrides() {
  let temp = tempdir().unwrap();
  let config = temp.path().join("vhls.toml");
  fs::write(
    &config,
    r#"
tool_path = "/opt/Xilinx/Vitis_HLS/2023.2/bin/vitis_hls"
working_dir = "from_file"
log_file_name = "hls.log"
keep_script = true
max_parallel = 3
strict_latency = true
"#,
  )
  .unwrap();

  let args = GlobalArgs {
    config: Some(config),
    working_dir: Some(PathBuf::from("from_cli")),
    ..GlobalArgs::default()
  };
  let settings = Settings::load(&args).unwrap();

  assert_eq!(settings.working_dir, PathBuf::from("from_cli"));
  assert_eq!(settings.log_file_name, "hls.log");
  assert!(settings.keep_script);
  assert_eq!(settings.max_parallel, 3);
  assert!(settings.strict_latency);

  let dist = settings.distribution().unwrap();
  assert_eq!(dist.root(), Path::new("/opt/Xilinx/Vitis_HLS/2023.2"));

  let runner = settings.runner().unwrap();
  assert_eq!(runner.log_path(), PathBuf::from("from_cli/hls.log"));
}

#[test]
fn test_zero_parallelism_is_rejected() {
  let temp = tempdir().unwrap();
  let config = temp.path().join("vhls.toml");
  fs::write(&config, "max_parallel = 0\n").unwrap();

  let args = GlobalArgs {
    config: Some(config),
    ..GlobalArgs::default()
  };
  assert!(matches!(
    Settings::load(&args),
    Err(ConfigError::ZeroParallelism)
  ));
}

#[test]
fn test_bad_config_value_is_an_error() {
  let temp = tempdir().unwrap();
  let config = temp.path().join("vhls.toml");
  fs::write(&config, "keep_script = \"maybe\"\n").unwrap();

  let args = GlobalArgs {
    config: Some(config),
    ..GlobalArgs::default()
  };
  assert!(matches!(
    Settings::load(&args),
    Err(ConfigError::Figment(_))
  ));
}

#[test]
fn test_subsystem_errors_convert_to_vhls_error() {
  fn build() -> Result<Command, VhlsError> {
    Ok(Command::open_solution("s1")?.with("flow_target", "quartus")?)
  }
  assert!(matches!(build(), Err(VhlsError::Command(_))));
}

#[test]
fn test_setup_tracing_is_idempotent() {
  setup_tracing();
  setup_tracing();
  tracing::info!("still logging");
}
