extern crate tempdir;

use anyhow::Context;
use indoc::indoc;
use tempdir::TempDir;

const DEFAULT_CONFIG: &str = indoc! {r#"
appenders:
  stdout:
    kind: console
    encoder:
      pattern: "{h({d(%Y-%m-%d %H:%M:%S)(utc)} - {l} - {f}:{L} - {m}{n})}"
  file_logger:
    kind: rolling_file
    path: "logs/camshift-rs.log"
    encoder:
      pattern: "{d(%Y-%m-%d %H:%M:%S)(utc)} - {l} - {f}:{L} - {m}{n}"
    policy:
      trigger:
        kind: size
        limit: 1Mb
      roller:
        kind: fixed_window
        base: 1
        count: 3
        pattern: "logs/camshift-rs_{}.log"
root:
  level: info
  appenders:
    - stdout
    - file_logger
"#};

/// Loads `log4rs.yaml` next to the executable, or the built-in default.
pub fn setup_logging() -> anyhow::Result<()> {
    let mut log_config_path =
        std::env::current_exe().context("could not locate the executable")?;
    log_config_path.pop();
    log_config_path.push("log4rs.yaml");

    if log_config_path.exists() {
        return log4rs::init_file(&log_config_path, Default::default())
            .with_context(|| format!("invalid log config {}", log_config_path.display()));
    }

    // the application directory may be read only, stage the default elsewhere
    let tmp_dir = TempDir::new("camshift-rs").context("failed to create tmp log configuration")?;
    let tmp_log_config = tmp_dir.path().join("log4rs.yaml");
    std::fs::write(&tmp_log_config, DEFAULT_CONFIG)
        .context("unable to write default log configuration")?;
    log4rs::init_file(tmp_log_config, Default::default())
}

