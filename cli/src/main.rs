//! fieldcore CLI - headless host for one date field.
//!
//! Reads one command per line from stdin and answers with JSON lines on
//! stdout. Logs go to stderr.
//!
//! ```text
//! main() -> Session::new(config) -> execute(line) -> Output
//!                                        |
//!                                        v
//!                          state / accept payloads / errors
//! ```

mod repl;

use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use fieldcore_config::{ConfigError, FieldcoreConfig};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::repl::{Outcome, Session};

fn init_tracing(filter: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter.unwrap_or("info")))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries the protocol; logs must stay on stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
}

/// `--config PATH` is the only flag.
fn config_arg(mut args: impl Iterator<Item = String>) -> Result<Option<PathBuf>> {
    let mut path = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let value = args.next().context("--config needs a path")?;
                path = Some(PathBuf::from(value));
            }
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(path)
}

/// The config to run with. A broken default config is kept aside so it
/// can be logged once tracing is up.
struct LoadedConfig {
    config: Option<FieldcoreConfig>,
    ignored: Option<ConfigError>,
}

fn load_config(path: Option<PathBuf>) -> Result<LoadedConfig> {
    match path {
        Some(path) => {
            let config = FieldcoreConfig::load_from(&path)?;
            if config.is_none() {
                bail!("config not found: {}", path.display());
            }
            Ok(LoadedConfig {
                config,
                ignored: None,
            })
        }
        None => Ok(match FieldcoreConfig::load() {
            Ok(config) => LoadedConfig {
                config,
                ignored: None,
            },
            Err(err) => LoadedConfig {
                config: None,
                ignored: Some(err),
            },
        }),
    }
}

fn main() -> Result<()> {
    let LoadedConfig { config, ignored } = load_config(config_arg(env::args().skip(1))?)?;
    init_tracing(config.as_ref().and_then(FieldcoreConfig::log_filter));
    if let Some(err) = ignored {
        tracing::warn!(path = %err.path().display(), "Ignoring default config: {err}");
    }

    let field_config = config
        .as_ref()
        .map(FieldcoreConfig::field)
        .unwrap_or_default();
    let mut session = Session::new(&field_config)?;
    tracing::info!(
        has_date = field_config.has_date,
        has_time = field_config.has_time,
        "Date field ready"
    );

    let stdin = io::stdin();
    let mut out = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        match session.execute(&line) {
            Ok(Outcome::Quit) => break,
            Ok(Outcome::Output(lines)) => {
                for line in lines {
                    writeln!(out, "{line}")?;
                }
            }
            Err(err) => {
                tracing::debug!(command = %line, "command failed");
                writeln!(out, "{}", serde_json::json!({ "error": format!("{err:#}") }))?;
            }
        }
        out.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|arg| (*arg).to_owned()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn config_flag() {
        assert_eq!(config_arg(args(&[])).unwrap(), None);
        assert_eq!(
            config_arg(args(&["--config", "a.toml"])).unwrap(),
            Some(PathBuf::from("a.toml"))
        );
        assert!(config_arg(args(&["--config"])).is_err());
        assert!(config_arg(args(&["--verbose"])).is_err());
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(dir.path().join("absent.toml"))).is_err());
    }
}
