//! Run configuration.
//!
//! Paths and filter names come from the command line. Everything about the
//! execution environment (participant count, unknown-filter policy, log
//! level) comes from an optional YAML file and environment variables, with
//! the variables taking precedence.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::plan::UnknownFilterPolicy;

pub const CONFIG_ENV: &str = "BANDFILTER_CONFIG";
pub const WORKERS_ENV: &str = "BANDFILTER_WORKERS";
pub const UNKNOWN_FILTERS_ENV: &str = "BANDFILTER_UNKNOWN_FILTERS";
pub const LOG_ENV: &str = "BANDFILTER_LOG";

pub const USAGE: &str =
    "usage: bandfilter <input> <output> [smooth|blur|sharpen|mean|emboss ...]";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSettings {
    /// Number of participants, coordinator included.
    pub workers: usize,
    pub unknown_filters: UnknownFilterPolicy,
    pub log_level: String,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            unknown_filters: UnknownFilterPolicy::default(),
            log_level: "info".to_string(),
        }
    }
}

impl JobSettings {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let settings: JobSettings =
            serde_yml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Defaults, then the YAML file named by [`CONFIG_ENV`], then the
    /// individual variables. `env` looks a variable up by name.
    pub fn load<F>(env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = match env(CONFIG_ENV) {
            Some(path) => {
                let text = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
                Self::from_yaml(&text)?
            }
            None => Self::default(),
        };

        if let Some(workers) = env(WORKERS_ENV) {
            settings.workers = workers.trim().parse().map_err(|_| {
                Error::Config(format!("{WORKERS_ENV}='{workers}' is not a count"))
            })?;
        }
        if let Some(policy) = env(UNKNOWN_FILTERS_ENV) {
            settings.unknown_filters = policy.parse()?;
        }
        if let Some(level) = env(LOG_ENV) {
            settings.log_level = level;
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn from_env() -> Result<Self> {
        Self::load(|key| std::env::var(key).ok())
    }

    fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::Config("participant count must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub filter_tokens: Vec<String>,
    pub settings: JobSettings,
}

impl RunConfig {
    /// `args` excludes the program name.
    pub fn from_args<I>(args: I, settings: JobSettings) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let input = args
            .next()
            .ok_or_else(|| Error::Usage(format!("missing input path\n{USAGE}")))?;
        let output = args
            .next()
            .ok_or_else(|| Error::Usage(format!("missing output path\n{USAGE}")))?;

        Ok(Self {
            input: PathBuf::from(input),
            output: PathBuf::from(output),
            filter_tokens: args.collect(),
            settings,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use common::test_utils::test_output_path;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let settings = JobSettings::load(env_of(&[])).unwrap();
        assert!(settings.workers >= 1);
        assert_eq!(settings.unknown_filters, UnknownFilterPolicy::Skip);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn environment_overrides() {
        let settings = JobSettings::load(env_of(&[
            (WORKERS_ENV, "6"),
            (UNKNOWN_FILTERS_ENV, "reject"),
            (LOG_ENV, "debug"),
        ]))
        .unwrap();

        assert_eq!(settings.workers, 6);
        assert_eq!(settings.unknown_filters, UnknownFilterPolicy::Reject);
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn zero_workers_is_rejected() {
        let result = JobSettings::load(env_of(&[(WORKERS_ENV, "0")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn non_numeric_workers_is_rejected() {
        let result = JobSettings::load(env_of(&[(WORKERS_ENV, "many")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn yaml_fills_missing_fields_with_defaults() {
        let settings = JobSettings::from_yaml("workers: 3\nunknown_filters: reject\n").unwrap();
        assert_eq!(settings.workers, 3);
        assert_eq!(settings.unknown_filters, UnknownFilterPolicy::Reject);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn environment_wins_over_yaml_file() {
        let path = test_output_path("config_env_wins.yaml");
        std::fs::write(&path, "workers: 3\nlog_level: warn\n").unwrap();
        let path = path.to_string_lossy().to_string();

        let settings =
            JobSettings::load(env_of(&[(CONFIG_ENV, path.as_str()), (WORKERS_ENV, "5")])).unwrap();
        assert_eq!(settings.workers, 5);
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn missing_config_file_is_io_error() {
        let result = JobSettings::load(env_of(&[(CONFIG_ENV, "/nonexistent/bandfilter.yaml")]));
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn args_need_both_paths() {
        let settings = JobSettings::default();
        let result = RunConfig::from_args(vec!["in.pgm".to_string()], settings);
        assert!(matches!(result, Err(Error::Usage(_))));
    }

    #[test]
    fn args_collect_filter_tokens() {
        let args = ["in.pgm", "out.pgm", "blur", "nope", "mean"].map(String::from);
        let config = RunConfig::from_args(args, JobSettings::default()).unwrap();

        assert_eq!(config.input, PathBuf::from("in.pgm"));
        assert_eq!(config.output, PathBuf::from("out.pgm"));
        assert_eq!(config.filter_tokens, vec!["blur", "nope", "mean"]);
    }
}
