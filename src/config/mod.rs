use chrono::NaiveDate;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::AppError;

const DEFAULT_DATA_DIR: &str = "manifold_datasets";
const DEFAULT_REFERENCE_DATE: &str = "2024-07-06";

/// Which batch jobs to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    Profits,
    Churn,
    All,
}

impl Job {
    pub fn runs_profits(&self) -> bool {
        matches!(self, Job::Profits | Job::All)
    }

    pub fn runs_churn(&self) -> bool {
        matches!(self, Job::Churn | Job::All)
    }
}

impl FromStr for Job {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "profits" => Ok(Job::Profits),
            "churn" => Ok(Job::Churn),
            "all" => Ok(Job::All),
            other => Err(AppError::Config(format!("unknown JOB '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Inputs
    pub bets_path: PathBuf,
    pub contracts_path: PathBuf,
    pub comments_path: PathBuf,

    // Outputs
    pub output_dir: PathBuf,

    pub job: Job,
    /// Snapshot date; tenure day counts are measured from its UTC midnight.
    pub reference_date: NaiveDate,
    pub supported_outcome_types: Vec<String>,
    pub workers: usize,
    pub cohort_filter: bool,
    pub log_format: LogFormat,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!(
                "LOG_FORMAT '{other}' must be 'text' or 'json'"
            ))),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.into());

        let data_dir = PathBuf::from(var_or("DATA_DIR", DEFAULT_DATA_DIR));
        let path_or = |key: &str, file: &str| {
            lookup(key)
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join(file))
        };

        let reference_raw = var_or("REFERENCE_DATE", DEFAULT_REFERENCE_DATE);
        let reference_date = NaiveDate::parse_from_str(&reference_raw, "%Y-%m-%d")
            .map_err(|e| AppError::Config(format!("REFERENCE_DATE '{reference_raw}': {e}")))?;

        let supported_outcome_types = parse_list(&var_or("SUPPORTED_OUTCOME_TYPES", "BINARY"));
        if supported_outcome_types.is_empty() {
            return Err(AppError::Config(
                "SUPPORTED_OUTCOME_TYPES must name at least one outcome type".into(),
            ));
        }

        let workers = match lookup("WORKERS") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| AppError::Config(format!("WORKERS '{raw}' is not a positive integer")))?,
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        };

        let cohort_filter = match lookup("COHORT_FILTER") {
            Some(raw) => parse_flag("COHORT_FILTER", &raw)?,
            None => true,
        };

        Ok(Self {
            bets_path: path_or("BETS_PATH", "bets.ndjson"),
            contracts_path: path_or("CONTRACTS_PATH", "contracts.ndjson"),
            comments_path: path_or("COMMENTS_PATH", "comments.ndjson"),
            output_dir: lookup("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.clone()),
            job: var_or("JOB", "all").parse()?,
            reference_date,
            supported_outcome_types,
            workers,
            cohort_filter,
            log_format: var_or("LOG_FORMAT", "text").parse()?,
        })
    }

    pub fn profits_output(&self) -> PathBuf {
        self.output_dir.join("profits.ndjson")
    }

    pub fn churn_output(&self) -> PathBuf {
        self.output_dir.join("churn.ndjson")
    }

    pub fn metrics_output(&self) -> PathBuf {
        self.output_dir.join("metrics.prom")
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(AppError::Config(format!("{key} '{raw}' is not a boolean"))),
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_job_parse() {
        assert_eq!("Profits".parse::<Job>().unwrap(), Job::Profits);
        assert_eq!(" all ".parse::<Job>().unwrap(), Job::All);
        assert!("report".parse::<Job>().is_err());
        assert!(Job::All.runs_churn() && Job::All.runs_profits());
        assert!(!Job::Churn.runs_profits());
    }

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[("WORKERS", "2")])).unwrap();
        assert!(config.cohort_filter);
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.job, Job::All);
        assert_eq!(config.workers, 2);
        assert_eq!(config.supported_outcome_types, vec!["BINARY".to_string()]);
        assert_eq!(config.reference_date, NaiveDate::from_ymd_opt(2024, 7, 6).unwrap());
        assert_eq!(config.bets_path, PathBuf::from(DEFAULT_DATA_DIR).join("bets.ndjson"));
    }

    #[test]
    fn test_cohort_filter_accepts_boolean_spellings() {
        for (raw, expected) in [("false", false), ("0", false), (" OFF ", false), ("True", true), ("yes", true)] {
            let config = AppConfig::from_lookup(lookup_from(&[("COHORT_FILTER", raw)])).unwrap();
            assert_eq!(config.cohort_filter, expected, "COHORT_FILTER={raw}");
        }
    }

    #[test]
    fn test_cohort_filter_rejects_unrecognized_value() {
        let err = AppConfig::from_lookup(lookup_from(&[("COHORT_FILTER", "flase")])).unwrap_err();
        assert!(matches!(err, AppError::Config(ref msg) if msg.contains("COHORT_FILTER")));
    }

    #[test]
    fn test_log_format_parse() {
        let config = AppConfig::from_lookup(lookup_from(&[("LOG_FORMAT", "JSON")])).unwrap();
        assert_eq!(config.log_format, LogFormat::Json);

        let err = AppConfig::from_lookup(lookup_from(&[("LOG_FORMAT", "jsno")])).unwrap_err();
        assert!(matches!(err, AppError::Config(ref msg) if msg.contains("LOG_FORMAT")));
    }

    #[test]
    fn test_invalid_workers_rejected() {
        assert!(AppConfig::from_lookup(lookup_from(&[("WORKERS", "0")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[("WORKERS", "many")])).is_err());
    }

    #[test]
    fn test_parse_list_normalizes() {
        assert_eq!(
            parse_list("binary, pseudo_numeric ,,"),
            vec!["BINARY".to_string(), "PSEUDO_NUMERIC".to_string()]
        );
    }
}
