use std::env;
use std::path::PathBuf;

pub const DEFAULT_STORE_PATH: &str = "genai_survey_responses.jsonl";
pub const STORE_PATH_ENV: &str = "SURVEY_STORE_PATH";
pub const LOG_JSON_ENV: &str = "SURVEY_LOG_JSON";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store_path: PathBuf,
    pub log_json: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let store_path = lookup(STORE_PATH_ENV)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH));
        let log_json = lookup(LOG_JSON_ENV)
            .and_then(|value| parse_bool(&value))
            .unwrap_or(false);
        Self {
            store_path,
            log_json,
        }
    }

    pub fn with_store_override(mut self, store: Option<PathBuf>) -> Self {
        if let Some(path) = store {
            self.store_path = path;
        }
        self
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name: &str| {
            pairs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn defaults_without_environment() {
        let config = Config::from_lookup(lookup_from(&[]));
        assert_eq!(config.store_path, PathBuf::from(DEFAULT_STORE_PATH));
        assert!(!config.log_json);
    }

    #[test]
    fn reads_path_and_log_format() {
        let config = Config::from_lookup(lookup_from(&[
            (STORE_PATH_ENV, "/var/lib/survey/responses.jsonl"),
            (LOG_JSON_ENV, "yes"),
        ]));
        assert_eq!(
            config.store_path,
            PathBuf::from("/var/lib/survey/responses.jsonl")
        );
        assert!(config.log_json);
    }

    #[test]
    fn unknown_bool_falls_back_and_flag_overrides_path() {
        let config = Config::from_lookup(lookup_from(&[(LOG_JSON_ENV, "maybe")]))
            .with_store_override(Some(PathBuf::from("override.jsonl")));
        assert!(!config.log_json);
        assert_eq!(config.store_path, PathBuf::from("override.jsonl"));
    }
}
