use std::{path::{Path, PathBuf}, time::Duration};
use confique::{serde::{self, Deserialize as _}, Config as _};

use crate::{
    attack::LoadConfig,
    log::LogConfig,
    prelude::*,
    sales::SaleConfig,
    target::TargetConfig,
};


const PATH_ENV: &str = "SALES_LOADTEST_CONFIG_PATH";
const DEFAULT_PATHS: [&str; 2] = ["config.toml", "/etc/sales-loadtest/config.toml"];


/// Loads the configuration. An explicitly given path (CLI or env) must exist.
/// Otherwise the default locations are tried and, if none exists, only
/// defaults and environment variables are used.
pub fn load(explicit_path: Option<&Path>) -> Result<Config> {
    let explicit = explicit_path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(PATH_ENV).map(PathBuf::from));

    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("config file '{}' does not exist", path.display());
            }
            Some(path)
        }
        None => DEFAULT_PATHS.iter().map(PathBuf::from).find(|p| p.exists()),
    };

    let mut builder = Config::builder().env();
    match &path {
        Some(path) => {
            debug!("loading config from '{}'", path.display());
            builder = builder.file(path);
        }
        None => debug!("no config file found, using defaults"),
    }

    builder.load().with_context(|| match &path {
        Some(path) => format!("failed to load config file '{}'", path.display()),
        None => "failed to load config".into(),
    })
}

pub fn template() -> String {
    let mut options = confique::toml::FormatOptions::default();
    options.general.nested_field_gap = 2;
    confique::toml::template::<Config>(options)
}

#[derive(Debug, confique::Config)]
pub struct Config {
    #[config(nested)]
    pub target: TargetConfig,

    #[config(nested)]
    pub sale: SaleConfig,

    #[config(nested)]
    pub load: LoadConfig,

    #[config(nested)]
    pub log: LogConfig,
}


/// Custom format for durations. We allow a couple useful units and required
/// a unit to increase readability of config files.
pub fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let s = String::deserialize(deserializer)?;

    // Allow unit-less zeroes
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let start_unit = s.find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| D::Error::custom("no time unit for duration"))?;
    let (num, unit) = s.split_at(start_unit);
    let num: u32 = num.parse()
        .map_err(|e| D::Error::custom(format!("invalid integer for duration: {}", e)))?;
    let num: u64 = num.into();

    match unit {
        "ms" => Ok(Duration::from_millis(num)),
        "s" => Ok(Duration::from_secs(num)),
        "min" => Ok(Duration::from_secs(num * 60)),
        "h" => Ok(Duration::from_secs(num * 60 * 60)),
        "d" => Ok(Duration::from_secs(num * 60 * 60 * 24)),
        _ => Err(D::Error::custom("invalid unit of time for duration")),
    }
}


#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::attack::StopCondition;
    use super::*;

    fn duration(s: &str) -> Result<Duration, serde_json::Error> {
        deserialize_duration(serde_json::Value::String(s.into()))
    }

    #[test]
    fn durations() {
        assert_eq!(duration("0").unwrap(), Duration::ZERO);
        assert_eq!(duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(duration("5min").unwrap(), Duration::from_secs(300));
        assert_eq!(duration("2h").unwrap(), Duration::from_secs(7200));
        assert_eq!(duration("1d").unwrap(), Duration::from_secs(86400));
    }

    #[test]
    fn invalid_durations() {
        assert!(duration("30").is_err());
        assert!(duration("s").is_err());
        assert!(duration("3 weeks").is_err());
        assert!(duration("-1s").is_err());
    }

    #[test]
    fn defaults_load_without_file() {
        let config = Config::builder().load().unwrap();
        assert_eq!(config.target.environment, "production");
        assert_eq!(config.sale.product, "teste");
        assert_eq!(config.load.users, 1);
        assert_eq!(config.load.iterations, 1);
    }

    #[test]
    fn template_mentions_all_sections() {
        let template = template();
        for section in ["[target]", "[sale]", "[load]", "[log]"] {
            assert!(template.contains(section), "missing {section} in template");
        }
    }

    /// Loads `contents` through a temporary config file named after `name`.
    fn load_toml(name: &str, contents: &str) -> Result<Config> {
        let path = std::env::temp_dir()
            .join(format!("sales-loadtest-{name}-{}.toml", std::process::id()));
        std::fs::write(&path, contents).unwrap();

        let config = load(Some(path.as_path()));
        std::fs::remove_file(&path).unwrap();
        config
    }

    #[test]
    fn loads_explicit_file() {
        let config = load_toml("config", concat!(
            "[target]\n",
            "environment = \"local\"\n",
            "\n",
            "[sale]\n",
            "product = \"widget\"\n",
            "amount = 10.5\n",
        )).unwrap();

        assert_eq!(config.target.environment, "local");
        assert_eq!(config.target.base_address().unwrap().as_str(), "http://0.0.0.0:8080");
        assert_eq!(config.sale.product, "widget");
        assert_eq!(config.sale.amount, 10.5);
    }

    #[test]
    fn run_time_from_file_is_not_capped_by_iterations() {
        let config = load_toml("run-time", "[load]\nrun_time = \"30s\"\n").unwrap();
        assert_eq!(config.load.iterations, None);
        assert_eq!(config.load.stop_condition(), StopCondition::RunTime(30));
    }

    #[test]
    fn run_time_with_iterations_is_rejected() {
        let result = load_toml("both-limits", "[load]\nrun_time = \"30s\"\niterations = 5\n");
        assert!(result.is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let path = std::env::temp_dir().join("sales-loadtest-does-not-exist.toml");
        assert!(load(Some(path.as_path())).is_err());
    }
}
