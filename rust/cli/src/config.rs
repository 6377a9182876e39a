use serde::{Deserialize, Serialize};
use std::fs;

pub const CONFIG_ENV: &str = "DUELYARD_CONFIG";
pub const SEED_ENV: &str = "DUELYARD_SEED";
pub const HISTORY_CAPACITY_ENV: &str = "DUELYARD_HISTORY_CAPACITY";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub seed: Option<u64>,
    pub history_capacity: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub seed: ValueSource,
    pub history_capacity: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            seed: ValueSource::Default,
            history_capacity: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            history_capacity: 1000,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {}", e),
            ConfigError::Invalid(msg) => f.write_str(msg),
        }
    }
}

pub fn load() -> Result<Config, ConfigError> {
    load_with_sources().map(|resolved| resolved.config)
}

/// Defaults, then the TOML file named by `DUELYARD_CONFIG`, then env overrides.
pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Ok(path) = std::env::var(CONFIG_ENV)
        && !path.is_empty()
    {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
            sources.seed = ValueSource::File;
        }
        if let Some(v) = f.history_capacity {
            cfg.history_capacity = v;
            sources.history_capacity = ValueSource::File;
        }
    }

    if let Ok(seed) = std::env::var(SEED_ENV)
        && !seed.is_empty()
    {
        cfg.seed = Some(
            seed.parse()
                .map_err(|_| ConfigError::Invalid(format!("Invalid seed: {}", seed)))?,
        );
        sources.seed = ValueSource::Env;
    }
    if let Ok(cap) = std::env::var(HISTORY_CAPACITY_ENV)
        && !cap.is_empty()
    {
        cfg.history_capacity = cap
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("Invalid history capacity: {}", cap)))?;
        sources.history_capacity = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    history_capacity: Option<usize>,
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.history_capacity == 0 {
        return Err(ConfigError::Invalid("history_capacity must be >0".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clear_env() {
        unsafe {
            std::env::remove_var(CONFIG_ENV);
            std::env::remove_var(SEED_ENV);
            std::env::remove_var(HISTORY_CAPACITY_ENV);
        }
    }

    #[test]
    #[serial]
    fn defaults_without_file_or_env() {
        clear_env();
        let resolved = load_with_sources().expect("defaults load");
        assert_eq!(resolved.config, Config::default());
        assert_eq!(resolved.sources.seed, ValueSource::Default);
        assert_eq!(resolved.sources.history_capacity, ValueSource::Default);
    }

    #[test]
    #[serial]
    fn env_overrides_file() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "seed = 11\nhistory_capacity = 5").expect("write");

        unsafe {
            std::env::set_var(CONFIG_ENV, file.path());
            std::env::set_var(SEED_ENV, "99");
        }
        let resolved = load_with_sources();
        clear_env();

        let resolved = resolved.expect("load");
        assert_eq!(resolved.config.seed, Some(99));
        assert_eq!(resolved.sources.seed, ValueSource::Env);
        assert_eq!(resolved.config.history_capacity, 5);
        assert_eq!(resolved.sources.history_capacity, ValueSource::File);
    }

    #[test]
    #[serial]
    fn zero_capacity_is_rejected() {
        clear_env();
        unsafe {
            std::env::set_var(HISTORY_CAPACITY_ENV, "0");
        }
        let result = load();
        clear_env();
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    #[serial]
    fn unknown_file_keys_are_rejected() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "starting_stack = 20000").expect("write");
        unsafe {
            std::env::set_var(CONFIG_ENV, file.path());
        }
        let result = load();
        clear_env();
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
