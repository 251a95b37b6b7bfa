use crate::error::{Result, WeekgridError};
use crate::grid;
use crate::model::{ActivityRules, SlotTime};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekgridConfig {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_web_host")]
    pub host: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// Directory of browser client assets. Unknown paths fall back to its `index.html`.
    #[serde(default)]
    pub static_dir: Option<String>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_start_hour")]
    pub start_hour: u8,
    #[serde(default = "default_end_hour")]
    pub end_hour: u8,
    #[serde(default = "default_slot_minutes")]
    pub slot_minutes: u8,
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,
    /// Reject start times that are not grid slots.
    #[serde(default = "default_true")]
    pub enforce_grid: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            start_hour: default_start_hour(),
            end_hour: default_end_hour(),
            slot_minutes: default_slot_minutes(),
            max_name_length: default_max_name_length(),
            enforce_grid: true,
        }
    }
}

impl ScheduleConfig {
    pub fn slots(&self) -> Vec<SlotTime> {
        grid::time_slots(self.start_hour, self.end_hour, self.slot_minutes)
    }

    /// Validation limits for create payloads. `slots` must outlive the rules.
    pub fn rules<'a>(&self, slots: &'a [SlotTime]) -> ActivityRules<'a> {
        ActivityRules {
            max_name_length: self.max_name_length,
            allowed_times: self.enforce_grid.then_some(slots),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Snapshot file. Defaults to `~/.cache/weekgrid/snapshot.json`.
    #[serde(default)]
    pub cache_path: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            cache_path: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClientConfig {
    pub fn resolve_cache_path(&self) -> Result<PathBuf> {
        match &self.cache_path {
            Some(p) => Ok(PathBuf::from(p)),
            None => dirs::cache_dir()
                .map(|p| p.join("weekgrid").join("snapshot.json"))
                .ok_or_else(|| WeekgridError::Config("cannot determine cache directory".into())),
        }
    }
}

// -- Defaults --

fn default_web_host() -> String {
    "0.0.0.0".to_string()
}
fn default_web_port() -> u16 {
    3000
}
fn default_start_hour() -> u8 {
    9
}
fn default_end_hour() -> u8 {
    20
}
fn default_slot_minutes() -> u8 {
    30
}
fn default_max_name_length() -> usize {
    crate::model::DEFAULT_MAX_NAME_LENGTH
}
fn default_true() -> bool {
    true
}
fn default_server_url() -> String {
    "http://127.0.0.1:3000".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

impl WeekgridConfig {
    /// Load configuration with three-layer TOML merge plus environment:
    /// 1. ~/.config/weekgrid/config.toml (global)
    /// 2. .weekgrid/config.toml (project)
    /// 3. .weekgrid/config.local.toml (local, gitignored)
    /// 4. `WEEKGRID_<SECTION>__<KEY>` environment variables
    pub fn load(project_dir: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        if let Some(dir) = project_dir {
            let project_config = dir.join(".weekgrid").join("config.toml");
            if project_config.exists() {
                builder = builder.add_source(File::from(project_config).required(false));
            }

            let local_config = dir.join(".weekgrid").join("config.local.toml");
            if local_config.exists() {
                builder = builder.add_source(File::from(local_config).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("WEEKGRID")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| WeekgridError::Config(e.to_string()))?;

        let mut cfg: Self = config
            .try_deserialize()
            .map_err(|e| WeekgridError::Config(e.to_string()))?;

        cfg.validate();
        Ok(cfg)
    }

    /// Defaults only (no files, no environment).
    pub fn default_config() -> Self {
        Self {
            web: WebConfig::default(),
            schedule: ScheduleConfig::default(),
            client: ClientConfig::default(),
        }
    }

    /// Validate config values, fixing out-of-range values and logging warnings.
    /// Never rejects the config.
    pub fn validate(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();
        let schedule = &mut self.schedule;

        for (name, val) in [
            ("schedule.start_hour", &mut schedule.start_hour),
            ("schedule.end_hour", &mut schedule.end_hour),
        ] {
            if *val > 23 {
                warnings.push(format!("{name} = {val} out of range [0, 23], clamping"));
                *val = 23;
            }
        }

        if schedule.start_hour > schedule.end_hour {
            warnings.push(format!(
                "schedule.start_hour ({}) > schedule.end_hour ({}), swapping",
                schedule.start_hour, schedule.end_hour
            ));
            std::mem::swap(&mut schedule.start_hour, &mut schedule.end_hour);
        }

        if schedule.slot_minutes == 0 || 60 % schedule.slot_minutes != 0 {
            warnings.push(format!(
                "schedule.slot_minutes = {} does not divide an hour, setting to 30",
                schedule.slot_minutes
            ));
            schedule.slot_minutes = default_slot_minutes();
        }

        if schedule.max_name_length == 0 {
            warnings.push("schedule.max_name_length = 0, setting to 50".to_string());
            schedule.max_name_length = default_max_name_length();
        }

        if self.client.timeout_secs == 0 {
            warnings.push("client.timeout_secs = 0, setting to 10".to_string());
            self.client.timeout_secs = default_timeout_secs();
        }

        for w in &warnings {
            tracing::warn!("config: {}", w);
        }

        warnings
    }
}

fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("weekgrid").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WeekgridConfig::default_config();
        assert_eq!(config.web.host, "0.0.0.0");
        assert_eq!(config.web.port, 3000);
        assert!(config.web.static_dir.is_none());
        assert_eq!(config.schedule.start_hour, 9);
        assert_eq!(config.schedule.end_hour, 20);
        assert_eq!(config.schedule.slot_minutes, 30);
        assert_eq!(config.schedule.max_name_length, 50);
        assert!(config.schedule.enforce_grid);
        assert_eq!(config.client.server_url, "http://127.0.0.1:3000");
        assert_eq!(config.client.timeout_secs, 10);
    }

    #[test]
    fn test_load_config_no_files() {
        let config = WeekgridConfig::load(Some(Path::new("/nonexistent/path"))).unwrap();
        assert_eq!(config.schedule.slot_minutes, 30);
    }

    #[test]
    fn test_load_project_and_local_layers() {
        let dir = tempfile::tempdir().unwrap();
        let cfg_dir = dir.path().join(".weekgrid");
        std::fs::create_dir_all(&cfg_dir).unwrap();
        std::fs::write(
            cfg_dir.join("config.toml"),
            "[schedule]\nstart_hour = 8\nend_hour = 18\n",
        )
        .unwrap();
        std::fs::write(cfg_dir.join("config.local.toml"), "[schedule]\nend_hour = 21\n").unwrap();

        let config = WeekgridConfig::load(Some(dir.path())).unwrap();
        assert_eq!(config.schedule.start_hour, 8);
        assert_eq!(config.schedule.end_hour, 21);
        assert_eq!(config.schedule.slot_minutes, 30);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = WeekgridConfig::default_config();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: WeekgridConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.web.port, config.web.port);
        assert_eq!(parsed.schedule.end_hour, config.schedule.end_hour);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: WeekgridConfig = toml::from_str("[web]\nport = 8080\n").unwrap();
        assert_eq!(parsed.web.port, 8080);
        assert_eq!(parsed.web.host, "0.0.0.0");
        assert_eq!(parsed.schedule.start_hour, 9);
    }

    #[test]
    fn test_validate_default_config_no_warnings() {
        let mut config = WeekgridConfig::default_config();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_clamps_hours() {
        let mut config = WeekgridConfig::default_config();
        config.schedule.end_hour = 30;
        let warnings = config.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(config.schedule.end_hour, 23);
    }

    #[test]
    fn test_validate_swaps_inverted_hours() {
        let mut config = WeekgridConfig::default_config();
        config.schedule.start_hour = 20;
        config.schedule.end_hour = 9;
        config.validate();
        assert_eq!(config.schedule.start_hour, 9);
        assert_eq!(config.schedule.end_hour, 20);
    }

    #[test]
    fn test_validate_bad_slot_minutes() {
        for bad in [0, 7, 45] {
            let mut config = WeekgridConfig::default_config();
            config.schedule.slot_minutes = bad;
            assert!(!config.validate().is_empty());
            assert_eq!(config.schedule.slot_minutes, 30);
        }
    }

    #[test]
    fn test_validate_zero_integers() {
        let mut config = WeekgridConfig::default_config();
        config.schedule.max_name_length = 0;
        config.client.timeout_secs = 0;
        let warnings = config.validate();
        assert_eq!(warnings.len(), 2);
        assert_eq!(config.schedule.max_name_length, 50);
        assert_eq!(config.client.timeout_secs, 10);
    }

    #[test]
    fn test_rules_follow_enforce_grid() {
        let mut schedule = ScheduleConfig::default();
        let slots = schedule.slots();
        assert_eq!(slots.len(), 24);
        assert!(schedule.rules(&slots).allowed_times.is_some());

        schedule.enforce_grid = false;
        assert!(schedule.rules(&slots).allowed_times.is_none());
    }

    #[test]
    fn test_explicit_cache_path() {
        let client = ClientConfig {
            cache_path: Some("/tmp/wg.json".into()),
            ..Default::default()
        };
        assert_eq!(
            client.resolve_cache_path().unwrap(),
            PathBuf::from("/tmp/wg.json")
        );
    }
}
