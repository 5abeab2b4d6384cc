use std::{fs, path::PathBuf, sync::Mutex};

use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::utils;

const DEFAULT_JSON_URL: &str = "https://www.marian.edu/events/_data/current-live.json";
const DEFAULT_RSS_URL: &str = "https://connect.marian.edu/events.rss";
const DEFAULT_SPORTS_RSS_URL: &str =
    "https://muknights.com/calendar.ashx/calendar.rss?sport_id=0&_=cmapqlxzs0001359sumhrir9j";
const DEFAULT_TARGET_LOCATION: &str = "Indianapolis";
const DEFAULT_TIMEZONE: &str = "US/Eastern";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub json_url: String,
    pub rss_url: String,
    pub sports_rss_url: String,
    pub target_location: String,
    pub timezone: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            json_url: DEFAULT_JSON_URL.to_string(),
            rss_url: DEFAULT_RSS_URL.to_string(),
            sports_rss_url: DEFAULT_SPORTS_RSS_URL.to_string(),
            target_location: DEFAULT_TARGET_LOCATION.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

impl AppConfig {
    pub fn target_tz(&self) -> Tz {
        self.timezone.parse().unwrap_or(chrono_tz::US::Eastern)
    }
}

pub struct ConfigStore {
    path: PathBuf,
    data: Mutex<AppConfig>,
}

impl ConfigStore {
    pub fn load() -> Self {
        let path = utils::config_path();
        let data = read_config(&path).unwrap_or_default();
        Self {
            path,
            data: Mutex::new(data),
        }
    }

    pub fn read(&self) -> AppConfig {
        self.data.lock().expect("config mutex poisoned").clone()
    }

    pub fn update<F>(&self, transform: F) -> Result<AppConfig>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut guard = self
            .data
            .lock()
            .map_err(|_| anyhow!("config mutex poisoned"))?;
        transform(&mut guard);
        write_config(&self.path, &guard)?;
        Ok(guard.clone())
    }
}

fn read_config(path: &PathBuf) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents =
        fs::read_to_string(path).with_context(|| format!("unable to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("malformed config {}", path.display()))
}

fn write_config(path: &PathBuf, config: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("unable to create {}", parent.display()))?;
    }
    let contents = serde_json::to_string_pretty(config)?;
    fs::write(path, contents).with_context(|| format!("unable to write {}", path.display()))
}
