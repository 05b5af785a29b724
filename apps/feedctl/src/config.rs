use std::{collections::HashMap, fs};

use serde::Deserialize;
use shared::flags::FlagSet;

#[derive(Debug)]
pub struct Settings {
    pub api_base_url: String,
    pub undo_window_secs: u64,
    pub flags: FlagSet,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8080/v1/".into(),
            undo_window_secs: 10,
            flags: FlagSet::default(),
        }
    }
}

/// Shape of `feedctl.toml`; every field optional so a partial file works.
#[derive(Debug, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    undo_window_secs: Option<u64>,
    #[serde(default)]
    flags: HashMap<String, serde_json::Value>,
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("feedctl.toml") {
        if let Ok(file_cfg) = toml::from_str::<FileSettings>(&raw) {
            if let Some(v) = file_cfg.api_base_url {
                settings.api_base_url = v;
            }
            if let Some(v) = file_cfg.undo_window_secs {
                settings.undo_window_secs = v;
            }
            for (key, value) in file_cfg.flags {
                settings.flags.set(key, value);
            }
        }
    }

    if let Ok(v) = std::env::var("FEED_API_URL") {
        settings.api_base_url = v;
    }
    if let Ok(v) = std::env::var("FEEDCTL__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Ok(v) = std::env::var("FEEDCTL__UNDO_WINDOW_SECS") {
        if let Ok(secs) = v.parse() {
            settings.undo_window_secs = secs;
        }
    }

    settings
}
