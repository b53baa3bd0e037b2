use anyhow::Result;
use serde::{Deserialize, Serialize};
use shellexpand::tilde;
use std::fs;
use std::io::{BufReader, Read};
use std::path::PathBuf;

pub const DEFAULT_SOURCE_URL: &str = "https://api.biorxiv.org/details";

#[derive(Serialize, Deserialize)]
pub struct Settings {
    /// Directory the input and output files live in.
    #[serde(default = "default_download_path")]
    pub download_path: String,
    /// Base URL of the details API.
    #[serde(default = "default_source_url")]
    pub source_url: String,
}

fn default_download_path() -> String {
    ".".to_string()
}

fn default_source_url() -> String {
    DEFAULT_SOURCE_URL.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            download_path: default_download_path(),
            source_url: default_source_url(),
        }
    }
}

impl Settings {
    /// Resolve a file name against the configured download directory.
    pub fn data_path(&self, file_name: &str) -> PathBuf {
        let mut path = PathBuf::from(tilde(&self.download_path).to_string());
        path.push(file_name);
        path
    }
}

pub fn read_settings_file() -> Result<Settings> {
    // Base directory
    let base_dir = tilde("~/.biorxiv2sql").to_string();
    let mut settings_path = PathBuf::from(&base_dir);
    // Make sure the directories exist
    fs::create_dir_all(&settings_path)?;
    settings_path.push("config.toml");
    if settings_path.exists() {
        let file = fs::File::open(&settings_path)?;
        let mut reader = BufReader::new(file);
        let mut toml_content = String::new();
        reader.read_to_string(&mut toml_content)?;
        let settings: Settings = toml::from_str(&toml_content)?;
        Ok(settings)
    } else {
        // Return default configuration if file doesn't exist
        Ok(Settings::default())
    }
}
