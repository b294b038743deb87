use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct MyAnimeListConfig {
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AniListConfig {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    #[serde(skip)]
    path: PathBuf,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_suwayomi_url")]
    pub suwayomi_url: String,
    #[serde(default = "default_redirect_url")]
    pub redirect_url: String,
    // Heuristic for rejecting obviously truncated AniList authorization
    // codes; tracks the provider's current code format.
    #[serde(default = "default_anilist_min_code_length")]
    pub anilist_min_code_length: usize,
    #[serde(default = "default_token_path")]
    pub token_path: String,
    pub myanimelist: Option<MyAnimeListConfig>,
    pub anilist: Option<AniListConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: hondana_home().join("config.yml"),
            base_url: None,
            port: default_port(),
            suwayomi_url: default_suwayomi_url(),
            redirect_url: default_redirect_url(),
            anilist_min_code_length: default_anilist_min_code_length(),
            token_path: default_token_path(),
            myanimelist: None,
            anilist: None,
        }
    }
}

fn hondana_home() -> PathBuf {
    match std::env::var("HONDANA_HOME") {
        Ok(path) => PathBuf::from(path),
        Err(_) => dirs::home_dir().expect("should have home").join(".hondana"),
    }
}

fn default_port() -> u16 {
    8080
}

fn default_suwayomi_url() -> String {
    "http://localhost:4567".to_string()
}

fn default_redirect_url() -> String {
    "http://localhost:8080/validate/suwayomi".to_string()
}

fn default_anilist_min_code_length() -> usize {
    740
}

fn default_token_path() -> String {
    let path = hondana_home();
    if !path.exists() {
        let _ = std::fs::create_dir_all(&path);
    }
    path.join("tokens.json").display().to_string()
}

impl Config {
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Config, anyhow::Error> {
        let config_path = match path {
            Some(p) => PathBuf::new().join(p),
            None => hondana_home().join("config.yml"),
        };

        match std::fs::File::open(config_path.clone()) {
            Ok(file) => {
                info!("open config from {:?}", config_path);
                let mut cfg: Self = serde_yml::from_reader(file)?;
                cfg.path = config_path;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Config {
                    path: config_path,
                    ..Default::default()
                };
                cfg.save()?;
                info!("write default config at {:?}", cfg.path);
                Ok(cfg)
            }
        }
    }

    pub fn save(&self) -> Result<(), anyhow::Error> {
        if let Some(parent) = self.path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        std::fs::write(&self.path, serde_yml::to_string(&self)?)?;

        Ok(())
    }

    /// Where this instance is reachable from the browser; the OAuth redirect
    /// endpoints hang off this.
    pub fn local_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}", self.port))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config {
            path: PathBuf::new(),
            ..Default::default()
        };

        assert_eq!(config.port, 8080);
        assert_eq!(config.anilist_min_code_length, 740);
        assert_eq!(config.suwayomi_url, "http://localhost:4567");
        assert_eq!(config.redirect_url, "http://localhost:8080/validate/suwayomi");
        assert_eq!(config.local_url(), "http://localhost:8080");
    }

    #[test]
    fn test_base_url_overrides_local_url() {
        let config = Config {
            path: PathBuf::new(),
            base_url: Some("https://manga.example.org".to_string()),
            ..Default::default()
        };

        assert_eq!(config.local_url(), "https://manga.example.org");
    }
}
