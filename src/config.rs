//! Application-level configuration loading, including the runtime prompt pool.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PROMPT_CLASH_CONFIG_PATH";
/// Rounds played per game unless the configuration says otherwise.
const DEFAULT_TOTAL_ROUNDS: u32 = 3;
/// Inactivity window after which a room expires from the store.
const DEFAULT_ROOM_TTL_SECONDS: u64 = 3_600;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    prompts: Vec<String>,
    total_rounds: u32,
    room_ttl: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// baked-in prompt pool and defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        prompts = config.prompts.len(),
                        rounds = config.total_rounds,
                        "loaded configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Pool of battle prompts; guaranteed non-empty.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Number of rounds a game lasts.
    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    /// How long an untouched room (and its image blobs) stays in the store.
    pub fn room_ttl(&self) -> Duration {
        self.room_ttl
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            prompts: default_prompts(),
            total_rounds: DEFAULT_TOTAL_ROUNDS,
            room_ttl: Duration::from_secs(DEFAULT_ROOM_TTL_SECONDS),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    prompts: Vec<String>,
    total_rounds: Option<u32>,
    room_ttl_seconds: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let prompts = if value.prompts.is_empty() {
            warn!("config declares no prompts; using the built-in pool");
            default_prompts()
        } else {
            value.prompts
        };

        Self {
            prompts,
            total_rounds: value.total_rounds.unwrap_or(DEFAULT_TOTAL_ROUNDS).max(1),
            room_ttl: Duration::from_secs(
                value.room_ttl_seconds.unwrap_or(DEFAULT_ROOM_TTL_SECONDS),
            ),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in prompt pool shipped with the binary.
fn default_prompts() -> Vec<String> {
    [
        "The creature hidden in IKEA",
        "A canceled children's toy",
        "The worst pizza topping",
        "Surreal fashion show",
        "Cyberpunk farmer",
        "A dog's fever dream",
        "Intergalactic DMV",
        "Haunted toaster",
        "A midlife crisis for a dragon",
        "Viking at a tech support desk",
        "The ghost of a Victorian child discovering a fidget spinner",
        "Medieval medical procedure performed by pigeons",
        "Extreme ironing in a volcano",
        "A fancy dinner party attended only by capybaras",
        "The secret life of garden gnomes",
        "Steampunk underwater city",
        "A world where everyone is a literal potato",
        "Cat conducting a symphony of meows",
        "Renaissance painting of a guy eating a Big Mac",
        "Cybernetic Bigfoot",
        "The DMV (Department of Mythical Vehicles)",
        "A knight in shining armor fighting a Roomba",
        "Alien abduction but the spaceship is just a giant taco",
        "Samurai pizza delivery",
    ]
    .iter()
    .map(|prompt| prompt.to_string())
    .collect()
}
