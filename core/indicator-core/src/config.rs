//! Indicator configuration file.
//!
//! The indicator script's backends (terminal tint, sound, desktop and push
//! notifications) are configured in `~/.config/agent-indicator/config.json`
//! (or `$XDG_CONFIG_HOME/agent-indicator/config.json`). Built-in defaults are
//! deep-merged underneath the user file; only the user file is ever written.
//!
//! The script reads its settings as `AGENT_INDICATOR_*` environment variables,
//! produced by [`shell_exports`]. Variables already present in the environment
//! win over the file.

use fs_err as fs;
use serde_json::{Map, Number, Value};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{IndicatorError, Result};

pub const CONFIG_DIR_NAME: &str = "agent-indicator";
pub const CONFIG_FILE_NAME: &str = "config.json";

const DEFAULTS_JSON: &str = include_str!("../defaults.json");

/// Config dotpath → environment variable consumed by the indicator script.
pub const ENV_MAP: &[(&str, &str)] = &[
    ("backends.terminal.enabled", "AGENT_INDICATOR_TERMINAL"),
    (
        "backends.terminal.bg_restore_timeout",
        "AGENT_INDICATOR_TERMINAL_BG_RESTORE_TIMEOUT",
    ),
    (
        "backends.terminal.bg_needs_input",
        "AGENT_INDICATOR_TERMINAL_BG_NEEDS_INPUT",
    ),
    ("backends.terminal.bg_done", "AGENT_INDICATOR_TERMINAL_BG_DONE"),
    ("backends.sound.enabled", "AGENT_INDICATOR_SOUND"),
    ("backends.sound.pack", "AGENT_INDICATOR_SOUND_PACK"),
    ("backends.sound.volume", "AGENT_INDICATOR_SOUND_VOLUME"),
    (
        "backends.sound.states.needs-input",
        "AGENT_INDICATOR_SOUND_STATE_NEEDS_INPUT",
    ),
    ("backends.sound.states.done", "AGENT_INDICATOR_SOUND_STATE_DONE"),
    ("backends.desktop.enabled", "AGENT_INDICATOR_DESKTOP"),
    (
        "backends.desktop.states.needs-input",
        "AGENT_INDICATOR_DESKTOP_STATE_NEEDS_INPUT",
    ),
    (
        "backends.desktop.states.done",
        "AGENT_INDICATOR_DESKTOP_STATE_DONE",
    ),
    (
        "backends.desktop.title_format",
        "AGENT_INDICATOR_DESKTOP_TITLE_FORMAT",
    ),
    (
        "backends.desktop.body_format",
        "AGENT_INDICATOR_DESKTOP_BODY_FORMAT",
    ),
    ("backends.push.enabled", "AGENT_INDICATOR_PUSH"),
    ("backends.push.service", "AGENT_INDICATOR_PUSH_SERVICE"),
    ("backends.push.topic", "AGENT_INDICATOR_PUSH_TOPIC"),
    ("backends.push.server", "AGENT_INDICATOR_PUSH_SERVER"),
    ("backends.push.token", "AGENT_INDICATOR_PUSH_TOKEN"),
    (
        "backends.push.states.needs-input",
        "AGENT_INDICATOR_PUSH_STATE_NEEDS_INPUT",
    ),
    ("backends.push.states.done", "AGENT_INDICATOR_PUSH_STATE_DONE"),
];

// MARK: - Paths

/// Returns the config directory (`$XDG_CONFIG_HOME/agent-indicator` or `~/.config/agent-indicator`).
pub fn config_dir() -> Result<PathBuf> {
    let xdg = env::var("XDG_CONFIG_HOME").ok();
    let home = dirs::home_dir();
    config_dir_from(xdg.as_deref(), home.as_deref())
}

pub fn config_dir_from(xdg_config_home: Option<&str>, home: Option<&Path>) -> Result<PathBuf> {
    if let Some(xdg) = xdg_config_home.filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(xdg).join(CONFIG_DIR_NAME));
    }
    home.map(|h| h.join(".config").join(CONFIG_DIR_NAME))
        .ok_or(IndicatorError::HomeDirNotFound)
}

// MARK: - Store

/// Reads and writes one config file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(config_dir()?.join(CONFIG_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The user's overrides only. Missing file is an empty object.
    pub fn load_user(&self) -> Result<Value> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Value::Object(Map::new()))
            }
            Err(source) => {
                return Err(IndicatorError::Io {
                    context: "reading config".to_string(),
                    source,
                })
            }
        };

        let value: Value =
            serde_json::from_str(&content).map_err(|err| IndicatorError::ConfigMalformed {
                path: self.path.clone(),
                details: err.to_string(),
            })?;

        if !value.is_object() {
            return Err(IndicatorError::ConfigMalformed {
                path: self.path.clone(),
                details: "expected a JSON object".to_string(),
            });
        }
        Ok(value)
    }

    /// Defaults with the user file merged on top.
    pub fn load_merged(&self) -> Result<Value> {
        Ok(deep_merge(&defaults(), &self.load_user()?))
    }

    pub fn save_user(&self, config: &Value) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| IndicatorError::ConfigWriteFailed {
                path: self.path.clone(),
                source,
            })?;
        }

        let mut content =
            serde_json::to_string_pretty(config).map_err(|source| IndicatorError::Json {
                context: "serializing config".to_string(),
                source,
            })?;
        content.push('\n');

        fs::write(&self.path, content).map_err(|source| IndicatorError::ConfigWriteFailed {
            path: self.path.clone(),
            source,
        })
    }

    /// Sets one value in the user file, converting `raw` with [`parse_scalar`].
    pub fn set(&self, dotpath: &str, raw: &str) -> Result<()> {
        let mut user = self.load_user()?;
        set_by_path(&mut user, dotpath, parse_scalar(raw))?;
        self.save_user(&user)
    }

    /// Creates an empty user file if none exists. Returns true if it was created.
    pub fn ensure(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        self.save_user(&Value::Object(Map::new()))?;
        Ok(true)
    }
}

// MARK: - Values

/// Built-in defaults shipped with the crate.
pub fn defaults() -> Value {
    serde_json::from_str(DEFAULTS_JSON).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "Built-in config defaults are invalid");
        Value::Object(Map::new())
    })
}

/// Objects merge key by key; anything else in `overlay` replaces `base`.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            let mut merged = base_map.clone();
            for (key, value) in overlay_map {
                let next = match merged.get(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        deep_merge(existing, value)
                    }
                    _ => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        _ => overlay.clone(),
    }
}

pub fn get_by_path<'a>(config: &'a Value, dotpath: &str) -> Option<&'a Value> {
    dotpath
        .split('.')
        .try_fold(config, |current, part| current.as_object()?.get(part))
}

/// Sets `value` at `dotpath`, creating (or replacing) intermediate objects.
pub fn set_by_path(config: &mut Value, dotpath: &str, value: Value) -> Result<()> {
    let parts: Vec<&str> = dotpath.split('.').collect();
    if parts.iter().any(|part| part.is_empty()) {
        return Err(IndicatorError::InvalidDotPath(dotpath.to_string()));
    }

    let (last, parents) = match parts.split_last() {
        Some(split) => split,
        None => return Err(IndicatorError::InvalidDotPath(dotpath.to_string())),
    };

    let mut current = config;
    for part in parents {
        current = ensure_object(current)
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    ensure_object(current).insert(last.to_string(), value);
    Ok(())
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced with an object"),
    }
}

/// Converts a command-line value: booleans, then numbers, else a string.
pub fn parse_scalar(raw: &str) -> Value {
    match raw.to_lowercase().as_str() {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    let number = if raw.contains('.') {
        raw.parse::<f64>().ok().and_then(Number::from_f64)
    } else {
        parse_integer(raw)
    };

    number
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

/// Whole numbers too large for `i64`/`u64` are kept as the nearest float.
fn parse_integer(raw: &str) -> Option<Number> {
    if let Ok(n) = raw.parse::<i64>() {
        return Some(Number::from(n));
    }
    if let Ok(n) = raw.parse::<u64>() {
        return Some(Number::from(n));
    }
    let digits = raw.strip_prefix(|c| c == '-' || c == '+').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Human-facing rendering used by `config get`.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Object(_) => serde_json::to_string_pretty(value).unwrap_or_default(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn to_shell_value(value: &Value) -> String {
    match value {
        Value::Bool(true) => "on".to_string(),
        Value::Bool(false) => "off".to_string(),
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `export KEY='value'` lines for every mapped setting whose variable isn't already set.
/// Settings that are absent or null are skipped.
pub fn shell_exports(config: &Value, is_set: impl Fn(&str) -> bool) -> String {
    ENV_MAP
        .iter()
        .filter(|(_, env_key)| !is_set(*env_key))
        .filter_map(|(dotpath, env_key)| {
            let value = get_by_path(config, dotpath).filter(|value| !value.is_null())?;
            let escaped = to_shell_value(value).replace('\'', r"'\''");
            Some(format!("export {}='{}'", env_key, escaped))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
