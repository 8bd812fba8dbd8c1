//! Service configuration.
//!
//! Resolution order (highest priority first):
//! 1. CLI flags (applied by the binary)
//! 2. Environment variables (`CONTENT_ENGINE_*`)
//! 3. TOML file (`--config` or `CONTENT_ENGINE_CONFIG`)
//! 4. Compiled defaults

use std::{collections::BTreeMap, ffi::OsString, fs, path::{Path, PathBuf}};

use serde::{Deserialize, Serialize};

use crate::{
    error::{EngineError, Result},
    vectorizer::TFIDFParams,
};

pub const ENV_CONFIG: &str = "CONTENT_ENGINE_CONFIG";
pub const ENV_BIND: &str = "CONTENT_ENGINE_BIND";
pub const ENV_INDEX_DIR: &str = "CONTENT_ENGINE_INDEX_DIR";
pub const ENV_USER: &str = "CONTENT_ENGINE_USER";
pub const ENV_PASSWORD: &str = "CONTENT_ENGINE_PASSWORD";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub server: ServerConfig,
    pub log: LogConfig,
}

/// Everything `ContentEngine` needs; passed in explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory of the persisted artifact set
    pub index_dir: PathBuf,
    /// `num` used when a request omits it
    pub default_num: i64,
    pub vectorizer: TFIDFParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            index_dir: PathBuf::from("./index"),
            default_num: 10,
            vectorizer: TFIDFParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// username -> password for basic auth
    pub users: BTreeMap<String, String>,
    pub realm: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
            users: BTreeMap::new(),
            realm: "content-engine".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `CONTENT_ENGINE_LOG` is unset
    pub filter: String,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Drops variables whose name or value is not valid UTF-8.
fn utf8_vars<I>(vars: I) -> impl Iterator<Item = (String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
}

impl Config {
    /// Load with file and environment layers applied.
    /// `path` wins over `CONTENT_ENGINE_CONFIG`; no file at all means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var_os(ENV_CONFIG).map(PathBuf::from);
        let mut config = match path.map(Path::to_path_buf).or(env_path) {
            Some(p) => Self::from_file(&p)?,
            None => Self::default(),
        };
        config.apply_env_overrides(utf8_vars(std::env::vars_os()));
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
            .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Apply `CONTENT_ENGINE_*` variables from `vars`.
    /// A user is only added when both user and password are present.
    pub fn apply_env_overrides<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut user = None;
        let mut password = None;
        for (key, value) in vars {
            match key.as_str() {
                ENV_BIND => self.server.bind = value,
                ENV_INDEX_DIR => self.engine.index_dir = PathBuf::from(value),
                ENV_USER => user = Some(value),
                ENV_PASSWORD => password = Some(value),
                _ => {}
            }
        }
        if let (Some(u), Some(p)) = (user, password) {
            self.server.users.insert(u, p);
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.engine.vectorizer.validate()?;
        if self.engine.default_num < 0 {
            return Err(EngineError::Config(format!(
                "engine.default_num must not be negative, got {}",
                self.engine.default_num
            )));
        }
        Ok(())
    }
}

impl ServerConfig {
    /// `serve` needs at least one account.
    pub fn require_users(&self) -> Result<()> {
        if self.users.is_empty() {
            return Err(EngineError::Config(format!(
                "no basic auth users configured; set server.users or {ENV_USER}/{ENV_PASSWORD}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorizer::{DocFrequency, StopWords};

    #[test]
    fn empty_toml_is_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.engine.vectorizer.ngram_range, (1, 3));
        assert_eq!(config.server.bind, "127.0.0.1:5000");
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = Config::from_toml_str(
            r#"
            [engine]
            index_dir = "/var/lib/ce"

            [engine.vectorizer]
            ngram_range = [1, 2]
            stop_words = "none"
            min_df = 2
            max_df = 0.9

            [server.users]
            admin = "secret"

            [log]
            json = true
            "#,
        )
        .unwrap();
        assert_eq!(config.engine.index_dir, PathBuf::from("/var/lib/ce"));
        assert_eq!(config.engine.default_num, 10);
        let v = &config.engine.vectorizer;
        assert_eq!(v.ngram_range, (1, 2));
        assert_eq!(v.stop_words, StopWords::None);
        assert_eq!(v.min_df, DocFrequency::Count(2));
        assert_eq!(v.max_df, DocFrequency::Proportion(0.9));
        assert!(v.lowercase);
        assert_eq!(config.server.users.get("admin").map(String::as_str), Some("secret"));
        assert_eq!(config.server.realm, "content-engine");
        assert!(config.log.json);
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn unparsable_toml_is_config_error() {
        assert!(matches!(
            Config::from_toml_str("[engine\nindex_dir = 3"),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn env_overrides() {
        let mut config = Config::default();
        let vars = [
            (ENV_BIND, "0.0.0.0:8080"),
            (ENV_INDEX_DIR, "/tmp/idx"),
            (ENV_USER, "alice"),
            ("UNRELATED", "x"),
        ]
        .map(|(k, v)| (k.to_string(), v.to_string()));
        config.apply_env_overrides(vars.clone());
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.engine.index_dir, PathBuf::from("/tmp/idx"));
        // password missing
        assert!(config.server.users.is_empty());
        assert!(config.server.require_users().is_err());

        config.apply_env_overrides([
            (ENV_USER.to_string(), "alice".to_string()),
            (ENV_PASSWORD.to_string(), "pw".to_string()),
        ]);
        assert_eq!(config.server.users.get("alice").map(String::as_str), Some("pw"));
        assert!(config.server.require_users().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_variables_are_skipped() {
        use std::os::unix::ffi::OsStringExt;

        let vars = vec![
            (OsString::from(ENV_BIND), OsString::from_vec(vec![0x66, 0x80, 0xff])),
            (OsString::from_vec(vec![0xfe, 0x41]), OsString::from("x")),
            (OsString::from(ENV_INDEX_DIR), OsString::from("/srv/index")),
        ];
        let mut config = Config::default();
        config.apply_env_overrides(utf8_vars(vars));
        assert_eq!(config.server.bind, "127.0.0.1:5000");
        assert_eq!(config.engine.index_dir, PathBuf::from("/srv/index"));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = Config::default();
        config.engine.default_num = -1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.engine.vectorizer.ngram_range = (0, 2);
        assert!(config.validate().is_err());
    }
}
