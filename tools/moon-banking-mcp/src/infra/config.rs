use crate::infra::metrics::MetricsServerConfig;
use anyhow::{Context, Result, anyhow, bail};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_DIR_ENV: &str = "MOON_BANKING_CONFIG_DIR";
const CONFIG_PROFILE_ENV: &str = "MOON_BANKING_CONFIG_PROFILE";
const DEFAULT_CONFIG_DIR: &str = "config";
const DEFAULT_PROFILE: &str = "default";

pub const API_KEY_ENV: &str = "MOON_BANKING_API_KEY";
pub const BASE_URL_ENV: &str = "MOON_BANKING_INTERNAL_BASE_URL";
pub const TIMEOUT_ENV: &str = "MOON_BANKING_TIMEOUT_MS";
pub const DEFAULT_BASE_URL: &str = "https://api.moonbanking.com/v1";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<String> for ApiKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ApiKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub base_url: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub metrics_addr: Option<String>,
    pub metrics_auth_token: Option<String>,
    #[serde(skip)]
    pub api_key: Option<ApiKey>,
}

/// Everything the upstream client needs, validated.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: Url,
    pub api_key: ApiKey,
    pub timeout: Duration,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let base_dir = env::var(CONFIG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_DIR));
        Self::load_from_dir(&base_dir)
    }

    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut config = AppConfig::default();
        let mut overlays = Vec::new();

        if dir.exists() {
            let mut profiles = vec![DEFAULT_PROFILE.to_string()];
            if let Ok(active_profile) = env::var(CONFIG_PROFILE_ENV) {
                if !active_profile.trim().is_empty() && active_profile != DEFAULT_PROFILE {
                    profiles.push(active_profile);
                }
            }
            profiles.push("local".to_string());

            for profile in profiles {
                let candidate = dir.join(format!("{profile}.toml"));
                if let Some(overlay) = ConfigOverlay::from_file(&candidate)? {
                    overlays.push(overlay);
                }
            }
        }

        overlays.push(ConfigOverlay::from_env()?);

        for overlay in overlays {
            config.apply_overlay(overlay);
        }

        Ok(config)
    }

    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        if let Some(value) = overlay.base_url {
            self.base_url = Some(value);
        }
        if let Some(value) = overlay.request_timeout_ms {
            self.request_timeout_ms = Some(value);
        }
        if let Some(value) = overlay.metrics_addr {
            self.metrics_addr = Some(value);
        }
        if let Some(value) = overlay.metrics_auth_token {
            self.metrics_auth_token = Some(value);
        }
        if let Some(value) = overlay.api_key {
            self.api_key = Some(value);
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn upstream(&self) -> Result<UpstreamConfig> {
        let api_key = self
            .api_key
            .clone()
            .ok_or_else(|| anyhow!("{API_KEY_ENV} environment variable is required"))?;

        let raw = self.base_url();
        let base_url = Url::parse(raw).with_context(|| format!("parse base url '{raw}'"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!("base url '{raw}' must use http or https");
        }

        let timeout_ms = self.request_timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
        if timeout_ms == 0 {
            bail!("request timeout must be greater than 0");
        }

        Ok(UpstreamConfig {
            base_url,
            api_key,
            timeout: Duration::from_millis(timeout_ms),
        })
    }

    pub fn metrics_server_config(&self) -> Result<Option<MetricsServerConfig>> {
        let addr = match self.metrics_addr.as_ref() {
            Some(addr) => addr
                .parse::<SocketAddr>()
                .with_context(|| format!("parse METRICS_ADDR '{}'", addr))?,
            None => return Ok(None),
        };
        Ok(Some(MetricsServerConfig {
            addr,
            auth_token: self.metrics_auth_token.clone(),
        }))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigOverlay {
    base_url: Option<String>,
    request_timeout_ms: Option<u64>,
    metrics_addr: Option<String>,
    metrics_auth_token: Option<String>,
    // never read from files
    #[serde(skip)]
    api_key: Option<ApiKey>,
}

impl ConfigOverlay {
    fn from_file(path: &Path) -> Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let overlay: Self = toml::from_str(&contents)
            .with_context(|| format!("parse config file {}", path.display()))?;
        Ok(Some(overlay))
    }

    fn from_env() -> Result<Self> {
        let base_url = non_blank_var(BASE_URL_ENV);
        let request_timeout_ms = match non_blank_var(TIMEOUT_ENV) {
            Some(raw) => Some(
                raw.parse::<u64>()
                    .with_context(|| format!("parse {TIMEOUT_ENV} '{raw}'"))?,
            ),
            None => None,
        };
        let metrics_addr = non_blank_var("METRICS_ADDR");
        let metrics_auth_token = non_blank_var("METRICS_AUTH_TOKEN");
        let api_key = non_blank_var(API_KEY_ENV).map(ApiKey);
        Ok(Self {
            base_url,
            request_timeout_ms,
            metrics_addr,
            metrics_auth_token,
            api_key,
        })
    }
}

fn non_blank_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const ALL_VARS: &[&str] = &[
        CONFIG_PROFILE_ENV,
        API_KEY_ENV,
        BASE_URL_ENV,
        TIMEOUT_ENV,
        "METRICS_ADDR",
        "METRICS_AUTH_TOKEN",
    ];

    fn with_env<F: FnOnce()>(vars: &[(&str, Option<&str>)], f: F) {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let snapshot: Vec<(String, Option<String>)> = ALL_VARS
            .iter()
            .map(|k| (k.to_string(), env::var(k).ok()))
            .collect();
        for key in ALL_VARS {
            unsafe {
                // SAFETY: env mutation is serialized by ENV_MUTEX and restored below.
                env::remove_var(key);
            }
        }
        for (key, value) in vars {
            if let Some(val) = value {
                unsafe {
                    env::set_var(key, val);
                }
            }
        }
        f();
        for (key, value) in snapshot {
            match value {
                Some(val) => unsafe {
                    env::set_var(&key, val);
                },
                None => unsafe {
                    env::remove_var(&key);
                },
            }
        }
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let dir = tempdir().expect("tempdir");
        with_env(&[], || {
            let cfg = AppConfig::load_from_dir(dir.path()).expect("config load");
            let err = cfg.upstream().unwrap_err();
            assert!(err.to_string().contains(API_KEY_ENV));
        });
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let dir = tempdir().expect("tempdir");
        with_env(&[(API_KEY_ENV, Some("   "))], || {
            let cfg = AppConfig::load_from_dir(dir.path()).expect("config load");
            assert!(cfg.upstream().is_err());
        });
    }

    #[test]
    fn defaults_apply_without_files() {
        let dir = tempdir().expect("tempdir");
        with_env(&[(API_KEY_ENV, Some("secret"))], || {
            let cfg = AppConfig::load_from_dir(dir.path()).expect("config load");
            let upstream = cfg.upstream().expect("upstream config");
            assert_eq!(upstream.base_url.as_str(), "https://api.moonbanking.com/v1");
            assert_eq!(upstream.api_key.expose(), "secret");
            assert_eq!(upstream.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
            assert!(cfg.metrics_server_config().expect("metrics").is_none());
        });
    }

    #[test]
    fn env_overrides_profile_files() {
        let dir = tempdir().expect("tempdir");
        fs::write(
            dir.path().join("default.toml"),
            "base_url = \"https://files.example/v1\"\nrequest_timeout_ms = 1000\n",
        )
        .expect("write default");
        fs::write(
            dir.path().join("staging.toml"),
            "request_timeout_ms = 2500\nmetrics_addr = \"127.0.0.1:9464\"\n",
        )
        .expect("write staging");
        fs::write(
            dir.path().join("local.toml"),
            "metrics_auth_token = \"scrape\"\n",
        )
        .expect("write local");

        with_env(
            &[
                (CONFIG_PROFILE_ENV, Some("staging")),
                (API_KEY_ENV, Some("secret")),
                (BASE_URL_ENV, Some("http://127.0.0.1:8080")),
            ],
            || {
                let cfg = AppConfig::load_from_dir(dir.path()).expect("config load");
                assert_eq!(cfg.base_url(), "http://127.0.0.1:8080");
                assert_eq!(cfg.request_timeout_ms, Some(2500));
                let metrics = cfg.metrics_server_config().expect("metrics").expect("enabled");
                assert_eq!(metrics.addr, "127.0.0.1:9464".parse().unwrap());
                assert_eq!(metrics.auth_token.as_deref(), Some("scrape"));
            },
        );
    }

    #[test]
    fn api_key_is_not_read_from_files_and_is_redacted() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("default.toml"), "api_key = \"leaked\"\n")
            .expect("write default");
        with_env(&[], || {
            assert!(AppConfig::load_from_dir(dir.path()).is_err());
        });

        let cfg = AppConfig {
            api_key: Some(ApiKey("secret".into())),
            ..Default::default()
        };
        assert!(!format!("{cfg:?}").contains("secret"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempdir().expect("tempdir");
        with_env(
            &[(API_KEY_ENV, Some("secret")), (BASE_URL_ENV, Some("ftp://x"))],
            || {
                let cfg = AppConfig::load_from_dir(dir.path()).expect("config load");
                assert!(cfg.upstream().is_err());
            },
        );
        with_env(
            &[(API_KEY_ENV, Some("secret")), (TIMEOUT_ENV, Some("0"))],
            || {
                let cfg = AppConfig::load_from_dir(dir.path()).expect("config load");
                assert!(cfg.upstream().is_err());
            },
        );
        with_env(&[(TIMEOUT_ENV, Some("soon"))], || {
            assert!(AppConfig::load_from_dir(dir.path()).is_err());
        });
    }
}
