use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub env: String,
    pub app: App,
    pub http: Http,
    pub logging: Logging,
    pub guard: GuardConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct App {
    /// Platform name shown in user-facing guard messages.
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Http {
    pub bind: String,
    /// Bearer token for the admin endpoints. `None` disables them.
    pub admin_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Logging {
    pub json: Option<bool>,
    pub level: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GuardConfig {
    #[serde(default = "default_sample_chars")]
    pub message_sample_chars: usize,
    #[serde(default = "default_max_violations")]
    pub max_violations_per_user: usize,
    #[serde(default = "default_recent_violations")]
    pub recent_violations: usize,
}

fn default_sample_chars() -> usize {
    100
}
fn default_max_violations() -> usize {
    50
}
fn default_recent_violations() -> usize {
    5
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            message_sample_chars: default_sample_chars(),
            max_violations_per_user: default_max_violations(),
            recent_violations: default_recent_violations(),
        }
    }
}

impl GuardConfig {
    /// Clamp every knob into a usable range.
    pub fn sanitize(mut self) -> Self {
        self.message_sample_chars = self.message_sample_chars.clamp(1, 500);
        self.max_violations_per_user = self.max_violations_per_user.clamp(1, 1000);
        self.recent_violations = self
            .recent_violations
            .clamp(1, self.max_violations_per_user);
        self
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        // Which environment?
        let env = std::env::var("TSG_ENV").unwrap_or_else(|_| "development".to_string());

        // .env.<env> first, then plain .env (both optional)
        let _ = dotenvy::from_filename(format!(".env.{}", env));
        let _ = dotenvy::dotenv();

        let path = format!("config/{}.toml", env);
        Self::load_with(&env, Path::new(&path))
    }

    /// Layers: defaults -> TOML file -> TSG_* env variables.
    pub fn load_with(env: &str, toml_path: &Path) -> Result<Self> {
        let figment = Figment::from(Serialized::defaults(Self::defaults(env)))
            .merge(Toml::file(toml_path))
            // TSG_HTTP__BIND => http.bind
            .merge(Env::prefixed("TSG_").ignore(&["ENV"]).split("__"));

        let mut s: Settings = figment.extract()?;
        s.env = env.to_string();
        s.guard = s.guard.sanitize();

        // an empty token in TOML/env means "no admin surface"
        if s.http.admin_token.as_deref().is_some_and(|t| t.trim().is_empty()) {
            s.http.admin_token = None;
        }

        Ok(s)
    }

    pub fn defaults(env: &str) -> Self {
        Self {
            env: env.to_string(),
            app: App {
                name: "TickSwapr".into(),
            },
            http: Http {
                bind: "127.0.0.1:8080".into(),
                admin_token: None,
            },
            logging: Logging {
                json: Some(false),
                level: Some("info".into()),
            },
            guard: GuardConfig::default(),
        }
    }
}
