//! HTTP server settings loaded from environment variables.

use std::path::Path;

use thiserror::Error;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8001;
pub const DEFAULT_ALLOWED_EXTENSIONS: &str = ".txt,.pdf,.md,.csv,.html,.htm,.doc,.docx";
pub const DEFAULT_UPLOAD_MAX_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid {
        var: &'static str,
        reason: String,
    },
}

/// Server settings shared by every handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Lowercased extensions with a leading dot, in configured order.
    pub allowed_extensions: Vec<String>,
    pub max_upload_bytes: usize,
    pub debug: bool,
}

impl AppConfig {
    /// Env: `HOST`, `PORT`, `ALLOWED_EXTENSIONS`, `UPLOAD_MAX_BYTES`, `DEBUG`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|k: &str| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(env: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |k: &str| env(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match var("PORT") {
            Some(p) => p.parse::<u16>().map_err(|e| ConfigError::Invalid {
                var: "PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };
        let max_upload_bytes = match var("UPLOAD_MAX_BYTES") {
            Some(n) => n.parse::<usize>().map_err(|e| ConfigError::Invalid {
                var: "UPLOAD_MAX_BYTES",
                reason: e.to_string(),
            })?,
            None => DEFAULT_UPLOAD_MAX_BYTES,
        };
        let debug = match var("DEBUG").map(|v| v.to_ascii_lowercase()).as_deref() {
            None | Some("true") | Some("1") => true,
            Some("false") | Some("0") => false,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "DEBUG",
                    reason: format!("expected true or false, got `{other}`"),
                });
            }
        };

        let raw_exts = var("ALLOWED_EXTENSIONS").unwrap_or_else(|| DEFAULT_ALLOWED_EXTENSIONS.into());
        let allowed_extensions = parse_extensions(&raw_exts);
        if allowed_extensions.is_empty() {
            return Err(ConfigError::Invalid {
                var: "ALLOWED_EXTENSIONS",
                reason: "no extensions listed".into(),
            });
        }

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.into()),
            port,
            allowed_extensions,
            max_upload_bytes,
            debug,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `true` when the lowercased extension of `filename` is on the allow-list.
    pub fn is_allowed(&self, filename: &str) -> bool {
        let lower = filename.to_lowercase();
        match Path::new(&lower).extension().and_then(|e| e.to_str()) {
            Some(ext) => self
                .allowed_extensions
                .iter()
                .any(|a| a.strip_prefix('.') == Some(ext)),
            None => false,
        }
    }
}

fn parse_extensions(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in raw.split(',') {
        let item = item.trim().to_lowercase();
        if item.is_empty() {
            continue;
        }
        let ext = if item.starts_with('.') { item } else { format!(".{item}") };
        if !out.contains(&ext) {
            out.push(ext);
        }
    }
    out
}
