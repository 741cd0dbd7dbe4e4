use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Default GSA per-diem API base URL.
pub const DEFAULT_GSA_BASE_URL: &str = "https://api.gsa.gov/travel/perdiem/v2";

#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub google: GoogleConfig,
    pub gsa: GsaConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    pub api_key: String,
    /// Model used for receipt extraction (e.g., gemini-2.5-flash)
    pub receipt_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GsaConfig {
    pub api_key: String,
    pub base_url: String,
}

impl ExpenseConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(ExpenseConfig {
            common: common_config,
            google: GoogleConfig {
                api_key: get_env("GEMINI_API_KEY", None, is_prod)?,
                receipt_model: get_env("RECEIPT_MODEL", Some("gemini-2.5-flash"), is_prod)?,
            },
            gsa: GsaConfig {
                api_key: get_env("GSA_API_KEY", None, is_prod)?,
                base_url: get_env("GSA_BASE_URL", Some(DEFAULT_GSA_BASE_URL), is_prod)?,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
