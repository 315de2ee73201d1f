use anyhow::Result;
use config::Config;
use std::env;

pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL_NAME: &str = "gemini-2.5-flash";

#[derive(Clone, Debug, serde::Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_gemini_api_url")]
    pub gemini_api_url: String,
    #[serde(default)]
    pub gemini_api_key: String,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    pub temperature: Option<f32>,
    pub request_timeout_secs: Option<u64>,
    pub max_tickers: Option<usize>,
    pub bind_address: Option<String>,
    pub log_dir: Option<String>,
}

fn default_gemini_api_url() -> String {
    DEFAULT_GEMINI_API_URL.to_string()
}

fn default_model_name() -> String {
    DEFAULT_MODEL_NAME.to_string()
}

impl AppConfig {
    /// Конфигурация с настройками по умолчанию
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        AppConfig {
            gemini_api_url: default_gemini_api_url(),
            gemini_api_key: api_key.into(),
            model_name: default_model_name(),
            temperature: None,
            request_timeout_secs: None,
            max_tickers: None,
            bind_address: None,
            log_dir: None,
        }
    }

    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(0.2)
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs.unwrap_or(60)
    }

    // Корзина VN30 - 30 тикеров
    pub fn max_tickers(&self) -> usize {
        self.max_tickers.unwrap_or(30)
    }

    pub fn bind_address(&self) -> &str {
        self.bind_address.as_deref().unwrap_or("0.0.0.0:3000")
    }

    /// Валидация конфигурации
    pub fn validate(&self) -> Result<()> {
        if self.model_name.trim().is_empty() {
            return Err(anyhow::anyhow!("model_name cannot be empty"));
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(anyhow::anyhow!("temperature must be between 0.0 and 2.0"));
            }
        }

        if let Some(timeout) = self.request_timeout_secs {
            if timeout == 0 || timeout > 600 {
                return Err(anyhow::anyhow!("request_timeout_secs must be between 1 and 600"));
            }
        }

        if let Some(max_tickers) = self.max_tickers {
            if max_tickers == 0 || max_tickers > 100 {
                return Err(anyhow::anyhow!("max_tickers must be between 1 and 100"));
            }
        }

        Ok(())
    }
}

pub fn load_config() -> Result<AppConfig> {
    // Загружаем .env файл
    dotenvy::dotenv().ok();

    let settings = Config::builder()
        .add_source(config::File::with_name("config").required(false))
        .add_source(config::Environment::with_prefix("VN30_SENTINEL"))
        .build()?;

    let mut config: AppConfig = settings.try_deserialize()?;

    config.gemini_api_key = env::var("GEMINI_API_KEY")
        .map_err(|_| anyhow::anyhow!("GEMINI_API_KEY environment variable is required"))?;

    config.validate()?;

    Ok(config)
}
