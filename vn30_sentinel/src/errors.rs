// errors.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SentinelError {
    #[error("Ошибка HTTP запроса: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Ошибка парсинга JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Превышено время ожидания ответа модели для {0}")]
    Timeout(String),

    #[error("Некорректный формат данных: {0}")]
    InvalidDataFormat(String),

    #[error("Некорректный запрос: {0}")]
    InvalidRequest(String),

    #[error("API вернул ошибку: {0}")]
    ApiError(String),
}

// Определяем псевдоним Result с фиксированным типом ошибки
pub type Result<T> = std::result::Result<T, SentinelError>;
