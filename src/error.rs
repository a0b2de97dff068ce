use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed message: {0}")]
    Decode(#[from] quick_xml::DeError),

    #[error("Reply encoding error: {0}")]
    Encode(#[from] quick_xml::SeError),

    #[error("Handler error: {0}")]
    Handler(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upstream error {code}: {message}")]
    Upstream { code: i64, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, error_code) = match &self {
            // 微信回调接口不接受JSON错误体，只返回状态码
            AppError::Decode(e) => {
                tracing::warn!("Malformed inbound message: {}", e);
                return StatusCode::BAD_REQUEST.into_response();
            }
            AppError::Encode(e) => {
                tracing::error!("Failed to encode reply: {}", e);
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
            AppError::Handler(msg) => {
                tracing::error!("Message handler failed: {}", msg);
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone(), "VALIDATION_ERROR")
            }
            AppError::Upstream { code, message } => {
                tracing::error!("WeChat API error {}: {}", code, message);
                (StatusCode::BAD_GATEWAY, message.clone(), "UPSTREAM_ERROR")
            }
            AppError::Config(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string(), "CONFIG_ERROR")
            }
            AppError::Serialization(e) => {
                tracing::error!("Serialization error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Serialization error".to_string(), "SERIALIZATION_ERROR")
            }
            AppError::Request(e) => {
                tracing::error!("Request error: {}", e);
                (StatusCode::BAD_GATEWAY, "Request error".to_string(), "REQUEST_ERROR")
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": error_message
            }
        }));

        (status, body).into_response()
    }
}

// 便利函数，用于创建常见错误
impl AppError {
    pub fn handler(msg: &str) -> Self {
        Self::Handler(msg.to_string())
    }

    pub fn validation(msg: &str) -> Self {
        Self::Validation(msg.to_string())
    }

    pub fn upstream(code: i64, message: &str) -> Self {
        Self::Upstream {
            code,
            message: message.to_string(),
        }
    }
}
