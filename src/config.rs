use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub server_host: String,
    pub server_port: u16,
    pub environment: String,
    pub log_level: String,
    pub log_format: String,

    // WeChat official account
    pub wechat_token: String,
    pub wechat_app_id: Option<String>,
    pub wechat_app_secret: Option<String>,
    pub wechat_api_base_url: String,

    // Limits
    pub http_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_body_size: usize,

    // Menu published at startup
    pub menu_file: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "80".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            log_level: env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "wechat_gateway=debug,tower_http=debug".to_string()),
            log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),

            wechat_token: env::var("WECHAT_TOKEN")
                .map_err(|_| anyhow::anyhow!("WECHAT_TOKEN must be set"))?,
            wechat_app_id: env::var("WECHAT_APP_ID").ok().filter(|v| !v.is_empty()),
            wechat_app_secret: env::var("WECHAT_APP_SECRET").ok().filter(|v| !v.is_empty()),
            wechat_api_base_url: env::var("WECHAT_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.weixin.qq.com".to_string()),

            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
            max_body_size: env::var("MAX_BODY_SIZE")
                .unwrap_or_else(|_| "65536".to_string())
                .parse()?,

            menu_file: env::var("MENU_FILE").ok().filter(|v| !v.is_empty()),
        })
    }

    /// 测试及嵌入场景使用的最小配置
    pub fn with_token(token: &str) -> Self {
        Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            environment: "test".to_string(),
            log_level: "debug".to_string(),
            log_format: "text".to_string(),
            wechat_token: token.to_string(),
            wechat_app_id: None,
            wechat_app_secret: None,
            wechat_api_base_url: "https://api.weixin.qq.com".to_string(),
            http_timeout_secs: 10,
            request_timeout_secs: 5,
            max_body_size: 64 * 1024,
            menu_file: None,
        }
    }

    /// 是否配置了公众号凭证（获取access_token所需）
    pub fn has_app_credentials(&self) -> bool {
        self.wechat_app_id.is_some() && self.wechat_app_secret.is_some()
    }
}
