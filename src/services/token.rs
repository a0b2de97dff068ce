use crate::{
    config::Config,
    error::{AppError, Result},
    models::api::{AccessTokenResponse, CachedToken},
};
use chrono::{Duration, Utc};
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// 提前刷新的余量（秒），避免临界时刻使用即将过期的 token
const REFRESH_MARGIN_SECS: i64 = 60;

/// access_token 提供者
///
/// 首次使用或过期后向微信服务器重新获取，失败的结果不会被缓存。
#[derive(Clone)]
pub struct AccessTokenProvider {
    http_client: Client,
    base_url: String,
    app_id: String,
    app_secret: String,
    cache: Arc<Mutex<Option<CachedToken>>>,
}

impl AccessTokenProvider {
    pub fn new(config: &Config, http_client: Client) -> Result<Self> {
        let (app_id, app_secret) = match (&config.wechat_app_id, &config.wechat_app_secret) {
            (Some(id), Some(secret)) => (id.clone(), secret.clone()),
            _ => {
                return Err(AppError::Config(
                    "WECHAT_APP_ID and WECHAT_APP_SECRET are required for access tokens".to_string(),
                ))
            }
        };

        Ok(Self::with_credentials(
            http_client,
            &config.wechat_api_base_url,
            &app_id,
            &app_secret,
        ))
    }

    pub fn with_credentials(
        http_client: Client,
        base_url: &str,
        app_id: &str,
        app_secret: &str,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id: app_id.to_string(),
            app_secret: app_secret.to_string(),
            cache: Arc::new(Mutex::new(None)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 获取可用的 access_token，缓存有效时直接返回
    pub async fn get_access_token(&self) -> Result<String> {
        let mut cache = self.cache.lock().await;

        if let Some(token) = cache.as_ref() {
            if token.is_valid(Utc::now()) {
                return Ok(token.access_token.clone());
            }
            debug!("Cached access token expired, refreshing");
        }

        let token = self.fetch().await?;
        let access_token = token.access_token.clone();
        *cache = Some(token);
        Ok(access_token)
    }

    /// 丢弃缓存并强制刷新
    pub async fn refresh(&self) -> Result<String> {
        let mut cache = self.cache.lock().await;
        *cache = None;

        let token = self.fetch().await?;
        let access_token = token.access_token.clone();
        *cache = Some(token);
        Ok(access_token)
    }

    async fn fetch(&self) -> Result<CachedToken> {
        let url = format!("{}/cgi-bin/token", self.base_url);
        let response: AccessTokenResponse = self
            .http_client
            .get(&url)
            .query(&[
                ("grant_type", "client_credential"),
                ("appid", self.app_id.as_str()),
                ("secret", self.app_secret.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        if response.errcode != 0 {
            warn!("Access token request rejected: {} {}", response.errcode, response.errmsg);
            return Err(AppError::upstream(response.errcode, &response.errmsg));
        }

        if response.access_token.is_empty() {
            return Err(AppError::upstream(-1, "empty access_token in response"));
        }

        let lifetime = (response.expires_in - REFRESH_MARGIN_SECS).max(0);
        info!("Fetched access token, expires in {}s", response.expires_in);

        Ok(CachedToken {
            access_token: response.access_token,
            expires_at: Utc::now() + Duration::seconds(lifetime),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_credentials() {
        let config = Config::with_token("token");
        let result = AccessTokenProvider::new(&config, Client::new());
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let provider =
            AccessTokenProvider::with_credentials(Client::new(), "http://localhost:9000/", "id", "secret");
        assert_eq!(provider.base_url(), "http://localhost:9000");
    }

    #[test]
    fn test_cached_token_validity() {
        let now = Utc::now();
        let token = CachedToken {
            access_token: "abc".to_string(),
            expires_at: now + Duration::seconds(10),
        };
        assert!(token.is_valid(now));
        assert!(!token.is_valid(now + Duration::seconds(11)));

        let empty = CachedToken {
            access_token: String::new(),
            expires_at: now + Duration::seconds(10),
        };
        assert!(!empty.is_valid(now));
    }
}
