use crate::{
    error::{AppError, Result},
    models::{api::ApiStatus, menu::Menu},
    services::token::AccessTokenProvider,
};
use reqwest::{header::CONTENT_TYPE, Client};
use tracing::{debug, info, warn};

const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";

/// 自定义菜单接口
#[derive(Clone)]
pub struct MenuService {
    http_client: Client,
    token_provider: AccessTokenProvider,
}

impl MenuService {
    pub fn new(http_client: Client, token_provider: AccessTokenProvider) -> Self {
        Self {
            http_client,
            token_provider,
        }
    }

    /// 使用提供者管理的 access_token 创建菜单
    pub async fn create_menu(&self, menu: &Menu) -> Result<()> {
        let access_token = self.token_provider.get_access_token().await?;
        self.create_menu_with_token(menu, &access_token).await
    }

    /// 使用调用方给定的 access_token 创建菜单
    pub async fn create_menu_with_token(&self, menu: &Menu, access_token: &str) -> Result<()> {
        let body = menu.to_json()?;
        let url = format!("{}/cgi-bin/menu/create", self.token_provider.base_url());
        debug!("Creating menu with {} top-level buttons", menu.buttons().len());

        let status: ApiStatus = self
            .http_client
            .post(&url)
            .query(&[("access_token", access_token)])
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body)
            .send()
            .await?
            .json()
            .await?;

        if !status.is_ok() {
            warn!("Menu creation rejected: {} {}", status.errcode, status.errmsg);
            return Err(AppError::upstream(status.errcode, &status.errmsg));
        }

        info!("Menu created successfully");
        Ok(())
    }
}
