use crate::{config::Config, services::Dispatcher};
use std::sync::Arc;

/// 应用程序的共享状态
#[derive(Clone)]
pub struct AppState {
    /// 应用配置
    pub config: Config,

    /// 消息分发器，所有请求共享
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(config: Config, dispatcher: Dispatcher) -> Self {
        Self {
            config,
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// 接入校验使用的 token
    pub fn check_token(&self) -> &str {
        &self.config.wechat_token
    }
}
