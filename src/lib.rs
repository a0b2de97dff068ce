//! 微信公众号消息回调适配层
//!
//! 校验接入签名，解析服务器推送的XML消息，按消息类型分发给注册的处理器，
//! 并把处理器给出的回复编码为平台要求的XML。

use axum::{
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::get,
    BoxError, Router,
};
use std::{sync::Arc, time::Duration};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use crate::{
    config::Config,
    error::{AppError, Result},
    models::{
        message::{
            EventMessage, ImageMessage, LinkMessage, LocationMessage, MsgType, RawMessage,
            TextMessage, VideoMessage, VoiceMessage,
        },
        reply::{
            Article, ArticlesReply, ImageReply, MusicReply, Reply, TextReply, VideoReply,
            VoiceReply,
        },
    },
    services::{Dispatcher, Handler, HandlerKind, ReplySink},
    state::AppState,
};

/// 构建应用路由
pub fn app(state: Arc<AppState>) -> Router {
    let request_timeout = Duration::from_secs(state.config.request_timeout_secs);
    let max_body_size = state.config.max_body_size;

    Router::new()
        .merge(routes::wechat::router())
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout_error))
                .timeout(request_timeout),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "wechat-gateway is running!"
}

async fn handle_timeout_error(err: BoxError) -> StatusCode {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::warn!("Request timed out");
        StatusCode::REQUEST_TIMEOUT
    } else {
        tracing::error!("Unhandled middleware error: {}", err);
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
