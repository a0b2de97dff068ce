use crate::{error::Result, state::AppState, utils::signature};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(receive_message))
        .route("/check", get(check_signature))
}

/// 接收微信服务器推送的消息
/// POST /
///
/// 回复完整编码后才提交状态码；没有处理器回复时返回空响应体。
async fn receive_message(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Response> {
    let reply = state.dispatcher.process(&body)?;

    match reply {
        Some(xml) => Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, XML_CONTENT_TYPE)],
            xml,
        )
            .into_response()),
        None => Ok(StatusCode::OK.into_response()),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CheckQuery {
    timestamp: String,
    nonce: String,
    signature: String,
    echostr: String,
}

/// 服务器接入校验
/// GET /check
///
/// 签名一致时原样返回 echostr，否则返回空响应体。
async fn check_signature(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CheckQuery>,
) -> String {
    if signature::verify_signature(
        state.check_token(),
        &query.timestamp,
        &query.nonce,
        &query.signature,
    ) {
        debug!("Signature check passed");
        query.echostr
    } else {
        warn!("Signature check failed for timestamp {}", query.timestamp);
        String::new()
    }
}
