use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tower::ServiceExt;
use wechat_gateway::{
    utils::{signature::compute_signature, xml::decode_message},
    AppError, AppState, Config, Dispatcher, Handler, MsgType, TextReply,
};

const TOKEN: &str = "test-token";

const TEXT_MESSAGE: &str = "<xml><ToUserName>a</ToUserName><FromUserName>b</FromUserName><CreateTime>100</CreateTime><MsgType>text</MsgType><Content>hi</Content></xml>";

fn app_with(dispatcher: Dispatcher) -> Router {
    let state = Arc::new(AppState::new(Config::with_token(TOKEN), dispatcher));
    wechat_gateway::app(state)
}

fn echo_dispatcher() -> Dispatcher {
    Dispatcher::new().with_handler(Handler::text(|msg, sink| {
        sink.send(TextReply::to(&msg, msg.content.clone()))
    }))
}

fn post_message(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "text/xml")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_text_message_is_echoed() {
    let response = app_with(echo_dispatcher())
        .oneshot(post_message(TEXT_MESSAGE))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/xml; charset=utf-8"
    );

    let reply = decode_message(body_string(response).await.as_bytes()).unwrap();
    assert_eq!(reply.to_user_name, "b");
    assert_eq!(reply.from_user_name, "a");
    assert_eq!(reply.msg_type, MsgType::Text);
    assert_eq!(reply.content, "hi");
    assert!(reply.create_time > 0);
}

#[tokio::test]
async fn test_unhandled_kind_writes_no_body() {
    let image = "<xml><ToUserName>a</ToUserName><FromUserName>b</FromUserName><CreateTime>100</CreateTime><MsgType>image</MsgType><PicUrl>http://pic</PicUrl><MediaId>m</MediaId></xml>";
    let response = app_with(echo_dispatcher())
        .oneshot(post_message(image))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::CONTENT_TYPE).is_none());
    assert_eq!(body_string(response).await, "");
}

#[tokio::test]
async fn test_unknown_kind_writes_no_body() {
    let unknown = "<xml><ToUserName>a</ToUserName><FromUserName>b</FromUserName><MsgType>miniprogrampage</MsgType></xml>";
    let response = app_with(echo_dispatcher())
        .oneshot(post_message(unknown))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "");
}

#[tokio::test]
async fn test_malformed_message_is_rejected_without_dispatch() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let dispatcher = Dispatcher::new().with_handler(Handler::raw(move |_msg, _sink| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }));

    let response = app_with(dispatcher)
        .oneshot(post_message("<xml><ToUserName>a</FromUserName>"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(response).await, "");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_handler_failure_sends_no_partial_body() {
    let dispatcher = Dispatcher::new().with_handler(Handler::text(|msg, sink| {
        sink.send(TextReply::to(&msg, "partial"))?;
        Err(AppError::handler("storage unavailable"))
    }));

    let response = app_with(dispatcher)
        .oneshot(post_message(TEXT_MESSAGE))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_string(response).await, "");
}

#[tokio::test]
async fn test_check_returns_echostr_on_valid_signature() {
    let signature = compute_signature(TOKEN, "1700000000", "nonce");
    let uri = format!(
        "/check?timestamp=1700000000&nonce=nonce&signature={}&echostr=hello123",
        signature
    );

    let response = app_with(Dispatcher::new())
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "hello123");
}

#[tokio::test]
async fn test_check_returns_empty_body_on_mismatch() {
    let uri = "/check?timestamp=1700000000&nonce=nonce&signature=deadbeef&echostr=hello123";
    let response = app_with(Dispatcher::new())
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "");

    let response = app_with(Dispatcher::new())
        .oneshot(Request::builder().uri("/check").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "");
}

#[tokio::test]
async fn test_health_check() {
    let response = app_with(Dispatcher::new())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
