use serde_json::json;
use wechat_gateway::{
    models::menu::{FunctionButton, LevelButton, Menu},
    services::{AccessTokenProvider, MenuService},
    AppError, Config,
};
use wiremock::{
    matchers::{body_json, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn provider(server: &MockServer) -> AccessTokenProvider {
    AccessTokenProvider::with_credentials(reqwest::Client::new(), &server.uri(), "wx123", "s3cret")
}

fn sample_menu() -> Menu {
    let mut menu = Menu::new();
    menu.add_function_button(FunctionButton::click("今日歌曲", "V1001_TODAY_MUSIC"))
        .unwrap();
    let mut level = LevelButton::new("菜单");
    level
        .add_function_button(FunctionButton::view("搜索", "http://www.soso.com/"))
        .unwrap();
    menu.add_level_button(level).unwrap();
    menu
}

#[tokio::test]
async fn test_access_token_is_fetched_once_and_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/token"))
        .and(query_param("grant_type", "client_credential"))
        .and(query_param("appid", "wx123"))
        .and(query_param("secret", "s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "TOKEN_1",
            "expires_in": 7200
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider(&server);
    assert_eq!(provider.get_access_token().await.unwrap(), "TOKEN_1");
    assert_eq!(provider.get_access_token().await.unwrap(), "TOKEN_1");
}

#[tokio::test]
async fn test_refresh_bypasses_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "TOKEN_2",
            "expires_in": 7200
        })))
        .expect(2)
        .mount(&server)
        .await;

    let provider = provider(&server);
    provider.get_access_token().await.unwrap();
    assert_eq!(provider.refresh().await.unwrap(), "TOKEN_2");
}

#[tokio::test]
async fn test_access_token_error_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errcode": 40013,
            "errmsg": "invalid appid"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let provider = provider(&server);
    for _ in 0..2 {
        match provider.get_access_token().await {
            Err(AppError::Upstream { code, message }) => {
                assert_eq!(code, 40013);
                assert_eq!(message, "invalid appid");
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_create_menu_posts_menu_json_with_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "MENU_TOKEN",
            "expires_in": 7200
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/menu/create"))
        .and(query_param("access_token", "MENU_TOKEN"))
        .and(body_json(json!({
            "button": [
                {"name": "今日歌曲", "type": "click", "key": "V1001_TODAY_MUSIC"},
                {"name": "菜单", "sub_button": [
                    {"name": "搜索", "type": "view", "url": "http://www.soso.com/"}
                ]}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errcode": 0,
            "errmsg": "ok"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = MenuService::new(reqwest::Client::new(), provider(&server));
    service.create_menu(&sample_menu()).await.unwrap();
}

#[tokio::test]
async fn test_create_menu_reports_upstream_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/menu/create"))
        .and(query_param("access_token", "CALLER_TOKEN"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errcode": 40018,
            "errmsg": "invalid button name size"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = MenuService::new(reqwest::Client::new(), provider(&server));
    let result = service
        .create_menu_with_token(&sample_menu(), "CALLER_TOKEN")
        .await;

    assert!(matches!(result, Err(AppError::Upstream { code: 40018, .. })));
}

#[test]
fn test_provider_from_config_uses_configured_base_url() {
    let mut config = Config::with_token("token");
    config.wechat_app_id = Some("wx123".to_string());
    config.wechat_app_secret = Some("s3cret".to_string());
    config.wechat_api_base_url = "http://127.0.0.1:9/".to_string();

    let provider = AccessTokenProvider::new(&config, reqwest::Client::new()).unwrap();
    assert_eq!(provider.base_url(), "http://127.0.0.1:9");
}
