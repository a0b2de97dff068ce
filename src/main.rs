use std::{sync::Arc, time::Duration};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wechat_gateway::{
    models::{menu::Menu, reply::Article},
    services::{AccessTokenProvider, MenuService},
    AppState, ArticlesReply, Config, Dispatcher, Handler, ImageReply, TextReply, VoiceReply,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置
    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    // 初始化日志
    let filter = tracing_subscriber::EnvFilter::new(&config.log_level);
    if config.log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    info!("Starting wechat-gateway ({})...", config.environment);

    // 同步自定义菜单（需要公众号凭证）
    if let Some(menu_file) = config.menu_file.clone() {
        if config.has_app_credentials() {
            if let Err(e) = publish_menu(&config, &menu_file).await {
                error!("Failed to publish menu from {}: {}", menu_file, e);
            }
        } else {
            warn!("MENU_FILE is set but WECHAT_APP_ID/WECHAT_APP_SECRET are missing, skipping menu");
        }
    }

    let dispatcher = build_dispatcher();
    let app_state = Arc::new(AppState::new(config.clone(), dispatcher));
    let app = wechat_gateway::app(app_state);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    info!("Starting server on http://{}", addr);

    axum::Server::bind(&addr.parse()?)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

/// 注册演示用的消息处理器
fn build_dispatcher() -> Dispatcher {
    Dispatcher::new()
        .with_handler(Handler::text(|msg, sink| {
            sink.send(TextReply::to(&msg, msg.content.clone()))
        }))
        .with_handler(Handler::image(|msg, sink| {
            sink.send(ImageReply::to(&msg, msg.media_id.clone()))
        }))
        .with_handler(Handler::voice(|msg, sink| {
            if msg.recognition.is_empty() {
                sink.send(VoiceReply::to(&msg, msg.media_id.clone()))
            } else {
                sink.send(TextReply::to(&msg, msg.recognition.clone()))
            }
        }))
        .with_handler(Handler::location(|msg, sink| {
            let content = format!("已收到位置: {} ({:.6}, {:.6})", msg.label, msg.latitude, msg.longitude);
            sink.send(TextReply::to(&msg, content))
        }))
        .with_handler(Handler::link(|msg, sink| {
            let article = Article::new(msg.title.clone(), msg.description.clone(), "", msg.url.clone());
            sink.send(ArticlesReply::to(&msg, vec![article]))
        }))
        .with_handler(Handler::event(|msg, sink| match msg.event.as_str() {
            "subscribe" => sink.send(TextReply::to(&msg, "感谢关注！")),
            "CLICK" => sink.send(TextReply::to(&msg, format!("点击了菜单: {}", msg.event_key))),
            _ => Ok(()),
        }))
}

async fn publish_menu(config: &Config, menu_file: &str) -> anyhow::Result<()> {
    let json = tokio::fs::read_to_string(menu_file).await?;
    let menu = Menu::from_json(&json)?;

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()?;
    let token_provider = AccessTokenProvider::new(config, http_client.clone())?;
    MenuService::new(http_client, token_provider)
        .create_menu(&menu)
        .await?;

    info!("Published menu from {}", menu_file);
    Ok(())
}
