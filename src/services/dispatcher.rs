use crate::{
    error::Result,
    models::{
        message::{
            EventMessage, ImageMessage, LinkMessage, LocationMessage, MsgType, RawMessage,
            TextMessage, VideoMessage, VoiceMessage,
        },
        reply::Reply,
    },
    utils::xml,
};
use parking_lot::RwLock;
use std::{collections::HashMap, fmt, sync::Arc};
use tracing::{debug, warn};

/// 回复缓冲区
///
/// 处理器通过它提交回复。回复在写入时即完成编码，HTTP 响应只在处理器返回后才提交，
/// 因此编码失败不会留下半截响应体。
#[derive(Debug, Default)]
pub struct ReplySink {
    body: Option<String>,
}

impl ReplySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 编码并保存回复，多次调用时以最后一次为准
    pub fn send(&mut self, reply: impl Into<Reply>) -> Result<()> {
        let reply = reply.into();
        let encoded = reply.encode()?;
        if self.body.is_some() {
            warn!("Reply already written, replacing with {} reply", reply.msg_type());
        }
        self.body = Some(encoded);
        Ok(())
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn into_body(self) -> Option<String> {
        self.body
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_none()
    }
}

type Callback<M> = Arc<dyn Fn(M, &mut ReplySink) -> Result<()> + Send + Sync>;

/// 处理器槽位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    /// 跳过分类，接收完整原始消息，优先级高于其他所有处理器
    Raw,
    Text,
    Image,
    Voice,
    Video,
    ShortVideo,
    Location,
    Link,
    Event,
}

impl HandlerKind {
    /// 消息类型对应的处理器槽位；music、news 只用于回复，没有入站槽位
    pub fn for_msg_type(msg_type: &MsgType) -> Option<Self> {
        match msg_type {
            MsgType::Text => Some(HandlerKind::Text),
            MsgType::Image => Some(HandlerKind::Image),
            MsgType::Voice => Some(HandlerKind::Voice),
            MsgType::Video => Some(HandlerKind::Video),
            MsgType::ShortVideo => Some(HandlerKind::ShortVideo),
            MsgType::Location => Some(HandlerKind::Location),
            MsgType::Link => Some(HandlerKind::Link),
            MsgType::Event => Some(HandlerKind::Event),
            MsgType::Music | MsgType::News | MsgType::Unknown(_) => None,
        }
    }
}

/// 消息处理器，每种槽位一个变体，回调参数类型与槽位一一对应
#[derive(Clone)]
pub enum Handler {
    Raw(Callback<RawMessage>),
    Text(Callback<TextMessage>),
    Image(Callback<ImageMessage>),
    Voice(Callback<VoiceMessage>),
    Video(Callback<VideoMessage>),
    ShortVideo(Callback<VideoMessage>),
    Location(Callback<LocationMessage>),
    Link(Callback<LinkMessage>),
    Event(Callback<EventMessage>),
}

macro_rules! handler_constructor {
    ($name:ident, $variant:ident, $msg:ty) => {
        pub fn $name<F>(f: F) -> Self
        where
            F: Fn($msg, &mut ReplySink) -> Result<()> + Send + Sync + 'static,
        {
            Handler::$variant(Arc::new(f))
        }
    };
}

impl Handler {
    handler_constructor!(raw, Raw, RawMessage);
    handler_constructor!(text, Text, TextMessage);
    handler_constructor!(image, Image, ImageMessage);
    handler_constructor!(voice, Voice, VoiceMessage);
    handler_constructor!(video, Video, VideoMessage);
    handler_constructor!(short_video, ShortVideo, VideoMessage);
    handler_constructor!(location, Location, LocationMessage);
    handler_constructor!(link, Link, LinkMessage);
    handler_constructor!(event, Event, EventMessage);

    pub fn kind(&self) -> HandlerKind {
        match self {
            Handler::Raw(_) => HandlerKind::Raw,
            Handler::Text(_) => HandlerKind::Text,
            Handler::Image(_) => HandlerKind::Image,
            Handler::Voice(_) => HandlerKind::Voice,
            Handler::Video(_) => HandlerKind::Video,
            Handler::ShortVideo(_) => HandlerKind::ShortVideo,
            Handler::Location(_) => HandlerKind::Location,
            Handler::Link(_) => HandlerKind::Link,
            Handler::Event(_) => HandlerKind::Event,
        }
    }

    /// 按槽位裁剪原始消息并调用回调
    fn invoke(&self, msg: &RawMessage, sink: &mut ReplySink) -> Result<()> {
        match self {
            Handler::Raw(f) => f(msg.clone(), sink),
            Handler::Text(f) => f(TextMessage::from(msg), sink),
            Handler::Image(f) => f(ImageMessage::from(msg), sink),
            Handler::Voice(f) => f(VoiceMessage::from(msg), sink),
            Handler::Video(f) | Handler::ShortVideo(f) => f(VideoMessage::from(msg), sink),
            Handler::Location(f) => f(LocationMessage::from(msg), sink),
            Handler::Link(f) => f(LinkMessage::from(msg), sink),
            Handler::Event(f) => f(EventMessage::from(msg), sink),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler").field(&self.kind()).finish()
    }
}

/// 消息分发器
///
/// 持有槽位到处理器的注册表。注册通常在启动阶段完成，
/// 读写锁使服务运行期间重新注册也是安全的。
#[derive(Debug, Default)]
pub struct Dispatcher {
    handlers: RwLock<HashMap<HandlerKind, Handler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册处理器，同一槽位的旧处理器被覆盖并返回
    pub fn register(&self, handler: Handler) -> Option<Handler> {
        let kind = handler.kind();
        debug!("Registering {:?} handler", kind);
        self.handlers.write().insert(kind, handler)
    }

    /// 构建期使用的链式注册
    pub fn with_handler(self, handler: Handler) -> Self {
        self.register(handler);
        self
    }

    pub fn is_registered(&self, kind: HandlerKind) -> bool {
        self.handlers.read().contains_key(&kind)
    }

    fn lookup(&self, kind: HandlerKind) -> Option<Handler> {
        self.handlers.read().get(&kind).cloned()
    }

    /// 分发一条消息，返回实际被调用的处理器槽位
    ///
    /// 未注册处理器或类型无法识别时不调用任何处理器，也不写入回复。
    pub fn route(&self, msg: &RawMessage, sink: &mut ReplySink) -> Result<Option<HandlerKind>> {
        if let Some(raw) = self.lookup(HandlerKind::Raw) {
            raw.invoke(msg, sink)?;
            return Ok(Some(HandlerKind::Raw));
        }

        let Some(kind) = HandlerKind::for_msg_type(&msg.msg_type) else {
            debug!("No handler slot for message type '{}', dropping", msg.msg_type);
            return Ok(None);
        };

        match self.lookup(kind) {
            Some(handler) => {
                handler.invoke(msg, sink)?;
                Ok(Some(kind))
            }
            None => {
                debug!("No {:?} handler registered, dropping message", kind);
                Ok(None)
            }
        }
    }

    /// 解析、分发并返回编码后的回复；没有回复时返回 None
    pub fn process(&self, body: &[u8]) -> Result<Option<String>> {
        let msg = xml::decode_message(body)?;
        debug!(
            "Received {} message from {} to {}",
            msg.msg_type, msg.from_user_name, msg.to_user_name
        );

        let mut sink = ReplySink::new();
        self.route(&msg, &mut sink)?;
        Ok(sink.into_body())
    }
}
