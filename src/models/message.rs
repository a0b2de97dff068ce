use std::fmt;

/// 消息类型（MsgType 字段）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MsgType {
    Text,
    Image,
    Voice,
    Video,
    ShortVideo,
    Location,
    Link,
    Music,
    News,
    Event,
    /// 未识别的类型，原样保留
    Unknown(String),
}

impl MsgType {
    pub fn as_str(&self) -> &str {
        match self {
            MsgType::Text => "text",
            MsgType::Image => "image",
            MsgType::Voice => "voice",
            MsgType::Video => "video",
            MsgType::ShortVideo => "shortvideo",
            MsgType::Location => "location",
            MsgType::Link => "link",
            MsgType::Music => "music",
            MsgType::News => "news",
            MsgType::Event => "event",
            MsgType::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, MsgType::Unknown(_))
    }
}

impl From<&str> for MsgType {
    fn from(value: &str) -> Self {
        match value {
            "text" => MsgType::Text,
            "image" => MsgType::Image,
            "voice" => MsgType::Voice,
            "video" => MsgType::Video,
            "shortvideo" => MsgType::ShortVideo,
            "location" => MsgType::Location,
            "link" => MsgType::Link,
            "music" => MsgType::Music,
            "news" => MsgType::News,
            "event" => MsgType::Event,
            other => MsgType::Unknown(other.to_string()),
        }
    }
}

impl From<String> for MsgType {
    fn from(value: String) -> Self {
        MsgType::from(value.as_str())
    }
}

impl Default for MsgType {
    fn default() -> Self {
        MsgType::Unknown(String::new())
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 服务器推送的原始消息，包含所有类型可能出现的字段
///
/// 每条消息只有与其类型相关的字段有值，其余保持零值。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMessage {
    pub to_user_name: String,
    pub from_user_name: String,
    pub create_time: i64,
    pub msg_type: MsgType,
    pub msg_id: i64,
    pub content: String,
    pub pic_url: String,
    pub media_id: String,
    pub format: String,
    pub recognition: String,
    pub thumb_media_id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub location_x: f64,
    pub location_y: f64,
    pub scale: f64,
    pub label: String,
    pub event: String,
    pub event_key: String,
    pub ticket: String,
    pub latitude: f64,
    pub longitude: f64,
    pub precision: f64,
}

/// 文本消息
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextMessage {
    pub to_user_name: String,
    pub from_user_name: String,
    pub create_time: i64,
    pub msg_id: i64,
    pub content: String,
}

/// 图片消息
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageMessage {
    pub to_user_name: String,
    pub from_user_name: String,
    pub create_time: i64,
    pub msg_id: i64,
    pub pic_url: String,
    pub media_id: String,
}

/// 语音消息，开通语音识别后 recognition 为识别结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoiceMessage {
    pub to_user_name: String,
    pub from_user_name: String,
    pub create_time: i64,
    pub msg_id: i64,
    pub media_id: String,
    pub format: String,
    pub recognition: String,
}

/// 视频消息，小视频与视频字段相同
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoMessage {
    pub to_user_name: String,
    pub from_user_name: String,
    pub create_time: i64,
    pub msg_id: i64,
    pub media_id: String,
    pub thumb_media_id: String,
}

/// 地理位置消息
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationMessage {
    pub to_user_name: String,
    pub from_user_name: String,
    pub create_time: i64,
    pub msg_id: i64,
    /// 纬度（Location_X）
    pub latitude: f64,
    /// 经度（Location_Y）
    pub longitude: f64,
    pub scale: f64,
    pub label: String,
}

/// 链接消息
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkMessage {
    pub to_user_name: String,
    pub from_user_name: String,
    pub create_time: i64,
    pub msg_id: i64,
    pub title: String,
    pub description: String,
    pub url: String,
}

/// 事件推送
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventMessage {
    pub to_user_name: String,
    pub from_user_name: String,
    pub create_time: i64,
    pub event: String,
    pub event_key: String,
    pub ticket: String,
    pub latitude: f64,
    pub longitude: f64,
    pub precision: f64,
}

impl From<&RawMessage> for TextMessage {
    fn from(msg: &RawMessage) -> Self {
        Self {
            to_user_name: msg.to_user_name.clone(),
            from_user_name: msg.from_user_name.clone(),
            create_time: msg.create_time,
            msg_id: msg.msg_id,
            content: msg.content.clone(),
        }
    }
}

impl From<&RawMessage> for ImageMessage {
    fn from(msg: &RawMessage) -> Self {
        Self {
            to_user_name: msg.to_user_name.clone(),
            from_user_name: msg.from_user_name.clone(),
            create_time: msg.create_time,
            msg_id: msg.msg_id,
            pic_url: msg.pic_url.clone(),
            media_id: msg.media_id.clone(),
        }
    }
}

impl From<&RawMessage> for VoiceMessage {
    fn from(msg: &RawMessage) -> Self {
        Self {
            to_user_name: msg.to_user_name.clone(),
            from_user_name: msg.from_user_name.clone(),
            create_time: msg.create_time,
            msg_id: msg.msg_id,
            media_id: msg.media_id.clone(),
            format: msg.format.clone(),
            recognition: msg.recognition.clone(),
        }
    }
}

impl From<&RawMessage> for VideoMessage {
    fn from(msg: &RawMessage) -> Self {
        Self {
            to_user_name: msg.to_user_name.clone(),
            from_user_name: msg.from_user_name.clone(),
            create_time: msg.create_time,
            msg_id: msg.msg_id,
            media_id: msg.media_id.clone(),
            thumb_media_id: msg.thumb_media_id.clone(),
        }
    }
}

impl From<&RawMessage> for LocationMessage {
    fn from(msg: &RawMessage) -> Self {
        Self {
            to_user_name: msg.to_user_name.clone(),
            from_user_name: msg.from_user_name.clone(),
            create_time: msg.create_time,
            msg_id: msg.msg_id,
            latitude: msg.location_x,
            longitude: msg.location_y,
            scale: msg.scale,
            label: msg.label.clone(),
        }
    }
}

impl From<&RawMessage> for LinkMessage {
    fn from(msg: &RawMessage) -> Self {
        Self {
            to_user_name: msg.to_user_name.clone(),
            from_user_name: msg.from_user_name.clone(),
            create_time: msg.create_time,
            msg_id: msg.msg_id,
            title: msg.title.clone(),
            description: msg.description.clone(),
            url: msg.url.clone(),
        }
    }
}

impl From<&RawMessage> for EventMessage {
    fn from(msg: &RawMessage) -> Self {
        Self {
            to_user_name: msg.to_user_name.clone(),
            from_user_name: msg.from_user_name.clone(),
            create_time: msg.create_time,
            event: msg.event.clone(),
            event_key: msg.event_key.clone(),
            ticket: msg.ticket.clone(),
            latitude: msg.latitude,
            longitude: msg.longitude,
            precision: msg.precision,
        }
    }
}

/// 回复时需要的收发双方信息
///
/// 所有入站消息视图都实现此 trait，回复构造函数据此交换收发方。
pub trait Addressed {
    fn to_user_name(&self) -> &str;
    fn from_user_name(&self) -> &str;
}

macro_rules! impl_addressed {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Addressed for $ty {
                fn to_user_name(&self) -> &str {
                    &self.to_user_name
                }

                fn from_user_name(&self) -> &str {
                    &self.from_user_name
                }
            }
        )*
    };
}

impl_addressed!(
    RawMessage,
    TextMessage,
    ImageMessage,
    VoiceMessage,
    VideoMessage,
    LocationMessage,
    LinkMessage,
    EventMessage,
);
