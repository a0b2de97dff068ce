use crate::{error::Result, models::message::Addressed, utils::xml};

/// 图文回复最多携带的文章条数，超出部分被截断
pub const MAX_ARTICLES: usize = 8;

/// 被动回复的公共头部
///
/// 回复的接收方是入站消息的发送方，`create_time` 为空时编码前取当前时间。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplyHeader {
    pub to_user_name: String,
    pub from_user_name: String,
    pub create_time: Option<i64>,
}

impl ReplyHeader {
    /// 交换收发双方，构造对入站消息的回复头
    pub fn answering(msg: &impl Addressed) -> Self {
        Self {
            to_user_name: msg.from_user_name().to_string(),
            from_user_name: msg.to_user_name().to_string(),
            create_time: None,
        }
    }
}

/// 文本回复
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextReply {
    pub header: ReplyHeader,
    pub content: String,
}

impl TextReply {
    pub fn to(msg: &impl Addressed, content: impl Into<String>) -> Self {
        Self {
            header: ReplyHeader::answering(msg),
            content: content.into(),
        }
    }
}

/// 图片回复
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageReply {
    pub header: ReplyHeader,
    pub media_id: String,
}

impl ImageReply {
    pub fn to(msg: &impl Addressed, media_id: impl Into<String>) -> Self {
        Self {
            header: ReplyHeader::answering(msg),
            media_id: media_id.into(),
        }
    }
}

/// 语音回复
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoiceReply {
    pub header: ReplyHeader,
    pub media_id: String,
}

impl VoiceReply {
    pub fn to(msg: &impl Addressed, media_id: impl Into<String>) -> Self {
        Self {
            header: ReplyHeader::answering(msg),
            media_id: media_id.into(),
        }
    }
}

/// 视频回复
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoReply {
    pub header: ReplyHeader,
    pub media_id: String,
    pub title: String,
    pub description: String,
}

impl VideoReply {
    pub fn to(msg: &impl Addressed, media_id: impl Into<String>) -> Self {
        Self {
            header: ReplyHeader::answering(msg),
            media_id: media_id.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>, description: impl Into<String>) -> Self {
        self.title = title.into();
        self.description = description.into();
        self
    }
}

/// 音乐回复
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MusicReply {
    pub header: ReplyHeader,
    pub title: String,
    pub description: String,
    pub music_url: String,
    pub hq_music_url: String,
    pub thumb_media_id: String,
}

impl MusicReply {
    pub fn to(msg: &impl Addressed, thumb_media_id: impl Into<String>) -> Self {
        Self {
            header: ReplyHeader::answering(msg),
            thumb_media_id: thumb_media_id.into(),
            ..Default::default()
        }
    }
}

/// 图文消息中的单篇文章
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub pic_url: String,
    pub url: String,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        pic_url: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            pic_url: pic_url.into(),
            url: url.into(),
        }
    }
}

/// 图文回复
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticlesReply {
    pub header: ReplyHeader,
    pub articles: Vec<Article>,
}

impl ArticlesReply {
    pub fn to(msg: &impl Addressed, articles: Vec<Article>) -> Self {
        Self {
            header: ReplyHeader::answering(msg),
            articles,
        }
    }

    /// 实际会被编码的文章
    pub fn visible_articles(&self) -> &[Article] {
        let len = self.articles.len().min(MAX_ARTICLES);
        &self.articles[..len]
    }
}

/// 所有被动回复类型
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(TextReply),
    Image(ImageReply),
    Voice(VoiceReply),
    Video(VideoReply),
    Music(MusicReply),
    News(ArticlesReply),
}

impl Reply {
    pub fn header(&self) -> &ReplyHeader {
        match self {
            Reply::Text(r) => &r.header,
            Reply::Image(r) => &r.header,
            Reply::Voice(r) => &r.header,
            Reply::Video(r) => &r.header,
            Reply::Music(r) => &r.header,
            Reply::News(r) => &r.header,
        }
    }

    /// 回复的 MsgType 字面值
    pub fn msg_type(&self) -> &'static str {
        match self {
            Reply::Text(_) => "text",
            Reply::Image(_) => "image",
            Reply::Voice(_) => "voice",
            Reply::Video(_) => "video",
            Reply::Music(_) => "music",
            Reply::News(_) => "news",
        }
    }

    /// 编码为平台要求的XML
    pub fn encode(&self) -> Result<String> {
        xml::encode_reply(self)
    }
}

impl From<TextReply> for Reply {
    fn from(reply: TextReply) -> Self {
        Reply::Text(reply)
    }
}

impl From<ImageReply> for Reply {
    fn from(reply: ImageReply) -> Self {
        Reply::Image(reply)
    }
}

impl From<VoiceReply> for Reply {
    fn from(reply: VoiceReply) -> Self {
        Reply::Voice(reply)
    }
}

impl From<VideoReply> for Reply {
    fn from(reply: VideoReply) -> Self {
        Reply::Video(reply)
    }
}

impl From<MusicReply> for Reply {
    fn from(reply: MusicReply) -> Self {
        Reply::Music(reply)
    }
}

impl From<ArticlesReply> for Reply {
    fn from(reply: ArticlesReply) -> Self {
        Reply::News(reply)
    }
}
