use crate::{
    error::Result,
    models::{
        message::{MsgType, RawMessage},
        reply::Reply,
    },
};
use chrono::Utc;
use quick_xml::{events::Event, DeError, Reader};
use serde::{
    de::{Error as _, IgnoredAny, MapAccess, Visitor},
    Deserialize, Deserializer, Serialize,
};
use std::{collections::HashMap, fmt, str::FromStr};

/// 入站消息中可识别的子节点
const INBOUND_FIELDS: &[&str] = &[
    "ToUserName",
    "FromUserName",
    "CreateTime",
    "MsgType",
    "MsgId",
    "Content",
    "PicUrl",
    "MediaId",
    "Format",
    "Recognition",
    "ThumbMediaId",
    "Title",
    "Description",
    "Url",
    "Location_X",
    "Location_Y",
    "Scale",
    "Label",
    "Event",
    "EventKey",
    "Ticket",
    "Latitude",
    "Longitude",
    "Precision",
];

/// 入站消息的子节点表，重复出现的节点以最后一次为准
///
/// 未知节点（包括扫码事件的 ScanCodeInfo 等嵌套节点）直接跳过。
#[derive(Debug)]
struct InboundFields(HashMap<String, String>);

impl<'de> Deserialize<'de> for InboundFields {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_struct("xml", INBOUND_FIELDS, InboundFieldsVisitor)
    }
}

struct InboundFieldsVisitor;

impl<'de> Visitor<'de> for InboundFieldsVisitor {
    type Value = InboundFields;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a message element")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<InboundFields, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut fields = HashMap::new();
        while let Some(name) = map.next_key::<String>()? {
            if INBOUND_FIELDS.contains(&name.as_str()) {
                let text = map.next_value::<String>()?;
                fields.insert(name, text);
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(InboundFields(fields))
    }
}

impl InboundFields {
    fn text(&mut self, name: &str) -> String {
        self.0.remove(name).unwrap_or_default()
    }

    /// 数值节点：去掉首尾空白，空文本取零值
    fn number<T>(&mut self, name: &str) -> Result<T>
    where
        T: FromStr + Default,
    {
        let text = self.text(name);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(T::default());
        }
        trimmed.parse().map_err(|_| {
            DeError::custom(format!("invalid number in <{}>: {:?}", name, trimmed)).into()
        })
    }

    fn into_message(mut self) -> Result<RawMessage> {
        Ok(RawMessage {
            to_user_name: self.text("ToUserName"),
            from_user_name: self.text("FromUserName"),
            create_time: self.number("CreateTime")?,
            msg_type: MsgType::from(self.text("MsgType")),
            msg_id: self.number("MsgId")?,
            content: self.text("Content"),
            pic_url: self.text("PicUrl"),
            media_id: self.text("MediaId"),
            format: self.text("Format"),
            recognition: self.text("Recognition"),
            thumb_media_id: self.text("ThumbMediaId"),
            title: self.text("Title"),
            description: self.text("Description"),
            url: self.text("Url"),
            location_x: self.number("Location_X")?,
            location_y: self.number("Location_Y")?,
            scale: self.number("Scale")?,
            label: self.text("Label"),
            event: self.text("Event"),
            event_key: self.text("EventKey"),
            ticket: self.text("Ticket"),
            latitude: self.number("Latitude")?,
            longitude: self.number("Longitude")?,
            precision: self.number("Precision")?,
        })
    }
}

/// 根节点必须是 <xml>
fn ensure_xml_root(body: &[u8]) -> Result<()> {
    let mut reader = Reader::from_reader(body);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf).map_err(DeError::from)? {
            Event::Start(e) | Event::Empty(e) => {
                if e.name().as_ref() == b"xml" {
                    return Ok(());
                }
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                return Err(DeError::custom(format!("expected <xml> root, found <{}>", name)).into());
            }
            // 交给反序列化报告空文档等错误
            Event::Eof => return Ok(()),
            _ => {}
        }
        buf.clear();
    }
}

/// 被动回复的XML结构，只输出对应类型的节点
#[derive(Debug, Serialize)]
#[serde(rename = "xml", rename_all = "PascalCase")]
struct OutboundEnvelope<'a> {
    to_user_name: &'a str,
    from_user_name: &'a str,
    create_time: i64,
    msg_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<MediaElement<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    voice: Option<MediaElement<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    video: Option<VideoElement<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    music: Option<MusicElement<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    article_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    articles: Option<ArticlesElement<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct MediaElement<'a> {
    media_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct VideoElement<'a> {
    media_id: &'a str,
    title: &'a str,
    description: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct MusicElement<'a> {
    title: &'a str,
    description: &'a str,
    music_url: &'a str,
    #[serde(rename = "HQMusicUrl")]
    hq_music_url: &'a str,
    thumb_media_id: &'a str,
}

#[derive(Debug, Serialize)]
struct ArticlesElement<'a> {
    #[serde(rename = "item")]
    items: Vec<ArticleElement<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ArticleElement<'a> {
    title: &'a str,
    description: &'a str,
    pic_url: &'a str,
    url: &'a str,
}

/// 当前 Unix 时间戳（秒）
pub fn current_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// 解析服务器推送的消息
///
/// 缺失或为空的字段取零值，重复的字段以最后一次为准，未知字段忽略。
/// 只有XML本身不合法、根节点不是 <xml> 或数值字段无法解析时才返回错误。
pub fn decode_message(body: &[u8]) -> Result<RawMessage> {
    ensure_xml_root(body)?;
    let fields: InboundFields = quick_xml::de::from_reader(body)?;
    fields.into_message()
}

/// 将回复编码为XML，未设置的创建时间取当前时间
pub fn encode_reply(reply: &Reply) -> Result<String> {
    let header = reply.header();
    let create_time = header
        .create_time
        .filter(|t| *t > 0)
        .unwrap_or_else(current_timestamp);

    let mut envelope = OutboundEnvelope {
        to_user_name: &header.to_user_name,
        from_user_name: &header.from_user_name,
        create_time,
        msg_type: reply.msg_type(),
        content: None,
        image: None,
        voice: None,
        video: None,
        music: None,
        article_count: None,
        articles: None,
    };

    match reply {
        Reply::Text(r) => envelope.content = Some(&r.content),
        Reply::Image(r) => envelope.image = Some(MediaElement { media_id: &r.media_id }),
        Reply::Voice(r) => envelope.voice = Some(MediaElement { media_id: &r.media_id }),
        Reply::Video(r) => {
            envelope.video = Some(VideoElement {
                media_id: &r.media_id,
                title: &r.title,
                description: &r.description,
            })
        }
        Reply::Music(r) => {
            envelope.music = Some(MusicElement {
                title: &r.title,
                description: &r.description,
                music_url: &r.music_url,
                hq_music_url: &r.hq_music_url,
                thumb_media_id: &r.thumb_media_id,
            })
        }
        Reply::News(r) => {
            let items: Vec<ArticleElement> = r
                .visible_articles()
                .iter()
                .map(|a| ArticleElement {
                    title: &a.title,
                    description: &a.description,
                    pic_url: &a.pic_url,
                    url: &a.url,
                })
                .collect();
            envelope.article_count = Some(items.len());
            envelope.articles = Some(ArticlesElement { items });
        }
    }

    let xml = quick_xml::se::to_string(&envelope)?;
    Ok(xml)
}
