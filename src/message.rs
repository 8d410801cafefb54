//! Build and send application messages to users, departments or tags.

use crate::{api, api::WorkClient, auth::AgentId, error::WorkError, media::MediaId};
use serde::ser::SerializeStruct;
use serde::{ser, Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};
use url::Url;

/// The receiving axis of a message. Each variant carries a `|`-separated id
/// list, e.g. `"UserID1|UserID2"`.
///
/// Exactly one of the three wire fields is populated; the other two go out
/// as empty strings. A message addressed to nobody is rejected by the API
/// rather than validated here.
#[derive(Clone)]
pub enum Recipient {
    /// Member ids; the special value `@all` reaches every member visible to
    /// the application.
    Users(String),
    /// Department ids.
    Parties(String),
    /// Tag ids.
    Tags(String),
}

impl Recipient {
    /// The `(touser, toparty, totag)` triple as it appears on the wire.
    fn fields(&self) -> (&str, &str, &str) {
        match self {
            Recipient::Users(x) => (x, "", ""),
            Recipient::Parties(x) => ("", x, ""),
            Recipient::Tags(x) => ("", "", x),
        }
    }
}

/// The eight message kinds the send endpoint accepts, each carrying its own
/// payload. On the wire the payload sits under a key equal to the `msgtype`
/// string itself, which is what the hand-written [MessageRequest]
/// serialisation produces.
///
/// <https://developer.work.weixin.qq.com/document/path/90236>
pub enum MessageContent {
    Text(Text),
    Image(MediaRef),
    Voice(MediaRef),
    Video(Video),
    File(MediaRef),
    TextCard(TextCard),
    News(News),
    MpNews(MpNews),
}

impl MessageContent {
    /// The `msgtype` discriminator, doubling as the payload key.
    fn kind(&self) -> &'static str {
        match self {
            MessageContent::Text(_) => "text",
            MessageContent::Image(_) => "image",
            MessageContent::Voice(_) => "voice",
            MessageContent::Video(_) => "video",
            MessageContent::File(_) => "file",
            MessageContent::TextCard(_) => "textcard",
            MessageContent::News(_) => "news",
            MessageContent::MpNews(_) => "mpnews",
        }
    }
}

/// Plain text. Newlines and `<a>` tags are honoured; the API truncates
/// beyond 2048 bytes.
#[derive(Serialize)]
pub struct Text {
    pub content: String,
}

/// A previously uploaded media asset, shared by the image, voice and file
/// kinds.
#[derive(Serialize)]
pub struct MediaRef {
    pub media_id: MediaId,
}

#[derive(Serialize)]
pub struct Video {
    pub media_id: MediaId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A card with a single link target and an optional button label, which the
/// platform defaults to "详情".
#[derive(Serialize)]
pub struct TextCard {
    pub title: String,
    pub description: String,
    pub url: Url,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub btntxt: Option<String>,
}

/// Between one and eight linked articles; the API rejects anything outside
/// that range.
#[derive(Serialize)]
pub struct News {
    pub articles: Vec<NewsArticle>,
}

#[derive(Serialize)]
pub struct NewsArticle {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub url: Url,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picurl: Option<Url>,
}

/// Like [News], but the article bodies are hosted on the WeCom side and
/// read statistics accrue per send.
#[derive(Serialize)]
pub struct MpNews {
    pub articles: Vec<MpNewsArticle>,
}

#[derive(Serialize)]
pub struct MpNewsArticle {
    pub title: String,
    pub thumb_media_id: MediaId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_source_url: Option<Url>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// The full send body.
struct MessageRequest<'a> {
    to: &'a Recipient,
    agent_id: &'a AgentId,
    content: &'a MessageContent,
}

// The payload key varies with `msgtype`, which rules out a derived
// serialisation.
impl ser::Serialize for MessageRequest<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        let (touser, toparty, totag) = self.to.fields();
        let kind = self.content.kind();

        let mut state = serializer.serialize_struct("MessageRequest", 7)?;

        state.serialize_field("touser", touser)?;
        state.serialize_field("toparty", toparty)?;
        state.serialize_field("totag", totag)?;
        state.serialize_field("msgtype", kind)?;
        state.serialize_field("agentid", self.agent_id)?;
        // Confidential sends are unsupported.
        state.serialize_field("safe", &0)?;

        match self.content {
            MessageContent::Text(x) => state.serialize_field(kind, x)?,
            MessageContent::Image(x) => state.serialize_field(kind, x)?,
            MessageContent::Voice(x) => state.serialize_field(kind, x)?,
            MessageContent::Video(x) => state.serialize_field(kind, x)?,
            MessageContent::File(x) => state.serialize_field(kind, x)?,
            MessageContent::TextCard(x) => state.serialize_field(kind, x)?,
            MessageContent::News(x) => state.serialize_field(kind, x)?,
            MessageContent::MpNews(x) => state.serialize_field(kind, x)?,
        };

        state.end()
    }
}

/// The send receipt. Partial delivery still counts as success; recipients
/// the application couldn't reach come back in the `invalid*` echo fields.
#[serde_as]
#[derive(Deserialize)]
pub struct SendReceipt {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::zero")]
    errcode: i64,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub invaliduser: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub invalidparty: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub invalidtag: Option<String>,
}

impl WorkClient {
    /// Send a message of any kind.
    pub async fn send_message(
        &self,
        to: &Recipient,
        content: &MessageContent,
    ) -> Result<SendReceipt, WorkError> {
        api::dispatch(self.post("/cgi-bin/message/send").json(&MessageRequest {
            to,
            agent_id: &self.agent_id,
            content,
        }))
        .await
    }

    /// Send a plain text message.
    pub async fn send_text(
        &self,
        to: &Recipient,
        content: impl Into<String>,
    ) -> Result<SendReceipt, WorkError> {
        self.send_message(
            to,
            &MessageContent::Text(Text {
                content: content.into(),
            }),
        )
        .await
    }

    /// Send a previously uploaded image.
    pub async fn send_image(
        &self,
        to: &Recipient,
        media_id: MediaId,
    ) -> Result<SendReceipt, WorkError> {
        self.send_message(to, &MessageContent::Image(MediaRef { media_id }))
            .await
    }
}
