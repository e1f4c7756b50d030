//! Outbound messages and the request bodies built from them.
//!
//! A user's send action becomes an [`OutboundMessage`], which is turned into a
//! [`ChatRequest`] exactly once per submission.  The request is reused across
//! retry attempts; each attempt renders it into either a JSON body or a
//! `multipart/form-data` form depending on whether photos are attached.

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utf8path::Path;

use crate::connection::ConnectionState;
use crate::error::{Error, Result};
use crate::session::SessionId;

/// Maximum number of photos attached to a single message.
pub const MAX_ATTACHMENTS: usize = 5;

/// Maximum size of a single photo.
pub const MAX_ATTACHMENT_BYTES: usize = 10 * 1024 * 1024;

/// A binary image payload selected by the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    file_name: String,
    mime_type: String,
    data: Bytes,
}

impl Attachment {
    /// Creates an attachment from raw bytes.
    ///
    /// Only `image/*` payloads up to [`MAX_ATTACHMENT_BYTES`] are accepted.
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Result<Self> {
        let file_name = file_name.into();
        let mime_type = mime_type.into();
        let data = data.into();
        if !mime_type.starts_with("image/") {
            return Err(Error::validation(
                format!("{file_name} is not an image ({mime_type})"),
                Some("mime_type".to_string()),
            ));
        }
        if data.len() > MAX_ATTACHMENT_BYTES {
            return Err(Error::validation(
                format!(
                    "{file_name} is {} bytes; the limit is {MAX_ATTACHMENT_BYTES}",
                    data.len()
                ),
                Some("data".to_string()),
            ));
        }
        Ok(Self {
            file_name,
            mime_type,
            data,
        })
    }

    /// Reads an image from disk, guessing its type from the file extension.
    pub async fn from_path(path: Path<'_>) -> Result<Self> {
        let path = path.as_str();
        let file_name = path.rsplit('/').next().unwrap_or(path).to_string();
        let mime_type = image_mime_type(&file_name).ok_or_else(|| {
            Error::validation(
                format!("{file_name} does not look like an image"),
                Some("path".to_string()),
            )
        })?;
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| Error::io(format!("could not read {path}: {e}"), e))?;
        Self::new(file_name, mime_type, data)
    }

    /// The file name reported to the backend.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The MIME type of the payload.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// The raw image bytes.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    fn to_part(&self) -> Result<Part> {
        Part::bytes(self.data.to_vec())
            .file_name(self.file_name.clone())
            .mime_str(&self.mime_type)
            .map_err(|e| {
                Error::http_client(
                    format!("invalid MIME type {}: {e}", self.mime_type),
                    Some(Box::new(e)),
                )
            })
    }
}

fn image_mime_type(file_name: &str) -> Option<&'static str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "heic" => Some("image/heic"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// An ordered selection of at most [`MAX_ATTACHMENTS`] photos.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttachmentSet {
    items: Vec<Attachment>,
}

impl AttachmentSet {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a photo, failing once the selection is full.
    pub fn push(&mut self, attachment: Attachment) -> Result<()> {
        if self.items.len() >= MAX_ATTACHMENTS {
            return Err(Error::validation(
                format!("at most {MAX_ATTACHMENTS} photos can be attached"),
                Some("attachments".to_string()),
            ));
        }
        self.items.push(attachment);
        Ok(())
    }

    /// Removes and returns the photo at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Attachment> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attachment> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Attachment] {
        &self.items
    }

    /// Consumes the selection, yielding the photos in order.
    pub fn into_vec(self) -> Vec<Attachment> {
        self.items
    }
}

impl TryFrom<Vec<Attachment>> for AttachmentSet {
    type Error = Error;

    fn try_from(items: Vec<Attachment>) -> Result<Self> {
        let mut set = AttachmentSet::new();
        for item in items {
            set.push(item)?;
        }
        Ok(set)
    }
}

//////////////////////////////////////////// OutboundMessage ///////////////////////////////////////

/// One user send action: text, photos, or both.
#[derive(Clone, Debug)]
pub struct OutboundMessage {
    session_id: SessionId,
    text: Option<String>,
    attachments: AttachmentSet,
}

impl OutboundMessage {
    /// Creates a message, trimming the text.
    ///
    /// Fails when both the trimmed text and the attachments are empty.
    pub fn new(session_id: SessionId, text: &str, attachments: AttachmentSet) -> Result<Self> {
        let text = Some(text.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        if text.is_none() && attachments.is_empty() {
            return Err(Error::validation(
                "a message needs text or at least one photo",
                None,
            ));
        }
        Ok(Self {
            session_id,
            text,
            attachments,
        })
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn attachments(&self) -> &AttachmentSet {
        &self.attachments
    }

    /// Builds the request sent for this message.
    pub fn into_request(
        self,
        connection: ConnectionState,
        user_agent: &str,
        now: OffsetDateTime,
    ) -> ChatRequest {
        let payload = ChatPayload {
            chat_input: self.text.unwrap_or_default(),
            session_id: self.session_id,
            sender_name: String::new(),
            sender_phone: String::new(),
            timestamp: now,
            user_agent: user_agent.to_string(),
            connection_status: connection,
            has_files: !self.attachments.is_empty(),
        };
        ChatRequest {
            payload,
            attachments: self.attachments.into_vec(),
        }
    }
}

/// The scalar fields sent with every chat request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    pub chat_input: String,
    pub session_id: SessionId,
    /// Collected later in the conversation; always empty here.
    pub sender_name: String,
    /// Collected later in the conversation; always empty here.
    pub sender_phone: String,
    #[serde(with = "crate::utils::time")]
    pub timestamp: OffsetDateTime,
    pub user_agent: String,
    pub connection_status: ConnectionState,
    pub has_files: bool,
}

impl ChatPayload {
    /// The payload as ordered multipart text fields.
    pub fn form_fields(&self) -> Result<Vec<(&'static str, String)>> {
        let timestamp = crate::utils::time::iso8601(self.timestamp).map_err(|e| {
            Error::serialization(format!("could not format timestamp: {e}"), Some(Box::new(e)))
        })?;
        Ok(vec![
            ("chatInput", self.chat_input.clone()),
            ("sessionId", self.session_id.to_string()),
            ("senderName", self.sender_name.clone()),
            ("senderPhone", self.sender_phone.clone()),
            ("timestamp", timestamp),
            ("userAgent", self.user_agent.clone()),
            ("connectionStatus", self.connection_status.to_string()),
            ("hasFiles", self.has_files.to_string()),
        ])
    }
}

/// A fully built chat request, reusable across retry attempts.
#[derive(Clone, Debug)]
pub struct ChatRequest {
    payload: ChatPayload,
    attachments: Vec<Attachment>,
}

impl ChatRequest {
    pub fn payload(&self) -> &ChatPayload {
        &self.payload
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Whether this request is sent as `multipart/form-data`.
    pub fn is_multipart(&self) -> bool {
        !self.attachments.is_empty()
    }

    /// The name of the form part carrying the photo at `index`.
    pub fn part_name(index: usize) -> String {
        format!("photo_{index}")
    }

    /// Renders the multipart form for one attempt.
    pub fn multipart_form(&self) -> Result<Form> {
        let mut form = Form::new();
        for (name, value) in self.payload.form_fields()? {
            form = form.text(name, value);
        }
        for (index, attachment) in self.attachments.iter().enumerate() {
            form = form.part(Self::part_name(index), attachment.to_part()?);
        }
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn photo(name: &str) -> Attachment {
        Attachment::new(name, "image/png", vec![0x89, b'P', b'N', b'G']).unwrap()
    }

    #[test]
    fn rejects_non_images() {
        let err = Attachment::new("notes.txt", "text/plain", vec![1, 2, 3]).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn rejects_oversized_images() {
        let data = vec![0u8; MAX_ATTACHMENT_BYTES + 1];
        assert!(Attachment::new("big.png", "image/png", data).is_err());
    }

    #[test]
    fn guesses_mime_from_extension() {
        assert_eq!(image_mime_type("a.JPG"), Some("image/jpeg"));
        assert_eq!(image_mime_type("tattoo.webp"), Some("image/webp"));
        assert_eq!(image_mime_type("README"), None);
        assert_eq!(image_mime_type("doc.pdf"), None);
    }

    #[test]
    fn attachment_set_is_bounded() {
        let mut set = AttachmentSet::new();
        for i in 0..MAX_ATTACHMENTS {
            set.push(photo(&format!("{i}.png"))).unwrap();
        }
        assert!(set.push(photo("6.png")).is_err());
        assert_eq!(set.len(), MAX_ATTACHMENTS);
        assert_eq!(set.remove(0).unwrap().file_name(), "0.png");
        assert!(set.remove(10).is_none());
        assert!(set.push(photo("6.png")).is_ok());
    }

    #[test]
    fn attachment_set_from_vec() {
        let too_many: Vec<_> = (0..6).map(|i| photo(&format!("{i}.png"))).collect();
        assert!(AttachmentSet::try_from(too_many).is_err());
        let ok = AttachmentSet::try_from(vec![photo("a.png")]).unwrap();
        assert_eq!(ok.len(), 1);
    }

    #[test]
    fn empty_message_is_rejected() {
        let id = SessionId::from("chat_x_1");
        assert!(OutboundMessage::new(id.clone(), "   ", AttachmentSet::new()).is_err());
        assert!(OutboundMessage::new(id.clone(), "hi", AttachmentSet::new()).is_ok());
        let photos = AttachmentSet::try_from(vec![photo("a.png")]).unwrap();
        let msg = OutboundMessage::new(id, "", photos).unwrap();
        assert_eq!(msg.text(), None);
    }

    #[test]
    fn json_payload_shape() {
        let msg =
            OutboundMessage::new(SessionId::from("chat_x_1"), " hello ", AttachmentSet::new())
                .unwrap();
        let request = msg.into_request(
            ConnectionState::Unknown,
            "test-agent",
            datetime!(2024-01-02 03:04:05.006 UTC),
        );
        assert!(!request.is_multipart());
        let value = serde_json::to_value(request.payload()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "chatInput": "hello",
                "sessionId": "chat_x_1",
                "senderName": "",
                "senderPhone": "",
                "timestamp": "2024-01-02T03:04:05.006Z",
                "userAgent": "test-agent",
                "connectionStatus": "unknown",
                "hasFiles": false,
            })
        );
    }

    #[test]
    fn multipart_fields() {
        let photos = AttachmentSet::try_from(vec![photo("a.png"), photo("b.png")]).unwrap();
        let msg = OutboundMessage::new(SessionId::from("chat_x_1"), "", photos).unwrap();
        let request = msg.into_request(
            ConnectionState::Timeout,
            "ua",
            datetime!(2024-01-02 03:04:05 UTC),
        );
        assert!(request.is_multipart());
        let fields = request.payload().form_fields().unwrap();
        let names: Vec<_> = fields.iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            vec![
                "chatInput",
                "sessionId",
                "senderName",
                "senderPhone",
                "timestamp",
                "userAgent",
                "connectionStatus",
                "hasFiles"
            ]
        );
        assert_eq!(fields[0].1, "");
        assert_eq!(fields[6].1, "timeout");
        assert_eq!(fields[7].1, "true");
        assert_eq!(ChatRequest::part_name(1), "photo_1");
        assert!(request.multipart_form().is_ok());
    }

    #[tokio::test]
    async fn from_path_rejects_unknown_extension() {
        let err = Attachment::from_path(Path::from("/tmp/does-not-matter.txt"))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }
}
