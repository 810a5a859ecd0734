use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::store::{Document, Snapshot, Value};

/// Field names as they appear in stored documents.
pub mod fields {
    pub const IMAGE_URL: &str = "imageUrl";
    pub const IMAGE_ID: &str = "imageId";
    pub const FILE_NAME: &str = "fileName";
    pub const UPLOADED_AT: &str = "uploadedAt";
    pub const DESCRIPTION: &str = "description";
    pub const TAGS: &str = "tags";
}

/// Metadata of one uploaded image, as read back from the store.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// Store-assigned document id.
    pub id: String,
    /// Where the already-uploaded asset is served from.
    pub image_url: String,
    /// Asset id handed out by the upload service.
    pub image_id: String,
    pub file_name: String,
    /// Store time of the write, never the caller's clock.
    pub uploaded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Caller input for a new record. `id` and `uploaded_at` are assigned on write.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewImageRecord {
    pub image_url: String,
    pub image_id: String,
    pub file_name: String,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl NewImageRecord {
    pub fn new(
        image_url: impl Into<String>,
        image_id: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            image_url: image_url.into(),
            image_id: image_id.into(),
            file_name: file_name.into(),
            description: None,
            tags: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Optional fields are only written when present.
    pub(crate) fn into_document(self) -> Document {
        let mut doc = Document::new();
        doc.insert(fields::IMAGE_URL.to_string(), Value::String(self.image_url));
        doc.insert(fields::IMAGE_ID.to_string(), Value::String(self.image_id));
        doc.insert(fields::FILE_NAME.to_string(), Value::String(self.file_name));
        doc.insert(fields::UPLOADED_AT.to_string(), Value::ServerTimestamp);

        if let Some(description) = self.description {
            doc.insert(fields::DESCRIPTION.to_string(), Value::String(description));
        }

        if let Some(tags) = self.tags {
            doc.insert(fields::TAGS.to_string(), Value::StringList(tags));
        }

        doc
    }
}

impl ImageRecord {
    /// Map a stored document back into a record.
    ///
    /// Missing strings come back empty and missing tags as an empty list, but a
    /// document without a usable `uploadedAt` is an error.
    pub(crate) fn from_snapshot(snapshot: &Snapshot) -> Result<Self, StoreError> {
        let string_field = |name: &str| {
            snapshot
                .get(name)
                .and_then(Value::as_str)
                .map(|s| s.to_string())
        };

        let uploaded_at = snapshot
            .get(fields::UPLOADED_AT)
            .and_then(Value::as_timestamp)
            .ok_or_else(|| StoreError::decode(&snapshot.id, "missing or invalid uploadedAt"))?;

        Ok(ImageRecord {
            id: snapshot.id.clone(),
            image_url: string_field(fields::IMAGE_URL).unwrap_or_default(),
            image_id: string_field(fields::IMAGE_ID).unwrap_or_default(),
            file_name: string_field(fields::FILE_NAME).unwrap_or_default(),
            uploaded_at,
            description: string_field(fields::DESCRIPTION),
            tags: snapshot
                .get(fields::TAGS)
                .and_then(Value::as_string_list)
                .map(|tags| tags.to_vec())
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn new_record_writes_only_present_fields() {
        let doc = NewImageRecord::new("https://cdn/u1", "i1", "f1.png").into_document();

        assert_eq!(doc.len(), 4);
        assert_eq!(doc[fields::UPLOADED_AT], Value::ServerTimestamp);
        assert!(!doc.contains_key(fields::DESCRIPTION));
        assert!(!doc.contains_key(fields::TAGS));
    }

    #[test]
    fn explicit_empty_tags_are_written() {
        let doc = NewImageRecord::new("u", "i", "f")
            .with_tags(Vec::<String>::new())
            .into_document();

        assert_eq!(doc[fields::TAGS], Value::StringList(vec![]));
    }

    #[test]
    fn snapshot_defaults_missing_optionals() {
        let at = Utc.timestamp_opt(1_700_000_000, 0).single().unwrap();
        let mut doc = Document::new();
        doc.insert(fields::IMAGE_URL.to_string(), Value::String("u1".to_string()));
        doc.insert(fields::UPLOADED_AT.to_string(), Value::Timestamp(at));
        let snapshot = Snapshot {
            id: "doc-1".to_string(),
            fields: doc,
        };

        let record = ImageRecord::from_snapshot(&snapshot).unwrap();

        assert_eq!(record.id, "doc-1");
        assert_eq!(record.image_url, "u1");
        assert_eq!(record.image_id, "");
        assert_eq!(record.uploaded_at, at);
        assert_eq!(record.description, None);
        assert!(record.tags.is_empty());
    }

    #[test]
    fn snapshot_without_upload_time_is_rejected() {
        let snapshot = Snapshot {
            id: "doc-2".to_string(),
            fields: Document::new(),
        };

        let err = ImageRecord::from_snapshot(&snapshot).unwrap_err();
        assert!(matches!(err, StoreError::Decode { ref id, .. } if id == "doc-2"));
    }

    #[test]
    fn record_serializes_with_camel_case_names() {
        let at = Utc.timestamp_opt(0, 0).single().unwrap();
        let record = ImageRecord {
            id: "x".to_string(),
            image_url: "u".to_string(),
            image_id: "i".to_string(),
            file_name: "f.png".to_string(),
            uploaded_at: at,
            description: None,
            tags: vec!["a".to_string()],
        };

        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["imageUrl"], "u");
        assert_eq!(json["fileName"], "f.png");
        assert_eq!(json["uploadedAt"], "1970-01-01T00:00:00Z");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn new_record_parses_from_caller_json() {
        let payload: NewImageRecord = serde_json::from_str(
            r#"{"imageUrl":"u1","imageId":"i1","fileName":"f1.png","tags":["a"]}"#,
        )
        .unwrap();

        assert_eq!(payload, NewImageRecord::new("u1", "i1", "f1.png").with_tags(["a"]));
    }
}
