use std::path::Path;

use bytes::Bytes;
use serde::Serialize;

use super::ClientError;
use crate::models::EntityId;

/// Extensions accepted by the resume upload endpoint, with their MIME types.
const RESUME_CONTENT_TYPES: [(&str, &str); 4] = [
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("txt", "text/plain"),
];

/// A resume file ready to be sent as a multipart part.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Bytes,
}

impl ResumeFile {
    /// Validates the extension and payload. An empty payload is never uploaded.
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Result<Self, ClientError> {
        let file_name = file_name.into();
        let bytes = bytes.into();

        let content_type = content_type_for(&file_name).ok_or_else(|| {
            ClientError::InvalidInput(format!(
                "unsupported resume format: {file_name} (expected .pdf, .doc, .docx or .txt)"
            ))
        })?;

        if bytes.is_empty() {
            return Err(ClientError::InvalidInput(format!(
                "resume file is empty: {file_name}"
            )));
        }

        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    pub async fn from_path(path: &Path) -> Result<Self, ClientError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ClientError::InvalidInput(format!("not a file path: {}", path.display()))
            })?
            .to_string();

        let bytes = tokio::fs::read(path).await?;
        Self::new(file_name, bytes)
    }
}

fn content_type_for(file_name: &str) -> Option<&'static str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    RESUME_CONTENT_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}

/// Optional job metadata sent alongside a description. Blank values count as omitted.
#[derive(Debug, Clone, Default)]
pub struct JobMetadata {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub experience_level: Option<String>,
}

impl JobMetadata {
    /// Query parameters with the service defaults filled in.
    pub fn query_pairs(&self) -> [(&'static str, String); 5] {
        [
            ("title", or_default(&self.title, "Job Position")),
            ("company", or_default(&self.company, "Company")),
            ("location", or_default(&self.location, "")),
            ("employmentType", or_default(&self.employment_type, "Full-time")),
            ("experienceLevel", or_default(&self.experience_level, "Mid-level")),
        ]
    }
}

fn or_default(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TailorRequest<'a> {
    pub resume_id: &'a EntityId,
    pub job_id: &'a EntityId,
}
