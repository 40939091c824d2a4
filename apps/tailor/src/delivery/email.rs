//! Batch notification email, sent through SES v2 as a raw MIME message
//! so the PDFs can travel as attachments.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sesv2::primitives::Blob;
use aws_sdk_sesv2::types::{Destination, EmailContent, RawMessage};
use aws_sdk_sesv2::Client as SesClient;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, FixedOffset, NaiveDate};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::job::ProcessedArtifacts;

const BASE64_LINE_LEN: usize = 76;

#[derive(Debug, Clone, PartialEq)]
pub struct EmailAttachment {
    pub filename: String,
    pub content: Vec<u8>,
    pub content_type: String,
}

/// One processed job plus what happened to its uploads.
#[derive(Debug, Clone)]
pub struct DeliveredJob {
    pub artifacts: ProcessedArtifacts,
    pub resume_uploaded: bool,
    pub cover_letter_uploaded: bool,
}

pub fn batch_subject(date: NaiveDate, run: u32) -> String {
    format!("Job Apps {} - Run {run}", date.format("%Y-%m-%d"))
}

fn upload_status(uploaded: bool) -> &'static str {
    if uploaded {
        "Uploaded"
    } else {
        "Upload Failed/Skipped"
    }
}

pub fn batch_body(date: NaiveDate, run: u32, jobs: &[DeliveredJob]) -> String {
    let date = date.format("%Y-%m-%d");
    let mut body = String::new();
    for job in jobs {
        let a = &job.artifacts;
        let lines = [
            format!(
                "Tailored application documents for: {} at {}",
                a.job_title, a.company_name
            ),
            format!("Job URL: {}", a.job_url),
            format!("Platform: {} ({})", a.source_platform, a.search_source_name),
            format!("Run ID: {date} / Run No: {run}"),
            format!("Resume storage: {}", upload_status(job.resume_uploaded)),
            format!(
                "Cover Letter storage: {}",
                upload_status(job.cover_letter_uploaded)
            ),
            "\nCritique:".to_string(),
            a.critique_text.clone(),
            "--------------------\n".to_string(),
        ];
        body.push_str(&lines.join("\n"));
        body.push('\n');
    }
    body
}

/// Reads attachment files, skipping any that no longer exist.
pub async fn load_attachments(paths: &[PathBuf]) -> Vec<EmailAttachment> {
    let mut attachments = Vec::new();
    for path in paths {
        if !path.exists() {
            warn!(path = %path.display(), "Attachment not found, skipping");
            continue;
        }
        match tokio::fs::read(path).await {
            Ok(content) => attachments.push(EmailAttachment {
                filename: file_name(path),
                content,
                content_type: content_type_for(path).to_string(),
            }),
            Err(e) => error!(path = %path.display(), "Could not read attachment: {e}"),
        }
    }
    attachments
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string())
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("pdf") => "application/pdf",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// RFC 2047 encoded-word for non-ASCII header values.
fn encode_header(value: &str) -> String {
    if value.is_ascii() {
        value.to_string()
    } else {
        format!("=?UTF-8?B?{}?=", BASE64.encode(value.as_bytes()))
    }
}

fn wrap_base64(data: &[u8]) -> String {
    let encoded = BASE64.encode(data);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / BASE64_LINE_LEN * 2);
    for chunk in encoded.as_bytes().chunks(BASE64_LINE_LEN) {
        // base64 output is ASCII
        out.push_str(&String::from_utf8_lossy(chunk));
        out.push_str("\r\n");
    }
    out
}

/// `multipart/mixed`: a UTF-8 text part, then one base64 part per attachment.
pub fn build_raw_message(
    from: &str,
    to: &str,
    subject: &str,
    body: &str,
    attachments: &[EmailAttachment],
    boundary: &str,
    date: DateTime<FixedOffset>,
) -> String {
    let mut msg = String::new();
    msg.push_str(&format!("From: {from}\r\n"));
    msg.push_str(&format!("To: {to}\r\n"));
    msg.push_str(&format!("Date: {}\r\n", date.to_rfc2822()));
    msg.push_str(&format!("Subject: {}\r\n", encode_header(subject)));
    msg.push_str("MIME-Version: 1.0\r\n");
    msg.push_str(&format!(
        "Content-Type: multipart/mixed; boundary=\"{boundary}\"\r\n\r\n"
    ));

    msg.push_str(&format!("--{boundary}\r\n"));
    msg.push_str("Content-Type: text/plain; charset=utf-8\r\n");
    msg.push_str("Content-Transfer-Encoding: base64\r\n\r\n");
    msg.push_str(&wrap_base64(body.as_bytes()));

    for attachment in attachments {
        let name = attachment.filename.replace('"', "");
        msg.push_str(&format!("--{boundary}\r\n"));
        msg.push_str(&format!(
            "Content-Type: {}; name=\"{name}\"\r\n",
            attachment.content_type
        ));
        msg.push_str(&format!(
            "Content-Disposition: attachment; filename=\"{name}\"\r\n"
        ));
        msg.push_str("Content-Transfer-Encoding: base64\r\n\r\n");
        msg.push_str(&wrap_base64(&attachment.content));
    }
    msg.push_str(&format!("--{boundary}--\r\n"));
    msg
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        subject: &str,
        body: &str,
        attachments: &[EmailAttachment],
    ) -> Result<(), AppError>;
}

pub struct SesMailer {
    client: SesClient,
    from: String,
    to: String,
}

impl SesMailer {
    /// `None` when sender or recipient is not configured.
    pub async fn from_config(config: &Config) -> Option<Self> {
        let (Some(from), Some(to)) = (config.email_from.clone(), config.email_to.clone()) else {
            warn!("EMAIL_FROM or EMAIL_TO not set; email delivery disabled");
            return None;
        };
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.aws_region.clone()))
            .load()
            .await;
        Some(Self {
            client: SesClient::new(&sdk_config),
            from,
            to,
        })
    }
}

#[async_trait]
impl Mailer for SesMailer {
    async fn send(
        &self,
        subject: &str,
        body: &str,
        attachments: &[EmailAttachment],
    ) -> Result<(), AppError> {
        let boundary = format!("=_tailor_{}", Uuid::new_v4().simple());
        let raw = build_raw_message(
            &self.from,
            &self.to,
            subject,
            body,
            attachments,
            &boundary,
            chrono::Local::now().fixed_offset(),
        );
        let raw_message = RawMessage::builder()
            .data(Blob::new(raw.into_bytes()))
            .build()
            .map_err(|e| AppError::Email(format!("Failed to build raw message: {e}")))?;

        let result = self
            .client
            .send_email()
            .from_email_address(&self.from)
            .destination(Destination::builder().to_addresses(&self.to).build())
            .content(EmailContent::builder().raw(raw_message).build())
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, to = %self.to, "Failed to send email via SES");
                AppError::Email(format!("Send failed: {e}"))
            })?;

        info!(
            to = %self.to,
            subject,
            attachments = attachments.len(),
            message_id = ?result.message_id(),
            "Email sent"
        );
        Ok(())
    }
}
