use async_trait::async_trait;
use domain::{FormEntry, UploadProgress};
use std::sync::Arc;

use crate::error::{PageError, TransportError};

/// Receives byte-level progress while an upload is in flight. May be called
/// any number of times, including zero.
pub type ProgressSink = Arc<dyn Fn(UploadProgress) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network side of the page. Paths are relative to the page URL.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, query: &str) -> Result<HttpResponse, TransportError>;

    async fn post_multipart(
        &self,
        path: &str,
        entries: Vec<FormEntry>,
        progress: ProgressSink,
    ) -> Result<HttpResponse, TransportError>;
}

/// Read/write access to form controls.
pub trait FieldAccessor: Send + Sync {
    fn value_by_name(&self, name: &str) -> Result<String, PageError>;
    fn value_by_id(&self, id: &str) -> Result<String, PageError>;
    fn set_value(&self, id: &str, value: &str) -> Result<(), PageError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub url: String,
    pub bypass_cache: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressIndicator {
    pub id: String,
    pub label: String,
}

pub trait Page: FieldAccessor {
    fn set_text(&self, id: &str, text: &str) -> Result<(), PageError>;
    fn set_visible(&self, id: &str, visible: bool) -> Result<(), PageError>;
    fn scroll_into_view(&self, id: &str) -> Result<(), PageError>;
    fn focus(&self, id: &str) -> Result<(), PageError>;
    fn click(&self, id: &str) -> Result<(), PageError>;

    /// Current entries of a form, files included.
    fn form_entries(&self, form_id: &str) -> Result<Vec<FormEntry>, PageError>;
    fn append_indicator(&self, section_id: &str, indicator: ProgressIndicator)
        -> Result<(), PageError>;
    /// Horizontal background offset of an indicator, in percent.
    fn set_fill_offset(&self, id: &str, percent: i32) -> Result<(), PageError>;
    fn append_to_field(&self, id: &str, text: &str) -> Result<(), PageError>;

    fn navigate(&self, navigation: Navigation);
}

/// User-facing messages (the page's alert box).
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}
