use async_trait::async_trait;
use domain::{FormEntry, UploadProgress};
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Url};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::error::TransportError;
use crate::traits::{HttpResponse, ProgressSink, Transport};

const UPLOAD_CHUNK_SIZE: usize = 16 * 1024;

/// Talks to the blog over HTTP. Endpoint paths resolve against the URL of
/// the page the form lives on, like relative XHR URLs do.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    page_url: Url,
}

impl HttpTransport {
    pub fn new(page_url: &str) -> Result<Self, TransportError> {
        Self::with_client(Client::new(), page_url)
    }

    pub fn with_client(client: Client, page_url: &str) -> Result<Self, TransportError> {
        Ok(Self {
            client,
            page_url: Url::parse(page_url)?,
        })
    }

    pub fn page_url(&self) -> &Url {
        &self.page_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        Ok(self.page_url.join(path)?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, query: &str) -> Result<HttpResponse, TransportError> {
        let mut url = self.endpoint(path)?;
        url.set_query(Some(query));
        debug!("GET {}", url);

        let resp = self.client.get(url).send().await?;
        read_response(resp).await
    }

    async fn post_multipart(
        &self,
        path: &str,
        entries: Vec<FormEntry>,
        progress: ProgressSink,
    ) -> Result<HttpResponse, TransportError> {
        let url = self.endpoint(path)?;
        let form = build_form(entries, progress).await?;
        debug!("POST {} (multipart)", url);

        let resp = self.client.post(url).multipart(form).send().await?;
        read_response(resp).await
    }
}

async fn read_response(resp: reqwest::Response) -> Result<HttpResponse, TransportError> {
    let status = resp.status().as_u16();
    let body = resp.text().await?;
    Ok(HttpResponse { status, body })
}

enum PendingPart {
    Text(String, String),
    File {
        name: String,
        file_name: String,
        file: File,
        len: u64,
    },
}

async fn open_part(path: &Path) -> Result<(File, u64), std::io::Error> {
    let file = File::open(path).await?;
    let len = file.metadata().await?.len();
    Ok((file, len))
}

async fn build_form(entries: Vec<FormEntry>, progress: ProgressSink) -> Result<Form, TransportError> {
    let mut parts = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            FormEntry::Text { name, value } => parts.push(PendingPart::Text(name, value)),
            FormEntry::File { name, path } => {
                let (file, len) = open_part(&path)
                    .await
                    .map_err(|source| TransportError::File {
                        path: path.clone(),
                        source,
                    })?;
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                parts.push(PendingPart::File {
                    name,
                    file_name,
                    file,
                    len,
                });
            }
        }
    }

    // 进度只统计文件字节，总量在发送前即可确定
    let total: u64 = parts
        .iter()
        .map(|p| match p {
            PendingPart::File { len, .. } => *len,
            PendingPart::Text(..) => 0,
        })
        .sum();
    let sent = Arc::new(AtomicU64::new(0));

    let mut form = Form::new();
    for part in parts {
        form = match part {
            PendingPart::Text(name, value) => form.text(name, value),
            PendingPart::File {
                name,
                file_name,
                file,
                len,
            } => {
                let body = progress_body(file, total, sent.clone(), progress.clone());
                form.part(name, Part::stream_with_length(body, len).file_name(file_name))
            }
        };
    }
    Ok(form)
}

/// Streams `file` from disk, reporting bytes as they are handed to the
/// connection.
fn progress_body(file: File, total: u64, sent: Arc<AtomicU64>, progress: ProgressSink) -> Body {
    let stream = ReaderStream::with_capacity(file, UPLOAD_CHUNK_SIZE).map(move |chunk| {
        if let Ok(bytes) = &chunk {
            let len = bytes.len() as u64;
            let loaded = sent.fetch_add(len, Ordering::SeqCst) + len;
            progress(UploadProgress::new(loaded, Some(total)));
        }
        chunk
    });
    Body::wrap_stream(stream)
}
