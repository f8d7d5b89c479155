use async_trait::async_trait;
use domain::{FormEntry, UploadProgress};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::sync::oneshot;

use crate::error::TransportError;
use crate::traits::{HttpResponse, Notifier, ProgressSink, Transport};

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.messages.lock().unwrap().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Get { path: String, query: String },
    Multipart { path: String, entries: Vec<FormEntry> },
}

enum Reply {
    Ready(Result<HttpResponse, TransportError>),
    Gated(oneshot::Receiver<HttpResponse>),
}

struct Scripted {
    progress: Vec<UploadProgress>,
    reply: Reply,
}

/// Transport double. Replies are consumed in order, except gated multipart
/// replies which are matched by the uploaded file's name.
#[derive(Default)]
pub struct FakeTransport {
    queue: Mutex<VecDeque<Scripted>>,
    by_file: Mutex<HashMap<String, Scripted>>,
    requests: Mutex<Vec<Recorded>>,
}

impl FakeTransport {
    pub fn reply(&self, status: u16, body: &str) {
        self.push(Vec::new(), Reply::Ready(Ok(HttpResponse::new(status, body))));
    }

    pub fn reply_with_progress(&self, progress: Vec<UploadProgress>, status: u16, body: &str) {
        self.push(progress, Reply::Ready(Ok(HttpResponse::new(status, body))));
    }

    pub fn fail(&self, reason: &str) {
        self.push(
            Vec::new(),
            Reply::Ready(Err(TransportError::Unavailable(reason.to_string()))),
        );
    }

    /// Holds back the reply for an upload of `file_name` until the returned
    /// sender fires.
    pub fn gate_upload(
        &self,
        file_name: &str,
        progress: Vec<UploadProgress>,
    ) -> oneshot::Sender<HttpResponse> {
        let (tx, rx) = oneshot::channel();
        self.by_file.lock().unwrap().insert(
            file_name.to_string(),
            Scripted {
                progress,
                reply: Reply::Gated(rx),
            },
        );
        tx
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn push(&self, progress: Vec<UploadProgress>, reply: Reply) {
        self.queue
            .lock()
            .unwrap()
            .push_back(Scripted { progress, reply });
    }

    fn next(&self, file_name: Option<String>) -> Scripted {
        if let Some(scripted) = file_name.and_then(|f| self.by_file.lock().unwrap().remove(&f)) {
            return scripted;
        }
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted reply left")
    }
}

async fn resolve(reply: Reply) -> Result<HttpResponse, TransportError> {
    match reply {
        Reply::Ready(result) => result,
        Reply::Gated(rx) => rx
            .await
            .map_err(|_| TransportError::Unavailable("gate dropped".into())),
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, path: &str, query: &str) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(Recorded::Get {
            path: path.to_string(),
            query: query.to_string(),
        });
        let scripted = self.next(None);
        resolve(scripted.reply).await
    }

    async fn post_multipart(
        &self,
        path: &str,
        entries: Vec<FormEntry>,
        progress: ProgressSink,
    ) -> Result<HttpResponse, TransportError> {
        let file_name = entries.iter().find_map(|e| match e {
            FormEntry::File { path, .. } => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned()),
            FormEntry::Text { .. } => None,
        });
        self.requests.lock().unwrap().push(Recorded::Multipart {
            path: path.to_string(),
            entries,
        });
        let scripted = self.next(file_name);
        for event in scripted.progress {
            progress(event);
        }
        resolve(scripted.reply).await
    }
}
