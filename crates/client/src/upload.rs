use domain::protocol::UPLOAD_IMAGES_PATH;
use domain::{file_name_from_input, ids, FormEntry, UploadProgress, UploadSeq};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::dispatch::Dispatch;
use crate::error::{ClientError, PageError, TransportError};
use crate::traits::{HttpResponse, Notifier, Page, ProgressIndicator, ProgressSink, Transport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Appended { seq: UploadSeq, markup: String },
    Failed(ClientError),
}

/// Uploads images picked in the post editor and splices the server's
/// markup into the post body.
///
/// Each upload gets a sequence number when it is dispatched. The counter
/// starts at zero, is bumped right after the request goes out and is never
/// reset, so uploads started back to back are numbered in dispatch order
/// however their replies interleave.
#[derive(Clone)]
pub struct UploadController {
    transport: Arc<dyn Transport>,
    page: Arc<dyn Page>,
    notifier: Arc<dyn Notifier>,
    upload_no: Arc<Mutex<u64>>,
}

impl UploadController {
    pub fn new(
        transport: Arc<dyn Transport>,
        page: Arc<dyn Page>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            transport,
            page,
            notifier,
            upload_no: Arc::new(Mutex::new(0)),
        }
    }

    pub fn upload_no(&self) -> u64 {
        *self.counter()
    }

    /// Opens the picker of the hidden file input.
    pub fn open_file_picker(&self) -> Result<(), PageError> {
        self.page.click(ids::FILE_INPUT)
    }

    /// Reacts to a change of the file input. `None` when nothing was picked.
    /// Outside a Tokio runtime the upload is reported as failed before any
    /// indicator is added.
    pub fn on_file_selected(&self, input_value: &str) -> Option<Dispatch<UploadOutcome>> {
        let file_name = file_name_from_input(input_value);
        if file_name.is_empty() {
            return None;
        }

        let runtime = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => return Some(Dispatch::Done(self.fail(TransportError::from(e).into()))),
        };

        // 持锁直到计数递增，保证序号按派发顺序分配
        let mut upload_no = self.counter();
        let seq = UploadSeq(*upload_no + 1);

        let entries = match self.prepare(file_name, seq) {
            Ok(entries) => entries,
            Err(e) => return Some(Dispatch::Done(self.fail(e.into()))),
        };

        debug!("Dispatching upload #{} of '{}'", seq, file_name);
        let progress = self.progress_sink(seq);
        let this = self.clone();
        let handle = runtime.spawn(async move {
            let result = this
                .transport
                .post_multipart(UPLOAD_IMAGES_PATH, entries, progress)
                .await;
            this.complete(seq, result)
        });

        *upload_no += 1;
        Some(Dispatch::InFlight(handle))
    }

    fn prepare(&self, file_name: &str, seq: UploadSeq) -> Result<Vec<FormEntry>, PageError> {
        let entries = self.page.form_entries(ids::EDIT_POST_FORM)?;
        self.page.append_indicator(
            ids::UPLOAD_SECTION,
            ProgressIndicator {
                id: seq.indicator_id(),
                label: file_name.to_string(),
            },
        )?;
        Ok(entries)
    }

    fn progress_sink(&self, seq: UploadSeq) -> ProgressSink {
        let page = self.page.clone();
        let indicator = seq.indicator_id();
        Arc::new(move |progress: UploadProgress| {
            let Some(percent) = progress.percent_remaining() else {
                return;
            };
            if let Err(e) = page.set_fill_offset(&indicator, percent) {
                debug!("Progress for #{} dropped: {}", seq, e);
            }
        })
    }

    fn complete(
        &self,
        seq: UploadSeq,
        result: Result<HttpResponse, TransportError>,
    ) -> UploadOutcome {
        let response = match result {
            Ok(r) => r,
            Err(e) => return self.fail(e.into()),
        };

        if !response.is_success() {
            warn!("Upload #{} failed with status {}", seq, response.status);
            self.notifier
                .notify(&format!("Error uploading: {}", response.status));
            return UploadOutcome::Failed(ClientError::TransportStatus(response.status));
        }

        let markup = response.body;
        if let Err(e) = self
            .page
            .append_to_field(ids::POST_TEXTAREA, &format!("{}\n", markup))
        {
            return self.fail(e.into());
        }
        info!("Upload #{} finished", seq);
        UploadOutcome::Appended { seq, markup }
    }

    fn fail(&self, error: ClientError) -> UploadOutcome {
        warn!("Upload error: {}", error);
        self.notifier.notify(&format!("exc: {}", error));
        UploadOutcome::Failed(error)
    }

    fn counter(&self) -> MutexGuard<'_, u64> {
        self.upload_no.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
