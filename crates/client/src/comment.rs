use domain::protocol::{comment_query, COMMENT_SUBMIT_PATH};
use domain::{
    ids, CommentSubmissionResponse, FormSnapshot, ValidationResult, COMMENT_FORM,
    COMMENT_QUERY_FIELDS,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::dispatch::Dispatch;
use crate::error::{ClientError, PageError, TransportError};
use crate::traits::{FieldAccessor, HttpResponse, Navigation, Notifier, Page, Transport};
use crate::validator::validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Validating,
    Submitting,
    CaptchaCleared,
    CaptchaPrompted,
    Navigated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    CaptchaCleared,
    CaptchaPrompted {
        task: String,
        token: String,
    },
    Navigated {
        url: String,
    },
    Failed(ClientError),
}

struct Session {
    state: SubmissionState,
    challenge: Option<String>,
}

/// Drives one comment form: validate, send, react to the server's verdict.
/// Every submission is a fresh pass; answering a captcha means submitting
/// again.
#[derive(Clone)]
pub struct CommentController {
    transport: Arc<dyn Transport>,
    page: Arc<dyn Page>,
    notifier: Arc<dyn Notifier>,
    session: Arc<Mutex<Session>>,
}

impl CommentController {
    pub fn new(
        transport: Arc<dyn Transport>,
        page: Arc<dyn Page>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            transport,
            page,
            notifier,
            session: Arc::new(Mutex::new(Session {
                state: SubmissionState::Idle,
                challenge: None,
            })),
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.session().state
    }

    /// Token of the captcha the server is currently waiting on, if any.
    pub fn pending_challenge(&self) -> Option<String> {
        self.session().challenge.clone()
    }

    /// Returns as soon as the request is dispatched; the page is updated
    /// when the reply arrives. Outside a Tokio runtime nothing is sent and
    /// the failure is reported like any other exception.
    pub fn submit(&self) -> Dispatch<SubmitOutcome> {
        self.set_state(SubmissionState::Validating);

        match validate(&*self.page, &*self.notifier, COMMENT_FORM) {
            Ok(ValidationResult::Valid) => {}
            Ok(ValidationResult::Invalid { field_id, message }) => {
                // the validator has already told the user
                self.set_state(SubmissionState::Idle);
                return Dispatch::Done(SubmitOutcome::Failed(ClientError::Validation {
                    field_id,
                    message,
                }));
            }
            Err(e) => return Dispatch::Done(self.fail(e.into())),
        }

        let runtime = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => return Dispatch::Done(self.fail(TransportError::from(e).into())),
        };

        let query = match self.read_query() {
            Ok(q) => q,
            Err(e) => return Dispatch::Done(self.fail(e.into())),
        };

        self.set_state(SubmissionState::Submitting);
        debug!("Submitting comment: {}?{}", COMMENT_SUBMIT_PATH, query);

        let this = self.clone();
        Dispatch::InFlight(runtime.spawn(async move {
            let result = this.transport.get(COMMENT_SUBMIT_PATH, &query).await;
            this.complete(result)
        }))
    }

    fn read_query(&self) -> Result<String, PageError> {
        let snapshot = COMMENT_QUERY_FIELDS
            .iter()
            .map(|name| Ok((name.to_string(), self.page.value_by_name(name)?)))
            .collect::<Result<FormSnapshot, PageError>>()?;
        Ok(comment_query(&snapshot))
    }

    fn complete(&self, result: Result<HttpResponse, TransportError>) -> SubmitOutcome {
        let response = match result {
            Ok(r) => r,
            Err(e) => return self.fail(e.into()),
        };

        if !response.is_success() {
            warn!("Comment submission failed with status {}", response.status);
            self.notifier.notify(&format!(
                "Error submitting comment. Status = {}",
                response.status
            ));
            self.set_state(SubmissionState::Idle);
            return SubmitOutcome::Failed(ClientError::TransportStatus(response.status));
        }

        let verdict = match CommentSubmissionResponse::from_json(&response.body) {
            Ok(v) => v,
            Err(e) => return self.fail(e.into()),
        };

        match self.apply(verdict) {
            Ok(outcome) => outcome,
            Err(e) => self.fail(e.into()),
        }
    }

    fn apply(&self, verdict: CommentSubmissionResponse) -> Result<SubmitOutcome, PageError> {
        match verdict {
            CommentSubmissionResponse::Rejected => {
                info!("Captcha answer rejected");
                self.page.set_value(ids::CAPTCHA_INPUT, "")?;
                let mut session = self.session();
                session.challenge = None;
                session.state = SubmissionState::CaptchaCleared;
                Ok(SubmitOutcome::CaptchaCleared)
            }
            CommentSubmissionResponse::ChallengeRequired { task, token } => {
                info!("Server asked for a captcha (id {})", token);
                self.page.set_text(ids::CAPTCHA_TASK_TEXT, &task)?;
                self.page.set_visible(ids::CAPTCHA_ALERT_BOX, true)?;
                self.page.set_value(ids::CAPTCHA_ID, &token)?;

                if let Err(e) = self.page.scroll_into_view(ids::CAPTCHA_ALERT_BOX) {
                    debug!("Skipping scroll: {}", e);
                }
                if let Err(e) = self.page.focus(ids::CAPTCHA_INPUT) {
                    debug!("Skipping focus: {}", e);
                }

                let mut session = self.session();
                session.challenge = Some(token.clone());
                session.state = SubmissionState::CaptchaPrompted;
                Ok(SubmitOutcome::CaptchaPrompted { task, token })
            }
            CommentSubmissionResponse::Accepted { redirect_url } => {
                info!("Comment accepted, redirecting to {}", redirect_url);
                self.page.navigate(Navigation {
                    url: redirect_url.clone(),
                    bypass_cache: true,
                });
                let mut session = self.session();
                session.challenge = None;
                session.state = SubmissionState::Navigated;
                Ok(SubmitOutcome::Navigated { url: redirect_url })
            }
        }
    }

    fn fail(&self, error: ClientError) -> SubmitOutcome {
        warn!("Comment submission error: {}", error);
        self.notifier.notify(&format!("exc: {}", error));
        self.set_state(SubmissionState::Idle);
        SubmitOutcome::Failed(error)
    }

    fn set_state(&self, state: SubmissionState) {
        self.session().state = state;
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
