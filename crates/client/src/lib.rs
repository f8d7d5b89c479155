mod comment;
mod dispatch;
mod error;
pub mod page;
mod traits;
pub mod transport;
mod upload;
mod validator;

#[cfg(test)]
mod testing;

pub use comment::{CommentController, SubmissionState, SubmitOutcome};
pub use dispatch::Dispatch;
pub use error::{ClientError, PageError, TransportError};
pub use page::{Element, MemoryPage};
pub use traits::{
    FieldAccessor, HttpResponse, Navigation, Notifier, Page, ProgressIndicator, ProgressSink,
    Transport,
};
pub use transport::HttpTransport;
pub use upload::{UploadController, UploadOutcome};
pub use validator::validate;
