mod error;
pub mod hooks;
mod models;
pub mod protocol;

pub use error::{HookError, ProtocolError};
pub use hooks::{HookCollection, HookName};
pub use models::{
    file_name_from_input, ids, FormEntry, FormSnapshot, RequiredField, UploadProgress, UploadSeq,
    ValidationResult, AUTHOR_FORM, COMMENT_FORM, COMMENT_QUERY_FIELDS, POST_FORM,
};
pub use protocol::CommentSubmissionResponse;
