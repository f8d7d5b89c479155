use std::fmt;
use std::path::PathBuf;

/// Element identifiers the controllers touch on the page.
pub mod ids {
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const CAPTCHA_INPUT: &str = "captcha-input";
    pub const CAPTCHA_ID: &str = "captcha-id";
    pub const CAPTCHA_TASK_TEXT: &str = "captcha-task-text";
    pub const CAPTCHA_ALERT_BOX: &str = "captcha-alert-box";

    pub const EDIT_POST_FORM: &str = "edit-post-form";
    pub const UPLOAD_SECTION: &str = "upload-progress-section";
    pub const POST_TEXTAREA: &str = "wmd-input";
    pub const FILE_INPUT: &str = "fileid";

    pub const TITLE: &str = "title";
    pub const URL: &str = "url";
    pub const TEXT: &str = "text";

    pub const USERNAME: &str = "uname";
    pub const DISPLAY_NAME: &str = "display-name";
    pub const PASSWORD: &str = "passwd";
    pub const PASSWORD_CONFIRM: &str = "passwd2";
}

/// Form field names serialized into the comment query, in wire order.
pub const COMMENT_QUERY_FIELDS: [&str; 6] =
    ["name", "captcha-id", "captcha", "email", "website", "text"];

/// Ordered (field name, value) pairs read from the page at submission time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSnapshot(Vec<(String, String)>);

impl FormSnapshot {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for FormSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One entry of a multipart form: a plain text control or a selected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEntry {
    Text { name: String, value: String },
    File { name: String, path: PathBuf },
}

impl FormEntry {
    pub fn name(&self) -> &str {
        match self {
            FormEntry::Text { name, .. } | FormEntry::File { name, .. } => name,
        }
    }
}

/// A mandatory field paired with the message shown when it is left empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredField {
    pub field_id: &'static str,
    pub message: &'static str,
}

impl RequiredField {
    pub const fn new(field_id: &'static str, message: &'static str) -> Self {
        Self { field_id, message }
    }
}

pub const COMMENT_FORM: &[RequiredField] = &[
    RequiredField::new(ids::NAME, "Name field is mandatory."),
    RequiredField::new(ids::EMAIL, "Email field is mandatory."),
];

pub const POST_FORM: &[RequiredField] = &[
    RequiredField::new(ids::TITLE, "Title field is mandatory."),
    RequiredField::new(ids::URL, "URL field is mandatory."),
    RequiredField::new(ids::POST_TEXTAREA, "Post body is mandatory."),
];

pub const AUTHOR_FORM: &[RequiredField] = &[
    RequiredField::new(ids::USERNAME, "Username field is mandatory."),
    RequiredField::new(ids::DISPLAY_NAME, "Display name field is mandatory."),
    RequiredField::new(ids::PASSWORD, "Password field is mandatory."),
    RequiredField::new(ids::PASSWORD_CONFIRM, "Please confirm the password."),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid {
        field_id: &'static str,
        message: &'static str,
    },
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

/// Byte-level progress of an in-flight upload. `total` is `None` when the
/// size is not computable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub loaded: u64,
    pub total: Option<u64>,
}

impl UploadProgress {
    pub fn new(loaded: u64, total: Option<u64>) -> Self {
        Self { loaded, total }
    }

    /// Percent of the payload still to send, truncated toward zero.
    /// Note the polarity: 25 of 100 bytes sent yields 75.
    pub fn percent_remaining(&self) -> Option<i32> {
        let total = self.total.filter(|t| *t > 0)?;
        let sent = self.loaded as f64 / total as f64 * 100.0;
        Some((100.0 - sent).trunc() as i32)
    }
}

/// Upload sequence number; names the progress indicator of one upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UploadSeq(pub u64);

impl UploadSeq {
    pub fn indicator_id(&self) -> String {
        format!("progress_{}", self.0)
    }
}

impl fmt::Display for UploadSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strips any path prefix from a file input's value.
pub fn file_name_from_input(value: &str) -> &str {
    value
        .rsplit(|c: char| c == '\\' || c == '/')
        .next()
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_remaining_keeps_polarity() {
        assert_eq!(UploadProgress::new(25, Some(100)).percent_remaining(), Some(75));
        assert_eq!(UploadProgress::new(100, Some(100)).percent_remaining(), Some(0));
        assert_eq!(UploadProgress::new(0, Some(100)).percent_remaining(), Some(100));
    }

    #[test]
    fn percent_remaining_truncates_toward_zero() {
        // 100 - 33.33.. = 66.66..
        assert_eq!(UploadProgress::new(1, Some(3)).percent_remaining(), Some(66));
        // 100 - 66.66.. = 33.33..
        assert_eq!(UploadProgress::new(2, Some(3)).percent_remaining(), Some(33));
    }

    #[test]
    fn percent_remaining_needs_known_total() {
        assert_eq!(UploadProgress::new(10, None).percent_remaining(), None);
        assert_eq!(UploadProgress::new(0, Some(0)).percent_remaining(), None);
    }

    #[test]
    fn file_name_strips_windows_and_unix_prefixes() {
        assert_eq!(file_name_from_input("C:\\fakepath\\cat.png"), "cat.png");
        assert_eq!(file_name_from_input("/home/me/dog.jpg"), "dog.jpg");
        assert_eq!(file_name_from_input("plain.gif"), "plain.gif");
        assert_eq!(file_name_from_input(""), "");
        assert_eq!(file_name_from_input("C:\\dir\\"), "");
    }

    #[test]
    fn snapshot_keeps_insertion_order() {
        let mut snap = FormSnapshot::new();
        snap.push("name", "Ferris");
        snap.push("email", "crab@example.org");
        let names: Vec<&str> = snap.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["name", "email"]);
        assert_eq!(snap.get("email"), Some("crab@example.org"));
        assert_eq!(snap.get("website"), None);
    }

    #[test]
    fn indicator_id_uses_sequence() {
        assert_eq!(UploadSeq(3).indicator_id(), "progress_3");
    }
}
