use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ProtocolError;
use crate::models::{FormSnapshot, COMMENT_QUERY_FIELDS};

pub const COMMENT_SUBMIT_PATH: &str = "comment_submit";
pub const UPLOAD_IMAGES_PATH: &str = "upload_images";

pub const STATUS_REJECTED: &str = "rejected";
pub const STATUS_SHOW_CAPTCHA: &str = "showcaptcha";

// Same set ECMAScript's encodeURIComponent leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Serializes one field as `name=<percent-encoded value>`.
pub fn encode_field(name: &str, value: &str) -> String {
    format!("{}={}", name, utf8_percent_encode(value, URI_COMPONENT))
}

/// Builds the `comment_submit` query from a snapshot, always in wire order.
/// Fields absent from the snapshot are sent empty.
pub fn comment_query(snapshot: &FormSnapshot) -> String {
    COMMENT_QUERY_FIELDS
        .iter()
        .map(|name| encode_field(name, snapshot.get(name).unwrap_or("")))
        .collect::<Vec<_>>()
        .join("&")
}

#[derive(Deserialize)]
struct RawSubmissionResponse {
    #[serde(default)]
    status: Option<Value>,
    #[serde(rename = "captcha-task")]
    captcha_task: Option<String>,
    #[serde(rename = "captcha-id")]
    captcha_id: Option<String>,
    redir: Option<String>,
}

/// Server verdict on a comment submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentSubmissionResponse {
    Rejected,
    ChallengeRequired { task: String, token: String },
    Accepted { redirect_url: String },
}

impl CommentSubmissionResponse {
    pub fn from_json(body: &str) -> Result<Self, ProtocolError> {
        let raw: RawSubmissionResponse = serde_json::from_str(body)?;
        raw.try_into()
    }
}

impl TryFrom<RawSubmissionResponse> for CommentSubmissionResponse {
    type Error = ProtocolError;

    fn try_from(raw: RawSubmissionResponse) -> Result<Self, Self::Error> {
        let status = raw.status.as_ref().and_then(Value::as_str);
        match status {
            Some(STATUS_REJECTED) => Ok(Self::Rejected),
            Some(STATUS_SHOW_CAPTCHA) => {
                let task = raw.captcha_task.ok_or(ProtocolError::MissingField {
                    status: STATUS_SHOW_CAPTCHA,
                    field: "captcha-task",
                })?;
                let token = raw.captcha_id.ok_or(ProtocolError::MissingField {
                    status: STATUS_SHOW_CAPTCHA,
                    field: "captcha-id",
                })?;
                Ok(Self::ChallengeRequired { task, token })
            }
            // 其余一律视为接受
            _ => {
                let redirect_url = raw.redir.ok_or(ProtocolError::MissingField {
                    status: "accepted",
                    field: "redir",
                })?;
                Ok(Self::Accepted { redirect_url })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_plain_value_verbatim() {
        assert_eq!(encode_field("website", "http"), "website=http");
    }

    #[test]
    fn encodes_like_encode_uri_component() {
        assert_eq!(
            encode_field("text", "a b&c=d/e?f#g"),
            "text=a%20b%26c%3Dd%2Fe%3Ff%23g"
        );
        assert_eq!(encode_field("text", "-_.!~*'()"), "text=-_.!~*'()");
        assert_eq!(encode_field("name", "Žemaitis"), "name=%C5%BDemaitis");
        assert_eq!(encode_field("website", "http://x.lt"), "website=http%3A%2F%2Fx.lt");
        assert_eq!(encode_field("captcha", ""), "captcha=");
    }

    #[test]
    fn comment_query_follows_wire_order() {
        let mut snap = FormSnapshot::new();
        snap.push("text", "hello world");
        snap.push("email", "a@b.c");
        snap.push("name", "Ferris");
        snap.push("website", "");
        snap.push("captcha", "");
        snap.push("captcha-id", "666");

        assert_eq!(
            comment_query(&snap),
            "name=Ferris&captcha-id=666&captcha=&email=a%40b.c&website=&text=hello%20world"
        );
    }

    #[test]
    fn decodes_rejected() {
        let body = r#"{"status":"rejected","captcha-id":"667","captcha-task":"9 + 3 =","name":"n"}"#;
        assert_eq!(
            CommentSubmissionResponse::from_json(body).unwrap(),
            CommentSubmissionResponse::Rejected
        );
    }

    #[test]
    fn decodes_challenge() {
        let body = r#"{"status":"showcaptcha","captcha-task":"9 + 2 =","captcha-id":"abc123","email":"e","website":"","body":"hi"}"#;
        assert_eq!(
            CommentSubmissionResponse::from_json(body).unwrap(),
            CommentSubmissionResponse::ChallengeRequired {
                task: "9 + 2 =".into(),
                token: "abc123".into(),
            }
        );
    }

    #[test]
    fn any_other_status_is_acceptance() {
        for body in [
            r#"{"status":"accepted","redir":"/hello#comment-3"}"#,
            r#"{"status":"whatever","redir":"/hello#comment-3"}"#,
            r#"{"status":7,"redir":"/hello#comment-3"}"#,
            r#"{"redir":"/hello#comment-3"}"#,
        ] {
            assert_eq!(
                CommentSubmissionResponse::from_json(body).unwrap(),
                CommentSubmissionResponse::Accepted {
                    redirect_url: "/hello#comment-3".into()
                }
            );
        }
    }

    #[test]
    fn challenge_without_token_is_an_error() {
        let err = CommentSubmissionResponse::from_json(r#"{"status":"showcaptcha","captcha-task":"t"}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::MissingField { field: "captcha-id", .. }
        ));
    }

    #[test]
    fn acceptance_without_redirect_is_an_error() {
        let err = CommentSubmissionResponse::from_json(r#"{"status":"accepted"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MissingField { field: "redir", .. }));
    }

    #[test]
    fn non_json_body_is_an_error() {
        let err = CommentSubmissionResponse::from_json("<html>500</html>").unwrap_err();
        assert!(matches!(err, ProtocolError::Json(_)));
    }
}
