use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine as _;
use courier_core::ToolError;

use crate::args::parse_assignments;

const REQUIRED_FIELDS: [&str; 3] = ["to", "subject", "body"];

/// Placeholder the model writes where the sender's name belongs.
pub const SENDER_PLACEHOLDER: &str = "[Your Name]";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmailArgsError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Invalid email address format")]
    InvalidAddress(String),
    #[error("The {0} field must be a single line")]
    MultilineHeader(&'static str),
}

impl From<EmailArgsError> for ToolError {
    fn from(err: EmailArgsError) -> Self {
        ToolError::InvalidInput(err.to_string())
    }
}

/// A validated outgoing message built from `to=.., subject=.., body=..` text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailRequest {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl EmailRequest {
    pub fn parse(input: &str, sender_name: &str) -> Result<Self, EmailArgsError> {
        let mut params = parse_assignments(input);

        let missing: Vec<&'static str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| params.get(*field).map_or(true, |value| value.is_empty()))
            .collect();
        if !missing.is_empty() {
            return Err(EmailArgsError::MissingFields(missing));
        }

        let to = params.remove("to").unwrap_or_default();
        let subject = params.remove("subject").unwrap_or_default();
        let body = params
            .remove("body")
            .unwrap_or_default()
            .replace(SENDER_PLACEHOLDER, sender_name)
            .replace("\\n", "\n");

        // `to` and `subject` become header lines; a CR or LF would start a new header.
        for (field, value) in [("to", &to), ("subject", &subject)] {
            if value.contains(['\r', '\n']) {
                return Err(EmailArgsError::MultilineHeader(field));
            }
        }
        if !to.contains('@') || !to.contains('.') {
            return Err(EmailArgsError::InvalidAddress(to));
        }

        Ok(Self { to, subject, body })
    }

    /// Renders a single-part `text/plain` RFC 822 message.
    pub fn to_mime(&self) -> String {
        format!(
            "MIME-Version: 1.0\r\n\
             Content-Type: text/plain; charset=\"utf-8\"\r\n\
             Content-Transfer-Encoding: base64\r\n\
             to: {}\r\n\
             subject: {}\r\n\
             \r\n\
             {}\r\n",
            self.to,
            encode_header(&self.subject),
            wrap_lines(&STANDARD.encode(self.body.as_bytes()), 76),
        )
    }

    /// The message in the URL-safe base64 form the Gmail `raw` field takes.
    pub fn to_raw(&self) -> String {
        URL_SAFE.encode(self.to_mime().as_bytes())
    }
}

fn encode_header(value: &str) -> String {
    if value.is_ascii() {
        value.to_string()
    } else {
        format!("=?utf-8?b?{}?=", STANDARD.encode(value.as_bytes()))
    }
}

fn wrap_lines(encoded: &str, width: usize) -> String {
    encoded
        .as_bytes()
        .chunks(width)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join("\r\n")
}
