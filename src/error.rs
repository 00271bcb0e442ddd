use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error ({status}): {detail}")]
    Api { status: u16, detail: String },
    #[error("Missing required field(s): {}", .0.join(", "))]
    MissingRequiredFields(Vec<String>),
    #[error("At least some filter must be used")]
    FilterRequired,
    #[error("{0}")]
    NotFound(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error body returned by the REST API. Validation failures come back as a
/// map of field name to messages instead of a `detail` string.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorResponse {
    pub detail: Option<String>,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl ApiErrorResponse {
    pub fn into_message(self) -> Option<String> {
        if let Some(detail) = self.detail {
            return Some(detail);
        }
        if self.fields.is_empty() {
            return None;
        }
        let lines: Vec<String> = self
            .fields
            .into_iter()
            .map(|(field, errors)| match errors {
                serde_json::Value::Array(items) => {
                    let msgs: Vec<String> = items
                        .iter()
                        .map(|m| m.as_str().map(str::to_owned).unwrap_or_else(|| m.to_string()))
                        .collect();
                    format!("{field}: {}", msgs.join("; "))
                }
                serde_json::Value::String(s) => format!("{field}: {s}"),
                other => format!("{field}: {other}"),
            })
            .collect();
        Some(lines.join("\n  - "))
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
