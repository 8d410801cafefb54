use std::fmt;

/// Sum type representing every possible unexceptional fail state.
#[derive(Debug)]
pub enum WorkError {
    RequestFailed(reqwest::Error),
    BadStatus(reqwest::StatusCode, String),
    MalformedResponse(String),
    Api { code: i64, message: String },
    MediaUnreadable(std::io::Error),
}

impl From<reqwest::Error> for WorkError {
    fn from(e: reqwest::Error) -> Self {
        WorkError::RequestFailed(e)
    }
}

impl fmt::Display for WorkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = match self {
            WorkError::RequestFailed(e) => format!("API request failed: {:?}", e),
            WorkError::BadStatus(status, body) => format!("API returned {}: {}", status, body),
            WorkError::MalformedResponse(text) => format!("Invalid response: {}", text),
            WorkError::Api { code, message } => {
                format!("API returned error {}: {}", code, message)
            }
            WorkError::MediaUnreadable(e) => format!("Could not read media file: {}", e),
        };

        write!(f, "{}", x)
    }
}
