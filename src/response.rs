use serde::Deserialize;

/// Error envelope the backend sends with JSON failures.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn text(self) -> Option<String> {
        self.message
            .or(self.error)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }
}

pub fn is_json(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| {
            ct.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .eq_ignore_ascii_case("application/json")
        })
        .unwrap_or(false)
}

/// Message to surface for a non-2xx response.
///
/// Only JSON bodies are inspected; an HTML error page (proxy, crash screen)
/// is never parsed or shown.
pub fn error_message(status: u16, content_type: Option<&str>, body: &str) -> String {
    if is_json(content_type) {
        if let Some(text) = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(ErrorBody::text)
        {
            return text;
        }
    }
    format!("Unexpected response from server (status {status})")
}
