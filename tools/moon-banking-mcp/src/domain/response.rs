use serde_json::Value;

use crate::domain::error::DispatchError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub status_text: String,
    pub content_type: Option<String>,
    pub body: String,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|value| value.to_ascii_lowercase().contains("application/json"))
            .unwrap_or(false)
    }

    /// Turn the response into the text handed back to the host. Non-2xx
    /// statuses become upstream errors; JSON bodies are pretty-printed and
    /// anything else passes through untouched.
    pub fn into_text(self) -> Result<String, DispatchError> {
        if !self.is_success() {
            return Err(DispatchError::Upstream {
                status: self.status,
                status_text: self.status_text,
                body: self.body,
            });
        }
        if !self.is_json() {
            return Ok(self.body);
        }
        let parsed: Value = serde_json::from_str(&self.body).map_err(|err| {
            DispatchError::Transport(format!("response body is not valid JSON: {err}"))
        })?;
        serde_json::to_string_pretty(&parsed)
            .map_err(|err| DispatchError::Transport(format!("re-encode response JSON: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, content_type: Option<&str>, body: &str) -> UpstreamResponse {
        UpstreamResponse {
            status,
            status_text: String::new(),
            content_type: content_type.map(str::to_string),
            body: body.to_string(),
        }
    }

    #[test]
    fn json_is_pretty_printed() {
        let text = response(200, Some("application/json"), r#"{"id":"1"}"#)
            .into_text()
            .unwrap();
        assert_eq!(text, "{\n  \"id\": \"1\"\n}");
    }

    #[test]
    fn json_keys_keep_received_order() {
        let text = response(
            200,
            Some("application/json; charset=utf-8"),
            r#"{"zeta":1,"alpha":{"y":true,"b":null},"mid":[1,2]}"#,
        )
        .into_text()
        .unwrap();
        let zeta = text.find("zeta").unwrap();
        let alpha = text.find("alpha").unwrap();
        let y = text.find("\"y\"").unwrap();
        let b = text.find("\"b\"").unwrap();
        let mid = text.find("mid").unwrap();
        assert!(zeta < alpha && alpha < y && y < b && b < mid, "{text}");
    }

    #[test]
    fn text_passes_through_verbatim() {
        let body = "plain  text\nwith {braces}";
        let text = response(200, Some("text/plain"), body).into_text().unwrap();
        assert_eq!(text, body);
        let text = response(204, None, "").into_text().unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn non_success_status_is_upstream_error() {
        let mut not_found = response(404, Some("text/plain"), "Not found");
        not_found.status_text = "Not Found".into();
        let err = not_found.into_text().unwrap_err();
        match &err {
            DispatchError::Upstream { status, body, .. } => {
                assert_eq!(*status, 404);
                assert_eq!(body, "Not found");
            }
            other => panic!("unexpected error {other:?}"),
        }
        let message = err.to_string();
        assert!(message.contains("404") && message.contains("Not found"));
    }

    #[test]
    fn malformed_json_is_transport_error() {
        let err = response(200, Some("application/json"), "{not json")
            .into_text()
            .unwrap_err();
        assert_eq!(err.kind(), "transport");
    }
}
