// Response classification.
//
// Every reply from the appliance funnels through `classify`, which turns the
// (status, content type, body) triple into either a JSON payload or an error
// with a human-readable message. Precedence is strict: JSON, then HTML, then
// empty body, then everything else. The HTML branch exists because proxies
// between us and the appliance return HTML error pages even though the API
// itself speaks JSON.

use scraper::Html;
use serde_json::Value;

use crate::error::Error;

/// Classify a raw HTTP response into a payload or an error.
///
/// `content_type` is the raw `Content-Type` header value, if any.
pub(crate) fn classify(status: u16, content_type: Option<&str>, body: &str) -> Result<Value, Error> {
    let content_type = content_type.unwrap_or("");

    if content_type.contains("json") {
        return process_json(status, body);
    }

    if content_type.contains("html") {
        return Err(process_html(status, body));
    }

    if body.is_empty() {
        return process_empty(status);
    }

    Err(Error::Protocol {
        message: format!(
            "Can't process response from server. Status Code: {status} Data from server: {}",
            escape_braces(body)
        ),
    })
}

/// Double literal braces so server text can be embedded in a template string.
fn escape_braces(text: &str) -> String {
    text.replace('{', "{{").replace('}', "}}")
}

fn process_json(status: u16, body: &str) -> Result<Value, Error> {
    let parsed: Value = serde_json::from_str(body).map_err(|e| Error::Protocol {
        message: format!("Unable to parse JSON response. Error: {e}"),
    })?;

    if (200..399).contains(&status) {
        return Ok(parsed);
    }

    let mut message = format!(
        "Error from server. Status Code: {status} Data from server: {}",
        escape_braces(body)
    );

    // The appliance reports failures as {"errors": [{"message": ...}, ...]};
    // the last entry wins.
    if let Some(errors) = parsed.as_object().and_then(|o| o.get("errors")).and_then(Value::as_array) {
        for item in errors {
            let item_message = item.get("message").and_then(Value::as_str).unwrap_or_default();
            message = format!(
                "Error from server. Status Code: {status} Data from server: {item_message}"
            );
        }
    }

    Err(Error::Server { status, message })
}

/// An HTML response is an error regardless of status code.
fn process_html(status: u16, body: &str) -> Error {
    let stripped = strip_html(body);
    let error_text = if stripped.is_empty() {
        "Cannot parse error details".to_owned()
    } else {
        stripped
    };

    let message = format!("Status Code: {status}. Data from server:\n{error_text}\n");

    Error::Server {
        status,
        message: escape_braces(&message),
    }
}

/// Reduce an HTML document to its visible text: trimmed non-blank lines
/// joined by newlines.
fn strip_html(body: &str) -> String {
    let document = Html::parse_document(body);
    let text: String = document.root_element().text().collect();

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn process_empty(status: u16) -> Result<Value, Error> {
    if status == 200 {
        return Ok(Value::Object(serde_json::Map::new()));
    }

    Err(Error::Protocol {
        message: "Empty response and no information in the header".to_owned(),
    })
}
