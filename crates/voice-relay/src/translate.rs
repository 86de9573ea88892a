//! Google Translate adapter over the public `translate_a/single` endpoint.

use crate::config::TranslationConfig;

use voice_relay_core::{
    CoreError, CoreResult,
    pipeline::{FallbackTranslator, PivotTranslator, Translator},
};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use serde_json::Value;
use tracing::{debug, instrument};

const ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Blocking Google Translate client.
pub struct GoogleTranslator {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl GoogleTranslator {
    /// Create a client against the public endpoint.
    #[track_caller]
    pub fn new() -> CoreResult<Self> {
        Self::with_endpoint(ENDPOINT)
    }

    /// Create a client against a custom endpoint.
    #[track_caller]
    pub fn with_endpoint(endpoint: impl Into<String>) -> CoreResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| translation_error(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl Translator for GoogleTranslator {
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    fn translate(&self, text: &str, source: &str, target: &str) -> CoreResult<String> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| translation_error(format!("Request failed: {}", e)))?;

        let body: Value = response
            .json()
            .map_err(|e| translation_error(format!("Invalid response body: {}", e)))?;

        let translated = parse_response(&body)?;
        debug!(translated_len = translated.len(), "Translation received");

        Ok(translated)
    }
}

/// Build the translator chain described by `config`.
///
/// Google Translate, routed through the pivot language when one is set and
/// falling back to the source text when `speak_source_on_failure` is on.
pub fn from_config(config: &TranslationConfig) -> CoreResult<Box<dyn Translator>> {
    let mut translator: Box<dyn Translator> = Box::new(GoogleTranslator::new()?);

    if let Some(pivot) = config.pivot() {
        translator = Box::new(PivotTranslator::new(translator, pivot));
    }

    if config.speak_source_on_failure {
        translator = Box::new(FallbackTranslator::new(translator));
    }

    Ok(translator)
}

/// Join the translated fragments of a `translate_a/single` response.
///
/// The body looks like `[[["Hola","Hello",null,null,1], ...], null, "en"]`:
/// the first element lists one entry per sentence with the translation first.
#[track_caller]
pub fn parse_response(body: &Value) -> CoreResult<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| translation_error(format!("Unexpected response shape: {}", body)))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.trim().is_empty() {
        return Err(translation_error("Empty translation".to_string()));
    }

    Ok(translated.trim().to_string())
}

#[track_caller]
fn translation_error(reason: String) -> CoreError {
    CoreError::TranslationFailed {
        reason,
        location: ErrorLocation::from(Location::caller()),
    }
}
