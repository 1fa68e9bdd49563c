//! Collaborator seams between the interpretation core and the outside world.
//!
//! The core never renders, speaks, plays audio or touches the network itself;
//! it talks to narrow traits and the front end decides what they mean. All
//! bus effects are fire-and-forget: the core expects no acknowledgment.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// One recognized intent with its extracted parameters, as delivered to the
/// response sink alongside the reply text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StructuredIntent {
    pub intent: String,
    pub parameters: serde_json::Value,
}

impl StructuredIntent {
    pub fn new(intent: impl Into<String>, parameters: serde_json::Value) -> Self {
        Self {
            intent: intent.into(),
            parameters,
        }
    }
}

/// Receives `(text, structured intents)` pairs for display/speech.
pub trait ResponseSink: Send + Sync {
    fn deliver(&self, text: &str, intents: &[StructuredIntent]);
}

/// Presentation-side effects the core may request. Default implementations
/// are no-ops so front ends only wire the effects they support.
pub trait ActionBus: Send + Sync {
    fn open_url(&self, _url: &str) {}
    fn open_app(&self, _name: &str) {}
    fn play_tone(&self, _name: &str) {}
    fn show_overlay(&self, _name: &str) {}
    fn show_popup(&self, _text: &str) {}
    fn set_focus_mode(&self, _on: bool) {}
    fn set_ambient_mode(&self, _on: bool) {}
    fn set_theme(&self, _theme: &str) {}
    fn stop_voice(&self) {}
}

/// Bus that discards every effect. Useful in tests and `voxctl once`.
pub struct NullBus;

impl ActionBus for NullBus {}

/// External knowledge-answer collaborator.
///
/// `None` means "could not answer" — an absolute inability, not an error.
/// Implementations must swallow transport failures and return `None`.
#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    async fn ask(&self, query: &str) -> Option<String>;
}

/// Knowledge source that can never answer. Default wiring when no endpoint
/// is configured.
pub struct NoKnowledge;

#[async_trait]
impl KnowledgeSource for NoKnowledge {
    async fn ask(&self, _query: &str) -> Option<String> {
        None
    }
}

/// Current conditions for a city, as reported by the weather collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    pub city: String,
    pub temp_c: f64,
    pub description: String,
}

#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self, city: &str) -> Result<WeatherReport>;
}

/// Weather source for wiring without network access; always fails, which the
/// executor converts to its deterministic degraded message.
pub struct NoWeather;

#[async_trait]
impl WeatherSource for NoWeather {
    async fn current(&self, city: &str) -> Result<WeatherReport> {
        Err(crate::errors::VoxError::Collaborator(format!(
            "no weather collaborator configured (asked for {city})"
        )))
    }
}
