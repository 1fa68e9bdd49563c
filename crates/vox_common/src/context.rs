//! Short-term conversational context.
//!
//! One record per session, owned by the interpreter. Holds the last turn's
//! salient entities and substitutes them for bare pronouns in the next turn.

use regex::Regex;
use tracing::debug;

use crate::catalog::{IntentId, SlotMap};

/// Session-scoped memory of the last resolved turn.
#[derive(Debug, Default)]
pub struct ContextMemory {
    pub last_intent: Option<IntentId>,
    pub last_entity: Option<String>,
    pub last_app: Option<String>,
    pub last_device: Option<String>,
    pub last_query: Option<String>,
    pub last_location: Option<String>,
    pronouns: Option<Regex>,
    who_is: Option<Regex>,
}

impl ContextMemory {
    pub fn new() -> Self {
        Self {
            // "do it" before "it" so the longer phrase wins the alternation.
            pronouns: Regex::new(r"(?i)\b(do it|it|that|there|them|he|she|him|her)\b").ok(),
            who_is: Regex::new(r"(?i)(?:who|what) is ([^?.]+)").ok(),
            ..Self::default()
        }
    }

    /// Substitute the first bare pronoun with the highest-priority context
    /// value, preserving the rest of the sentence. With no context set, the
    /// text passes through unchanged and matching proceeds on the literal.
    pub fn resolve(&self, text: &str) -> String {
        let Some(pronouns) = &self.pronouns else {
            return text.to_string();
        };
        let Some(m) = pronouns.find(text) else {
            return text.to_string();
        };
        // Fixed priority order: entity, app, device, query, location.
        let value = self
            .last_entity
            .as_deref()
            .or(self.last_app.as_deref())
            .or(self.last_device.as_deref())
            .or(self.last_query.as_deref())
            .or(self.last_location.as_deref());
        match value {
            Some(value) => {
                let resolved = format!("{}{}{}", &text[..m.start()], value, &text[m.end()..]);
                debug!(from = text, to = %resolved, "resolved pronoun from context");
                resolved
            }
            None => text.to_string(),
        }
    }

    /// Fold a freshly executed intent's slots into the context. All matching
    /// rules fire, not just the first; `last_intent` is always set.
    pub fn update(&mut self, id: IntentId, slots: &SlotMap) {
        if let Some(app) = slots.str("app_name") {
            self.last_app = Some(app.to_string());
        }
        if let Some(device) = slots.str("device") {
            self.last_device = Some(device.to_string());
        }
        if let Some(query) = slots.str("query") {
            self.last_query = Some(query.to_string());
        }
        if let Some(location) = slots.str("location") {
            self.last_location = Some(location.to_string());
        }
        if let Some(contact) = slots.str("contact") {
            self.last_entity = Some(contact.to_string());
        }
        if let Some(text) = slots.str("text") {
            if id == IntentId::GeneralQuery {
                self.last_query = Some(text.to_string());
            }
            if let Some(entity) = self
                .who_is
                .as_ref()
                .and_then(|re| re.captures(text))
                .and_then(|caps| caps.get(1))
            {
                self.last_entity = Some(entity.as_str().trim().to_string());
            }
        }
        self.last_intent = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_without_context_is_identity() {
        let context = ContextMemory::new();
        assert_eq!(context.resolve("open it"), "open it");
        assert_eq!(context.resolve("call them now"), "call them now");
    }

    #[test]
    fn resolution_preserves_surrounding_text() {
        let mut context = ContextMemory::new();
        context.last_app = Some("Spotify".to_string());
        assert_eq!(context.resolve("Close it NOW"), "Close Spotify NOW");
    }

    #[test]
    fn entity_outranks_query() {
        let mut context = ContextMemory::new();
        context.last_entity = Some("Alice".to_string());
        context.last_query = Some("jazz".to_string());
        assert_eq!(context.resolve("call them"), "call Alice");
    }

    #[test]
    fn priority_chain_falls_through() {
        let mut context = ContextMemory::new();
        context.last_location = Some("Oslo".to_string());
        assert_eq!(context.resolve("take me there"), "take me Oslo");

        context.last_device = Some("lights".to_string());
        assert_eq!(context.resolve("turn that off"), "turn lights off");
    }

    #[test]
    fn do_it_resolves_as_a_unit() {
        let mut context = ContextMemory::new();
        context.last_query = Some("take a screenshot".to_string());
        assert_eq!(context.resolve("do it again"), "take a screenshot again");
    }

    #[test]
    fn update_fires_every_matching_rule() {
        let mut context = ContextMemory::new();
        let mut slots = SlotMap::new();
        slots.put_str("device", "fan");
        slots.put_str("location", "bedroom");
        context.update(IntentId::HomeDeviceToggle, &slots);
        assert_eq!(context.last_device.as_deref(), Some("fan"));
        assert_eq!(context.last_location.as_deref(), Some("bedroom"));
        assert_eq!(context.last_intent, Some(IntentId::HomeDeviceToggle));
    }

    #[test]
    fn general_query_text_feeds_query_and_entity() {
        let mut context = ContextMemory::new();
        let mut slots = SlotMap::new();
        slots.put_str("text", "who is marie curie?");
        context.update(IntentId::GeneralQuery, &slots);
        assert_eq!(context.last_query.as_deref(), Some("who is marie curie?"));
        assert_eq!(context.last_entity.as_deref(), Some("marie curie"));
    }

    #[test]
    fn text_slot_on_other_intents_does_not_touch_query() {
        let mut context = ContextMemory::new();
        let mut slots = SlotMap::new();
        slots.put_str("text", "buy stamps");
        context.update(IntentId::NoteCreate, &slots);
        assert_eq!(context.last_query, None);
    }
}
