//! Secondary quick matcher.
//!
//! A small set of literal-substring rules tried after the main catalog:
//! greetings, the command hub, configured personal bookmarks, and the time
//! and date questions. When it claims a turn it emits its own response and
//! the interpreter appends nothing further.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Local;
use regex::Regex;

use crate::bridge::{ActionBus, ResponseSink};

pub struct QuickCommands {
    bookmarks: BTreeMap<String, String>,
    bus: Arc<dyn ActionBus>,
    sink: Arc<dyn ResponseSink>,
    time_re: Option<Regex>,
    date_re: Option<Regex>,
}

impl QuickCommands {
    pub fn new(
        bookmarks: BTreeMap<String, String>,
        bus: Arc<dyn ActionBus>,
        sink: Arc<dyn ResponseSink>,
    ) -> Self {
        Self {
            bookmarks,
            bus,
            sink,
            time_re: Regex::new(r"\b(what'?s? the )?time\b").ok(),
            date_re: Regex::new(r"\b(what'?s? the |today'?s? )?date\b").ok(),
        }
    }

    fn speak(&self, text: &str) {
        self.sink.deliver(text, &[]);
    }

    /// Try to claim the turn. Returns true when handled (response already
    /// emitted), false to let the caller continue escalating.
    pub fn try_handle(&self, text: &str) -> bool {
        let msg = text.to_lowercase();
        let msg = msg.trim();

        if msg.contains("open hub") || msg.contains("open dashboard") || msg.contains("show menu") {
            self.bus.show_overlay("hub");
            self.speak("Command Hub interface engaged.");
            return true;
        }

        if msg.contains("hey") || msg.contains("hello") {
            self.speak("Hello. How may I help you?");
            return true;
        }

        for (phrase, url) in &self.bookmarks {
            if msg.contains(phrase.as_str()) {
                self.bus.open_url(url);
                // The trigger phrase usually starts with a launch verb;
                // strip it so the confirmation reads naturally.
                let display = phrase
                    .strip_prefix("open ")
                    .or_else(|| phrase.strip_prefix("launch "))
                    .unwrap_or(phrase);
                self.speak(&format!("Opening {display}..."));
                return true;
            }
        }

        if let Some(re) = &self.time_re {
            if re.is_match(msg) && !msg.contains("timer") {
                let time = Local::now().format("%H:%M");
                self.speak(&format!("The current time is {time}."));
                return true;
            }
        }

        if let Some(re) = &self.date_re {
            if re.is_match(msg) && !msg.contains("update") {
                let date = Local::now().format("%b %d");
                self.speak(&format!("Today's date is {date}."));
                return true;
            }
        }

        false
    }
}
