//! Turn pipeline: raw input in, delivered responses out.
//!
//! Stages run in a fixed order and the first terminal stage ends the turn:
//! macro expansion, pronoun resolution, whole-text catalog match, conjunction
//! splitting, the relative-volume heuristic, the quick matcher, fallback
//! escalation. Slash-prefixed input is command syntax, not conversation: when
//! it matches nothing the turn ends silently instead of escalating.

use std::sync::Arc;

use regex::Regex;
use tracing::{debug, error, info};

use crate::bridge::{ResponseSink, StructuredIntent};
use crate::catalog::{Catalog, IntentId, SlotMap};
use crate::context::ContextMemory;
use crate::executor::ActionExecutor;
use crate::fallback::FallbackEscalator;
use crate::macros::MacroStore;
use crate::quick::QuickCommands;

/// One catalog hit, fully executed.
struct MatchResult {
    id: IntentId,
    slots: SlotMap,
    response: String,
}

impl MatchResult {
    fn structured(&self) -> StructuredIntent {
        StructuredIntent {
            intent: self.id.as_str().to_string(),
            parameters: self.slots.to_json(),
        }
    }
}

pub struct Interpreter {
    catalog: Catalog,
    context: ContextMemory,
    macros: MacroStore,
    executor: ActionExecutor,
    quick: QuickCommands,
    fallback: FallbackEscalator,
    sink: Arc<dyn ResponseSink>,
    pacing: std::time::Duration,
    chain_re: Regex,
    body_re: Regex,
    volume_re: Regex,
}

impl Interpreter {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        catalog: Catalog,
        macros: MacroStore,
        executor: ActionExecutor,
        quick: QuickCommands,
        fallback: FallbackEscalator,
        sink: Arc<dyn ResponseSink>,
        pacing: std::time::Duration,
    ) -> Self {
        Self {
            catalog,
            context: ContextMemory::new(),
            macros,
            executor,
            quick,
            fallback,
            sink,
            pacing,
            // Fixed pipeline patterns, a failure is a build defect.
            chain_re: Regex::new(r"(?i)\s+(?:and|then)\s+").expect("chain splitter pattern"),
            body_re: Regex::new(r"(?i)\s+then\s+").expect("macro body splitter pattern"),
            volume_re: Regex::new(r"(?i)\b(?:increase|decrease|lower|raise|turn (?:up|down)) it\b")
                .expect("volume heuristic pattern"),
        }
    }

    /// Run one full turn. Every response goes through the sink; the return
    /// value only says whether anything was delivered.
    pub async fn process(&mut self, input: &str) -> bool {
        let text = input.trim();
        if text.is_empty() {
            return false;
        }
        let slash = text.starts_with('/');
        debug!(text, slash, "turn started");

        // Stage 1: macro expansion. The body is a stored `then`-delimited
        // command sequence run through catalog matching only; segments never
        // re-enter macro lookup, so a macro cannot call itself. A slash
        // invocation propagates its prefix onto bare segments.
        if let Some(body) = self.macros.lookup(text) {
            info!(trigger = text, "macro expansion");
            let segments: Vec<String> = self
                .body_re
                .split(&body)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            let mut answered = false;
            for (i, segment) in segments.iter().enumerate() {
                if i > 0 {
                    tokio::time::sleep(self.pacing).await;
                }
                let segment = if slash && !segment.starts_with('/') {
                    format!("/{segment}")
                } else {
                    segment.clone()
                };
                if let Some(result) = self.match_and_execute(&segment).await {
                    self.sink.deliver(&result.response, &[result.structured()]);
                    answered = true;
                }
            }
            if !answered {
                self.sink.deliver("Command sequence executed.", &[]);
            }
            return true;
        }

        // Stage 2: pronoun resolution against the rolling context.
        let resolved = self.context.resolve(text);
        if resolved != text {
            debug!(from = text, to = %resolved, "pronoun resolved");
        }

        // Stage 3: whole-text catalog match is terminal.
        if let Some(result) = self.match_and_execute(&resolved).await {
            self.sink.deliver(&result.response, &[result.structured()]);
            return true;
        }

        // Stage 4: conjunction split. Once split, the turn ends here. A slash
        // invocation propagates its prefix onto bare parts, exactly like the
        // macro path; an unmatched conversational part escalates through the
        // quick matcher and fallback on its own, and an unmatched slash part
        // keeps the slash contract: misses are silent.
        let parts: Vec<&str> = self.chain_re.split(&resolved).collect();
        if parts.len() > 1 {
            let mut answered = false;
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    tokio::time::sleep(self.pacing).await;
                }
                let part = if slash && !part.starts_with('/') {
                    format!("/{part}")
                } else {
                    (*part).to_string()
                };
                match self.match_and_execute(&part).await {
                    Some(result) => {
                        self.sink.deliver(&result.response, &[result.structured()]);
                        answered = true;
                    }
                    None if part.starts_with('/') => {
                        debug!(part = %part, "unmatched slash segment, staying silent")
                    }
                    None => {
                        if !self.quick.try_handle(&part) {
                            let response = self.fallback.escalate(&part).await;
                            self.sink.deliver(&response, &[]);
                        }
                        answered = true;
                    }
                }
            }
            return answered;
        }

        // Stages 5-7 are conversational recovery; slash input skips them and
        // ends silently.
        if slash {
            debug!(text, "unmatched slash command, staying silent");
            return false;
        }

        // Stage 5: bare relative-volume phrasing. Runs on the resolved text:
        // once context substitutes the pronoun there is no "it" left, and the
        // phrase escalates like any other unmatched sentence.
        if self.volume_re.is_match(&resolved) {
            let lower = resolved.to_lowercase();
            let up = ["increase", "raise", "turn up"]
                .iter()
                .any(|v| lower.contains(v));
            let mut slots = SlotMap::new();
            slots.put_str("mode", "RELATIVE");
            slots.put_num("level", if up { 0.1 } else { -0.1 });
            let response = self
                .executor
                .execute(IntentId::ChangeVolumeRelative, &slots)
                .await;
            self.context.update(IntentId::ChangeVolumeRelative, &slots);
            let structured = StructuredIntent {
                intent: IntentId::ChangeVolumeRelative.as_str().to_string(),
                parameters: slots.to_json(),
            };
            self.sink.deliver(&response, &[structured]);
            return true;
        }

        // Stage 6: quick matcher claims the turn with its own response.
        if self.quick.try_handle(&resolved) {
            return true;
        }

        // Stage 7: fallback escalation, always answers.
        let response = self.fallback.escalate(&resolved).await;
        self.sink.deliver(&response, &[]);
        true
    }

    async fn match_and_execute(&mut self, text: &str) -> Option<MatchResult> {
        let def = self.catalog.find(text)?;
        let id = def.id;
        let Some(slots) = def.extract_slots(text) else {
            // A matcher that fired but could not extract is a catalog defect;
            // treat the text as unmatched rather than answer with junk.
            error!(intent = id.as_str(), text, "matched entry failed extraction");
            debug_assert!(false, "extraction failed for {}", id.as_str());
            return None;
        };

        let response = self.executor.execute(id, &slots).await;
        self.context.update(id, &slots);
        info!(intent = id.as_str(), "intent executed");
        Some(MatchResult {
            id,
            slots,
            response,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{ActionBus, NoKnowledge, NoWeather, NullBus};
    use crate::memory::MemoryStore;
    use crate::store::{KvStore, MemStore};
    use crate::timers::TimerService;
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use std::time::Duration;

    struct RecordingSink(Mutex<Vec<(String, Vec<String>)>>);

    impl ResponseSink for RecordingSink {
        fn deliver(&self, text: &str, intents: &[StructuredIntent]) {
            self.0.lock().unwrap().push((
                text.to_string(),
                intents.iter().map(|i| i.intent.clone()).collect(),
            ));
        }
    }

    fn interpreter() -> (Interpreter, Arc<RecordingSink>) {
        let store: Arc<dyn KvStore> = Arc::new(MemStore::new());
        let bus: Arc<dyn ActionBus> = Arc::new(NullBus);
        let sink = Arc::new(RecordingSink(Mutex::new(Vec::new())));
        let sink_dyn: Arc<dyn ResponseSink> = sink.clone();

        let memory = MemoryStore::new(store.clone());
        let timers = TimerService::new(store.clone(), sink_dyn.clone(), bus.clone());
        let macros = MacroStore::new(store.clone());
        let executor = ActionExecutor::new(
            memory,
            timers,
            MacroStore::new(store),
            Arc::new(NoWeather),
            bus.clone(),
            "London".to_string(),
        );
        let quick = QuickCommands::new(BTreeMap::new(), bus.clone(), sink_dyn.clone());
        let fallback = FallbackEscalator::new(Arc::new(NoKnowledge), bus);

        (
            Interpreter::new(
                Catalog::builtin(),
                macros,
                executor,
                quick,
                fallback,
                sink_dyn,
                Duration::from_millis(0),
            ),
            sink,
        )
    }

    fn delivered(sink: &RecordingSink) -> Vec<(String, Vec<String>)> {
        sink.0.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn single_intent_is_terminal() {
        let (mut vox, sink) = interpreter();
        assert!(vox.process("take a screenshot").await);
        let turns = delivered(&sink);
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].1, vec!["SCREENSHOT".to_string()]);
    }

    #[tokio::test]
    async fn conjunction_yields_ordered_responses() {
        let (mut vox, sink) = interpreter();
        assert!(vox.process("open notepad and take a screenshot").await);
        let turns = delivered(&sink);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].1, vec!["OPEN_APP".to_string()]);
        assert!(turns[0].0.contains("NOTEPAD"));
        assert_eq!(turns[1].1, vec!["SCREENSHOT".to_string()]);
    }

    #[tokio::test]
    async fn unmatched_split_part_escalates_on_its_own() {
        let (mut vox, sink) = interpreter();
        assert!(vox.process("take a screenshot and flurble the wozzit").await);
        let turns = delivered(&sink);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].1, vec!["SCREENSHOT".to_string()]);
        assert_eq!(turns[1].0, "Searching Bing for flurble the wozzit.");
    }

    #[tokio::test]
    async fn slash_prefix_propagates_to_split_parts() {
        let (mut vox, sink) = interpreter();
        assert!(vox.process("/timer 2s then timer 3s").await);
        let turns = delivered(&sink);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].1, vec!["SET_TIMER_SLASH".to_string()]);
        assert_eq!(turns[1].1, vec!["SET_TIMER_SLASH".to_string()]);
    }

    #[tokio::test]
    async fn slash_chain_with_no_matches_stays_silent() {
        let (mut vox, sink) = interpreter();
        assert!(!vox.process("/frobnicate and flurble").await);
        assert!(delivered(&sink).is_empty());
    }

    #[tokio::test]
    async fn pronoun_resolves_to_last_app() {
        let (mut vox, sink) = interpreter();
        vox.process("open spotify").await;
        vox.process("close it").await;
        let turns = delivered(&sink);
        assert_eq!(turns.len(), 2);
        // "close it" -> "close spotify" -> OPEN_APP-family navigation miss,
        // lands in fallback as a multi-word search.
        assert_eq!(turns[1].0, "Searching Bing for close spotify.");
    }

    #[tokio::test]
    async fn macro_define_then_expand() {
        let (mut vox, sink) = interpreter();
        vox.process("when i say wind down, do take a screenshot then lock the device")
            .await;
        let turns = delivered(&sink);
        assert_eq!(turns.len(), 1);
        assert!(turns[0].0.starts_with("Macro recorded."));
        assert_eq!(turns[0].1, vec!["MACRO_CREATE".to_string()]);

        vox.process("wind down").await;
        let turns = delivered(&sink);
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[1].1, vec!["SCREENSHOT".to_string()]);
        assert!(turns[2].0.contains("lockdown"));
        assert_eq!(turns[2].1, vec!["LOCK_DEVICE".to_string()]);
    }

    #[tokio::test]
    async fn macro_with_no_matching_segments_acknowledges_generically() {
        let (mut vox, sink) = interpreter();
        vox.process("when i say chaos, do flurble the wozzit").await;
        vox.process("chaos").await;
        let turns = delivered(&sink);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].0, "Command sequence executed.");
        assert!(turns[1].1.is_empty());
    }

    #[tokio::test]
    async fn unmatched_slash_is_silent() {
        let (mut vox, sink) = interpreter();
        assert!(!vox.process("/frobnicate everything").await);
        assert!(delivered(&sink).is_empty());
    }

    #[tokio::test]
    async fn bare_lower_it_hits_volume_heuristic() {
        let (mut vox, sink) = interpreter();
        assert!(vox.process("lower it").await);
        let turns = delivered(&sink);
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].1, vec!["CHANGE_VOLUME_RELATIVE".to_string()]);
        assert!(turns[0].0.contains("by -10%"));
    }

    #[tokio::test]
    async fn resolved_pronoun_bypasses_volume_heuristic() {
        let (mut vox, sink) = interpreter();
        vox.process("open spotify").await;
        assert!(vox.process("lower it").await);
        let turns = delivered(&sink);
        assert_eq!(turns.len(), 2);
        // "it" resolves to spotify before the heuristic runs, so the phrase
        // escalates instead of synthesizing a volume change.
        assert_eq!(turns[1].0, "Searching Bing for lower spotify.");
    }

    #[tokio::test]
    async fn unknown_text_reaches_fallback() {
        let (mut vox, sink) = interpreter();
        assert!(vox.process("what is a quasar").await);
        let turns = delivered(&sink);
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].0, "Searching the internet for what is a quasar.");
    }

    #[tokio::test]
    async fn empty_input_is_ignored() {
        let (mut vox, sink) = interpreter();
        assert!(!vox.process("   ").await);
        assert!(delivered(&sink).is_empty());
    }
}
