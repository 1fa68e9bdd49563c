//! Vox Common - deterministic command interpretation core for Vox v0.4.0
//!
//! Ordered regex intent catalog, contextual pronoun resolution, macro
//! expansion, and layered fallback. No speech, no UI: text in, responses and
//! structured intents out through the bridge traits.

pub mod bridge;
pub mod catalog;
pub mod config;
pub mod context;
pub mod errors;
pub mod executor;
pub mod fallback;
pub mod interpreter;
pub mod macros;
pub mod memory;
pub mod quick;
pub mod store;
pub mod timers;

pub use bridge::*;
pub use catalog::{Catalog, IntentDef, IntentId, SlotMap, SlotValue};
pub use config::VoxConfig;
pub use context::ContextMemory;
pub use errors::{Result, VoxError};
pub use executor::ActionExecutor;
pub use fallback::FallbackEscalator;
pub use interpreter::Interpreter;
pub use macros::MacroStore;
pub use memory::MemoryStore;
pub use quick::QuickCommands;
pub use store::{JsonFileStore, KvStore, MemStore};
pub use timers::{TimerRecord, TimerService};
