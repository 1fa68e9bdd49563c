//! User-defined shortcut macros.
//!
//! A macro maps a trigger phrase (case/whitespace-normalized) to a body of
//! one or more commands, `then`-delimited. The interpreter only reads;
//! definition and removal happen off the hot path (the MacroCreate intent and
//! the `voxctl macro` subcommands).

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::errors::Result;
use crate::store::KvStore;

const KEY: &str = "macros";

#[derive(Clone)]
pub struct MacroStore {
    store: Arc<dyn KvStore>,
}

impl MacroStore {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    fn load(&self) -> BTreeMap<String, String> {
        self.store
            .get(KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    fn save(&self, macros: &BTreeMap<String, String>) -> Result<()> {
        let json = serde_json::to_string(macros)?;
        self.store.set(KEY, &json)
    }

    fn normalize(trigger: &str) -> String {
        trigger.trim().to_lowercase()
    }

    /// Body for a trigger phrase, if one is defined.
    pub fn lookup(&self, trigger: &str) -> Option<String> {
        self.load().get(&Self::normalize(trigger)).cloned()
    }

    pub fn define(&self, trigger: &str, body: &str) -> Result<()> {
        let mut macros = self.load();
        macros.insert(Self::normalize(trigger), body.trim().to_string());
        self.save(&macros)
    }

    pub fn remove(&self, trigger: &str) -> Result<bool> {
        let mut macros = self.load();
        let removed = macros.remove(&Self::normalize(trigger)).is_some();
        if removed {
            self.save(&macros)?;
        }
        Ok(removed)
    }

    pub fn all(&self) -> BTreeMap<String, String> {
        self.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;

    fn store() -> MacroStore {
        MacroStore::new(Arc::new(MemStore::new()))
    }

    #[test]
    fn lookup_is_case_and_whitespace_normalized() {
        let macros = store();
        macros
            .define("Morning Routine", "check weather then list my todos")
            .unwrap();
        assert_eq!(
            macros.lookup("  morning routine ").as_deref(),
            Some("check weather then list my todos")
        );
        assert_eq!(macros.lookup("evening routine"), None);
    }

    #[test]
    fn define_overwrites_and_remove_deletes() {
        let macros = store();
        macros.define("x", "first").unwrap();
        macros.define("x", "second").unwrap();
        assert_eq!(macros.lookup("x").as_deref(), Some("second"));
        assert!(macros.remove("x").unwrap());
        assert!(!macros.remove("x").unwrap());
        assert_eq!(macros.lookup("x"), None);
    }
}
