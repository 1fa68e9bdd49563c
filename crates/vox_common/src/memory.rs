//! Persisted productivity memory: notes, todos, facts, preferences, profile.
//!
//! Everything is serde JSON under the KV seam; the store guarantees
//! read-after-write consistency within a session, which is all we need.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::store::KvStore;

const NOTES_KEY: &str = "notes";
const TODOS_KEY: &str = "todos";
const FACTS_KEY: &str = "facts";
const PREFS_KEY: &str = "prefs";
const PROFILE_KEY: &str = "profile";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub text: String,
    pub created: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Todo {
    pub text: String,
    pub completed: bool,
    pub created: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Clone)]
pub struct MemoryStore {
    store: Arc<dyn KvStore>,
}

impl MemoryStore {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    fn read<T: for<'de> Deserialize<'de> + Default>(&self, key: &str) -> T {
        self.store
            .get(key)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.store.set(key, &serde_json::to_string(value)?)
    }

    // Notes

    pub fn add_note(&self, text: &str) -> Result<()> {
        let mut notes: Vec<Note> = self.read(NOTES_KEY);
        notes.push(Note {
            text: text.to_string(),
            created: Utc::now().to_rfc3339(),
        });
        self.write(NOTES_KEY, &notes)
    }

    pub fn notes(&self) -> Vec<Note> {
        self.read(NOTES_KEY)
    }

    /// Delete by 0-based index; false when out of range.
    pub fn delete_note(&self, index: usize) -> Result<bool> {
        let mut notes: Vec<Note> = self.read(NOTES_KEY);
        if index >= notes.len() {
            return Ok(false);
        }
        notes.remove(index);
        self.write(NOTES_KEY, &notes)?;
        Ok(true)
    }

    // Todos

    pub fn add_todo(&self, text: &str) -> Result<()> {
        let mut todos: Vec<Todo> = self.read(TODOS_KEY);
        todos.push(Todo {
            text: text.to_string(),
            completed: false,
            created: Utc::now().to_rfc3339(),
        });
        self.write(TODOS_KEY, &todos)
    }

    pub fn todos(&self) -> Vec<Todo> {
        self.read(TODOS_KEY)
    }

    /// Complete (and remove) by 0-based index, returning the completed item.
    pub fn complete_todo(&self, index: usize) -> Result<Option<Todo>> {
        let mut todos: Vec<Todo> = self.read(TODOS_KEY);
        if index >= todos.len() {
            return Ok(None);
        }
        let item = todos.remove(index);
        self.write(TODOS_KEY, &todos)?;
        Ok(Some(item))
    }

    // Facts ("remember that X is Y")

    pub fn store_fact(&self, key: &str, value: &str) -> Result<()> {
        let mut facts: BTreeMap<String, String> = self.read(FACTS_KEY);
        facts.insert(key.to_lowercase(), value.to_string());
        self.write(FACTS_KEY, &facts)
    }

    pub fn recall_fact(&self, key: &str) -> Option<String> {
        let facts: BTreeMap<String, String> = self.read(FACTS_KEY);
        facts.get(&key.to_lowercase()).cloned()
    }

    // Preferences

    pub fn set_pref(&self, key: &str, value: &str) -> Result<()> {
        let mut prefs: BTreeMap<String, String> = self.read(PREFS_KEY);
        prefs.insert(key.to_string(), value.to_string());
        self.write(PREFS_KEY, &prefs)
    }

    pub fn pref(&self, key: &str) -> Option<String> {
        let prefs: BTreeMap<String, String> = self.read(PREFS_KEY);
        prefs.get(key).cloned()
    }

    // Profile

    pub fn profile(&self) -> Profile {
        self.read(PROFILE_KEY)
    }

    pub fn save_profile(&self, profile: &Profile) -> Result<()> {
        self.write(PROFILE_KEY, profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;

    fn memory() -> MemoryStore {
        MemoryStore::new(Arc::new(MemStore::new()))
    }

    #[test]
    fn notes_add_list_delete() {
        let memory = memory();
        assert!(memory.notes().is_empty());
        memory.add_note("buy stamps").unwrap();
        memory.add_note("water plants").unwrap();
        assert_eq!(memory.notes().len(), 2);

        assert!(memory.delete_note(0).unwrap());
        let notes = memory.notes();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].text, "water plants");

        assert!(!memory.delete_note(5).unwrap());
    }

    #[test]
    fn todos_complete_removes_and_returns() {
        let memory = memory();
        memory.add_todo("file taxes").unwrap();
        let done = memory.complete_todo(0).unwrap().unwrap();
        assert_eq!(done.text, "file taxes");
        assert!(memory.todos().is_empty());
        assert!(memory.complete_todo(0).unwrap().is_none());
    }

    #[test]
    fn facts_are_case_insensitive_on_key() {
        let memory = memory();
        memory.store_fact("My PIN", "1234").unwrap();
        assert_eq!(memory.recall_fact("my pin").as_deref(), Some("1234"));
        assert_eq!(memory.recall_fact("my password"), None);
    }
}
