//! One-shot countdown timers with persistence and rehydration.
//!
//! Each timer is a persisted `{id, label, end_ts}` record plus a spawned
//! deferred callback. Known accepted limitation (kept deliberately, see
//! DESIGN.md): removing the persisted record does not cancel a callback that
//! was already spawned — a removed-but-scheduled timer still fires once. The
//! callback fires independently of persistence state.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::bridge::{ActionBus, ResponseSink};
use crate::errors::Result;
use crate::store::KvStore;

const KEY: &str = "timers";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerRecord {
    pub id: String,
    pub label: String,
    /// Absolute expiry, seconds since the Unix epoch. Rehydration recomputes
    /// remaining time from this.
    pub end_ts: i64,
}

#[derive(Clone)]
pub struct TimerService {
    store: Arc<dyn KvStore>,
    sink: Arc<dyn ResponseSink>,
    bus: Arc<dyn ActionBus>,
}

impl TimerService {
    pub fn new(
        store: Arc<dyn KvStore>,
        sink: Arc<dyn ResponseSink>,
        bus: Arc<dyn ActionBus>,
    ) -> Self {
        Self { store, sink, bus }
    }

    fn load(&self) -> Vec<TimerRecord> {
        self.store
            .get(KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    fn save(&self, timers: &[TimerRecord]) -> Result<()> {
        self.store.set(KEY, &serde_json::to_string(timers)?)
    }

    pub fn pending(&self) -> Vec<TimerRecord> {
        self.load()
    }

    /// Persist and schedule a timer for `seconds` from now. Duration
    /// validation happens in the executor; this expects a positive value.
    pub fn schedule(&self, seconds: i64, label: &str) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let record = TimerRecord {
            id: id.clone(),
            label: label.to_string(),
            end_ts: Utc::now().timestamp() + seconds,
        };

        let mut timers = self.load();
        timers.push(record);
        self.save(&timers)?;

        self.spawn_expiry(id.clone(), label.to_string(), seconds as u64);
        info!(id = %id, seconds, label, "timer scheduled");
        Ok(id)
    }

    /// Re-schedule persisted timers on startup; expired entries are
    /// discarded immediately.
    pub fn rehydrate(&self) -> Result<usize> {
        let now = Utc::now().timestamp();
        let timers = self.load();
        let mut kept = Vec::new();
        let mut revived = 0;

        for timer in timers {
            let remaining = timer.end_ts - now;
            if remaining > 0 {
                self.spawn_expiry(timer.id.clone(), timer.label.clone(), remaining as u64);
                kept.push(timer);
                revived += 1;
            } else {
                debug!(id = %timer.id, "discarding expired timer");
            }
        }

        self.save(&kept)?;
        Ok(revived)
    }

    pub fn remove(&self, id: &str) -> Result<()> {
        let timers: Vec<TimerRecord> = self.load().into_iter().filter(|t| t.id != id).collect();
        self.save(&timers)
    }

    fn spawn_expiry(&self, id: String, label: String, seconds: u64) {
        let service = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(seconds)).await;
            service
                .sink
                .deliver(&format!("Timer for {label} expired."), &[]);
            service.bus.play_tone("alarm");
            service
                .bus
                .show_popup(&format!("TIMER EXPIRED: {}", label.to_uppercase()));
            if let Err(e) = service.remove(&id) {
                debug!(id = %id, error = %e, "could not remove fired timer");
            }
        });
    }
}
