//! Action executor: matched intent + slots -> side effect + confirmation.
//!
//! The only side effects allowed here are timer scheduling, notes/todos/facts
//! mutation, and signals on the action bus. Device and hardware intents
//! return simulated confirmations marked as no-ops; nothing here touches real
//! hardware. Storage failures degrade to a deterministic message instead of
//! propagating.

use std::sync::Arc;

use tracing::warn;

use crate::bridge::{ActionBus, WeatherSource};
use crate::catalog::{IntentId, SlotMap};
use crate::macros::MacroStore;
use crate::memory::MemoryStore;
use crate::timers::TimerService;

const MEMORY_DOWN: &str = "Memory banks unavailable. Nothing was saved.";

pub struct ActionExecutor {
    memory: MemoryStore,
    timers: TimerService,
    macros: MacroStore,
    weather: Arc<dyn WeatherSource>,
    bus: Arc<dyn ActionBus>,
    default_location: String,
}

impl ActionExecutor {
    pub fn new(
        memory: MemoryStore,
        timers: TimerService,
        macros: MacroStore,
        weather: Arc<dyn WeatherSource>,
        bus: Arc<dyn ActionBus>,
        default_location: String,
    ) -> Self {
        Self {
            memory,
            timers,
            macros,
            weather,
            bus,
            default_location,
        }
    }

    pub fn timers(&self) -> &TimerService {
        &self.timers
    }

    /// Map an intent to its action and confirmation string. Always answers;
    /// failures are resolved to degraded messages at the point of detection.
    pub async fn execute(&self, id: IntentId, slots: &SlotMap) -> String {
        use IntentId::*;

        let s = |key: &str| slots.str(key).unwrap_or("").to_string();

        match id {
            // Device & app control (simulated where hardware would be needed)
            OpenApp => {
                let app = s("app_name");
                self.bus.open_app(&app);
                format!(
                    "Launching {}. Requesting secure protocol bridge...",
                    app.to_uppercase()
                )
            }
            Navigation => format!("Executing navigation directive: {}.", s("action")),
            ToggleSetting => format!(
                "Setting {} toggle is restricted here. No hardware was touched. [Simulated]",
                s("setting")
            ),
            ChangeVolume | ChangeVolumeRelative => {
                let level = slots.num("level").unwrap_or(0.0);
                let pct = (level * 100.0).round() as i64;
                let change = if slots.str("mode") == Some("ABSOLUTE") {
                    format!("to {pct}%")
                } else {
                    format!("by {}{}%", if pct > 0 { "+" } else { "" }, pct)
                };
                format!("Adjusting acoustic driver volume {change}. [Simulated]")
            }
            Screenshot => {
                "Optical buffer captured. Data saved to secure storage. [Simulated]".to_string()
            }
            LockDevice => {
                "System lockdown engaged. Secure standby mode active. [Simulated]".to_string()
            }
            PowerAction => format!(
                "Initiating system {} sequence is restricted here. [Simulated]",
                s("action").to_lowercase()
            ),

            // Communication & productivity
            CallContact => format!(
                "Initiating secure voice bridge to {}{}.",
                s("contact"),
                if slots.flag("speaker") { " on speaker" } else { "" }
            ),
            SendMessage => format!(
                "Encrypting and transmitting data to {}: \"{}\"",
                s("contact"),
                s("text")
            ),
            ReadMessages => format!("Accessing secure messaging buffer. Scope: {}.", s("scope")),
            CreateEmail => format!(
                "Drafting encrypted email to {}. Subject: {}.",
                s("to"),
                s("subject")
            ),
            SetAlarm => format!("Temporal alert synchronized for {}. [Simulated]", s("time")),
            SetTimer | SetTimerSlash => self.set_timer(slots),
            CreateReminder => format!(
                "Data indexed. Reminder set for {}: {}.",
                s("trigger_time"),
                s("text")
            ),
            CalendarQuery => format!(
                "Scanning schedule for {}. Data link established.",
                s("range")
            ),
            CalendarCreate => format!("Indexing event: {} at {}.", s("title"), s("start_time")),
            ListAdd => format!("Item cached in {} list: {}.", s("list_name"), s("item")),
            SetMode => self.set_mode(&s("mode")),

            // Notes
            NoteCreate => match self.memory.add_note(&s("text")) {
                Ok(()) => format!("Note saved: \"{}\"", s("text")),
                Err(e) => degraded("note save", e),
            },
            NoteList => {
                let notes = self.memory.notes();
                if notes.is_empty() {
                    "You have no saved notes.".to_string()
                } else {
                    notes
                        .iter()
                        .enumerate()
                        .map(|(i, n)| format!("{}. {}", i + 1, n.text))
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            NoteDelete => {
                let index = slots.int("index").unwrap_or(-1);
                let shown = index + 1;
                match usize::try_from(index).ok().map(|i| self.memory.delete_note(i)) {
                    Some(Ok(true)) => format!("Note #{shown} deleted."),
                    Some(Ok(false)) | None => format!("Note #{shown} not found."),
                    Some(Err(e)) => degraded("note delete", e),
                }
            }

            // Todos
            TodoAdd => match self.memory.add_todo(&s("text")) {
                Ok(()) => format!("Todo added: \"{}\"", s("text")),
                Err(e) => degraded("todo save", e),
            },
            TodoList => {
                let todos = self.memory.todos();
                if todos.is_empty() {
                    "You have no active todos.".to_string()
                } else {
                    todos
                        .iter()
                        .enumerate()
                        .map(|(i, t)| {
                            format!(
                                "{}. [{}] {}",
                                i + 1,
                                if t.completed { "x" } else { " " },
                                t.text
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            TodoDone => {
                let index = slots.int("index").unwrap_or(-1);
                let shown = index + 1;
                match usize::try_from(index)
                    .ok()
                    .map(|i| self.memory.complete_todo(i))
                {
                    Some(Ok(Some(item))) => format!("Todo completed: \"{}\"", item.text),
                    Some(Ok(None)) | None => format!("Todo #{shown} not found."),
                    Some(Err(e)) => degraded("todo complete", e),
                }
            }

            // Information & web
            WeatherQuery => self.check_weather(&s("location"), &s("date")).await,
            NavigateTo => format!(
                "Mapping optimal trajectory to {}. Engaging GPS link.",
                s("destination")
            ),
            LocalSearch => format!(
                "Scanning quadrant for {} ({}) in {}.",
                s("query"),
                s("category"),
                s("location")
            ),
            GeneralQuery => {
                let text = s("text");
                self.bus.open_url(&format!(
                    "https://www.bing.com/search?q={}",
                    urlencoding::encode(&text)
                ));
                format!("Searching international datalinks for: {text}.")
            }

            // Media
            PlayMusic | PlayMusicGeneric => {
                format!("Streaming {} via {}.", s("query"), s("provider"))
            }
            MediaControl => format!("Media signal adjusted: {}.", s("action")),
            PlayVideo => format!("Rendering {} on {}.", s("query"), s("provider")),

            // Smart home (simulated grid)
            HomeDeviceToggle => format!(
                "Grid command sent. {} in {} set to {}. [Simulated]",
                s("device"),
                s("location"),
                s("state")
            ),
            HomeLightSet => {
                let brightness = slots
                    .int("brightness")
                    .map(|b| b.to_string())
                    .unwrap_or_else(|| "default".to_string());
                let color = slots.str("color").unwrap_or("auto");
                format!(
                    "Luminous intensity adjusted for {} to {} (Color: {}). [Simulated]",
                    s("device_or_group"),
                    brightness,
                    color
                )
            }
            HomeThermostatSet => format!(
                "Thermal parameters for {} set to {}°C [{}]. [Simulated]",
                s("location"),
                slots.int("temperature_c").unwrap_or(0),
                s("mode")
            ),

            // Dictation & UI
            DictateText => format!("Input buffer updated with: \"{}\"", s("text")),
            Scroll => format!(
                "Virtual viewpoint shifted {} by {}.",
                s("direction"),
                s("amount")
            ),
            UiTap => format!("Simulating interaction with: {}.", s("target_name")),

            // OS & system control
            SystemOpenFolder => {
                let folder = s("folder").to_uppercase();
                self.bus
                    .open_url(&format!("search-ms:query={folder}&subquery={folder}"));
                format!("Requesting system folder access: {folder}.")
            }
            SystemOpenSetting => {
                let setting = s("setting");
                self.bus.open_app(&setting);
                format!(
                    "Adjusting system parameters: Opening {} settings.",
                    setting.to_uppercase()
                )
            }
            SystemCmd => {
                let tool = s("tool");
                self.bus.open_app(&tool);
                format!("Launching system tool: {}.", tool.to_uppercase())
            }
            SystemSearch => {
                let query = s("query");
                self.bus.open_url(&format!(
                    "search-ms:query={q}&subquery={q}",
                    q = urlencoding::encode(&query)
                ));
                format!("Searching system index for: {query}.")
            }

            // Assistant management
            AssistantHelp => [
                "--- VOX COMMAND SYSTEM ---",
                "\u{2022} /timer 10m - Start a countdown",
                "\u{2022} /todo add [task] - Add a todo",
                "\u{2022} /note add [text] - Save a note",
                "\u{2022} /mode dev|chill|work - Switch mode",
                "\u{2022} Check weather in [city] - Weather query",
                "\u{2022} Remind me to [task] - Set reminder",
                "\u{2022} Open [app] - Launch app",
                "\u{2022} When I say [phrase], do [commands] - Record a macro",
            ]
            .join("\n"),
            ProfileInfo => {
                let profile = self.memory.profile();
                format!(
                    "Identity confirmed. You are {} ({}).",
                    profile.name.as_deref().unwrap_or("Commander"),
                    profile.role.as_deref().unwrap_or("Operator")
                )
            }
            EditProfile => {
                self.bus.show_overlay("profile-settings");
                "User profile portal bypass established.".to_string()
            }
            AssistantStopListening => {
                self.bus.stop_voice();
                "Voice systems deactivated.".to_string()
            }
            AssistantCancel => "Active request terminated. Returning to base state.".to_string(),

            // Memory & misc
            RememberFact => match self.memory.store_fact(&s("key"), &s("value")) {
                Ok(()) => format!("I will remember that {} is {}.", s("key"), s("value")),
                Err(e) => degraded("fact save", e),
            },
            RecallFact => {
                let key = s("key");
                match self.memory.recall_fact(&key) {
                    Some(value) => format!("{key} is {value}."),
                    None => format!("I don't have data on {key}."),
                }
            }
            BiometricScan => {
                self.bus.show_overlay("biometric");
                "Initiating multi-spectral biometric sweep...".to_string()
            }
            SetVoiceSpeed => {
                let speed = slots.num("speed").unwrap_or(0.0);
                if !(0.5..=2.0).contains(&speed) {
                    "Invalid frequency range for vocal synthesis.".to_string()
                } else {
                    match self.memory.set_pref("voice_speed", &speed.to_string()) {
                        Ok(()) => format!(
                            "Vocal throughput adjusted to {} percent.",
                            (speed * 100.0).round() as i64
                        ),
                        Err(e) => degraded("preference save", e),
                    }
                }
            }
            MacroCreate => {
                let trigger = s("trigger");
                let body = s("body");
                match self.macros.define(&trigger, &body) {
                    Ok(()) => format!(
                        "Macro recorded. Say \"{}\" to run: {body}.",
                        trigger.to_uppercase()
                    ),
                    Err(e) => degraded("macro save", e),
                }
            }
        }
    }

    fn set_timer(&self, slots: &SlotMap) -> String {
        let label = slots.str("label").unwrap_or("General").to_string();
        match slots.int("duration_seconds") {
            Some(seconds) if seconds > 0 => match self.timers.schedule(seconds, &label) {
                Ok(id) => format!(
                    "Countdown protocol engaged: {seconds} seconds for {label}. [ID: {id}]"
                ),
                Err(e) => degraded("timer save", e),
            },
            // Malformed slot: specific corrective message, no side effect.
            _ => "Invalid timer duration. Use a format like '10s' or '5 minutes'.".to_string(),
        }
    }

    fn set_mode(&self, mode: &str) -> String {
        // Reset both flags before applying the requested mode.
        self.bus.set_focus_mode(false);
        self.bus.set_ambient_mode(false);

        match mode.to_lowercase().as_str() {
            "dev" | "developer" => {
                self.bus.set_focus_mode(true);
                self.bus.set_theme("matrix");
                "Developer Mode engaged. Focus active. Matrix theme applied.".to_string()
            }
            "chill" | "relax" => {
                self.bus.set_ambient_mode(true);
                self.bus.set_theme("cyan");
                self.bus
                    .open_url("https://www.youtube.com/watch?v=jfKfPfyJRdk");
                "Chill Mode engaged. Ambiance optimized. Audio stream active.".to_string()
            }
            "work" | "focus" => {
                self.bus.set_focus_mode(true);
                let tasks = self
                    .memory
                    .todos()
                    .iter()
                    .map(|t| t.text.clone())
                    .collect::<Vec<_>>()
                    .join("\n");
                self.bus.show_popup(&format!(
                    "Current Tasks\n{}",
                    if tasks.is_empty() {
                        "No active tasks."
                    } else {
                        tasks.as_str()
                    }
                ));
                "Work Mode engaged. Priority tasks displayed.".to_string()
            }
            other => format!("Mode {other} not recognized. Systems nominal."),
        }
    }

    async fn check_weather(&self, location: &str, date: &str) -> String {
        let city = if location.is_empty() || location == "current" || location == "local" {
            self.memory
                .pref("location")
                .unwrap_or_else(|| self.default_location.clone())
        } else {
            location.to_string()
        };

        match self.weather.current(&city).await {
            Ok(report) => format!(
                "It is currently {} degrees Celsius in {} ({}). Conditions: {}.",
                report.temp_c.round(),
                report.city,
                date,
                report.description
            ),
            Err(e) => {
                warn!(city, error = %e, "weather collaborator failed");
                format!("Weather data unavailable for {city}.")
            }
        }
    }
}

fn degraded(what: &str, e: crate::errors::VoxError) -> String {
    warn!(what, error = %e, "storage failure resolved to degraded response");
    MEMORY_DOWN.to_string()
}
