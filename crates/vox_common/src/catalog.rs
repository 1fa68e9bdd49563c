//! Intent catalog: ordered pattern/extractor pairs.
//!
//! Declaration order is a total precedence order. Later, broader patterns are
//! deliberately shadowed by earlier, narrower ones (the folder intent must be
//! tried before the generic open-app intent; the generic "play X" form is
//! intentionally last among the media intents). Swapping two entries changes
//! observable behavior, so the order below is load-bearing.
//!
//! The `regex` crate has no negative lookahead, so entries that need to avoid
//! shadowing a more specific sibling carry a `veto` pattern instead: an entry
//! matches only if its pattern matches and its veto does not.

use std::collections::BTreeMap;

use regex::{Captures, Regex};
use serde::Serialize;

/// Recognized categories of user request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentId {
    SystemOpenFolder,
    SystemOpenSetting,
    SystemCmd,
    SystemSearch,
    OpenApp,
    Navigation,
    ToggleSetting,
    ChangeVolume,
    Screenshot,
    LockDevice,
    PowerAction,
    CallContact,
    SendMessage,
    ReadMessages,
    CreateEmail,
    SetAlarm,
    SetTimer,
    CreateReminder,
    CalendarQuery,
    CalendarCreate,
    ListAdd,
    SetTimerSlash,
    SetMode,
    NoteCreate,
    NoteList,
    NoteDelete,
    TodoAdd,
    TodoList,
    TodoDone,
    WeatherQuery,
    NavigateTo,
    LocalSearch,
    RememberFact,
    RecallFact,
    GeneralQuery,
    PlayMusic,
    PlayMusicGeneric,
    MediaControl,
    PlayVideo,
    HomeDeviceToggle,
    HomeLightSet,
    HomeThermostatSet,
    DictateText,
    Scroll,
    UiTap,
    AssistantHelp,
    ProfileInfo,
    EditProfile,
    AssistantStopListening,
    AssistantCancel,
    BiometricScan,
    SetVoiceSpeed,
    ChangeVolumeRelative,
    MacroCreate,
}

impl IntentId {
    /// Stable wire/id form, used in structured output and logs.
    pub fn as_str(&self) -> &'static str {
        use IntentId::*;
        match self {
            SystemOpenFolder => "SYSTEM_OPEN_FOLDER",
            SystemOpenSetting => "SYSTEM_OPEN_SETTING",
            SystemCmd => "SYSTEM_CMD",
            SystemSearch => "SYSTEM_SEARCH",
            OpenApp => "OPEN_APP",
            Navigation => "NAVIGATION",
            ToggleSetting => "TOGGLE_SETTING",
            ChangeVolume => "CHANGE_VOLUME",
            Screenshot => "SCREENSHOT",
            LockDevice => "LOCK_DEVICE",
            PowerAction => "POWER_ACTION",
            CallContact => "CALL_CONTACT",
            SendMessage => "SEND_MESSAGE",
            ReadMessages => "READ_MESSAGES",
            CreateEmail => "CREATE_EMAIL",
            SetAlarm => "SET_ALARM",
            SetTimer => "SET_TIMER",
            CreateReminder => "CREATE_REMINDER",
            CalendarQuery => "CALENDAR_QUERY",
            CalendarCreate => "CALENDAR_CREATE",
            ListAdd => "LIST_ADD",
            SetTimerSlash => "SET_TIMER_SLASH",
            SetMode => "SET_MODE",
            NoteCreate => "NOTE_CREATE",
            NoteList => "NOTE_LIST",
            NoteDelete => "NOTE_DELETE",
            TodoAdd => "TODO_ADD",
            TodoList => "TODO_LIST",
            TodoDone => "TODO_DONE",
            WeatherQuery => "WEATHER_QUERY",
            NavigateTo => "NAVIGATE_TO",
            LocalSearch => "LOCAL_SEARCH",
            RememberFact => "REMEMBER_FACT",
            RecallFact => "RECALL_FACT",
            GeneralQuery => "GENERAL_QUERY",
            PlayMusic => "PLAY_MUSIC",
            PlayMusicGeneric => "PLAY_MUSIC_GENERIC",
            MediaControl => "MEDIA_CONTROL",
            PlayVideo => "PLAY_VIDEO",
            HomeDeviceToggle => "HOME_DEVICE_TOGGLE",
            HomeLightSet => "HOME_LIGHT_SET",
            HomeThermostatSet => "HOME_THERMOSTAT_SET",
            DictateText => "DICTATE_TEXT",
            Scroll => "SCROLL",
            UiTap => "UI_TAP",
            AssistantHelp => "ASSISTANT_HELP",
            ProfileInfo => "PROFILE_INFO",
            EditProfile => "EDIT_PROFILE",
            AssistantStopListening => "ASSISTANT_STOP_LISTENING",
            AssistantCancel => "ASSISTANT_CANCEL",
            BiometricScan => "BIOMETRIC_SCAN",
            SetVoiceSpeed => "SET_VOICE_SPEED",
            ChangeVolumeRelative => "CHANGE_VOLUME_RELATIVE",
            MacroCreate => "MACRO_CREATE",
        }
    }
}

impl std::fmt::Display for IntentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A slot value is a primitive: string, integer, number or flag.
/// No nesting — reminder triggers and similar flatten to sibling slots.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SlotValue {
    Str(String),
    Int(i64),
    Num(f64),
    Flag(bool),
}

/// Ordered slot name -> value mapping extracted from matched text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SlotMap(BTreeMap<&'static str, SlotValue>);

impl SlotMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_str(&mut self, key: &'static str, value: impl Into<String>) {
        self.0.insert(key, SlotValue::Str(value.into()));
    }

    pub fn put_int(&mut self, key: &'static str, value: i64) {
        self.0.insert(key, SlotValue::Int(value));
    }

    pub fn put_num(&mut self, key: &'static str, value: f64) {
        self.0.insert(key, SlotValue::Num(value));
    }

    pub fn put_flag(&mut self, key: &'static str, value: bool) {
        self.0.insert(key, SlotValue::Flag(value));
    }

    pub fn get(&self, key: &str) -> Option<&SlotValue> {
        self.0.get(key)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(SlotValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        match self.0.get(key) {
            Some(SlotValue::Int(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn num(&self, key: &str) -> Option<f64> {
        match self.0.get(key) {
            Some(SlotValue::Num(n)) => Some(*n),
            Some(SlotValue::Int(n)) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn flag(&self, key: &str) -> bool {
        matches!(self.0.get(key), Some(SlotValue::Flag(true)))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Extractor: called only after the matcher succeeded, with the captures of
/// that match plus the full text. `None` means the expected groups were
/// absent — a programming defect, not a runtime condition (see interpreter).
pub type Extractor = fn(&Captures<'_>, &str) -> Option<SlotMap>;

pub struct IntentDef {
    pub id: IntentId,
    pattern: Regex,
    veto: Option<Regex>,
    extract: Option<Extractor>,
}

impl IntentDef {
    /// Side-effect-free match test: the anchored pattern consumes the whole
    /// text and the veto (if any) finds no disqualifying fragment.
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text) && !self.veto.as_ref().map_or(false, |v| v.is_match(text))
    }

    /// Run the extractor against `text`. Caller must have seen `matches`.
    pub fn extract_slots(&self, text: &str) -> Option<SlotMap> {
        let caps = self.pattern.captures(text)?;
        match self.extract {
            Some(f) => f(&caps, text),
            None => Some(SlotMap::new()),
        }
    }
}

/// Immutable, process-wide intent catalog. Initialized once per session.
pub struct Catalog {
    entries: Vec<IntentDef>,
}

impl Catalog {
    /// First entry (in declaration order) whose matcher succeeds.
    pub fn find(&self, text: &str) -> Option<&IntentDef> {
        self.entries.iter().find(|def| def.matches(text))
    }

    pub fn entries(&self) -> &[IntentDef] {
        &self.entries
    }

    pub fn builtin() -> Self {
        let mut entries = Vec::new();
        let mut def =
            |id: IntentId, pattern: &str, veto: Option<&str>, extract: Option<Extractor>| {
                entries.push(IntentDef {
                    id,
                    pattern: compile(pattern),
                    veto: veto.map(compile_veto),
                    extract,
                });
            };

        // Macro definition comes first of all: its body is an arbitrary
        // command sequence, so no other entry may get a chance to consume it.
        def(
            IntentId::MacroCreate,
            r"(?i)when i say (.+?),? (?:do|run) (.+)",
            None,
            Some(x_macro_create),
        );

        // OS & system control. These sit above the generic open-app entry so
        // "open downloads folder" never reads as an app named "downloads folder".
        def(
            IntentId::SystemOpenFolder,
            r"(?i)(?:open|show) (?:my )?(downloads|documents|pictures|videos|desktop|music) folder",
            None,
            Some(x_folder),
        );
        def(
            IntentId::SystemOpenSetting,
            r"(?i)open (wifi|bluetooth|display|sound|battery|update|windows|network|personalization) settings",
            None,
            Some(x_setting),
        );
        def(
            IntentId::SystemCmd,
            r"(?i)open (terminal|command prompt|cmd|powershell)",
            None,
            Some(x_tool),
        );
        def(
            IntentId::SystemSearch,
            r"(?i)search (?:my )?files for (.+)",
            None,
            Some(x_query1),
        );

        // Device & app control. The veto keeps folder/settings/hub phrases out
        // of the app launcher (handled by the entries above or the quick
        // matcher) and refuses conjunction phrases, so "open X and <command>"
        // reaches the splitter instead of launching an app named "X and ...".
        def(
            IntentId::OpenApp,
            r"(?i)(?:open|launch) (.+)",
            Some(r"(?i)(?:open|launch) .*(?:folder|settings|hub|dashboard|menu)|\s(?i:and|then)\s"),
            Some(x_app_name),
        );
        def(
            IntentId::Navigation,
            r"(?i)go (home|back)|show (notifications|recent apps|quick settings)",
            None,
            Some(x_nav),
        );
        // A trailing location clause fails this anchored pattern, so
        // "turn off bluetooth in the kitchen" falls through to the
        // smart-home toggle further down.
        def(
            IntentId::ToggleSetting,
            r"(?i)turn (on|off) (bluetooth|wi-fi|mobile data|flashlight|airplane mode)",
            None,
            Some(x_toggle),
        );
        def(
            IntentId::ChangeVolume,
            r"(?i)(increase|decrease|set) volume(?: to (\d+))?",
            None,
            Some(x_volume),
        );
        def(IntentId::Screenshot, r"(?i)take a screenshot", None, None);
        def(
            IntentId::LockDevice,
            r"(?i)lock (?:the )?(?:screen|device)",
            None,
            None,
        );
        def(
            IntentId::PowerAction,
            r"(?i)(shut down|restart|reboot) (?:the )?device",
            None,
            Some(x_power),
        );

        // Communication & productivity
        def(
            IntentId::CallContact,
            r"(?i)call (.+?)(?: on speaker)?$",
            None,
            Some(x_call),
        );
        def(
            IntentId::SendMessage,
            r"(?i)send a message to (.+) saying (.+)|text (.+) (.+)",
            None,
            Some(x_message),
        );
        def(
            IntentId::ReadMessages,
            r"(?i)read (?:my )?(?:new |recent )?messages",
            None,
            Some(x_read_scope),
        );
        def(
            IntentId::CreateEmail,
            r"(?i)email (.+) with subject (.+) and say (.+)",
            None,
            Some(x_email),
        );
        def(
            IntentId::SetAlarm,
            r"(?i)set (?:an )?alarm for (.+)",
            None,
            Some(x_alarm),
        );
        // Duration token is captured loosely ((\S+), not (\d+)) so that
        // "a timer for banana minutes" still matches and fails slot
        // validation in the executor instead of escalating to web search.
        def(
            IntentId::SetTimer,
            r"(?i)(?:set|start) (?:a )?(?:timer|countdown) for (\S+) (minute|second|hour)s?(?: called (.+))?",
            None,
            Some(x_timer),
        );
        def(
            IntentId::CreateReminder,
            r"(?i)remind me to (.+?)(?: at (.+))?$",
            None,
            Some(x_reminder),
        );
        def(
            IntentId::CalendarQuery,
            r"(?i)what's on my calendar (.+)",
            None,
            Some(x_range),
        );
        def(
            IntentId::CalendarCreate,
            r"(?i)add (.+) to my calendar at (.+)",
            None,
            Some(x_calendar_create),
        );
        def(
            IntentId::ListAdd,
            r"(?i)add (.+) to my (.+) list",
            None,
            Some(x_list_add),
        );

        // Time & modes (slash micro-protocol forms included)
        def(
            IntentId::SetTimerSlash,
            r"(?i)^/timer (\d+)(s|m|h)?",
            None,
            Some(x_timer_slash),
        );
        def(
            IntentId::SetMode,
            r"(?i)(?:switch to|enable) (dev|chill|work) mode|^/mode (dev|chill|work)",
            None,
            Some(x_mode),
        );

        // Notes & todos (slash and natural forms)
        def(
            IntentId::NoteCreate,
            r"(?i)(?:create|add|new) note[:\s]+(.+)|^/note (?:add|new) (.+)",
            None,
            Some(x_text_either),
        );
        def(
            IntentId::NoteList,
            r"(?i)(?:list|show|read) (?:my )?notes|^/note list",
            None,
            None,
        );
        def(
            IntentId::NoteDelete,
            r"(?i)(?:delete|remove) note (\d+)|^/note (?:delete|remove) (\d+)",
            None,
            Some(x_index),
        );
        def(
            IntentId::TodoAdd,
            r"(?i)(?:add|create) todo (.+)|^/todo (?:add|new) (.+)",
            None,
            Some(x_text_either),
        );
        def(
            IntentId::TodoList,
            r"(?i)(?:list|show|read) (?:my )?todos?|^/todo list",
            None,
            None,
        );
        def(
            IntentId::TodoDone,
            r"(?i)(?:finish|complete|check|done) todo (\d+)|^/todo (?:done|complete|finish) (\d+)",
            None,
            Some(x_index),
        );

        // Information & web
        def(
            IntentId::WeatherQuery,
            r"(?i)(?:check|what'?s? the|show|get) weather(?: (?:in|for) (.+?))?(?: (?:today|tomorrow|on (.+)))?$",
            None,
            Some(x_weather),
        );
        def(
            IntentId::NavigateTo,
            r"(?i)take me (?:to )?(.+)|directions to (.+)",
            None,
            Some(x_destination),
        );
        def(
            IntentId::LocalSearch,
            r"(?i)find (.+) near me|where is the nearest (.+)",
            None,
            Some(x_local_search),
        );
        // RememberFact/RecallFact sit above GeneralQuery so fact phrasing is
        // never swallowed by the catch-all question entry.
        def(
            IntentId::RememberFact,
            r"(?i)remember (?:that )?(.+) is (.+)",
            None,
            Some(x_fact),
        );
        def(
            IntentId::RecallFact,
            r"(?i)(?:recall|retrieve) (.+)",
            None,
            Some(x_key1),
        );
        def(
            IntentId::GeneralQuery,
            r"(?i)who is (.+)|when was (.+)|how (do|does|did) (.+)",
            None,
            Some(x_whole_text),
        );

        // Media. Provider-qualified form first; the generic "play X" form is
        // intentionally the last resort among play intents.
        def(
            IntentId::PlayMusic,
            r"(?i)play (.+) on (youtube|spotify|soundcloud)",
            None,
            Some(x_play_provider),
        );
        def(
            IntentId::PlayMusicGeneric,
            r"(?i)play (?:song|music|track|album|playlist|artist)?\s*(.+)",
            None,
            Some(x_play_generic),
        );
        def(
            IntentId::MediaControl,
            r"(?i)(pause|resume|stop|next song|previous song)",
            None,
            Some(x_media_action),
        );
        def(
            IntentId::PlayVideo,
            r"(?i)watch (.+) on (youtube|netflix)",
            None,
            Some(x_play_provider),
        );

        // Smart home
        def(
            IntentId::HomeDeviceToggle,
            r"(?i)turn (on|off) (?:the )?(.+?)(?: in (?:the )?(.+))?$",
            None,
            Some(x_home_toggle),
        );
        def(
            IntentId::HomeLightSet,
            r"(?i)set (.+) lights to (\d+)%|make the (.+) lights (.+)",
            None,
            Some(x_light_set),
        );
        def(
            IntentId::HomeThermostatSet,
            r"(?i)set (?:the )?(.+) thermostat to (\d+)",
            None,
            Some(x_thermostat),
        );

        // Dictation & UI control
        def(IntentId::DictateText, r"(?i)dictate (.+)", None, Some(x_text1));
        def(
            IntentId::Scroll,
            r"(?i)scroll (up|down|to top|to bottom)",
            None,
            Some(x_scroll),
        );
        def(IntentId::UiTap, r"(?i)tap on (.+)", None, Some(x_target));

        // Assistant management
        def(
            IntentId::AssistantHelp,
            r"(?i)what can you do|show all commands|help",
            None,
            None,
        );
        def(
            IntentId::ProfileInfo,
            r"(?i)who am i|show my profile|my details",
            None,
            None,
        );
        def(
            IntentId::EditProfile,
            r"(?i)(?:edit|update|change) (?:my )?profile",
            None,
            None,
        );
        def(
            IntentId::AssistantStopListening,
            r"(?i)stop listening|deactivate|go to sleep",
            None,
            None,
        );
        def(
            IntentId::AssistantCancel,
            r"(?i)cancel|never mind|exit",
            None,
            None,
        );

        // Memory & misc
        def(
            IntentId::BiometricScan,
            r"(?i)start biometric scan|run security sweep",
            None,
            None,
        );
        def(
            IntentId::SetVoiceSpeed,
            r"(?i)set voice speed to (\d+)(?: percent)?",
            None,
            Some(x_voice_speed),
        );
        def(
            IntentId::ChangeVolumeRelative,
            r"(?i)(increase|decrease|lower|raise|turn up|turn down) (?:the |it )?(?:volume )?(a bit|a little|a lot)",
            None,
            Some(x_volume_relative),
        );

        Self { entries }
    }
}

/// Catalog patterns are fixed at compile time; a failure here is a build
/// defect caught by the catalog tests.
///
/// Patterns are anchored to consume the entire input. Matching is
/// whole-string by contract: a phrase with trailing words the pattern does
/// not account for is not a match, which is what lets conjunction splitting
/// run only when no single intent claims the full text.
fn compile(pattern: &str) -> Regex {
    Regex::new(&format!("^(?:{pattern})$")).expect("built-in catalog pattern")
}

/// Vetoes are substring checks, not whole-string ones: they look for a
/// disqualifying fragment anywhere in the text.
fn compile_veto(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in catalog veto")
}

fn cap(caps: &Captures<'_>, i: usize) -> Option<String> {
    caps.get(i).map(|m| m.as_str().to_string())
}

// --- extractors ---

fn x_folder(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("folder", cap(caps, 1)?.to_lowercase());
    Some(s)
}

fn x_setting(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("setting", cap(caps, 1)?.to_lowercase());
    Some(s)
}

fn x_tool(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("tool", cap(caps, 1)?.to_lowercase());
    Some(s)
}

fn x_query1(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("query", cap(caps, 1)?);
    Some(s)
}

fn x_app_name(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("app_name", cap(caps, 1)?);
    Some(s)
}

fn x_nav(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("action", cap(caps, 1).or_else(|| cap(caps, 2))?);
    Some(s)
}

fn x_toggle(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("state", cap(caps, 1)?);
    s.put_str("setting", cap(caps, 2)?);
    Some(s)
}

fn x_volume(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let verb = cap(caps, 1)?;
    let mut s = SlotMap::new();
    match cap(caps, 2) {
        Some(pct) => {
            s.put_str("mode", "ABSOLUTE");
            s.put_num("level", pct.parse::<f64>().ok()? / 100.0);
        }
        None => {
            s.put_str("mode", "RELATIVE");
            s.put_num(
                "level",
                if verb.eq_ignore_ascii_case("increase") {
                    0.1
                } else {
                    -0.1
                },
            );
        }
    }
    Some(s)
}

fn x_power(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("action", cap(caps, 1)?.to_uppercase());
    Some(s)
}

fn x_call(caps: &Captures<'_>, text: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("contact", cap(caps, 1)?);
    s.put_flag("speaker", text.to_lowercase().contains("speaker"));
    Some(s)
}

fn x_message(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("contact", cap(caps, 1).or_else(|| cap(caps, 3))?);
    s.put_str("text", cap(caps, 2).or_else(|| cap(caps, 4))?);
    Some(s)
}

fn x_read_scope(_caps: &Captures<'_>, text: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str(
        "scope",
        if text.to_lowercase().contains("new") {
            "NEW"
        } else {
            "RECENT"
        },
    );
    Some(s)
}

fn x_email(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("to", cap(caps, 1)?);
    s.put_str("subject", cap(caps, 2)?);
    s.put_str("body", cap(caps, 3)?);
    Some(s)
}

fn x_alarm(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("time", cap(caps, 1)?);
    Some(s)
}

fn x_timer(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let raw = cap(caps, 1)?;
    let mult = match cap(caps, 2)?.to_lowercase().as_str() {
        "minute" => 60,
        "hour" => 3600,
        _ => 1,
    };
    let mut s = SlotMap::new();
    // Non-numeric or overflowing durations are carried through as text so the
    // executor answers with the format-error message instead of panicking.
    match raw.parse::<i64>().ok().and_then(|n| n.checked_mul(mult)) {
        Some(seconds) => s.put_int("duration_seconds", seconds),
        None => s.put_str("duration_seconds", raw),
    }
    s.put_str("label", cap(caps, 3).unwrap_or_else(|| "General".to_string()));
    Some(s)
}

fn x_reminder(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("text", cap(caps, 1)?);
    s.put_str("trigger_type", "TIME");
    s.put_str(
        "trigger_time",
        cap(caps, 2).unwrap_or_else(|| "later".to_string()),
    );
    Some(s)
}

fn x_range(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("range", cap(caps, 1)?);
    Some(s)
}

fn x_calendar_create(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("title", cap(caps, 1)?);
    s.put_str("start_time", cap(caps, 2)?);
    Some(s)
}

fn x_list_add(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("item", cap(caps, 1)?);
    s.put_str("list_name", cap(caps, 2)?);
    Some(s)
}

fn x_timer_slash(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let raw = cap(caps, 1)?;
    let mult = match cap(caps, 2).as_deref() {
        Some("m") | Some("M") => 60,
        Some("h") | Some("H") => 3600,
        _ => 1,
    };
    let mut s = SlotMap::new();
    // Same overflow rule as the natural form: malformed stays a string slot.
    match raw.parse::<i64>().ok().and_then(|n| n.checked_mul(mult)) {
        Some(seconds) => s.put_int("duration_seconds", seconds),
        None => s.put_str("duration_seconds", raw),
    }
    s.put_str("label", "General");
    Some(s)
}

fn x_mode(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("mode", cap(caps, 1).or_else(|| cap(caps, 2))?);
    Some(s)
}

fn x_text_either(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("text", cap(caps, 1).or_else(|| cap(caps, 2))?);
    Some(s)
}

fn x_index(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    // User speaks 1-based, storage is 0-based.
    let n = cap(caps, 1)
        .or_else(|| cap(caps, 2))?
        .parse::<i64>()
        .ok()?;
    let mut s = SlotMap::new();
    s.put_int("index", n - 1);
    Some(s)
}

fn x_weather(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str(
        "location",
        cap(caps, 1).unwrap_or_else(|| "current".to_string()),
    );
    s.put_str("date", cap(caps, 2).unwrap_or_else(|| "today".to_string()));
    Some(s)
}

fn x_destination(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("destination", cap(caps, 1).or_else(|| cap(caps, 2))?);
    Some(s)
}

fn x_local_search(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("query", cap(caps, 1).or_else(|| cap(caps, 2))?);
    s.put_str("location", "current");
    s.put_str("category", "POI");
    Some(s)
}

fn x_fact(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("key", cap(caps, 1)?);
    s.put_str("value", cap(caps, 2)?);
    Some(s)
}

fn x_key1(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("key", cap(caps, 1)?);
    Some(s)
}

fn x_whole_text(_caps: &Captures<'_>, text: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("text", text);
    Some(s)
}

fn x_play_provider(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("query", cap(caps, 1)?);
    s.put_str("provider", cap(caps, 2)?.to_uppercase());
    Some(s)
}

fn x_play_generic(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("query", cap(caps, 1)?);
    s.put_str("provider", "DEFAULT");
    Some(s)
}

fn x_media_action(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("action", cap(caps, 1)?.to_uppercase());
    Some(s)
}

fn x_home_toggle(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("state", cap(caps, 1)?.to_uppercase());
    s.put_str("device", cap(caps, 2)?);
    s.put_str(
        "location",
        cap(caps, 3).unwrap_or_else(|| "GENERAL".to_string()),
    );
    Some(s)
}

fn x_light_set(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str(
        "device_or_group",
        cap(caps, 1)
            .or_else(|| cap(caps, 3))
            .unwrap_or_else(|| "ALL".to_string()),
    );
    if let Some(pct) = cap(caps, 2).and_then(|p| p.parse::<i64>().ok()) {
        s.put_int("brightness", pct);
    }
    if let Some(color) = cap(caps, 4) {
        s.put_str("color", color);
    }
    Some(s)
}

fn x_thermostat(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("location", cap(caps, 1)?);
    s.put_int("temperature_c", cap(caps, 2)?.parse::<i64>().ok()?);
    s.put_str("mode", "HEAT");
    Some(s)
}

fn x_text1(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("text", cap(caps, 1)?);
    Some(s)
}

fn x_scroll(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("direction", cap(caps, 1)?.to_uppercase());
    s.put_str("amount", "PAGE");
    Some(s)
}

fn x_target(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("target_name", cap(caps, 1)?);
    Some(s)
}

fn x_voice_speed(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let n = cap(caps, 1)?.parse::<f64>().ok()?;
    let mut s = SlotMap::new();
    s.put_num("speed", n / 100.0);
    Some(s)
}

fn x_volume_relative(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let verb = cap(caps, 1)?.to_lowercase();
    let amount = if cap(caps, 2)?.contains("lot") { 0.3 } else { 0.1 };
    let up = matches!(verb.as_str(), "increase" | "raise" | "turn up");
    let mut s = SlotMap::new();
    s.put_str("mode", "RELATIVE");
    s.put_num("level", if up { amount } else { -amount });
    Some(s)
}

fn x_macro_create(caps: &Captures<'_>, _t: &str) -> Option<SlotMap> {
    let mut s = SlotMap::new();
    s.put_str("trigger", cap(caps, 1)?);
    s.put_str("body", cap(caps, 2)?);
    Some(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find_id(text: &str) -> Option<IntentId> {
        Catalog::builtin().find(text).map(|d| d.id)
    }

    #[test]
    fn catalog_builds() {
        assert!(!Catalog::builtin().entries().is_empty());
    }

    #[test]
    fn folder_beats_generic_open() {
        // Order sensitivity: the folder entry is declared before OpenApp and
        // the OpenApp veto refuses folder phrases outright.
        assert_eq!(find_id("open downloads folder"), Some(IntentId::SystemOpenFolder));
        assert_eq!(find_id("show my pictures folder"), Some(IntentId::SystemOpenFolder));
        assert_eq!(find_id("open notepad"), Some(IntentId::OpenApp));
    }

    #[test]
    fn settings_and_tools_beat_generic_open() {
        assert_eq!(find_id("open bluetooth settings"), Some(IntentId::SystemOpenSetting));
        assert_eq!(find_id("open terminal"), Some(IntentId::SystemCmd));
    }

    #[test]
    fn toggle_location_clause_defers_to_smart_home() {
        assert_eq!(find_id("turn off bluetooth"), Some(IntentId::ToggleSetting));
        assert_eq!(
            find_id("turn off bluetooth in the kitchen"),
            Some(IntentId::HomeDeviceToggle)
        );
    }

    #[test]
    fn home_toggle_extracts_device_and_location() {
        let catalog = Catalog::builtin();
        let def = catalog.find("turn off the lights in the kitchen").unwrap();
        assert_eq!(def.id, IntentId::HomeDeviceToggle);
        let slots = def.extract_slots("turn off the lights in the kitchen").unwrap();
        assert_eq!(slots.str("state"), Some("OFF"));
        assert_eq!(slots.str("device"), Some("lights"));
        assert_eq!(slots.str("location"), Some("kitchen"));
    }

    #[test]
    fn provider_play_beats_generic_play() {
        let catalog = Catalog::builtin();
        let def = catalog.find("play bread and butter on spotify").unwrap();
        assert_eq!(def.id, IntentId::PlayMusic);
        let slots = def.extract_slots("play bread and butter on spotify").unwrap();
        assert_eq!(slots.str("query"), Some("bread and butter"));
        assert_eq!(slots.str("provider"), Some("SPOTIFY"));

        assert_eq!(find_id("play some jazz"), Some(IntentId::PlayMusicGeneric));
    }

    #[test]
    fn timer_parses_units() {
        let catalog = Catalog::builtin();
        let def = catalog.find("set a timer for 5 minutes called tea").unwrap();
        assert_eq!(def.id, IntentId::SetTimer);
        let slots = def.extract_slots("set a timer for 5 minutes called tea").unwrap();
        assert_eq!(slots.int("duration_seconds"), Some(300));
        assert_eq!(slots.str("label"), Some("tea"));
    }

    #[test]
    fn timer_keeps_malformed_duration_for_validation() {
        let catalog = Catalog::builtin();
        let text = "set a timer for banana minutes";
        let def = catalog.find(text).unwrap();
        assert_eq!(def.id, IntentId::SetTimer);
        let slots = def.extract_slots(text).unwrap();
        assert_eq!(slots.int("duration_seconds"), None);
        assert_eq!(slots.str("duration_seconds"), Some("banana"));
    }

    #[test]
    fn timer_overflow_is_left_for_validation() {
        let catalog = Catalog::builtin();

        let text = "/timer 9223372036854775807h";
        let def = catalog.find(text).unwrap();
        assert_eq!(def.id, IntentId::SetTimerSlash);
        let slots = def.extract_slots(text).unwrap();
        assert_eq!(slots.int("duration_seconds"), None);
        assert_eq!(slots.str("duration_seconds"), Some("9223372036854775807"));

        let text = "set a timer for 9223372036854775807 hours";
        let def = catalog.find(text).unwrap();
        assert_eq!(def.id, IntentId::SetTimer);
        let slots = def.extract_slots(text).unwrap();
        assert_eq!(slots.int("duration_seconds"), None);
    }

    #[test]
    fn slash_timer_units() {
        let catalog = Catalog::builtin();
        let def = catalog.find("/timer 10m").unwrap();
        assert_eq!(def.id, IntentId::SetTimerSlash);
        let slots = def.extract_slots("/timer 10m").unwrap();
        assert_eq!(slots.int("duration_seconds"), Some(600));
    }

    #[test]
    fn recall_not_shadowed_by_general_query() {
        assert_eq!(find_id("recall the wifi password"), Some(IntentId::RecallFact));
        assert_eq!(find_id("who is marie curie"), Some(IntentId::GeneralQuery));
    }

    #[test]
    fn call_contact_strips_speaker_suffix() {
        let catalog = Catalog::builtin();
        let def = catalog.find("call Alice on speaker").unwrap();
        assert_eq!(def.id, IntentId::CallContact);
        let slots = def.extract_slots("call Alice on speaker").unwrap();
        assert_eq!(slots.str("contact"), Some("Alice"));
        assert!(slots.flag("speaker"));
    }

    #[test]
    fn volume_absolute_and_relative() {
        let catalog = Catalog::builtin();
        let slots = catalog
            .find("set volume to 40")
            .unwrap()
            .extract_slots("set volume to 40")
            .unwrap();
        assert_eq!(slots.str("mode"), Some("ABSOLUTE"));
        assert_eq!(slots.num("level"), Some(0.4));

        let slots = catalog
            .find("decrease volume")
            .unwrap()
            .extract_slots("decrease volume")
            .unwrap();
        assert_eq!(slots.str("mode"), Some("RELATIVE"));
        assert_eq!(slots.num("level"), Some(-0.1));
    }

    #[test]
    fn relative_volume_phrases() {
        let catalog = Catalog::builtin();
        let text = "turn down the volume a lot";
        let def = catalog.find(text).unwrap();
        assert_eq!(def.id, IntentId::ChangeVolumeRelative);
        let slots = def.extract_slots(text).unwrap();
        assert_eq!(slots.num("level"), Some(-0.3));
    }

    #[test]
    fn note_and_todo_indices_are_zero_based() {
        let catalog = Catalog::builtin();
        let slots = catalog
            .find("/note delete 3")
            .unwrap()
            .extract_slots("/note delete 3")
            .unwrap();
        assert_eq!(slots.int("index"), Some(2));

        let slots = catalog
            .find("complete todo 1")
            .unwrap()
            .extract_slots("complete todo 1")
            .unwrap();
        assert_eq!(slots.int("index"), Some(0));
    }

    #[test]
    fn weather_defaults() {
        let catalog = Catalog::builtin();
        let slots = catalog
            .find("check weather")
            .unwrap()
            .extract_slots("check weather")
            .unwrap();
        assert_eq!(slots.str("location"), Some("current"));
        assert_eq!(slots.str("date"), Some("today"));

        let slots = catalog
            .find("what's the weather in Oslo")
            .unwrap()
            .extract_slots("what's the weather in Oslo")
            .unwrap();
        assert_eq!(slots.str("location"), Some("Oslo"));
    }

    #[test]
    fn macro_create_phrase() {
        let catalog = Catalog::builtin();
        let text = "when i say good morning, do check weather then list my todos";
        let def = catalog.find(text).unwrap();
        assert_eq!(def.id, IntentId::MacroCreate);
        let slots = def.extract_slots(text).unwrap();
        assert_eq!(slots.str("trigger"), Some("good morning"));
        assert_eq!(slots.str("body"), Some("check weather then list my todos"));
    }

    #[test]
    fn every_entry_is_reachable_by_its_own_probe() {
        // Shadowing guard: a representative phrase per entry must resolve to
        // that entry, not an earlier one.
        let probes: &[(&str, IntentId)] = &[
            ("open documents folder", IntentId::SystemOpenFolder),
            ("open display settings", IntentId::SystemOpenSetting),
            ("open powershell", IntentId::SystemCmd),
            ("search files for tax report", IntentId::SystemSearch),
            ("launch spotify", IntentId::OpenApp),
            ("go home", IntentId::Navigation),
            ("turn on flashlight", IntentId::ToggleSetting),
            ("increase volume", IntentId::ChangeVolume),
            ("take a screenshot", IntentId::Screenshot),
            ("lock device", IntentId::LockDevice),
            ("restart the device", IntentId::PowerAction),
            ("call Bob", IntentId::CallContact),
            ("send a message to Bob saying hi", IntentId::SendMessage),
            ("read my new messages", IntentId::ReadMessages),
            ("email Bob with subject hi and say hello", IntentId::CreateEmail),
            ("set an alarm for 7am", IntentId::SetAlarm),
            ("set a timer for 10 seconds", IntentId::SetTimer),
            ("remind me to stretch", IntentId::CreateReminder),
            ("what's on my calendar tomorrow", IntentId::CalendarQuery),
            ("add dentist to my calendar at 3pm", IntentId::CalendarCreate),
            ("add milk to my shopping list", IntentId::ListAdd),
            ("/timer 30s", IntentId::SetTimerSlash),
            ("switch to work mode", IntentId::SetMode),
            ("add note: buy stamps", IntentId::NoteCreate),
            ("list my notes", IntentId::NoteList),
            ("delete note 1", IntentId::NoteDelete),
            ("add todo water plants", IntentId::TodoAdd),
            ("show my todos", IntentId::TodoList),
            ("done todo 1", IntentId::TodoDone),
            ("check weather in Paris", IntentId::WeatherQuery),
            ("directions to the airport", IntentId::NavigateTo),
            ("where is the nearest pharmacy", IntentId::LocalSearch),
            ("remember that my pin is 1234", IntentId::RememberFact),
            ("recall my pin", IntentId::RecallFact),
            ("who is ada lovelace", IntentId::GeneralQuery),
            ("play lofi on youtube", IntentId::PlayMusic),
            ("play something upbeat", IntentId::PlayMusicGeneric),
            ("next song", IntentId::MediaControl),
            ("watch documentaries on netflix", IntentId::PlayVideo),
            ("turn on the fan in the bedroom", IntentId::HomeDeviceToggle),
            ("set bedroom lights to 50%", IntentId::HomeLightSet),
            ("set the hallway thermostat to 21", IntentId::HomeThermostatSet),
            ("dictate meeting notes", IntentId::DictateText),
            ("scroll down", IntentId::Scroll),
            ("tap on submit", IntentId::UiTap),
            ("what can you do", IntentId::AssistantHelp),
            ("show my profile", IntentId::ProfileInfo),
            ("update my profile", IntentId::EditProfile),
            ("go to sleep", IntentId::AssistantStopListening),
            ("never mind", IntentId::AssistantCancel),
            ("run security sweep", IntentId::BiometricScan),
            ("set voice speed to 120", IntentId::SetVoiceSpeed),
            ("lower the volume a bit", IntentId::ChangeVolumeRelative),
            ("when i say wind down, do enable chill mode", IntentId::MacroCreate),
        ];
        let catalog = Catalog::builtin();
        for (text, expected) in probes {
            let got = catalog.find(text).map(|d| d.id);
            assert_eq!(got, Some(*expected), "probe {text:?}");
        }
    }
}
