//! Terminal output - clean, ASCII-only, no emojis.
//!
//! Also hosts the terminal-side implementations of the core's bridge traits:
//! responses print as conversation lines, bus signals print as tagged action
//! lines instead of touching any real device.

use owo_colors::OwoColorize;
use vox_common::{ActionBus, ResponseSink, StructuredIntent};

pub fn print_welcome() {
    println!();
    println!("{}", "VOX COMMAND SYSTEM".bright_cyan().bold());
    println!("{}", "Type a command, or 'exit' to quit.".dimmed());
    println!();
}

pub fn print_prompt() {
    use std::io::Write;
    print!("{} ", "vox>".bright_cyan());
    let _ = std::io::stdout().flush();
}

pub fn display_error(message: &str) {
    eprintln!("[ERROR] {}", message.red());
}

pub fn display_info(message: &str) {
    println!("[INFO] {message}");
}

/// Prints each response line plus a dimmed structured-intent trailer.
pub struct TerminalSink {
    pub show_intents: bool,
}

impl ResponseSink for TerminalSink {
    fn deliver(&self, text: &str, intents: &[StructuredIntent]) {
        for line in text.lines() {
            println!("  {}", line.bright_white());
        }
        if self.show_intents {
            for intent in intents {
                println!(
                    "  {}",
                    format!("[{} {}]", intent.intent, intent.parameters).dimmed()
                );
            }
        }
    }
}

/// Every bus signal becomes a visible `[ACTION]` line.
pub struct TerminalBus;

impl ActionBus for TerminalBus {
    fn open_url(&self, url: &str) {
        println!("  {} {}", "[ACTION]".yellow(), format!("open-url {url}").dimmed());
    }

    fn open_app(&self, name: &str) {
        println!("  {} {}", "[ACTION]".yellow(), format!("open-app {name}").dimmed());
    }

    fn play_tone(&self, tone: &str) {
        println!("  {} {}", "[ACTION]".yellow(), format!("play-tone {tone}").dimmed());
    }

    fn show_overlay(&self, name: &str) {
        println!("  {} {}", "[ACTION]".yellow(), format!("overlay {name}").dimmed());
    }

    fn show_popup(&self, text: &str) {
        let first = text.lines().next().unwrap_or("");
        println!("  {} {}", "[ACTION]".yellow(), format!("popup {first}").dimmed());
    }

    fn set_focus_mode(&self, on: bool) {
        println!("  {} {}", "[ACTION]".yellow(), format!("focus-mode {on}").dimmed());
    }

    fn set_ambient_mode(&self, on: bool) {
        println!("  {} {}", "[ACTION]".yellow(), format!("ambient-mode {on}").dimmed());
    }

    fn set_theme(&self, theme: &str) {
        println!("  {} {}", "[ACTION]".yellow(), format!("theme {theme}").dimmed());
    }

    fn stop_voice(&self) {
        println!("  {} {}", "[ACTION]".yellow(), "stop-voice".dimmed());
    }
}
