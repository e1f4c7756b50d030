//! Output rendering for the chat widget.
//!
//! The client never owns layout.  It drives a [`ChatUi`] through a handful of
//! primitives: append a bubble, show or hide the typing indicator, toggle the
//! input controls, and flash a retry notice.  [`TerminalUi`] is the default
//! implementation used by the `webhook-chat` binary.

use std::io::{self, Stdout, Write};
use std::ops::{Deref, DerefMut};

use crate::message::Attachment;
use crate::retry::RetryNotice;

/// ANSI escape code for dim text (used for notices).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for agent bubbles).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for yellow text (used for system bubbles).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for green text (used for user bubbles).
const ANSI_GREEN: &str = "\x1b[32m";

/// Who a bubble belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sender {
    User,
    Agent,
    System,
}

impl Sender {
    pub fn label(&self) -> &'static str {
        match self {
            Sender::User => "you",
            Sender::Agent => "bot",
            Sender::System => "system",
        }
    }
}

/// Rendering primitives the chat client calls into.
pub trait ChatUi: Send {
    /// Appends a text bubble.
    fn append_message(&mut self, sender: Sender, text: &str);

    /// Appends the user's photos as one bubble.
    fn append_photos(&mut self, photos: &[Attachment]);

    fn show_typing(&mut self);

    fn hide_typing(&mut self);

    /// Enables or disables the text input and send control.
    fn set_input_enabled(&mut self, enabled: bool);

    /// Shows a transient retry notice, replacing any previous one.
    ///
    /// The notice should disappear after `notice.ttl`.
    fn show_retry_notice(&mut self, notice: &RetryNotice, text: &str);

    /// Removes the retry notice if it is still visible.
    fn clear_retry_notice(&mut self);
}

/// Holds the input controls disabled for as long as it lives.
///
/// Dropping the guard re-enables the controls on every exit path, including
/// early returns and unwinding.
pub struct InputGuard<'a> {
    ui: &'a mut dyn ChatUi,
}

impl<'a> InputGuard<'a> {
    pub fn acquire(ui: &'a mut dyn ChatUi) -> Self {
        ui.set_input_enabled(false);
        Self { ui }
    }
}

impl<'a> Deref for InputGuard<'a> {
    type Target = dyn ChatUi + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.ui
    }
}

impl DerefMut for InputGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.ui
    }
}

impl Drop for InputGuard<'_> {
    fn drop(&mut self) {
        self.ui.set_input_enabled(true);
    }
}

/// Plain text renderer with optional ANSI styling.
pub struct TerminalUi {
    stdout: Stdout,
    use_color: bool,
    typing: bool,
    input_enabled: bool,
}

impl TerminalUi {
    /// Creates a new TerminalUi with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new TerminalUi with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
            typing: false,
            input_enabled: true,
        }
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    pub fn print_info(&mut self, info: &str) {
        self.erase_typing();
        println!("{info}");
        self.flush();
    }

    pub fn print_error(&mut self, error: &str) {
        self.erase_typing();
        eprintln!("Error: {error}");
    }

    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    fn erase_typing(&mut self) {
        if self.typing {
            print!("\r\x1b[2K");
            self.typing = false;
        }
    }

    fn color_for(sender: Sender) -> &'static str {
        match sender {
            Sender::User => ANSI_GREEN,
            Sender::Agent => ANSI_CYAN,
            Sender::System => ANSI_YELLOW,
        }
    }
}

impl Default for TerminalUi {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatUi for TerminalUi {
    fn append_message(&mut self, sender: Sender, text: &str) {
        self.erase_typing();
        if self.use_color {
            let color = Self::color_for(sender);
            println!("{color}[{}]{ANSI_RESET} {text}", sender.label());
        } else {
            println!("[{}] {text}", sender.label());
        }
        self.flush();
    }

    fn append_photos(&mut self, photos: &[Attachment]) {
        let names: Vec<_> = photos.iter().map(|p| p.file_name()).collect();
        let text = format!("📷 {}", names.join(", "));
        self.append_message(Sender::User, &text);
    }

    fn show_typing(&mut self) {
        if !self.typing {
            if self.use_color {
                print!("{ANSI_DIM}…{ANSI_RESET}");
            } else {
                print!("...");
            }
            self.typing = true;
            self.flush();
        }
    }

    fn hide_typing(&mut self) {
        self.erase_typing();
        self.flush();
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    // A terminal cannot take a line back, so the notice simply scrolls away.
    fn show_retry_notice(&mut self, _notice: &RetryNotice, text: &str) {
        let typing = self.typing;
        self.erase_typing();
        if self.use_color {
            println!("{ANSI_DIM}{text}{ANSI_RESET}");
        } else {
            println!("{text}");
        }
        if typing {
            self.show_typing();
        }
        self.flush();
    }

    fn clear_retry_notice(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Toggles(Vec<bool>);

    impl ChatUi for Toggles {
        fn append_message(&mut self, _: Sender, _: &str) {}
        fn append_photos(&mut self, _: &[Attachment]) {}
        fn show_typing(&mut self) {}
        fn hide_typing(&mut self) {}
        fn set_input_enabled(&mut self, enabled: bool) {
            self.0.push(enabled);
        }
        fn show_retry_notice(&mut self, _: &RetryNotice, _: &str) {}
        fn clear_retry_notice(&mut self) {}
    }

    #[test]
    fn guard_disables_then_enables() {
        let mut ui = Toggles::default();
        {
            let mut guard = InputGuard::acquire(&mut ui);
            guard.append_message(Sender::User, "hi");
        }
        assert_eq!(ui.0, vec![false, true]);
    }

    #[test]
    fn guard_enables_on_unwind() {
        let mut ui = Toggles::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = InputGuard::acquire(&mut ui);
            panic!("render failure");
        }));
        assert!(result.is_err());
        assert_eq!(ui.0, vec![false, true]);
    }

    #[test]
    fn terminal_tracks_input_state() {
        let mut ui = TerminalUi::with_color(false);
        assert!(ui.input_enabled());
        {
            let _guard = InputGuard::acquire(&mut ui);
        }
        assert!(ui.input_enabled());
        ui.set_input_enabled(false);
        assert!(!ui.input_enabled());
    }

    #[test]
    fn renderer_default_has_color() {
        let ui = TerminalUi::new();
        assert!(ui.use_color);
    }
}
