use imgui::{Ui, Condition};
use winit::event::{KeyEvent, ElementState};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Keyboard shortcut manager
pub struct ShortcutManager {
    shortcuts: Vec<Shortcut>,
}

#[derive(Clone)]
pub struct Shortcut {
    pub key: PhysicalKey,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub action: ShortcutAction,
    pub description: String,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ShortcutAction {
    OpenCueSheet,
    Start,
    Toggle,
    Replay,
    Stop,
    ToggleNarration,
    ToggleLyrics,
    ToggleNarrationLog,
    ShowHelp,
    Quit,
}

impl ShortcutManager {
    pub fn new() -> Self {
        let mut manager = Self {
            shortcuts: Vec::new(),
        };
        manager.register_defaults();
        manager
    }

    fn register_defaults(&mut self) {
        self.register(KeyCode::KeyO, true, ShortcutAction::OpenCueSheet, "Open Cue Sheet");

        // Playback controls
        self.register(KeyCode::Space, false, ShortcutAction::Toggle, "Cue / Pause / Resume");
        self.register(KeyCode::Enter, false, ShortcutAction::Start, "Start From The Top");
        self.register(KeyCode::KeyR, false, ShortcutAction::Replay, "Replay");
        self.register(KeyCode::Escape, false, ShortcutAction::Stop, "Stop");

        // Narration and view
        self.register(KeyCode::KeyN, true, ShortcutAction::ToggleNarration, "Narration On/Off");
        self.register(KeyCode::KeyL, false, ShortcutAction::ToggleLyrics, "Toggle Lyric Sheet");
        self.register(KeyCode::KeyH, false, ShortcutAction::ToggleNarrationLog, "Toggle Narration Log");

        self.register(KeyCode::F1, false, ShortcutAction::ShowHelp, "Shortcut Help");
        self.register(KeyCode::KeyQ, true, ShortcutAction::Quit, "Quit");
    }

    fn register(&mut self, code: KeyCode, ctrl: bool, action: ShortcutAction, description: &str) {
        self.shortcuts.push(Shortcut {
            key: PhysicalKey::Code(code),
            ctrl,
            shift: false,
            alt: false,
            action,
            description: description.to_string(),
        });
    }

    /// Process a key event and return the matching action (if any)
    pub fn process_event(&self, event: &KeyEvent, ctrl: bool, shift: bool, alt: bool) -> Option<ShortcutAction> {
        if event.state != ElementState::Pressed || event.repeat {
            return None;
        }
        self.lookup(event.physical_key, ctrl, shift, alt)
    }

    /// Find the action bound to a key with the given modifiers
    pub fn lookup(&self, key: PhysicalKey, ctrl: bool, shift: bool, alt: bool) -> Option<ShortcutAction> {
        self.shortcuts
            .iter()
            .find(|s| s.key == key && s.ctrl == ctrl && s.shift == shift && s.alt == alt)
            .map(|s| s.action)
    }

    /// Render a shortcuts help window
    pub fn render_help(&self, ui: &Ui, is_open: &mut bool) {
        ui.window("Keyboard Shortcuts")
            .size([340.0, 300.0], Condition::FirstUseEver)
            .position([500.0, 200.0], Condition::FirstUseEver)
            .opened(is_open)
            .build(|| {
                let mut current_category = "";

                for shortcut in &self.shortcuts {
                    let category = match shortcut.action {
                        ShortcutAction::OpenCueSheet => "File",
                        ShortcutAction::Start |
                        ShortcutAction::Toggle |
                        ShortcutAction::Replay |
                        ShortcutAction::Stop => "Playback",
                        ShortcutAction::ToggleNarration |
                        ShortcutAction::ToggleLyrics |
                        ShortcutAction::ToggleNarrationLog => "Narration & View",
                        ShortcutAction::ShowHelp |
                        ShortcutAction::Quit => "General",
                    };

                    if category != current_category {
                        if !current_category.is_empty() {
                            ui.separator();
                        }
                        ui.text(category);
                        current_category = category;
                    }

                    ui.text(format!("  {:12} - {}", shortcut_label(shortcut), shortcut.description));
                }
            });
    }
}

fn shortcut_label(shortcut: &Shortcut) -> String {
    let mut label = String::new();
    if shortcut.ctrl {
        label.push_str("Ctrl+");
    }
    if shortcut.shift {
        label.push_str("Shift+");
    }
    if shortcut.alt {
        label.push_str("Alt+");
    }
    label.push_str(&key_to_string(shortcut.key));
    label
}

fn key_to_string(key: PhysicalKey) -> String {
    match key {
        PhysicalKey::Code(code) => match code {
            KeyCode::Space => "Space".to_string(),
            KeyCode::Escape => "Esc".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::F1 => "F1".to_string(),
            KeyCode::KeyH => "H".to_string(),
            KeyCode::KeyL => "L".to_string(),
            KeyCode::KeyN => "N".to_string(),
            KeyCode::KeyO => "O".to_string(),
            KeyCode::KeyQ => "Q".to_string(),
            KeyCode::KeyR => "R".to_string(),
            _ => format!("{:?}", code),
        },
        _ => "?".to_string(),
    }
}

impl Default for ShortcutManager {
    fn default() -> Self {
        Self::new()
    }
}

/// About dialog
pub struct AboutDialog {
    show: bool,
}

impl AboutDialog {
    pub fn new() -> Self {
        Self { show: false }
    }

    pub fn show(&mut self) {
        self.show = true;
    }

    pub fn render(&mut self, ui: &Ui) {
        if !self.show {
            return;
        }

        ui.window("About Rhyme Stage")
            .size([380.0, 240.0], Condition::FirstUseEver)
            .build(|| {
                ui.text("Rhyme Stage");
                ui.text_colored([0.7, 0.7, 0.7, 1.0], format!("Version {}", env!("CARGO_PKG_VERSION")));
                ui.separator();
                ui.text("Sing-along nursery rhymes with captions");
                ui.text("and a friendly narrator.");
                ui.separator();
                ui.bullet_text("Timed lyric captions and progress");
                ui.bullet_text("Speech narration via espeak-ng");
                ui.bullet_text("Custom cue sheets (JSON / CSV)");
                ui.separator();
                if ui.button("Close") {
                    self.show = false;
                }
            });
    }
}

impl Default for AboutDialog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_respects_modifiers() {
        let shortcuts = ShortcutManager::new();
        let space = PhysicalKey::Code(KeyCode::Space);
        assert_eq!(shortcuts.lookup(space, false, false, false), Some(ShortcutAction::Toggle));
        assert_eq!(shortcuts.lookup(space, true, false, false), None);

        let o = PhysicalKey::Code(KeyCode::KeyO);
        assert_eq!(shortcuts.lookup(o, true, false, false), Some(ShortcutAction::OpenCueSheet));
        assert_eq!(shortcuts.lookup(o, false, false, false), None);
    }

    #[test]
    fn test_labels() {
        let shortcuts = ShortcutManager::new();
        let quit = shortcuts
            .shortcuts
            .iter()
            .find(|s| s.action == ShortcutAction::Quit)
            .unwrap();
        assert_eq!(shortcut_label(quit), "Ctrl+Q");
    }
}
