use crate::core::cue::{Cue, CueTable};

pub const BUILTIN_NAME: &str = "Johny Johny Yes Papa";

/// The built-in performance: the full rhyme with a short intro and a bow
pub fn johny_johny() -> CueTable {
    let cues = vec![
        Cue::new("Hello, friends!", "Let's sing along", 2400, &["Hello, friends!", "Let's sing along!"]),
        Cue::new("Johny, Johny!", "Yes, Papa?", 2800, &["Johny, Johny!", "Yes, Papa?"]),
        Cue::new("Eating sugar?", "No, Papa!", 2800, &["Eating sugar?", "No, Papa!"]),
        Cue::new("Telling lies?", "No, Papa!", 2800, &["Telling lies?", "No, Papa!"]),
        Cue::new("Open your mouth!", "Ha! Ha! Ha!", 3200, &["Open your mouth!", "Ha! Ha! Ha!"]),
        Cue::new("Yay!", "Thanks for singing", 2200, &["Yay! Thanks for singing!"]),
    ];

    match CueTable::new(BUILTIN_NAME, cues) {
        Ok(table) => table,
        Err(e) => unreachable!("built-in cue table is invalid: {}", e),
    }
}
