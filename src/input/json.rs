use anyhow::{Context, Result};
use crate::core::{Cue, CueTable};
use serde::Deserialize;

/// On-disk JSON layout; a bare array of cues is accepted too
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonSheet {
    Named {
        #[serde(default)]
        title: Option<String>,
        cues: Vec<Cue>,
    },
    Bare(Vec<Cue>),
}

/// Parse a cue sheet from JSON text
pub fn parse_json(text: &str, fallback_name: &str) -> Result<CueTable> {
    let sheet: JsonSheet = serde_json::from_str(text).context("parse cue sheet JSON")?;
    let (name, cues) = match sheet {
        JsonSheet::Named { title, cues } => (title.unwrap_or_else(|| fallback_name.to_string()), cues),
        JsonSheet::Bare(cues) => (fallback_name.to_string(), cues),
    };
    Ok(CueTable::new(&name, cues)?)
}
