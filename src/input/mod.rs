pub mod csv;
pub mod json;

pub use self::csv::parse_csv;
pub use self::json::parse_json;

use anyhow::{Context, Result};
use crate::core::CueTable;
use std::path::Path;

/// Input format detection result
#[derive(Debug, Clone, PartialEq)]
pub enum InputFormat {
    Json,
    Csv,
    Unknown,
}

/// Detect the format of a cue sheet from its extension, falling back to content
pub fn detect_format(path: &Path, data: &[u8]) -> InputFormat {
    match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()) {
        Some(ext) if ext == "json" => return InputFormat::Json,
        Some(ext) if ext == "csv" => return InputFormat::Csv,
        _ => {}
    }

    if is_json(data) {
        return InputFormat::Json;
    }
    if is_csv(data) {
        return InputFormat::Csv;
    }

    InputFormat::Unknown
}

fn is_json(data: &[u8]) -> bool {
    data.iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|&b| b == b'{' || b == b'[')
}

fn is_csv(data: &[u8]) -> bool {
    let sample = &data[..data.len().min(500)];
    match std::str::from_utf8(sample) {
        Ok(text) => text
            .lines()
            .next()
            .is_some_and(|header| header.contains(',')),
        Err(_) => false,
    }
}

/// Name shown for a sheet loaded from `path` when it carries none
fn sheet_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("cue sheet")
        .to_string()
}

/// Load a cue sheet from a file, auto-detecting format
pub fn load_cue_file(path: &Path) -> Result<CueTable> {
    let data = std::fs::read(path).with_context(|| format!("read cue sheet '{}'", path.display()))?;

    match detect_format(path, &data) {
        InputFormat::Json => {
            let text = std::str::from_utf8(&data)
                .with_context(|| format!("cue sheet '{}' is not UTF-8", path.display()))?;
            parse_json(text, &sheet_name(path))
        }
        InputFormat::Csv => parse_csv(data.as_slice(), &sheet_name(path)),
        InputFormat::Unknown => anyhow::bail!("Unknown cue sheet format: {}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(detect_format(Path::new("song.JSON"), b""), InputFormat::Json);
        assert_eq!(detect_format(Path::new("song.csv"), b""), InputFormat::Csv);
    }

    #[test]
    fn test_detect_by_content() {
        assert_eq!(detect_format(Path::new("song"), b"  \n{\"cues\": []}"), InputFormat::Json);
        assert_eq!(
            detect_format(Path::new("song.txt"), b"title,subtitle,duration,lines\n"),
            InputFormat::Csv
        );
        assert_eq!(detect_format(Path::new("song.txt"), b"la la la"), InputFormat::Unknown);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = load_cue_file(Path::new("/nonexistent/rhyme.json")).unwrap_err();
        assert!(err.to_string().contains("read cue sheet"));
    }

    #[test]
    fn test_load_cue_file_parses_detected_format() {
        let dir = std::env::temp_dir().join(format!("rhyme-stage-input-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let json = dir.join("bedtime");
        std::fs::write(&json, r#"[{"title": "Johny, Johny!", "duration_ms": 2800, "lines": ["Johny, Johny!"]}]"#).unwrap();
        let table = load_cue_file(&json).unwrap();
        assert_eq!(table.name(), "bedtime");
        assert_eq!(table.len(), 1);

        let csv = dir.join("encore.csv");
        std::fs::write(&csv, "title,duration\n\"Yes, Papa?\",1200\nHa! Ha! Ha!,900\n").unwrap();
        let table = load_cue_file(&csv).unwrap();
        assert_eq!(table.name(), "encore");
        assert_eq!(table.len(), 2);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
