use anyhow::{Context, Result};
use crate::core::{Cue, CueTable};
use std::io::Read;

/// Separator between spoken lines inside one cell
const LINE_SEPARATOR: char = '|';

/// Parse a cue sheet from CSV data
///
/// Supports flexible column names:
/// - title,subtitle,duration,lines
/// - title,duration_ms,spoken
/// - caption,sub,ms,text
///
/// Spoken lines within a cell are separated by `|`. The subtitle and lines
/// columns are optional.
pub fn parse_csv<R: Read>(reader: R, name: &str) -> Result<CueTable> {
    let mut rdr = csv::Reader::from_reader(reader);

    let headers = rdr.headers()?.clone();
    let title_idx = find_column(&headers, &["title", "caption", "headline"])
        .context("Missing title column")?;
    let duration_idx = find_column(&headers, &["duration", "duration_ms", "ms", "dwell"])
        .context("Missing duration column")?;
    let subtitle_idx = find_column(&headers, &["subtitle", "sub", "subcaption"]);
    let lines_idx = find_column(&headers, &["lines", "spoken", "text", "narration"]);

    let mut cues = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read CSV row {}", row + 1))?;

        let title = record.get(title_idx).unwrap_or_default().trim().to_string();
        let duration_ms = record
            .get(duration_idx)
            .unwrap_or_default()
            .trim()
            .parse::<u64>()
            .with_context(|| format!("Bad duration on row {}", row + 1))?;
        let subtitle = subtitle_idx
            .and_then(|i| record.get(i))
            .unwrap_or_default()
            .trim()
            .to_string();
        let lines = lines_idx
            .and_then(|i| record.get(i))
            .map(split_lines)
            .unwrap_or_default();

        cues.push(Cue {
            title,
            subtitle,
            duration_ms,
            lines,
        });
    }

    Ok(CueTable::new(name, cues)?)
}

fn split_lines(cell: &str) -> Vec<String> {
    cell.split(LINE_SEPARATOR)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Find a column by checking possible names
fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|header| names.contains(&header.trim().to_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_sheet() {
        let data = "Title,Subtitle,Duration,Lines\n\
                    \"Johny, Johny!\",\"Yes, Papa?\",2800,\"Johny, Johny! | Yes, Papa?\"\n\
                    Eating sugar?,\"No, Papa!\",2800,Eating sugar?|No Papa\n";
        let table = parse_csv(data.as_bytes(), "rhyme").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.cues()[0].title, "Johny, Johny!");
        assert_eq!(table.cues()[0].lines, vec!["Johny, Johny!", "Yes, Papa?"]);
        assert_eq!(table.cues()[1].lines, vec!["Eating sugar?", "No Papa"]);
        assert_eq!(table.total_duration().as_millis(), 5600);
    }

    #[test]
    fn test_optional_columns() {
        let data = "caption,ms\nHello,500\n";
        let table = parse_csv(data.as_bytes(), "min").unwrap();
        assert_eq!(table.cues()[0].subtitle, "");
        assert!(table.cues()[0].lines.is_empty());
    }

    #[test]
    fn test_missing_duration_column() {
        let err = parse_csv("title,lines\nHi,Hi\n".as_bytes(), "x").unwrap_err();
        assert!(err.to_string().contains("duration"));
    }

    #[test]
    fn test_bad_duration_value() {
        let err = parse_csv("title,duration\nHi,soon\n".as_bytes(), "x").unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }
}
