use rfd::FileDialog;
use std::path::{Path, PathBuf};

/// Supported file types for cue sheets
pub const CUE_SHEET_FILTERS: &[(&str, &[&str])] = &[
    ("Cue Sheets", &["json", "csv"]),
    ("JSON Files", &["json"]),
    ("CSV Files", &["csv"]),
    ("All Files", &["*"]),
];

/// File dialog helper for Rhyme Stage
pub struct FileDialogs;

impl FileDialogs {
    /// Open a file dialog for selecting a cue sheet
    ///
    /// Starts in the folder of the last sheet when one is known.
    pub fn open_cue_sheet(last: Option<&Path>) -> Option<PathBuf> {
        let mut dialog = FileDialog::new().set_title("Open Cue Sheet");
        for (name, extensions) in CUE_SHEET_FILTERS {
            dialog = dialog.add_filter(*name, extensions);
        }
        if let Some(dir) = last.and_then(Path::parent) {
            dialog = dialog.set_directory(dir);
        }
        dialog.pick_file()
    }
}
