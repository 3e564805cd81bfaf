pub mod controls;
pub mod dialogs;
pub mod narration_log;
pub mod shortcuts;
pub mod stage;
pub mod timeline;

pub use controls::{ControlAction, ControlsWindow};
pub use dialogs::FileDialogs;
pub use narration_log::NarrationLogWindow;
pub use shortcuts::{AboutDialog, ShortcutAction, ShortcutManager};
pub use stage::StageWindow;
pub use timeline::{TimelineAction, TimelineWindow};
