pub mod cue;
pub mod rhyme;

pub use cue::{Cue, CueSheetError, CueTable};
pub use rhyme::johny_johny;
