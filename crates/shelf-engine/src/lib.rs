pub mod history;
pub mod memo;
pub mod navigator;
pub mod picker;
pub mod recording;

pub use history::HistoryStack;
pub use memo::MemoStore;
pub use navigator::{Navigator, NavigatorConfig, RenderOutcome};
pub use picker::{Picker, RandomSource, ScriptedRandom, SeededRandom, ThreadRandom};
pub use recording::{RecordingSink, SinkEvent};
