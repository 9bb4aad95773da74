pub mod autosave;

pub use autosave::{AutoSave, AutoSaveHandle, AutoSaveStatus, SaveOutcome, SaveState, Workspace};
