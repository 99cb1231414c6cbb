mod change_detector;
mod persistence;

pub use change_detector::{
    ChangeDetector, ChangeDetectorOptions, ChangeDetectorState, DEFAULT_UI_PREVIEW_CHARS,
};
