/// Receives progress notifications as integer percentages in [0, 100]
pub trait ProgressListener {
    fn progress(&self, percent: u8);
}

/// Progress listener that forwards the notifications to the log
pub struct LogProgress {
    label: String,
}

impl LogProgress {
    pub fn new<S: Into<String>>(label: S) -> Self {
        LogProgress { label: label.into() }
    }
}

impl ProgressListener for LogProgress {
    fn progress(&self, percent: u8) {
        log::debug!("[{}] {}%", self.label, percent);
    }
}
