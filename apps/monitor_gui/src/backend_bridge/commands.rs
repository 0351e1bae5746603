//! Backend commands queued from UI to backend worker.

#[derive(Debug)]
pub enum BackendCommand {
    /// One-shot status query at startup; the result is rendered without
    /// starting any polling.
    FetchStatus,
    /// Start when idle, stop when running, judged against the worker's own
    /// session state.
    ToggleDetection { exercise_type: String },
}
