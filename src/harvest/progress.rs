use tokio::sync::mpsc;

/// Outward progress event stream consumed by the caller's UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Periodic progress update
    Status {
        /// Completed share of targets, 0-100, monotonically increasing
        percent: u8,
        /// Human-readable status line
        message: String,
    },

    /// Terminal signal: the run is over, no further events follow
    Finished,
}

/// Sends an event, ignoring a dropped receiver
///
/// Progress is best-effort: a caller that stops listening must not stall
/// or fail the harvest.
pub(crate) fn emit(sender: Option<&mpsc::UnboundedSender<ProgressEvent>>, event: ProgressEvent) {
    if let Some(sender) = sender {
        let _ = sender.send(event);
    }
}
