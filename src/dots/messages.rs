#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Hotkey,
    WindowClosed,
}

/// Messages posted into the overlay's event thread from other threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayCommand {
    RequestExit { reason: ExitReason },
}
