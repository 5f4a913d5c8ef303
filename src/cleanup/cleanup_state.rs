use std::fmt;

/// Lifecycle of one cleanup job.
///
/// `Listing -> Done`, `Listing -> Deleting -> Done`, and `Failed` from either
/// working state. `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupState {
    Listing,
    Deleting,
    Done,
    Failed,
}

impl fmt::Display for CleanupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CleanupState::Listing => "LISTING",
            CleanupState::Deleting => "DELETING",
            CleanupState::Done => "DONE",
            CleanupState::Failed => "FAILED",
        };
        f.write_str(name)
    }
}
