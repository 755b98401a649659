pub mod cleanup;
pub mod duplicates;
pub mod merge;

pub use cleanup::{suggest_cleanup, CleanupAction, CleanupSuggestion};
pub use duplicates::{find_duplicates, DuplicateReport};
pub use merge::merge;
