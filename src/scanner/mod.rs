pub mod walk;

pub use walk::{ExcludeSet, WalkEntry, Walker};
