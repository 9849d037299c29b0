use crate::accounts::Category;

/// Follower count at which an account becomes `macro`.
pub const MACRO_THRESHOLD: u64 = 100_000;

/// Map a follower count to its tier. Only two tiers exist.
#[must_use]
pub fn classify(followers: u64) -> Category {
    if followers >= MACRO_THRESHOLD {
        Category::Macro
    } else {
        Category::Micro
    }
}
