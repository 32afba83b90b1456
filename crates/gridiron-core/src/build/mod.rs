// Lineup construction pipeline: selection, building, validation,
// de-duplication, batch mix and ranking.

pub mod builder;
pub mod dedup;
pub mod quota;
pub mod rank;
pub mod selection;
pub mod validate;

pub use builder::{AbortReason, BuildOutcome, BuildStage, LineupBuilder};
pub use dedup::Deduplicator;
pub use quota::{LineupMix, LineupQuota, LineupType};
pub use rank::{exposures, LineupRanker};
pub use selection::SelectionPolicy;
pub use validate::{LineupValidator, Rejection};
