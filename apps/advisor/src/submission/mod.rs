// Quiz submission: remote recommendation with a local fallback, cancellation of
// superseded submissions, and persistence of whatever result was shown.

pub mod coordinator;
pub mod tracker;

pub use coordinator::{RecommendationSource, SubmissionCoordinator, SubmissionOutcome};
