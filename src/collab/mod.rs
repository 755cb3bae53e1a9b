//! External collaborators: narrow interfaces the core talks to but never
//! depends on.
//!
//! Every call into a collaborator is fire-and-forget. Failures are absorbed
//! at this boundary and turned into a degraded-but-working state (fallback
//! text, a skipped sound); they never reach the render loop.

/// Audio cue types and the logging sink.
pub mod audio;
/// Explanation requests, providers, and the background service.
pub mod explain;
/// Scoring and achievements.
pub mod scoring;

pub use audio::{AudioCue, AudioSink, LogAudioSink, SoundKind};
pub use explain::{
    CannedExplainer, ExplainError, ExplainRequest, Explainer, Explanation,
    ExplanationService, ExplanationStatus,
};
#[cfg(feature = "llm")]
pub use explain::HttpExplainer;
pub use scoring::{Achievement, ScoreKeeper};

use crate::discovery::Severity;
use crate::scene::AnatomyContext;

/// Consumer of discovery progress (scoring, achievements, UI). Receives
/// notifications and returns nothing the core reads.
pub trait DiscoverySink {
    /// A condition was discovered.
    fn on_discovered(&mut self, id: &str, elapsed_ms: u64, severity: Severity);

    /// Scan progress of a condition, once per frame while it is scanning.
    fn on_progress(&mut self, _id: &str, _ratio: f32) {}

    /// The anatomy context changed; `available` conditions are now scanning.
    fn on_context_changed(&mut self, _context: AnatomyContext, _available: usize) {}
}
