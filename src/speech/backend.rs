//! Speech backend abstraction
//!
//! The reader drives any implementation of [`SpeechBackend`]; the live one
//! wraps the platform TTS service, tests script their own.

use super::params::{VoiceInfo, VoiceParams};
use crate::Result;

/// Signal that one utterance finished playing
///
/// Carries the generation the utterance was spoken under, so a signal left
/// over from a cancelled or superseded session can be recognized as stale
/// and dropped instead of advancing the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionSignal {
    pub generation: u64,
}

/// Where a backend delivers completion signals
///
/// Called from whatever thread the platform runs its callbacks on; the
/// receiver forwards into the main event loop.
pub type CompletionNotifier = Box<dyn Fn(CompletionSignal) + Send>;

/// A speech synthesis service
///
/// At most one utterance is in flight at a time. A successful `speak`
/// produces exactly one completion signal unless `cancel` intervenes;
/// nothing is delivered after `cancel`.
pub trait SpeechBackend: Send {
    /// Speak text with the given parameters, tagged with the session
    /// generation the completion signal must carry
    fn speak(&mut self, text: &str, params: &VoiceParams, generation: u64) -> Result<()>;

    /// Suspend the current utterance
    fn pause(&mut self) -> Result<()>;

    /// Resume a suspended utterance
    fn resume(&mut self) -> Result<()>;

    /// Silence the current utterance; its completion signal must not fire
    fn cancel(&mut self) -> Result<()>;

    /// Current platform voice list, queried fresh on every call
    fn voices(&self) -> Result<Vec<VoiceInfo>>;
}
