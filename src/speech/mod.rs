//! Speech synthesis system

pub mod backend;
pub mod backends;
pub mod params;

pub use backend::{CompletionNotifier, CompletionSignal, SpeechBackend};
pub use backends::native::NativeBackend;
pub use params::{VoiceInfo, VoiceParams};
