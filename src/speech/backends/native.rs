//! Native speech backend using the tts crate
//!
//! The `tts` crate provides a unified interface to Speech Dispatcher on
//! Linux, AVFoundation on macOS and SAPI/WinRT on Windows. Utterance-end
//! callbacks are required: without them sequential reading cannot advance,
//! so platforms that lack them are rejected at construction.

use crate::speech::backend::{CompletionNotifier, CompletionSignal, SpeechBackend};
use crate::speech::params::{VoiceInfo, VoiceParams, MAX_SCALE, MIN_SCALE};
use crate::{LectorError, Result};
use log::{debug, warn};
use std::sync::{Arc, Mutex, MutexGuard};
use tts::{Tts, UtteranceId};

/// The utterance whose completion signal has not fired yet
struct Pending {
    /// Platform utterance id; None on backends that do not report one,
    /// in which case the single-in-flight rule makes the match unambiguous
    id: Option<UtteranceId>,
    generation: u64,
}

/// State shared with the platform callback
struct Shared {
    pending: Mutex<Option<Pending>>,
}

impl Shared {
    fn lock_pending(&self) -> MutexGuard<'_, Option<Pending>> {
        // A panic while holding this lock leaves no torn state worth keeping
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// The last speak request, kept so pause can be emulated on platforms
/// without a native pause by cancelling and re-speaking from the top
struct CurrentUtterance {
    text: String,
    params: VoiceParams,
    generation: u64,
    paused: bool,
}

/// Native TTS backend
pub struct NativeBackend {
    tts: Tts,
    shared: Arc<Shared>,
    current: Option<CurrentUtterance>,
}

impl NativeBackend {
    /// Create the platform TTS backend and register the completion callback
    ///
    /// Fails with `SpeechUnsupported` when the platform has no usable
    /// speech service or cannot report utterance completion.
    pub fn new(notifier: CompletionNotifier) -> Result<Self> {
        debug!("Creating native TTS backend");

        let tts = Tts::default().map_err(|e| LectorError::SpeechUnsupported(e.to_string()))?;

        let features = tts.supported_features();
        if !features.utterance_callbacks {
            return Err(LectorError::SpeechUnsupported(
                "platform TTS does not report utterance completion".to_string(),
            ));
        }

        let shared = Arc::new(Shared {
            pending: Mutex::new(None),
        });

        let mut backend = Self {
            tts,
            shared: Arc::clone(&shared),
            current: None,
        };

        backend
            .tts
            .on_utterance_end(Some(Box::new(move |id: UtteranceId| {
                let generation = {
                    let mut slot = shared.lock_pending();
                    match slot.as_ref() {
                        Some(p) if p.id.is_none() || p.id.as_ref() == Some(&id) => {
                            let generation = p.generation;
                            *slot = None;
                            Some(generation)
                        }
                        _ => None,
                    }
                };
                if let Some(generation) = generation {
                    notifier(CompletionSignal { generation });
                }
            })))
            .map_err(|e| {
                LectorError::Speech(format!("Failed to register completion callback: {}", e))
            })?;

        debug!("Native TTS backend created");
        Ok(backend)
    }

    /// Apply voice, rate and pitch before issuing a speak
    fn apply_params(&mut self, params: &VoiceParams) -> Result<()> {
        let features = self.tts.supported_features();

        if features.rate {
            let rate = scale_to_range(
                params.rate,
                self.tts.normal_rate(),
                self.tts.min_rate(),
                self.tts.max_rate(),
            );
            self.tts
                .set_rate(rate)
                .map_err(|e| LectorError::Speech(format!("Failed to set rate: {}", e)))?;
        }

        if features.pitch {
            let pitch = scale_to_range(
                params.pitch,
                self.tts.normal_pitch(),
                self.tts.min_pitch(),
                self.tts.max_pitch(),
            );
            self.tts
                .set_pitch(pitch)
                .map_err(|e| LectorError::Speech(format!("Failed to set pitch: {}", e)))?;
        }

        if features.voice {
            self.apply_voice(params)?;
        } else if params.voice_id.is_some() {
            warn!("Voice selection not supported on this platform");
        }

        Ok(())
    }

    /// Select a voice by id, or by language when only a tag is given
    fn apply_voice(&mut self, params: &VoiceParams) -> Result<()> {
        let available = if params.voice_id.is_some() || params.lang.is_some() {
            self.tts
                .voices()
                .map_err(|e| LectorError::Speech(format!("Failed to list voices: {}", e)))?
        } else {
            return Ok(());
        };

        let voice = if let Some(ref id) = params.voice_id {
            available.iter().find(|v| v.id() == *id)
        } else if let Some(ref lang) = params.lang {
            let lang = lang.to_lowercase();
            available
                .iter()
                .find(|v| v.language().to_string().to_lowercase().starts_with(&lang))
        } else {
            None
        };

        match voice {
            Some(voice) => self
                .tts
                .set_voice(voice)
                .map_err(|e| LectorError::Speech(format!("Failed to set voice: {}", e)))?,
            None => warn!(
                "No voice matching id {:?} / lang {:?}, keeping current voice",
                params.voice_id, params.lang
            ),
        }

        Ok(())
    }
}

impl SpeechBackend for NativeBackend {
    fn speak(&mut self, text: &str, params: &VoiceParams, generation: u64) -> Result<()> {
        debug!("Speaking {} chars (generation {})", text.len(), generation);
        self.apply_params(params)?;

        // Arm the pending slot before the platform call: on backends that
        // finish very short utterances immediately, the callback may fire
        // before speak() returns.
        *self.shared.lock_pending() = Some(Pending {
            id: None,
            generation,
        });

        let id = match self.tts.speak(text, true) {
            Ok(id) => id,
            Err(e) => {
                *self.shared.lock_pending() = None;
                return Err(LectorError::Speech(format!("Speak failed: {}", e)));
            }
        };

        // Record the platform id unless the utterance already completed
        if let Some(pending) = self.shared.lock_pending().as_mut() {
            if pending.generation == generation {
                pending.id = id;
            }
        }

        self.current = Some(CurrentUtterance {
            text: text.to_string(),
            params: params.clone(),
            generation,
            paused: false,
        });
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        // The tts crate exposes no platform pause; silence the utterance
        // and re-speak it from the top on resume.
        debug!("Pausing speech");
        if let Some(current) = self.current.as_mut() {
            current.paused = true;
        }
        *self.shared.lock_pending() = None;
        self.tts
            .stop()
            .map_err(|e| LectorError::Speech(format!("Pause failed: {}", e)))?;
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        debug!("Resuming speech");
        if let Some(current) = self.current.take() {
            if current.paused {
                return self.speak(&current.text, &current.params, current.generation);
            }
            self.current = Some(current);
        }
        Ok(())
    }

    fn cancel(&mut self) -> Result<()> {
        debug!("Canceling speech");
        self.current = None;
        // Nothing may be delivered after cancel
        *self.shared.lock_pending() = None;
        self.tts
            .stop()
            .map_err(|e| LectorError::Speech(format!("Cancel failed: {}", e)))?;
        Ok(())
    }

    fn voices(&self) -> Result<Vec<VoiceInfo>> {
        let features = self.tts.supported_features();
        if !features.voice {
            return Ok(Vec::new());
        }

        let default_id = self.tts.voice().ok().flatten().map(|v| v.id());
        let voices = self
            .tts
            .voices()
            .map_err(|e| LectorError::Speech(format!("Failed to list voices: {}", e)))?;

        Ok(voices
            .iter()
            .map(|v| VoiceInfo {
                id: v.id(),
                display_name: v.name(),
                lang: v.language().to_string(),
                is_default: default_id.as_deref() == Some(v.id().as_str()),
            })
            .collect())
    }
}

/// Map a 0.1-10 multiplier onto the platform's parameter range
///
/// 1.0 lands exactly on the platform's normal value; above it interpolates
/// toward the maximum, below toward the minimum. This works for ranges that
/// are not centered on their normal value (Speech Dispatcher uses -100..100
/// around 0).
fn scale_to_range(scale: f32, normal: f32, min: f32, max: f32) -> f32 {
    if scale >= 1.0 {
        let t = ((scale - 1.0) / (MAX_SCALE - 1.0)).min(1.0);
        normal + (max - normal) * t
    } else {
        let t = ((scale - MIN_SCALE) / (1.0 - MIN_SCALE)).max(0.0);
        min + (normal - min) * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_normal() {
        assert_eq!(scale_to_range(1.0, 0.0, -100.0, 100.0), 0.0);
        assert_eq!(scale_to_range(1.0, 1.0, 0.5, 2.0), 1.0);
    }

    #[test]
    fn test_scale_extremes() {
        assert_eq!(scale_to_range(MAX_SCALE, 0.0, -100.0, 100.0), 100.0);
        assert_eq!(scale_to_range(MIN_SCALE, 0.0, -100.0, 100.0), -100.0);
    }

    #[test]
    fn test_scale_midpoints_move_monotonically() {
        let slow = scale_to_range(0.5, 0.0, -100.0, 100.0);
        let fast = scale_to_range(2.0, 0.0, -100.0, 100.0);
        assert!(slow < 0.0);
        assert!(fast > 0.0);
    }

    #[test]
    fn test_scale_clamps_above_max() {
        // Out-of-range input never escapes the platform range
        assert_eq!(scale_to_range(50.0, 0.0, -100.0, 100.0), 100.0);
    }
}
