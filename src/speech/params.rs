//! Voice parameters for speech requests

use crate::{LectorError, Result};
use serde::Serialize;

/// Valid range for the rate and pitch multipliers
pub const MIN_SCALE: f32 = 0.1;
pub const MAX_SCALE: f32 = 10.0;

/// Parameters applied to one speech request
///
/// Supplied fresh per request and never mutated mid-utterance. Rate and
/// pitch are multipliers where 1.0 is the platform's normal value.
#[derive(Debug, Clone, Serialize)]
pub struct VoiceParams {
    /// Backend voice id; None keeps the platform default
    pub voice_id: Option<String>,

    /// Rate multiplier (0.1-10.0)
    pub rate: f32,

    /// Pitch multiplier (0.1-10.0)
    pub pitch: f32,

    /// Language tag used to pick a voice when no id is given
    pub lang: Option<String>,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            voice_id: None,
            rate: 1.0,
            pitch: 1.0,
            lang: None,
        }
    }
}

impl VoiceParams {
    /// Check that rate and pitch are within the valid range
    pub fn validate(&self) -> Result<()> {
        validate_scale("rate", self.rate)?;
        validate_scale("pitch", self.pitch)?;
        Ok(())
    }
}

/// Validate a single rate/pitch multiplier
pub fn validate_scale(name: &str, value: f32) -> Result<()> {
    if !value.is_finite() || !(MIN_SCALE..=MAX_SCALE).contains(&value) {
        return Err(LectorError::InvalidArgument(format!(
            "{} must be between {} and {}, got {}",
            name, MIN_SCALE, MAX_SCALE, value
        )));
    }
    Ok(())
}

/// One entry in the platform voice list
///
/// The list may change while the application runs; consumers re-query
/// instead of caching a one-shot snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct VoiceInfo {
    pub id: String,
    pub display_name: String,
    pub lang: String,
    pub is_default: bool,
}
