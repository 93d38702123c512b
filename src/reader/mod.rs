//! Sequential reader
//!
//! The state machine at the center of lector: it owns the current read
//! position, hands the speech backend one unit at a time, and advances only
//! when a completion signal for the live session arrives. All operations
//! return immediately; nothing here blocks on audio.

use crate::segment::ReadingUnit;
use crate::speech::{SpeechBackend, VoiceInfo, VoiceParams};
use crate::{LectorError, Result};
use log::debug;

/// Reader status
///
/// `Reading` implies exactly one speech request in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderStatus {
    Idle,
    Reading,
    Paused,
}

impl ReaderStatus {
    pub fn name(&self) -> &'static str {
        match self {
            ReaderStatus::Idle => "idle",
            ReaderStatus::Reading => "reading",
            ReaderStatus::Paused => "paused",
        }
    }
}

/// Notifications produced by state transitions
///
/// The UI layer turns these into highlighting and status lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderEvent {
    /// A unit was handed to the backend
    Progress { index: usize, total: usize },

    /// The last unit finished; the reader is idle again
    Finished,
}

/// Drives the speech backend through an ordered sequence of units
pub struct SequentialReader {
    backend: Box<dyn SpeechBackend>,

    /// Units of the current session
    units: Vec<ReadingUnit>,

    /// Cursor into `units`; always within `0..=units.len()`
    position: usize,

    status: ReaderStatus,

    /// Session generation, bumped on every start and stop. A completion
    /// signal is acted on only if it carries the live generation, so a
    /// late signal from a cancelled utterance cannot move the cursor.
    generation: u64,

    /// Parameters for the current session
    params: VoiceParams,
}

impl SequentialReader {
    pub fn new(backend: Box<dyn SpeechBackend>) -> Self {
        Self {
            backend,
            units: Vec::new(),
            position: 0,
            status: ReaderStatus::Idle,
            generation: 0,
            params: VoiceParams::default(),
        }
    }

    pub fn status(&self) -> ReaderStatus {
        self.status
    }

    /// Cursor position within the current session
    pub fn position(&self) -> usize {
        self.position
    }

    /// Generation tag of the current session
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// The unit under the cursor, if any
    pub fn current_unit(&self) -> Option<&ReadingUnit> {
        self.units.get(self.position)
    }

    /// Current platform voice list
    pub fn voices(&self) -> Result<Vec<VoiceInfo>> {
        self.backend.voices()
    }

    /// Begin a new session reading `units` in order
    ///
    /// Cancels whatever the previous session had in flight, resets the
    /// cursor and speaks the first non-blank unit. Fails with
    /// `InvalidArgument` when `units` is empty.
    pub fn start(&mut self, units: Vec<ReadingUnit>, params: VoiceParams) -> Result<ReaderEvent> {
        if units.is_empty() {
            return Err(LectorError::InvalidArgument(
                "no units to read".to_string(),
            ));
        }
        params.validate()?;

        self.backend.cancel()?;
        self.generation += 1;
        self.units = units;
        self.params = params;
        self.position = 0;
        self.status = ReaderStatus::Reading;
        debug!(
            "Session {} started with {} units",
            self.generation,
            self.units.len()
        );

        self.speak_current()
    }

    /// Read a single piece of text, e.g. a manual selection
    ///
    /// Internally a one-element session, so pause/resume/stop behave
    /// exactly as they do for sequential reading.
    pub fn read_one(&mut self, text: &str, params: VoiceParams) -> Result<ReaderEvent> {
        self.start(vec![ReadingUnit::new(0, text.trim().to_string())], params)
    }

    /// Feed a completion signal into the state machine
    ///
    /// Returns `None` for a stale signal: one tagged with a superseded
    /// generation, or one arriving while the reader is not in `Reading`.
    /// Stale signals must not move the cursor.
    pub fn on_unit_complete(&mut self, generation: u64) -> Result<Option<ReaderEvent>> {
        if generation != self.generation || self.status != ReaderStatus::Reading {
            debug!(
                "Ignoring stale completion (signal generation {}, live {}, status {})",
                generation,
                self.generation,
                self.status.name()
            );
            return Ok(None);
        }

        self.position += 1;
        self.speak_current().map(Some)
    }

    /// Suspend the current utterance; no-op unless reading
    pub fn pause(&mut self) -> Result<()> {
        if self.status == ReaderStatus::Reading {
            self.backend.pause()?;
            self.status = ReaderStatus::Paused;
            debug!("Session {} paused at unit {}", self.generation, self.position);
        }
        Ok(())
    }

    /// Resume a suspended session; no-op unless paused
    pub fn resume(&mut self) -> Result<()> {
        if self.status == ReaderStatus::Paused {
            self.backend.resume()?;
            self.status = ReaderStatus::Reading;
            debug!("Session {} resumed at unit {}", self.generation, self.position);
        }
        Ok(())
    }

    /// Stop reading, from any state
    ///
    /// Always lands in `Idle` with the cursor at 0. The generation bump
    /// makes any late completion from the cancelled utterance inert.
    pub fn stop(&mut self) -> Result<()> {
        self.backend.cancel()?;
        self.generation += 1;
        self.position = 0;
        self.status = ReaderStatus::Idle;
        debug!("Stopped; now session {}", self.generation);
        Ok(())
    }

    /// Speak the unit under the cursor, skipping blank units
    ///
    /// Lands in `Idle` with a `Finished` event when the cursor runs off the
    /// end. A backend failure also returns the reader to `Idle` rather than
    /// leaving it in `Reading` with nothing in flight.
    fn speak_current(&mut self) -> Result<ReaderEvent> {
        while self.position < self.units.len() && self.units[self.position].is_blank() {
            self.position += 1;
        }

        if self.position >= self.units.len() {
            self.status = ReaderStatus::Idle;
            debug!("Session {} finished", self.generation);
            return Ok(ReaderEvent::Finished);
        }

        let unit = &self.units[self.position];
        if let Err(e) = self.backend.speak(&unit.text, &self.params, self.generation) {
            self.status = ReaderStatus::Idle;
            return Err(e);
        }

        Ok(ReaderEvent::Progress {
            index: self.position,
            total: self.units.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Backend call log shared between the test and the boxed backend
    #[derive(Default)]
    struct CallLog {
        spoken: Vec<(String, u64)>,
        pauses: usize,
        resumes: usize,
        cancels: usize,
    }

    /// Backend that records calls instead of producing audio
    struct ScriptedBackend {
        log: Arc<Mutex<CallLog>>,
        fail_speak: bool,
    }

    impl ScriptedBackend {
        fn new() -> (Self, Arc<Mutex<CallLog>>) {
            let log = Arc::new(Mutex::new(CallLog::default()));
            (
                Self {
                    log: Arc::clone(&log),
                    fail_speak: false,
                },
                log,
            )
        }
    }

    impl SpeechBackend for ScriptedBackend {
        fn speak(&mut self, text: &str, _params: &VoiceParams, generation: u64) -> Result<()> {
            if self.fail_speak {
                return Err(LectorError::Speech("scripted failure".to_string()));
            }
            self.log
                .lock()
                .unwrap()
                .spoken
                .push((text.to_string(), generation));
            Ok(())
        }

        fn pause(&mut self) -> Result<()> {
            self.log.lock().unwrap().pauses += 1;
            Ok(())
        }

        fn resume(&mut self) -> Result<()> {
            self.log.lock().unwrap().resumes += 1;
            Ok(())
        }

        fn cancel(&mut self) -> Result<()> {
            self.log.lock().unwrap().cancels += 1;
            Ok(())
        }

        fn voices(&self) -> Result<Vec<VoiceInfo>> {
            Ok(Vec::new())
        }
    }

    fn units(texts: &[&str]) -> Vec<ReadingUnit> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| ReadingUnit::new(i, t.to_string()))
            .collect()
    }

    fn reader() -> (SequentialReader, Arc<Mutex<CallLog>>) {
        let (backend, log) = ScriptedBackend::new();
        (SequentialReader::new(Box::new(backend)), log)
    }

    #[test]
    fn test_start_speaks_first_unit() {
        let (mut reader, log) = reader();
        let event = reader
            .start(units(&["A", "B"]), VoiceParams::default())
            .unwrap();

        assert_eq!(event, ReaderEvent::Progress { index: 0, total: 2 });
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.status(), ReaderStatus::Reading);

        let log = log.lock().unwrap();
        assert_eq!(log.spoken.len(), 1);
        assert_eq!(log.spoken[0].0, "A");
    }

    #[test]
    fn test_start_empty_units_rejected() {
        let (mut reader, log) = reader();
        let result = reader.start(Vec::new(), VoiceParams::default());

        assert!(matches!(result, Err(LectorError::InvalidArgument(_))));
        assert_eq!(reader.status(), ReaderStatus::Idle);
        assert!(log.lock().unwrap().spoken.is_empty());
    }

    #[test]
    fn test_start_invalid_params_rejected() {
        let (mut reader, _log) = reader();
        let mut params = VoiceParams::default();
        params.rate = 99.0;
        let result = reader.start(units(&["A"]), params);
        assert!(matches!(result, Err(LectorError::InvalidArgument(_))));
    }

    #[test]
    fn test_completions_walk_to_finish() {
        let (mut reader, log) = reader();
        reader
            .start(units(&["A", "B", "C"]), VoiceParams::default())
            .unwrap();
        let generation = reader.generation();

        let e1 = reader.on_unit_complete(generation).unwrap();
        assert_eq!(e1, Some(ReaderEvent::Progress { index: 1, total: 3 }));
        assert_eq!(reader.position(), 1);

        let e2 = reader.on_unit_complete(generation).unwrap();
        assert_eq!(e2, Some(ReaderEvent::Progress { index: 2, total: 3 }));
        assert_eq!(reader.position(), 2);

        let e3 = reader.on_unit_complete(generation).unwrap();
        assert_eq!(e3, Some(ReaderEvent::Finished));
        assert_eq!(reader.position(), 3);
        assert_eq!(reader.status(), ReaderStatus::Idle);

        let log = log.lock().unwrap();
        let texts: Vec<&str> = log.spoken.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(texts, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_stale_completion_after_stop_is_inert() {
        let (mut reader, _log) = reader();
        reader
            .start(units(&["A", "B"]), VoiceParams::default())
            .unwrap();
        let old_generation = reader.generation();

        reader.stop().unwrap();
        assert_eq!(reader.status(), ReaderStatus::Idle);
        assert_eq!(reader.position(), 0);

        let event = reader.on_unit_complete(old_generation).unwrap();
        assert_eq!(event, None);
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.status(), ReaderStatus::Idle);
    }

    #[test]
    fn test_stale_completion_after_restart_is_inert() {
        let (mut reader, log) = reader();
        reader
            .start(units(&["A", "B"]), VoiceParams::default())
            .unwrap();
        let old_generation = reader.generation();

        // New session supersedes the old one
        reader
            .start(units(&["X", "Y"]), VoiceParams::default())
            .unwrap();

        let event = reader.on_unit_complete(old_generation).unwrap();
        assert_eq!(event, None);
        assert_eq!(reader.position(), 0);

        // Only the live generation advances the cursor
        let live = reader.generation();
        let event = reader.on_unit_complete(live).unwrap();
        assert_eq!(event, Some(ReaderEvent::Progress { index: 1, total: 2 }));
        assert_eq!(log.lock().unwrap().spoken.last().unwrap().0, "Y");
    }

    #[test]
    fn test_stop_from_any_state_lands_idle() {
        let (mut reader, _log) = reader();

        // Idle
        reader.stop().unwrap();
        assert_eq!(reader.status(), ReaderStatus::Idle);
        assert_eq!(reader.position(), 0);

        // Reading
        reader
            .start(units(&["A", "B"]), VoiceParams::default())
            .unwrap();
        reader.stop().unwrap();
        assert_eq!(reader.status(), ReaderStatus::Idle);
        assert_eq!(reader.position(), 0);

        // Paused
        reader
            .start(units(&["A", "B"]), VoiceParams::default())
            .unwrap();
        reader.pause().unwrap();
        reader.stop().unwrap();
        assert_eq!(reader.status(), ReaderStatus::Idle);
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_pause_is_idempotent() {
        let (mut reader, log) = reader();
        reader.start(units(&["A"]), VoiceParams::default()).unwrap();

        reader.pause().unwrap();
        reader.pause().unwrap();

        assert_eq!(reader.status(), ReaderStatus::Paused);
        // The backend saw exactly one pause
        assert_eq!(log.lock().unwrap().pauses, 1);
    }

    #[test]
    fn test_resume_is_idempotent() {
        let (mut reader, log) = reader();
        reader.start(units(&["A"]), VoiceParams::default()).unwrap();
        reader.pause().unwrap();

        reader.resume().unwrap();
        reader.resume().unwrap();

        assert_eq!(reader.status(), ReaderStatus::Reading);
        assert_eq!(log.lock().unwrap().resumes, 1);
    }

    #[test]
    fn test_pause_when_idle_is_no_op() {
        let (mut reader, log) = reader();
        reader.pause().unwrap();
        reader.resume().unwrap();
        assert_eq!(reader.status(), ReaderStatus::Idle);
        assert_eq!(log.lock().unwrap().pauses, 0);
        assert_eq!(log.lock().unwrap().resumes, 0);
    }

    #[test]
    fn test_completion_while_paused_is_ignored() {
        let (mut reader, _log) = reader();
        reader
            .start(units(&["A", "B"]), VoiceParams::default())
            .unwrap();
        let generation = reader.generation();
        reader.pause().unwrap();

        let event = reader.on_unit_complete(generation).unwrap();
        assert_eq!(event, None);
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.status(), ReaderStatus::Paused);
    }

    #[test]
    fn test_blank_units_skipped() {
        let (mut reader, log) = reader();
        let event = reader
            .start(units(&["", "  ", "real text"]), VoiceParams::default())
            .unwrap();

        assert_eq!(event, ReaderEvent::Progress { index: 2, total: 3 });
        assert_eq!(log.lock().unwrap().spoken[0].0, "real text");
    }

    #[test]
    fn test_all_blank_units_finish_immediately() {
        let (mut reader, log) = reader();
        let event = reader
            .start(units(&["", "   "]), VoiceParams::default())
            .unwrap();

        assert_eq!(event, ReaderEvent::Finished);
        assert_eq!(reader.status(), ReaderStatus::Idle);
        assert!(log.lock().unwrap().spoken.is_empty());
    }

    #[test]
    fn test_read_one_is_a_session() {
        let (mut reader, log) = reader();
        let event = reader
            .read_one("  selected text  ", VoiceParams::default())
            .unwrap();

        assert_eq!(event, ReaderEvent::Progress { index: 0, total: 1 });
        assert_eq!(log.lock().unwrap().spoken[0].0, "selected text");

        // Uniform session semantics: completion finishes it
        let generation = reader.generation();
        let event = reader.on_unit_complete(generation).unwrap();
        assert_eq!(event, Some(ReaderEvent::Finished));
    }

    #[test]
    fn test_failed_speak_leaves_reader_idle() {
        let (mut backend, _log) = ScriptedBackend::new();
        backend.fail_speak = true;
        let mut reader = SequentialReader::new(Box::new(backend));

        let result = reader.start(units(&["A"]), VoiceParams::default());
        assert!(result.is_err());
        assert_eq!(reader.status(), ReaderStatus::Idle);
    }
}
