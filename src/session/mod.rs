//! Session state
//!
//! One [`ReaderSession`] owns everything mutable: the configuration, the
//! loaded document, the unit sequence, the current voice parameters and the
//! reader itself. The UI layer gets a session injected instead of touching
//! ambient state.

pub mod config;

pub use config::Config;

use crate::document::{Document, DocumentLoader, Page};
use crate::reader::{ReaderEvent, SequentialReader};
use crate::search;
use crate::segment::{self, ReadingUnit, SegmentMode};
use crate::speech::{CompletionSignal, SpeechBackend, VoiceInfo, VoiceParams};
use crate::{LectorError, Result};
use log::info;
use serde::Serialize;

/// JSON export of the extracted document
#[derive(Serialize)]
struct DocumentExport<'a> {
    page_count: usize,
    mode: &'static str,
    pages: &'a [Page],
    units: &'a [ReadingUnit],
}

/// Owned state for one document-reading lifecycle
pub struct ReaderSession {
    pub config: Config,
    loader: Box<dyn DocumentLoader>,
    reader: SequentialReader,
    document: Option<Document>,
    units: Vec<ReadingUnit>,
    mode: SegmentMode,
    params: VoiceParams,
}

impl ReaderSession {
    /// Create a session from loaded configuration
    pub fn new(
        config: Config,
        loader: Box<dyn DocumentLoader>,
        backend: Box<dyn SpeechBackend>,
    ) -> Self {
        let mode = config.mode();
        let params = config.voice_params();
        info!(
            "Session created: mode {}, rate {}, pitch {}",
            mode.name(),
            params.rate,
            params.pitch
        );

        Self {
            config,
            loader,
            reader: SequentialReader::new(backend),
            document: None,
            units: Vec::new(),
            mode,
            params,
        }
    }

    /// Load a new document from raw bytes, replacing the previous one
    ///
    /// Stops any reading in progress and re-segments. On failure the
    /// previous document and units stay exactly as they were.
    pub fn load(&mut self, bytes: &[u8]) -> Result<usize> {
        let document = self.loader.load(bytes).map_err(LectorError::Load)?;

        self.reader.stop()?;
        self.units = segment::segment(&document.page_texts(), self.mode);
        self.document = Some(document);
        info!(
            "Document loaded: {} pages, {} units in {} mode",
            self.document.as_ref().map(|d| d.page_count()).unwrap_or(0),
            self.units.len(),
            self.mode.name()
        );
        Ok(self.units.len())
    }

    /// Discard the current document and reset the reader
    pub fn clear(&mut self) -> Result<()> {
        self.reader.stop()?;
        self.document = None;
        self.units.clear();
        Ok(())
    }

    /// Change the segment mode, re-segmenting the current document
    pub fn set_mode(&mut self, mode: SegmentMode) -> Result<usize> {
        self.reader.stop()?;
        self.mode = mode;
        if let Some(ref document) = self.document {
            self.units = segment::segment(&document.page_texts(), mode);
        }
        self.config.set("reader", "mode", mode.name());
        self.config.save()?;
        Ok(self.units.len())
    }

    /// Read the whole unit sequence from the beginning
    pub fn read_all(&mut self) -> Result<ReaderEvent> {
        self.reader.start(self.units.clone(), self.params.clone())
    }

    /// Read an ad-hoc selection as a one-element session
    pub fn read_selection(&mut self, text: &str) -> Result<ReaderEvent> {
        self.reader.read_one(text, self.params.clone())
    }

    pub fn pause(&mut self) -> Result<()> {
        self.reader.pause()
    }

    pub fn resume(&mut self) -> Result<()> {
        self.reader.resume()
    }

    pub fn stop(&mut self) -> Result<()> {
        self.reader.stop()
    }

    /// Feed a speech completion signal through to the reader
    pub fn on_speech_complete(&mut self, signal: CompletionSignal) -> Result<Option<ReaderEvent>> {
        self.reader.on_unit_complete(signal.generation)
    }

    /// Unit indices matching a search keyword
    pub fn search(&self, keyword: &str) -> Vec<usize> {
        search::filter(&self.units, keyword)
    }

    /// Current platform voice list
    pub fn voices(&self) -> Result<Vec<VoiceInfo>> {
        self.reader.voices()
    }

    /// Set the speech rate multiplier and persist it
    pub fn set_rate(&mut self, rate: f32) -> Result<()> {
        crate::speech::params::validate_scale("rate", rate)?;
        self.params.rate = rate;
        self.config.set("speech", "rate", &rate.to_string());
        self.config.save()
    }

    /// Set the speech pitch multiplier and persist it
    pub fn set_pitch(&mut self, pitch: f32) -> Result<()> {
        crate::speech::params::validate_scale("pitch", pitch)?;
        self.params.pitch = pitch;
        self.config.set("speech", "pitch", &pitch.to_string());
        self.config.save()
    }

    /// Select a voice by id and persist it
    ///
    /// The id must be present in the current platform voice list.
    pub fn set_voice(&mut self, voice_id: &str) -> Result<()> {
        let known = self.voices()?;
        if !known.iter().any(|v| v.id == voice_id) {
            return Err(LectorError::InvalidArgument(format!(
                "unknown voice id: {}",
                voice_id
            )));
        }
        self.params.voice_id = Some(voice_id.to_string());
        self.config.set("speech", "voice", voice_id);
        self.config.save()
    }

    /// Export the extracted document and unit sequence as JSON
    pub fn export_json(&self) -> Result<String> {
        let document = self
            .document
            .as_ref()
            .ok_or_else(|| LectorError::InvalidArgument("no document loaded".to_string()))?;

        let export = DocumentExport {
            page_count: document.page_count(),
            mode: self.mode.name(),
            pages: &document.pages,
            units: &self.units,
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }

    // Accessors for the UI layer

    pub fn reader(&self) -> &SequentialReader {
        &self.reader
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    pub fn units(&self) -> &[ReadingUnit] {
        &self.units
    }

    pub fn unit_text(&self, index: usize) -> Option<&str> {
        self.units.get(index).map(|u| u.text.as_str())
    }

    pub fn mode(&self) -> SegmentMode {
        self.mode
    }

    pub fn params(&self) -> &VoiceParams {
        &self.params
    }
}
