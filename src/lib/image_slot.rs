//! Per-section illustration slots.
//!
//! Every section owns one image slot. A slot starts either empty (the
//! built-in placeholder is shown) or, for the introduction, pre-populated
//! with a configured image reference. From there it can be replaced by an
//! AI-generated image or by a file the user picks.
//!
//! ```text
//!              begin_generation          complete_generation(Ok)
//!   Empty ─────────────────────▶ Loading ─────────────────────▶ Populated
//!     │                            │      complete_generation(Err)
//!     │                            └───────────────────────────▶ Error
//!     │  upload(ok) / upload(corrupt)
//!     └──────────────▶ Populated / Error   (also from Populated and Error)
//! ```
//!
//! Only one image is kept per slot. A successful operation always clears a
//! previous error. While a generation is in flight a second one is refused,
//! so two responses can never race for the same slot.

use crate::generator::{
    Credential, GeneratedImage, GenerationError, GenerationRequest, ImageGenerator, DEFAULT_MODEL,
};
use crate::images::{decode_upload, read_upload, ImageError};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Id of the introduction slot, the only one that may start pre-populated.
pub const INTRO_SLOT: &str = "intro";

/// Prompt used for sections without a registered one.
pub const GENERIC_PROMPT: &str = "A warm, minimal watercolor illustration in soft ivory, sage green and \
stone tones, evoking quiet self-reflection at the end of a year. No text.";

/// Display state of one slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSlotState {
    /// URI or `data:` reference of the image on display.
    pub current_image: Option<String>,
    pub is_loading: bool,
    /// Short user-facing message from the last failed operation.
    pub error: Option<String>,
}

/// Coarse phase of a slot, derived from [`ImageSlotState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotPhase {
    Empty,
    Loading,
    Populated,
    Error,
}

impl ImageSlotState {
    pub fn with_image(uri: impl Into<String>) -> Self {
        ImageSlotState {
            current_image: Some(uri.into()),
            is_loading: false,
            error: None,
        }
    }

    pub fn phase(&self) -> SlotPhase {
        if self.is_loading {
            SlotPhase::Loading
        } else if self.error.is_some() {
            SlotPhase::Error
        } else if self.current_image.is_some() {
            SlotPhase::Populated
        } else {
            SlotPhase::Empty
        }
    }

    fn succeed(&mut self, uri: String) {
        self.current_image = Some(uri);
        self.error = None;
    }
}

/// Errors raised by slot operations. Each one is also recorded on the slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotError {
    /// Generation was requested but no API key is configured.
    MissingCredential,
    /// A generation for this slot is still pending.
    AlreadyInFlight(String),
    /// A completion arrived for a slot with nothing pending.
    NotInFlight(String),
    /// The generation service failed or returned no image.
    GenerationFailed(GenerationError),
    /// The uploaded file could not be read or decoded.
    FileReadFailed(String),
}

impl SlotError {
    /// Short message shown inline in the affected section.
    pub fn user_message(&self) -> String {
        match self {
            SlotError::MissingCredential => {
                "Image generation is not configured: set GEMINI_API_KEY to enable it.".to_string()
            }
            SlotError::AlreadyInFlight(_) => "An image is already being generated.".to_string(),
            SlotError::NotInFlight(_) => "No image generation was pending.".to_string(),
            SlotError::GenerationFailed(e) => format!("Image generation failed. {}", e),
            SlotError::FileReadFailed(e) => format!("Could not read the selected file. {}", e),
        }
    }
}

impl fmt::Display for SlotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotError::AlreadyInFlight(id) => {
                write!(f, "generation already in flight for section '{}'", id)
            }
            SlotError::NotInFlight(id) => write!(f, "no generation pending for section '{}'", id),
            other => f.write_str(&other.user_message()),
        }
    }
}

impl std::error::Error for SlotError {}

impl From<ImageError> for SlotError {
    fn from(e: ImageError) -> Self {
        SlotError::FileReadFailed(e.to_string())
    }
}

/// Static inputs of the slot machine: starting image and prompt registry.
#[derive(Debug, Clone)]
pub struct SlotConfig {
    /// Pre-supplied image of the introduction slot.
    pub intro_image: Option<String>,
    pub model: String,
    pub generic_prompt: String,
    /// Generation prompt per section id.
    pub prompts: HashMap<String, String>,
}

impl Default for SlotConfig {
    fn default() -> Self {
        SlotConfig {
            intro_image: None,
            model: DEFAULT_MODEL.to_string(),
            generic_prompt: GENERIC_PROMPT.to_string(),
            prompts: HashMap::new(),
        }
    }
}

/// All image slots of a page, keyed by section id.
#[derive(Debug, Clone, Default)]
pub struct ImageSlots {
    config: SlotConfig,
    states: HashMap<String, ImageSlotState>,
}

impl ImageSlots {
    pub fn new(config: SlotConfig) -> Self {
        ImageSlots {
            config,
            states: HashMap::new(),
        }
    }

    /// The state a slot starts in.
    pub fn initial_state(&self, section_id: &str) -> ImageSlotState {
        match (&self.config.intro_image, section_id) {
            (Some(uri), INTRO_SLOT) => ImageSlotState::with_image(uri.clone()),
            _ => ImageSlotState::default(),
        }
    }

    /// Resets a slot to its starting state and returns it.
    pub fn initialize(&mut self, section_id: &str) -> ImageSlotState {
        let state = self.initial_state(section_id);
        self.states.insert(section_id.to_string(), state.clone());
        state
    }

    /// Current state of a slot; untouched slots report their starting state.
    pub fn state(&self, section_id: &str) -> ImageSlotState {
        self.states
            .get(section_id)
            .cloned()
            .unwrap_or_else(|| self.initial_state(section_id))
    }

    fn slot_mut(&mut self, section_id: &str) -> &mut ImageSlotState {
        if !self.states.contains_key(section_id) {
            self.initialize(section_id);
        }
        self.states.entry(section_id.to_string()).or_default()
    }

    /// Prompt registered for the section, or the generic fallback.
    pub fn prompt_for(&self, section_id: &str) -> &str {
        self.config
            .prompts
            .get(section_id)
            .map(String::as_str)
            .unwrap_or(self.config.generic_prompt.as_str())
    }

    /// First half of a generation: checks preconditions and marks the slot as loading.
    ///
    /// Without a credential the request is refused before anything goes on
    /// the wire and the slot shows the reason. While another generation is
    /// pending the call is refused and the slot is left untouched.
    pub fn begin_generation(
        &mut self,
        section_id: &str,
        credential: Option<&Credential>,
    ) -> Result<GenerationRequest, SlotError> {
        if self.state(section_id).is_loading {
            debug!("[slots] '{}' already loading, ignoring request", section_id);
            return Err(SlotError::AlreadyInFlight(section_id.to_string()));
        }

        if credential.is_none() {
            let err = SlotError::MissingCredential;
            warn!("Cannot generate image for '{}': {}", section_id, err);
            self.slot_mut(section_id).error = Some(err.user_message());
            return Err(err);
        }

        let request = GenerationRequest {
            section_id: section_id.to_string(),
            model: self.config.model.clone(),
            prompt: self.prompt_for(section_id).to_string(),
        };
        let slot = self.slot_mut(section_id);
        slot.is_loading = true;
        slot.error = None;
        Ok(request)
    }

    /// Second half of a generation: applies the service outcome to the slot.
    pub fn complete_generation(
        &mut self,
        section_id: &str,
        outcome: Result<GeneratedImage, GenerationError>,
    ) -> Result<(), SlotError> {
        if !self.state(section_id).is_loading {
            warn!("Dropping generation result for '{}': nothing pending", section_id);
            return Err(SlotError::NotInFlight(section_id.to_string()));
        }

        let slot = self.slot_mut(section_id);
        slot.is_loading = false;
        match outcome {
            Ok(image) => {
                info!("Generated image for section '{}'", section_id);
                slot.succeed(image.to_data_uri());
                Ok(())
            }
            Err(e) => {
                let err = SlotError::GenerationFailed(e);
                warn!("Image generation for '{}' failed: {}", section_id, err);
                slot.error = Some(err.user_message());
                Err(err)
            }
        }
    }

    /// Runs a full generation synchronously against `generator`.
    pub fn generate(
        &mut self,
        section_id: &str,
        credential: Option<&Credential>,
        generator: &dyn ImageGenerator,
    ) -> Result<(), SlotError> {
        let request = self.begin_generation(section_id, credential)?;
        let outcome = generator.generate(&request);
        self.complete_generation(section_id, outcome)
    }

    /// Replaces the slot image with an uploaded file.
    ///
    /// Decoding happens locally, so there is no loading phase. On failure the
    /// previous image stays on display and the slot records the error.
    pub fn upload(
        &mut self,
        section_id: &str,
        bytes: &[u8],
        name_hint: Option<&str>,
    ) -> Result<(), SlotError> {
        let decoded = decode_upload(bytes, name_hint);
        self.apply_upload(section_id, decoded)
    }

    /// Reads `path` and uploads it into the slot.
    pub fn upload_file(&mut self, section_id: &str, path: &Path) -> Result<(), SlotError> {
        let decoded = read_upload(path);
        self.apply_upload(section_id, decoded)
    }

    fn apply_upload(
        &mut self,
        section_id: &str,
        decoded: Result<crate::images::ImageData, ImageError>,
    ) -> Result<(), SlotError> {
        let slot = self.slot_mut(section_id);
        match decoded {
            Ok(image) => {
                info!(
                    "Using uploaded {} for section '{}'",
                    image.format.mime_type(),
                    section_id
                );
                slot.succeed(image.to_data_uri());
                Ok(())
            }
            Err(e) => {
                let err = SlotError::from(e);
                warn!("Upload for '{}' rejected: {}", section_id, err);
                slot.error = Some(err.user_message());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::tests::tiny_png;
    use std::cell::Cell;

    struct CountingGenerator {
        calls: Cell<usize>,
        outcome: Result<GeneratedImage, GenerationError>,
    }

    impl CountingGenerator {
        fn ok() -> Self {
            CountingGenerator {
                calls: Cell::new(0),
                outcome: Ok(GeneratedImage {
                    mime_type: "image/png".to_string(),
                    data_base64: "iVBORw0KGgo=".to_string(),
                }),
            }
        }

        fn failing(e: GenerationError) -> Self {
            CountingGenerator {
                calls: Cell::new(0),
                outcome: Err(e),
            }
        }
    }

    impl ImageGenerator for CountingGenerator {
        fn generate(&self, _: &GenerationRequest) -> Result<GeneratedImage, GenerationError> {
            self.calls.set(self.calls.get() + 1);
            self.outcome.clone()
        }
    }

    fn key() -> Credential {
        Credential::new("test-key").unwrap()
    }

    fn slots() -> ImageSlots {
        let mut prompts = HashMap::new();
        prompts.insert("self".to_string(), "a toothbrush and a cup of tea".to_string());
        ImageSlots::new(SlotConfig {
            intro_image: Some("https://example.com/intro.png".to_string()),
            prompts,
            ..SlotConfig::default()
        })
    }

    #[test]
    fn test_initial_states() {
        let mut slots = slots();
        let intro = slots.initialize(INTRO_SLOT);
        assert_eq!(intro.current_image.as_deref(), Some("https://example.com/intro.png"));
        assert_eq!(intro.phase(), SlotPhase::Populated);

        let other = slots.initialize("career");
        assert_eq!(other, ImageSlotState::default());
        assert_eq!(other.phase(), SlotPhase::Empty);
    }

    #[test]
    fn test_prompt_lookup_falls_back_to_generic() {
        let slots = slots();
        assert_eq!(slots.prompt_for("self"), "a toothbrush and a cup of tea");
        assert_eq!(slots.prompt_for("finance"), GENERIC_PROMPT);
    }

    #[test]
    fn test_generation_success_populates_slot() {
        let mut slots = slots();
        let generator = CountingGenerator::ok();
        slots.generate("self", Some(&key()), &generator).unwrap();

        let state = slots.state("self");
        assert_eq!(state.phase(), SlotPhase::Populated);
        assert_eq!(state.current_image.as_deref(), Some("data:image/png;base64,iVBORw0KGgo="));
        assert_eq!(generator.calls.get(), 1);
    }

    #[test]
    fn test_second_generation_while_in_flight_is_refused() {
        let mut slots = slots();
        let generator = CountingGenerator::ok();

        let request = slots.begin_generation("self", Some(&key())).unwrap();
        assert_eq!(request.prompt, "a toothbrush and a cup of tea");
        assert!(slots.state("self").is_loading);

        let second = slots.generate("self", Some(&key()), &generator);
        assert_eq!(second, Err(SlotError::AlreadyInFlight("self".to_string())));
        assert_eq!(generator.calls.get(), 0);
        assert!(slots.state("self").is_loading);

        let outcome = generator.generate(&request);
        slots.complete_generation("self", outcome).unwrap();
        assert_eq!(generator.calls.get(), 1);
        let state = slots.state("self");
        assert!(!state.is_loading);
        assert_eq!(state.phase(), SlotPhase::Populated);
    }

    #[test]
    fn test_missing_credential_refuses_before_network() {
        let mut slots = slots();
        let generator = CountingGenerator::ok();
        let result = slots.generate("career", None, &generator);

        assert_eq!(result, Err(SlotError::MissingCredential));
        assert_eq!(generator.calls.get(), 0);
        let state = slots.state("career");
        assert!(!state.is_loading);
        assert!(state.error.as_deref().unwrap().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_generation_failure_sets_error_and_keeps_image() {
        let mut slots = slots();
        let generator = CountingGenerator::failing(GenerationError::EmptyResponse);
        let result = slots.generate(INTRO_SLOT, Some(&key()), &generator);

        assert!(matches!(result, Err(SlotError::GenerationFailed(_))));
        let state = slots.state(INTRO_SLOT);
        assert!(!state.is_loading);
        assert_eq!(state.phase(), SlotPhase::Error);
        assert_eq!(state.current_image.as_deref(), Some("https://example.com/intro.png"));
    }

    #[test]
    fn test_success_after_error_clears_error() {
        let mut slots = slots();
        let _ = slots.generate("health", None, &CountingGenerator::ok());
        assert_eq!(slots.state("health").phase(), SlotPhase::Error);

        slots
            .generate("health", Some(&key()), &CountingGenerator::ok())
            .unwrap();
        let state = slots.state("health");
        assert_eq!(state.error, None);
        assert_eq!(state.phase(), SlotPhase::Populated);
    }

    #[test]
    fn test_loading_clears_previous_error() {
        let mut slots = slots();
        let _ = slots.upload("next", b"garbage", Some("bad.png"));
        assert!(slots.state("next").error.is_some());

        slots.begin_generation("next", Some(&key())).unwrap();
        let state = slots.state("next");
        assert!(state.is_loading);
        assert_eq!(state.error, None);
        assert_eq!(state.phase(), SlotPhase::Loading);
    }

    #[test]
    fn test_stray_completion_is_rejected() {
        let mut slots = slots();
        let result = slots.complete_generation("next", Err(GenerationError::EmptyResponse));
        assert_eq!(result, Err(SlotError::NotInFlight("next".to_string())));
        assert_eq!(slots.state("next"), ImageSlotState::default());
    }

    #[test]
    fn test_upload_valid_png() {
        let mut slots = slots();
        slots.upload("finance", &tiny_png(), Some("me.png")).unwrap();
        let state = slots.state("finance");
        assert!(state.current_image.unwrap().starts_with("data:image/png;base64,"));
        assert!(!state.is_loading);
    }

    #[test]
    fn test_corrupt_upload_keeps_previous_image() {
        let mut slots = slots();
        let before = slots.state(INTRO_SLOT).current_image;

        let result = slots.upload(INTRO_SLOT, b"\x89PNG\r\n\x1a\nbroken", Some("bad.png"));
        assert!(matches!(result, Err(SlotError::FileReadFailed(_))));

        let state = slots.state(INTRO_SLOT);
        assert_eq!(state.current_image, before);
        assert!(!state.error.unwrap().is_empty());
    }

    #[test]
    fn test_upload_after_error_clears_it() {
        let mut slots = slots();
        let _ = slots.upload("mechanism", b"garbage", None);
        assert_eq!(slots.state("mechanism").phase(), SlotPhase::Error);

        slots.upload("mechanism", &tiny_png(), None).unwrap();
        assert_eq!(slots.state("mechanism").phase(), SlotPhase::Populated);
    }

    #[test]
    fn test_upload_missing_file() {
        let mut slots = slots();
        let result = slots.upload_file("self", Path::new("no/such/file.png"));
        assert!(matches!(result, Err(SlotError::FileReadFailed(_))));
        assert_eq!(slots.state("self").current_image, None);
    }

    #[test]
    fn test_slots_are_independent() {
        let mut slots = slots();
        slots.begin_generation("self", Some(&key())).unwrap();
        slots.upload("career", &tiny_png(), None).unwrap();

        assert!(slots.state("self").is_loading);
        assert!(!slots.state("career").is_loading);
        assert_eq!(slots.state("health"), ImageSlotState::default());
    }
}
