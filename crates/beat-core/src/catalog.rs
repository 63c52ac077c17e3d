//! # Beat Catalog
//!
//! Catalog types for the beat store. The catalog maps a sellable beat id to
//! its file locations and display name. It is deserialized once at startup
//! from `config/catalog.toml` and never mutated afterwards; components that
//! need lookups receive it explicitly.

use serde::{Deserialize, Serialize};

/// A sellable beat in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Beat {
    /// Unique beat identifier (e.g., "beat1")
    pub id: String,

    /// Display name shown to buyers (e.g., "GN1")
    pub name: String,

    /// Location of the primary WAV file
    pub wav_url: String,

    /// Location of the stems archive, if one exists for this beat
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stems_url: Option<String>,
}

impl Beat {
    /// Create a new beat entry
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        wav_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            wav_url: wav_url.into(),
            stems_url: None,
        }
    }

    /// Builder: set the stems archive location
    pub fn with_stems(mut self, url: impl Into<String>) -> Self {
        self.stems_url = Some(url.into());
        self
    }

    /// Filename used when attaching the WAV to a fulfillment email
    pub fn wav_filename(&self) -> String {
        format!("{}.wav", self.name)
    }

    /// Filename used when attaching the stems archive
    pub fn stems_filename(&self) -> String {
        format!("{}_Stems.zip", self.name)
    }
}

/// Immutable catalog of sellable beats (loaded from config)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BeatCatalog {
    pub beats: Vec<Beat>,
}

impl BeatCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self { beats: Vec::new() }
    }

    /// Add a beat to the catalog
    pub fn add(&mut self, beat: Beat) {
        self.beats.push(beat);
    }

    /// Builder: add a beat
    pub fn with_beat(mut self, beat: Beat) -> Self {
        self.add(beat);
        self
    }

    /// Find a beat by id
    pub fn get(&self, id: &str) -> Option<&Beat> {
        self.beats.iter().find(|b| b.id == id)
    }

    /// Number of beats in the catalog
    pub fn len(&self) -> usize {
        self.beats.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.beats.is_empty()
    }

    /// Load catalog from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}
