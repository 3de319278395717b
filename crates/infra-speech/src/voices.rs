// Voice catalog with graceful fallback
//
// An unrecognized voice passes admission and falls through to the default
// here at processing time; the request is spoken rather than dropped.

use std::collections::HashMap;
use tracing::warn;

/// Maps friendly voice names to platform voice identifiers.
#[derive(Debug, Clone)]
pub struct VoiceCatalog {
    default_voice: String,
    voices: HashMap<String, String>,
}

impl VoiceCatalog {
    pub fn new(default_voice: impl Into<String>) -> Self {
        Self {
            default_voice: default_voice.into(),
            voices: HashMap::new(),
        }
    }

    /// Catalog for the macOS `say` command.
    pub fn for_say(default_voice: impl Into<String>) -> Self {
        let mut catalog = Self::new(default_voice);
        for name in ["Samantha", "Alex", "Daniel", "Karen", "Moira", "Fred"] {
            catalog.register(name.to_lowercase(), name);
        }
        catalog
    }

    /// Catalog for `espeak`-style commands.
    pub fn for_espeak(default_voice: impl Into<String>) -> Self {
        let mut catalog = Self::new(default_voice);
        for code in ["en", "en-us", "en-gb", "de", "fr", "es", "it"] {
            catalog.register(code, code);
        }
        catalog
    }

    /// Register an alias (matched case-insensitively).
    pub fn register(&mut self, alias: impl Into<String>, platform_name: impl Into<String>) {
        self.voices
            .insert(alias.into().to_lowercase(), platform_name.into());
    }

    pub fn default_voice(&self) -> &str {
        &self.default_voice
    }

    /// Resolve a requested voice to a platform identifier.
    ///
    /// Unknown names fall back to the default voice with a warning.
    pub fn resolve(&self, requested: Option<&str>) -> String {
        match requested {
            None => self.default_voice.clone(),
            Some(name) => match self.voices.get(&name.to_lowercase()) {
                Some(platform_name) => platform_name.clone(),
                None => {
                    warn!(
                        requested = %name,
                        fallback = %self.default_voice,
                        "Unknown voice, falling back to default"
                    );
                    self.default_voice.clone()
                }
            },
        }
    }
}
