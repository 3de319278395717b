// Subprocess speech processor
// Spawns a platform TTS command per notification, bounded by a timeout.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use notifyd_core::domain::NotificationRequest;
use notifyd_core::port::{SpeechError, SpeechProcessor};

use crate::voices::VoiceCatalog;

/// Default upper bound on one synthesis + playback invocation (60s)
pub const DEFAULT_SPEECH_TIMEOUT: Duration = Duration::from_secs(60);

/// Baseline speaking rate in words per minute, scaled by the request's
/// rate multiplier.
const BASE_RATE_WPM: f64 = 175.0;

/// Command-line dialect of the TTS program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TtsFlavor {
    /// macOS `say`: `-v voice -r wpm`, volume embedded as `[[volm x]]`
    Say,
    /// `espeak`/`espeak-ng`: `-v voice -s wpm -a amplitude -p pitch`
    Espeak,
}

impl TtsFlavor {
    fn detect(program: &str) -> Self {
        let basename = program.rsplit('/').next().unwrap_or(program);
        // Exact match only: spd-say and other say-alikes take espeak-style
        // numeric flags, not the macOS dialect.
        if basename == "say" {
            TtsFlavor::Say
        } else {
            TtsFlavor::Espeak
        }
    }
}

/// Speaker configuration.
#[derive(Debug, Clone)]
pub struct SpeakerConfig {
    /// TTS program to spawn (`say`, `espeak`, `espeak-ng`, ...).
    pub program: String,
    /// Voice used when the request names none, or an unknown one.
    pub default_voice: String,
    /// Kill the subprocess if one invocation exceeds this.
    pub speech_timeout: Duration,
}

impl Default for SpeakerConfig {
    #[cfg(target_os = "macos")]
    fn default() -> Self {
        Self {
            program: "say".to_string(),
            default_voice: "Samantha".to_string(),
            speech_timeout: DEFAULT_SPEECH_TIMEOUT,
        }
    }

    #[cfg(not(target_os = "macos"))]
    fn default() -> Self {
        Self {
            program: "espeak".to_string(),
            default_voice: "en".to_string(),
            speech_timeout: DEFAULT_SPEECH_TIMEOUT,
        }
    }
}

/// Speech processor that spawns one TTS subprocess per notification.
///
/// Playback is inherently sequential because the queue invokes this once at
/// a time; the speaker itself keeps no state across calls.
pub struct SubprocessSpeaker {
    config: SpeakerConfig,
    catalog: VoiceCatalog,
    flavor: TtsFlavor,
}

impl SubprocessSpeaker {
    pub fn new(config: SpeakerConfig) -> Self {
        let flavor = TtsFlavor::detect(&config.program);
        let catalog = match flavor {
            TtsFlavor::Say => VoiceCatalog::for_say(config.default_voice.clone()),
            TtsFlavor::Espeak => VoiceCatalog::for_espeak(config.default_voice.clone()),
        };
        Self {
            config,
            catalog,
            flavor,
        }
    }

    pub fn with_catalog(config: SpeakerConfig, catalog: VoiceCatalog) -> Self {
        let flavor = TtsFlavor::detect(&config.program);
        Self {
            config,
            catalog,
            flavor,
        }
    }

    /// Build the argument vector for one request. Text is always the final
    /// argument, passed as-is (never through a shell).
    fn build_args(&self, request: &NotificationRequest) -> Vec<String> {
        let voice = self.catalog.resolve(request.voice.as_deref());
        let rate_wpm = (BASE_RATE_WPM * request.rate.unwrap_or(1.0)).round() as i64;

        let mut args = vec!["-v".to_string(), voice];
        match self.flavor {
            TtsFlavor::Say => {
                args.push("-r".to_string());
                args.push(rate_wpm.to_string());
                // `say` has no volume flag; prepend an inline volume directive
                let text = match request.volume {
                    Some(volume) => format!("[[volm {:.2}]] {}", volume, request.text),
                    None => request.text.clone(),
                };
                args.push(text);
            }
            TtsFlavor::Espeak => {
                args.push("-s".to_string());
                args.push(rate_wpm.to_string());
                if let Some(volume) = request.volume {
                    // espeak amplitude is 0..=200, default 100
                    args.push("-a".to_string());
                    args.push(((volume * 200.0).round() as i64).to_string());
                }
                if let Some(pitch) = request.pitch {
                    // espeak pitch is 0..=99, default 50
                    args.push("-p".to_string());
                    args.push(((pitch * 50.0).round() as i64).min(99).to_string());
                }
                args.push(request.text.clone());
            }
        }
        args
    }
}

#[async_trait]
impl SpeechProcessor for SubprocessSpeaker {
    async fn speak(&self, request: &NotificationRequest) -> Result<(), SpeechError> {
        let args = self.build_args(request);
        debug!(program = %self.config.program, ?args, "Spawning TTS subprocess");

        let child = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SpeechError::SpawnFailed(format!("{}: {}", self.config.program, e)))?;

        // kill_on_drop reaps the child when the timeout branch drops it
        let output = timeout(self.config.speech_timeout, child.wait_with_output())
            .await
            .map_err(|_| SpeechError::Timeout(self.config.speech_timeout.as_millis() as i64))?
            .map_err(|e| SpeechError::IoError(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpeechError::SynthesisFailed(format!(
                "{} exited with {}: {}",
                self.config.program,
                output.status,
                stderr.trim()
            )));
        }

        info!(chars = request.text.chars().count(), "Playback finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn say_speaker() -> SubprocessSpeaker {
        SubprocessSpeaker::new(SpeakerConfig {
            program: "say".to_string(),
            default_voice: "Samantha".to_string(),
            speech_timeout: DEFAULT_SPEECH_TIMEOUT,
        })
    }

    fn espeak_speaker() -> SubprocessSpeaker {
        SubprocessSpeaker::new(SpeakerConfig {
            program: "espeak".to_string(),
            default_voice: "en".to_string(),
            speech_timeout: DEFAULT_SPEECH_TIMEOUT,
        })
    }

    #[test]
    fn detects_flavor_from_program_path() {
        assert_eq!(TtsFlavor::detect("/usr/bin/say"), TtsFlavor::Say);
        assert_eq!(TtsFlavor::detect("say"), TtsFlavor::Say);
        assert_eq!(TtsFlavor::detect("espeak-ng"), TtsFlavor::Espeak);
        // Only the exact macOS binary gets the say dialect
        assert_eq!(TtsFlavor::detect("spd-say"), TtsFlavor::Espeak);
        assert_eq!(TtsFlavor::detect("/usr/local/bin/mysay"), TtsFlavor::Espeak);
    }

    #[test]
    fn say_alike_programs_get_espeak_style_args() {
        let speaker = SubprocessSpeaker::new(SpeakerConfig {
            program: "spd-say".to_string(),
            default_voice: "en".to_string(),
            speech_timeout: DEFAULT_SPEECH_TIMEOUT,
        });
        let request = NotificationRequest {
            text: "disk almost full".to_string(),
            voice: None,
            volume: Some(0.5),
            rate: None,
            pitch: None,
        };
        let args = speaker.build_args(&request);
        // No [[volm]] directive and no -r flag; volume maps to amplitude
        assert_eq!(args, vec!["-v", "en", "-s", "175", "-a", "100", "disk almost full"]);
    }

    #[test]
    fn say_args_include_voice_rate_and_volume_directive() {
        let request = NotificationRequest {
            text: "deploy complete".to_string(),
            voice: Some("daniel".to_string()),
            volume: Some(0.5),
            rate: Some(2.0),
            pitch: None,
        };
        let args = say_speaker().build_args(&request);
        assert_eq!(args[0], "-v");
        assert_eq!(args[1], "Daniel");
        assert_eq!(args[2], "-r");
        assert_eq!(args[3], "350");
        assert_eq!(args[4], "[[volm 0.50]] deploy complete");
    }

    #[test]
    fn espeak_args_scale_amplitude_and_pitch() {
        let request = NotificationRequest {
            text: "tests passed".to_string(),
            voice: None,
            volume: Some(1.0),
            rate: None,
            pitch: Some(2.0),
        };
        let args = espeak_speaker().build_args(&request);
        assert_eq!(args, vec!["-v", "en", "-s", "175", "-a", "200", "-p", "99", "tests passed"]);
    }

    #[test]
    fn unknown_voice_resolves_to_default_in_args() {
        let request = NotificationRequest {
            text: "hello".to_string(),
            voice: Some("martian".to_string()),
            volume: None,
            rate: None,
            pitch: None,
        };
        let args = say_speaker().build_args(&request);
        assert_eq!(args[1], "Samantha");
    }
}
