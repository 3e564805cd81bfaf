use async_trait::async_trait;
use crate::speech::engine::{EngineStatus, SpeechEngine, SpeechError, SpeechResult};
use crate::speech::narrator::{Utterance, Voice};
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::{debug, info};

/// Programs probed, in order, when no override is configured
pub const DEFAULT_PROGRAMS: &[&str] = &["espeak-ng", "espeak"];

const BASE_PITCH: f32 = 50.0;
const BASE_WPM: f32 = 175.0;
const BASE_AMPLITUDE: f32 = 100.0;

/// Speech engine backed by an espeak-compatible command line synthesizer
///
/// Each utterance is a separate child process; halting kills it.
pub struct EspeakEngine {
    name: String,
    candidates: Vec<String>,
    program: Option<String>,
    status: EngineStatus,
    current: Option<Child>,
}

impl EspeakEngine {
    /// Create an engine probing the default programs
    pub fn new() -> Self {
        Self::with_candidates(DEFAULT_PROGRAMS.iter().map(|p| p.to_string()).collect())
    }

    /// Create an engine that only tries `program`
    pub fn with_program(program: &str) -> Self {
        Self::with_candidates(vec![program.to_string()])
    }

    fn with_candidates(candidates: Vec<String>) -> Self {
        Self {
            name: candidates.first().cloned().unwrap_or_default(),
            candidates,
            program: None,
            status: EngineStatus::Disconnected,
            current: None,
        }
    }

    fn program(&self) -> SpeechResult<&str> {
        self.program.as_deref().ok_or(SpeechError::NotConnected)
    }
}

impl Default for EspeakEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Command line arguments for one utterance
pub fn speak_args(utterance: &Utterance, voice: Option<&Voice>) -> Vec<String> {
    let pitch = (utterance.pitch * BASE_PITCH).round().clamp(0.0, 99.0) as u32;
    let wpm = (utterance.rate * BASE_WPM).round().clamp(80.0, 450.0) as u32;
    let amplitude = (utterance.volume * BASE_AMPLITUDE).round().clamp(0.0, 200.0) as u32;

    let mut args = vec![
        "-p".to_string(),
        pitch.to_string(),
        "-s".to_string(),
        wpm.to_string(),
        "-a".to_string(),
        amplitude.to_string(),
    ];
    // espeak selects voices by language code, the display name is not accepted
    if let Some(voice) = voice {
        args.push("-v".to_string());
        args.push(voice.lang.clone());
    }
    args.push("--".to_string());
    args.push(utterance.text.clone());
    args
}

/// Parse the table printed by `espeak --voices`
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  en-us           --/M      English_(America)  gmw/en-US            (en 10)
/// ```
pub fn parse_voice_list(output: &str) -> Vec<Voice> {
    output
        .lines()
        .skip_while(|line| !line.trim_start().starts_with("Pty"))
        .skip(1)
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            match cols.as_slice() {
                [_pty, lang, _age_gender, name, ..] => Some(Voice::new(name, lang)),
                _ => None,
            }
        })
        .collect()
}

#[async_trait]
impl SpeechEngine for EspeakEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn status(&self) -> EngineStatus {
        self.status
    }

    async fn connect(&mut self) -> SpeechResult<()> {
        self.status = EngineStatus::Connecting;

        for candidate in &self.candidates {
            let probe = Command::new(candidate)
                .arg("--version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await;

            match probe {
                Ok(status) if status.success() => {
                    info!("Using speech program '{}'", candidate);
                    self.name = candidate.clone();
                    self.program = Some(candidate.clone());
                    self.status = EngineStatus::Connected;
                    return Ok(());
                }
                Ok(status) => debug!("Speech program '{}' exited with {}", candidate, status),
                Err(e) => debug!("Speech program '{}' not usable: {}", candidate, e),
            }
        }

        self.status = EngineStatus::Unavailable;
        Err(SpeechError::Unavailable(self.candidates.join(", ")))
    }

    async fn voices(&mut self) -> SpeechResult<Vec<Voice>> {
        let program = self.program()?.to_string();
        let output = Command::new(&program)
            .arg("--voices")
            .stderr(Stdio::null())
            .output()
            .await?;
        Ok(parse_voice_list(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn begin(&mut self, utterance: &Utterance, voice: Option<&Voice>) -> SpeechResult<()> {
        let program = self.program()?.to_string();
        let child = Command::new(&program)
            .args(speak_args(utterance, voice))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        self.current = Some(child);
        Ok(())
    }

    async fn is_speaking(&mut self) -> bool {
        let Some(child) = self.current.as_mut() else {
            return false;
        };
        match child.try_wait() {
            Ok(None) => true,
            Ok(Some(_)) | Err(_) => {
                self.current = None;
                false
            }
        }
    }

    async fn halt(&mut self) -> SpeechResult<()> {
        if let Some(mut child) = self.current.take() {
            // Already-exited children report an error here; nothing to do then.
            let _ = child.kill().await;
        }
        Ok(())
    }
}
