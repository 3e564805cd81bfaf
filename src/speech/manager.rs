use crate::speech::engine::{EngineStatus, SpeechEngine};
use crate::speech::narrator::{preferred_voice, NarrationDevice, Utterance, Voice, DEFAULT_VOICE_PREFERENCES};
use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Maximum spoken lines kept for the narration log
const MAX_HISTORY: usize = 200;

/// How often the worker checks whether the current utterance finished
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Command from the UI thread to the speech worker
#[derive(Debug)]
enum SpeechCommand {
    Speak(Utterance, Option<Voice>),
    Cancel,
    Pause,
    Resume,
    Shutdown,
}

/// Event from the speech worker back to the UI thread
#[derive(Debug)]
enum SpeechEvent {
    Ready(String),
    Unavailable(String),
    VoicesLoaded(Vec<Voice>),
    Began { text: String, voice: Option<String> },
}

/// A line that was actually handed to the engine
#[derive(Debug, Clone)]
pub struct SpokenLine {
    pub at: DateTime<Local>,
    pub text: String,
    pub voice: Option<String>,
}

#[derive(Default)]
pub struct SpeechStats {
    pub utterances_spoken: AtomicU64,
    pub errors: AtomicU64,
}

/// Owns the speech worker task and exposes it as a [`NarrationDevice`]
pub struct SpeechManager {
    enabled: bool,
    status: EngineStatus,
    available: Arc<AtomicBool>,
    stats: Arc<SpeechStats>,
    cmd_tx: Option<mpsc::UnboundedSender<SpeechCommand>>,
    events: Option<mpsc::UnboundedReceiver<SpeechEvent>>,
    engine_name: Option<String>,
    preferences: Vec<String>,
    voices: Vec<Voice>,
    voice: Option<Voice>,
    history: VecDeque<SpokenLine>,
}

impl Default for SpeechManager {
    fn default() -> Self {
        Self::new(DEFAULT_VOICE_PREFERENCES.iter().map(|p| p.to_string()).collect())
    }
}

impl SpeechManager {
    pub fn new(preferences: Vec<String>) -> Self {
        Self {
            enabled: true,
            status: EngineStatus::Disconnected,
            available: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(SpeechStats::default()),
            cmd_tx: None,
            events: None,
            engine_name: None,
            preferences,
            voices: Vec::new(),
            voice: None,
            history: VecDeque::with_capacity(MAX_HISTORY),
        }
    }

    /// Spawn the worker for `engine` on `handle`, replacing any previous one
    pub fn start<E: SpeechEngine + 'static>(&mut self, handle: &Handle, engine: E) {
        self.shutdown();

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        self.cmd_tx = Some(cmd_tx);
        self.events = Some(event_rx);
        self.status = EngineStatus::Connecting;
        self.engine_name = Some(engine.name().to_string());

        let available = Arc::new(AtomicBool::new(false));
        self.available = available.clone();
        let stats = self.stats.clone();

        handle.spawn(run_worker(engine, cmd_rx, event_tx, available, stats));
    }

    /// Stop the worker; narration becomes unavailable
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(SpeechCommand::Shutdown);
        }
        self.events = None;
        self.available.store(false, Ordering::SeqCst);
        self.status = EngineStatus::Disconnected;
    }

    /// Apply events from the worker (call each frame)
    pub fn poll(&mut self) {
        let Some(mut events) = self.events.take() else {
            return;
        };

        while let Ok(event) = events.try_recv() {
            match event {
                SpeechEvent::Ready(name) => {
                    self.status = EngineStatus::Connected;
                    self.engine_name = Some(name);
                }
                SpeechEvent::Unavailable(reason) => {
                    self.status = EngineStatus::Unavailable;
                    warn!("Narration unavailable: {}", reason);
                }
                SpeechEvent::VoicesLoaded(voices) => {
                    self.select_voice(&voices);
                    self.voices = voices;
                }
                SpeechEvent::Began { text, voice } => {
                    if self.history.len() >= MAX_HISTORY {
                        self.history.pop_front();
                    }
                    self.history.push_back(SpokenLine {
                        at: Local::now(),
                        text,
                        voice,
                    });
                }
            }
        }

        self.events = Some(events);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled && !enabled {
            self.send(SpeechCommand::Cancel);
        }
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn status(&self) -> EngineStatus {
        self.status
    }

    pub fn engine_name(&self) -> Option<&str> {
        self.engine_name.as_deref()
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn voice(&self) -> Option<&Voice> {
        self.voice.as_ref()
    }

    pub fn history(&self) -> &VecDeque<SpokenLine> {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn stats(&self) -> &SpeechStats {
        &self.stats
    }

    fn send(&self, command: SpeechCommand) {
        if let Some(tx) = &self.cmd_tx {
            if tx.send(command).is_err() {
                debug!("Speech worker has stopped; command dropped");
            }
        }
    }
}

impl Drop for SpeechManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl NarrationDevice for SpeechManager {
    fn is_available(&self) -> bool {
        self.enabled && self.available.load(Ordering::SeqCst)
    }

    fn speak(&mut self, utterance: Utterance) {
        if !self.is_available() {
            debug!("Narration unavailable, skipping '{}'", utterance.text);
            return;
        }
        self.send(SpeechCommand::Speak(utterance, self.voice.clone()));
    }

    fn cancel(&mut self) {
        self.send(SpeechCommand::Cancel);
    }

    fn pause(&mut self) {
        self.send(SpeechCommand::Pause);
    }

    fn resume(&mut self) {
        self.send(SpeechCommand::Resume);
    }

    fn select_voice(&mut self, voices: &[Voice]) -> Option<Voice> {
        self.voice = preferred_voice(voices, &self.preferences).cloned();
        match &self.voice {
            Some(v) => info!("Narration voice: {} ({})", v.name, v.lang),
            None if !voices.is_empty() => info!("No preferred voice among {}, using engine default", voices.len()),
            None => {}
        }
        self.voice.clone()
    }
}

async fn run_worker<E: SpeechEngine>(
    mut engine: E,
    mut cmd_rx: mpsc::UnboundedReceiver<SpeechCommand>,
    event_tx: mpsc::UnboundedSender<SpeechEvent>,
    available: Arc<AtomicBool>,
    stats: Arc<SpeechStats>,
) {
    if let Err(e) = engine.connect().await {
        let _ = event_tx.send(SpeechEvent::Unavailable(e.to_string()));
        // Keep draining so senders never block on a dead channel.
        while let Some(cmd) = cmd_rx.recv().await {
            if matches!(cmd, SpeechCommand::Shutdown) {
                break;
            }
        }
        return;
    }

    available.store(true, Ordering::SeqCst);
    let _ = event_tx.send(SpeechEvent::Ready(engine.name().to_string()));

    match engine.voices().await {
        Ok(voices) => {
            let _ = event_tx.send(SpeechEvent::VoicesLoaded(voices));
        }
        Err(e) => warn!("Failed to list voices: {}", e),
    }

    let mut queue: VecDeque<(Utterance, Option<Voice>)> = VecDeque::new();
    let mut current: Option<(Utterance, Option<Voice>)> = None;
    let mut paused = false;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                None | Some(SpeechCommand::Shutdown) => break,
                Some(SpeechCommand::Speak(utterance, voice)) => queue.push_back((utterance, voice)),
                Some(SpeechCommand::Cancel) => {
                    queue.clear();
                    current = None;
                    paused = false;
                    if let Err(e) = engine.halt().await {
                        stats.errors.fetch_add(1, Ordering::SeqCst);
                        warn!("Failed to halt speech: {}", e);
                    }
                }
                Some(SpeechCommand::Pause) => {
                    if !paused {
                        paused = true;
                        if engine.is_speaking().await {
                            if let Err(e) = engine.halt().await {
                                stats.errors.fetch_add(1, Ordering::SeqCst);
                                warn!("Failed to halt speech: {}", e);
                            }
                            if let Some(interrupted) = current.take() {
                                queue.push_front(interrupted);
                            }
                        }
                    }
                }
                Some(SpeechCommand::Resume) => paused = false,
            },
            _ = tokio::time::sleep(POLL_INTERVAL) => {}
        }

        if paused || engine.is_speaking().await {
            continue;
        }

        current = None;
        if let Some((utterance, voice)) = queue.pop_front() {
            match engine.begin(&utterance, voice.as_ref()).await {
                Ok(()) => {
                    stats.utterances_spoken.fetch_add(1, Ordering::SeqCst);
                    let _ = event_tx.send(SpeechEvent::Began {
                        text: utterance.text.clone(),
                        voice: voice.as_ref().map(|v| v.name.clone()),
                    });
                    current = Some((utterance, voice));
                }
                Err(e) => {
                    stats.errors.fetch_add(1, Ordering::SeqCst);
                    warn!("Failed to speak '{}': {}", utterance.text, e);
                }
            }
        }
    }

    let _ = engine.halt().await;
    available.store(false, Ordering::SeqCst);
}
