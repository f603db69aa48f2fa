//! Dictation session — an explicit state machine over recognition events.
//!
//! The speech engine itself is an external collaborator. It delivers
//! interim transcripts and end-of-stream marks over a channel and receives
//! start/stop directives back; anything that can produce
//! [`RecognitionEvent`]s can drive a session (the CLI ships a stdin
//! adapter). Each update *replaces* the working transcript with the
//! concatenation of segments from the event's start index, and the
//! normalized expression is recomputed from scratch, so late corrections
//! from the engine are picked up for free.

use quantix_core::speech;
use quantix_core::types::{
    DictationState, DictationStatus, EngineDirective, RecognitionEvent, RecognitionUpdate,
};
use tokio::sync::{mpsc, watch};
use tracing::debug;

// ─── Pure transition core ──────────────────────────────────────────────────

/// Synchronous dictation state machine. The async session pumps it; tests
/// drive it directly.
#[derive(Debug)]
pub struct DictationMachine {
    state: DictationState,
    transcript: String,
    expression: String,
}

impl DictationMachine {
    pub fn new() -> Self {
        Self {
            state: DictationState::Idle,
            transcript: String::new(),
            expression: String::new(),
        }
    }

    pub fn state(&self) -> DictationState {
        self.state
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Latest normalized expression.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn status(&self) -> DictationStatus {
        DictationStatus {
            state: self.state,
            transcript: self.transcript.clone(),
            expression: self.expression.clone(),
        }
    }

    /// Begin (or resume) listening. No-op while already listening.
    pub fn start(&mut self) -> Option<EngineDirective> {
        match self.state {
            DictationState::Listening => None,
            DictationState::Idle | DictationState::Stopped => {
                self.state = DictationState::Listening;
                Some(EngineDirective::Start)
            }
        }
    }

    /// Stop listening. Keeps the transcript; only a transition out of
    /// Listening reaches the engine.
    pub fn stop(&mut self) -> Option<EngineDirective> {
        match self.state {
            DictationState::Listening => {
                self.state = DictationState::Stopped;
                Some(EngineDirective::Stop)
            }
            DictationState::Idle | DictationState::Stopped => None,
        }
    }

    /// The mic-button behavior: start when not listening, stop otherwise.
    pub fn toggle(&mut self) -> Option<EngineDirective> {
        if self.state == DictationState::Listening {
            self.stop()
        } else {
            self.start()
        }
    }

    /// Clear the transcript and return to idle, stopping the engine first
    /// if it was listening.
    pub fn reset(&mut self) -> Option<EngineDirective> {
        let directive = self.stop();
        self.transcript.clear();
        self.expression.clear();
        self.state = DictationState::Idle;
        directive
    }

    /// Fold one recognition event into the transcript. Ignored unless
    /// listening, so events already in flight when the user stops cannot
    /// mutate a stopped session.
    pub fn on_update(&mut self, update: &RecognitionUpdate) {
        if self.state != DictationState::Listening {
            return;
        }
        let from = update.start_index.min(update.segments.len());
        self.transcript = update.segments[from..].concat();
        self.expression = speech::normalize(&self.transcript);
    }

    /// The engine's audio stream ended. While listening, ask it to start
    /// again (continuous dictation); after a stop, stay put.
    pub fn on_end(&mut self) -> Option<EngineDirective> {
        if self.state == DictationState::Listening {
            Some(EngineDirective::Start)
        } else {
            None
        }
    }
}

impl Default for DictationMachine {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Async session shell ───────────────────────────────────────────────────

enum Cmd {
    Start,
    Stop,
    Toggle,
    Reset,
}

/// Cloneable handle to a running dictation session. All methods are
/// non-blocking.
#[derive(Clone)]
pub struct DictationSession {
    cmd_tx: mpsc::UnboundedSender<Cmd>,
    status_rx: watch::Receiver<DictationStatus>,
}

/// Channel ends handed to the recognition-engine adapter: events in,
/// directives out.
pub struct EngineLink {
    pub event_tx: mpsc::UnboundedSender<RecognitionEvent>,
    pub directive_rx: mpsc::UnboundedReceiver<EngineDirective>,
}

impl DictationSession {
    /// Spawn the session task. Returns the handle plus the engine-side
    /// channel ends.
    pub fn spawn() -> (Self, EngineLink) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (directive_tx, directive_rx) = mpsc::unbounded_channel();

        let machine = DictationMachine::new();
        let (status_tx, status_rx) = watch::channel(machine.status());

        tokio::spawn(session_task(
            machine,
            cmd_rx,
            event_rx,
            directive_tx,
            status_tx,
        ));

        (
            Self { cmd_tx, status_rx },
            EngineLink {
                event_tx,
                directive_rx,
            },
        )
    }

    pub fn start(&self) {
        let _ = self.cmd_tx.send(Cmd::Start);
    }

    pub fn stop(&self) {
        let _ = self.cmd_tx.send(Cmd::Stop);
    }

    /// The mic-button behavior.
    pub fn toggle(&self) {
        let _ = self.cmd_tx.send(Cmd::Toggle);
    }

    pub fn reset(&self) {
        let _ = self.cmd_tx.send(Cmd::Reset);
    }

    /// Current status snapshot.
    pub fn status(&self) -> DictationStatus {
        self.status_rx.borrow().clone()
    }

    /// Subscribe to status changes.
    pub fn subscribe(&self) -> watch::Receiver<DictationStatus> {
        self.status_rx.clone()
    }
}

async fn session_task(
    mut machine: DictationMachine,
    mut cmd_rx: mpsc::UnboundedReceiver<Cmd>,
    mut event_rx: mpsc::UnboundedReceiver<RecognitionEvent>,
    directive_tx: mpsc::UnboundedSender<EngineDirective>,
    status_tx: watch::Sender<DictationStatus>,
) {
    loop {
        let directive = tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(Cmd::Start) => machine.start(),
                Some(Cmd::Stop) => machine.stop(),
                Some(Cmd::Toggle) => machine.toggle(),
                Some(Cmd::Reset) => machine.reset(),
                None => break,
            },
            event = event_rx.recv() => match event {
                Some(RecognitionEvent::Update(update)) => {
                    machine.on_update(&update);
                    None
                }
                Some(RecognitionEvent::End) => machine.on_end(),
                None => break,
            },
        };

        if let Some(directive) = directive {
            debug!("dictation: {:?} -> engine {:?}", machine.state(), directive);
            let _ = directive_tx.send(directive);
        }
        let _ = status_tx.send(machine.status());
    }
}
