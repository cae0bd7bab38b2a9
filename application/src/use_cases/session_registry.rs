//! Session registry and driver
//!
//! Maps session ids to live sessions and runs each session's round sequences
//! in a background task. Callers trigger and drain without waiting on the
//! sequence itself.
//!
//! Each session has exactly one driver task. Triggers reach it through an
//! unbounded channel and run strictly one after another (FIFO), so two round
//! sequences never append to the same transcript concurrently. Replies leave
//! the driver through a second channel as soon as they are appended; `drain`
//! empties it while holding the receiver's lock, so every reply is delivered
//! at most once.

use crate::config::DriverParams;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::reply_observer::ReplyObserver;
use crate::ports::responder_backend::{BackendError, ResponderBackend};
use crate::use_cases::run_round_sequence::{RunRoundSequenceUseCase, SharedTranscript};
use chrono::{DateTime, TimeDelta, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use roundtable_domain::{
    DomainError, Entry, PersonaCatalog, PromptTemplate, Reply, Responder, RosterSpec, SessionId,
    SessionMode, Transcript, truncate,
};
use serde_json::json;
use std::collections::HashMap;
use std::collections::hash_map::Entry as MapEntry;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Errors surfaced to callers of registry operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Invalid roster: {0}")]
    InvalidRoster(String),

    #[error("Session {0} is closed")]
    Closed(SessionId),

    #[error(transparent)]
    Domain(DomainError),
}

impl From<DomainError> for SessionError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::InvalidRoster(name) => SessionError::InvalidRoster(name),
            other => SessionError::Domain(other),
        }
    }
}

/// Point-in-time view of a session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    pub id: SessionId,
    pub mode: SessionMode,
    pub members: Vec<String>,
    pub transcript_len: usize,
    /// Triggers accepted but not yet started
    pub pending_triggers: usize,
    /// A round sequence is running right now
    pub in_flight: bool,
    pub last_activity: DateTime<Utc>,
}

impl SessionStatus {
    /// More replies may still arrive for this session
    pub fn is_busy(&self) -> bool {
        self.in_flight || self.pending_triggers > 0
    }
}

/// State shared between a session's handle and its driver task
struct SessionState {
    id: SessionId,
    transcript: SharedTranscript,
    pending_triggers: AtomicUsize,
    in_flight: AtomicBool,
    last_activity: Mutex<DateTime<Utc>>,
}

impl SessionState {
    fn touch(&self) {
        *self
            .last_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Utc::now();
    }

    fn last_activity(&self) -> DateTime<Utc> {
        *self
            .last_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) || self.pending_triggers.load(Ordering::SeqCst) > 0
    }
}

/// Registry-side handle of a live session
struct SessionHandle {
    state: Arc<SessionState>,
    mode: SessionMode,
    members: Vec<String>,
    triggers: mpsc::UnboundedSender<String>,
    outputs: Mutex<mpsc::UnboundedReceiver<Reply>>,
    cancel: CancellationToken,
}

/// Registry of live sessions
pub struct SessionRegistry<B: ResponderBackend + ?Sized + 'static> {
    catalog: PersonaCatalog,
    sequence: Arc<RunRoundSequenceUseCase<B>>,
    logger: Arc<dyn ConversationLogger>,
    sessions: RwLock<HashMap<SessionId, Arc<SessionHandle>>>,
    shutdown: CancellationToken,
    created: AtomicU64,
}

impl<B: ResponderBackend + ?Sized + 'static> SessionRegistry<B> {
    pub fn new(catalog: PersonaCatalog, backend: Arc<B>, params: DriverParams) -> Self {
        Self {
            catalog,
            sequence: Arc::new(RunRoundSequenceUseCase::new(backend, params)),
            logger: Arc::new(NoConversationLogger),
            sessions: RwLock::new(HashMap::new()),
            shutdown: CancellationToken::new(),
            created: AtomicU64::new(0),
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn catalog(&self) -> &PersonaCatalog {
        &self.catalog
    }

    /// Return `id` if that session exists, otherwise create a session from
    /// `roster` (under `id` if given, else a fresh `conv_<uuid>` id).
    ///
    /// The roster of an existing session is never changed.
    /// Must be called from within a Tokio runtime.
    pub fn start_or_resolve_session(
        &self,
        id: Option<SessionId>,
        roster: &RosterSpec,
    ) -> Result<SessionId, SessionError> {
        if let Some(id) = &id
            && self.read_sessions().contains_key(id)
        {
            debug!("Resolved existing session {}", id);
            return Ok(id.clone());
        }

        let id = id.unwrap_or_else(new_session_id);
        let resolved = self.catalog.resolve(roster)?;

        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        // Checked under the lock: shutdown cancels before it clears the map
        if self.shutdown.is_cancelled() {
            return Err(SessionError::Closed(id));
        }
        let slot = match sessions.entry(id.clone()) {
            MapEntry::Occupied(_) => return Ok(id),
            MapEntry::Vacant(slot) => slot,
        };

        let members: Vec<String> = resolved.identities().iter().map(|s| s.to_string()).collect();
        let opening = match (resolved.mode, resolved.personas.as_slice()) {
            (SessionMode::SingleResponder, [only]) => PromptTemplate::one_on_one_opening(&only.name),
            _ => PromptTemplate::group_chat_opening(&resolved.identities()),
        };
        let roster: Vec<Responder> = resolved.personas.iter().map(Responder::from_persona).collect();

        let state = Arc::new(SessionState {
            id: id.clone(),
            transcript: Arc::new(RwLock::new(Transcript::with_opening(opening))),
            pending_triggers: AtomicUsize::new(0),
            in_flight: AtomicBool::new(false),
            last_activity: Mutex::new(Utc::now()),
        });
        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
        let (output_tx, output_rx) = mpsc::unbounded_channel();
        let cancel = self.shutdown.child_token();

        let driver = SessionDriver {
            state: Arc::clone(&state),
            roster,
            mode: resolved.mode,
            sequence: Arc::clone(&self.sequence),
            logger: Arc::clone(&self.logger),
            outputs: output_tx,
            rng: self.session_rng(),
        };
        tokio::spawn(driver.run(trigger_rx, cancel.clone()));

        info!(
            "Created session {} ({}, {})",
            id,
            resolved.mode,
            members.join(", ")
        );
        self.logger.log(ConversationEvent::new(
            "session_created",
            json!({
                "session_id": id.as_str(),
                "mode": resolved.mode.as_str(),
                "members": members,
            }),
        ));

        slot.insert(Arc::new(SessionHandle {
            state,
            mode: resolved.mode,
            members,
            triggers: trigger_tx,
            outputs: Mutex::new(output_rx),
            cancel,
        }));
        Ok(id)
    }

    /// Queue a round sequence for `text`. Returns immediately.
    pub fn trigger(&self, id: &SessionId, text: impl Into<String>) -> Result<(), SessionError> {
        let text = text.into();
        let handle = self.handle(id)?;
        handle.state.pending_triggers.fetch_add(1, Ordering::SeqCst);
        if handle.triggers.send(text.clone()).is_err() {
            handle.state.pending_triggers.fetch_sub(1, Ordering::SeqCst);
            return Err(SessionError::Closed(id.clone()));
        }
        handle.state.touch();
        debug!("Trigger queued for session {}: {}", id, truncate(&text, 80));
        Ok(())
    }

    /// Remove and return every reply produced since the previous drain
    pub fn drain(&self, id: &SessionId) -> Result<Vec<Reply>, SessionError> {
        let handle = self.handle(id)?;
        let mut outputs = handle
            .outputs
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut replies = Vec::new();
        while let Ok(reply) = outputs.try_recv() {
            replies.push(reply);
        }
        handle.state.touch();
        Ok(replies)
    }

    pub fn status(&self, id: &SessionId) -> Result<SessionStatus, SessionError> {
        let handle = self.handle(id)?;
        let state = &handle.state;
        let transcript_len = state
            .transcript
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        Ok(SessionStatus {
            id: state.id.clone(),
            mode: handle.mode,
            members: handle.members.clone(),
            transcript_len,
            pending_triggers: state.pending_triggers.load(Ordering::SeqCst),
            in_flight: state.in_flight.load(Ordering::SeqCst),
            last_activity: state.last_activity(),
        })
    }

    /// Snapshot of the session's transcript
    pub fn transcript(&self, id: &SessionId) -> Result<Vec<Entry>, SessionError> {
        let handle = self.handle(id)?;
        let transcript = handle
            .state
            .transcript
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(transcript.entries().to_vec())
    }

    pub fn len(&self) -> usize {
        self.read_sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove a session and stop its driver
    pub fn remove(&self, id: &SessionId) -> Result<(), SessionError> {
        let handle = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .ok_or_else(|| SessionError::NotFound(id.clone()))?;
        handle.cancel.cancel();
        info!("Removed session {}", id);
        Ok(())
    }

    /// Remove sessions idle for longer than `max_idle` with no work pending
    pub fn evict_idle(&self, max_idle: Duration) -> Vec<SessionId> {
        let max_idle = TimeDelta::from_std(max_idle).unwrap_or(TimeDelta::MAX);
        let now = Utc::now();

        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let idle: Vec<SessionId> = sessions
            .iter()
            .filter(|(_, handle)| {
                !handle.state.is_busy() && now - handle.state.last_activity() > max_idle
            })
            .map(|(id, _)| id.clone())
            .collect();

        for id in &idle {
            if let Some(handle) = sessions.remove(id) {
                handle.cancel.cancel();
            }
        }
        if !idle.is_empty() {
            info!("Evicted {} idle sessions", idle.len());
        }
        idle
    }

    /// Stop every driver and forget all sessions
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if !sessions.is_empty() {
            info!("Shutting down {} sessions", sessions.len());
        }
        sessions.clear();
    }

    fn handle(&self, id: &SessionId) -> Result<Arc<SessionHandle>, SessionError> {
        self.read_sessions()
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(id.clone()))
    }

    fn read_sessions(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<SessionId, Arc<SessionHandle>>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn session_rng(&self) -> StdRng {
        let n = self.created.fetch_add(1, Ordering::SeqCst);
        match self.sequence.params().seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(n)),
            None => StdRng::from_entropy(),
        }
    }
}

impl<B: ResponderBackend + ?Sized + 'static> Drop for SessionRegistry<B> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn new_session_id() -> SessionId {
    SessionId::new(format!("conv_{}", Uuid::new_v4().simple()))
}

/// Background task owning one session's roster
struct SessionDriver<B: ResponderBackend + ?Sized + 'static> {
    state: Arc<SessionState>,
    roster: Vec<Responder>,
    mode: SessionMode,
    sequence: Arc<RunRoundSequenceUseCase<B>>,
    logger: Arc<dyn ConversationLogger>,
    outputs: mpsc::UnboundedSender<Reply>,
    rng: StdRng,
}

impl<B: ResponderBackend + ?Sized + 'static> SessionDriver<B> {
    async fn run(
        mut self,
        mut triggers: mpsc::UnboundedReceiver<String>,
        cancel: CancellationToken,
    ) {
        let id = self.state.id.clone();
        loop {
            let text = tokio::select! {
                _ = cancel.cancelled() => break,
                next = triggers.recv() => match next {
                    Some(text) => text,
                    None => break,
                },
            };

            // Mark in flight before releasing the queue slot so the session
            // never looks idle in between.
            self.state.in_flight.store(true, Ordering::SeqCst);
            self.state.pending_triggers.fetch_sub(1, Ordering::SeqCst);

            let completed = tokio::select! {
                _ = cancel.cancelled() => false,
                _ = self.run_sequence(text) => true,
            };
            self.state.in_flight.store(false, Ordering::SeqCst);
            self.state.touch();
            if !completed {
                break;
            }
        }
        debug!("Driver for session {} stopped", id);
    }

    async fn run_sequence(&mut self, text: String) {
        let id = self.state.id.as_str().to_string();
        self.state
            .transcript
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .append(Entry::external(text.clone()));
        self.logger.log(ConversationEvent::new(
            "trigger",
            json!({ "session_id": id, "text": text }),
        ));

        let observer = DriverObserver {
            state: &self.state,
            outputs: &self.outputs,
            logger: self.logger.as_ref(),
        };
        let outcome = self
            .sequence
            .execute_with_observer(
                &self.state.transcript,
                &mut self.roster,
                self.mode,
                &mut self.rng,
                &observer,
            )
            .await;

        self.logger.log(ConversationEvent::new(
            "sequence_complete",
            json!({
                "session_id": id,
                "rounds": outcome.rounds,
                "replies": outcome.replies.len(),
                "failures": outcome.failures,
            }),
        ));
    }
}

/// Publishes replies to the session's output channel as they are appended
struct DriverObserver<'a> {
    state: &'a SessionState,
    outputs: &'a mpsc::UnboundedSender<Reply>,
    logger: &'a dyn ConversationLogger,
}

impl ReplyObserver for DriverObserver<'_> {
    fn on_reply(&self, reply: &Reply) {
        self.logger.log(ConversationEvent::new(
            "reply",
            json!({
                "session_id": self.state.id.as_str(),
                "identity": reply.identity,
                "content": reply.content,
            }),
        ));
        if self.outputs.send(reply.clone()).is_err() {
            warn!("Session {} output channel closed", self.state.id);
        }
        self.state.touch();
    }

    fn on_backend_error(&self, identity: &str, error: &BackendError) {
        self.logger.log(ConversationEvent::new(
            "backend_error",
            json!({
                "session_id": self.state.id.as_str(),
                "identity": identity,
                "error": error.to_string(),
            }),
        ));
    }
}
