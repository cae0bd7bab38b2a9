//! Run Round Sequence use case
//!
//! Drives one external trigger's worth of dialogue over a session's roster:
//! ordered rounds with decaying participation in multi-responder mode, or a
//! single unconditional pass in single-responder mode.

use crate::config::DriverParams;
use crate::ports::reply_observer::{NoObserver, ReplyObserver};
use crate::ports::responder_backend::{BackendError, ResponderBackend};
use rand::Rng;
use roundtable_domain::{
    Entry, PromptTemplate, Reply, Responder, SessionMode, Transcript, inspect, speaking_order,
};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Transcript handle shared between a session's driver and its readers.
///
/// Only the driver appends. Locks are held for a snapshot or a single append,
/// never across a backend call.
pub type SharedTranscript = Arc<RwLock<Transcript>>;

/// Result of one round sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundSequenceOutcome {
    /// Rounds performed (zero for single-responder mode and empty rosters)
    pub rounds: usize,
    /// Replies appended, in transcript order
    pub replies: Vec<Reply>,
    /// Turns whose backend call failed and were replaced by a placeholder
    pub failures: usize,
}

/// Use case for running a round sequence against a session transcript
pub struct RunRoundSequenceUseCase<B: ResponderBackend + ?Sized + 'static> {
    backend: Arc<B>,
    params: DriverParams,
}

impl<B: ResponderBackend + ?Sized + 'static> RunRoundSequenceUseCase<B> {
    pub fn new(backend: Arc<B>, params: DriverParams) -> Self {
        Self { backend, params }
    }

    pub fn params(&self) -> &DriverParams {
        &self.params
    }

    /// Execute the use case with no observer
    pub async fn execute<R: Rng + Send>(
        &self,
        transcript: &SharedTranscript,
        roster: &mut [Responder],
        mode: SessionMode,
        rng: &mut R,
    ) -> RoundSequenceOutcome {
        self.execute_with_observer(transcript, roster, mode, rng, &NoObserver)
            .await
    }

    /// Execute the use case, reporting each reply as soon as it is appended
    pub async fn execute_with_observer<R: Rng + Send>(
        &self,
        transcript: &SharedTranscript,
        roster: &mut [Responder],
        mode: SessionMode,
        rng: &mut R,
        observer: &dyn ReplyObserver,
    ) -> RoundSequenceOutcome {
        let mut outcome = RoundSequenceOutcome::default();
        if roster.is_empty() {
            debug!("Empty roster, nothing to run");
            return outcome;
        }

        let identities: Vec<String> = roster.iter().map(|r| r.identity().to_string()).collect();
        let known: Vec<&str> = identities.iter().map(String::as_str).collect();

        match mode {
            SessionMode::SingleResponder => {
                for responder in roster.iter() {
                    self.take_turn(transcript, responder, &known, observer, &mut outcome)
                        .await;
                }
            }
            SessionMode::MultiResponder => {
                self.run_rounds(transcript, roster, &known, rng, observer, &mut outcome)
                    .await;
            }
        }

        info!(
            "Round sequence finished: {} rounds, {} replies, {} failures",
            outcome.rounds,
            outcome.replies.len(),
            outcome.failures
        );
        outcome
    }

    async fn run_rounds<R: Rng + Send>(
        &self,
        transcript: &SharedTranscript,
        roster: &mut [Responder],
        known: &[&str],
        rng: &mut R,
        observer: &dyn ReplyObserver,
        outcome: &mut RoundSequenceOutcome,
    ) {
        let scheduler = self.params.scheduler;
        for responder in roster.iter_mut() {
            responder.reset(scheduler.initial_rate);
        }

        let rounds = scheduler.round_count();
        for round in 0..rounds {
            let priorities: Vec<u32> = roster.iter().map(Responder::priority).collect();
            let order = speaking_order(&priorities);
            let names: Vec<&str> = order.iter().map(|&i| known[i]).collect();
            debug!("Round {}: order {:?}", round + 1, names);
            observer.on_round_start(round, &names);

            for index in order {
                let sample: f64 = rng.r#gen();
                let spoke = roster[index].wants_to_speak(sample);
                if spoke {
                    self.take_turn(transcript, &roster[index], known, observer, outcome)
                        .await;
                    if !self.params.reply_delay.is_zero() {
                        tokio::time::sleep(self.params.reply_delay).await;
                    }
                }
                roster[index].finish_turn(spoke, scheduler.decay);
            }
            outcome.rounds += 1;
        }
    }

    /// One responder's turn: generate, sanitize, append, publish.
    async fn take_turn(
        &self,
        transcript: &SharedTranscript,
        responder: &Responder,
        known: &[&str],
        observer: &dyn ReplyObserver,
        outcome: &mut RoundSequenceOutcome,
    ) {
        let identity = responder.identity();
        let context = snapshot(transcript);

        let raw = match self.generate(responder, &context).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Backend failed for {}: {}", identity, e);
                observer.on_backend_error(identity, &e);
                outcome.failures += 1;
                PromptTemplate::backend_failure(&e.to_string())
            }
        };

        let report = inspect(&raw, identity, known);
        if !report.is_clean() {
            debug!(
                "Sanitized reply from {}: markers {:?}, prefixes {:?}",
                identity, report.removed_markers, report.stripped_prefixes
            );
        }

        let reply = Reply::new(identity, report.text);
        transcript
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .append(Entry::responder(identity, reply.content.clone()));
        observer.on_reply(&reply);
        outcome.replies.push(reply);
    }

    async fn generate(
        &self,
        responder: &Responder,
        context: &[Entry],
    ) -> Result<String, BackendError> {
        let budget = self.params.backend_timeout;
        match tokio::time::timeout(
            budget,
            self.backend.generate(responder.persona_prompt(), context),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout(budget)),
        }
    }
}

fn snapshot(transcript: &SharedTranscript) -> Vec<Entry> {
    transcript
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .entries()
        .to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use roundtable_domain::{Origin, SchedulerParams};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Backend that always answers with `"<persona>: User: hello from <persona>"`.
    struct ImpersonatingBackend;

    #[async_trait]
    impl ResponderBackend for ImpersonatingBackend {
        async fn generate(
            &self,
            persona_prompt: &str,
            _transcript: &[Entry],
        ) -> Result<String, BackendError> {
            Ok(format!("{persona_prompt}: User: hello from {persona_prompt}"))
        }
    }

    /// Backend that records the context length it saw and replays scripted answers.
    struct ScriptedBackend {
        responses: Mutex<VecDeque<Result<String, BackendError>>>,
        seen: Mutex<Vec<usize>>,
    }

    impl ScriptedBackend {
        fn new(responses: Vec<Result<String, BackendError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ResponderBackend for ScriptedBackend {
        async fn generate(
            &self,
            _persona_prompt: &str,
            transcript: &[Entry],
        ) -> Result<String, BackendError> {
            self.seen.lock().unwrap().push(transcript.len());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("fine".to_string()))
        }
    }

    struct StalledBackend;

    #[async_trait]
    impl ResponderBackend for StalledBackend {
        async fn generate(&self, _: &str, _: &[Entry]) -> Result<String, BackendError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok("too late".to_string())
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        rounds: Mutex<Vec<Vec<String>>>,
        speakers: Mutex<Vec<Vec<String>>>,
        replies: Mutex<Vec<Reply>>,
        errors: Mutex<Vec<String>>,
    }

    impl ReplyObserver for RecordingObserver {
        fn on_reply(&self, reply: &Reply) {
            if let Some(current) = self.speakers.lock().unwrap().last_mut() {
                current.push(reply.identity.clone());
            }
            self.replies.lock().unwrap().push(reply.clone());
        }

        fn on_round_start(&self, _round: usize, order: &[&str]) {
            self.rounds
                .lock()
                .unwrap()
                .push(order.iter().map(|s| s.to_string()).collect());
            self.speakers.lock().unwrap().push(Vec::new());
        }

        fn on_backend_error(&self, identity: &str, _error: &BackendError) {
            self.errors.lock().unwrap().push(identity.to_string());
        }
    }

    fn roster(names: &[&str]) -> Vec<Responder> {
        // Persona prompt doubles as the identity so test backends can echo it.
        names.iter().map(|n| Responder::new(*n, *n)).collect()
    }

    fn transcript_with_external(text: &str) -> SharedTranscript {
        let mut transcript = Transcript::with_opening("rules");
        transcript.append(Entry::external(text));
        Arc::new(RwLock::new(transcript))
    }

    fn use_case<B: ResponderBackend + 'static>(backend: B) -> RunRoundSequenceUseCase<B> {
        RunRoundSequenceUseCase::new(Arc::new(backend), DriverParams::immediate(0))
    }

    #[tokio::test]
    async fn test_always_four_rounds_with_design_values() {
        let uc = use_case(ScriptedBackend::new(vec![]));
        for seed in 0..20 {
            let transcript = transcript_with_external("hi");
            let mut members = roster(&["A", "B", "C"]);
            let mut rng = StdRng::seed_from_u64(seed);
            let outcome = uc
                .execute(&transcript, &mut members, SessionMode::MultiResponder, &mut rng)
                .await;
            assert_eq!(outcome.rounds, 4, "seed {seed}");
        }
    }

    #[tokio::test]
    async fn test_rounds_independent_of_roster_size() {
        let uc = use_case(ScriptedBackend::new(vec![]));
        let mut rng = StdRng::seed_from_u64(1);
        let transcript = transcript_with_external("hi");
        let mut solo = roster(&["A"]);
        let outcome = uc
            .execute(&transcript, &mut solo, SessionMode::MultiResponder, &mut rng)
            .await;
        assert_eq!(outcome.rounds, 4);
    }

    #[tokio::test]
    async fn test_empty_roster_is_zero_rounds() {
        let uc = use_case(ScriptedBackend::new(vec![]));
        let transcript = transcript_with_external("hi");
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = uc
            .execute(&transcript, &mut [], SessionMode::MultiResponder, &mut rng)
            .await;
        assert_eq!(outcome, RoundSequenceOutcome::default());
        assert_eq!(transcript.read().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_end_to_end_two_responders() {
        let uc = use_case(ImpersonatingBackend);
        for seed in 0..20 {
            let transcript = transcript_with_external("hi");
            let mut members = roster(&["A", "B"]);
            let mut rng = StdRng::seed_from_u64(seed);
            let outcome = uc
                .execute(&transcript, &mut members, SessionMode::MultiResponder, &mut rng)
                .await;

            let transcript = transcript.read().unwrap();
            let entries = transcript.entries();
            assert_eq!(entries[1], Entry::external("hi"));
            let replies = &entries[2..];
            assert!(replies.len() <= 8);
            assert_eq!(replies.len(), outcome.replies.len());
            for entry in replies {
                let who = entry.origin.responder().unwrap();
                assert!(who == "A" || who == "B");
                assert!(!entry.content.contains("User:"));
                assert!(!entry.content.contains("A:"));
                assert!(!entry.content.contains("B:"));
            }
        }
    }

    #[tokio::test]
    async fn test_speakers_lead_next_round() {
        let uc = use_case(ScriptedBackend::new(vec![]));
        for seed in 0..20 {
            let observer = RecordingObserver::default();
            let transcript = transcript_with_external("hi");
            let mut members = roster(&["A", "B", "C", "D"]);
            let mut rng = StdRng::seed_from_u64(seed);
            uc.execute_with_observer(
                &transcript,
                &mut members,
                SessionMode::MultiResponder,
                &mut rng,
                &observer,
            )
            .await;

            let orders = observer.rounds.lock().unwrap().clone();
            let speakers = observer.speakers.lock().unwrap().clone();
            assert_eq!(orders.len(), 4);
            for round in 1..orders.len() {
                let previous = &speakers[round - 1];
                let lead = &orders[round][..previous.len()];
                for speaker in previous {
                    assert!(lead.contains(speaker), "seed {seed}: {speaker} not in {lead:?}");
                }
            }
        }
    }

    #[tokio::test]
    async fn test_cascading_visibility_within_round() {
        let backend = Arc::new(ScriptedBackend::new(vec![]));
        let uc = RunRoundSequenceUseCase::new(Arc::clone(&backend), DriverParams::immediate(0));
        let transcript = transcript_with_external("hi");
        let mut members = roster(&["A", "B", "C"]);
        uc.execute(
            &transcript,
            &mut members,
            SessionMode::SingleResponder,
            &mut StdRng::seed_from_u64(0),
        )
        .await;
        assert_eq!(*backend.seen.lock().unwrap(), vec![2, 3, 4]);
    }

    #[tokio::test]
    async fn test_single_mode_one_reply_per_member() {
        let uc = use_case(ScriptedBackend::new(vec![Ok("A: hello".to_string())]));
        let transcript = transcript_with_external("hi");
        let mut members = roster(&["A"]);
        let outcome = uc
            .execute(
                &transcript,
                &mut members,
                SessionMode::SingleResponder,
                &mut StdRng::seed_from_u64(0),
            )
            .await;

        assert_eq!(outcome.rounds, 0);
        assert_eq!(outcome.replies, vec![Reply::new("A", "hello")]);
        let transcript = transcript.read().unwrap();
        assert_eq!(transcript.responder_entries().count(), 1);
    }

    #[tokio::test]
    async fn test_backend_error_becomes_placeholder() {
        let uc = use_case(ScriptedBackend::new(vec![
            Err(BackendError::QuotaExceeded("slow down".to_string())),
            Ok("still here".to_string()),
        ]));
        let observer = RecordingObserver::default();
        let transcript = transcript_with_external("hi");
        let mut members = roster(&["A", "B"]);
        let outcome = uc
            .execute_with_observer(
                &transcript,
                &mut members,
                SessionMode::SingleResponder,
                &mut StdRng::seed_from_u64(0),
                &observer,
            )
            .await;

        assert_eq!(outcome.failures, 1);
        assert_eq!(outcome.replies.len(), 2);
        assert!(outcome.replies[0].content.starts_with("[Error in generating response"));
        assert!(outcome.replies[0].content.contains("slow down"));
        assert_eq!(outcome.replies[1], Reply::new("B", "still here"));
        assert_eq!(*observer.errors.lock().unwrap(), vec!["A".to_string()]);
        assert_eq!(observer.replies.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_stalled_backend_times_out() {
        let params = DriverParams::immediate(0).with_backend_timeout(Duration::from_millis(50));
        let uc = RunRoundSequenceUseCase::new(Arc::new(StalledBackend), params);
        let transcript = transcript_with_external("hi");
        let mut members = roster(&["A"]);
        let outcome = uc
            .execute(
                &transcript,
                &mut members,
                SessionMode::SingleResponder,
                &mut StdRng::seed_from_u64(0),
            )
            .await;

        assert_eq!(outcome.failures, 1);
        assert!(outcome.replies[0].content.contains("Timed out"));
    }

    #[tokio::test]
    async fn test_state_resets_each_sequence() {
        let uc = use_case(ScriptedBackend::new(vec![]));
        let transcript = transcript_with_external("hi");
        let mut members = roster(&["A", "B"]);
        let mut rng = StdRng::seed_from_u64(9);
        uc.execute(&transcript, &mut members, SessionMode::MultiResponder, &mut rng)
            .await;
        let decayed = members[0].participation_rate();
        assert!(decayed < SchedulerParams::default().threshold);

        let outcome = uc
            .execute(&transcript, &mut members, SessionMode::MultiResponder, &mut rng)
            .await;
        assert_eq!(outcome.rounds, 4);
    }

    #[tokio::test]
    async fn test_dyn_backend() {
        let backend: Arc<dyn ResponderBackend> = Arc::new(ImpersonatingBackend);
        let uc = RunRoundSequenceUseCase::new(backend, DriverParams::immediate(0));
        let transcript = transcript_with_external("hi");
        let mut members = roster(&["A"]);
        let outcome = uc
            .execute(
                &transcript,
                &mut members,
                SessionMode::SingleResponder,
                &mut StdRng::seed_from_u64(0),
            )
            .await;
        assert_eq!(outcome.replies, vec![Reply::new("A", "hello from A")]);
        let transcript = transcript.read().unwrap();
        assert!(matches!(
            transcript.last().map(|e| &e.origin),
            Some(Origin::Responder(name)) if name == "A"
        ));
    }
}
