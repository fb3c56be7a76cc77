use super::*;
use crate::config::TimingParams;
use crate::ports::conversation_logger::NoConversationLogger;
use crate::ports::conversation_store::StoreError;
use crate::ports::council_event::SessionEndReason;
use async_trait::async_trait;
use council_domain::{
    Assignment, PauseReason, Resolution, Speaker, Team, VoteChoice, VoteOutcome,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

// ==================== Mocks ====================

/// Replies from a per-agent script; records every call with its time.
struct ScriptedResponder {
    replies: Mutex<HashMap<String, VecDeque<Result<String, ResponderError>>>>,
    calls: Mutex<Vec<(String, Instant)>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedResponder {
    fn new() -> Self {
        Self {
            replies: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Every reply waits for a `notify_one` on the returned gate.
    fn gated(self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        (
            Self {
                gate: Some(Arc::clone(&gate)),
                ..self
            },
            gate,
        )
    }

    fn reply(self, agent: &str, text: &str) -> Self {
        self.push(agent, Ok(text.to_string()))
    }

    fn fail(self, agent: &str) -> Self {
        self.push(
            agent,
            Err(ResponderError::Connection("connection reset".to_string())),
        )
    }

    fn push(self, agent: &str, reply: Result<String, ResponderError>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry(agent.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    fn called(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(agent, _)| agent.clone())
            .collect()
    }

    fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

#[async_trait]
impl AgentResponder for ScriptedResponder {
    async fn generate(
        &self,
        agent: &AgentProfile,
        _context: &ConversationContext,
    ) -> Result<String, ResponderError> {
        self.calls
            .lock()
            .unwrap()
            .push((agent.id.to_string(), Instant::now()));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.replies
            .lock()
            .unwrap()
            .get_mut(agent.id.as_str())
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| Err(ResponderError::Exhausted(agent.id.to_string())))
    }
}

#[derive(Default)]
struct MemoryStore {
    records: Mutex<HashMap<String, ConversationRecord>>,
    archives: Mutex<Vec<ConversationRecord>>,
    reject_puts: AtomicBool,
}

impl MemoryStore {
    /// Make every `put` fail until switched back.
    fn reject_puts(&self, reject: bool) {
        self.reject_puts.store(reject, Ordering::SeqCst);
    }

    fn record(&self, council_id: &str) -> ConversationRecord {
        self.records
            .lock()
            .unwrap()
            .get(council_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn get(&self, council_id: &str) -> Result<ConversationRecord, StoreError> {
        Ok(self.record(council_id))
    }

    async fn put(&self, council_id: &str, record: &ConversationRecord) -> Result<(), StoreError> {
        if self.reject_puts.load(Ordering::SeqCst) {
            return Err(StoreError::Other("disk full".to_string()));
        }
        self.records
            .lock()
            .unwrap()
            .insert(council_id.to_string(), record.clone());
        Ok(())
    }

    async fn append_message(&self, council_id: &str, message: &Message) -> Result<(), StoreError> {
        self.records
            .lock()
            .unwrap()
            .entry(council_id.to_string())
            .or_default()
            .append(message.clone());
        Ok(())
    }

    async fn archive(
        &self,
        _council_id: &str,
        record: &ConversationRecord,
    ) -> Result<String, StoreError> {
        let mut archives = self.archives.lock().unwrap();
        archives.push(record.clone());
        Ok(format!("archive-{}", archives.len()))
    }
}

// ==================== Harness ====================

struct Harness {
    handle: CouncilHandle,
    events: mpsc::UnboundedReceiver<CouncilEvent>,
    responder: Arc<ScriptedResponder>,
    store: Arc<MemoryStore>,
}

fn registry() -> AgentRegistry {
    AgentRegistry::new(
        vec![
            AgentProfile::new("wisdom", "Wisdom", 1),
            AgentProfile::new("a", "Aster", 2),
            AgentProfile::new("b", "Bramble", 3),
            AgentProfile::new("c", "Cinder", 4),
            AgentProfile::new("d", "Dune", 5),
        ],
        Some(AgentId::new("wisdom")),
    )
    .unwrap()
}

async fn harness(responder: ScriptedResponder) -> Harness {
    harness_with(responder, registry()).await
}

async fn harness_with(responder: ScriptedResponder, registry: AgentRegistry) -> Harness {
    let responder = Arc::new(responder);
    let store = Arc::new(MemoryStore::default());
    let (tx, events) = mpsc::unbounded_channel();
    let controller = CouncilController::new(
        CouncilConfig::new("test").with_timing(TimingParams::default()),
        Arc::new(registry),
        responder.clone(),
        store.clone(),
        Arc::new(NoConversationLogger),
        tx,
    );
    let handle = controller.spawn().await.unwrap();
    Harness {
        handle,
        events,
        responder,
        store,
    }
}

impl Harness {
    /// Wait for the first event matching `pred`, skipping others.
    async fn wait_for(&mut self, pred: impl Fn(&CouncilEvent) -> bool) -> CouncilEvent {
        time::timeout(Duration::from_secs(600), async {
            loop {
                match self.events.recv().await {
                    Some(event) if pred(&event) => return event,
                    Some(_) => continue,
                    None => panic!("event channel closed"),
                }
            }
        })
        .await
        .expect("timed out waiting for event")
    }

    async fn wait_for_end(&mut self) -> SessionEndReason {
        match self
            .wait_for(|e| matches!(e, CouncilEvent::SessionEnded { .. }))
            .await
        {
            CouncilEvent::SessionEnded { reason } => reason,
            _ => unreachable!(),
        }
    }

    async fn wait_for_pause(&mut self) -> PauseReason {
        match self
            .wait_for(|e| matches!(e, CouncilEvent::SessionPaused { .. }))
            .await
        {
            CouncilEvent::SessionPaused { reason } => reason,
            _ => unreachable!(),
        }
    }
}

fn id(s: &str) -> AgentId {
    AgentId::new(s)
}

// ==================== Chamber ====================

#[tokio::test(start_paused = true)]
async fn test_forced_synthesis_at_round_cap() {
    let responder = ScriptedResponder::new()
        .reply("a", "Bramble should weigh in. [NEXT: Bramble]")
        .reply("b", "Over to Cinder. [NEXT: c]")
        .reply("a", "To summarise: agreed. [NEXT: b]");
    let mut h = harness(responder).await;

    h.handle.set_mode(CouncilMode::Chamber).await.unwrap();
    h.handle.start_chamber("a", Some(3)).await.unwrap();

    let reason = h.wait_for_end().await;
    assert_eq!(reason, SessionEndReason::RoundLimit { speaker: id("a") });
    assert_eq!(h.responder.called(), vec!["a", "b", "a"]);

    let times = h.responder.call_times();
    assert!(times[1] - times[0] >= Duration::from_millis(1500));

    let snapshot = h.handle.snapshot().await.unwrap();
    assert!(snapshot.session.is_none());
    assert_eq!(snapshot.message_count, 3);
    assert_eq!(h.store.record("test").messages.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_non_terminator_conclusion_is_ignored() {
    let responder = ScriptedResponder::new().reply("a", "I think we are done. [CONCLUDE]");
    let mut h = harness(responder).await;

    h.handle.set_mode(CouncilMode::Chamber).await.unwrap();
    h.handle.start_chamber("a", None).await.unwrap();

    let ignored = h
        .wait_for(|e| matches!(e, CouncilEvent::ConclusionIgnored { .. }))
        .await;
    assert!(matches!(ignored, CouncilEvent::ConclusionIgnored { agent } if agent == id("a")));

    let reason = h.wait_for_pause().await;
    assert_eq!(reason, PauseReason::NoValidNextSpeaker { requested: None });

    let session = h.handle.snapshot().await.unwrap().session.unwrap();
    assert!(!session.running);
    assert_eq!(session.round, 1);
    assert_eq!(session.max_rounds, 32);
}

#[tokio::test(start_paused = true)]
async fn test_unresolved_handoff_pauses_until_manual_summon() {
    let responder = ScriptedResponder::new()
        .reply("a", "Zephyr knows best. [NEXT: Zephyr]")
        .reply("wisdom", "We have our answer. [Concluded]");
    let mut h = harness(responder).await;

    h.handle.set_mode(CouncilMode::Chamber).await.unwrap();
    h.handle.start_chamber("Aster", None).await.unwrap();

    let reason = h.wait_for_pause().await;
    assert_eq!(
        reason,
        PauseReason::NoValidNextSpeaker {
            requested: Some("Zephyr".to_string())
        }
    );
    assert!(matches!(reason.to_error(), CouncilError::NotFound(_)));

    // Nothing fires on its own while paused
    time::sleep(Duration::from_secs(30)).await;
    assert_eq!(h.responder.called(), vec!["a"]);

    let err = h.handle.summon("nobody").await.unwrap_err();
    assert!(matches!(err, CouncilError::NotFound(_)));

    h.handle.summon("wisdom").await.unwrap();
    let reason = h.wait_for_end().await;
    assert_eq!(reason, SessionEndReason::Concluded { by: id("wisdom") });
    assert_eq!(h.responder.called(), vec!["a", "wisdom"]);
}

#[tokio::test(start_paused = true)]
async fn test_failed_response_pauses_without_retry() {
    let responder = ScriptedResponder::new()
        .fail("a")
        .reply("a", "Recovered. [NEXT: b]");
    let mut h = harness(responder).await;

    assert!(matches!(
        h.handle.summon("a").await,
        Err(CouncilError::Precondition(_))
    ));

    h.handle.set_mode(CouncilMode::Chamber).await.unwrap();
    h.handle.start_chamber("a", None).await.unwrap();

    let reason = h.wait_for_pause().await;
    assert!(matches!(reason, PauseReason::ResponseFailed { ref agent, .. } if *agent == id("a")));
    assert!(matches!(reason.to_error(), CouncilError::Transient(_)));

    time::sleep(Duration::from_secs(30)).await;
    assert_eq!(h.responder.called(), vec!["a"]);
    assert_eq!(h.handle.snapshot().await.unwrap().message_count, 0);
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_scheduled_handoff() {
    let responder = ScriptedResponder::new()
        .reply("a", "[NEXT: b]")
        .reply("b", "[NEXT: a]");
    let mut h = harness(responder).await;

    h.handle.set_mode(CouncilMode::Chamber).await.unwrap();
    h.handle.start_chamber("a", None).await.unwrap();
    h.wait_for(|e| matches!(e, CouncilEvent::HandoffScheduled { .. }))
        .await;

    h.handle.stop().await.unwrap();
    assert_eq!(h.wait_for_end().await, SessionEndReason::Stopped);

    time::sleep(Duration::from_secs(10)).await;
    assert_eq!(h.responder.called(), vec!["a"]);
    assert!(matches!(
        h.handle.stop().await,
        Err(CouncilError::Precondition(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_reply_arriving_after_stop_is_discarded() {
    let (responder, gate) = ScriptedResponder::new().reply("a", "[NEXT: b]").gated();
    let mut h = harness(responder).await;

    h.handle.set_mode(CouncilMode::Chamber).await.unwrap();
    h.handle.start_chamber("a", None).await.unwrap();
    h.wait_for(|e| matches!(e, CouncilEvent::TurnStarted { .. }))
        .await;

    h.handle.stop().await.unwrap();
    gate.notify_one();
    time::sleep(Duration::from_secs(10)).await;

    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.message_count, 0);
    assert!(snapshot.session.is_none());
    assert!(snapshot.speaking.is_none());
    assert!(h.store.record("test").messages.is_empty());
    assert_eq!(h.responder.called(), vec!["a"]);
}

#[tokio::test(start_paused = true)]
async fn test_mode_change_rejected_while_running() {
    let (responder, gate) = ScriptedResponder::new().reply("a", "no directive").gated();
    let mut h = harness(responder).await;

    h.handle.set_mode(CouncilMode::Chamber).await.unwrap();
    h.handle.start_chamber("a", None).await.unwrap();

    assert!(matches!(
        h.handle.set_mode(CouncilMode::Off).await,
        Err(CouncilError::Conflict(_))
    ));
    assert!(matches!(
        h.handle.start_chamber("b", None).await,
        Err(CouncilError::Conflict(_))
    ));
    assert!(matches!(
        h.handle.convene("New topic").await,
        Err(CouncilError::Conflict(_))
    ));

    gate.notify_one();
    h.wait_for_pause().await;

    // A paused session does not block a mode change and is ended by it
    h.handle.set_mode(CouncilMode::Off).await.unwrap();
    assert_eq!(h.wait_for_end().await, SessionEndReason::Stopped);
    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.mode, CouncilMode::Off);
    assert!(snapshot.session.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_start_validation() {
    let h = harness(ScriptedResponder::new()).await;

    // Wrong mode
    assert!(matches!(
        h.handle.start_chamber("a", None).await,
        Err(CouncilError::Validation(_))
    ));

    h.handle.set_mode(CouncilMode::Chamber).await.unwrap();
    assert!(matches!(
        h.handle.start_chamber("", None).await,
        Err(CouncilError::Validation(_))
    ));
    assert!(matches!(
        h.handle.start_chamber("ghost", None).await,
        Err(CouncilError::Validation(_))
    ));
    assert!(matches!(
        h.handle.start_chamber("a", Some(0)).await,
        Err(CouncilError::Validation(_))
    ));
    assert!(h.handle.snapshot().await.unwrap().session.is_none());
    assert!(h.responder.called().is_empty());
}

// ==================== Arena ====================

#[tokio::test(start_paused = true)]
async fn test_arena_requires_both_teams() {
    let responder = ScriptedResponder::new()
        .reply("a", "Cinder, your rebuttal. [NEXT: c]")
        .reply("c", "Nothing further. [CONCLUDE]");
    let mut h = harness(responder).await;

    assert!(matches!(
        h.handle.assign_team_member("a").await,
        Err(CouncilError::Validation(_))
    ));

    h.handle.set_mode(CouncilMode::Arena).await.unwrap();
    for agent in ["a", "b", "wisdom", "d"] {
        assert_eq!(
            h.handle.assign_team_member(agent).await.unwrap(),
            Assignment::Joined(Team::Alpha)
        );
    }
    assert_eq!(
        h.handle.start_arena("a", None).await.unwrap_err(),
        CouncilError::Validation("team Omega is empty".to_string())
    );

    // Re-clicking removes; the freed Alpha slot is refilled first
    assert_eq!(
        h.handle.assign_team_member("Bramble").await.unwrap(),
        Assignment::Removed(Team::Alpha)
    );
    h.handle.assign_team_member("b").await.unwrap();
    let teams = h.handle.snapshot().await.unwrap().teams;
    assert_eq!(teams.alpha(), &[id("a"), id("wisdom"), id("d"), id("b")]);
    assert!(teams.omega().is_empty());

    assert_eq!(
        h.handle.assign_team_member("c").await.unwrap(),
        Assignment::Joined(Team::Omega)
    );

    h.handle.start_arena("a", None).await.unwrap();
    assert!(matches!(
        h.handle.assign_team_member("c").await,
        Err(CouncilError::Conflict(_))
    ));

    // c is not the terminator, so its conclusion is ignored and the session pauses
    let reason = h.wait_for_pause().await;
    assert_eq!(reason, PauseReason::NoValidNextSpeaker { requested: None });
    assert_eq!(h.responder.called(), vec!["a", "c"]);
}

#[tokio::test(start_paused = true)]
async fn test_arena_teams_locked_while_session_paused() {
    let responder = ScriptedResponder::new().reply("a", "I will yield to nobody.");
    let mut h = harness(responder).await;

    h.handle.set_mode(CouncilMode::Arena).await.unwrap();
    for agent in ["a", "b", "wisdom", "d", "c"] {
        h.handle.assign_team_member(agent).await.unwrap();
    }
    h.handle.start_arena("a", None).await.unwrap();
    h.wait_for_pause().await;

    assert!(matches!(
        h.handle.assign_team_member("c").await,
        Err(CouncilError::Conflict(_))
    ));
    assert!(matches!(
        h.handle.clear_teams().await,
        Err(CouncilError::Conflict(_))
    ));
    let teams = h.handle.snapshot().await.unwrap().teams;
    assert_eq!(teams.omega(), &[id("c")]);

    // Rosters open up again once the session is gone
    h.handle.stop().await.unwrap();
    assert_eq!(
        h.handle.assign_team_member("c").await.unwrap(),
        Assignment::Removed(Team::Omega)
    );
    assert!(matches!(
        h.handle.summon("c").await,
        Err(CouncilError::Precondition(_))
    ));
}

// ==================== Free Floor ====================

#[tokio::test(start_paused = true)]
async fn test_free_floor_countdown_and_cancel() {
    let responder = ScriptedResponder::new()
        .reply("a", "X here.")
        .reply("b", "Y here.")
        .reply("c", "Z here.");
    let mut h = harness(responder).await;

    for agent in ["a", "b", "c"] {
        assert!(h.handle.raise_hand(agent).await.unwrap());
    }
    assert!(!h.handle.raise_hand("a").await.unwrap());

    let queue = h.handle.open_floor().await.unwrap();
    assert_eq!(queue, vec![id("a"), id("b"), id("c")]);
    assert!(h.handle.snapshot().await.unwrap().raised_hands.is_empty());

    let countdown = h
        .wait_for(|e| matches!(e, CouncilEvent::FloorCountdown { .. }))
        .await;
    assert!(matches!(
        countdown,
        CouncilEvent::FloorCountdown { next, delay } if next == id("b") && delay == Duration::from_secs(10)
    ));

    // Y is summoned only after the countdown
    h.wait_for(|e| matches!(e, CouncilEvent::FloorCountdown { next, .. } if *next == id("c")))
        .await;
    let times = h.responder.call_times();
    assert_eq!(h.responder.called(), vec!["a", "b"]);
    assert!(times[1] - times[0] >= Duration::from_secs(10));

    // Cancel during Z's countdown
    h.handle.cancel_floor().await.unwrap();
    h.wait_for(|e| matches!(e, CouncilEvent::FloorClosed { exhausted: false }))
        .await;
    time::sleep(Duration::from_secs(60)).await;
    assert_eq!(h.responder.called(), vec!["a", "b"]);

    let snapshot = h.handle.snapshot().await.unwrap();
    assert!(!snapshot.floor_active);
    assert!(snapshot.floor_queue.is_empty());

    // Idempotent
    h.handle.cancel_floor().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_free_floor_drops_failed_speaker() {
    let responder = ScriptedResponder::new().fail("a").reply("b", "Still here.");
    let mut h = harness(responder).await;

    h.handle.raise_hand("a").await.unwrap();
    h.handle.raise_hand("b").await.unwrap();
    let start = Instant::now();
    h.handle.open_floor().await.unwrap();

    let dropped = h
        .wait_for(|e| matches!(e, CouncilEvent::FloorSpeakerDropped { .. }))
        .await;
    assert!(matches!(dropped, CouncilEvent::FloorSpeakerDropped { agent, .. } if agent == id("a")));

    h.wait_for(|e| matches!(e, CouncilEvent::FloorClosed { exhausted: true }))
        .await;
    // No countdown after a failure
    let times = h.responder.call_times();
    assert!(times[1] - start < Duration::from_secs(1));
    assert_eq!(h.responder.called(), vec!["a", "b"]);
    assert_eq!(h.handle.snapshot().await.unwrap().message_count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_free_floor_gating() {
    let h = harness(ScriptedResponder::new()).await;

    assert!(matches!(
        h.handle.open_floor().await,
        Err(CouncilError::Validation(_))
    ));

    h.handle.raise_hand("a").await.unwrap();
    h.handle.set_mode(CouncilMode::Focus).await.unwrap();
    assert!(matches!(
        h.handle.open_floor().await,
        Err(CouncilError::Conflict(_))
    ));
    assert!(h.handle.toggle_focus("a").await.unwrap());
    assert!(!h.handle.toggle_focus("Aster").await.unwrap());

    h.handle.set_mode(CouncilMode::Workshop).await.unwrap();
    assert!(matches!(
        h.handle.toggle_focus("a").await,
        Err(CouncilError::Validation(_))
    ));
    assert!(matches!(
        h.handle.raise_hand("ghost").await,
        Err(CouncilError::NotFound(_))
    ));
}

// ==================== Votes ====================

#[tokio::test(start_paused = true)]
async fn test_vote_accept_reports_tally_and_tie() {
    let mut h = harness(ScriptedResponder::new()).await;

    assert!(matches!(
        h.handle.accept_vote().await,
        Err(CouncilError::Precondition(_))
    ));

    h.handle.open_vote("Proceed?").await.unwrap();
    assert!(matches!(
        h.handle.open_vote("Another?").await,
        Err(CouncilError::Conflict(_))
    ));

    for agent in ["a", "b", "c"] {
        h.handle.cast_vote(agent, VoteChoice::Yes).await.unwrap();
    }
    for agent in ["d", "wisdom"] {
        h.handle.cast_vote(agent, VoteChoice::No).await.unwrap();
    }
    assert!(matches!(
        h.handle.cast_vote("a", VoteChoice::No).await,
        Err(CouncilError::Conflict(_))
    ));
    assert!(matches!(
        h.handle.cast_vote("ghost", VoteChoice::No).await,
        Err(CouncilError::NotFound(_))
    ));

    assert_eq!(h.handle.accept_vote().await.unwrap(), VoteOutcome::Yes);
    let closed = h
        .wait_for(|e| matches!(e, CouncilEvent::VoteClosed { .. }))
        .await;
    assert!(matches!(
        closed,
        CouncilEvent::VoteClosed { outcome: VoteOutcome::Yes, resolution: Resolution::Tally, .. }
    ));
    let stored = h.store.record("test").vote.unwrap();
    assert!(!stored.is_open());
    assert_eq!((stored.yes, stored.no), (3, 2));
    assert_eq!(stored.initiator, Speaker::Operator);

    // A closed vote takes no more ballots and can be replaced
    assert!(matches!(
        h.handle.cast_vote("a", VoteChoice::No).await,
        Err(CouncilError::Precondition(_))
    ));
    h.handle.open_vote("Split?").await.unwrap();
    h.handle.cast_vote("a", VoteChoice::Yes).await.unwrap();
    h.handle.cast_vote("b", VoteChoice::Yes).await.unwrap();
    h.handle.cast_vote("c", VoteChoice::No).await.unwrap();
    h.handle.cast_vote("d", VoteChoice::No).await.unwrap();
    assert_eq!(h.handle.accept_vote().await.unwrap(), VoteOutcome::Tie);
}

#[tokio::test(start_paused = true)]
async fn test_vote_decide_and_reset() {
    let h = harness(ScriptedResponder::new()).await;

    h.handle.open_vote("Ship it?").await.unwrap();
    h.handle.cast_vote("a", VoteChoice::Yes).await.unwrap();
    assert_eq!(
        h.handle.decide_vote(VoteChoice::No).await.unwrap(),
        VoteOutcome::No
    );
    let vote = h.handle.snapshot().await.unwrap().vote.unwrap();
    assert_eq!(vote.resolution, Some(Resolution::OperatorDecision));

    h.handle.reset_vote().await.unwrap();
    assert!(h.handle.snapshot().await.unwrap().vote.is_none());
    assert!(h.store.record("test").vote.is_none());

    assert!(matches!(
        h.handle.open_vote("   ").await,
        Err(CouncilError::Validation(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_store_failure_leaves_vote_unchanged() {
    let h = harness(ScriptedResponder::new()).await;

    h.store.reject_puts(true);
    assert!(matches!(
        h.handle.open_vote("Proceed?").await,
        Err(CouncilError::Transient(_))
    ));
    assert!(h.handle.snapshot().await.unwrap().vote.is_none());

    h.store.reject_puts(false);
    h.handle.open_vote("Proceed?").await.unwrap();
    h.handle.cast_vote("a", VoteChoice::Yes).await.unwrap();

    h.store.reject_puts(true);
    assert!(matches!(
        h.handle.cast_vote("b", VoteChoice::No).await,
        Err(CouncilError::Transient(_))
    ));
    assert!(matches!(
        h.handle.accept_vote().await,
        Err(CouncilError::Transient(_))
    ));
    assert!(matches!(
        h.handle.reset_vote().await,
        Err(CouncilError::Transient(_))
    ));
    let vote = h.handle.snapshot().await.unwrap().vote.unwrap();
    assert!(vote.is_open());
    assert_eq!((vote.yes, vote.no), (1, 0));

    // The failed ballot was never counted, so it can be cast again
    h.store.reject_puts(false);
    h.handle.cast_vote("b", VoteChoice::No).await.unwrap();
    assert_eq!(h.handle.accept_vote().await.unwrap(), VoteOutcome::Tie);
}

#[tokio::test(start_paused = true)]
async fn test_store_failure_leaves_record_unchanged() {
    let h = harness(ScriptedResponder::new()).await;

    h.store.reject_puts(true);
    assert!(matches!(
        h.handle.raise_hand("a").await,
        Err(CouncilError::Transient(_))
    ));
    assert!(matches!(
        h.handle.start_timer(5).await,
        Err(CouncilError::Transient(_))
    ));
    assert!(matches!(
        h.handle.convene("Budget").await,
        Err(CouncilError::Transient(_))
    ));
    let snapshot = h.handle.snapshot().await.unwrap();
    assert!(snapshot.raised_hands.is_empty());
    assert!(snapshot.timer_remaining_ms.is_none());
    assert!(snapshot.topic.is_empty());

    h.store.reject_puts(false);
    assert!(h.handle.raise_hand("a").await.unwrap());
}

// ==================== Temporal ====================

fn temporal_registry() -> AgentRegistry {
    AgentRegistry::new(
        vec![
            AgentProfile::new("aligned", "Aligned", 1).with_voice("alto"),
            AgentProfile::new("quadrature", "Quadrature", 3),
        ],
        None,
    )
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_temporal_release_delays_agent_messages() {
    let responder = ScriptedResponder::new().reply("aligned", "in phase");
    let mut h = harness_with(responder, temporal_registry()).await;

    assert_eq!(h.handle.set_temporal(true).await.unwrap(), 0);
    h.handle.raise_hand("aligned").await.unwrap();
    h.handle.open_floor().await.unwrap();

    let deferred = h
        .wait_for(|e| matches!(e, CouncilEvent::MessageDeferred { .. }))
        .await;
    let start = Instant::now();
    let CouncilEvent::MessageDeferred { delay, .. } = deferred else {
        unreachable!()
    };
    assert!(delay >= Duration::from_millis(500) && delay < Duration::from_millis(600));

    let released = h
        .wait_for(|e| matches!(e, CouncilEvent::MessageReleased { .. }))
        .await;
    assert!(Instant::now() - start >= Duration::from_millis(400));
    assert!(matches!(
        released,
        CouncilEvent::MessageReleased { message, voice } if message.content == "in phase" && voice.as_deref() == Some("alto")
    ));

    // Operator messages are never held back
    h.handle.speak("hello", None).await.unwrap();
    let released = h
        .wait_for(|e| matches!(e, CouncilEvent::MessageReleased { .. }))
        .await;
    assert!(matches!(released, CouncilEvent::MessageReleased { message, .. } if message.speaker == Speaker::Operator));
    assert_eq!(h.handle.snapshot().await.unwrap().temporal_pending, 0);
}

#[tokio::test(start_paused = true)]
async fn test_disabling_temporal_flushes_buffer() {
    let responder = ScriptedResponder::new().reply("quadrature", "out of phase");
    let mut h = harness_with(responder, temporal_registry()).await;

    h.handle.set_temporal(true).await.unwrap();
    h.handle.raise_hand("quadrature").await.unwrap();
    h.handle.open_floor().await.unwrap();

    let deferred = h
        .wait_for(|e| matches!(e, CouncilEvent::MessageDeferred { .. }))
        .await;
    let start = Instant::now();
    let CouncilEvent::MessageDeferred { delay, .. } = deferred else {
        unreachable!()
    };
    assert!(delay > Duration::from_millis(3500));
    assert_eq!(h.handle.snapshot().await.unwrap().temporal_pending, 1);

    assert_eq!(h.handle.set_temporal(false).await.unwrap(), 1);
    let released = h
        .wait_for(|e| matches!(e, CouncilEvent::MessageReleased { .. }))
        .await;
    assert!(Instant::now() - start < Duration::from_millis(3500));
    assert!(matches!(released, CouncilEvent::MessageReleased { message, .. } if message.content == "out of phase"));

    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.temporal_pending, 0);
    assert!(!snapshot.temporal_enabled);
}

// ==================== Council record ====================

#[tokio::test(start_paused = true)]
async fn test_convene_and_preserve() {
    let h = harness(ScriptedResponder::new()).await;

    assert!(matches!(
        h.handle.convene("  ").await,
        Err(CouncilError::Validation(_))
    ));
    h.handle.convene("Launch plan").await.unwrap();
    h.handle.speak("Let us begin.", None).await.unwrap();
    h.handle.raise_hand("b").await.unwrap();
    h.handle.start_timer(15).await.unwrap();
    h.handle.commit("c", "Draft the budget").await.unwrap();

    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.topic, "Launch plan");
    assert_eq!(snapshot.message_count, 1);
    assert_eq!(snapshot.raised_hands, vec![id("b")]);
    assert_eq!(snapshot.commitments, 1);
    assert!(snapshot.timer_remaining_ms.is_some());

    let archive = h.handle.preserve().await.unwrap();
    assert_eq!(archive, "archive-1");
    let archived = h.store.archives.lock().unwrap()[0].clone();
    assert_eq!(archived.topic, "Launch plan");
    assert_eq!(archived.messages.len(), 1);

    let snapshot = h.handle.snapshot().await.unwrap();
    assert!(snapshot.topic.is_empty());
    assert_eq!(snapshot.message_count, 0);
    assert!(h.store.record("test").messages.is_empty());

    h.handle.shutdown().await.unwrap();
    assert!(matches!(
        h.handle.snapshot().await,
        Err(CouncilError::Shutdown)
    ));
}
