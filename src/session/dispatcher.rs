use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};

use super::locale::Locale;
use super::log::MessageLog;
use super::turn::{Author, Turn, TurnId, TurnKind};
use crate::constants::{RESPONDER_TIMEOUT_SECS, SESSION_EVENT_CAPACITY};
use crate::responders::{Responder, ResponderError};

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Ready for a submission
    Idle,
    /// A request is in flight; submissions are ignored
    Awaiting,
    /// The hosting view went away; terminal
    Disposed,
}

/// Notifications for whoever renders the conversation
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    TurnAppended(Turn),
    AwaitingChanged(bool),
    Disposed,
}

/// Why a submission did not start a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    EmptyInput,
    RequestAlreadyInFlight,
    Disposed,
}

/// What `Session::submit` did with the text it was given
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// A user turn with this id was appended and the responder invoked
    Dispatched(TurnId),
    /// Nothing changed
    Ignored(IgnoreReason),
}

impl Submission {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, Submission::Dispatched(_))
    }
}

/// Tunables for the request lifecycle
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Upper bound on a single responder call
    pub responder_timeout: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            responder_timeout: Duration::from_secs(RESPONDER_TIMEOUT_SECS),
        }
    }
}

struct Inner {
    log: MessageLog,
    locale: Locale,
    status: SessionStatus,
    in_flight: Option<JoinHandle<()>>,
}

/// State shared between the session handle and its in-flight request
struct Shared {
    inner: Mutex<Inner>,
    events: broadcast::Sender<SessionEvent>,
    status: watch::Sender<SessionStatus>,
}

impl Shared {
    fn set_status(&self, inner: &mut Inner, status: SessionStatus) {
        let was_awaiting = inner.status == SessionStatus::Awaiting;
        inner.status = status;

        // Observers see the flip before anyone blocked in wait_idle wakes up
        let is_awaiting = status == SessionStatus::Awaiting;
        if was_awaiting != is_awaiting && status != SessionStatus::Disposed {
            let _ = self.events.send(SessionEvent::AwaitingChanged(is_awaiting));
        }
        self.status.send_replace(status);
    }

    fn push_turn(&self, inner: &mut Inner, author: Author, kind: TurnKind, text: &str) -> Turn {
        let turn = Turn::new(inner.log.next_id(), author, kind, text);
        inner.log.append(turn.clone());
        let _ = self.events.send(SessionEvent::TurnAppended(turn.clone()));
        turn
    }

    /// Fold a finished responder call back into the log
    fn complete(&self, outcome: Result<String, ResponderError>, locale: Locale) {
        let mut inner = self.inner.lock();
        if inner.status == SessionStatus::Disposed {
            debug!("Discarding stale response after teardown");
            return;
        }
        inner.in_flight = None;

        let (kind, text) = match outcome {
            Ok(reply) if !reply.trim().is_empty() => (TurnKind::Message, reply.trim().to_string()),
            Ok(_) => {
                warn!(kind = "malformed", "Responder returned an empty reply");
                (TurnKind::Failure, locale.failure_message().to_string())
            }
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "Responder failed");
                (TurnKind::Failure, locale.failure_message().to_string())
            }
        };

        let turn = self.push_turn(&mut inner, Author::Assistant, kind, &text);
        debug!(turn_id = turn.id(), ?kind, "Assistant turn appended");
        self.set_status(&mut inner, SessionStatus::Idle);
    }
}

/// Aborts the responder call when the supervising task is aborted
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// In-memory conversation for one mounted assistant view
///
/// Dropping the session disposes it; a response that arrives afterwards is discarded.
pub struct Session {
    shared: Arc<Shared>,
    responder: Arc<dyn Responder>,
    settings: SessionSettings,
}

impl Session {
    /// Create a session seeded with the locale's welcome message
    pub fn new(responder: Arc<dyn Responder>, locale: Locale, settings: SessionSettings) -> Self {
        let (events, _) = broadcast::channel(SESSION_EVENT_CAPACITY);
        let (status, _) = watch::channel(SessionStatus::Idle);

        let mut log = MessageLog::new();
        log.append(Turn::new(
            log.next_id(),
            Author::Assistant,
            TurnKind::Welcome,
            locale.welcome_message(),
        ));

        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    log,
                    locale,
                    status: SessionStatus::Idle,
                    in_flight: None,
                }),
                events,
                status,
            }),
            responder,
            settings,
        }
    }

    /// Submit user text to the assistant
    ///
    /// Blank text, a request already in flight, or a disposed session make this
    /// a no-op. Otherwise the user turn is appended and the session is awaiting
    /// before this returns; the reply (or a failure turn) lands asynchronously.
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, raw_text: &str) -> Submission {
        if raw_text.trim().is_empty() {
            debug!("Ignoring empty submission");
            return Submission::Ignored(IgnoreReason::EmptyInput);
        }

        let mut inner = self.shared.inner.lock();
        match inner.status {
            SessionStatus::Disposed => {
                debug!("Ignoring submission to a disposed session");
                return Submission::Ignored(IgnoreReason::Disposed);
            }
            SessionStatus::Awaiting => {
                debug!("Ignoring submission while a request is in flight");
                return Submission::Ignored(IgnoreReason::RequestAlreadyInFlight);
            }
            SessionStatus::Idle => {}
        }

        let history = inner.log.all();
        let turn = self.shared.push_turn(&mut inner, Author::User, TurnKind::Message, raw_text);
        self.shared.set_status(&mut inner, SessionStatus::Awaiting);

        let locale = inner.locale;
        let prompt = raw_text.to_string();
        let shared = Arc::clone(&self.shared);
        let responder = Arc::clone(&self.responder);
        let limit = self.settings.responder_timeout;

        info!(turn_id = turn.id(), %locale, "Dispatching user turn");
        inner.in_flight = Some(tokio::spawn(async move {
            // The call runs in its own task so a panicking responder still ends the turn
            let call = tokio::spawn(async move {
                match tokio::time::timeout(limit, responder.respond(&prompt, locale, &history)).await {
                    Ok(result) => result,
                    Err(_) => Err(ResponderError::Timeout(limit)),
                }
            });
            let _abort_call = AbortOnDrop(call.abort_handle());

            let outcome = match call.await {
                Ok(result) => result,
                Err(e) if e.is_panic() => Err(ResponderError::Crashed(e.to_string())),
                Err(_) => return,
            };
            shared.complete(outcome, locale);
        }));

        Submission::Dispatched(turn.id())
    }

    /// Tear the session down; any pending reply is dropped
    pub fn dispose(&self) {
        let mut inner = self.shared.inner.lock();
        if inner.status == SessionStatus::Disposed {
            return;
        }
        if let Some(handle) = inner.in_flight.take() {
            debug!("Cancelling in-flight request");
            handle.abort();
        }
        self.shared.set_status(&mut inner, SessionStatus::Disposed);
        let _ = self.shared.events.send(SessionEvent::Disposed);
    }

    /// Switch the reply language for subsequent submissions
    pub fn set_locale(&self, locale: Locale) {
        self.shared.inner.lock().locale = locale;
    }

    pub fn locale(&self) -> Locale {
        self.shared.inner.lock().locale
    }

    /// Snapshot of the conversation so far
    pub fn turns(&self) -> Vec<Turn> {
        self.shared.inner.lock().log.all()
    }

    pub fn turn_count(&self) -> usize {
        self.shared.inner.lock().log.len()
    }

    pub fn last_turn(&self) -> Option<Turn> {
        self.shared.inner.lock().log.last().cloned()
    }

    pub fn status(&self) -> SessionStatus {
        self.shared.inner.lock().status
    }

    pub fn is_awaiting(&self) -> bool {
        self.status() == SessionStatus::Awaiting
    }

    pub fn is_disposed(&self) -> bool {
        self.status() == SessionStatus::Disposed
    }

    /// Receive turn and state notifications from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.events.subscribe()
    }

    /// Resolve once no request is in flight
    pub async fn wait_idle(&self) {
        let mut rx = self.shared.status.subscribe();
        let _ = rx.wait_for(|status| *status != SessionStatus::Awaiting).await;
    }

    pub fn responder(&self) -> &Arc<dyn Responder> {
        &self.responder
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responders::MockResponder;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use tokio::sync::oneshot;

    /// Responder whose reply is released by the test
    struct GatedResponder {
        gate: Mutex<Option<oneshot::Receiver<Result<String, ResponderError>>>>,
        calls: Mutex<Vec<(String, Locale, usize)>>,
    }

    impl GatedResponder {
        fn new() -> (Arc<Self>, oneshot::Sender<Result<String, ResponderError>>) {
            let (tx, rx) = oneshot::channel();
            let responder = Arc::new(Self {
                gate: Mutex::new(Some(rx)),
                calls: Mutex::new(Vec::new()),
            });
            (responder, tx)
        }
    }

    #[async_trait]
    impl Responder for GatedResponder {
        async fn respond(
            &self,
            text: &str,
            locale: Locale,
            history: &[Turn],
        ) -> Result<String, ResponderError> {
            self.calls.lock().push((text.to_string(), locale, history.len()));
            let gate = self.gate.lock().take();
            match gate {
                Some(rx) => rx
                    .await
                    .unwrap_or_else(|_| Err(ResponderError::Network("gate closed".into()))),
                None => Err(ResponderError::Network("already answered".into())),
            }
        }

        fn name(&self) -> &str {
            "gated"
        }

        fn is_local(&self) -> bool {
            true
        }
    }

    fn replying(reply: &'static str) -> Arc<dyn Responder> {
        let mut mock = MockResponder::new();
        mock.expect_respond()
            .returning(move |_, _, _| Ok(reply.to_string()));
        Arc::new(mock)
    }

    fn drain(rx: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_fresh_session_has_only_welcome() {
        let session = Session::new(replying("unused"), Locale::En, SessionSettings::default());

        let turns = session.turns();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].author(), Author::Assistant);
        assert_eq!(turns[0].kind(), TurnKind::Welcome);
        assert_eq!(turns[0].text(), Locale::En.welcome_message());
        assert!(!session.is_awaiting());
    }

    #[tokio::test]
    async fn test_welcome_follows_locale() {
        let session = Session::new(replying("unused"), Locale::Pa, SessionSettings::default());
        assert_eq!(session.turns()[0].text(), Locale::Pa.welcome_message());
    }

    #[tokio::test]
    async fn test_blank_submissions_are_noops() {
        let mut mock = MockResponder::new();
        mock.expect_respond().never();
        let session = Session::new(Arc::new(mock), Locale::En, SessionSettings::default());
        let mut rx = session.subscribe();

        assert_eq!(session.submit(""), Submission::Ignored(IgnoreReason::EmptyInput));
        assert_eq!(session.submit("   \n\t"), Submission::Ignored(IgnoreReason::EmptyInput));

        assert_eq!(session.turn_count(), 1);
        assert!(!session.is_awaiting());
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_leaf_spot_round_trip() {
        let (responder, release) = GatedResponder::new();
        let session = Session::new(responder.clone(), Locale::En, SessionSettings::default());

        let submission = session.submit("How do I treat leaf spot on tomatoes?");
        assert_eq!(submission, Submission::Dispatched(2));
        assert!(session.is_awaiting());
        assert_eq!(session.turn_count(), 2);
        assert_eq!(session.last_turn().unwrap().author(), Author::User);

        release.send(Ok("Remove affected leaves...".to_string())).unwrap();
        session.wait_idle().await;

        let turns = session.turns();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[2].author(), Author::Assistant);
        assert_eq!(turns[2].kind(), TurnKind::Message);
        assert_eq!(turns[2].text(), "Remove affected leaves...");
        assert!(!session.is_awaiting());

        let calls = responder.calls.lock().clone();
        assert_eq!(
            calls,
            vec![("How do I treat leaf spot on tomatoes?".to_string(), Locale::En, 1)]
        );
    }

    #[tokio::test]
    async fn test_awaiting_flips_once_each_way() {
        let (responder, release) = GatedResponder::new();
        let session = Session::new(responder, Locale::En, SessionSettings::default());
        let mut rx = session.subscribe();

        session.submit("soil pH?");
        assert!(session.is_awaiting());

        release.send(Ok("Keep it between 6 and 7.".to_string())).unwrap();
        session.wait_idle().await;

        let flips: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                SessionEvent::AwaitingChanged(v) => Some(v),
                _ => None,
            })
            .collect();
        assert_eq!(flips, vec![true, false]);
    }

    #[tokio::test]
    async fn test_second_submit_while_awaiting_is_ignored() {
        let (responder, release) = GatedResponder::new();
        let session = Session::new(responder.clone(), Locale::En, SessionSettings::default());

        assert!(session.submit("first question").is_dispatched());
        assert_eq!(
            session.submit("second question"),
            Submission::Ignored(IgnoreReason::RequestAlreadyInFlight)
        );
        assert_eq!(session.turn_count(), 2);

        release.send(Ok("answer".to_string())).unwrap();
        session.wait_idle().await;

        let user_turns: Vec<_> = session
            .turns()
            .into_iter()
            .filter(|t| t.is_user())
            .map(|t| t.text().to_string())
            .collect();
        assert_eq!(user_turns, vec!["first question".to_string()]);
        assert_eq!(responder.calls.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_becomes_one_error_turn() {
        let mut mock = MockResponder::new();
        mock.expect_respond()
            .times(2)
            .returning(|_, _, _| Err(ResponderError::Network("connection reset".into())));
        let session = Session::new(Arc::new(mock), Locale::Hi, SessionSettings::default());

        assert!(session.submit("मिट्टी की जाँच कैसे करें?").is_dispatched());
        session.wait_idle().await;

        let turns = session.turns();
        assert_eq!(turns.len(), 3);
        let failures: Vec<_> = turns.iter().filter(|t| t.kind() == TurnKind::Failure).collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].author(), Author::Assistant);
        assert_eq!(failures[0].text(), Locale::Hi.failure_message());
        assert!(!session.is_awaiting());

        // Still usable after a failure
        assert!(session.submit("फिर से").is_dispatched());
        session.wait_idle().await;
        assert_eq!(session.turn_count(), 5);
    }

    #[tokio::test]
    async fn test_blank_reply_counts_as_failure() {
        let session = Session::new(replying("   "), Locale::En, SessionSettings::default());

        session.submit("hello");
        session.wait_idle().await;

        let last = session.last_turn().unwrap();
        assert_eq!(last.kind(), TurnKind::Failure);
        assert_eq!(last.text(), Locale::En.failure_message());
    }

    #[tokio::test]
    async fn test_timeout_resolves_to_failure() {
        let (responder, _release) = GatedResponder::new();
        let settings = SessionSettings {
            responder_timeout: Duration::from_millis(20),
        };
        let session = Session::new(responder, Locale::Pa, settings);

        session.submit("ਮੌਸਮ?");
        session.wait_idle().await;

        let last = session.last_turn().unwrap();
        assert_eq!(last.kind(), TurnKind::Failure);
        assert_eq!(last.text(), Locale::Pa.failure_message());
    }

    #[tokio::test]
    async fn test_dispose_discards_pending_reply() {
        let (responder, release) = GatedResponder::new();
        let session = Session::new(responder, Locale::En, SessionSettings::default());
        let mut rx = session.subscribe();

        session.submit("will this arrive?");
        session.dispose();
        let _ = release.send(Ok("too late".to_string()));
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(session.status(), SessionStatus::Disposed);
        assert_eq!(session.turn_count(), 2);
        assert_eq!(
            session.submit("anyone there?"),
            Submission::Ignored(IgnoreReason::Disposed)
        );

        let events = drain(&mut rx);
        assert_eq!(events.last(), Some(&SessionEvent::Disposed));
        assert!(!events
            .iter()
            .any(|e| matches!(e, SessionEvent::TurnAppended(t) if t.author() == Author::Assistant)));
    }

    #[tokio::test]
    async fn test_late_completion_after_dispose_is_ignored() {
        let session = Session::new(replying("unused"), Locale::En, SessionSettings::default());
        session.dispose();
        session.dispose();

        session.shared.complete(Ok("stale".to_string()), Locale::En);

        assert_eq!(session.turn_count(), 1);
        assert!(session.is_disposed());
    }

    #[tokio::test]
    async fn test_turn_count_never_decreases() {
        let session = Session::new(replying("ok"), Locale::En, SessionSettings::default());
        let mut previous = session.turn_count();

        for text in ["water", "", "soil", "   ", "crop"] {
            session.submit(text);
            assert!(session.turn_count() >= previous);
            previous = session.turn_count();
            session.wait_idle().await;
            assert!(session.turn_count() >= previous);
            previous = session.turn_count();
        }

        let ids: Vec<_> = session.turns().iter().map(|t| t.id()).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
        assert_eq!(ids.len(), 7);
    }

    #[tokio::test]
    async fn test_locale_switch_affects_later_failures() {
        let mut mock = MockResponder::new();
        mock.expect_respond()
            .returning(|_, _, _| Err(ResponderError::Quota("daily limit".into())));
        let session = Session::new(Arc::new(mock), Locale::En, SessionSettings::default());

        session.set_locale(Locale::Pa);
        session.submit("help");
        session.wait_idle().await;

        assert_eq!(session.turns()[0].text(), Locale::En.welcome_message());
        assert_eq!(session.last_turn().unwrap().text(), Locale::Pa.failure_message());
    }

    #[tokio::test]
    async fn test_user_text_is_kept_as_typed() {
        let (responder, release) = GatedResponder::new();
        let session = Session::new(responder.clone(), Locale::En, SessionSettings::default());

        session.submit("  rain tomorrow?\n");
        assert_eq!(session.last_turn().unwrap().text(), "  rain tomorrow?\n");

        release.send(Ok("Likely.".to_string())).unwrap();
        session.wait_idle().await;
        assert_eq!(responder.calls.lock()[0].0, "  rain tomorrow?\n");
    }

    /// Responder that panics on every call
    struct PanickingResponder;

    #[async_trait]
    impl Responder for PanickingResponder {
        async fn respond(&self, _: &str, _: Locale, _: &[Turn]) -> Result<String, ResponderError> {
            panic!("responder blew up")
        }

        fn name(&self) -> &str {
            "panicking"
        }

        fn is_local(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_panicking_responder_becomes_failure_turn() {
        let session = Session::new(Arc::new(PanickingResponder), Locale::Hi, SessionSettings::default());

        assert!(session.submit("hello").is_dispatched());
        tokio::time::timeout(Duration::from_millis(500), session.wait_idle())
            .await
            .expect("session stuck awaiting after a responder panic");

        let last = session.last_turn().unwrap();
        assert_eq!(session.turn_count(), 3);
        assert_eq!(last.kind(), TurnKind::Failure);
        assert_eq!(last.text(), Locale::Hi.failure_message());
        assert_eq!(session.status(), SessionStatus::Idle);

        // Still usable after the crash
        assert!(session.submit("again").is_dispatched());
        tokio::time::timeout(Duration::from_millis(500), session.wait_idle())
            .await
            .unwrap();
        assert_eq!(session.turn_count(), 5);
    }

    #[tokio::test]
    async fn test_dispose_aborts_the_responder_call() {
        let (responder, release) = GatedResponder::new();
        let session = Session::new(responder.clone(), Locale::En, SessionSettings::default());

        session.submit("slow one");
        while responder.calls.lock().is_empty() {
            tokio::task::yield_now().await;
        }
        session.dispose();
        tokio::time::sleep(Duration::from_millis(10)).await;

        // The gate's receiver went away with the aborted call
        assert!(release.send(Ok("late".to_string())).is_err());
        assert_eq!(session.turn_count(), 2);
    }
}
