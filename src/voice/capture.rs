use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::traits::SpeechRecognizer;
use super::types::{RecognitionEvent, VoiceDelivery, VoiceError, VoicePolicy};
use crate::session::{Locale, Session, Submission};

/// Bookkeeping for the capture currently holding the microphone
struct ActiveCapture {
    /// Taken by `stop_listening`; the slot itself stays until the lease drops
    cancel: Option<oneshot::Sender<()>>,
}

/// Scoped hold on the microphone; dropping it releases the device
struct MicrophoneLease<'a> {
    recognizer: &'a dyn SpeechRecognizer,
    active: &'a Mutex<Option<ActiveCapture>>,
}

impl Drop for MicrophoneLease<'_> {
    fn drop(&mut self) {
        self.recognizer.stop();
        self.active.lock().take();
        debug!("Microphone released");
    }
}

/// Bridges a platform recognizer into the session's submit path
pub struct VoiceCapture {
    recognizer: Arc<dyn SpeechRecognizer>,
    policy: VoicePolicy,
    active: Mutex<Option<ActiveCapture>>,
}

impl VoiceCapture {
    pub fn new(recognizer: Arc<dyn SpeechRecognizer>, policy: VoicePolicy) -> Self {
        Self {
            recognizer,
            policy,
            active: Mutex::new(None),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.recognizer.is_supported()
    }

    pub fn is_listening(&self) -> bool {
        self.active.lock().is_some()
    }

    pub fn policy(&self) -> VoicePolicy {
        self.policy
    }

    /// Capture one utterance in the given language
    ///
    /// Resolves with the recognized text, or `None` when capture ended without
    /// a result or was stopped. The microphone is released before this returns,
    /// and also if the returned future is dropped early.
    pub async fn start_listening(&self, locale: Locale) -> Result<Option<String>, VoiceError> {
        if !self.recognizer.is_supported() {
            return Err(VoiceError::UnsupportedCapability);
        }

        let (cancel_tx, mut cancel_rx) = oneshot::channel();
        {
            let mut active = self.active.lock();
            if active.is_some() {
                return Err(VoiceError::AlreadyListening);
            }
            *active = Some(ActiveCapture {
                cancel: Some(cancel_tx),
            });
        }

        let _lease = MicrophoneLease {
            recognizer: self.recognizer.as_ref(),
            active: &self.active,
        };

        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        self.recognizer.start(locale.speech_tag(), events_tx)?;
        debug!(language = locale.speech_tag(), "Listening");

        loop {
            tokio::select! {
                _ = &mut cancel_rx => {
                    debug!("Listening stopped");
                    return Ok(None);
                }
                event = events_rx.recv() => match event {
                    Some(RecognitionEvent::Result(text)) => {
                        let text = text.trim();
                        if !text.is_empty() {
                            return Ok(Some(text.to_string()));
                        }
                    }
                    Some(RecognitionEvent::Error(kind)) => {
                        warn!(error = %kind, "Speech recognition error");
                        return Err(VoiceError::Recognition(kind));
                    }
                    Some(RecognitionEvent::End) | None => return Ok(None),
                },
            }
        }
    }

    /// Cancel the running capture without output; no-op when idle
    pub fn stop_listening(&self) {
        let cancel = self
            .active
            .lock()
            .as_mut()
            .and_then(|capture| capture.cancel.take());

        if let Some(cancel) = cancel {
            self.recognizer.stop();
            let _ = cancel.send(());
        }
    }

    /// Hand a recognized utterance to the host according to the voice policy
    ///
    /// Auto-submission goes through `Session::submit`, so the awaiting gate
    /// applies; text the gate refuses comes back as a draft.
    pub fn deliver(&self, utterance: String, session: &Session) -> VoiceDelivery {
        match self.policy {
            VoicePolicy::FillInput => VoiceDelivery::Draft(utterance),
            VoicePolicy::AutoSubmit => match session.submit(&utterance) {
                Submission::Dispatched(id) => VoiceDelivery::Submitted(id),
                Submission::Ignored(reason) => {
                    debug!(?reason, "Voice submission refused; keeping as draft");
                    VoiceDelivery::Draft(utterance)
                }
            },
        }
    }
}

impl Drop for VoiceCapture {
    fn drop(&mut self) {
        self.stop_listening();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responders::LocalResponder;
    use crate::session::SessionSettings;
    use crate::voice::{RecognitionErrorKind, UnsupportedRecognizer};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    /// Recognizer that tracks microphone ownership and replays scripted events
    #[derive(Default)]
    struct FakeRecognizer {
        mic_held: AtomicBool,
        starts: AtomicUsize,
        last_tag: Mutex<Option<String>>,
        script: Mutex<Vec<RecognitionEvent>>,
        sender: Mutex<Option<mpsc::UnboundedSender<RecognitionEvent>>>,
    }

    impl FakeRecognizer {
        fn scripted(events: Vec<RecognitionEvent>) -> Arc<Self> {
            let fake = Self::default();
            *fake.script.lock() = events;
            Arc::new(fake)
        }

        fn silent() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn mic_held(&self) -> bool {
            self.mic_held.load(Ordering::SeqCst)
        }
    }

    impl SpeechRecognizer for FakeRecognizer {
        fn is_supported(&self) -> bool {
            true
        }

        fn start(
            &self,
            language_tag: &str,
            events: mpsc::UnboundedSender<RecognitionEvent>,
        ) -> Result<(), VoiceError> {
            assert!(!self.mic_held.swap(true, Ordering::SeqCst), "microphone acquired twice");
            self.starts.fetch_add(1, Ordering::SeqCst);
            *self.last_tag.lock() = Some(language_tag.to_string());
            for event in self.script.lock().drain(..) {
                let _ = events.send(event);
            }
            *self.sender.lock() = Some(events);
            Ok(())
        }

        fn stop(&self) {
            self.mic_held.store(false, Ordering::SeqCst);
            self.sender.lock().take();
        }
    }

    fn local_session() -> Session {
        Session::new(Arc::new(LocalResponder::default()), Locale::En, SessionSettings::default())
    }

    #[tokio::test]
    async fn test_unsupported_platform_never_touches_microphone() {
        let capture = VoiceCapture::new(Arc::new(UnsupportedRecognizer), VoicePolicy::FillInput);

        let result = capture.start_listening(Locale::En).await;
        assert_eq!(result, Err(VoiceError::UnsupportedCapability));
        assert!(!capture.is_listening());
    }

    #[tokio::test]
    async fn test_unsupported_check_happens_before_start() {
        struct NoSpeech {
            starts: AtomicUsize,
        }
        impl SpeechRecognizer for NoSpeech {
            fn is_supported(&self) -> bool {
                false
            }
            fn start(&self, _: &str, _: mpsc::UnboundedSender<RecognitionEvent>) -> Result<(), VoiceError> {
                self.starts.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            fn stop(&self) {}
        }

        let platform = Arc::new(NoSpeech {
            starts: AtomicUsize::new(0),
        });
        let capture = VoiceCapture::new(platform.clone(), VoicePolicy::FillInput);

        assert_eq!(
            capture.start_listening(Locale::Pa).await,
            Err(VoiceError::UnsupportedCapability)
        );
        assert_eq!(platform.starts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_recognized_utterance_is_returned() {
        let fake = FakeRecognizer::scripted(vec![
            RecognitionEvent::Result("  how much water for wheat  ".into()),
            RecognitionEvent::End,
        ]);
        let capture = VoiceCapture::new(fake.clone(), VoicePolicy::FillInput);

        let result = capture.start_listening(Locale::Hi).await.unwrap();
        assert_eq!(result.as_deref(), Some("how much water for wheat"));
        assert_eq!(fake.last_tag.lock().as_deref(), Some("hi-IN"));
        assert!(!fake.mic_held());
        assert!(!capture.is_listening());
    }

    #[tokio::test]
    async fn test_end_without_result_yields_nothing() {
        let fake = FakeRecognizer::scripted(vec![RecognitionEvent::End]);
        let capture = VoiceCapture::new(fake.clone(), VoicePolicy::FillInput);

        assert_eq!(capture.start_listening(Locale::En).await, Ok(None));
        assert!(!fake.mic_held());
    }

    #[tokio::test]
    async fn test_recognizer_error_releases_microphone() {
        let fake = FakeRecognizer::scripted(vec![RecognitionEvent::Error(RecognitionErrorKind::NoSpeech)]);
        let capture = VoiceCapture::new(fake.clone(), VoicePolicy::FillInput);

        assert_eq!(
            capture.start_listening(Locale::En).await,
            Err(VoiceError::Recognition(RecognitionErrorKind::NoSpeech))
        );
        assert!(!fake.mic_held());
        assert!(!capture.is_listening());
    }

    #[tokio::test]
    async fn test_stop_listening_cancels_without_output() {
        let fake = FakeRecognizer::silent();
        let capture = VoiceCapture::new(fake.clone(), VoicePolicy::FillInput);

        let stopper = async {
            tokio::task::yield_now().await;
            assert!(capture.is_listening());
            assert!(fake.mic_held());
            capture.stop_listening();
            capture.stop_listening();
        };
        let (result, _) = tokio::join!(capture.start_listening(Locale::En), stopper);

        assert_eq!(result, Ok(None));
        assert!(!fake.mic_held());
        assert!(!capture.is_listening());
    }

    #[tokio::test]
    async fn test_second_start_while_listening_is_rejected() {
        let fake = FakeRecognizer::silent();
        let capture = VoiceCapture::new(fake.clone(), VoicePolicy::FillInput);

        let second = async {
            tokio::task::yield_now().await;
            let result = capture.start_listening(Locale::En).await;
            capture.stop_listening();
            result
        };
        let (first, second) = tokio::join!(capture.start_listening(Locale::En), second);

        assert_eq!(first, Ok(None));
        assert_eq!(second, Err(VoiceError::AlreadyListening));
        assert_eq!(fake.starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dropping_listen_future_releases_microphone() {
        let fake = FakeRecognizer::silent();
        let capture = VoiceCapture::new(fake.clone(), VoicePolicy::FillInput);

        let timed_out = tokio::time::timeout(Duration::from_millis(10), capture.start_listening(Locale::En)).await;
        assert!(timed_out.is_err());
        assert!(!fake.mic_held());
        assert!(!capture.is_listening());
    }

    #[tokio::test]
    async fn test_repeated_cycles_do_not_leak() {
        let fake = FakeRecognizer::silent();
        let capture = VoiceCapture::new(fake.clone(), VoicePolicy::FillInput);

        for _ in 0..5 {
            let stopper = async {
                tokio::task::yield_now().await;
                capture.stop_listening();
            };
            let (result, _) = tokio::join!(capture.start_listening(Locale::En), stopper);
            assert_eq!(result, Ok(None));
            assert!(!fake.mic_held());
        }
        assert_eq!(fake.starts.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_stop_when_idle_is_noop() {
        let fake = FakeRecognizer::silent();
        let capture = VoiceCapture::new(fake.clone(), VoicePolicy::FillInput);
        capture.stop_listening();
        assert!(!capture.is_listening());
        assert_eq!(fake.starts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fill_input_policy_returns_draft() {
        let capture = VoiceCapture::new(FakeRecognizer::silent(), VoicePolicy::FillInput);
        let session = local_session();

        let delivery = capture.deliver("soil test".to_string(), &session);
        assert_eq!(delivery, VoiceDelivery::Draft("soil test".to_string()));
        assert_eq!(session.turn_count(), 1);
    }

    #[tokio::test]
    async fn test_auto_submit_respects_awaiting_gate() {
        let capture = VoiceCapture::new(FakeRecognizer::silent(), VoicePolicy::AutoSubmit);
        let session = local_session();

        assert_eq!(
            capture.deliver("soil test".to_string(), &session),
            VoiceDelivery::Submitted(2)
        );
        assert!(session.is_awaiting());

        assert_eq!(
            capture.deliver("and water?".to_string(), &session),
            VoiceDelivery::Draft("and water?".to_string())
        );

        session.wait_idle().await;
        assert_eq!(session.turn_count(), 3);
    }
}
