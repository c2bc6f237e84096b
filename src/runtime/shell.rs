use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::{
    app::{AppContext, Config, Navigation},
    constants::SCREEN_CHAT,
    responders::Responder,
    session::{Locale, Session, SessionSettings, Submission},
    utils::AgrimateError,
    voice::{SpeechRecognizer, VoiceCapture, VoiceDelivery, VoiceError},
};

/// A line of input from the interactive shell
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    /// Plain text for the assistant
    Say(String),
    Goto(String),
    Lang(Locale),
    Online(bool),
    Voice,
    History,
    Help,
    Quit,
}

impl ShellCommand {
    pub fn parse(line: &str) -> Result<Self, AgrimateError> {
        let line = line.trim();
        let Some(rest) = line.strip_prefix(':') else {
            return Ok(Self::Say(line.to_string()));
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();

        match (name, arg) {
            ("goto" | "go", Some(screen)) => Ok(Self::Goto(screen.to_string())),
            ("lang", Some(code)) => Ok(Self::Lang(code.parse()?)),
            ("online", Some("on")) => Ok(Self::Online(true)),
            ("online", Some("off")) => Ok(Self::Online(false)),
            ("voice" | "mic", None) => Ok(Self::Voice),
            ("history", None) => Ok(Self::History),
            ("help" | "h", None) => Ok(Self::Help),
            ("quit" | "q" | "exit", None) => Ok(Self::Quit),
            _ => Err(AgrimateError::UnknownCommand(line.to_string())),
        }
    }
}

/// Hosts the app context and mounts a session while the chat screen is shown
pub struct Shell {
    context: AppContext,
    responder: Arc<dyn Responder>,
    settings: SessionSettings,
    voice: VoiceCapture,
    session: Option<Session>,
}

impl Shell {
    pub fn new(config: &Config, responder: Arc<dyn Responder>, recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        Self {
            context: AppContext::new(config.locale),
            responder,
            settings: SessionSettings {
                responder_timeout: Duration::from_secs(config.responder.timeout_secs),
            },
            voice: VoiceCapture::new(recognizer, config.voice.policy),
            session: None,
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// The mounted session, present only on the chat screen
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn voice(&self) -> &VoiceCapture {
        &self.voice
    }

    /// Switch screens, mounting or unmounting the chat session as needed
    pub fn navigate(&mut self, screen_id: &str) -> Option<Navigation> {
        let navigation = self.context.navigate_to(screen_id)?;

        if navigation.left_chat() {
            if let Some(session) = self.session.take() {
                session.dispose();
            }
            self.voice.stop_listening();
        }
        if navigation.entered_chat() {
            info!(locale = %self.context.locale(), responder = self.responder.name(), "Opening chat");
            self.session = Some(Session::new(
                Arc::clone(&self.responder),
                self.context.locale(),
                self.settings.clone(),
            ));
        }

        Some(navigation)
    }

    pub fn open_chat(&mut self) -> Option<Navigation> {
        self.navigate(SCREEN_CHAT)
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.context.set_locale(locale);
        if let Some(session) = &self.session {
            session.set_locale(locale);
        }
    }

    pub fn set_online(&mut self, online: bool) {
        debug!(online, "Connectivity changed");
        self.context.set_online(online);
    }

    /// Send text to the mounted session; `None` when chat is not open
    pub fn submit(&self, text: &str) -> Option<Submission> {
        self.session.as_ref().map(|session| session.submit(text))
    }

    /// Capture one utterance and deliver it per the voice policy
    ///
    /// Returns `Ok(None)` when nothing was recognized or chat is not open.
    pub async fn capture_voice(&self) -> Result<Option<VoiceDelivery>, VoiceError> {
        let Some(session) = &self.session else {
            return Ok(None);
        };

        let utterance = self.voice.start_listening(self.context.locale()).await?;
        Ok(utterance.map(|text| self.voice.deliver(text, session)))
    }

    /// Leave every screen, disposing any open session
    pub fn shutdown(&mut self) {
        self.voice.stop_listening();
        if let Some(session) = self.session.take() {
            session.dispose();
        }
    }
}
