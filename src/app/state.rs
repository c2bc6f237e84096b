use std::fmt;
use tracing::debug;

use crate::constants::{KNOWN_SCREENS, SCREEN_CHAT, SCREEN_DASHBOARD};
use crate::session::Locale;

/// Opaque identifier of a screen in the shell
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScreenId(String);

impl ScreenId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_chat(&self) -> bool {
        self.0 == SCREEN_CHAT
    }

    /// Whether the shell ships a view for this id
    pub fn is_known(&self) -> bool {
        KNOWN_SCREENS.contains(&self.0.as_str())
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What changed after a navigation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub from: ScreenId,
    pub to: ScreenId,
}

impl Navigation {
    pub fn entered_chat(&self) -> bool {
        !self.from.is_chat() && self.to.is_chat()
    }

    pub fn left_chat(&self) -> bool {
        self.from.is_chat() && !self.to.is_chat()
    }
}

/// Shell-wide state handed down to views explicitly
#[derive(Debug, Clone)]
pub struct AppContext {
    screen: ScreenId,
    locale: Locale,
    online: bool,
}

impl AppContext {
    /// Create a new context on the dashboard
    pub fn new(locale: Locale) -> Self {
        Self {
            screen: ScreenId::new(SCREEN_DASHBOARD),
            locale,
            online: true,
        }
    }

    /// Switch to another screen; returns `None` when already there
    pub fn navigate_to(&mut self, screen_id: &str) -> Option<Navigation> {
        let to = ScreenId::new(screen_id.trim());
        if to == self.screen {
            return None;
        }
        debug!(from = %self.screen, to = %to, "Navigating");
        let from = std::mem::replace(&mut self.screen, to.clone());
        Some(Navigation { from, to })
    }

    pub fn screen(&self) -> &ScreenId {
        &self.screen
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn set_online(&mut self, online: bool) {
        self.online = online;
    }

    pub fn is_online(&self) -> bool {
        self.online
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}
