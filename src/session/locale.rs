use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::AgrimateError;

/// Languages the assistant can converse in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Hi,
    Pa,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::En, Locale::Hi, Locale::Pa];

    /// Short code as used in config files and on the command line
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Hi => "hi",
            Locale::Pa => "pa",
        }
    }

    /// English name of the language, used to tag remote prompts
    pub fn language_name(&self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Hi => "Hindi",
            Locale::Pa => "Punjabi",
        }
    }

    /// BCP-47 tag handed to speech recognizers
    pub fn speech_tag(&self) -> &'static str {
        match self {
            Locale::En => "en-US",
            Locale::Hi => "hi-IN",
            Locale::Pa => "pa-IN",
        }
    }

    /// Greeting that seeds every new session
    pub fn welcome_message(&self) -> &'static str {
        match self {
            Locale::En => "Hello! I'm your AI farming assistant. I can help you with crop diseases, soil health, weather advice, and farming best practices. What would you like to know?",
            Locale::Hi => "नमस्ते! मैं आपका AI खेती सहायक हूँ। मैं फसल की बीमारियों, मिट्टी के स्वास्थ्य, मौसम की सलाह और खेती की बेहतर प्रथाओं में आपकी मदद कर सकता हूँ। आप क्या जानना चाहते हैं?",
            Locale::Pa => "ਸਤ ਸ੍ਰੀ ਅਕਾਲ! ਮੈਂ ਤੁਹਾਡਾ AI ਖੇਤੀ ਸਹਾਇਕ ਹਾਂ। ਮੈਂ ਫਸਲਾਂ ਦੀਆਂ ਬਿਮਾਰੀਆਂ, ਮਿੱਟੀ ਦੀ ਸਿਹਤ, ਮੌਸਮ ਦੀ ਸਲਾਹ ਅਤੇ ਖੇਤੀਬਾੜੀ ਦੇ ਵਧੀਆ ਤਰੀਕਿਆਂ ਵਿੱਚ ਤੁਹਾਡੀ ਮਦਦ ਕਰ ਸਕਦਾ ਹਾਂ। ਤੁਸੀਂ ਕੀ ਜਾਣਨਾ ਚਾਹੁੰਦੇ ਹੋ?",
        }
    }

    /// Generic reply shown when the responder fails
    pub fn failure_message(&self) -> &'static str {
        match self {
            Locale::En => "I'm sorry, I encountered an error while processing your request. Please try again later.",
            Locale::Hi => "क्षमा करें, आपके अनुरोध को संसाधित करते समय एक त्रुटि हुई। कृपया बाद में पुनः प्रयास करें।",
            Locale::Pa => "ਮੁਆਫ ਕਰਨਾ, ਤੁਹਾਡੀ ਬੇਨਤੀ 'ਤੇ ਕਾਰਵਾਈ ਕਰਦੇ ਸਮੇਂ ਇੱਕ ਗਲਤੀ ਆਈ। ਕਿਰਪਾ ਕਰਕੇ ਬਾਅਦ ਵਿੱਚ ਦੁਬਾਰਾ ਕੋਸ਼ਿਸ਼ ਕਰੋ।",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = AgrimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Locale::En),
            "hi" | "hindi" => Ok(Locale::Hi),
            "pa" | "punjabi" => Ok(Locale::Pa),
            other => Err(AgrimateError::UnknownLocale(other.to_string())),
        }
    }
}
