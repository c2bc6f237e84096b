use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::traits::Responder;
use super::types::ResponderError;
use crate::session::{Locale, Turn};

/// Subject a user message was matched to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Disease,
    Soil,
    Water,
    Weather,
    Crop,
    Thanks,
    Greeting,
}

/// One reply per supported locale
struct Replies {
    en: &'static str,
    hi: &'static str,
    pa: &'static str,
}

impl Replies {
    fn pick(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => self.en,
            Locale::Hi => self.hi,
            Locale::Pa => self.pa,
        }
    }
}

struct Rule {
    topic: Topic,
    /// Matched anywhere in the lower-cased message, in any script
    keywords: &'static [&'static str],
    /// Matched only as whole ASCII words ("hi" must not fire on "which")
    words: &'static [&'static str],
    replies: Replies,
}

// Checked in order; first hit wins
static RULES: &[Rule] = &[
    Rule {
        topic: Topic::Disease,
        keywords: &["disease", "pest", "blight", "fungus", "leaf spot", "रोग", "बीमारी", "कीट", "ਬਿਮਾਰੀ", "ਕੀੜੇ"],
        words: &[],
        replies: Replies {
            en: "For plant diseases, first remove affected leaves. Use copper sulfate or organic fungicides. Ensure good air circulation between plants and avoid overhead watering.",
            hi: "पौधों की बीमारियों के लिए, सबसे पहले प्रभावित पत्तियों को हटाएं। कॉपर सल्फेट या जैविक कवकनाशी का उपयोग करें। पौधों के बीच अच्छी हवा का संचार सुनिश्चित करें।",
            pa: "ਪੌਧਿਆਂ ਦੀਆਂ ਬਿਮਾਰੀਆਂ ਲਈ, ਪਹਿਲਾਂ ਪ੍ਰਭਾਵਿਤ ਪੱਤਿਆਂ ਨੂੰ ਹਟਾਓ। ਕਾਪਰ ਸਲਫੇਟ ਜਾਂ ਜੈਵਿਕ ਫੰਗੀਸਾਈਡ ਦੀ ਵਰਤੋਂ ਕਰੋ। ਪੌਧਿਆਂ ਵਿਚਕਾਰ ਚੰਗੀ ਹਵਾ ਦਾ ਸੰਚਾਰ ਯਕੀਨੀ ਬਣਾਓ।",
        },
    },
    Rule {
        topic: Topic::Soil,
        keywords: &["soil", "fertilizer", "मिट्टी", "खाद", "ਮਿੱਟੀ", "ਖਾਦ"],
        words: &[],
        replies: Replies {
            en: "Test your soil regularly. Maintain pH between 6.0-7.0. Use organic fertilizers and practice crop rotation. Also ensure proper drainage for healthy soil.",
            hi: "मिट्टी की जाँच नियमित रूप से करें। pH 6.0-7.0 के बीच रखें। जैविक खाद का उपयोग करें और फसल चक्र अपनाएं। पानी की निकासी का भी ध्यान रखें।",
            pa: "ਮਿੱਟੀ ਦੀ ਨਿਯਮਿਤ ਜਾਂਚ ਕਰੋ। pH 6.0-7.0 ਦੇ ਵਿਚਕਾਰ ਰੱਖੋ। ਜੈਵਿਕ ਖਾਦ ਦੀ ਵਰਤੋਂ ਕਰੋ ਅਤੇ ਫਸਲ ਚੱਕਰ ਅਪਣਾਓ। ਪਾਣੀ ਦੀ ਨਿਕਾਸੀ ਦਾ ਵੀ ਧਿਆਨ ਰੱਖੋ।",
        },
    },
    Rule {
        topic: Topic::Water,
        keywords: &["water", "irrigation", "पानी", "सिंचाई", "ਪਾਣੀ", "ਸਿੰਚਾਈ"],
        words: &[],
        replies: Replies {
            en: "Water in early morning or evening. Check soil moisture before watering. Use drip irrigation where possible to conserve water and improve efficiency.",
            hi: "पानी देने का समय सुबह या शाम का बेहतर होता है। मिट्टी में नमी की जाँच करके ही पानी दें। ड्रिप इरिगेशन का उपयोग करें जहाँ संभव हो।",
            pa: "ਪਾਣੀ ਦੇਣ ਦਾ ਸਮਾਂ ਸਵੇਰੇ ਜਾਂ ਸ਼ਾਮ ਦਾ ਬਿਹਤਰ ਹੁੰਦਾ ਹੈ। ਮਿੱਟੀ ਵਿੱਚ ਨਮੀ ਦੀ ਜਾਂਚ ਕਰਕੇ ਹੀ ਪਾਣੀ ਦਿਓ। ਜਿੱਥੇ ਸੰਭਵ ਹੋਵੇ ਡ੍ਰਿਪ ਸਿੰਚਾਈ ਦੀ ਵਰਤੋਂ ਕਰੋ।",
        },
    },
    Rule {
        topic: Topic::Weather,
        keywords: &["weather", "rain", "mausam", "मौसम", "बारिश", "ਮੌਸਮ", "ਮੀਂਹ"],
        words: &[],
        replies: Replies {
            en: "For weather information, please share your location.",
            hi: "मौसम की जानकारी के लिए कृपया अपना स्थान साझा करें।",
            pa: "ਮੌਸਮ ਦੀ ਜਾਣਕਾਰੀ ਲਈ ਕਿਰਪਾ ਕਰਕੇ ਆਪਣਾ ਟਿਕਾਣਾ ਸਾਂਝਾ ਕਰੋ।",
        },
    },
    Rule {
        topic: Topic::Crop,
        keywords: &["crop", "fasal", "फसल", "ਫਸਲ"],
        words: &[],
        replies: Replies {
            en: "For crop recommendations, please provide information about your soil type and location.",
            hi: "फसल सिफारिशों के लिए, कृपया अपनी मिट्टी के प्रकार और स्थान के बारे में जानकारी दें।",
            pa: "ਫਸਲ ਦੀਆਂ ਸਿਫਾਰਸ਼ਾਂ ਲਈ, ਕਿਰਪਾ ਕਰਕੇ ਆਪਣੀ ਮਿੱਟੀ ਦੀ ਕਿਸਮ ਅਤੇ ਟਿਕਾਣੇ ਬਾਰੇ ਜਾਣਕਾਰੀ ਦਿਓ।",
        },
    },
    Rule {
        topic: Topic::Thanks,
        keywords: &["thank", "shukriya", "धन्यवाद", "शुक्रिया", "ਧੰਨਵਾਦ"],
        words: &[],
        replies: Replies {
            en: "You're welcome! Is there anything else I can help you with?",
            hi: "आपका स्वागत है! क्या मैं किसी और चीज़ में आपकी मदद कर सकता हूँ?",
            pa: "ਜੀ ਆਇਆਂ ਨੂੰ! ਕੀ ਮੈਂ ਕਿਸੇ ਹੋਰ ਚੀਜ਼ ਵਿੱਚ ਤੁਹਾਡੀ ਮਦਦ ਕਰ ਸਕਦਾ ਹਾਂ?",
        },
    },
    Rule {
        topic: Topic::Greeting,
        keywords: &["नमस्ते", "ਸਤ ਸ੍ਰੀ ਅਕਾਲ"],
        words: &["hello", "hi", "hey", "namaste"],
        replies: Replies {
            en: "Hello! How can I assist you today?",
            hi: "नमस्ते! मैं आपकी कैसे मदद कर सकता हूं?",
            pa: "ਸਤ ਸ੍ਰੀ ਅਕਾਲ! ਮੈਂ ਤੁਹਾਡੀ ਕਿਵੇਂ ਮਦਦ ਕਰ ਸਕਦਾ ਹਾਂ?",
        },
    },
];

static DEFAULT_REPLY: Replies = Replies {
    en: "That's a great question! Agriculture involves many factors like soil health, water management, weather conditions, and seed quality. Would you like specific information on any of these topics?",
    hi: "यह एक अच्छा सवाल है! कृषि में कई कारक महत्वपूर्ण होते हैं जैसे मिट्टी, पानी, मौसम और बीज की गुणवत्ता। क्या आप किसी खास विषय पर और जानकारी चाहते हैं?",
    pa: "ਇਹ ਇੱਕ ਚੰਗਾ ਸਵਾਲ ਹੈ! ਖੇਤੀਬਾੜੀ ਵਿੱਚ ਕਈ ਕਾਰਕ ਮਹੱਤਵਪੂਰਨ ਹੁੰਦੇ ਹਨ ਜਿਵੇਂ ਮਿੱਟੀ, ਪਾਣੀ, ਮੌਸਮ ਅਤੇ ਬੀਜ ਦੀ ਗੁਣਵੱਤਾ। ਕੀ ਤੁਸੀਂ ਕਿਸੇ ਖਾਸ ਵਿਸ਼ੇ ਬਾਰੇ ਹੋਰ ਜਾਣਕਾਰੀ ਚਾਹੁੰਦੇ ਹੋ?",
};

fn find_rule(text: &str) -> Option<&'static Rule> {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    RULES.iter().find(|rule| {
        rule.keywords.iter().any(|k| lowered.contains(k))
            || rule.words.iter().any(|w| words.contains(w))
    })
}

/// Which topic, if any, a message is about
pub fn classify(text: &str) -> Option<Topic> {
    find_rule(text).map(|rule| rule.topic)
}

/// Canned reply for `text` in the given language
pub fn canned_reply(text: &str, locale: Locale) -> &'static str {
    find_rule(text)
        .map(|rule| &rule.replies)
        .unwrap_or(&DEFAULT_REPLY)
        .pick(locale)
}

/// Responder backed by the built-in keyword table
pub struct LocalResponder {
    reply_delay: Duration,
}

impl LocalResponder {
    /// `reply_delay` simulates typing time; zero answers immediately
    pub fn new(reply_delay: Duration) -> Self {
        Self { reply_delay }
    }
}

impl Default for LocalResponder {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[async_trait]
impl Responder for LocalResponder {
    async fn respond(
        &self,
        text: &str,
        locale: Locale,
        _history: &[Turn],
    ) -> Result<String, ResponderError> {
        if !self.reply_delay.is_zero() {
            tokio::time::sleep(self.reply_delay).await;
        }
        debug!(topic = ?classify(text), %locale, "Local rule lookup");
        Ok(canned_reply(text, locale).to_string())
    }

    fn name(&self) -> &str {
        "local"
    }

    fn is_local(&self) -> bool {
        true
    }
}
