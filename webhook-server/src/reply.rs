//! Keyword classification of inbound text into canned replies.

/// One of the fixed replies the bot can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Greeting,
    Portfolio,
    Thanks,
    Fallback,
}

/// Keywords checked in priority order; the first match wins.
const KEYWORDS: &[(&str, Reply)] = &[
    ("hola", Reply::Greeting),
    ("portafolio", Reply::Portfolio),
    ("gracias", Reply::Thanks),
];

impl Reply {
    /// Text sent back to the user.
    pub fn text(self) -> &'static str {
        match self {
            Reply::Greeting => {
                "👋 ¡Hola! Soy el asistente virtual de prueba. ¿Quieres conocer nuestro portafolio?"
            }
            Reply::Portfolio => {
                "🚀 Nuestro portafolio incluye desarrollo web, inteligencia artificial y automatización con chatbots."
            }
            Reply::Thanks => "😊 ¡Con gusto! Si deseas más información, escríbeme 'portafolio'.",
            Reply::Fallback => {
                "🤔 No entendí bien, pero puedo mostrarte nuestro portafolio si lo deseas."
            }
        }
    }

    /// Short label used in logs.
    pub fn label(self) -> &'static str {
        match self {
            Reply::Greeting => "greeting",
            Reply::Portfolio => "portfolio",
            Reply::Thanks => "thanks",
            Reply::Fallback => "fallback",
        }
    }
}

/// Classify a message by case-insensitive substring match.
pub fn classify(text: &str) -> Reply {
    let text = text.to_lowercase();

    KEYWORDS
        .iter()
        .find(|(keyword, _)| text.contains(keyword))
        .map(|(_, reply)| *reply)
        .unwrap_or(Reply::Fallback)
}
