#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Mock,
    OpenAI,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Mock => "mock",
            Strategy::OpenAI => "openai",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "mock" => Some(Strategy::Mock),
            "openai" => Some(Strategy::OpenAI),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Strategy::Mock => "Mock (Local)",
            Strategy::OpenAI => "ChatGPT (OpenAI)",
        }
    }
}
