//! Response style detection and prompt assembly
//!
//! Pure string work: the user's wording picks a length, tone and kind of
//! answer, and the prompt carries matching instructions.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Length {
    Short,
    Medium,
    Detailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Casual,
    Neutral,
    Formal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoType {
    Instructional,
    Definitional,
    Code,
    Conversational,
}

/// Detected response style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResponseStyle {
    pub length: Length,
    pub tone: Tone,
    pub info_type: InfoType,
}

const SHORT_WORDS: &[&str] = &["briefly", "short", "quickly", "tldr", "summary", "concise"];
const DETAILED_WORDS: &[&str] = &[
    "detailed",
    "explain",
    "elaborate",
    "comprehensive",
    "in depth",
    "thorough",
];
const CASUAL_WORDS: &[&str] = &["hey", "yo", "sup", "what's up", "hi there"];
const FORMAL_WORDS: &[&str] = &["please", "could you", "would you kindly", "thank you"];
const INSTRUCTIONAL_WORDS: &[&str] = &["how to", "tutorial", "guide", "step", "process", "instructions"];
const DEFINITIONAL_WORDS: &[&str] = &["what is", "define", "meaning", "definition", "explain"];
const CODE_WORDS: &[&str] = &[
    "code",
    "program",
    "script",
    "function",
    "example",
    "python",
    "javascript",
    "rust",
];

fn mentions_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

/// Guess what kind of answer the user wants
///
/// Keyword matching is substring based, so "yo" also fires inside "your".
pub fn detect_style(user_text: &str) -> ResponseStyle {
    let text = user_text.to_lowercase();

    let length = if mentions_any(&text, SHORT_WORDS) {
        Length::Short
    } else if mentions_any(&text, DETAILED_WORDS) {
        Length::Detailed
    } else {
        Length::Medium
    };

    let tone = if mentions_any(&text, CASUAL_WORDS) {
        Tone::Casual
    } else if mentions_any(&text, FORMAL_WORDS) {
        Tone::Formal
    } else {
        Tone::Neutral
    };

    let info_type = if mentions_any(&text, INSTRUCTIONAL_WORDS) {
        InfoType::Instructional
    } else if mentions_any(&text, DEFINITIONAL_WORDS) {
        InfoType::Definitional
    } else if mentions_any(&text, CODE_WORDS) {
        InfoType::Code
    } else {
        InfoType::Conversational
    };

    ResponseStyle {
        length,
        tone,
        info_type,
    }
}

/// Assemble the model prompt
pub fn build_prompt(user_text: &str, context: &str, style: &ResponseStyle) -> String {
    let mut base = String::from("You are a helpful AI assistant. ");

    base.push_str(match style.length {
        Length::Short => "Give a brief, concise answer. Keep it short and to the point. ",
        Length::Detailed => {
            "Provide a comprehensive, detailed explanation with examples where helpful. "
        }
        Length::Medium => "Give a balanced, informative response. ",
    });

    base.push_str(match style.tone {
        Tone::Casual => "Be casual, friendly, and conversational. ",
        Tone::Formal => "Be professional, formal, and polite. ",
        Tone::Neutral => "Maintain a helpful and neutral tone. ",
    });

    base.push_str(match style.info_type {
        InfoType::Instructional => "Focus on clear, step-by-step guidance and practical instructions. ",
        InfoType::Code => "Provide practical code examples with clear explanations. ",
        InfoType::Definitional => "Give clear definitions and explanations of concepts. ",
        InfoType::Conversational => "",
    });

    let context_part = if context.trim().is_empty() {
        String::new()
    } else {
        format!("\nUse this context if relevant:\n{context}\n")
    };

    format!("{}\n\n{}\nUser: {}\nAssistant:", base.trim_end(), context_part, user_text)
}
