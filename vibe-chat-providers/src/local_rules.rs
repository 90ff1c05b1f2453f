//! Keyword-driven generator that needs no network or model

use crate::base::{Generator, ProviderResult};
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;
use vibe_chat_core::Turn;

/// Topic detected in a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Greeting,
    Motivation,
    Technical,
    Joke,
    Advice,
    EasterEgg,
    Casual,
    Fun,
    Recall,
    General,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Greeting => "greeting",
            Category::Motivation => "motivation",
            Category::Technical => "technical",
            Category::Joke => "joke",
            Category::Advice => "advice",
            Category::EasterEgg => "easter-egg",
            Category::Casual => "casual",
            Category::Fun => "fun",
            Category::Recall => "recall",
            Category::General => "general",
        }
    }
}

fn word_pattern(words: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b(?:{})\b", words)).expect("static pattern")
}

static GREETING: Lazy<Regex> = Lazy::new(|| word_pattern("hello|hi|hey|hiya"));
static MOTIVATION: Lazy<Regex> =
    Lazy::new(|| word_pattern("gym|lift|workout|exercise|fitness"));
static TECHNICAL: Lazy<Regex> =
    Lazy::new(|| word_pattern("recursion|recursive|function|code|programming"));
static JOKE: Lazy<Regex> = Lazy::new(|| word_pattern("joke|funny|laugh"));
static ADVICE: Lazy<Regex> = Lazy::new(|| word_pattern("advice|tip|help"));
static CASUAL: Lazy<Regex> =
    Lazy::new(|| word_pattern("how are you|what's up|how's it going|how you doing"));
static FUN: Lazy<Regex> = Lazy::new(|| word_pattern("riddle|puzzle"));
// "remember" also matches inside longer words such as "remembered"
static RECALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:what did we talk(?:ed)? about|remind me|recall)\b|remember")
        .expect("static pattern")
});

/// (phrase, reply) pairs matched as plain substrings
const EASTER_EGGS: &[(&str, &str)] = &[
    ("tell me a secret", "🤫 I can't tell everyone, but you're awesome!"),
    ("rizz me up", "🔥 Rizz mode activated! Smooth operator!"),
];

/// (emotion words, emoji) in priority order
const EMOTION_WORDS: &[(&str, &[&str])] = &[
    ("happy|happiness|glad|joyful", &["😊", "😄"]),
    ("sad|sadness|unhappy|upset", &["😢", "😔"]),
    ("angry|anger|mad|furious", &["😠", "😤"]),
    ("love|loving|adore", &["❤️", "😍"]),
    ("excited|exciting|excitement|thrilled", &["🤩", "🎉"]),
    ("confused|confusing|puzzled", &["😕", "😵"]),
    ("surprised|surprising|surprise|shocked", &["😮", "😲"]),
    ("thinking|think|wondering|pondering", &["🤔", "💭"]),
];

static EMOTIONS: Lazy<Vec<(Regex, &'static [&'static str])>> = Lazy::new(|| {
    EMOTION_WORDS
        .iter()
        .map(|(words, emoji)| (word_pattern(words), *emoji))
        .collect()
});

const GREETINGS: &[&str] = &[
    "Hello! How can I help?",
    "Hey there! What's vibing?",
    "Hi! Good to see you!",
];

const MOTIVATION_LINES: &[&str] = &[
    "Push one more rep. Future you says thanks.",
    "Consistency beats intensity. Show up.",
    "You don't skip leg day, do you?",
];

const TECHNICAL_LINES: &[&str] = &[
    "A thing defined in terms of a smaller version of itself.",
    "Recursive functions call themselves, you know?",
];

const JOKES: &[&str] = &[
    "Why did the programmer quit his job? Because he didn't get arrays!",
    "Debugging is like being a detective in a crime movie where you are also the murderer.",
];

const ADVICE_LINES: &[&str] = &[
    "Stay hydrated, my friend.",
    "Sleep well, it fuels your brainpower.",
];

const CASUAL_LINES: &[&str] = &[
    "I'm vibing! Hope you are too 😎",
    "Feeling smooth today! How about you? 😉",
    "All good on my side! Stay awesome 😎",
];

const FUN_LINES: &[&str] = &[
    "Why do programmers prefer dark mode? Because light attracts bugs! 😏",
    "I would tell you a recursion joke, but you'd just call it again… 😎",
];

const FALLBACK: &str = "Tell me more about that.";

/// Reply lines by the category that produces them
const REPLY_TABLES: &[(Category, &[&str])] = &[
    (Category::Greeting, GREETINGS),
    (Category::Motivation, MOTIVATION_LINES),
    (Category::Technical, TECHNICAL_LINES),
    (Category::Joke, JOKES),
    (Category::Advice, ADVICE_LINES),
    (Category::Casual, CASUAL_LINES),
    (Category::Fun, FUN_LINES),
];

/// Number of trailing turns consulted for recall questions
const RECALL_WINDOW: usize = 5;

/// Detect the topic of `text`. Rules are checked in a fixed priority order.
pub fn classify(text: &str) -> Category {
    let lower = text.to_lowercase();

    if GREETING.is_match(&lower) {
        Category::Greeting
    } else if MOTIVATION.is_match(&lower) {
        Category::Motivation
    } else if TECHNICAL.is_match(&lower) {
        Category::Technical
    } else if JOKE.is_match(&lower) {
        Category::Joke
    } else if ADVICE.is_match(&lower) {
        Category::Advice
    } else if easter_egg(&lower).is_some() {
        Category::EasterEgg
    } else if CASUAL.is_match(&lower) {
        Category::Casual
    } else if FUN.is_match(&lower) {
        Category::Fun
    } else if RECALL.is_match(&lower) {
        Category::Recall
    } else {
        Category::General
    }
}

fn easter_egg(lower: &str) -> Option<&'static str> {
    EASTER_EGGS
        .iter()
        .find(|(phrase, _)| lower.contains(phrase))
        .map(|(_, reply)| *reply)
}

/// Category of a canned reply from [`LocalRulesGenerator`]
///
/// A trailing emotion emoji added by the generator is ignored. Returns
/// `None` for text the generator did not take from its reply tables.
pub fn category_of_reply(reply: &str) -> Option<Category> {
    let line = strip_emotion_emoji(reply.trim());
    REPLY_TABLES
        .iter()
        .find(|(_, lines)| lines.contains(&line))
        .map(|(category, _)| *category)
}

fn strip_emotion_emoji(reply: &str) -> &str {
    EMOTION_WORDS
        .iter()
        .flat_map(|(_, emoji)| emoji.iter())
        .find_map(|emoji| {
            reply
                .strip_suffix(emoji)
                .and_then(|rest| rest.strip_suffix(' '))
        })
        .unwrap_or(reply)
}

/// Emoji for the first emotion mentioned in `text`, if any
pub fn detect_emotion_emoji(text: &str) -> Option<&'static str> {
    let mut rng = rand::thread_rng();
    EMOTIONS
        .iter()
        .find(|(pattern, _)| pattern.is_match(text))
        .and_then(|(_, emoji)| emoji.choose(&mut rng).copied())
}

/// Distinct user messages among the last few turns, in order
fn summarize(history: &[Turn]) -> String {
    let start = history.len().saturating_sub(RECALL_WINDOW);
    let mut seen = HashSet::new();
    history[start..]
        .iter()
        .filter(|turn| turn.is_user())
        .filter(|turn| seen.insert(turn.text.to_lowercase()))
        .map(|turn| turn.text.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Rule-based generator keyed on words in the prompt
#[derive(Debug, Default, Clone)]
pub struct LocalRulesGenerator;

impl LocalRulesGenerator {
    pub fn new() -> Self {
        Self
    }

    fn pick(lines: &[&str]) -> String {
        lines
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(FALLBACK)
            .to_string()
    }

    fn reply(&self, prompt: &str, history: &[Turn]) -> String {
        let lower = prompt.to_lowercase();
        let category = classify(&lower);
        debug!("local-rules matched category {}", category.as_str());

        match category {
            Category::Greeting => Self::pick(GREETINGS),
            Category::Motivation => Self::pick(MOTIVATION_LINES),
            Category::Technical => Self::pick(TECHNICAL_LINES),
            Category::Joke => Self::pick(JOKES),
            Category::Advice => Self::pick(ADVICE_LINES),
            Category::EasterEgg => easter_egg(&lower).unwrap_or(FALLBACK).to_string(),
            Category::Casual => Self::pick(CASUAL_LINES),
            Category::Fun => Self::pick(FUN_LINES),
            Category::Recall => {
                let summary = summarize(history);
                if summary.is_empty() {
                    "We haven't talked about much yet.".to_string()
                } else {
                    format!("We talked about: {}", summary)
                }
            }
            Category::General => FALLBACK.to_string(),
        }
    }
}

impl Generator for LocalRulesGenerator {
    fn generate(&self, prompt: &str, history: &[Turn]) -> ProviderResult<String> {
        let mut reply = self.reply(prompt, history);
        if let Some(emoji) = detect_emotion_emoji(prompt) {
            reply.push(' ');
            reply.push_str(emoji);
        }
        Ok(reply)
    }

    fn name(&self) -> &str {
        "local-rules"
    }
}
