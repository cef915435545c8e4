//! Static keyword tables for emotion, topic and crisis detection.
//!
//! Categories are scanned in declaration order, and so are the phrases inside a
//! category. Every phrase is lowercase and matched as a plain substring.

/// Ordered mapping from category name to its trigger phrases.
#[derive(Debug, Clone, Copy)]
pub struct KeywordTable {
    entries: &'static [(&'static str, &'static [&'static str])],
}

impl KeywordTable {
    pub const fn new(entries: &'static [(&'static str, &'static [&'static str])]) -> Self {
        Self { entries }
    }

    /// Categories with at least one phrase contained in `lower`, in table order.
    ///
    /// `lower` must already be lowercased. A category is reported once, at its
    /// first matching phrase.
    pub fn matching_categories(&self, lower: &str) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter(|(_, phrases)| phrases.iter().any(|phrase| lower.contains(*phrase)))
            .map(|(category, _)| *category)
            .collect()
    }

    pub fn categories(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(category, _)| *category)
    }

    pub fn phrases(&self, category: &str) -> Option<&'static [&'static str]> {
        self.entries
            .iter()
            .find(|(name, _)| *name == category)
            .map(|(_, phrases)| *phrases)
    }
}

const EMOTION_ENTRIES: &[(&str, &[&str])] = &[
    (
        "anxiety",
        &[
            "anxious", "nervous", "worry", "panic", "fear", "stressed out", "anxiety", "tense",
            "uneasy", "apprehensive", "dread", "scared", "frightened",
        ],
    ),
    (
        "sadness",
        &[
            "sad", "down", "unhappy", "depressed", "lonely", "hopeless", "blue", "grief",
            "sorrow", "miserable", "heartbroken", "gloomy", "disappointed",
        ],
    ),
    (
        "anger",
        &[
            "angry", "mad", "frustrated", "irritated", "annoyed", "furious", "rage", "outraged",
            "bitter", "resentful", "hostile", "enraged", "upset",
        ],
    ),
    (
        "stress",
        &[
            "stress", "overwhelmed", "pressure", "burnout", "exhausted", "tired", "overloaded",
            "burdened", "drained", "strained", "busy", "hectic",
        ],
    ),
    (
        "motivation",
        &[
            "unmotivated", "stuck", "procrastinating", "lazy", "can't focus", "discipline",
            "inspiration", "discouraged", "uninspired", "bored", "apathetic", "indifferent",
        ],
    ),
    (
        "sleep",
        &[
            "insomnia", "can't sleep", "tired", "sleepless", "fatigue", "exhausted", "restless",
            "nightmares", "sleep problems", "waking up", "drowsy",
        ],
    ),
    (
        "confidence",
        &[
            "inadequate", "failure", "worthless", "incompetent", "useless", "not good enough",
            "self-doubt", "insecure", "impostor", "unworthy", "inferior", "undeserving",
        ],
    ),
    (
        "happiness",
        &[
            "happy", "joy", "excited", "pleased", "grateful", "content", "satisfied",
            "delighted", "optimistic", "cheerful", "thrilled", "elated", "blissful",
        ],
    ),
    (
        "calm",
        &[
            "calm", "peaceful", "relaxed", "tranquil", "serene", "at ease", "composed", "chill",
            "mellow", "quiet", "comfortable", "centered", "balanced",
        ],
    ),
];

const TOPIC_ENTRIES: &[(&str, &[&str])] = &[
    ("anxiety", &["anxiety", "panic attack", "worry", "nervous", "overthinking", "fear"]),
    (
        "depression",
        &["depression", "sad", "hopeless", "suicidal", "depressed", "emptiness", "numb"],
    ),
    ("stress", &["stress", "workload", "pressure", "deadline", "overwhelmed", "busy"]),
    (
        "mindfulness",
        &["mindfulness", "present", "awareness", "meditation", "attention", "consciousness"],
    ),
    (
        "gratitude",
        &["gratitude", "thankful", "appreciation", "grateful", "blessing", "appreciate"],
    ),
    (
        "self_care",
        &["self-care", "self care", "take care of myself", "pamper", "deserve", "boundaries"],
    ),
    (
        "motivation",
        &["motivation", "goals", "inspired", "purpose", "drive", "ambition", "passion"],
    ),
    (
        "relationships",
        &[
            "relationship", "partner", "marriage", "friend", "colleague", "family", "conflict",
            "breakup",
        ],
    ),
    (
        "work_life_balance",
        &[
            "work-life", "work/life", "burnout", "overwork", "career", "job", "quit",
            "work too much",
        ],
    ),
    ("sleep", &["sleep", "insomnia", "tired", "rest", "bed", "wake up", "sleepless"]),
    (
        "loneliness",
        &[
            "lonely", "alone", "isolated", "disconnected", "no friends", "by myself",
            "companionship",
        ],
    ),
    (
        "self_esteem",
        &[
            "self-esteem", "confidence", "self-worth", "value", "inadequate", "not good enough",
            "imposter",
        ],
    ),
    (
        "focus",
        &[
            "focus", "concentration", "distracted", "attention", "procrastination", "adhd",
            "productive",
        ],
    ),
];

pub const EMOTION_KEYWORDS: KeywordTable = KeywordTable::new(EMOTION_ENTRIES);
pub const TOPIC_KEYWORDS: KeywordTable = KeywordTable::new(TOPIC_ENTRIES);

/// Any of these phrases flags a message for the emergency path.
pub const CRISIS_KEYWORDS: &[&str] = &[
    "suicide",
    "kill myself",
    "end my life",
    "die",
    "don't want to live",
    "hurt myself",
    "self-harm",
    "cutting",
    "no reason to live",
    "better off dead",
    "want to die",
    "harming myself",
    "ending it all",
];

/// Topic used when no topic category matches.
pub const GENERAL_TOPIC: &str = "general";
