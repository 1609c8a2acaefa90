/// Titles and honorifics: the word after one of these is likely a person.
/// E.g. "Agent Liu", "Lady Ashworth".
pub const CHARACTER_TITLES: &[&str] = &[
    "agent", "detective", "officer", "captain", "commander", "general", "colonel",
    "major", "sergeant", "lieutenant", "corporal", "admiral", "doctor", "dr", "professor",
    "prof", "mr", "mrs", "ms", "miss", "mister", "sir", "dame", "lady", "lord", "king",
    "queen", "prince", "princess", "director", "senator", "president", "chief",
    "inspector", "deputy", "sheriff", "judge", "mayor", "governor", "minister", "emperor",
    "empress", "duke", "duchess", "baron", "baroness", "uncle", "aunt", "cousin",
    "brother", "sister", "father", "mother", "saint", "master", "mistress", "elder",
];

/// Dialogue and action verbs that follow a character's name ("Blake said").
pub const CHARACTER_VERBS: &[&str] = &[
    "said", "says", "asked", "replied", "answered", "whispered", "shouted", "yelled",
    "muttered", "murmured", "screamed", "cried", "called", "told", "explained",
    "insisted", "warned", "added", "admitted", "continued", "began", "snapped",
    "growled", "hissed", "breathed", "laughed", "smiled", "grinned", "nodded",
    "shrugged", "sighed", "frowned", "winced", "blinked", "glanced", "stared",
    "looked", "turned", "paused", "hesitated", "swallowed", "leaned", "reached",
    "grabbed", "pulled", "pushed", "stepped", "walked", "ran", "stood", "sat", "knelt",
    "knew", "thought", "felt", "wanted", "decided", "realized", "remembered", "wondered",
    "was", "had", "would", "could", "did",
];

/// Speech verbs that may also precede the name ("said Blake").
pub const SPEECH_VERBS: &[&str] = &[
    "said", "asked", "replied", "answered", "whispered", "shouted", "muttered",
    "murmured", "called", "told", "warned",
];

/// Prepositions that place a name somewhere ("in Prague", "to Vantor").
pub const LOCATIVE_PREPOSITIONS: &[&str] = &[
    "in", "at", "to", "from", "into", "near", "toward", "towards", "across", "through",
    "inside", "outside", "within", "beyond", "around", "throughout", "reached",
    "visited", "left", "entered",
];

/// Nouns that follow an organization's name ("Kessler operatives").
pub const ORGANIZATION_NOUNS: &[&str] = &[
    "agency", "agents", "operatives", "headquarters", "hq", "forces", "officials",
    "members", "leadership", "director", "spokesman", "spokeswoman", "spokesperson",
    "personnel", "units", "troops", "soldiers", "board", "command", "employees",
    "security", "facility", "files", "protocol", "mandate", "charter", "ranks",
];

/// Articles that precede an organization ("the Directorate").
pub const ORGANIZATION_ARTICLES: &[&str] = &["the"];

pub fn is_character_title(word: &str) -> bool {
    CHARACTER_TITLES.contains(&word)
}

pub fn is_character_verb(word: &str) -> bool {
    CHARACTER_VERBS.contains(&word)
}

pub fn is_speech_verb(word: &str) -> bool {
    SPEECH_VERBS.contains(&word)
}

pub fn is_locative(word: &str) -> bool {
    LOCATIVE_PREPOSITIONS.contains(&word)
}

pub fn is_organization_noun(word: &str) -> bool {
    ORGANIZATION_NOUNS.contains(&word)
}

pub fn is_organization_article(word: &str) -> bool {
    ORGANIZATION_ARTICLES.contains(&word)
}
