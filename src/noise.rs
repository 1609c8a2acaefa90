//! Noise words: capitalized tokens that are almost never entity names.
//!
//! Sentence-initial function words, common verbs and nouns, numbers,
//! calendar words, nationalities and manuscript boilerplate all show up
//! capitalized in prose. Everything here is compared lowercased.

use std::collections::HashSet;
use std::sync::LazyLock;

pub const NOISE_WORDS: &[&str] = &[
    // Articles, determiners, pronouns
    "a", "an", "the", "this", "that", "these", "those", "some", "any", "every", "each",
    "all", "both", "either", "neither", "no", "none", "another", "other", "such", "what",
    "which", "who", "whom", "whose", "whatever", "whoever", "i", "me", "my", "mine",
    "myself", "you", "your", "yours", "yourself", "he", "him", "his", "himself", "she",
    "her", "hers", "herself", "it", "its", "itself", "we", "us", "our", "ours",
    "ourselves", "they", "them", "their", "theirs", "themselves", "someone", "somebody",
    "something", "anyone", "anybody", "anything", "everyone", "everybody", "everything",
    "nobody", "nothing",
    // Conjunctions, prepositions, adverbs
    "and", "but", "or", "nor", "so", "yet", "for", "if", "then", "else", "when", "where",
    "why", "how", "while", "because", "although", "though", "unless", "until", "since",
    "after", "before", "once", "as", "than", "whether", "of", "in", "on", "at", "to",
    "from", "by", "with", "without", "into", "onto", "upon", "about", "above", "below",
    "over", "under", "between", "among", "through", "across", "along", "around",
    "behind", "beside", "besides", "beyond", "inside", "outside", "near", "toward",
    "towards", "against", "despite", "during", "except", "like", "unlike", "via",
    "within", "here", "there", "now", "just", "still", "even", "only", "also", "too",
    "very", "really", "perhaps", "maybe", "almost", "already", "always", "never",
    "often", "sometimes", "soon", "later", "again", "instead", "meanwhile", "however",
    "therefore", "otherwise", "anyway", "besides", "finally", "suddenly", "slowly",
    "quickly", "quietly", "together", "inside", "somewhere", "anywhere", "everywhere",
    "nowhere", "yes", "oh", "ah", "okay", "ok", "well", "please", "thanks", "hey",
    "hello", "goodbye", "sorry", "not", "maybe", "indeed", "sure", "certainly",
    // Auxiliary and very common verbs
    "is", "am", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "having", "do", "does", "did", "done", "doing", "will", "would", "shall", "should",
    "can", "could", "may", "might", "must", "get", "got", "getting", "go", "goes",
    "going", "went", "gone", "come", "came", "coming", "make", "made", "take", "took",
    "taken", "see", "saw", "seen", "look", "looked", "know", "knew", "known", "think",
    "thought", "say", "said", "tell", "told", "ask", "asked", "let", "keep", "kept",
    "give", "gave", "find", "found", "feel", "felt", "try", "tried", "leave", "left",
    "call", "called", "wait", "stop", "listen", "remember", "forget", "stay", "run",
    "watch", "hold", "turn", "move", "open", "close", "bring", "put", "stand", "sit",
    "maybe", "thank", "welcome", "help", "check", "hurry", "careful", "easy",
    // Common adjectives
    "new", "old", "good", "bad", "great", "little", "big", "small", "long", "short",
    "high", "low", "first", "last", "next", "few", "many", "much", "more", "most",
    "less", "least", "own", "same", "different", "right", "wrong", "true", "false",
    "real", "sure", "whole", "full", "empty", "dead", "alive", "young", "early",
    "late", "dear", "poor", "best", "better", "worse", "worst", "certain", "several",
    // Common nouns that open sentences
    "man", "men", "woman", "women", "people", "person", "child", "children", "boy",
    "girl", "guy", "guys", "time", "times", "day", "days", "night", "nights", "morning",
    "evening", "afternoon", "today", "tonight", "tomorrow", "yesterday", "week",
    "weeks", "month", "months", "year", "years", "hour", "hours", "minute", "minutes",
    "moment", "moments", "second", "seconds", "way", "thing", "things", "place",
    "world", "life", "home", "room", "door", "hand", "hands", "eyes", "head", "face",
    "voice", "word", "words", "name", "god", "sir", "madam", "ma'am", "mom", "dad",
    "mother", "father", "brother", "sister", "son", "daughter", "friend", "friends",
    // Ranks and titles (stripped off the front of names)
    "agent", "agents", "detective", "officer", "captain", "commander", "general",
    "colonel", "major", "sergeant", "lieutenant", "corporal", "private", "admiral",
    "doctor", "dr", "professor", "prof", "mr", "mrs", "ms", "miss", "mister", "lady",
    "lord", "king", "queen", "prince", "princess", "director", "senator", "president",
    "chief", "inspector", "deputy", "sheriff", "judge", "mayor", "governor", "minister",
    "emperor", "empress", "duke", "duchess", "baron", "baroness", "uncle", "aunt",
    "saint", "father", "sister",
    // Numbers
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "twenty", "thirty", "forty", "fifty", "hundred", "thousand",
    "million", "billion", "third", "fourth", "fifth", "half", "dozen",
    // Calendar
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
    "january", "february", "march", "april", "june", "july", "august", "september",
    "october", "november", "december", "spring", "summer", "autumn", "winter",
    "christmas", "easter",
    // Nationalities and languages
    "american", "americans", "british", "english", "french", "german", "germans",
    "russian", "russians", "chinese", "japanese", "korean", "italian", "spanish",
    "mexican", "canadian", "irish", "scottish", "african", "european", "asian",
    "arab", "arabic", "israeli", "iranian", "indian", "soviet", "latin", "greek",
    "roman", "christian", "muslim", "jewish", "catholic",
    // Manuscript boilerplate
    "chapter", "chapters", "prologue", "epilogue", "part", "book", "volume", "act",
    "scene", "interlude", "appendix", "contents", "preface", "foreword", "afterword",
    "acknowledgments", "acknowledgements", "dedication", "author", "note", "notes",
    "end", "begin", "beginning", "continued", "draft", "page", "section",
];

/// All-caps words used for emphasis in dialogue ("STOP", "NOW").
pub const CAPS_NOISE: &[&str] = &[
    "NO", "NOT", "YES", "NOW", "STOP", "WAIT", "HELP", "RUN", "GO", "GET", "OUT", "HEY",
    "WHAT", "WHY", "HOW", "WHO", "WHERE", "WHEN", "NEVER", "EVER", "ALL", "YOU", "ME",
    "HIM", "HER", "THEM", "THE", "AND", "BUT", "OH", "AH", "OK", "OKAY", "DONE", "DEAD",
    "FIRE", "DOWN", "UP", "OFF", "MOVE", "NOW", "GOD", "PLEASE", "SORRY", "LOOK",
    "BOOM", "BANG", "CRASH", "THUD", "WHAM", "HUSH", "SHH", "UGH", "WOW", "HAHA",
];

/// Short abbreviations that match the acronym shape but name nothing.
pub const ACRONYM_SKIP: &[&str] = &[
    "AM", "PM", "OK", "TV", "ID", "PS", "MR", "MS", "DR", "JR", "SR", "ST", "MT", "VS",
    "EG", "IE", "AD", "BC", "CE", "UP", "IT", "IS", "IN", "ON", "AT", "OF", "TO", "BE",
    "DO", "GO", "NO", "SO", "WE", "HE", "ME", "MY", "OR", "IF", "AN", "AS", "BY", "US",
    "UH", "UM", "HM", "MM", "OH", "AH", "HA", "OW", "EH", "II", "III", "IV", "VI",
    "VII", "VIII", "IX", "XI", "XII", "ETA", "ASAP", "RSVP", "FYI", "DIY", "TBD",
];

/// Extra everyday words that should not pass as 4+ letter acronyms.
const COMMON_ENGLISH: &[&str] = &[
    "word", "hell", "damn", "dead", "fire", "stop", "help", "kill", "love", "hate",
    "free", "fast", "slow", "hard", "soft", "cold", "warm", "hot", "dark", "light",
    "safe", "clear", "ready", "move", "run", "jump", "duck", "hide", "wake", "shut",
    "fine", "good", "sure", "okay", "real", "true", "mine", "yours", "ours", "gone",
    "back", "down", "away", "home", "work", "play", "open", "lock", "drop", "push",
    "pull", "hold", "wait", "look", "listen", "watch", "speak", "talk", "quiet",
    "enough", "again", "alone", "please", "sorry", "thanks", "bomb", "gun", "guns",
    "shoot", "blood", "pain", "death", "life", "team", "plan", "deal", "game", "over",
    "exit", "enter", "warning", "danger", "alert", "secret", "urgent", "private",
    "police", "news", "info", "data",
];

static NOISE_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| NOISE_WORDS.iter().copied().collect());

static COMMON_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| COMMON_ENGLISH.iter().copied().collect());

/// Case-insensitive membership in the noise list.
pub fn is_noise(word: &str) -> bool {
    let lower = word.trim().to_lowercase();
    NOISE_SET.contains(lower.as_str())
}

/// All-caps emphasis word ("STOP", "NOW"), compared exactly.
pub fn is_caps_noise(word: &str) -> bool {
    CAPS_NOISE.contains(&word)
}

/// Common abbreviation that merely looks like an acronym.
pub fn is_acronym_skip(word: &str) -> bool {
    ACRONYM_SKIP.contains(&word)
}

/// Whether a lowercased token is an ordinary English word.
pub fn is_common_word(lower: &str) -> bool {
    NOISE_SET.contains(lower) || COMMON_SET.contains(lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_is_case_insensitive() {
        assert!(is_noise("The"));
        assert!(is_noise("BUT"));
        assert!(is_noise("chapter"));
        assert!(is_noise("Agent"));
    }

    #[test]
    fn test_names_are_not_noise() {
        assert!(!is_noise("Knox"));
        assert!(!is_noise("Ramsey"));
        assert!(!is_noise("Omega"));
    }

    #[test]
    fn test_caps_noise_is_exact() {
        assert!(is_caps_noise("STOP"));
        assert!(!is_caps_noise("Stop"));
        assert!(!is_caps_noise("FBI"));
    }

    #[test]
    fn test_acronym_skip() {
        assert!(is_acronym_skip("PM"));
        assert!(is_acronym_skip("TV"));
        assert!(!is_acronym_skip("CIA"));
    }

    #[test]
    fn test_common_word() {
        assert!(is_common_word("help"));
        assert!(is_common_word("there"));
        assert!(!is_common_word("nasa"));
    }
}
