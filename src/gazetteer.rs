//! Gazetteer: curated place and organization names with a type and a
//! confidence weight, plus the suffix keywords that mark unknown names
//! ("…Plaza" is a place, "…Foundation" an organization).

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Serialize;
use story_types::EntityType;

/// Confidence assigned when only the suffix keyword identifies the type.
pub const SUFFIX_CONFIDENCE: u8 = 80;

/// A gazetteer answer for a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GazetteerHit {
    pub entity_type: EntityType,
    /// 70–95
    pub confidence: u8,
}

// ── Places ───────────────────────────────────────────────────────────────

pub const WORLD_CITIES: &[&str] = &[
    "london", "paris", "berlin", "moscow", "tokyo", "beijing", "shanghai", "hong kong",
    "singapore", "dubai", "cairo", "istanbul", "rome", "madrid", "barcelona", "lisbon",
    "vienna", "prague", "budapest", "warsaw", "amsterdam", "brussels", "geneva", "zurich",
    "stockholm", "oslo", "copenhagen", "helsinki", "dublin", "edinburgh", "athens",
    "jerusalem", "tel aviv", "tehran", "baghdad", "damascus", "beirut", "riyadh",
    "mumbai", "delhi", "new delhi", "karachi", "kabul", "bangkok", "seoul", "pyongyang",
    "manila", "jakarta", "sydney", "melbourne", "toronto", "montreal", "vancouver",
    "mexico city", "havana", "bogota", "lima", "rio de janeiro", "buenos aires",
    "santiago", "caracas", "lagos", "nairobi", "johannesburg", "cape town", "kyiv",
    "kiev", "minsk", "st petersburg", "marrakech", "casablanca", "tangier", "venice",
    "florence", "naples", "milan", "munich", "hamburg", "frankfurt", "marseille",
    "monaco", "macau", "taipei", "hanoi", "saigon", "kathmandu", "tripoli", "tunis",
];

pub const US_CITIES: &[&str] = &[
    "new york", "los angeles", "chicago", "houston", "phoenix", "philadelphia",
    "san antonio", "san diego", "dallas", "san jose", "austin", "san francisco",
    "seattle", "denver", "boston", "detroit", "nashville", "memphis", "portland",
    "las vegas", "baltimore", "milwaukee", "albuquerque", "tucson", "atlanta", "miami",
    "new orleans", "cleveland", "pittsburgh", "cincinnati", "st louis", "kansas city",
    "minneapolis", "omaha", "honolulu", "anchorage", "salt lake city", "sacramento",
    "richmond", "charleston", "savannah", "langley", "quantico", "arlington",
    "brooklyn", "manhattan", "queens", "the bronx", "harlem", "hollywood",
];

pub const US_STATES: &[&str] = &[
    "alabama", "alaska", "arizona", "arkansas", "california", "colorado", "connecticut",
    "delaware", "florida", "georgia", "hawaii", "idaho", "illinois", "indiana", "iowa",
    "kansas", "kentucky", "louisiana", "maine", "maryland", "massachusetts", "michigan",
    "minnesota", "mississippi", "missouri", "montana", "nebraska", "nevada",
    "new hampshire", "new jersey", "new mexico", "north carolina", "north dakota",
    "ohio", "oklahoma", "oregon", "pennsylvania", "rhode island", "south carolina",
    "south dakota", "tennessee", "texas", "utah", "vermont", "virginia", "washington",
    "west virginia", "wisconsin", "wyoming",
];

pub const COUNTRIES: &[&str] = &[
    "america", "united states", "canada", "mexico", "brazil", "argentina", "chile",
    "colombia", "peru", "venezuela", "cuba", "england", "scotland", "wales", "ireland",
    "france", "germany", "italy", "spain", "portugal", "netherlands", "belgium",
    "switzerland", "austria", "poland", "sweden", "norway", "denmark", "finland",
    "greece", "turkey", "russia", "ukraine", "belarus", "china", "japan", "korea",
    "north korea", "south korea", "india", "pakistan", "afghanistan", "iran", "iraq",
    "syria", "lebanon", "israel", "jordan", "egypt", "libya", "saudi arabia", "yemen",
    "qatar", "kuwait", "morocco", "algeria", "nigeria", "kenya", "ethiopia", "somalia",
    "sudan", "south africa", "australia", "new zealand", "indonesia", "vietnam",
    "thailand", "cambodia", "philippines", "malaysia", "mongolia", "tibet", "nepal",
];

pub const REGIONS: &[&str] = &[
    "europe", "asia", "africa", "antarctica", "the middle east", "middle east",
    "siberia", "scandinavia", "the balkans", "balkans", "caucasus", "the caribbean",
    "caribbean", "central america", "south america", "north america", "latin america",
    "southeast asia", "eastern europe", "western europe", "the arctic", "arctic",
    "the sahara", "sahara", "patagonia", "the pacific", "pacific", "atlantic",
    "mediterranean", "the gulf", "persian gulf", "silicon valley", "new england",
    "the midwest", "midwest", "appalachia", "the rockies", "outback",
];

pub const LANDMARKS: &[&str] = &[
    "the pentagon", "pentagon", "the white house", "white house", "the kremlin",
    "kremlin", "capitol hill", "the capitol", "wall street", "times square",
    "central park", "golden gate bridge", "brooklyn bridge", "big ben",
    "buckingham palace", "eiffel tower", "the louvre", "louvre", "the vatican",
    "vatican", "red square", "tiananmen square", "area 51", "mount everest",
    "the alps", "alps", "the himalayas", "himalayas", "the amazon", "amazon",
    "the thames", "thames", "the nile", "nile", "grand canyon", "niagara falls",
    "alcatraz", "guantanamo", "ellis island", "the strip",
];

// ── Organizations ────────────────────────────────────────────────────────

pub const GOVERNMENT_ORGS: &[&str] = &[
    "congress", "the senate", "senate", "parliament", "the supreme court",
    "supreme court", "state department", "department of defense", "department of justice",
    "homeland security", "department of homeland security", "treasury", "the treasury",
    "secret service", "the secret service", "white house staff", "scotland yard",
    "downing street", "the politburo", "politburo", "interpol",
];

pub const MILITARY_ORGS: &[&str] = &[
    "the army", "the navy", "the air force", "air force", "the marines", "marines",
    "marine corps", "navy seals", "seal team six", "delta force", "green berets",
    "army rangers", "national guard", "coast guard", "sas", "spetsnaz", "the pentagon brass",
    "space force", "joint chiefs",
];

pub const INTELLIGENCE_ORGS: &[&str] = &[
    "cia", "fbi", "nsa", "dia", "nro", "dhs", "atf", "dea", "mi5", "mi6", "gchq", "kgb",
    "fsb", "gru", "svr", "mossad", "shin bet", "dgse", "bnd", "asis", "csis", "stasi",
    "central intelligence agency", "federal bureau of investigation",
    "national security agency",
];

pub const INTERNATIONAL_ORGS: &[&str] = &[
    "united nations", "the united nations", "un", "nato", "european union", "eu",
    "world health organization", "who", "red cross", "the red cross", "imf",
    "world bank", "opec", "wto", "unesco", "unicef", "the hague", "amnesty international",
    "greenpeace", "doctors without borders",
];

// ── Suffix keywords ──────────────────────────────────────────────────────

pub const LOCATION_KEYWORDS: &[&str] = &[
    "plaza", "park", "bridge", "river", "lake", "mountain", "mountains", "mount",
    "valley", "canyon", "forest", "woods", "island", "islands", "bay", "harbor",
    "harbour", "port", "beach", "coast", "desert", "hills", "hill", "peak", "falls",
    "springs", "creek", "station", "airport", "base", "tower", "towers", "castle",
    "palace", "fortress", "fort", "temple", "cathedral", "church", "abbey", "prison",
    "hospital", "hotel", "manor", "estate", "mansion", "square", "market", "district",
    "quarter", "city", "town", "village", "county", "province", "kingdom", "empire",
    "realm", "citadel", "keep", "outpost", "compound", "facility", "complex", "camp",
    "bunker", "ridge", "gorge", "marsh", "swamp", "sea", "ocean", "strait", "cape",
    "glacier", "tavern", "inn", "library", "museum", "academy", "university", "college",
    "cemetery", "sanctuary", "gardens", "garden", "heights", "pass", "canal", "docks",
    "pier", "wharf", "terminal", "mall", "arena", "stadium",
];

pub const ORGANIZATION_KEYWORDS: &[&str] = &[
    "foundation", "agency", "council", "institute", "corporation", "corp", "inc",
    "company", "industries", "enterprises", "group", "association", "society", "union",
    "league", "alliance", "coalition", "federation", "syndicate", "cartel", "guild",
    "order", "brotherhood", "sisterhood", "fellowship", "church", "ministry",
    "department", "bureau", "office", "directorate", "division", "unit", "command",
    "corps", "battalion", "regiment", "brigade", "squadron", "fleet", "army", "navy",
    "committee", "commission", "authority", "administration", "service", "services",
    "bank", "holdings", "partners", "consortium", "collective", "network", "party",
    "movement", "front", "cabal", "circle", "clan", "family", "tribe", "legion",
    "initiative", "project", "program", "programme", "task force", "labs",
    "laboratories", "technologies", "systems", "solutions", "media", "press",
];

pub const STREET_SUFFIXES: &[&str] = &[
    "street", "st", "avenue", "ave", "road", "rd", "lane", "ln", "boulevard", "blvd",
    "drive", "dr", "way", "court", "ct", "terrace", "parkway", "pkwy", "highway", "hwy",
    "alley", "crescent", "close", "row", "circle", "trail", "turnpike",
];

static GAZETTEER: LazyLock<HashMap<&'static str, GazetteerHit>> = LazyLock::new(|| {
    let tables: &[(&[&str], EntityType, u8)] = &[
        (WORLD_CITIES, EntityType::Location, 90),
        (US_CITIES, EntityType::Location, 90),
        (US_STATES, EntityType::Location, 85),
        (COUNTRIES, EntityType::Location, 95),
        (REGIONS, EntityType::Location, 80),
        (LANDMARKS, EntityType::Location, 85),
        (GOVERNMENT_ORGS, EntityType::Organization, 85),
        (MILITARY_ORGS, EntityType::Organization, 85),
        (INTELLIGENCE_ORGS, EntityType::Organization, 95),
        (INTERNATIONAL_ORGS, EntityType::Organization, 70),
    ];

    let mut map = HashMap::new();
    for (names, entity_type, confidence) in tables {
        for &name in names.iter() {
            // First table wins on duplicates
            map.entry(name).or_insert(GazetteerHit {
                entity_type: *entity_type,
                confidence: *confidence,
            });
        }
    }
    map
});

fn last_word_lower(name: &str) -> Option<String> {
    let words: Vec<&str> = name.split_whitespace().collect();
    if words.len() < 2 {
        return None;
    }
    let last = words[words.len() - 1];
    Some(last.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
}

/// Whether a multi-word name ends in a location keyword.
pub fn has_location_keyword(name: &str) -> bool {
    last_word_lower(name).is_some_and(|w| LOCATION_KEYWORDS.contains(&w.as_str()))
}

/// Whether a multi-word name ends in an organization keyword.
pub fn has_organization_keyword(name: &str) -> bool {
    last_word_lower(name).is_some_and(|w| ORGANIZATION_KEYWORDS.contains(&w.as_str()))
}

/// Exact-name lookup, then the suffix-keyword rule for multi-word names.
///
/// Location keywords are tested first, so "Temple Church" is a location
/// even though "church" is also an organization keyword.
pub fn lookup(name: &str) -> Option<GazetteerHit> {
    if let Some(hit) = lookup_exact(name) {
        return Some(hit);
    }
    if has_location_keyword(name) {
        return Some(GazetteerHit {
            entity_type: EntityType::Location,
            confidence: SUFFIX_CONFIDENCE,
        });
    }
    if has_organization_keyword(name) {
        return Some(GazetteerHit {
            entity_type: EntityType::Organization,
            confidence: SUFFIX_CONFIDENCE,
        });
    }
    None
}

/// Exact gazetteer entry only, without the suffix rule.
pub fn lookup_exact(name: &str) -> Option<GazetteerHit> {
    let key = name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    GAZETTEER.get(key.as_str()).copied()
}

/// Street addresses ("Baker Street", "Fifth Avenue") are too granular to
/// catalogue as entities.
pub fn is_street_address(name: &str) -> bool {
    last_word_lower(name).is_some_and(|w| STREET_SUFFIXES.contains(&w.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_lookup_is_case_insensitive() {
        let hit = lookup("Moscow").unwrap();
        assert_eq!(hit.entity_type, EntityType::Location);
        assert_eq!(hit.confidence, 90);

        let hit = lookup("cia").unwrap();
        assert_eq!(hit.entity_type, EntityType::Organization);
        assert_eq!(hit.confidence, 95);
    }

    #[test]
    fn test_multi_word_entries() {
        assert_eq!(lookup("New  York").unwrap().entity_type, EntityType::Location);
        assert_eq!(
            lookup("Secret Service").unwrap().entity_type,
            EntityType::Organization
        );
    }

    #[test]
    fn test_suffix_rule() {
        let hit = lookup("Harmon Plaza").unwrap();
        assert_eq!(hit.entity_type, EntityType::Location);
        assert_eq!(hit.confidence, SUFFIX_CONFIDENCE);

        let hit = lookup("Kessler Foundation").unwrap();
        assert_eq!(hit.entity_type, EntityType::Organization);
        assert_eq!(hit.confidence, SUFFIX_CONFIDENCE);
    }

    #[test]
    fn test_suffix_rule_needs_multiple_words() {
        assert_eq!(lookup("Plaza"), None);
        assert_eq!(lookup("Foundation"), None);
        assert_eq!(lookup("Ramsey"), None);
    }

    #[test]
    fn test_lookup_exact_ignores_suffixes() {
        assert!(lookup_exact("Harmon Plaza").is_none());
        assert!(lookup_exact("london").is_some());
    }

    #[test]
    fn test_street_address() {
        assert!(is_street_address("Baker Street"));
        assert!(is_street_address("Fifth Avenue"));
        assert!(!is_street_address("Street"));
        assert!(!is_street_address("Shadow Council"));
    }
}
