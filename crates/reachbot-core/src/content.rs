//! Caption/hashtag generation from a topic string.
//!
//! Heuristic template filling: no state, no I/O. Handlers pass a topic in and
//! get finished strings back.

use rand::seq::SliceRandom;
use rand::thread_rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptionStyle {
    Viral,
    Aesthetic,
    Attitude,
    Love,
    Sad,
    Business,
    Hindi,
    English,
}

impl CaptionStyle {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "viral" => Some(Self::Viral),
            "aesthetic" => Some(Self::Aesthetic),
            "attitude" => Some(Self::Attitude),
            "love" => Some(Self::Love),
            "sad" => Some(Self::Sad),
            "business" => Some(Self::Business),
            "hindi" => Some(Self::Hindi),
            "english" => Some(Self::English),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Viral => "viral",
            Self::Aesthetic => "aesthetic",
            Self::Attitude => "attitude",
            Self::Love => "love",
            Self::Sad => "sad",
            Self::Business => "business",
            Self::Hindi => "hindi",
            Self::English => "english",
        }
    }

    fn templates(self) -> &'static [&'static str] {
        match self {
            Self::Viral => &[
                "{topic} 🔥\n\nAaj ka mood: {hook}\n\n{cta}\n{brand}",
                "Stop scrolling ❗\n{topic} 💥\n\n{hook}\n\n{cta}\n{brand}",
                "{topic} 🚀\n\n{hook}\n\nTag your friend 🤝\n{brand}",
            ],
            Self::Aesthetic => &[
                "{topic} ✨\n\nsoft vibes • calm mind • clean goals\n\n{cta}\n{brand}",
                "golden hour feelings 🌅\n{topic}\n\n{hook}\n{brand}",
            ],
            Self::Attitude => &[
                "{topic} 😈\n\n{hook}\n\n{cta}\n{brand}",
                "Level up mode ON ⚡\n{topic}\n\n{hook}\n{brand}",
            ],
            Self::Love => &[
                "{topic} ❤️\n\n{hook}\n\n{cta}\n{brand}",
                "Uske bina bhi main complete hoon… but {topic} 🫶\n\n{brand}",
            ],
            Self::Sad => &[
                "{topic} 🥀\n\n{hook}\n\n{brand}",
                "कुछ बातें अधूरी रह जाती हैं… {topic} 💔\n\n{brand}",
            ],
            Self::Business => &[
                "{topic} 📈\n\n{hook}\n\nSave this ✅\n{brand}",
                "Real growth = consistency.\n{topic}\n\n{cta}\n{brand}",
            ],
            Self::Hindi => &[
                "{topic} ✨\n\n{hook}\n\n{cta}\n{brand}",
                "आज का सोच: {hook}\n\n{topic}\n\n{brand}",
            ],
            Self::English => &["{topic}\n\n{hook}\n\n{cta}\n{brand}"],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagLang {
    Hinglish,
    English,
    Hindi,
}

impl TagLang {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "hinglish" => Some(Self::Hinglish),
            "english" => Some(Self::English),
            "hindi" => Some(Self::Hindi),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Hinglish => "hinglish",
            Self::English => "english",
            Self::Hindi => "hindi",
        }
    }

    fn tags(self) -> &'static [&'static str] {
        match self {
            Self::English => &[
                "reels",
                "explorepage",
                "trending",
                "viralreels",
                "instagood",
                "contentcreator",
            ],
            Self::Hindi => &[
                "reelsindia",
                "hindireels",
                "india",
                "desivibes",
                "hindiquotes",
                "desireels",
            ],
            Self::Hinglish => &[
                "reelsindia",
                "trendingreels",
                "viral",
                "explore",
                "instareels",
                "desivibes",
            ],
        }
    }
}

const HOOKS: &[&str] = &[
    "Consistency beats motivation.",
    "Bas ek baar try kar… phir habit ban जाएगी.",
    "Small steps, big results.",
    "Focus on progress, not perfection.",
    "Energy is everything.",
    "No excuses. Just work.",
    "Kuch karna hai to aaj hi.",
    "Dil se kiya to output bhi real hoga.",
];

const CTAS: &[&str] = &[
    "✅ Save this post",
    "💬 Comment your thoughts",
    "🔁 Share with your friend",
    "📌 Follow for more",
    "❤️ Like if you agree",
];

const NICHES: &[(&str, &[&str])] = &[
    (
        "bike",
        &["splendor", "bike", "bikelife", "rider", "ride", "motorcycle", "biker"],
    ),
    (
        "love",
        &["love", "couple", "romance", "relationship", "pyar", "jaan", "gf", "bf"],
    ),
    (
        "sad",
        &["sad", "broken", "heartbreak", "alone", "sadquotes", "mood", "breakup"],
    ),
    (
        "fitness",
        &["fitness", "gym", "workout", "health", "motivation", "fitlife"],
    ),
    (
        "business",
        &["business", "startup", "hustle", "entrepreneur", "marketing", "growth"],
    ),
    (
        "music",
        &["music", "song", "lyrics", "beats", "artist", "audio"],
    ),
    (
        "travel",
        &["travel", "wanderlust", "trip", "vacation", "explore", "journey"],
    ),
    (
        "editing",
        &["capcut", "videoediting", "editing", "template", "reelsedit", "creator"],
    ),
];

const ALWAYS_TAGS: &[&str] = &[
    "reels",
    "reelsvideo",
    "viral",
    "explore",
    "explorepage",
    "instareels",
    "instagramreels",
];

const FILLER_TAGS: &[&str] = &[
    "creator",
    "content",
    "trend",
    "reelitfeelit",
    "instadaily",
    "viralvideo",
    "newpost",
    "foryou",
    "instagood",
    "dailyreels",
    "trendingnow",
    "reelkarofeelkaro",
];

pub const MIN_HASHTAGS: usize = 10;
pub const MAX_HASHTAGS: usize = 30;
pub const DEFAULT_HASHTAGS: usize = 25;

/// Full SEO pack for a topic: caption, tags, and posting tips.
#[derive(Clone, Debug)]
pub struct SeoPack {
    pub caption: String,
    pub hashtags: Vec<String>,
    pub niche: &'static str,
    pub tips: Vec<String>,
}

pub struct ContentGenerator {
    brand_tag: String,
}

impl ContentGenerator {
    pub fn new(brand_tag: impl Into<String>) -> Self {
        Self {
            brand_tag: brand_tag.into(),
        }
    }

    pub fn caption(&self, topic: &str, style: CaptionStyle) -> String {
        let mut rng = thread_rng();
        let template = style
            .templates()
            .choose(&mut rng)
            .copied()
            .unwrap_or("{topic}\n{brand}");
        let hook = HOOKS.choose(&mut rng).copied().unwrap_or_default();
        let cta = CTAS.choose(&mut rng).copied().unwrap_or_default();

        template
            .replace("{topic}", topic)
            .replace("{hook}", hook)
            .replace("{cta}", cta)
            .replace("{brand}", &self.brand_tag)
            .trim()
            .to_string()
    }

    /// `n` is clamped to 10..=30. Tags are unique, lowercase, `#`-prefixed.
    pub fn hashtags(&self, topic: &str, n: usize, lang: TagLang) -> Vec<String> {
        let n = n.clamp(MIN_HASHTAGS, MAX_HASHTAGS);
        let niche = guess_niche(topic);

        let mut base: Vec<String> = Vec::new();
        for kw in topic_keywords(topic) {
            base.push(kw.clone());
            base.push(format!("{kw}reels"));
            base.push(format!("the{kw}"));
        }
        base.extend(niche_tags(niche).iter().map(|s| s.to_string()));
        base.extend(lang.tags().iter().map(|s| s.to_string()));
        base.extend(ALWAYS_TAGS.iter().map(|s| s.to_string()));

        let mut rng = thread_rng();
        base.shuffle(&mut rng);

        let mut tags = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for b in &base {
            let Some(tag) = normalize_hashtag(b) else {
                continue;
            };
            if seen.insert(tag.clone()) {
                tags.push(tag);
                if tags.len() >= n {
                    break;
                }
            }
        }

        for f in FILLER_TAGS {
            if tags.len() >= n {
                break;
            }
            let Some(tag) = normalize_hashtag(f) else {
                continue;
            };
            if seen.insert(tag.clone()) {
                tags.push(tag);
            }
        }

        tags
    }

    pub fn seo_pack(&self, topic: &str) -> SeoPack {
        let niche = guess_niche(topic);
        SeoPack {
            caption: self.caption(topic, CaptionStyle::Viral),
            hashtags: self.hashtags(topic, DEFAULT_HASHTAGS, TagLang::Hinglish),
            niche,
            tips: vec![
                "Reel length: 6–12 sec (hook in first 1 sec)".to_string(),
                "Use 3–5 keywords in first line".to_string(),
                "Keep hashtags 18–25 (mix niche + broad)".to_string(),
                "Pin top comment with keyword + CTA".to_string(),
                "Best time (India): 7–10 PM / 12–2 PM".to_string(),
                format!("Niche guessed: {niche}"),
            ],
        }
    }
}

fn niche_tags(niche: &str) -> &'static [&'static str] {
    NICHES
        .iter()
        .find(|(name, _)| *name == niche)
        .map(|(_, tags)| *tags)
        .unwrap_or(&[])
}

/// Picks the first niche whose marker words appear in the topic; falls back
/// to "music" (broadest catch-all for reels content).
pub fn guess_niche(topic: &str) -> &'static str {
    let t = topic.to_lowercase();
    for (name, words) in NICHES {
        if words.iter().any(|w| t.contains(w)) {
            return name;
        }
    }
    "music"
}

/// Lowercased topic words of length >= 3, order-preserving dedup, max 10.
pub fn topic_keywords(topic: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    topic
        .split(|c: char| c.is_whitespace() || ",.;:!?-_/".contains(c))
        .filter(|p| p.chars().count() >= 3)
        .map(|p| p.to_lowercase())
        .filter(|p| seen.insert(p.clone()))
        .take(10)
        .collect()
}

/// Strips everything but `[A-Za-z0-9_]`, trims underscores, lowercases, and
/// prefixes `#`. Returns `None` when nothing survives.
pub fn normalize_hashtag(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    let cleaned = cleaned.trim_matches('_').to_lowercase();
    if cleaned.is_empty() {
        None
    } else {
        Some(format!("#{cleaned}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_and_prefixes() {
        assert_eq!(normalize_hashtag("Dr. Zeus!"), Some("#drzeus".to_string()));
        assert_eq!(normalize_hashtag("__tag__"), Some("#tag".to_string()));
        assert_eq!(normalize_hashtag("…!?"), None);
    }

    #[test]
    fn keywords_dedup_and_respect_min_length_and_cap() {
        let kws = topic_keywords("Dr Zeus song, song of the year / SONG");
        assert_eq!(kws, vec!["zeus", "song", "the", "year"]);

        let long: String = (0..20).map(|i| format!("word{i} ")).collect();
        assert_eq!(topic_keywords(&long).len(), 10);
    }

    #[test]
    fn niche_guessing_prefers_marker_words() {
        assert_eq!(guess_niche("splendor bike ride"), "bike");
        assert_eq!(guess_niche("gym workout plan"), "fitness");
        assert_eq!(guess_niche("quarterly report"), "music"); // fallback
    }

    #[test]
    fn hashtags_are_unique_prefixed_and_clamped() {
        let gen = ContentGenerator::new("@Brand");

        let tags = gen.hashtags("bike reels", 99, TagLang::Hinglish);
        assert_eq!(tags.len(), MAX_HASHTAGS);
        assert!(tags.iter().all(|t| t.starts_with('#')));

        let mut dedup = tags.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), tags.len());

        assert_eq!(gen.hashtags("bike", 1, TagLang::English).len(), MIN_HASHTAGS);
    }

    #[test]
    fn caption_carries_topic_and_brand() {
        let gen = ContentGenerator::new("@Brand");
        let cap = gen.caption("monsoon ride", CaptionStyle::Viral);
        assert!(cap.contains("monsoon ride"));
        assert!(cap.contains("@Brand"));
    }

    #[test]
    fn style_and_lang_parsing() {
        assert_eq!(CaptionStyle::parse("VIRAL"), Some(CaptionStyle::Viral));
        assert_eq!(CaptionStyle::parse("nope"), None);
        assert_eq!(TagLang::parse("Hindi"), Some(TagLang::Hindi));
        assert_eq!(TagLang::parse("french"), None);
    }

    #[test]
    fn seo_pack_is_complete() {
        let gen = ContentGenerator::new("@Brand");
        let pack = gen.seo_pack("capcut editing reels");
        assert_eq!(pack.niche, "editing");
        assert_eq!(pack.hashtags.len(), DEFAULT_HASHTAGS);
        assert!(!pack.caption.is_empty());
        assert!(pack.tips.iter().any(|t| t.contains("editing")));
    }
}
