// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::query::{Query, SearchIntent, SearchLocality};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

/// 分析规则版本
pub const ANALYZER_VERSION: &str = "rules-1";

/// 超出部分不参与分析
const MAX_ANALYZED_CHARS: usize = 2048;

static OPERATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|\s)(site|lang|filetype):(\S+)").expect("operator regex is valid")
});

static DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b[a-z0-9][a-z0-9-]*(?:\.[a-z0-9-]+)*\.(?:com|org|net|io|dev|gov|edu|co|uk|de|fr|cn|jp|info|app|ai)\b",
    )
    .expect("domain regex is valid")
});

const INTENT_CUES: &[(SearchIntent, &[&str])] = &[
    (
        SearchIntent::Informational,
        &[
            "what", "how", "why", "who", "when", "which", "define", "definition", "meaning",
            "guide", "tutorial", "explain", "explained", "history", "learn", "examples", "wiki",
        ],
    ),
    (
        SearchIntent::Navigational,
        &[
            "login", "signin", "sign in", "log in", "homepage", "home page", "website",
            "official site", "official website",
        ],
    ),
    (
        SearchIntent::Transactional,
        &[
            "buy", "order", "purchase", "download", "subscribe", "coupon", "discount", "cheap",
            "deal", "deals", "price", "pricing", "for sale", "free shipping",
        ],
    ),
    (
        SearchIntent::Commercial,
        &[
            "best", "top", "review", "reviews", "vs", "versus", "compare", "comparison",
            "alternative", "alternatives", "recommended", "rating", "ratings",
        ],
    ),
    (
        SearchIntent::Local,
        &[
            "near me", "nearby", "open now", "directions to", "restaurant", "restaurants",
            "cafe", "hotel", "hotels", "pharmacy", "plumber", "dentist",
        ],
    ),
    (
        SearchIntent::Visual,
        &[
            "image", "images", "picture", "pictures", "photo", "photos", "wallpaper",
            "wallpapers", "video", "videos", "gif", "logo", "clipart",
        ],
    ),
    (
        SearchIntent::News,
        &[
            "news", "latest", "breaking", "today", "headlines", "update", "updates",
            "announced", "election", "this week",
        ],
    ),
];

const LOCALITY_CUES: &[(SearchLocality, &[&str])] = &[
    (
        SearchLocality::Local,
        &[
            "near me", "nearby", "around me", "open now", "directions to", "close to me",
            "in my area", "new york", "london", "paris", "tokyo", "berlin", "san francisco",
            "los angeles", "chicago", "beijing", "shanghai", "sydney", "toronto", "madrid",
            "rome", "seoul", "singapore", "mumbai",
        ],
    ),
    (
        SearchLocality::Regional,
        &[
            "region", "regional", "state", "province", "county", "statewide", "europe", "asia",
            "africa", "latin america", "middle east", "scandinavia", "midwest", "west coast",
            "east coast",
        ],
    ),
    (
        SearchLocality::National,
        &[
            "national", "nationwide", "federal", "countrywide", "usa", "united states", "uk",
            "united kingdom", "canada", "germany", "france", "china", "japan", "india",
            "brazil", "australia", "mexico", "spain", "italy",
        ],
    ),
    (
        SearchLocality::Global,
        &["worldwide", "global", "international", "around the world", "world"],
    ),
];

const LANGUAGE_STOPWORDS: &[(&str, &[&str])] = &[
    (
        "en",
        &["the", "a", "an", "of", "and", "is", "for", "with", "how", "what", "where", "best", "to", "in"],
    ),
    (
        "es",
        &["el", "la", "los", "las", "de", "que", "y", "en", "para", "con", "por", "cómo", "qué", "donde", "mejor", "mejores"],
    ),
    (
        "fr",
        &["le", "la", "les", "des", "du", "et", "est", "pour", "avec", "comment", "quel", "quelle", "où", "meilleur"],
    ),
    (
        "de",
        &["der", "die", "das", "und", "ist", "mit", "für", "wie", "was", "wo", "ein", "eine", "nicht", "beste"],
    ),
    (
        "pt",
        &["o", "os", "as", "da", "do", "que", "e", "em", "para", "com", "como", "onde", "melhor", "não"],
    ),
    (
        "it",
        &["il", "lo", "gli", "della", "che", "e", "per", "con", "come", "dove", "migliore", "non"],
    ),
];

const IMAGE_FILETYPES: &[&str] = &["jpg", "jpeg", "png", "gif", "svg", "webp"];

/// 查询分析器
///
/// 基于规则的本地分析，不访问网络。相同输入总是得到相同的意图、地域和语言；
/// 无法给出确定结论时回退为 `undefined`，从不返回错误。
#[derive(Debug, Default, Clone)]
pub struct QueryAnalyzer;

impl QueryAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// 分析原始查询文本
    pub fn analyze(&self, text: &str) -> Query {
        let raw: String = text.trim().chars().take(MAX_ANALYZED_CHARS).collect();
        let (remainder, parameters) = extract_operators(&raw);
        let processed_text = remainder
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        let padded = padded_tokens(&processed_text);

        let locality = classify_locality(&padded);
        let intent = classify_intent(&padded, &remainder, &parameters, locality);
        let language = parameters
            .get("lang")
            .and_then(Value::as_str)
            .map(|l| l.to_lowercase())
            .unwrap_or_else(|| detect_language(&remainder, &padded).to_string());

        tracing::trace!(
            intent = intent.as_str(),
            locality = locality.as_str(),
            language = %language,
            "query analyzed"
        );

        Query {
            text: text.to_string(),
            processed_text,
            intent,
            locality,
            language,
            parameters,
            context: Map::new(),
            id: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    /// 为已有查询补全分析结果，保留调用方提供的参数与上下文
    pub fn enrich(&self, query: Query) -> Query {
        let mut analyzed = self.analyze(&query.text);
        if query.intent != SearchIntent::Undefined {
            analyzed.intent = query.intent;
        }
        if query.locality != SearchLocality::Undefined {
            analyzed.locality = query.locality;
        }
        for (key, value) in query.parameters {
            analyzed.parameters.insert(key, value);
        }
        if let Some(lang) = analyzed.parameter_str("lang") {
            analyzed.language = lang.to_lowercase();
        }
        analyzed.context = query.context;
        analyzed.id = query.id;
        analyzed.created_at = query.created_at;
        analyzed
    }
}

/// 提取 `site:`、`lang:`、`filetype:` 操作符
fn extract_operators(raw: &str) -> (String, Map<String, Value>) {
    let mut parameters = Map::new();
    for caps in OPERATOR_RE.captures_iter(raw) {
        let key = caps[1].to_lowercase();
        let value = caps[2].trim_matches('"').to_string();
        if !value.is_empty() {
            parameters.insert(key, Value::String(value));
        }
    }
    let remainder = OPERATOR_RE.replace_all(raw, " ").trim().to_string();
    (remainder, parameters)
}

/// 以空格分隔并首尾补空格，便于整词/短语匹配
fn padded_tokens(processed: &str) -> String {
    let tokens: Vec<&str> = processed
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|t| !t.is_empty())
        .collect();
    format!(" {} ", tokens.join(" "))
}

fn cue_score(padded: &str, phrases: &[&str]) -> u32 {
    phrases
        .iter()
        .filter(|phrase| padded.contains(&format!(" {} ", phrase)))
        .count() as u32
}

/// 唯一最高分胜出；全为 0 或并列时返回 None
fn unique_max<T: Copy>(scores: &[(T, u32)]) -> Option<T> {
    let max = scores.iter().map(|(_, s)| *s).max().unwrap_or(0);
    if max == 0 {
        return None;
    }
    let mut winners = scores.iter().filter(|(_, s)| *s == max);
    let first = winners.next().map(|(label, _)| *label);
    if winners.next().is_some() {
        None
    } else {
        first
    }
}

fn classify_intent(
    padded: &str,
    remainder: &str,
    parameters: &Map<String, Value>,
    locality: SearchLocality,
) -> SearchIntent {
    let mut scores: HashMap<SearchIntent, u32> = INTENT_CUES
        .iter()
        .map(|(intent, phrases)| (*intent, cue_score(padded, phrases)))
        .collect();

    if remainder.trim_end().ends_with('?') {
        *scores.entry(SearchIntent::Informational).or_default() += 1;
    }
    if DOMAIN_RE.is_match(remainder) {
        *scores.entry(SearchIntent::Navigational).or_default() += 2;
    }
    if locality == SearchLocality::Local {
        *scores.entry(SearchIntent::Local).or_default() += 1;
    }
    if let Some(filetype) = parameters.get("filetype").and_then(Value::as_str) {
        if IMAGE_FILETYPES.contains(&filetype.to_lowercase().as_str()) {
            *scores.entry(SearchIntent::Visual).or_default() += 2;
        }
    }

    // Keep declaration order so ties are detected deterministically.
    let ordered: Vec<(SearchIntent, u32)> = INTENT_CUES
        .iter()
        .map(|(intent, _)| (*intent, scores.get(intent).copied().unwrap_or(0)))
        .collect();
    unique_max(&ordered).unwrap_or(SearchIntent::Undefined)
}

fn classify_locality(padded: &str) -> SearchLocality {
    let scores: Vec<(SearchLocality, u32)> = LOCALITY_CUES
        .iter()
        .map(|(locality, phrases)| (*locality, cue_score(padded, phrases)))
        .collect();
    if scores.iter().all(|(_, s)| *s == 0) {
        return SearchLocality::Global;
    }
    unique_max(&scores).unwrap_or(SearchLocality::Undefined)
}

fn detect_language(text: &str, padded: &str) -> &'static str {
    let mut latin = 0usize;
    let mut kana = 0usize;
    let mut scripts: Vec<(&'static str, usize)> = vec![
        ("zh", 0),
        ("ko", 0),
        ("ru", 0),
        ("ar", 0),
        ("el", 0),
        ("he", 0),
        ("hi", 0),
        ("th", 0),
    ];

    for c in text.chars().filter(|c| c.is_alphabetic()) {
        let code = c as u32;
        let script = match code {
            0x0041..=0x024F => {
                latin += 1;
                continue;
            }
            0x3040..=0x30FF => {
                kana += 1;
                continue;
            }
            0x3400..=0x4DBF | 0x4E00..=0x9FFF => "zh",
            0x1100..=0x11FF | 0xAC00..=0xD7AF => "ko",
            0x0400..=0x04FF => "ru",
            0x0600..=0x06FF => "ar",
            0x0370..=0x03FF => "el",
            0x0590..=0x05FF => "he",
            0x0900..=0x097F => "hi",
            0x0E00..=0x0E7F => "th",
            _ => continue,
        };
        if let Some(entry) = scripts.iter_mut().find(|(code, _)| *code == script) {
            entry.1 += 1;
        }
    }

    if kana > 0 {
        return "ja";
    }
    if let Some((code, count)) = scripts
        .iter()
        .copied()
        .fold(None, |best: Option<(&str, usize)>, cur| match best {
            Some(b) if b.1 >= cur.1 => Some(b),
            _ => Some(cur),
        })
    {
        if count > 0 && count >= latin {
            return code;
        }
    }

    let mut best = ("en", 0u32);
    for (code, words) in LANGUAGE_STOPWORDS {
        let score = cue_score(padded, words);
        if score > best.1 {
            best = (code, score);
        }
    }
    best.0
}
