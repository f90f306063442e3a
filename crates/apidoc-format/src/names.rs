use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::{Captures, Regex};

fn snake_pair() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([a-zA-Z]+)_([a-zA-Z]+)").expect("valid snake pair pattern"))
}

fn all_caps() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]+$").expect("valid all caps pattern"))
}

fn word_start() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:^|_)([a-z0-9])").expect("valid word start pattern"))
}

fn capital() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Z]").expect("valid capital pattern"))
}

/// Turn a code identifier into a human heading.
///
/// `InstanceInfo` becomes `Instance Info`, `get_messages` becomes
/// `Get Messages` and `SCREAMING_CASE` becomes `Screaming Case`.
pub fn title_case(name: &str) -> String {
    let joined = snake_pair().replace_all(name, |caps: &Captures<'_>| {
        format!("{}{}", capitalize(&caps[1]), capitalize(&caps[2]))
    });
    let lowered = if all_caps().is_match(&joined) {
        joined.to_lowercase()
    } else {
        joined.into_owned()
    };
    let started = word_start().replace_all(&lowered, |caps: &Captures<'_>| caps[1].to_uppercase());
    let spaced = capital().replace_all(&started, " $0");
    spaced.replace('_', "").trim().to_string()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => String::new(),
    }
}

/// Serde `rename_all` rules applied to enum variant tags.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    pub const ALL: [RenameRule; 8] = [
        RenameRule::Lower,
        RenameRule::Upper,
        RenameRule::Pascal,
        RenameRule::Camel,
        RenameRule::Snake,
        RenameRule::ScreamingSnake,
        RenameRule::Kebab,
        RenameRule::ScreamingKebab,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RenameRule::Lower => "lowercase",
            RenameRule::Upper => "UPPERCASE",
            RenameRule::Pascal => "PascalCase",
            RenameRule::Camel => "camelCase",
            RenameRule::Snake => "snake_case",
            RenameRule::ScreamingSnake => "SCREAMING_SNAKE_CASE",
            RenameRule::Kebab => "kebab-case",
            RenameRule::ScreamingKebab => "SCREAMING-KEBAB-CASE",
        }
    }

    pub fn apply(self, name: &str) -> String {
        match self {
            RenameRule::Lower => return name.to_lowercase(),
            RenameRule::Upper => return name.to_uppercase(),
            _ => {}
        }

        let words = split_words(name);
        match self {
            RenameRule::Pascal => words.iter().map(|w| capitalize(w)).collect(),
            RenameRule::Camel => words
                .iter()
                .enumerate()
                .map(|(idx, w)| if idx == 0 { w.to_lowercase() } else { capitalize(w) })
                .collect(),
            RenameRule::Snake => join_words(&words, "_", str::to_lowercase),
            RenameRule::ScreamingSnake => join_words(&words, "_", str::to_uppercase),
            RenameRule::Kebab => join_words(&words, "-", str::to_lowercase),
            RenameRule::ScreamingKebab => join_words(&words, "-", str::to_uppercase),
            RenameRule::Lower | RenameRule::Upper => unreachable!("handled above"),
        }
    }
}

impl fmt::Display for RenameRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownRenameRule(pub String);

impl fmt::Display for UnknownRenameRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown rename rule '{}'", self.0)
    }
}

impl std::error::Error for UnknownRenameRule {}

impl FromStr for RenameRule {
    type Err = UnknownRenameRule;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        RenameRule::ALL
            .into_iter()
            .find(|rule| rule.as_str() == value)
            .ok_or_else(|| UnknownRenameRule(value.to_string()))
    }
}

fn join_words(words: &[String], sep: &str, case: fn(&str) -> String) -> String {
    words.iter().map(|w| case(w)).collect::<Vec<_>>().join(sep)
}

/// Split an identifier into words on separators, lower→upper transitions and
/// the end of an acronym (`HTTPServer` splits as `HTTP`, `Server`).
fn split_words(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (idx, &ch) in chars.iter().enumerate() {
        if matches!(ch, '_' | '-' | ' ') {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if ch.is_uppercase() && !current.is_empty() {
            let prev = chars[idx - 1];
            let next_is_lower = chars.get(idx + 1).is_some_and(|c| c.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(ch);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}
