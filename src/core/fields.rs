//! Customer name and house number extraction.

use once_cell::sync::Lazy;
use regex::Regex;

pub const UNKNOWN_CUSTOMER: &str = "Unknown";
pub const HOUSE_NOT_SPECIFIED: &str = "Not specified";

static FOR_NAME_BEFORE_HOUSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)for\s+([A-Za-z]+)\s+[A-Z][0-9]").unwrap());
static TRAILING_DASH_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[–-]\s*([A-Za-z]+)$").unwrap());
static GREETING_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Good\s+morning\s+([A-Za-z]+)").unwrap());

// 大小寫敏感：棟別一定是大寫字母
static HOUSE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z][0-9]+[\s-]?[0-9]+").unwrap());

/// Name rules, tried in this order; the first rule that matches wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRule {
    /// `for Priya A2 205`
    ForBeforeHouse,
    /// `... - Priya` at the very end
    TrailingDash,
    /// `Good morning Priya`
    Greeting,
}

pub const NAME_RULES: [NameRule; 3] = [
    NameRule::ForBeforeHouse,
    NameRule::TrailingDash,
    NameRule::Greeting,
];

impl NameRule {
    fn regex(self) -> &'static Regex {
        match self {
            NameRule::ForBeforeHouse => &FOR_NAME_BEFORE_HOUSE_RE,
            NameRule::TrailingDash => &TRAILING_DASH_NAME_RE,
            NameRule::Greeting => &GREETING_NAME_RE,
        }
    }

    pub fn capture<'a>(self, content: &'a str) -> Option<&'a str> {
        self.regex()
            .captures(content)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

pub fn find_name(content: &str) -> Option<&str> {
    NAME_RULES.iter().find_map(|rule| rule.capture(content))
}

pub fn extract_name(content: &str) -> String {
    find_name(content).unwrap_or(UNKNOWN_CUSTOMER).to_string()
}

/// A house number as written in the message and in canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HouseNumber<'a> {
    pub raw: &'a str,
    pub normalized: String,
}

pub fn find_house_number(content: &str) -> Option<HouseNumber<'_>> {
    let raw = HOUSE_NUMBER_RE.find(content)?.as_str();
    // A1 102 -> A1-102
    let normalized = raw.replacen(char::is_whitespace, "-", 1);
    Some(HouseNumber { raw, normalized })
}

pub fn extract_house_number(content: &str) -> String {
    find_house_number(content)
        .map(|house| house.normalized)
        .unwrap_or_else(|| HOUSE_NOT_SPECIFIED.to_string())
}
