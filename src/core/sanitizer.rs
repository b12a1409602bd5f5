//! Message-body cleanup.
//!
//! [`strip_emoji`] runs on the raw body before any field is extracted.
//! [`sanitize`] then prepares the search surface for product/quantity
//! extraction by applying [`CLEANUP_ORDER`] step by step.

use once_cell::sync::Lazy;
use regex::Regex;

static EMOJI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"[\x{1F600}-\x{1F64F}\x{1F300}-\x{1F5FF}\x{1F680}-\x{1F6FF}\x{1F1E0}-\x{1F1FF}\x{1F900}-\x{1F9FF}\x{2600}-\x{26FF}\x{2700}-\x{27BF}\x{FE0F}]",
    )
    .unwrap()
});

static GREETING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Good\s+morning\s+[A-Za-z]+\s*,?").unwrap());
static BOOK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Book\s+").unwrap());
static FOR_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)for\s+[A-Za-z]+").unwrap());
static COLLECT_QUESTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)When\s+can\s+I\s+collect.*$").unwrap());
static COLLECT_TAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Will\s+collect.*$").unwrap());
static ELLIPSIS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[….]+").unwrap());

/// Removes pictographs, dingbats, flags and symbol blocks, plus the emoji
/// variation selector, then trims.
pub fn strip_emoji(text: &str) -> String {
    EMOJI_RE.replace_all(text, "").trim().to_string()
}

/// One cleanup step. Each step removes at most one kind of noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupStep {
    /// First occurrence of the detected house-number text. Must run before
    /// quantity search so its digits are never read as a quantity.
    HouseNumber,
    /// `Good morning <name>,`; the name is letters only so a quantity right
    /// after the greeting survives.
    Greeting,
    /// `Book `
    BookPrefix,
    /// `for <word>` where the word is letters only (`for 2 kg` stays).
    ForName,
    /// `When can I collect ...` up to the end.
    CollectQuestion,
    /// `Will collect ...` up to the end.
    CollectTail,
    /// Runs of `.` and `…`; a single `.` between two digits is a decimal
    /// point and stays.
    Ellipsis,
}

pub const CLEANUP_ORDER: [CleanupStep; 7] = [
    CleanupStep::HouseNumber,
    CleanupStep::Greeting,
    CleanupStep::BookPrefix,
    CleanupStep::ForName,
    CleanupStep::CollectQuestion,
    CleanupStep::CollectTail,
    CleanupStep::Ellipsis,
];

impl CleanupStep {
    pub fn apply(self, text: &str, house_number: Option<&str>) -> String {
        match self {
            CleanupStep::HouseNumber => match house_number {
                Some(house) if !house.is_empty() => text.replacen(house, "", 1),
                _ => text.to_string(),
            },
            CleanupStep::Greeting => GREETING_RE.replace(text, "").into_owned(),
            CleanupStep::BookPrefix => BOOK_RE.replace(text, "").into_owned(),
            CleanupStep::ForName => FOR_NAME_RE.replace(text, "").into_owned(),
            CleanupStep::CollectQuestion => COLLECT_QUESTION_RE.replace(text, "").into_owned(),
            CleanupStep::CollectTail => COLLECT_TAIL_RE.replace(text, "").into_owned(),
            CleanupStep::Ellipsis => strip_ellipses(text),
        }
    }
}

/// `house_number` is the text exactly as it appeared in the message.
pub fn sanitize(content: &str, house_number: Option<&str>) -> String {
    CLEANUP_ORDER
        .iter()
        .fold(content.to_string(), |text, step| step.apply(&text, house_number))
        .trim()
        .to_string()
}

fn strip_ellipses(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for run in ELLIPSIS_RE.find_iter(text) {
        out.push_str(&text[last..run.start()]);
        last = run.end();

        // 保留小數點 (例如 1.5 kg)
        let before = text[..run.start()].chars().next_back();
        let after = text[run.end()..].chars().next();
        let is_decimal_point = run.as_str() == "."
            && before.is_some_and(|c| c.is_ascii_digit())
            && after.is_some_and(|c| c.is_ascii_digit());
        if is_decimal_point {
            out.push('.');
        }
    }

    out.push_str(&text[last..]);
    out
}
