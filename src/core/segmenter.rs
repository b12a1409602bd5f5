//! Splits pasted chat text into [`RawMessage`]s.
//!
//! A header line looks like `[07-07-2025 16:10] +91 96198 82148: text`.
//! Lines without a header continue the open message; lines before the first
//! header are dropped.

use crate::domain::model::RawMessage;
use once_cell::sync::Lazy;
use regex::Regex;

static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[\s\x{200E}\x{FEFF}]*\[([0-9]{2}-[0-9]{2}-[0-9]{4})\s+([0-9]{2}:[0-9]{2})\]\s+(\+[0-9][0-9\s]*?)\s*:\s*(.*)$",
    )
    .unwrap()
});

fn parse_header(line: &str) -> Option<RawMessage> {
    let caps = HEADER_RE.captures(line)?;
    Some(RawMessage {
        date: caps[1].to_string(),
        time: caps[2].to_string(),
        phone: caps[3].to_string(),
        content: caps[4].trim().to_string(),
    })
}

/// Lazy iterator over the messages of one chat export. A clone continues
/// from the same position; call [`segment`] again for a fresh pass.
#[derive(Debug, Clone)]
pub struct Segmenter<'a> {
    lines: std::str::Lines<'a>,
    open: Option<RawMessage>,
}

impl Iterator for Segmenter<'_> {
    type Item = RawMessage;

    fn next(&mut self) -> Option<RawMessage> {
        for line in self.lines.by_ref() {
            if let Some(header) = parse_header(line) {
                if let Some(finished) = self.open.replace(header) {
                    return Some(finished);
                }
                continue;
            }

            // 續行：接在目前訊息後面，空白行忽略
            let Some(open) = self.open.as_mut() else {
                continue;
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if !open.content.is_empty() {
                open.content.push(' ');
            }
            open.content.push_str(trimmed);
        }

        self.open.take()
    }
}

impl std::iter::FusedIterator for Segmenter<'_> {}

pub fn segment(text: &str) -> Segmenter<'_> {
    Segmenter {
        lines: text.lines(),
        open: None,
    }
}
