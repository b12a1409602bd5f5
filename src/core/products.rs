//! Product detection and quantity resolution over sanitized message content.

use crate::core::registry::{self, ProductDefinition};
use crate::domain::model::{ProductMatch, Unit};
use once_cell::sync::Lazy;
use regex::Regex;

pub const NUMBER: &str = r"([0-9]+(?:\.[0-9]+)?)";
pub const UNITS: &str = r"(kg|gm|gms|g|piece|pieces|pcs)";
pub const WEIGHT_UNITS: &str = r"(kg|gm|gms|g)";

static SHARED_QUANTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(.+?)\s+and\s+(.+?)\s*[….]?\s*one\s+kg\s+each").unwrap()
});

static PIECES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([0-9]+)\s*(?:piece|pieces|pcs)").unwrap());

/// Quantity rules, evaluated in declaration order for every detected
/// product. The first rule whose regex matches decides the quantity; later
/// rules are not consulted even if that quantity turns out unusable.
///
/// Every rule captures the number in group 1 and the optional unit token in
/// group 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityRule {
    /// `250 gm of cardamom`
    LeadingWithOf,
    /// `cardamom - 250 gm`
    Trailing,
    /// `250gm cardamom`
    Leading,
    /// `2 kg dragon` (alias products only)
    AliasLeading,
    /// `dragon fruit 2 kg` (alias products only)
    AliasTrailing,
}

impl QuantityRule {
    pub const GENERAL: [QuantityRule; 3] = [
        QuantityRule::LeadingWithOf,
        QuantityRule::Trailing,
        QuantityRule::Leading,
    ];
    pub const ALIAS: [QuantityRule; 2] = [QuantityRule::AliasLeading, QuantityRule::AliasTrailing];

    /// 組出規則的正規表達式；`anchor` 是產品片段，別名規則則是別名本身
    pub fn pattern(self, anchor: &str) -> String {
        match self {
            QuantityRule::LeadingWithOf => {
                format!(r"(?i){}\s*{}?\s*(?:of\s+)?{}", NUMBER, UNITS, anchor)
            }
            QuantityRule::Trailing => {
                format!(r"(?i){}\s*[-–]?\s*{}\s*(?:{}\b)?", anchor, NUMBER, UNITS)
            }
            QuantityRule::Leading => format!(r"(?i){}\s*{}?\s*{}", NUMBER, UNITS, anchor),
            QuantityRule::AliasLeading => {
                format!(r"(?i){}\s*{}?\s*{}\b", NUMBER, WEIGHT_UNITS, anchor)
            }
            QuantityRule::AliasTrailing => {
                format!(r"(?i){}\s*fruit?\s*{}\s*(?:{}\b)?", anchor, NUMBER, WEIGHT_UNITS)
            }
        }
    }
}

/// Products found in one message plus the ones whose quantity could not be
/// resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub matches: Vec<ProductMatch>,
    pub unresolved: Vec<&'static str>,
}

pub fn extract_products(sanitized: &str) -> Vec<ProductMatch> {
    extract(sanitized).matches
}

/// Shared-quantity mode first, per-product mode otherwise.
pub fn extract(sanitized: &str) -> Extraction {
    if let Some(matches) = shared_quantity(sanitized) {
        return Extraction {
            matches,
            unresolved: Vec::new(),
        };
    }
    per_product(sanitized)
}

/// "X and Y ... one kg each". Returns `None` when the construct is absent.
/// Both phrases are tested against every product; duplicates are kept.
fn shared_quantity(content: &str) -> Option<Vec<ProductMatch>> {
    let caps = SHARED_QUANTITY_RE.captures(content)?;
    let phrases = [caps[1].trim(), caps[2].trim()];

    let mut matches = Vec::new();
    for def in registry::products() {
        for phrase in phrases {
            if def.mentioned_in(phrase) {
                matches.push(ProductMatch {
                    product: def.name,
                    quantity: 1.0,
                    unit: Unit::Kg,
                });
            }
        }
    }

    tracing::trace!("shared quantity construct matched {} products", matches.len());
    Some(matches)
}

fn per_product(content: &str) -> Extraction {
    let mut extraction = Extraction::default();

    for def in registry::products() {
        if !def.appears_in(content) {
            continue;
        }

        match resolve_quantity(def, content) {
            Some((quantity, unit)) => {
                // 同一則訊息同一個產品只保留一筆
                if !extraction.matches.iter().any(|m| m.product == def.name) {
                    extraction.matches.push(ProductMatch {
                        product: def.name,
                        quantity,
                        unit,
                    });
                }
            }
            None => {
                tracing::trace!("no quantity found for {}", def.name);
                extraction.unresolved.push(def.name);
            }
        }
    }

    extraction
}

fn resolve_quantity(def: &ProductDefinition, content: &str) -> Option<(f64, Unit)> {
    let first_hit = def
        .quantity_rules()
        .iter()
        .find_map(|(_, re)| re.captures(content))
        .map(|caps| {
            let quantity = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok());
            let unit = caps.get(2).and_then(|m| Unit::from_token(m.as_str()));
            (quantity, unit)
        });

    if let Some((Some(quantity), unit)) = first_hit {
        if quantity > 0.0 {
            return Some((quantity, unit.unwrap_or(def.default_unit)));
        }
    }

    // 以「個」計價的產品 (Avocado) 再試一次件數寫法
    if def.default_unit == Unit::Pieces {
        let caps = PIECES_RE.captures(content)?;
        let quantity = caps[1].parse::<f64>().ok().filter(|q| *q > 0.0)?;
        return Some((quantity, Unit::Pieces));
    }

    None
}
