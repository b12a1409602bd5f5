//! Canonical product table.
//!
//! Each definition carries the regex fragment that recognises the product,
//! an optional bare alias ("dragon" for Dragon Fruit) and the ordered
//! quantity rules compiled against that fragment. The table is built once
//! and never mutated.

use crate::core::products::QuantityRule;
use crate::domain::model::Unit;
use once_cell::sync::Lazy;
use regex::Regex;

pub struct ProductDefinition {
    pub name: &'static str,
    pub default_unit: Unit,
    pattern: Regex,
    alias_word: Option<Regex>,
    alias_anywhere: Option<Regex>,
    quantity_rules: Vec<(QuantityRule, Regex)>,
}

impl ProductDefinition {
    fn new(name: &'static str, fragment: &str, alias: Option<&str>, default_unit: Unit) -> Self {
        let pattern = compile(&format!("(?i){}", fragment));
        let alias_word = alias.map(|a| compile(&format!(r"(?i)\b{}\b", a)));
        let alias_anywhere = alias.map(|a| compile(&format!("(?i){}", a)));

        // 數量規則用的產品片段：別名以整字比對，取代 "dragon 後面不是 fruit" 的 lookahead
        let search = match alias {
            Some(a) => format!(r"(?:{}|{}\b)", fragment, a),
            None => format!("(?:{})", fragment),
        };

        let mut quantity_rules: Vec<(QuantityRule, Regex)> = QuantityRule::GENERAL
            .into_iter()
            .map(|rule| (rule, compile(&rule.pattern(&search))))
            .collect();

        if let Some(a) = alias {
            quantity_rules.extend(
                QuantityRule::ALIAS
                    .into_iter()
                    .map(|rule| (rule, compile(&rule.pattern(a)))),
            );
        }

        Self {
            name,
            default_unit,
            pattern,
            alias_word,
            alias_anywhere,
            quantity_rules,
        }
    }

    /// Whole-message detection: the main pattern, or the alias as a whole word.
    pub fn appears_in(&self, content: &str) -> bool {
        self.pattern.is_match(content)
            || self
                .alias_word
                .as_ref()
                .is_some_and(|alias| alias.is_match(content))
    }

    /// Phrase membership for the shared-quantity construct; the alias may
    /// appear anywhere in the phrase.
    pub fn mentioned_in(&self, phrase: &str) -> bool {
        self.pattern.is_match(phrase)
            || self
                .alias_anywhere
                .as_ref()
                .is_some_and(|alias| alias.is_match(phrase))
    }

    /// Quantity rules in evaluation order.
    pub fn quantity_rules(&self) -> &[(QuantityRule, Regex)] {
        &self.quantity_rules
    }
}

impl std::fmt::Debug for ProductDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductDefinition")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .field("default_unit", &self.default_unit)
            .finish()
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("product registry patterns are valid regexes")
}

static REGISTRY: Lazy<Vec<ProductDefinition>> = Lazy::new(|| {
    vec![
        ProductDefinition::new("Ginger Tea", r"ginger\s*tea", None, Unit::Gm),
        ProductDefinition::new("Masala Tea", r"masala\s*(?:tea|chai)", None, Unit::Gm),
        ProductDefinition::new("Avocado", r"(?:avocado|avacado|avokado)", None, Unit::Pieces),
        ProductDefinition::new("Dragon Fruit", r"dragon\s*fruit", Some("dragon"), Unit::Gm),
        ProductDefinition::new("Cardamom", r"cardamom", None, Unit::Gm),
    ]
});

/// 所有產品定義，順序即輸出順序
pub fn products() -> &'static [ProductDefinition] {
    &REGISTRY
}
