use crate::domain::model::{OrderRecord, ProductMatch, RawMessage};

/// Per-message fields shared by every order the message produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub name: String,
    pub house_number: String,
}

pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| !c.is_whitespace()).collect()
}

/// One record per match, in match order. No matches, no records.
pub fn assemble(message: &RawMessage, customer: &Customer, matches: &[ProductMatch]) -> Vec<OrderRecord> {
    let phone = normalize_phone(&message.phone);

    matches
        .iter()
        .map(|m| OrderRecord {
            date: message.date.clone(),
            time: message.time.clone(),
            phone: phone.clone(),
            customer_name: customer.name.clone(),
            house_number: customer.house_number.clone(),
            product: m.product.to_string(),
            quantity: m.quantity,
            unit: m.unit,
            // 價格不在解析範圍內，固定為 0
            price_per_unit: 0.0,
            amount: 0.0,
        })
        .collect()
}
