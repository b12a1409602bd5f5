//! Deterministic, offline order extraction.
//!
//! `parse` is a pure function: same text in, same ordered records out. It
//! never fails; anything it cannot read is left out of the result.

use crate::core::assembler::{assemble, Customer};
use crate::core::fields::{find_house_number, find_name, HOUSE_NOT_SPECIFIED, UNKNOWN_CUSTOMER};
use crate::core::products;
use crate::core::sanitizer::{sanitize, strip_emoji};
use crate::core::segmenter::segment;
use crate::domain::model::{OrderRecord, ParseReport, RawMessage, Unmatched, UnmatchedReason};
use crate::domain::ports::OrderSource;
use crate::utils::error::Result;
use async_trait::async_trait;

pub fn parse(text: &str) -> Vec<OrderRecord> {
    parse_with_report(text).orders
}

/// Same output as [`parse`] plus what was skipped and why.
pub fn parse_with_report(text: &str) -> ParseReport {
    let mut report = ParseReport::default();

    for message in segment(text) {
        parse_message(&message, &mut report);
    }

    report
}

fn parse_message(message: &RawMessage, report: &mut ParseReport) {
    let content = strip_emoji(&message.content);

    let house = find_house_number(&content);
    let customer = Customer {
        name: find_name(&content).unwrap_or(UNKNOWN_CUSTOMER).to_string(),
        house_number: house
            .as_ref()
            .map_or_else(|| HOUSE_NOT_SPECIFIED.to_string(), |h| h.normalized.clone()),
    };

    let cleaned = sanitize(&content, house.as_ref().map(|h| h.raw));
    let extraction = products::extract(&cleaned);

    tracing::trace!(
        "message {} {} {}: {} products, {} unresolved",
        message.date,
        message.time,
        message.phone,
        extraction.matches.len(),
        extraction.unresolved.len()
    );

    let unmatched = |reason| Unmatched {
        date: message.date.clone(),
        time: message.time.clone(),
        phone: message.phone.clone(),
        reason,
    };

    if extraction.matches.is_empty() && extraction.unresolved.is_empty() {
        report.unmatched.push(unmatched(UnmatchedReason::NoProducts));
    }
    for product in extraction.unresolved.iter().copied() {
        report
            .unmatched
            .push(unmatched(UnmatchedReason::QuantityNotFound { product }));
    }

    report
        .orders
        .extend(assemble(message, &customer, &extraction.matches));
}

/// [`parse`] behind the [`OrderSource`] port.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackSource;

#[async_trait]
impl OrderSource for FallbackSource {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn extract_orders(&self, text: &str) -> Result<Vec<OrderRecord>> {
        let report = parse_with_report(text);
        if !report.unmatched.is_empty() {
            tracing::debug!(
                "Fallback parser skipped {} message(s)/product(s) it could not read",
                report.unmatched.len()
            );
        }
        Ok(report.orders)
    }
}
