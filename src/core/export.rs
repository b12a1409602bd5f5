use crate::domain::model::{OrderBatch, OrderRecord, ProductSummary, Unit};
use crate::utils::error::{OrderError, Result};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::collections::BTreeMap;

pub const CSV_HEADER: [&str; 10] = [
    "Date",
    "Time",
    "Phone Number",
    "Customer Name",
    "House Number",
    "Product",
    "Quantity",
    "Unit",
    "Price per Unit",
    "Amount",
];

/// 十欄固定表頭，每個欄位都加雙引號，列與列之間以 `\n` 分隔
pub fn to_csv(orders: &[OrderRecord]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for order in orders {
        let quantity = order.quantity.to_string();
        let price_per_unit = order.price_per_unit.to_string();
        let amount = order.amount.to_string();

        writer.write_record([
            order.date.as_str(),
            order.time.as_str(),
            order.phone.as_str(),
            order.customer_name.as_str(),
            order.house_number.as_str(),
            order.product.as_str(),
            quantity.as_str(),
            order.unit.as_str(),
            price_per_unit.as_str(),
            amount.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| OrderError::IoError(e.into_error()))?;
    let rows = String::from_utf8(bytes).map_err(|e| OrderError::ProcessingError {
        message: format!("CSV output is not valid UTF-8: {}", e),
    })?;

    let mut csv = CSV_HEADER.join(",");
    if !rows.is_empty() {
        csv.push('\n');
        csv.push_str(rows.trim_end_matches('\n'));
    }
    Ok(csv)
}

pub fn to_json(orders: &[OrderRecord]) -> Result<String> {
    let batch = OrderBatch {
        orders: orders.to_vec(),
    };
    Ok(serde_json::to_string_pretty(&batch)?)
}

/// Order count and total quantity per product and unit, sorted by product.
pub fn summarize(orders: &[OrderRecord]) -> Vec<ProductSummary> {
    let mut totals: BTreeMap<(String, Unit), (usize, f64)> = BTreeMap::new();

    for order in orders {
        let entry = totals
            .entry((order.product.clone(), order.unit))
            .or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += order.quantity;
    }

    totals
        .into_iter()
        .map(|((product, unit), (orders, total_quantity))| ProductSummary {
            product,
            unit,
            orders,
            total_quantity,
        })
        .collect()
}
