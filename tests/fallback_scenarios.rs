use order_parser::domain::model::UnmatchedReason;
use order_parser::{parse, parse_with_report, Unit};

const MORNING_CHAT: &str = "\
[07-07-2025 16:10] +91 96198 82148: Ginger tea 250 gm and masala tea 250gm A1 1023
[07-07-2025 16:12] +91 90000 00000: Avocado and Dragon fruit one kg each for Priya A2 205
[07-07-2025 16:14] +91 90000 00001: Tomatoes 2 kg
[07-07-2025 16:15] +91 90000 00002:
Cardamom 100 gm A1-102
[07-07-2025 16:20] +91 90000 00003: Dragon 2 kg B1 324 - Ravi";

#[test]
fn test_scenario_two_teas_with_house_number() {
    let orders = parse(
        "[07-07-2025 16:10] +91 96198 82148: Ginger tea 250 gm and masala tea 250gm A1 1023",
    );

    assert_eq!(orders.len(), 2);
    for (order, product) in orders.iter().zip(["Ginger Tea", "Masala Tea"]) {
        assert_eq!(order.date, "07-07-2025");
        assert_eq!(order.time, "16:10");
        assert_eq!(order.phone, "+919619882148");
        assert_eq!(order.customer_name, "Unknown");
        assert_eq!(order.house_number, "A1-1023");
        assert_eq!(order.product, product);
        assert_eq!(order.quantity, 250.0);
        assert_eq!(order.unit, Unit::Gm);
    }
}

#[test]
fn test_scenario_shared_quantity() {
    let orders = parse(
        "[07-07-2025 16:12] +91 90000 00000: Avocado and Dragon fruit one kg each for Priya A2 205",
    );

    let products: Vec<&str> = orders.iter().map(|o| o.product.as_str()).collect();
    assert_eq!(products, vec!["Avocado", "Dragon Fruit"]);
    assert!(orders.iter().all(|o| o.quantity == 1.0 && o.unit == Unit::Kg));
    assert!(orders.iter().all(|o| o.customer_name == "Priya"));
    assert!(orders.iter().all(|o| o.house_number == "A2-205"));
}

#[test]
fn test_scenario_unknown_product() {
    assert!(parse("[07-07-2025 16:14] +91 90000 00001: Tomatoes 2 kg").is_empty());
}

#[test]
fn test_scenario_multiline_message() {
    let text = "[07-07-2025 16:15] +91 90000 00002:\n\
                Cardamom 100 gm A1-102\n\
                [07-07-2025 16:16] +91 90000 00002: thank you";
    let orders = parse(text);

    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].product, "Cardamom");
    assert_eq!(orders[0].quantity, 100.0);
    assert_eq!(orders[0].unit, Unit::Gm);
    assert_eq!(orders[0].house_number, "A1-102");
}

#[test]
fn test_whole_chat_in_message_order() {
    let orders = parse(MORNING_CHAT);

    let summary: Vec<(&str, &str)> = orders
        .iter()
        .map(|o| (o.time.as_str(), o.product.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("16:10", "Ginger Tea"),
            ("16:10", "Masala Tea"),
            ("16:12", "Avocado"),
            ("16:12", "Dragon Fruit"),
            ("16:15", "Cardamom"),
            ("16:20", "Dragon Fruit"),
        ]
    );

    let dragon = &orders[5];
    assert_eq!(dragon.quantity, 2.0);
    assert_eq!(dragon.unit, Unit::Kg);
    assert_eq!(dragon.customer_name, "Ravi");
    assert_eq!(dragon.house_number, "B1-324");
}

#[test]
fn test_parsing_is_deterministic() {
    assert_eq!(parse(MORNING_CHAT), parse(MORNING_CHAT));
}

#[test]
fn test_report_explains_skipped_message() {
    let report = parse_with_report(MORNING_CHAT);

    assert_eq!(report.orders, parse(MORNING_CHAT));
    assert_eq!(report.unmatched.len(), 1);
    assert_eq!(report.unmatched[0].time, "16:14");
    assert_eq!(report.unmatched[0].reason, UnmatchedReason::NoProducts);
}

#[test]
fn test_every_order_has_positive_quantity() {
    let text = "[07-07-2025 16:10] +91 96198 82148: cardamom 0 gm and 3 avocado\n\
                [07-07-2025 16:11] +91 96198 82148: avocado 2 pcs";
    let orders = parse(text);

    assert!(orders.iter().all(|o| o.quantity > 0.0));
    assert!(orders.iter().all(|o| o.product != "Cardamom"));
}

#[test]
fn test_shared_quantity_after_ellipsis() {
    for separator in ["…", "..."] {
        let text = format!(
            "[07-07-2025 16:12] +91 90000 00000: Avocado and Dragon fruit{}one kg each A2 205",
            separator
        );
        let orders = parse(&text);

        let products: Vec<&str> = orders.iter().map(|o| o.product.as_str()).collect();
        assert_eq!(products, vec!["Avocado", "Dragon Fruit"], "separator {:?}", separator);
        assert!(orders.iter().all(|o| o.quantity == 1.0 && o.unit == Unit::Kg));
        assert!(orders.iter().all(|o| o.house_number == "A2-205"));
    }

    let spaced = parse("[07-07-2025 16:12] +91 90000 00000: Avocado and Dragon fruit... one kg each");
    assert_eq!(spaced.len(), 2);
}

#[test]
fn test_greeting_without_name_keeps_quantity() {
    let orders = parse("[07-07-2025 16:10] +91 96198 82148: Good morning 500 gm cardamom A1 102");

    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].product, "Cardamom");
    assert_eq!(orders[0].quantity, 500.0);
    assert_eq!(orders[0].unit, Unit::Gm);
    assert_eq!(orders[0].customer_name, "Unknown");
    assert_eq!(orders[0].house_number, "A1-102");
}

#[test]
fn test_for_before_quantity_keeps_quantity() {
    let orders = parse("[07-07-2025 16:10] +91 96198 82148: Book for 2 kg of avocado A1 102");

    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].product, "Avocado");
    assert_eq!(orders[0].quantity, 2.0);
    assert_eq!(orders[0].unit, Unit::Kg);
    assert_eq!(orders[0].house_number, "A1-102");
}

#[test]
fn test_emoji_between_product_and_quantity() {
    let text = "[07-07-2025 16:10] +91 96198 82148: Avocado \u{1F951} 2 A1 102\n\
                [07-07-2025 16:11] +91 96198 82148: Cardamom \u{2764}\u{FE0F} 100 gm A1 102";
    let orders = parse(text);

    let summary: Vec<(&str, f64, Unit)> = orders
        .iter()
        .map(|o| (o.product.as_str(), o.quantity, o.unit))
        .collect();
    assert_eq!(
        summary,
        vec![("Avocado", 2.0, Unit::Pieces), ("Cardamom", 100.0, Unit::Gm)]
    );
}
