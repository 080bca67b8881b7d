//! Tip calculator handler.

use super::{number_param, string_param, AgentResponse};

/// Compute a tip from the detected parameters.
///
/// Expects `tip-percentage` (a string like `"15%"` or a bare number),
/// `amount-without-tip`, `currency`, and `people-number`. Missing pieces
/// are asked for rather than guessed.
pub fn handle(parameters: &serde_json::Map<String, serde_json::Value>) -> AgentResponse {
    let Some(percentage) = tip_percentage(parameters) else {
        return AgentResponse::say("What percentage tip?");
    };
    let Some(amount) = number_param(parameters, "amount-without-tip") else {
        return AgentResponse::say("What was the total amount?");
    };

    let currency = string_param(parameters, "currency").unwrap_or("USD");
    let symbol = currency_symbol(currency);
    let people = number_param(parameters, "people-number").unwrap_or(0.0);

    let tip = amount * percentage / 100.0;
    if people >= 2.0 {
        AgentResponse::say(format!(
            "The total tip is {}{:.2}, coming out to {}{:.2} per person",
            symbol,
            tip,
            symbol,
            tip / people
        ))
    } else {
        AgentResponse::say(format!("The total tip is {}{:.2}", symbol, tip))
    }
}

/// The percentage arrives as `"15%"` from the NLU entity, but plain
/// numbers show up too.
fn tip_percentage(parameters: &serde_json::Map<String, serde_json::Value>) -> Option<f64> {
    if let Some(text) = string_param(parameters, "tip-percentage") {
        return text.trim_end_matches('%').trim().parse().ok();
    }
    number_param(parameters, "tip-percentage")
}

fn currency_symbol(currency: &str) -> String {
    match currency.to_uppercase().as_str() {
        "USD" => "$".to_string(),
        "EUR" => "\u{20ac}".to_string(),
        "GBP" => "\u{a3}".to_string(),
        "JPY" => "\u{a5}".to_string(),
        other => format!("{} ", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        value.as_object().expect("object").clone()
    }

    #[test]
    fn tip_split_between_people() {
        let response = handle(&params(json!({
            "tip-percentage": "15%",
            "amount-without-tip": 67.87,
            "currency": "USD",
            "people-number": 3.0
        })));
        assert_eq!(
            response.fulfillment,
            "The total tip is $10.18, coming out to $3.39 per person"
        );
    }

    #[test]
    fn tip_without_people() {
        let response = handle(&params(json!({
            "tip-percentage": "20%",
            "amount-without-tip": 159.43,
            "currency": "USD",
            "people-number": 0.0
        })));
        assert_eq!(response.fulfillment, "The total tip is $31.89");
    }

    #[test]
    fn missing_percentage_asks_for_it() {
        let response = handle(&params(json!({ "amount-without-tip": 65.00 })));
        assert_eq!(response.fulfillment, "What percentage tip?");
    }

    #[test]
    fn missing_everything_asks_for_percentage_first() {
        let response = handle(&params(json!({})));
        assert_eq!(response.fulfillment, "What percentage tip?");
    }

    #[test]
    fn missing_amount_asks_for_it() {
        let response = handle(&params(json!({ "tip-percentage": "18%" })));
        assert_eq!(response.fulfillment, "What was the total amount?");
    }

    #[test]
    fn bare_number_percentage_is_accepted() {
        let response = handle(&params(json!({
            "tip-percentage": 10,
            "amount-without-tip": 50.0
        })));
        assert_eq!(response.fulfillment, "The total tip is $5.00");
    }
}
