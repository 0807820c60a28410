use serde_json::Value;

use super::format_scalar;

/// Print just the fee, or the raw value when there is no fee to show.
pub fn print_minimal(value: &Value) {
    let fee = value
        .get("result")
        .and_then(|result| result.get("fee"))
        .filter(|fee| !fee.is_null());

    match fee {
        Some(fee) => println!("{}", format_scalar(fee)),
        None => println!("{}", serde_json::to_string(value).unwrap_or_default()),
    }
}
