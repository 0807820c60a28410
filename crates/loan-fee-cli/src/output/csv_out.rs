use serde_json::Value;
use std::io;

use super::{array_rows, format_scalar};

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(envelope) => {
            let fields = match envelope.get("result") {
                Some(Value::Object(result)) => result,
                _ => envelope,
            };
            let _ = wtr.write_record(["field", "value"]);
            for (key, val) in fields {
                let _ = wtr.write_record([key.as_str(), &format_scalar(val)]);
            }
        }
        Value::Array(arr) => {
            if let Some((headers, rows)) = array_rows(arr) {
                let _ = wtr.write_record(&headers);
                for row in rows {
                    let _ = wtr.write_record(&row);
                }
            }
        }
        _ => {
            let _ = wtr.write_record([&format_scalar(value)]);
        }
    }

    let _ = wtr.flush();
}
