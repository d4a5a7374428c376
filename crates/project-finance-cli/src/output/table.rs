use colored::Colorize;
use rust_decimal::Decimal;
use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::is_row_array;

/// Format output as tables using the tabled crate.
///
/// Scalars in the result go into a Field/Value table; arrays of rows (the
/// year schedule, the debt table, DSCR by year) each get their own table.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else if let Some(Value::Array(rows)) = map.get("results") {
                print_array_table(rows);
                print_warnings(map);
            } else {
                print_flat_object(value);
            }
        }
        Value::Array(arr) => {
            print_array_table(arr);
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_result_table(result: &Value, envelope: &serde_json::Map<String, Value>) {
    if let Value::Object(res_map) = result {
        print_flat_object(result);

        for (key, val) in res_map {
            if let Value::Object(nested) = val {
                if let Some(Value::Array(rows)) = nested.get("periods") {
                    println!("\n{}:", key);
                    print_array_table(rows);
                }
            } else if is_row_array(val) {
                println!("\n{}:", key);
                if let Value::Array(rows) = val {
                    print_array_table(rows);
                }
            }
        }

        print_verdict(res_map.get("bankability").unwrap_or(result));
    } else {
        print_flat_object(&Value::Object(envelope.clone()));
    }

    print_warnings(envelope);

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Traffic-light line for the bankability tier plus the failed thresholds.
fn print_verdict(verdict: &Value) {
    let tier = match verdict.get("tier").and_then(Value::as_str) {
        Some(t) => t,
        None => return,
    };
    let label = match tier {
        "Bankable" => "● Bankable".green().bold(),
        "Borderline" => "● Borderline".yellow().bold(),
        _ => "● Not bankable".red().bold(),
    };
    println!("\nVerdict: {}", label);

    if let Some(Value::Array(issues)) = verdict.get("issues") {
        for issue in issues {
            println!("  ! {}", format_value(issue));
        }
    }
}

fn print_warnings(envelope: &serde_json::Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            if is_row_array(val) || val.get("periods").is_some() {
                continue;
            }
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        let table = Table::from(builder);
        println!("{}", table);
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        let table = Table::from(builder);
        println!("{}", table);
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

/// Decimal strings are rounded for display: rates and ratios to four places,
/// money to two.
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => match s.parse::<Decimal>() {
            Ok(d) if d.abs() < Decimal::TEN => d.round_dp(4).to_string(),
            Ok(d) => d.round_dp(2).to_string(),
            Err(_) => s.clone(),
        },
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "undefined".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(map) => match map.get("tier") {
            Some(tier) => format_value(tier),
            None => serde_json::to_string(value).unwrap_or_default(),
        },
    }
}
