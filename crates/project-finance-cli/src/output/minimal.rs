use serde_json::Value;

/// Print just the key answer from the output.
///
/// For the model and bankability commands that is the verdict; otherwise the
/// first headline indicator present, then the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result").or_else(|| m.get("results")))
        .unwrap_or(value);

    if let Some(tier) = result_obj
        .pointer("/bankability/tier")
        .or_else(|| result_obj.get("tier"))
    {
        println!("{}", format_minimal(tier));
        return;
    }

    let priority_keys = [
        "project_npv",
        "project_irr",
        "equity_irr",
        "minimum_dscr",
        "wacc",
        "payment",
    ];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    // Schedules and sweeps: one line per row
    if let Value::Array(rows) = result_obj {
        for row in rows {
            let key = row
                .get("year")
                .or_else(|| row.get("value"))
                .map(format_minimal)
                .unwrap_or_default();
            let headline = row
                .get("operating_cash_flow")
                .or_else(|| row.get("closing_balance"))
                .or_else(|| row.get("tier"))
                .map(format_minimal)
                .unwrap_or_default();
            println!("{key}\t{headline}");
        }
        return;
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "undefined".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
