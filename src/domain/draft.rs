//! Summary value and fixed-template email draft.
//!
//! The draft always speaks of a "total employee value", whether the number is a
//! column sum or a row count.

use crate::domain::Table;
use regex::Regex;
use std::sync::OnceLock;

fn department_word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(department|dept)\b").expect("department pattern"))
}

/// First column whose name contains the whole word "department" or "dept".
pub fn find_department_column(table: &Table) -> Option<usize> {
    table
        .column_names()
        .position(|name| department_word_re().is_match(name))
}

/// Sum of the first numeric column over the (optionally department-filtered)
/// rows, or the filtered row count when no column is numeric. Empty tables give 0.
pub fn aggregate_value(table: Option<&Table>, department: Option<&str>) -> f64 {
    let Some(table) = table.filter(|t| !t.is_empty()) else {
        return 0.0;
    };

    let rows: Vec<usize> = match (department, find_department_column(table)) {
        (Some(dept), Some(col)) => {
            let wanted = dept.trim().to_lowercase();
            table.columns()[col]
                .values
                .iter()
                .enumerate()
                .filter(|(_, v)| v.to_string().trim().to_lowercase() == wanted)
                .map(|(i, _)| i)
                .collect()
        }
        _ => (0..table.row_count()).collect(),
    };

    match table.columns().iter().find(|c| c.is_numeric()) {
        Some(col) => rows.iter().filter_map(|&i| col.values[i].as_f64()).sum(),
        None => rows.len() as f64,
    }
}

/// Renders the fixed business-letter body.
pub fn compose_draft(department: Option<&str>, value: f64) -> String {
    let v = format_value(value);
    let line1 = match department {
        Some(dept) => format!(
            "Please be informed that the total employee value in the {} department is {}.",
            dept, v
        ),
        None => format!("Please be informed that the total employee value is {}.", v),
    };
    [
        "Hi,",
        "",
        line1.as_str(),
        "Should you require any further details, please refer to the attached document.",
        "",
        "Thanks & Regards,",
        "HR",
    ]
    .join("\n")
}

/// Draft for the given table, or `None` when there is no non-empty table.
pub fn draft_for(table: Option<&Table>, department: Option<&str>) -> Option<String> {
    let table = table.filter(|t| !t.is_empty())?;
    let value = aggregate_value(Some(table), department);
    value
        .is_finite()
        .then(|| compose_draft(department, value))
}

/// Integer with thousands separators when whole, else two decimals.
fn format_value(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value.fract() == 0.0 {
        let digits = format!("{:.0}", value.abs());
        let sign = if value < 0.0 { "-" } else { "" };
        format!("{}{}", sign, group_thousands(&digits))
    } else {
        let fixed = format!("{:.2}", value.abs());
        let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
        let sign = if value < 0.0 { "-" } else { "" };
        format!("{}{}.{}", sign, group_thousands(int_part), frac_part)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
