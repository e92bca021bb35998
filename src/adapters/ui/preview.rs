//! Text rendering for the shell: decision preview and result tables.

use crate::domain::{DeliveryDecision, Table};

/// Recipients listed before the "... and N more" line.
pub const PREVIEW_RECIPIENTS: usize = 200;
/// Draft characters shown before truncation.
pub const PREVIEW_DRAFT_CHARS: usize = 800;
/// Widest cell printed in a table; longer values are cut.
const MAX_CELL_WIDTH: usize = 32;

fn draft_preview(draft: &str) -> String {
    if draft.chars().count() > PREVIEW_DRAFT_CHARS {
        let head: String = draft.chars().take(PREVIEW_DRAFT_CHARS).collect();
        format!("{}...", head)
    } else {
        draft.to_string()
    }
}

/// Preview text for a decision, shown before the user confirms sending.
pub fn render_preview(decision: &DeliveryDecision) -> String {
    let mut out = String::new();
    if decision.action.is_sendable() {
        let recipients = &decision.recipients;
        out.push_str(&format!("AI Decision: {}\n\n", decision.action));
        out.push_str(&format!("Recipients ({}):\n", recipients.len()));
        if recipients.is_empty() {
            out.push_str("(no recipients)\n");
        }
        for r in recipients.iter().take(PREVIEW_RECIPIENTS) {
            out.push_str(r);
            out.push('\n');
        }
        if recipients.len() > PREVIEW_RECIPIENTS {
            out.push_str(&format!(
                "... and {} more\n",
                recipients.len() - PREVIEW_RECIPIENTS
            ));
        }
        if let Some(draft) = &decision.draft {
            out.push_str(&format!("\nDraft (preview):\n{}\n", draft_preview(draft)));
        }
        out.push_str(&format!("\nNote: {}", decision.decision));
    } else {
        out.push_str(&format!("AI Decision (info):\n\n{}\n", decision.decision));
        if let Some(draft) = &decision.draft {
            out.push_str(&format!("\nDraft (preview):\n{}\n", draft_preview(draft)));
        }
    }
    out
}

fn clip(text: &str) -> String {
    if text.chars().count() > MAX_CELL_WIDTH {
        let head: String = text.chars().take(MAX_CELL_WIDTH - 1).collect();
        format!("{}~", head)
    } else {
        text.to_string()
    }
}

/// Fixed-width text table with at most `max_rows` rows.
pub fn render_table(table: &Table, max_rows: usize) -> String {
    if table.column_count() == 0 {
        return "(no results)".to_string();
    }
    let shown = table.row_count().min(max_rows);
    let headers: Vec<String> = table.column_names().map(clip).collect();
    let rows: Vec<Vec<String>> = (0..shown)
        .map(|i| table.row(i).iter().map(|v| clip(&v.to_string())).collect())
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(c, h)| {
            rows.iter()
                .map(|r| r[c].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = line(&headers);
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for r in &rows {
        out.push('\n');
        out.push_str(&line(r));
    }
    if table.row_count() > shown {
        out.push_str(&format!("\n({} of {} rows shown)", shown, table.row_count()));
    }
    out
}
