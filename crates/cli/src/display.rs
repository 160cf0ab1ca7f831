use std::fmt::Write as _;

use mini_dash_core::models::quote::{TableUpdate, COLUMNS};
use mini_dash_core::models::settings::Settings;

/// Render one table update as fixed-width text.
pub fn render_table(update: &TableUpdate) -> String {
    let mut widths = COLUMNS.map(|c| c.chars().count());
    for row in &update.rows {
        for (w, cell) in widths.iter_mut().zip(row.cells()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Coin Market Cap | {}",
        update.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let Some(reason) = &update.failure {
        let _ = writeln!(out, "! {reason}");
    }
    push_line(&mut out, &COLUMNS, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &rule.iter().map(String::as_str).collect::<Vec<_>>(), &widths);
    for row in &update.rows {
        push_line(&mut out, &row.cells(), &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[&str], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{cell:<w$}", w = *w))
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

/// Render the settings record, hiding most of the API key.
pub fn render_settings(settings: &Settings) -> String {
    let key = if settings.has_api_key() {
        mask(&settings.api_key)
    } else {
        "(not set)".to_string()
    };
    let interval = settings
        .hot_reload
        .map(|s| format!("{s}s"))
        .unwrap_or_else(|| "(not set)".to_string());
    format!(
        "API_KEY        {key}\nID_PORTAFOLIO  {}\nHOT_RELOAD     {interval} (effective {}s)\nColor Tema     {}\n",
        settings.portfolio_id,
        settings.refresh_interval().as_secs(),
        settings.theme,
    )
}

fn mask(key: &str) -> String {
    let visible: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("****{visible}")
}
