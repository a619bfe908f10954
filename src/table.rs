//! Plain-text rendering of KPI and view tables.
//!
//! Column widths count Hangul and other East Asian wide characters as two
//! terminal cells so Korean category names stay aligned.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::{
    aggregate::Kpis,
    views::{View, ViewData},
};

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let column_count = headers.len();
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();

    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(display_width(cell));
        }
    }

    for width in &mut widths {
        *width = (*width).max(1);
    }

    let mut output = String::new();

    let header_line = format_row(headers, &widths);
    let _ = writeln!(output, "{header_line}");

    let separator_widths = widths.iter().map(|w| (*w).max(3)).collect::<Vec<usize>>();
    let separator_cells = separator_widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>();
    let separator_line = format_row(&separator_cells, &separator_widths);
    let _ = writeln!(output, "{separator_line}");

    for row in rows {
        let row_line = format_row(row, &widths);
        let _ = writeln!(output, "{row_line}");
    }

    output
}

pub fn render_kpis(kpis: &Kpis, total_records: usize) -> String {
    let headers = vec!["metric".to_string(), "value".to_string()];
    let rows = vec![
        vec![
            "accidents".to_string(),
            format!("{} of {}", kpis.accidents, total_records),
        ],
        vec!["injured".to_string(), kpis.injured.to_string()],
        vec!["dead".to_string(), kpis.dead.to_string()],
        vec!["missing".to_string(), kpis.missing.to_string()],
    ];
    render_table(&headers, &rows)
}

/// Renders one view under its title; `top` caps ranked rows and points (0 = all).
pub fn render_view(view: &View, top: usize) -> String {
    let limit = if top == 0 { usize::MAX } else { top };
    let mut output = format!("## {}\n", view.title);
    match &view.data {
        ViewData::Counts { rows } => {
            let headers = vec![view.key_field.to_string(), view.value_field.to_string()];
            // Trend views keep every bucket.
            let take = if view.id.is_trend() { usize::MAX } else { limit };
            let rendered = rows
                .iter()
                .take(take)
                .map(|row| vec![row.key.to_string(), row.count.to_string()])
                .collect::<Vec<_>>();
            output.push_str(&render_table(&headers, &rendered));
        }
        ViewData::CrossCounts { rows } => {
            let headers = vec![
                view.key_field.to_string(),
                view.series_field.unwrap_or("series").to_string(),
                view.value_field.to_string(),
            ];
            let rendered = rows
                .iter()
                .map(|row| {
                    vec![
                        row.key.to_string(),
                        row.series.to_string(),
                        row.count.to_string(),
                    ]
                })
                .collect::<Vec<_>>();
            output.push_str(&render_table(&headers, &rendered));
        }
        ViewData::Points { points } => {
            let headers = vec!["latitude".to_string(), "longitude".to_string()];
            let rendered = points
                .iter()
                .take(limit)
                .map(|p| vec![format!("{:.5}", p.latitude), format!("{:.5}", p.longitude)])
                .collect::<Vec<_>>();
            output.push_str(&render_table(&headers, &rendered));
            if rendered.len() < points.len() {
                let _ = writeln!(output, "({} of {} points shown)", rendered.len(), points.len());
            }
        }
        ViewData::NoData { message } => {
            let _ = writeln!(output, "{message}");
        }
    }
    output
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let mut cells = Vec::with_capacity(values.len());
    for (idx, value) in values.iter().enumerate() {
        if idx >= widths.len() {
            break;
        }
        let sanitized = sanitize_cell(value);
        let display = display_width(sanitized.as_ref());
        let mut cell = sanitized.into_owned();
        let padding = widths
            .get(idx)
            .copied()
            .unwrap_or_default()
            .saturating_sub(display);
        if padding > 0 {
            cell.push_str(&" ".repeat(padding));
        }
        cells.push(cell);
    }
    let mut line = cells.join("  ");
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

fn is_wide(ch: char) -> bool {
    matches!(
        ch as u32,
        0x1100..=0x115F
            | 0x2E80..=0x303E
            | 0x3041..=0x33FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xA960..=0xA97F
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6
    )
}

fn display_width(value: &str) -> usize {
    let mut width = 0usize;
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            // Skip ANSI escape sequence (e.g. \x1b[31m)
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else if is_wide(ch) {
            width += 2;
        } else {
            width += 1;
        }
    }
    width
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
