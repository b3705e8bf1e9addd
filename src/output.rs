//! Rendering of cubes for the terminal

use serde_json::{Map, Value};
use unicode_width::UnicodeWidthStr;

use logcube_engine::Cube;

const FREQUENCY_HEADER: &str = "frequency";

/// Render a cube as an aligned text table, one row per record
pub fn render_table(cube: &Cube) -> String {
    let mut header: Vec<&str> = cube.schema().fields().iter().map(|f| f.title()).collect();
    header.push(FREQUENCY_HEADER);

    let rows: Vec<Vec<String>> = cube
        .records()
        .map(|record| {
            let mut row: Vec<String> = cube
                .schema()
                .fields()
                .iter()
                .map(|f| record.get(f.title()).unwrap_or_default().to_string())
                .collect();
            row.push(record.frequency().to_string());
            row
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.width()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize]) {
    let last = cells.len().saturating_sub(1);
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        let cell = cell.as_ref();
        out.push_str(cell);
        if i < last {
            out.push_str(&" ".repeat(width.saturating_sub(cell.width()) + 2));
        }
    }
    out.push('\n');
}

/// Render a cube as a JSON array of objects with a `frequency` member
pub fn render_json(cube: &Cube) -> serde_json::Result<String> {
    let rows: Vec<Value> = cube
        .records()
        .map(|record| {
            let mut object = Map::new();
            for field in cube.schema().fields() {
                if let Some(value) = record.get(field.title()) {
                    object.insert(field.title().to_string(), Value::String(value.to_string()));
                }
            }
            object.insert(FREQUENCY_HEADER.to_string(), Value::from(record.frequency()));
            Value::Object(object)
        })
        .collect();
    serde_json::to_string_pretty(&rows)
}
