use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use keyoverlay::geometry::Layout;
use keyoverlay::input::{CellStateChanged, EngineStats};
use keyoverlay::layouts::KnownPreset;
use keyoverlay::render::CellView;

fn fmt_opt<T: ToString>(v: Option<&T>) -> String {
    v.map(ToString::to_string).unwrap_or_else(|| "-".to_string())
}

pub fn print_preset_list(presets: &[(KnownPreset, Option<Layout>)]) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Id").add_attribute(Attribute::Bold),
        Cell::new("Name"),
        Cell::new("Locale"),
        Cell::new("Cells"),
    ]);

    for (preset, layout) in presets {
        let cells = match layout {
            Some(l) => Cell::new(l.len()),
            None => Cell::new("error").fg(Color::Red),
        };
        table.add_row(vec![
            Cell::new(preset.to_string()).fg(Color::Cyan),
            Cell::new(preset.display_name()),
            Cell::new(preset.locale().to_string()),
            cells.set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{}", table);
}

/// One line per cell, z-order.
pub fn print_cell_table(layout: &Layout) {
    println!("\nLayout: {} ({}, grid unit {})", layout.name, layout.locale, layout.grid_unit());
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Cell").add_attribute(Attribute::Bold),
        Cell::new("Label"),
        Cell::new("Key"),
        Cell::new("X"),
        Cell::new("Y"),
        Cell::new("W"),
        Cell::new("H"),
        Cell::new("Color"),
        Cell::new("Text"),
    ]);
    for i in 3..=6 {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    for cell in layout.cells() {
        let key = match &cell.bound_key {
            Some(k) => Cell::new(k),
            None => Cell::new("-").fg(Color::DarkGrey),
        };
        table.add_row(vec![
            Cell::new(&cell.id),
            Cell::new(&cell.label),
            key,
            Cell::new(format!("{:.2}", cell.position.x)),
            Cell::new(format!("{:.2}", cell.position.y)),
            Cell::new(format!("{:.2}", cell.size.w)),
            Cell::new(format!("{:.2}", cell.size.h)),
            Cell::new(fmt_opt(cell.color.as_ref())),
            Cell::new(fmt_opt(cell.text_color.as_ref())),
        ]);
    }
    println!("{}", table);
}

/// Rough picture of a frame: one table row per grid row, cells in x order.
/// Pressed cells are bold green.
pub fn print_frame_grid(layout: &Layout, frame: &[CellView]) {
    let mut rows: Vec<(i64, Vec<(f32, &CellView)>)> = Vec::new();
    for (cell, view) in layout.cells().iter().zip(frame) {
        let row = cell.position.y.floor() as i64;
        match rows.iter_mut().find(|(r, _)| *r == row) {
            Some((_, items)) => items.push((cell.position.x, view)),
            None => rows.push((row, vec![(cell.position.x, view)])),
        }
    }
    rows.sort_by_key(|(r, _)| *r);

    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    for (_, mut items) in rows {
        items.sort_by(|a, b| a.0.total_cmp(&b.0));
        let cells: Vec<Cell> = items
            .into_iter()
            .map(|(_, view)| {
                let c = Cell::new(&view.label).set_alignment(CellAlignment::Center);
                if view.pressed {
                    c.fg(Color::Green).add_attribute(Attribute::Bold)
                } else {
                    c
                }
            })
            .collect();
        table.add_row(cells);
    }
    println!("{}", table);
}

pub fn print_transitions(changes: &[CellStateChanged]) {
    for change in changes {
        let arrow = if change.pressed { "▼" } else { "▲" };
        println!("  {} {}", arrow, change.cell_id);
    }
}

pub fn print_engine_stats(stats: &EngineStats, frames: usize, discarded: u64) {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.set_header(vec![
        Cell::new("Events").add_attribute(Attribute::Bold),
        Cell::new("Transitions"),
        Cell::new("Repeats Dropped").fg(Color::Yellow),
        Cell::new("Unbound"),
        Cell::new("Frames").fg(Color::Cyan),
        Cell::new("Discarded"),
    ]);
    table.add_row(vec![
        Cell::new(stats.events),
        Cell::new(stats.emitted),
        Cell::new(stats.repeats_suppressed),
        Cell::new(stats.unbound),
        Cell::new(frames),
        Cell::new(discarded),
    ]);
    println!("{}", table);
}

pub fn print_saved_layouts(entries: &[(String, Result<usize, String>)]) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name").add_attribute(Attribute::Bold),
        Cell::new("Cells"),
        Cell::new("Status"),
    ]);
    for (name, result) in entries {
        let (count, status) = match result {
            Ok(n) => (Cell::new(n), Cell::new("ok").fg(Color::Green)),
            Err(e) => (Cell::new("-"), Cell::new(e).fg(Color::Red)),
        };
        table.add_row(vec![Cell::new(name), count, status]);
    }
    println!("{}", table);
}
