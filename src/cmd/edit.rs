use super::Context;
use crate::reports;
use clap::Args;
use keyoverlay::config::EditorParams;
use keyoverlay::editor::{CellSpec, LayoutEditor};
use keyoverlay::error::{OverlayError, OverlayResult};
use keyoverlay::geometry::{HexColor, OverrideField, Point, Size};
use keyoverlay::keycodes::KeyId;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct EditArgs {
    /// Layout file, preset id/name, or saved layout name
    pub layout: String,

    /// Editor operation, applied in order. Repeatable:
    /// `move <cell> <x> <y>`, `resize <cell> <w> <h>`, `bind <cell> <key|none>`,
    /// `color <cell> <hex|none>`, `text-color <cell> <hex|none>`,
    /// `label <cell> <text>`, `rename <cell> <new>`, `delete <cell>`,
    /// `add <cell> [label]`, `add-default`
    #[arg(short = 'x', long = "op")]
    pub ops: Vec<String>,

    #[command(flatten)]
    pub editor: EditorParams,

    /// Write the result here
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Store the result in the config directory under this name
    #[arg(long)]
    pub save_as: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditOp {
    Move(String, Point),
    Resize(String, Size),
    Bind(String, Option<KeyId>),
    Override(String, OverrideField, Option<HexColor>),
    Label(String, String),
    Rename(String, String),
    Delete(String),
    Add(String, String),
    AddDefault,
}

fn num(s: Option<&str>, what: &str) -> OverlayResult<f32> {
    s.ok_or_else(|| OverlayError::Invalid(format!("missing {}", what)))?
        .parse()
        .map_err(|_| OverlayError::Invalid(format!("{} must be a number", what)))
}

fn arg<'a>(s: Option<&'a str>, what: &str) -> OverlayResult<&'a str> {
    s.ok_or_else(|| OverlayError::Invalid(format!("missing {}", what)))
}

fn optional<T, F>(s: &str, parse: F) -> OverlayResult<Option<T>>
where
    F: FnOnce(&str) -> OverlayResult<T>,
{
    if s.eq_ignore_ascii_case("none") {
        Ok(None)
    } else {
        parse(s).map(Some)
    }
}

pub fn parse_op(text: &str) -> OverlayResult<EditOp> {
    let mut parts = text.split_whitespace();
    let verb = arg(parts.next(), "operation")?;
    if verb == "add-default" {
        return Ok(EditOp::AddDefault);
    }
    let id = arg(parts.next(), "cell id")?.to_string();

    let op = match verb {
        "move" => EditOp::Move(id, Point::new(num(parts.next(), "x")?, num(parts.next(), "y")?)),
        "resize" => EditOp::Resize(id, Size::new(num(parts.next(), "w")?, num(parts.next(), "h")?)),
        "bind" => EditOp::Bind(id, optional(arg(parts.next(), "key")?, KeyId::new)?),
        "color" | "text-color" => {
            let field = if verb == "color" {
                OverrideField::Color
            } else {
                OverrideField::TextColor
            };
            EditOp::Override(id, field, optional(arg(parts.next(), "color")?, HexColor::new)?)
        }
        "label" => EditOp::Label(id, parts.collect::<Vec<_>>().join(" ")),
        "rename" => EditOp::Rename(id, arg(parts.next(), "new id")?.to_string()),
        "delete" => EditOp::Delete(id),
        "add" => {
            let label = parts.collect::<Vec<_>>().join(" ");
            EditOp::Add(id, label)
        }
        other => return Err(OverlayError::Invalid(format!("unknown operation '{}'", other))),
    };
    Ok(op)
}

pub fn apply(editor: &mut LayoutEditor, op: EditOp) -> OverlayResult<()> {
    match op {
        EditOp::Move(id, p) => {
            let stored = editor.move_cell(&id, p)?;
            println!("  moved {} -> ({}, {})", id, stored.x, stored.y);
        }
        EditOp::Resize(id, size) => editor.resize(&id, size)?,
        EditOp::Bind(id, key) => {
            editor.bind_key(&id, key)?;
        }
        EditOp::Override(id, field, value) => editor.set_override(&id, field, value)?,
        EditOp::Label(id, label) => editor.set_label(&id, label)?,
        EditOp::Rename(id, new_id) => editor.rename_cell(&id, &new_id)?,
        EditOp::Delete(id) => {
            editor.delete(&id)?;
        }
        EditOp::Add(id, label) => {
            editor.add_cell(CellSpec::builder().id(id).label(label).build())?;
        }
        EditOp::AddDefault => {
            let cell = editor.add_default_cell()?;
            println!("  added {}", cell.id);
        }
    }
    Ok(())
}

pub fn run(args: EditArgs, ctx: &Context) -> OverlayResult<()> {
    let ops = args
        .ops
        .iter()
        .map(|s| parse_op(s))
        .collect::<OverlayResult<Vec<_>>>()?;

    args.editor.validate()?;
    let layout = ctx.resolve_layout(&args.layout)?;
    let mut editor = LayoutEditor::new(layout, args.editor.clone());

    println!("✏️  Editing '{}' ({} operations)", editor.layout().name, ops.len());
    for op in ops {
        apply(&mut editor, op)?;
    }

    if !editor.is_dirty() {
        println!("No changes.");
    }
    let layout = editor.into_layout();
    reports::print_cell_table(&layout);

    if let Some(name) = &args.save_as {
        let path = ctx.dir.save_layout(name, &layout)?;
        println!("💾 Saved to {}", path.display());
    }
    if let Some(path) = &args.output {
        keyoverlay::store::save_layout(&layout, path)?;
        println!("💾 Wrote {}", path.display());
    }
    Ok(())
}
