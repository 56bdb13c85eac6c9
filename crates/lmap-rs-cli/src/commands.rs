// crates/lmap-rs-cli/src/commands.rs

use crate::Command;
use lmap_rs::{
    FieldValue, LmapError, LogicalNameMap, Module, Node, SaveOptions, Session,
    save_lmap_to_string_with,
};
use log::{debug, info};
use std::error::Error;
use std::io::Write;
use std::path::Path;

/// Executes one subcommand, writing its report to `out`.
pub fn run(command: Command, out: &mut dyn Write) -> Result<(), Box<dyn Error>> {
    match command {
        Command::New { file, force } => {
            if file.exists() && !force {
                return Err(
                    format!("{} already exists, use --force to replace it", file.display()).into(),
                );
            }
            Session::new().save_as(&file)?;
            info!("Created {}", file.display());
        }
        Command::Check { file } => {
            let session = Session::open(&file)?;
            let map = session.map();
            writeln!(
                out,
                "{}: ok, {} modules, {} entries",
                file.display(),
                count_modules(map.root()),
                map.entries().count()
            )?;
        }
        Command::Fmt {
            file,
            in_place,
            indent,
            tabs,
            declaration,
        } => {
            let options = SaveOptions {
                indent_char: if tabs { '\t' } else { ' ' },
                indent_size: indent,
                xml_declaration: declaration,
            };
            let mut session = Session::open(&file)?;
            if in_place {
                session.set_options(options);
                session.save()?;
            } else {
                out.write_all(save_lmap_to_string_with(session.map(), &options)?.as_bytes())?;
            }
        }
        Command::Tree { file } => {
            let session = Session::open(&file)?;
            writeln!(out, "/")?;
            write_tree(out, session.map().root(), 1)?;
        }
        Command::List { file } => {
            let session = Session::open(&file)?;
            for (path, entry) in session.map().entries() {
                let fields: Vec<String> = entry
                    .target
                    .fields()
                    .into_iter()
                    .filter(|(_, value)| *value != FieldValue::Unset)
                    .map(|(field, value)| format!("{}={}", field, value))
                    .collect();
                writeln!(out, "{}\t{}\t{}", path, entry.target_type(), fields.join(" "))?;
            }
        }
        Command::Devices { file } => {
            let session = Session::open(&file)?;
            for device in session.map().target_devices() {
                writeln!(out, "{}", device)?;
            }
        }
        Command::AddModule { file, parent, name } => {
            let path = modify(&file, |map| map.create_module(&parent, &name))?;
            writeln!(out, "{}", path)?;
        }
        Command::AddEntry {
            file,
            parent,
            name,
            target_type,
        } => {
            let path = modify(&file, |map| map.create_entry(&parent, &name, target_type))?;
            writeln!(out, "{}", path)?;
        }
        Command::Rename { file, path, name } => {
            let new_path = modify(&file, |map| map.set_name(&path, &name))?;
            writeln!(out, "{}", new_path)?;
        }
        Command::Retype {
            file,
            path,
            target_type,
        } => {
            modify(&file, |map| map.set_target_type(&path, target_type))?;
        }
        Command::Set {
            file,
            path,
            field,
            value,
        } => {
            let value = FieldValue::parse_for(field, &value)?;
            modify(&file, |map| map.set_field(&path, field, value))?;
        }
        Command::Rm {
            file,
            path,
            recursive,
        } => {
            let mut session = Session::open(&file)?;
            if let Some(Node::Module(module)) = session.map().get(&path) {
                if !module.is_empty() && !recursive {
                    return Err(format!(
                        "{} is a module with {} children, use --recursive to remove it",
                        path,
                        module.len()
                    )
                    .into());
                }
            }
            session.edit(|map| map.delete_node(&path))?;
            session.save()?;
        }
        Command::Mv {
            file,
            path,
            new_parent,
            position,
        } => {
            let position = position.unwrap_or(usize::MAX);
            let new_path = modify(&file, |map| map.move_node(&path, &new_parent, position))?;
            writeln!(out, "{}", new_path)?;
        }
    }
    Ok(())
}

/// Loads `file`, applies `f` and saves the result. Nothing is written if `f` fails.
fn modify<T>(
    file: &Path,
    f: impl FnOnce(&mut LogicalNameMap) -> Result<T, LmapError>,
) -> Result<T, LmapError> {
    let mut session = Session::open(file)?;
    let value = session.edit(f)?;
    session.save()?;
    debug!("Saved changes to {}", session.title());
    Ok(value)
}

fn count_modules(module: &Module) -> usize {
    module
        .children
        .iter()
        .filter_map(Node::as_module)
        .map(|m| 1 + count_modules(m))
        .sum()
}

fn write_tree(out: &mut dyn Write, module: &Module, depth: usize) -> std::io::Result<()> {
    for child in &module.children {
        let indent = "  ".repeat(depth);
        match child {
            Node::Module(m) => {
                writeln!(out, "{}{}/", indent, m.name)?;
                write_tree(out, m, depth + 1)?;
            }
            Node::Entry(e) => writeln!(out, "{}{} ({})", indent, e.name, e.target_type())?,
        }
    }
    Ok(())
}
