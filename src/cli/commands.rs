use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::codec::{parse_json_file, write_json_file};
use crate::config::Settings;
use crate::container::Container;
use crate::path::split_path_with;
use crate::tree_traits::TreeNodeConvert;

pub fn execute_command(cli: &Cli, settings: &Settings) -> CliResult<()> {
    let text = match &cli.command {
        Some(Commands::Get { file, path }) => get(file, path, settings)?,
        Some(Commands::Exists { file, path }) => exists(file, path, settings)?,
        Some(Commands::Set {
            file,
            path,
            value,
            strict,
            in_place,
        }) => set(file, path, value, *strict, *in_place, settings)?,
        Some(Commands::Delete {
            file,
            path,
            in_place,
        }) => delete(file, path, *in_place, settings)?,
        Some(Commands::Append {
            file,
            path,
            value,
            in_place,
        }) => append(file, path, value, *in_place, settings)?,
        Some(Commands::Remove {
            file,
            path,
            index,
            in_place,
        }) => remove(file, path, *index, *in_place, settings)?,
        Some(Commands::Count { file, path }) => count(file, path, settings)?,
        Some(Commands::Tree { file, path }) => tree(file, path, settings)?,
        Some(Commands::Fmt { file, in_place }) => fmt(file, *in_place, settings)?,
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            return Ok(());
        }
        None => return Ok(()),
    };
    if !text.is_empty() {
        output::info(&text);
    }
    Ok(())
}

/// Interpret a command line value as JSON, falling back to a plain string.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn segments<'a>(path: &'a str, settings: &Settings) -> Vec<&'a str> {
    split_path_with(path, settings.separator)
}

/// Print the document, or write it back to `file` when `in_place` is set.
fn finish(doc: &Container, file: &Path, in_place: bool, settings: &Settings) -> CliResult<String> {
    let root = doc.root();
    if in_place || settings.in_place {
        write_json_file(file, &root, &settings.prefix, &settings.indent)?;
        output::action("Updated", &file.display());
        return Ok(String::new());
    }
    Ok(root.string_indent(&settings.prefix, &settings.indent))
}

#[instrument(skip(settings))]
pub fn get(file: &Path, path: &str, settings: &Settings) -> CliResult<String> {
    let doc = parse_json_file(file)?;
    let found = doc
        .search(&segments(path, settings))
        .ok_or_else(|| CliError::NotFound(path.to_string()))?;
    Ok(found.string_indent(&settings.prefix, &settings.indent))
}

#[instrument(skip(settings))]
pub fn exists(file: &Path, path: &str, settings: &Settings) -> CliResult<String> {
    let doc = parse_json_file(file)?;
    Ok(doc.exists(&segments(path, settings)).to_string())
}

#[instrument(skip(settings))]
pub fn set(
    file: &Path,
    path: &str,
    value: &str,
    strict: bool,
    in_place: bool,
    settings: &Settings,
) -> CliResult<String> {
    let doc = parse_json_file(file)?;
    let segs = segments(path, settings);
    let value = parse_value(value);
    if strict || settings.strict {
        doc.set_existing(value, &segs)?;
    } else {
        doc.set(value, &segs)?;
    }
    finish(&doc, file, in_place, settings)
}

#[instrument(skip(settings))]
pub fn delete(file: &Path, path: &str, in_place: bool, settings: &Settings) -> CliResult<String> {
    let doc = parse_json_file(file)?;
    doc.delete(&segments(path, settings))?;
    finish(&doc, file, in_place, settings)
}

#[instrument(skip(settings))]
pub fn append(
    file: &Path,
    path: &str,
    value: &str,
    in_place: bool,
    settings: &Settings,
) -> CliResult<String> {
    let doc = parse_json_file(file)?;
    doc.array_append(parse_value(value), &segments(path, settings))?;
    finish(&doc, file, in_place, settings)
}

#[instrument(skip(settings))]
pub fn remove(
    file: &Path,
    path: &str,
    index: usize,
    in_place: bool,
    settings: &Settings,
) -> CliResult<String> {
    let doc = parse_json_file(file)?;
    doc.array_remove(index, &segments(path, settings))?;
    finish(&doc, file, in_place, settings)
}

#[instrument(skip(settings))]
pub fn count(file: &Path, path: &str, settings: &Settings) -> CliResult<String> {
    let doc = parse_json_file(file)?;
    let len = doc.array_count(&segments(path, settings))?;
    Ok(len.to_string())
}

#[instrument(skip(settings))]
pub fn tree(file: &Path, path: &str, settings: &Settings) -> CliResult<String> {
    let doc = parse_json_file(file)?;
    let found = doc
        .search(&segments(path, settings))
        .ok_or_else(|| CliError::NotFound(path.to_string()))?;
    Ok(found.to_tree_string().to_string().trim_end().to_string())
}

#[instrument(skip(settings))]
pub fn fmt(file: &Path, in_place: bool, settings: &Settings) -> CliResult<String> {
    let doc = parse_json_file(file)?;
    debug!("formatting with indent {:?}", settings.indent);
    finish(&doc, file, in_place, settings)
}
