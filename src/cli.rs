//! Command-line adapter: argument parsing, command dispatch, the interactive
//! menu, table rendering and log setup for the `json-dict` binary.

use crate::entry::Entry;
use crate::error::Error;
use crate::persist::WriteMode;
use crate::store::{Dictionary, Policy};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;

/// Persistent word → definition dictionary backed by a JSON file.
#[derive(Debug, Parser)]
#[command(name = "json-dict", version, about)]
pub struct Cli {
    /// Backing JSON file; created as `{}` if missing.
    #[arg(
        long,
        short,
        env = "JSON_DICT_FILE",
        default_value = "dictionary.json",
        global = true
    )]
    pub file: PathBuf,

    /// Let `add` overwrite existing words and `remove` ignore missing ones.
    #[arg(long, global = true)]
    pub lenient: bool,

    /// Indent the JSON file.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Truncate and rewrite the file in place instead of temp file + rename.
    /// Reads racing a write may then fail.
    #[arg(long, global = true)]
    pub overwrite_writes: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Append logs to this file instead of stderr.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// One subcommand per dictionary operation, plus the long-running modes.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Define a new word.
    Add {
        /// Word to define.
        word: String,
        /// Its definition.
        definition: String,
    },
    /// Print the definition of a word.
    Get {
        /// Word to look up.
        word: String,
    },
    /// Delete a word.
    Remove {
        /// Word to delete.
        word: String,
    },
    /// Replace the definition of an existing word.
    Update {
        /// Word to redefine.
        word: String,
        /// New definition.
        definition: String,
    },
    /// Print every word as a table.
    List,
    /// Menu-driven session on stdin/stdout.
    Interactive,
    /// Serve the HTTP API (needs the `http` feature).
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port to bind.
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

impl Cli {
    /// Open the dictionary described by the global options.
    pub fn open_dictionary(&self) -> crate::Result<Dictionary> {
        let policy = if self.lenient {
            Policy::Lenient
        } else {
            Policy::Strict
        };
        let write_mode = if self.overwrite_writes {
            WriteMode::Overwrite
        } else {
            WriteMode::Atomic
        };
        Dictionary::builder(&self.file)
            .policy(policy)
            .pretty(self.pretty)
            .write_mode(write_mode)
            .build()
    }

    /// Log level used when `RUST_LOG` isn't set: chatty for the server,
    /// quiet for one-shot commands.
    #[must_use]
    pub fn default_log_level(&self) -> &'static str {
        match self.command {
            Command::Serve { .. } => "info",
            _ => "warn",
        }
    }
}

/// Install the global `tracing` subscriber.
///
/// Logs go to stderr unless `log_file` is given; if that file can't be set
/// up, a warning is printed and stderr is used instead. Keep the returned
/// guard alive for as long as logs should be flushed.
pub fn init_logging(json: bool, log_file: Option<&Path>, default_level: &str) -> WorkerGuard {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let appender = log_file.and_then(|path| match file_appender(path) {
        Ok(a) => Some(a),
        Err(e) => {
            eprintln!("failed to log to {}, using stderr: {e}", path.display());
            None
        }
    });
    let to_file = appender.is_some();
    let (writer, guard) = match appender {
        Some(a) => tracing_appender::non_blocking(a),
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(!to_file);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    guard
}

fn file_appender(path: &Path) -> anyhow::Result<tracing_appender::rolling::RollingFileAppender> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("log file path has no file name")?;
    std::fs::create_dir_all(&dir)?;
    let appender = tracing_appender::rolling::RollingFileAppender::builder()
        .rotation(tracing_appender::rolling::Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)?;
    Ok(appender)
}

/// Run a one-shot command against `dict`, writing its output to `out`.
///
/// [`Command::Interactive`] reads menu choices from stdin.
/// [`Command::Serve`] is refused; the binary owns the async runtime for it.
pub fn execute(dict: &Dictionary, command: &Command, out: &mut impl Write) -> anyhow::Result<()> {
    match command {
        Command::Add { word, definition } => {
            dict.add(word, definition)
                .with_context(|| format!("adding word '{word}'"))?;
            writeln!(out, "Word '{word}' added.")?;
        }
        Command::Get { word } => {
            let entry = dict
                .get(word)
                .with_context(|| format!("looking up word '{word}'"))?;
            writeln!(out, "{entry}")?;
        }
        Command::Remove { word } => {
            dict.remove(word)
                .with_context(|| format!("removing word '{word}'"))?;
            writeln!(out, "Word '{word}' removed.")?;
        }
        Command::Update { word, definition } => {
            dict.update(word, definition)
                .with_context(|| format!("updating word '{word}'"))?;
            writeln!(out, "Word '{word}' updated.")?;
        }
        Command::List => {
            let (words, entries) = dict.list().context("listing the dictionary")?;
            write!(out, "{}", render_list(&words, &entries))?;
        }
        Command::Interactive => {
            let stdin = std::io::stdin();
            run_interactive(dict, stdin.lock(), out)?;
        }
        Command::Serve { .. } => {
            anyhow::bail!("serve is run by the json-dict binary when built with the `http` feature")
        }
    }
    Ok(())
}

/// The `list` output: a table, or a note when there's nothing to show.
#[must_use]
pub fn render_list(words: &[String], entries: &HashMap<String, Entry>) -> String {
    if words.is_empty() {
        return "The dictionary is empty.\n".to_owned();
    }
    let rows: Vec<[&str; 2]> = words
        .iter()
        .filter_map(|w| entries.get(w).map(|e| [w.as_str(), e.definition()]))
        .collect();
    render_table(["Word", "Definition"], &rows)
}

fn render_table(header: [&str; 2], rows: &[[&str; 2]]) -> String {
    let mut widths = header.map(|h| h.chars().count());
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let rule = format!("+-{}-+-{}-+\n", "-".repeat(widths[0]), "-".repeat(widths[1]));
    let line = |cells: &[&str; 2]| {
        let pad = |i: usize| " ".repeat(widths[i] - cells[i].chars().count());
        format!("| {}{} | {}{} |\n", cells[0], pad(0), cells[1], pad(1))
    };

    let mut table = String::new();
    table.push_str(&rule);
    table.push_str(&line(&header));
    table.push_str(&rule);
    for row in rows {
        table.push_str(&line(row));
    }
    table.push_str(&rule);
    table
}

const MENU: &str = "\
Which action do you want to perform?
1. Add a word
2. Define a word
3. Remove a word
4. List all words
5. Update a word
6. Exit
Enter the number corresponding to your choice: ";

/// Menu loop: read a choice, prompt for its arguments, report the outcome.
/// Ends on choice 6 or end of input. Operation failures are reported and the
/// loop carries on; only I/O errors on `input`/`out` end it early.
pub fn run_interactive<R, W>(dict: &Dictionary, mut input: R, out: &mut W) -> std::io::Result<()>
where
    R: BufRead,
    W: Write + ?Sized,
{
    loop {
        write!(out, "{MENU}")?;
        out.flush()?;
        let Some(choice) = read_line(&mut input)? else {
            writeln!(out)?;
            return Ok(());
        };

        match choice.trim() {
            "1" => {
                let Some(word) = prompt(&mut input, out, "Enter a word to add: ")? else {
                    return Ok(());
                };
                let Some(definition) =
                    prompt(&mut input, out, &format!("Enter a definition for '{word}': "))?
                else {
                    return Ok(());
                };
                match dict.add(&word, &definition) {
                    Ok(()) => writeln!(out, "Word '{word}' added successfully!")?,
                    Err(e) => writeln!(out, "Error while adding the word '{word}': {e}")?,
                }
            }
            "2" => {
                let Some(word) = prompt(&mut input, out, "Enter the word to define: ")? else {
                    return Ok(());
                };
                match dict.get(&word) {
                    Ok(entry) => writeln!(out, "Definition: {entry}")?,
                    Err(Error::NotFound(_)) => {
                        writeln!(out, "Word '{word}' not found in the dictionary.")?
                    }
                    Err(e) => writeln!(out, "Error while looking up '{word}': {e}")?,
                }
            }
            "3" => {
                let Some(word) = prompt(&mut input, out, "Enter a word to remove: ")? else {
                    return Ok(());
                };
                match dict.remove(&word) {
                    Ok(()) => writeln!(out, "Word '{word}' removed successfully!")?,
                    Err(e) => writeln!(out, "Error while removing the word '{word}': {e}")?,
                }
            }
            "4" => match dict.list() {
                Ok((words, entries)) => write!(out, "{}", render_list(&words, &entries))?,
                Err(e) => writeln!(out, "Error while listing the dictionary: {e}")?,
            },
            "5" => {
                let Some(word) = prompt(&mut input, out, "Enter the word to update: ")? else {
                    return Ok(());
                };
                // Ask before prompting for a definition nobody will store.
                if let Err(e) = dict.get(&word) {
                    match e {
                        Error::NotFound(_) => {
                            writeln!(out, "Word '{word}' not found in the dictionary.")?
                        }
                        e => writeln!(out, "Error while looking up '{word}': {e}")?,
                    }
                    continue;
                }
                let Some(definition) = prompt(
                    &mut input,
                    out,
                    &format!("Enter the new definition for '{word}': "),
                )?
                else {
                    return Ok(());
                };
                match dict.update(&word, &definition) {
                    Ok(()) => writeln!(out, "Word '{word}' updated successfully!")?,
                    Err(e) => writeln!(out, "Error while updating word '{word}': {e}")?,
                }
            }
            "6" => {
                writeln!(out, "Exiting the program...")?;
                return Ok(());
            }
            other => {
                if other.parse::<u32>().is_ok() {
                    writeln!(out, "Invalid command. Please try again.")?;
                } else {
                    writeln!(out, "Invalid input. Please enter a number.")?;
                }
            }
        }
    }
}

fn prompt<R, W>(input: &mut R, out: &mut W, text: &str) -> std::io::Result<Option<String>>
where
    R: BufRead,
    W: Write + ?Sized,
{
    write!(out, "{text}")?;
    out.flush()?;
    read_line(input)
}

/// One line without its terminator, or `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> std::io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    Ok(Some(line))
}
