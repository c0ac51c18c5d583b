//! Command-line front-end.

use crate::app::TodoApp;
use crate::config::TodoConfig;
use crate::types::TodoId;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "todo")]
#[command(author, version, about = "A todo list that remembers itself")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Snapshot file (overrides TODO_STORAGE_PATH)
    #[arg(long, global = true)]
    pub storage: Option<PathBuf>,

    /// Key the list is stored under (overrides TODO_STORAGE_KEY)
    #[arg(long, global = true)]
    pub key: Option<String>,

    /// Keep the list in memory only
    #[arg(long, global = true)]
    pub no_persist: bool,

    /// What to do
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show the list
    List,

    /// Add a todo
    Add {
        /// Todo text; words are joined with single spaces
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Flip a todo between open and completed
    Toggle {
        /// Todo id
        id: i64,
    },

    /// Delete a todo
    #[command(alias = "rm")]
    Delete {
        /// Todo id
        id: i64,
    },

    /// Apply a raw action, e.g. '{"type":"toggleTodo","payload":{"id":1}}'
    Dispatch {
        /// Action in its JSON wire form
        json: String,
    },

    /// Replace the list with the starter list
    Reset,

    /// Read commands interactively from stdin
    Shell,
}

impl Cli {
    /// Applies the global flags on top of `config`
    pub fn apply(&self, config: &mut TodoConfig) {
        if let Some(path) = &self.storage {
            config.storage.path.clone_from(path);
        }
        if let Some(key) = &self.key {
            config.storage.key.clone_from(key);
        }
        if self.no_persist {
            config.storage.persist = false;
        }
    }
}

/// Runs one CLI invocation to completion
///
/// # Errors
///
/// Returns an error on invalid input, an undecodable action, or a failed
/// write to stdout or the snapshot store.
pub async fn run(cli: Cli, mut config: TodoConfig) -> Result<()> {
    cli.apply(&mut config);
    tracing::debug!(?config, "Starting");

    let app = TodoApp::from_config(&config);
    let outcome = app.restore().await?;
    tracing::debug!(?outcome, "Restore finished");

    let mut out = std::io::stdout();
    let interactive = cli.command == Commands::Shell;

    match cli.command {
        Commands::List => {},
        Commands::Add { text } => {
            let todo = app.add(&text.join(" ")).await?;
            writeln!(out, "Added {}", todo.id)?;
        },
        Commands::Toggle { id } => app.toggle(TodoId::new(id)).await?,
        Commands::Delete { id } => app.delete(TodoId::new(id)).await?,
        Commands::Dispatch { json } => {
            let action = app.dispatch_json(&json).await?;
            writeln!(out, "Applied {}", action.kind())?;
        },
        Commands::Reset => app.reset().await?,
        Commands::Shell => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            run_shell(&app, stdin, &mut out).await?;
        },
    }

    if !interactive {
        write_lines(&mut out, &app.render().await)?;
    }

    app.finish().await?;
    Ok(())
}

/// A line typed into the shell
#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellCommand {
    Add(String),
    Toggle(TodoId),
    Delete(TodoId),
    List,
    Help,
    Quit,
}

impl ShellCommand {
    /// Parses one line; `Ok(None)` for a blank line
    ///
    /// The whitespace between the command word and its argument is dropped;
    /// the argument itself is kept as typed, trailing whitespace included.
    fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim_start();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim_start()));

        let command = match word {
            "" => return Ok(None),
            "add" => Self::Add(rest.to_string()),
            "toggle" => Self::Toggle(parse_id(rest)?),
            "delete" | "rm" => Self::Delete(parse_id(rest)?),
            "list" | "ls" => Self::List,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(format!("Unknown command: {other} (try `help`)")),
        };

        Ok(Some(command))
    }
}

fn parse_id(raw: &str) -> Result<TodoId, String> {
    raw.trim()
        .parse::<i64>()
        .map(TodoId::new)
        .map_err(|_| format!("Invalid id: {:?}", raw.trim()))
}

const SHELL_HELP: &str = "\
Commands:
  add <text>    add a todo
  toggle <id>   flip a todo between open and completed
  delete <id>   delete a todo (alias: rm)
  list          show the list
  quit          leave the shell";

/// Interactive loop: one command per line until `quit` or end of input
///
/// Validation messages are printed and the loop carries on. Anything else
/// ends the session with an error.
///
/// # Errors
///
/// Returns an error if reading or writing fails, or if the store stops
/// accepting actions.
pub async fn run_shell<R, W>(app: &TodoApp, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write_lines(out, &app.render().await)?;
    let mut lines = input.lines();

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match ShellCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writeln!(out, "{message}")?;
                continue;
            },
        };

        let result = match command {
            ShellCommand::Add(text) => app.add(&text).await.map(|_| ()),
            ShellCommand::Toggle(id) => app.toggle(id).await,
            ShellCommand::Delete(id) => app.delete(id).await,
            ShellCommand::List => Ok(()),
            ShellCommand::Help => {
                writeln!(out, "{SHELL_HELP}")?;
                continue;
            },
            ShellCommand::Quit => break,
        };

        match result {
            Ok(()) => write_lines(out, &app.render().await)?,
            Err(error) if error.is_recoverable() => writeln!(out, "{error}")?,
            Err(error) => return Err(error.into()),
        }
    }

    writeln!(out)?;
    Ok(())
}

fn write_lines<W: Write>(out: &mut W, lines: &[String]) -> std::io::Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}
