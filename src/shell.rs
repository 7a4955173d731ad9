// =====================================================================
// File: shell.rs
//
// Description:
//   A thin interactive shell over the public `Tree` API. Parses a
//   small set of single-letter commands and prints their result to
//   stdout; owns no tree logic of its own. This module communicates
//   exclusively through standard input and output, the way the store
//   this crate is descended from drove its REPL, but the command
//   grammar itself is not part of the tested contract.
//
//   Commands:
//     i <key> <value>   -> insert
//     s <key>            -> search
//     d <key>            -> delete
//     r <k1> <k2>        -> range lookup (returns a value, not a list)
//     dump               -> structural dump for inspection
//     exit / quit        -> terminate
// =====================================================================
use std::io::{self, BufRead, Write};

use clap::Parser;

use crate::index::{dump, Tree};

/// Startup configuration for the demo shell.
#[derive(Parser, Debug)]
#[command(name = "bptree-shell", about = "Interactive B+ tree index shell")]
pub struct Cli {
    /// Maximum children per internal node.
    #[arg(long, default_value_t = 4)]
    pub order: usize,

    /// Maximum entries per leaf.
    #[arg(long = "entries-cap", default_value_t = 4)]
    pub entries_cap: usize,
}

/// Result of handling a single command.
///
/// - `Continue` means the REPL should keep running.
/// - `Exit` means the REPL should break out and terminate.
pub enum CommandResult {
    Continue,
    Exit,
}

/// Splits a line into a lowercase command and its remaining arguments.
pub fn parse_command(line: &str) -> (String, Vec<String>) {
    let mut parts = line.split_whitespace();
    let cmd = parts.next().unwrap_or("").to_lowercase();
    let args = parts.map(str::to_string).collect();
    (cmd, args)
}

/// Dispatches one parsed command against `tree`, writing output to `out`.
pub fn handle_command<W: Write>(tree: &mut Tree, cmd: &str, args: &[String], out: &mut W) -> CommandResult {
    match cmd {
        "i" | "insert" => match (args.first(), args.get(1)) {
            (Some(k), Some(v)) => match (k.parse::<i64>(), v.parse::<i64>()) {
                (Ok(key), Ok(value)) => match tree.insert(key, value) {
                    Ok(()) => { let _ = writeln!(out, "OK"); }
                    Err(e) => { let _ = writeln!(out, "ERR {e}"); }
                },
                _ => { let _ = writeln!(out, "ERR expected integer key and value"); }
            },
            _ => { let _ = writeln!(out, "ERR usage: i <key> <value>"); }
        },
        "s" | "search" => match args.first().and_then(|a| a.parse::<i64>().ok()) {
            Some(key) => match tree.search(key) {
                Some(v) => { let _ = writeln!(out, "{v}"); }
                None => { let _ = writeln!(out, "NOT_FOUND"); }
            },
            None => { let _ = writeln!(out, "ERR usage: s <key>"); }
        },
        "d" | "delete" => match args.first().and_then(|a| a.parse::<i64>().ok()) {
            Some(key) => match tree.delete(key) {
                Ok(()) => { let _ = writeln!(out, "OK"); }
                Err(e) => { let _ = writeln!(out, "ERR {e}"); }
            },
            None => { let _ = writeln!(out, "ERR usage: d <key>"); }
        },
        "r" | "range" => match (args.first(), args.get(1)) {
            (Some(a), Some(b)) => match (a.parse::<i64>(), b.parse::<i64>()) {
                (Ok(k1), Ok(k2)) => match tree.get_range(k1, k2) {
                    Some(v) => { let _ = writeln!(out, "{v}"); }
                    None => { let _ = writeln!(out, "NOT_FOUND"); }
                },
                _ => { let _ = writeln!(out, "ERR expected two integer bounds"); }
            },
            _ => { let _ = writeln!(out, "ERR usage: r <k1> <k2>"); }
        },
        "dump" => {
            let mut rendered = String::new();
            if dump(tree, &mut rendered).is_ok() {
                let _ = write!(out, "{rendered}");
            }
        }
        "exit" | "quit" => return CommandResult::Exit,
        "" => {}
        other => {
            let _ = writeln!(out, "ERR unknown command: {other}");
        }
    }
    CommandResult::Continue
}

/// Drives the shell to completion, reading commands from stdin.
pub fn repl_loop(tree: &mut Tree) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let (cmd, args) = parse_command(&line);
        if let CommandResult::Exit = handle_command(tree, &cmd, &args, &mut stdout) {
            break;
        }
    }
}
