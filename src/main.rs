// ============================================================
// File: main.rs
//
// Description:
//   Entry point for the B+ tree index shell. Parses `--order` and
//   `--entries-cap` from the command line, builds an empty in-memory
//   tree, and hands off to the REPL loop.
// =====================================================================
use bptree_index::index::Tree;
use bptree_index::shell::{repl_loop, Cli};
use clap::Parser;

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let mut tree = Tree::new(cli.order, cli.entries_cap);

    repl_loop(&mut tree);
}
