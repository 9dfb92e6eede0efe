//! Dump a compiled `*.table.bin` back to `text\tcode\tweight` lines, the
//! inverse of the build step. Grounded in the teacher's `convert_table.rs`
//! for the clap-derive CLI shape; exit codes per spec.md §6.3.

use clap::Parser;
use ime_core::Table;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
struct Args {
    table: PathBuf,
    out: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();
    let table = match Table::load(&args.table) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("failed to load {}: {e}", args.table.display());
            std::process::exit(1);
        }
    };

    let mut lines = String::new();
    for entry in table.iter_entries() {
        lines.push_str(&format!("{}\t{}\t{}\n", entry.text, format_code(&entry.code, &table), entry.weight));
    }

    let result = match &args.out {
        Some(path) => std::fs::write(path, lines),
        None => {
            print!("{lines}");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("failed to write output: {e}");
        std::process::exit(1);
    }
    std::io::stdout().flush().ok();
}

fn format_code(code: &ime_core::Code, table: &Table) -> String {
    code.0
        .iter()
        .map(|id| table.syllable_text(*id).unwrap_or("?"))
        .collect::<Vec<_>>()
        .join(" ")
}
