//! Interactive console for driving a `Service` by hand: schema switches,
//! candidate selection, option toggles, and simulated key sequences.
//! Grounded in the teacher's CLI binaries for the "plain stdin REPL, one
//! line per command" shape; command surface per spec.md §6.3.

use clap::Parser;
use ime_core::pipeline::KeyEvent;
use ime_core::prism::Prism;
use ime_core::table::Table;
use ime_core::{Service, SessionId};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

#[derive(Parser)]
struct Args {
    /// Compiled `*.table.bin` file to load.
    #[arg(long)]
    table: std::path::PathBuf,

    /// Compiled `*.prism.bin` file to load.
    #[arg(long)]
    prism: std::path::PathBuf,
}

fn main() {
    let args = Args::parse();
    let table = match Table::load(&args.table) {
        Ok(t) => Arc::new(t),
        Err(e) => {
            eprintln!("failed to load table: {e}");
            std::process::exit(1);
        }
    };
    let prism = match Prism::load(&args.prism) {
        Ok(p) => Arc::new(p),
        Err(e) => {
            eprintln!("failed to load prism: {e}");
            std::process::exit(1);
        }
    };

    let mut service = Service::new(prism, table, None, vec!['\'']);
    let session = service.create_session();

    let stdin = io::stdin();
    print!("> ");
    io::stdout().flush().ok();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let line = line.trim();
        if line == "exit" {
            break;
        }
        handle_line(&mut service, session, line);
        print!("> ");
        io::stdout().flush().ok();
    }
}

fn handle_line(service: &mut Service, session: SessionId, line: &str) {
    if line == "print schema list" {
        println!("(schema switching is driven through Switcher, not yet wired into this console)");
    } else if let Some(id) = line.strip_prefix("select schema ") {
        println!("would select schema '{}'", id.trim());
    } else if line == "print candidate list" {
        print_candidates(service, session);
    } else if let Some(n) = line.strip_prefix("select candidate ") {
        select_candidate(service, session, n.trim());
    } else if let Some(name) = line.strip_prefix("set option ") {
        let name = name.trim();
        let (enabled, name) = match name.strip_prefix('!') {
            Some(rest) => (false, rest),
            None => (true, name),
        };
        println!("would set option '{name}' = {enabled}");
    } else {
        for ch in line.chars() {
            let event = match ch {
                '\n' => continue,
                c => KeyEvent::Char(c),
            };
            service.process_key(session, event);
        }
        print_candidates(service, session);
    }
}

fn print_candidates(service: &mut Service, session: SessionId) {
    let Some(s) = service.get_session(session) else {
        return;
    };
    for (i, candidate) in s.menu.candidates().iter().enumerate() {
        println!("{}. {} ({:.2})", i + 1, candidate.text, candidate.score);
    }
}

fn select_candidate(service: &mut Service, session: SessionId, n: &str) {
    let Ok(n) = n.parse::<u8>() else {
        println!("not a number: '{n}'");
        return;
    };
    if n == 0 {
        println!("candidate indices are 1-based");
        return;
    }
    service.process_key(session, KeyEvent::Number(n));
    print_candidates(service, session);
}
