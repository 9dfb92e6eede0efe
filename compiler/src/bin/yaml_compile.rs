//! Compile one schema's dict sources to `Table`/`Prism`/`ReverseDb`.
//! Grounded in the teacher's clap-derive CLI style; exit codes per
//! spec.md §6.3.

use clap::Parser;
use ime_compiler::build::{build, BuildPaths};
use std::path::PathBuf;

#[derive(Parser)]
struct Args {
    /// Directory containing the dict source files.
    #[arg(short = 's', long)]
    src: Option<PathBuf>,

    /// Directory to write compiled artifacts into.
    #[arg(short = 'd', long)]
    dest: Option<PathBuf>,

    /// Schema file or `*.dict.yaml` to compile.
    file: PathBuf,
}

fn main() {
    let args = Args::parse();
    let src_dir = args.src.unwrap_or_else(|| {
        args.file
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    });
    let dest_dir = args.dest.unwrap_or_else(|| src_dir.clone());

    let stem = match args.file.file_stem().and_then(|s| s.to_str()) {
        Some(s) => s.split('.').next().unwrap_or(s).to_string(),
        None => {
            eprintln!("cannot determine schema stem from {}", args.file.display());
            std::process::exit(1);
        }
    };

    let dict_files = match collect_dict_files(&src_dir, &stem) {
        Ok(files) if !files.is_empty() => files,
        Ok(_) => {
            eprintln!("no dict sources found for '{stem}' in {}", src_dir.display());
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("failed to scan {}: {e}", src_dir.display());
            std::process::exit(1);
        }
    };

    if let Err(e) = std::fs::create_dir_all(&dest_dir) {
        eprintln!("failed to create {}: {e}", dest_dir.display());
        std::process::exit(1);
    }

    let paths = BuildPaths {
        dict_files,
        schema_file: Some(args.file.clone()),
        out_dir: dest_dir,
        stem,
    };

    if let Err(e) = build(&paths) {
        eprintln!("compile failed: {e}");
        std::process::exit(1);
    }
    println!("compiled {}", args.file.display());
}

fn collect_dict_files(dir: &std::path::Path, stem: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.ends_with(".dict.yaml") && name.starts_with(stem) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
