//! vitae – command-line profile → resume converter.
//!
//! Usage:
//!   vitae <profile.json> [output.pdf] [--variant a|b] [--source] [--title "..."]
//!
//! Without an output path the PDF is written next to the input file under
//! the name derived from the profile (e.g. `jordan_rivera_resume.pdf`).
//! `--source` prints the generated typesetting source to stdout instead.

use std::{env, fs, path::PathBuf, process};

use vitae_forge::export::ExportConfig;
use vitae_forge::pipeline::{export_profile_to_file, generate_source, profile_from_json};
use vitae_forge::profile::normalize;
use vitae_forge::Variant;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut input_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut variant = Variant::RowBased;
    let mut source_only = false;
    let mut title: Option<String> = None;
    let mut positional = 0usize;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--source" | "-s" => source_only = true,
            "--variant" | "-v" => match iter.next().and_then(|v| Variant::from_selector(v)) {
                Some(v) => variant = v,
                None => {
                    eprintln!("Error: --variant expects 'a' or 'b'.");
                    process::exit(1);
                }
            },
            "--title" | "-t" => title = iter.next().cloned(),
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            path => {
                if positional == 0 {
                    input_path = Some(PathBuf::from(path));
                } else if positional == 1 {
                    output_path = Some(PathBuf::from(path));
                } else {
                    eprintln!("Unexpected argument: {path}");
                    print_usage(&args[0]);
                    process::exit(1);
                }
                positional += 1;
            }
        }
    }

    let input = match input_path {
        Some(p) => p,
        None => {
            eprintln!("Error: no profile file specified.");
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    let json = match fs::read_to_string(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading '{}': {e}", input.display());
            process::exit(1);
        }
    };

    let partial = match profile_from_json(&json) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error parsing profile: {e}");
            process::exit(1);
        }
    };

    if source_only {
        let profile = normalize(&partial);
        print!("{}", generate_source(&profile, variant));
        return;
    }

    let config = ExportConfig {
        title: title.unwrap_or_else(|| "Resume".to_string()),
        ..ExportConfig::default()
    };

    let dir = output_path
        .as_ref()
        .and_then(|p| p.parent().map(PathBuf::from))
        .or_else(|| input.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));

    match export_profile_to_file(&partial, variant, &config, &dir) {
        Ok(written) => {
            // An explicit output path overrides the derived name.
            let final_path = match output_path {
                Some(explicit) => match fs::rename(&written, &explicit) {
                    Ok(()) => explicit,
                    Err(e) => {
                        eprintln!("Error moving artifact to '{}': {e}", explicit.display());
                        process::exit(1);
                    }
                },
                None => written,
            };
            eprintln!("Wrote '{}'", final_path.display());
        }
        Err(e) => {
            eprintln!("Error exporting resume: {e}");
            process::exit(1);
        }
    }
}

fn print_usage(prog: &str) {
    eprintln!("vitae – profile to resume converter (vitae-forge)");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <profile.json> [output.pdf] [--variant a|b] [--source] [--title \"...\"]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <profile.json>  Profile data (missing sections fall back to sample content)");
    eprintln!("  [output.pdf]    Output path  (default: derived from the person's name)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --variant, -v   Document grammar: 'a' row-based (default), 'b' two-column");
    eprintln!("  --source, -s    Print the typesetting source to stdout instead of exporting");
    eprintln!("  --title, -t     Document title in PDF metadata (default: \"Resume\")");
    eprintln!("  --help          Print this message");
}
