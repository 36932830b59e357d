//! Lint bencode files: sorted and unique dictionary keys, no trailing data, well-formed grammar.
//!
//! Usage:
//!   bencode_lint [OPTIONS] [FILE ...]
//!   bencode_lint < file.torrent
//!
//! Options:
//!   --fix, -f    Rewrite input in canonical form. With stdin: print fixed bytes to stdout.
//!                With files: rewrite each file in place, then lint the result.
//!   --human, -H  Human-readable output
//!
//! If no files are given, reads from stdin (lint only unless --fix).

use bencode::lint::{lint, lint_fix, LintMessage, LintRule, Severity};
use std::io::{self, Read, Write};
use std::path::Path;

fn rule_id(rule: LintRule) -> &'static str {
    match rule {
        LintRule::Malformed => "malformed",
        LintRule::TrailingData => "trailing-data",
        LintRule::DuplicateKey => "duplicate-key",
        LintRule::UnsortedKeys => "unsorted-keys",
    }
}

fn print_message(path: &str, m: &LintMessage, style: OutputStyle) {
    let severity_str = match m.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    };
    match style {
        OutputStyle::Compact => {
            println!(
                "{}:{}: {}: {} [{}]",
                path,
                m.offset,
                severity_str,
                m.message,
                rule_id(m.rule)
            );
        }
        OutputStyle::Human => {
            println!("  {} at byte {}: {}", path, m.offset, m.message);
            println!("    rule: {} ({})", rule_id(m.rule), severity_str);
        }
    }
}

#[derive(Clone, Copy)]
enum OutputStyle {
    Compact,
    Human,
}

#[derive(Default)]
struct Totals {
    errors: usize,
    warnings: usize,
}

impl Totals {
    /// Print and count messages; true if any is an error.
    fn report(&mut self, path: &str, messages: &[LintMessage], style: OutputStyle) -> bool {
        for m in messages {
            match m.severity {
                Severity::Error => self.errors += 1,
                Severity::Warning => self.warnings += 1,
            }
            print_message(path, m, style);
        }
        messages.iter().any(|m| m.severity == Severity::Error)
    }
}

fn main() -> anyhow::Result<()> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let fix = if let Some(pos) = args.iter().position(|a| a == "--fix" || a == "-f") {
        args.remove(pos);
        true
    } else {
        false
    };
    let style = if let Some(pos) = args.iter().position(|a| a == "--human" || a == "-H") {
        args.remove(pos);
        OutputStyle::Human
    } else {
        OutputStyle::Compact
    };

    let mut has_error = false;
    let mut totals = Totals::default();

    if args.is_empty() {
        let mut data = Vec::new();
        io::stdin().read_to_end(&mut data)?;
        if fix {
            let fixed = lint_fix(&data)?;
            io::stdout().write_all(&fixed)?;
            return Ok(());
        }
        has_error |= totals.report("<stdin>", &lint(&data), style);
    } else {
        for path in &args {
            let path = Path::new(path);
            let display_path = path.display().to_string();
            let data = match std::fs::read(path) {
                Ok(d) => d,
                Err(e) => {
                    eprintln!("{}: {}", display_path, e);
                    has_error = true;
                    continue;
                }
            };
            let data = if fix {
                match lint_fix(&data) {
                    Ok(fixed) if fixed != data => {
                        if let Err(e) = std::fs::write(path, &fixed) {
                            eprintln!("{}: write failed: {}", display_path, e);
                            has_error = true;
                            continue;
                        }
                        eprintln!("{}: fixed", display_path);
                        fixed
                    }
                    Ok(_) => data,
                    // Not fixable; the lint pass below reports why.
                    Err(_) => data,
                }
            } else {
                data
            };
            has_error |= totals.report(&display_path, &lint(&data), style);
        }
    }

    if totals.errors > 0 || totals.warnings > 0 {
        eprintln!(
            "lint: {} error(s), {} warning(s)",
            totals.errors, totals.warnings
        );
    }
    if has_error {
        std::process::exit(1);
    }
    Ok(())
}
