//! Linter for encoded bencode: reports input that decodes but is not in canonical form.
//!
//! ## Rules
//!
//! - **Malformed**: The input violates the grammar (truncation, leading zeros, bad key type, ...).
//!   Linting stops at the first such error.
//! - **Trailing data**: Bytes follow the top-level value.
//! - **Duplicate key**: A dictionary repeats a key.
//! - **Unsorted keys**: Dictionary keys are not in strictly ascending byte order.
//!
//! Run the linter via the `bencode_lint` binary: `cargo run --bin bencode_lint -- file.torrent`
//! or pipe: `bencode_lint < file.torrent`. Exit code 1 if any error-level findings.

use crate::codec::{Codec, CodecError, CodecOptions, DuplicateKeyPolicy};
use crate::walk::BencodeWalker;
use std::collections::HashSet;

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Identifies which rule produced the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintRule {
    Malformed,
    TrailingData,
    DuplicateKey,
    UnsortedKeys,
}

/// A single lint message with the byte offset it refers to.
#[derive(Debug, Clone)]
pub struct LintMessage {
    pub offset: usize,
    pub rule: LintRule,
    pub severity: Severity,
    pub message: String,
}

/// Run all lint rules on encoded input. Returns messages in offset order.
pub fn lint(data: &[u8]) -> Vec<LintMessage> {
    let mut linter = Linter {
        w: BencodeWalker::new(data),
        out: Vec::new(),
    };
    match linter.value(0) {
        Ok(()) => {
            if !linter.w.is_at_end() {
                let offset = linter.w.position();
                linter.out.push(LintMessage {
                    offset,
                    rule: LintRule::TrailingData,
                    severity: Severity::Error,
                    message: format!("{} byte(s) after the top-level value", data.len() - offset),
                });
            }
        }
        Err(e) => {
            let offset = linter.w.position();
            linter.out.push(LintMessage {
                offset,
                rule: LintRule::Malformed,
                severity: Severity::Error,
                message: e.to_string(),
            });
        }
    }
    linter.out
}

/// Rewrite input in canonical form: keys sorted, duplicates resolved to the last occurrence.
/// Malformed input and trailing data cannot be fixed and are returned as errors.
pub fn lint_fix(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let codec = Codec::new(CodecOptions::default().with_duplicate_keys(DuplicateKeyPolicy::LastWins));
    let value = codec.decode_slice(data)?;
    Ok(codec.encode_to_vec(&value))
}

struct Linter<'a> {
    w: BencodeWalker<'a>,
    out: Vec<LintMessage>,
}

impl<'a> Linter<'a> {
    fn value(&mut self, depth: usize) -> Result<(), CodecError> {
        match self.w.peek() {
            Some(b'l') => {
                self.w.enter(depth + 1)?;
                while !self.w.at_container_end()? {
                    self.value(depth + 1)?;
                }
                Ok(())
            }
            Some(b'd') => self.dictionary(depth + 1),
            Some(b'0'..=b'9') => self.w.read_string().map(|_| ()),
            Some(b'i') => self.w.read_integer().map(|_| ()),
            other => Err(CodecError::InvalidFormat(other)),
        }
    }

    fn dictionary(&mut self, depth: usize) -> Result<(), CodecError> {
        self.w.enter(depth)?;
        let mut seen: HashSet<&'a [u8]> = HashSet::new();
        let mut prev: Option<&'a [u8]> = None;
        while !self.w.at_container_end()? {
            let offset = self.w.position();
            let key = self.w.read_key()?;
            if !seen.insert(key) {
                self.out.push(LintMessage {
                    offset,
                    rule: LintRule::DuplicateKey,
                    severity: Severity::Error,
                    message: format!("duplicate key \"{}\"", String::from_utf8_lossy(key)),
                });
            } else if let Some(p) = prev {
                if p > key {
                    self.out.push(LintMessage {
                        offset,
                        rule: LintRule::UnsortedKeys,
                        severity: Severity::Warning,
                        message: format!(
                            "key \"{}\" sorts before previous key \"{}\"",
                            String::from_utf8_lossy(key),
                            String::from_utf8_lossy(p)
                        ),
                    });
                }
            }
            prev = Some(key);
            self.value(depth)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lint_unsorted_keys() {
        let msgs = lint(b"d3:numi123e5:hello5:worlde");
        let unsorted: Vec<_> = msgs.iter().filter(|m| m.rule == LintRule::UnsortedKeys).collect();
        assert_eq!(unsorted.len(), 1, "{:?}", msgs);
        assert_eq!(unsorted[0].offset, 11);
        assert_eq!(unsorted[0].severity, Severity::Warning);
    }

    #[test]
    fn lint_duplicate_key() {
        let msgs = lint(b"d1:ai1e1:ai2ee");
        assert!(msgs.iter().any(|m| m.rule == LintRule::DuplicateKey && m.severity == Severity::Error));
    }

    #[test]
    fn lint_trailing_and_malformed() {
        let msgs = lint(b"i1ei2e");
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].rule, LintRule::TrailingData);
        assert_eq!(msgs[0].offset, 3);

        let msgs = lint(b"li01ee");
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].rule, LintRule::Malformed);
    }

    #[test]
    fn lint_canonical_input_passes() {
        let msgs = lint(b"d5:hello5:world3:numi123e4:subsd1:al0:eee");
        assert!(msgs.is_empty(), "canonical input should have no findings: {:?}", msgs);
    }

    #[test]
    fn lint_fix_sorts_and_dedups() {
        let fixed = lint_fix(b"d3:numi123e5:hello5:world3:numi7ee").unwrap();
        assert_eq!(fixed, b"d5:hello5:world3:numi7ee");
        assert!(lint(&fixed).is_empty());
        assert!(lint_fix(b"i1ei2e").is_err());
    }
}
