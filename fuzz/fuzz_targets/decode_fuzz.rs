//! Decoder fuzz target: feed arbitrary bytes to the decoder, walker and linter.
//! None of them may panic, they must agree on well-formedness, and anything that
//! decodes must re-encode to a fixpoint.
//! Build with: cargo fuzz run decode_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let decoded = bencode::decode(data);
    let walked = bencode::validate(data);
    let _ = bencode::lint::lint(data);
    match decoded {
        Ok(v) => {
            assert!(walked.is_ok());
            let once = bencode::encode(&v);
            let again = bencode::encode(&bencode::decode(&once).expect("re-decode"));
            assert_eq!(once, again);
        }
        // Walk does not check duplicate keys.
        Err(bencode::CodecError::DuplicateKey(_)) => {}
        Err(_) => assert!(walked.is_err()),
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run decode_fuzz");
}
