//! Fuzz target: `program::compile`
//!
//! Feeds arbitrary text to the compiler in both load modes and checks
//! that it never panics, that accepted programs keep their source, and
//! that an upload-accepted program also compiles at boot.
//!
//! cargo fuzz run fuzz_program_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use smartplug::program::{compile, LoadMode, MAX_PROGRAM_LEN};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    let upload = compile(text, LoadMode::Upload);
    let boot = compile(text, LoadMode::Boot);

    if let Ok(program) = &upload {
        assert!(text.len() <= MAX_PROGRAM_LEN);
        assert_eq!(program.source(), text);
        assert!(boot.is_ok(), "accepted at upload but not at boot");
    }
});
