//! Fuzz target: `web::routes` request parsing
//!
//! Drives arbitrary URIs through the router and the percent decoder.
//! Neither may panic.
//!
//! cargo fuzz run fuzz_percent_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use smartplug::web::routes::{percent_decode, route, Route};

fuzz_target!(|data: &[u8]| {
    let uri = String::from_utf8_lossy(data);
    if let Route::SetProgram(query) = route(&uri) {
        let decoded = percent_decode(query);
        // Each invalid byte may become a three-byte U+FFFD.
        assert!(decoded.len() <= query.len() * 3);
    }
});
