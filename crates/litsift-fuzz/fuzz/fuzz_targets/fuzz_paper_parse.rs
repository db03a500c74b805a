#![no_main]

use libfuzzer_sys::fuzz_target;
use litsift::models::{Paper, Record};

fuzz_target!(|data: &[u8]| {
    // Should never panic, only return Ok or Err
    if let Ok(paper) = serde_json::from_slice::<Paper>(data) {
        let _ = Record::from(paper);
    }
});
