#![no_main]

use libfuzzer_sys::fuzz_target;
use litsift::models::SearchResult;

fuzz_target!(|data: &[u8]| {
    if let Ok(page) = serde_json::from_slice::<SearchResult>(data) {
        let _ = page.has_more();
    }
});
