#![no_main]

use libfuzzer_sys::fuzz_target;
use litsift::filter::Query;
use litsift::models::Record;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    match Query::parse(text) {
        Ok(query) => {
            // Evaluation and the normalized form must not panic either.
            let _ = query.matches(&Record::default());
            let _ = Query::parse(&query.to_string());
        }
        Err(err) => {
            assert!(err.position <= text.len());
            let _ = err.render(text);
        }
    }
});
