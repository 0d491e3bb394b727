#![no_main]
use libfuzzer_sys::fuzz_target;
use millwork_core::test_utils::test_engine;

fuzz_target!(|data: &[u8]| {
    // Arbitrary text into load_json. Must not panic -- returning Err is fine.
    if let Ok(text) = std::str::from_utf8(data) {
        let mut engine = test_engine();
        if engine.load_json(text).is_ok() {
            for _ in 0..4 {
                engine.step();
            }
            let _ = engine.save_json();
        }
    }
});
