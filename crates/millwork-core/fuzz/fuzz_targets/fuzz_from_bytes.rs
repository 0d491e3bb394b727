#![no_main]
use libfuzzer_sys::fuzz_target;
use millwork_core::test_utils::test_engine;

fuzz_target!(|data: &[u8]| {
    // Feed arbitrary bytes to from_bytes. Must not panic.
    let mut engine = test_engine();
    let before = engine.state_hash();
    if engine.from_bytes(data).is_err() {
        assert_eq!(engine.state_hash(), before);
    }
});
