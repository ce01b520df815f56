#![no_main]
use libfuzzer_sys::fuzz_target;
use streamtls::{DecryptStep, TlsEngine};
use streamtls_interop::engine::LoopbackEngine;

fuzz_target!(|data: &[u8]| {
    // Arbitrary ciphertext must never panic the record layer; consume
    // records from the front until the engine stalls or rejects the input.
    let mut engine = LoopbackEngine::established(0x5B);
    let mut input = data.to_vec();
    loop {
        match engine.decrypt_step(&input) {
            Ok(DecryptStep::Record { consumed, .. })
            | Ok(DecryptStep::PeerClosed { consumed }) => {
                if consumed == 0 {
                    break;
                }
                input.drain(..consumed);
            }
            Ok(DecryptStep::DataNeeded) | Err(_) => break,
        }
    }
});
