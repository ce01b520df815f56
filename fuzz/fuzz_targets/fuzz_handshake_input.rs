#![no_main]
use libfuzzer_sys::fuzz_target;
use streamtls::{TlsContext, TlsEngine, TlsRole, VerifyMode};
use streamtls_interop::engine::LoopbackEngine;

fuzz_target!(|data: &[u8]| {
    // A server fed arbitrary hello bytes must fail cleanly, never panic.
    let ctx = TlsContext::builder()
        .certificate(streamtls::Certificate::from_der(b"fuzz.test".to_vec()))
        .verify_mode(VerifyMode::None)
        .build();
    let mut engine = LoopbackEngine::new();
    if engine.start(TlsRole::Server, &ctx, None).is_err() {
        return;
    }
    let mut input = data.to_vec();
    while let Ok(step) = engine.handshake_step(&input) {
        if step.consumed == 0 {
            break;
        }
        input.drain(..step.consumed);
    }
});
