#![forbid(unsafe_code)]
#![doc = "TLS stream adapter: wraps a byte-oriented transport and mediates between it and an opaque record-layer TLS engine."]

pub mod context;
pub mod engine;
pub mod stream;
pub mod stream_async;

mod buffer;
mod driver;
mod state;

pub use context::{Certificate, Method, TlsContext, TlsContextBuilder, VerifyMode};
pub use engine::{DecryptStep, EncryptStep, HandshakeStep, StepStatus, TlsEngine};
pub use stream::TlsStream;
pub use stream_async::AsyncTlsStream;
pub use streamtls_types::{MisuseError, Phase, ProtocolError, TlsError, TlsRole};
