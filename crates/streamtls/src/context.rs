//! Stream configuration shared across connections.

use std::sync::Arc;

/// TLS method selector handed to the engine.
///
/// `SystemDefault` leaves version negotiation entirely to the provider;
/// the specific variants pin the protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    SystemDefault,
    TlsClient,
    TlsServer,
    Tls12,
    Tls13,
}

/// Peer certificate validation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyMode {
    /// Accept any peer certificate.
    None,
    /// Validate the peer certificate when one is presented.
    PeerOptional,
    /// Require and validate a peer certificate.
    PeerRequired,
}

/// Certificate reference passed through to the engine.
///
/// The mediator never inspects the DER payload; the provider interprets it
/// and resolves the private key by name where one is attached.
#[derive(Debug, Clone)]
pub struct Certificate {
    der: Vec<u8>,
    private_key_name: Option<String>,
}

impl Certificate {
    pub fn from_der(der: impl Into<Vec<u8>>) -> Self {
        Self {
            der: der.into(),
            private_key_name: None,
        }
    }

    /// Associate a provider-side private key by name.
    pub fn with_private_key(mut self, name: impl Into<String>) -> Self {
        self.private_key_name = Some(name.into());
        self
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    pub fn private_key_name(&self) -> Option<&str> {
        self.private_key_name.as_deref()
    }
}

/// Process-wide TLS configuration referenced by streams.
///
/// Built once, then shared read-only: every stream holds an `Arc` to it and
/// the context must be fully configured before the first stream references it.
#[derive(Debug, Clone)]
pub struct TlsContext {
    method: Method,
    certificate: Option<Certificate>,
    verify_mode: VerifyMode,
}

impl TlsContext {
    pub fn builder() -> TlsContextBuilder {
        TlsContextBuilder::default()
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn certificate(&self) -> Option<&Certificate> {
        self.certificate.as_ref()
    }

    pub fn verify_mode(&self) -> VerifyMode {
        self.verify_mode
    }

    /// Wrap the context for sharing between streams.
    pub fn shared(self) -> Arc<TlsContext> {
        Arc::new(self)
    }
}

/// Builder for [`TlsContext`].
#[derive(Debug, Default)]
pub struct TlsContextBuilder {
    method: Option<Method>,
    certificate: Option<Certificate>,
    verify_mode: Option<VerifyMode>,
}

impl TlsContextBuilder {
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Certificate for server-role acceptors or mutual-TLS clients.
    pub fn certificate(mut self, certificate: Certificate) -> Self {
        self.certificate = Some(certificate);
        self
    }

    pub fn verify_mode(mut self, mode: VerifyMode) -> Self {
        self.verify_mode = Some(mode);
        self
    }

    pub fn build(self) -> TlsContext {
        TlsContext {
            method: self.method.unwrap_or(Method::SystemDefault),
            certificate: self.certificate,
            verify_mode: self.verify_mode.unwrap_or(VerifyMode::PeerRequired),
        }
    }
}
