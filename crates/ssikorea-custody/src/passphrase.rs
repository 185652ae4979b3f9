//! Passphrase handling.

use std::fmt;
use zeroize::Zeroizing;

/// A user passphrase.
///
/// The contents are:
/// - Not printed by `Debug` or `Display`
/// - Zeroized on drop
#[derive(Clone)]
pub struct Passphrase {
    inner: Zeroizing<String>,
}

impl Passphrase {
    /// Wraps a passphrase.
    pub fn new(s: impl Into<String>) -> Self {
        Self {
            inner: Zeroizing::new(s.into()),
        }
    }

    /// Exposes the passphrase as UTF-8 bytes.
    ///
    /// Use this sparingly and only when necessary.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        self.inner.as_bytes()
    }

    /// Returns whether the passphrase is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl From<String> for Passphrase {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Passphrase {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passphrase([REDACTED])")
    }
}

impl fmt::Display for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}
