use std::fmt;

/// Header carrying the vault password on a single request
pub const VAULT_PASSWORD_HEADER: &str = "X-Vault-Password";

/// Per-request vault access.
///
/// Only a successful password check yields an unlocked context. Nothing is
/// persisted between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessContext {
    unlocked: bool,
}

impl AccessContext {
    pub fn locked() -> Self {
        Self { unlocked: false }
    }

    pub(crate) fn unlocked() -> Self {
        Self { unlocked: true }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }
}

/// Configured vault password. `None` means the vault can never be opened.
#[derive(Clone, Default)]
pub struct VaultSecret(Option<String>);

impl VaultSecret {
    pub fn new(password: Option<String>) -> Self {
        Self(password.filter(|p| !p.is_empty()))
    }

    pub fn is_configured(&self) -> bool {
        self.0.is_some()
    }

    /// Compare a submitted password in time independent of where the first
    /// mismatch occurs.
    pub fn verify(&self, submitted: &str) -> bool {
        let Some(expected) = &self.0 else {
            return false;
        };
        let (a, b) = (expected.as_bytes(), submitted.as_bytes());
        let mut diff = a.len() ^ b.len();
        for (i, &byte) in a.iter().enumerate() {
            diff |= usize::from(byte ^ b.get(i).copied().unwrap_or(!byte));
        }
        diff == 0
    }
}

impl fmt::Debug for VaultSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("VaultSecret(<redacted>)"),
            None => f.write_str("VaultSecret(<unset>)"),
        }
    }
}
