//! Credential resolution.
//!
//! A [`Credentials`] value holds whatever the caller handed us (username,
//! password or key passphrase, raw private-key bytes). [`Credentials::resolve`]
//! turns it into an [`Auth`], parsing key material immediately so that a
//! [`SyncTarget`](crate::SyncTarget) never carries a key that cannot be used.

use russh_keys::PublicKeyBase64;
use thiserror::Error;

/// Username used for key authentication when neither the caller nor the URL
/// provides one.
pub const DEFAULT_SSH_USER: &str = "git";

/// Errors raised while turning raw credentials into an [`Auth`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CredentialError {
    #[error("private key is not valid UTF-8 text")]
    NotUtf8(#[source] std::str::Utf8Error),

    #[error("failed to decode private key: {0}")]
    InvalidKey(#[source] russh_keys::Error),

    #[error("failed to derive public key: {0}")]
    PublicKey(#[source] russh_keys::Error),
}

/// Raw, unvalidated credential inputs.
#[derive(Clone, Default)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
    pub private_key: Option<Vec<u8>>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// How network operations authenticate.
#[derive(Clone, Debug)]
pub enum Auth {
    /// No explicit authentication; rely on the SSH agent, git credential
    /// helpers or anonymous access.
    None,
    /// A decoded private key, used for SSH transports.
    Key(KeyAuth),
}

/// A private key that has been decoded (and decrypted) successfully, together
/// with the public half derived from it.
#[derive(Clone)]
pub struct KeyAuth {
    username: Option<String>,
    private_key: String,
    public_key: String,
    passphrase: Option<String>,
}

impl std::fmt::Debug for KeyAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyAuth")
            .field("username", &self.username)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

impl KeyAuth {
    /// Username to present, preferring the configured one over the URL's.
    pub fn username<'a>(&'a self, from_url: Option<&'a str>) -> &'a str {
        self.username
            .as_deref()
            .or(from_url)
            .unwrap_or(DEFAULT_SSH_USER)
    }

    /// The private key in the text form it was supplied in.
    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    /// Public key as an OpenSSH `authorized_keys` line (`<type> <base64>`).
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn passphrase(&self) -> Option<&str> {
        self.passphrase.as_deref()
    }
}

impl Credentials {
    pub fn new(
        username: Option<String>,
        password: Option<String>,
        private_key: Option<Vec<u8>>,
    ) -> Self {
        Credentials {
            username: username.filter(|s| !s.is_empty()),
            password: password.filter(|s| !s.is_empty()),
            private_key: private_key.filter(|k| !k.is_empty()),
        }
    }

    /// Resolve into an [`Auth`].
    ///
    /// Without key material this always succeeds with [`Auth::None`]. With key
    /// material the key is decoded as-is first; the password is used as its
    /// passphrase only if that fails, so an unencrypted key given alongside a
    /// password still resolves.
    ///
    /// # Errors
    /// Returns [`CredentialError`] if the key is not text, is malformed, is
    /// encrypted and no passphrase was given, or the passphrase is wrong.
    pub fn resolve(&self) -> Result<Auth, CredentialError> {
        let Some(raw) = self.private_key.as_deref().filter(|k| !k.is_empty()) else {
            return Ok(Auth::None);
        };

        let text = std::str::from_utf8(raw).map_err(CredentialError::NotUtf8)?;
        let (pair, passphrase) = match russh_keys::decode_secret_key(text, None) {
            Ok(pair) => (pair, None),
            Err(plain_err) => match self.password.as_deref().filter(|p| !p.is_empty()) {
                Some(pass) => {
                    let pair = russh_keys::decode_secret_key(text, Some(pass))
                        .map_err(CredentialError::InvalidKey)?;
                    (pair, Some(pass))
                }
                None => return Err(CredentialError::InvalidKey(plain_err)),
            },
        };
        let public = pair
            .clone_public_key()
            .map_err(CredentialError::PublicKey)?;

        Ok(Auth::Key(KeyAuth {
            username: self.username.clone(),
            private_key: text.to_string(),
            public_key: format!("{} {}", key_type(public.name()), public.public_key_base64()),
            passphrase: passphrase.map(str::to_string),
        }))
    }
}

/// RSA keys report their signature algorithm; `authorized_keys` wants the
/// key type.
fn key_type(algorithm: &str) -> &str {
    match algorithm {
        "rsa-sha2-256" | "rsa-sha2-512" => "ssh-rsa",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN_KEY: &str = include_str!("../tests/fixtures/id_ed25519_plain");
    const PLAIN_PUB: &str = include_str!("../tests/fixtures/id_ed25519_plain.pub");
    const ENCRYPTED_KEY: &str = include_str!("../tests/fixtures/id_ed25519_encrypted");
    const ENCRYPTED_PUB: &str = include_str!("../tests/fixtures/id_ed25519_encrypted.pub");
    const PASSPHRASE: &str = "correct horse";

    /// Strip the trailing comment from a `.pub` file line.
    fn key_line(pub_file: &str) -> String {
        pub_file
            .split_whitespace()
            .take(2)
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn no_key_means_no_auth() {
        let creds = Credentials::new(Some("alice".into()), Some("hunter2".into()), None);
        assert!(matches!(creds.resolve().unwrap(), Auth::None));
    }

    #[test]
    fn empty_key_bytes_mean_no_auth() {
        let creds = Credentials::new(None, None, Some(Vec::new()));
        assert!(matches!(creds.resolve().unwrap(), Auth::None));

        let raw = Credentials {
            private_key: Some(Vec::new()),
            ..Credentials::default()
        };
        assert!(matches!(raw.resolve().unwrap(), Auth::None));
    }

    #[test]
    fn plain_key_derives_public_key() {
        let creds = Credentials::new(None, None, Some(PLAIN_KEY.as_bytes().to_vec()));
        let Auth::Key(key) = creds.resolve().unwrap() else {
            panic!("expected key auth");
        };
        assert_eq!(key.public_key(), key_line(PLAIN_PUB));
        assert_eq!(key.private_key(), PLAIN_KEY);
        assert_eq!(key.passphrase(), None);
    }

    #[test]
    fn encrypted_key_with_passphrase_resolves() {
        let creds = Credentials::new(
            Some("deploy".into()),
            Some(PASSPHRASE.into()),
            Some(ENCRYPTED_KEY.as_bytes().to_vec()),
        );
        let Auth::Key(key) = creds.resolve().unwrap() else {
            panic!("expected key auth");
        };
        assert_eq!(key.public_key(), key_line(ENCRYPTED_PUB));
        assert_eq!(key.passphrase(), Some(PASSPHRASE));
        assert_eq!(key.username(Some("git")), "deploy");
    }

    #[test]
    fn password_is_not_a_passphrase_for_a_plain_key() {
        let creds = Credentials::new(
            Some("deploy".into()),
            Some("https-password".into()),
            Some(PLAIN_KEY.as_bytes().to_vec()),
        );
        let Auth::Key(key) = creds.resolve().unwrap() else {
            panic!("expected key auth");
        };
        assert_eq!(key.public_key(), key_line(PLAIN_PUB));
        assert_eq!(key.passphrase(), None);
        assert_eq!(key.username(None), "deploy");
    }

    #[test]
    fn username_falls_back_to_url_then_default() {
        let creds = Credentials::new(None, None, Some(PLAIN_KEY.as_bytes().to_vec()));
        let Auth::Key(key) = creds.resolve().unwrap() else {
            panic!("expected key auth");
        };
        assert_eq!(key.username(Some("bob")), "bob");
        assert_eq!(key.username(None), DEFAULT_SSH_USER);
    }

    #[test]
    fn wrong_passphrase_is_rejected() {
        let creds = Credentials::new(
            None,
            Some("not the passphrase".into()),
            Some(ENCRYPTED_KEY.as_bytes().to_vec()),
        );
        assert!(matches!(
            creds.resolve(),
            Err(CredentialError::InvalidKey(_))
        ));
    }

    #[test]
    fn encrypted_key_without_passphrase_is_rejected() {
        let creds = Credentials::new(None, None, Some(ENCRYPTED_KEY.as_bytes().to_vec()));
        assert!(creds.resolve().is_err());
    }

    #[test]
    fn garbage_key_is_rejected() {
        let creds = Credentials::new(None, None, Some(b"definitely not a key".to_vec()));
        assert!(matches!(
            creds.resolve(),
            Err(CredentialError::InvalidKey(_))
        ));

        let creds = Credentials::new(None, None, Some(vec![0xff, 0xfe, 0x00]));
        assert!(matches!(creds.resolve(), Err(CredentialError::NotUtf8(_))));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let creds = Credentials::new(
            Some("alice".into()),
            Some("hunter2".into()),
            Some(PLAIN_KEY.as_bytes().to_vec()),
        );
        let shown = format!("{creds:?}");
        assert!(!shown.contains("hunter2"));
        assert!(!shown.contains("OPENSSH"));

        let Auth::Key(key) = creds.resolve().unwrap() else {
            panic!("expected key auth");
        };
        assert!(!format!("{key:?}").contains("OPENSSH PRIVATE"));
    }
}
