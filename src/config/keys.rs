//! Asymmetric key pair loading
//!
//! Both PEM files are read concurrently. The public key is mandatory; the
//! private key is optional because most services only verify tokens and are
//! deployed without signing capability.

use crate::config::secret::{key_material, KeyMaterial};
use crate::domain::errors::ServiceConfigError;
use crate::domain::result::Result;
use std::path::{Path, PathBuf};

/// Directory holding the key pair, relative to the base directory
pub const KEYS_DIR: &str = "keys";

/// Public key file name
pub const PUBLIC_KEY_FILE: &str = "public_key.pem";

/// Private key file name
pub const PRIVATE_KEY_FILE: &str = "private_key.pem";

/// Loaded key pair
#[derive(Debug, Clone)]
pub struct KeyPair {
    pub public_key: KeyMaterial,
    pub private_key: Option<KeyMaterial>,
}

/// Location of the public key under `base_dir`
pub fn public_key_path(base_dir: &Path) -> PathBuf {
    base_dir.join(KEYS_DIR).join(PUBLIC_KEY_FILE)
}

/// Location of the private key under `base_dir`
pub fn private_key_path(base_dir: &Path) -> PathBuf {
    base_dir.join(KEYS_DIR).join(PRIVATE_KEY_FILE)
}

/// Reads the key pair under `base_dir/keys`.
///
/// # Errors
///
/// Returns [`ServiceConfigError::MissingPublicKey`] when the public key cannot
/// be read. A missing private key is not an error.
pub async fn load_key_pair(base_dir: &Path) -> Result<KeyPair> {
    let public_path = public_key_path(base_dir);
    let private_path = private_key_path(base_dir);

    let (public, private) = tokio::join!(
        tokio::fs::read(&public_path),
        tokio::fs::read(&private_path)
    );

    let public_key = public.map_err(|e| {
        tracing::debug!(path = %public_path.display(), error = %e, "Public key unreadable");
        ServiceConfigError::MissingPublicKey {
            path: public_path.clone(),
        }
    })?;

    let private_key = match private {
        Ok(bytes) => Some(key_material(bytes)),
        Err(e) => {
            tracing::debug!(
                path = %private_path.display(),
                error = %e,
                "No private key, signing disabled"
            );
            None
        }
    };

    Ok(KeyPair {
        public_key: key_material(public_key),
        private_key,
    })
}
