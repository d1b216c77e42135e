//! Keypair loading, generation and on-disk `.env` persistence.
//!
//! Format: a text file with marker lines `PRIVATE_KEY_START` /
//! `PRIVATE_KEY_END` framing a PKCS#8 PEM block, and `PUBLIC_KEY_START` /
//! `PUBLIC_KEY_END` framing a SubjectPublicKeyInfo PEM block.

pub mod error;

use std::fs;
use std::path::Path;

use obscura_core::Keypair;

pub use error::{Error, Result};

const PRIVATE_KEY_START: &str = "PRIVATE_KEY_START";
const PRIVATE_KEY_END: &str = "PRIVATE_KEY_END";
const PUBLIC_KEY_START: &str = "PUBLIC_KEY_START";
const PUBLIC_KEY_END: &str = "PUBLIC_KEY_END";

const ENV_FILE_NAME: &str = ".env";

/// A node's signing identity plus its on-disk location.
pub struct Wallet {
    pub keypair: Keypair,
}

impl Wallet {
    /// Loads `<dir>/.env` if present; otherwise generates a fresh keypair
    /// and writes it there, so a cold restart against the same directory
    /// reproduces the same public key.
    pub fn load_or_generate(dir: &Path) -> Result<Self> {
        let path = dir.join(ENV_FILE_NAME);
        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let keypair = parse_env(&contents)?;
            return Ok(Wallet { keypair });
        }
        let keypair = Keypair::generate();
        fs::create_dir_all(dir)?;
        fs::write(&path, render_env(&keypair))?;
        Ok(Wallet { keypair })
    }

    pub fn public_pem(&self) -> String {
        self.keypair.public_pem()
    }
}

fn render_env(keypair: &Keypair) -> String {
    format!(
        "{PRIVATE_KEY_START}\n{}\n{PRIVATE_KEY_END}\n{PUBLIC_KEY_START}\n{}\n{PUBLIC_KEY_END}\n",
        keypair.private_pem().trim_end(),
        keypair.public_pem().trim_end(),
    )
}

fn parse_env(contents: &str) -> Result<Keypair> {
    let private_pem = extract_between(contents, PRIVATE_KEY_START, PRIVATE_KEY_END)
        .ok_or_else(|| Error::Malformed("missing PRIVATE_KEY_START/PRIVATE_KEY_END block".into()))?;
    Ok(Keypair::from_private_pem(&private_pem)?)
}

fn extract_between(contents: &str, start_marker: &str, end_marker: &str) -> Option<String> {
    let lines: Vec<&str> = contents.lines().collect();
    let start = lines.iter().position(|l| l.trim() == start_marker)?;
    let rest = &lines[start + 1..];
    let end = rest.iter().position(|l| l.trim() == end_marker)?;
    Some(rest[..end].join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn generates_and_persists_on_first_load() {
        let dir = tempdir().unwrap();
        let wallet = Wallet::load_or_generate(dir.path()).unwrap();
        assert!(dir.path().join(".env").exists());

        let reloaded = Wallet::load_or_generate(dir.path()).unwrap();
        assert_eq!(wallet.public_pem(), reloaded.public_pem());
    }

    #[test]
    fn env_file_carries_both_markers() {
        let dir = tempdir().unwrap();
        Wallet::load_or_generate(dir.path()).unwrap();
        let contents = fs::read_to_string(dir.path().join(".env")).unwrap();
        assert!(contents.contains(PRIVATE_KEY_START));
        assert!(contents.contains(PRIVATE_KEY_END));
        assert!(contents.contains(PUBLIC_KEY_START));
        assert!(contents.contains(PUBLIC_KEY_END));
    }

    #[test]
    fn malformed_file_is_rejected() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path()).unwrap();
        fs::write(dir.path().join(".env"), "not a keypair file\n").unwrap();
        assert!(Wallet::load_or_generate(dir.path()).is_err());
    }
}
