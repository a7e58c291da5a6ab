//! Store path syntax: base names, the store directory and nix-base32 hashes

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Length of the hash part of a store path base name
pub const HASH_PART_LEN: usize = 32;

/// Number of digest bytes encoded in the hash part
pub const HASH_BYTES: usize = 20;

/// Maximum length of the name part
pub const MAX_NAME_LEN: usize = 211;

/// Extension marking a build-step description
pub const DRV_EXTENSION: &str = ".drv";

const BASE32_CHARS: &[u8; 32] = b"0123456789abcdfghijklmnpqrsvwxyz";

/// Encode bytes in the store's base-32 alphabet (least significant bits last).
pub fn encode_base32(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return String::new();
    }
    let len = (bytes.len() * 8 - 1) / 5 + 1;
    let mut out = String::with_capacity(len);
    for n in (0..len).rev() {
        let b = n * 5;
        let i = b / 8;
        let j = b % 8;
        let low = bytes[i] >> j;
        let high = if i + 1 < bytes.len() {
            bytes[i + 1].checked_shl(8 - j as u32).unwrap_or(0)
        } else {
            0
        };
        out.push(BASE32_CHARS[((low | high) & 0x1f) as usize] as char);
    }
    out
}

fn is_base32_char(c: u8) -> bool {
    BASE32_CHARS.contains(&c)
}

fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'+' | b'-' | b'.' | b'_' | b'?' | b'=')
}

/// Check a store object name
pub fn check_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty() || name.len() > MAX_NAME_LEN || name.starts_with('.') {
        return Err(StoreError::InvalidPath(name.to_string()));
    }
    if !name.bytes().all(is_name_char) {
        return Err(StoreError::InvalidPath(name.to_string()));
    }
    Ok(())
}

/// Whether a path or base name follows the build-step description convention
pub fn is_derivation(path: &str) -> bool {
    path.ends_with(DRV_EXTENSION)
}

/// Identifier of a store object, without the store directory.
///
/// Holds the base name `<hash>-<name>`. Cloning is a reference-count bump.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StorePath {
    base: Arc<str>,
}

impl StorePath {
    /// Parse a base name of the form `<hash>-<name>`
    pub fn from_base_name(base: &str) -> Result<Self, StoreError> {
        let bytes = base.as_bytes();
        if bytes.len() < HASH_PART_LEN + 2 || bytes[HASH_PART_LEN] != b'-' {
            return Err(StoreError::InvalidPath(base.to_string()));
        }
        if !bytes[..HASH_PART_LEN].iter().all(|c| is_base32_char(*c)) {
            return Err(StoreError::InvalidPath(base.to_string()));
        }
        check_name(&base[HASH_PART_LEN + 1..])
            .map_err(|_| StoreError::InvalidPath(base.to_string()))?;
        Ok(StorePath { base: base.into() })
    }

    /// Build a path from raw digest bytes and a name
    pub fn from_parts(digest: &[u8; HASH_BYTES], name: &str) -> Result<Self, StoreError> {
        check_name(name)?;
        Ok(StorePath {
            base: format!("{}-{}", encode_base32(digest), name).into(),
        })
    }

    /// Content-addressed path for `content` stored under `name`
    pub fn from_content(name: &str, content: &[u8]) -> Result<Self, StoreError> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"name:");
        hasher.update(name.as_bytes());
        hasher.update(b"content:");
        hasher.update(content);
        let full = hasher.finalize();
        let mut digest = [0u8; HASH_BYTES];
        digest.copy_from_slice(&full.as_bytes()[..HASH_BYTES]);
        Self::from_parts(&digest, name)
    }

    pub fn base_name(&self) -> &str {
        &self.base
    }

    pub fn hash_part(&self) -> &str {
        &self.base[..HASH_PART_LEN]
    }

    pub fn name(&self) -> &str {
        &self.base[HASH_PART_LEN + 1..]
    }

    pub fn is_derivation(&self) -> bool {
        is_derivation(self.name())
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)
    }
}

impl TryFrom<String> for StorePath {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        StorePath::from_base_name(&value)
    }
}

impl From<StorePath> for String {
    fn from(path: StorePath) -> Self {
        path.base.to_string()
    }
}

/// The directory all store paths live in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreDir(String);

impl Default for StoreDir {
    fn default() -> Self {
        StoreDir("/nix/store".to_string())
    }
}

impl StoreDir {
    pub fn new(dir: impl Into<String>) -> Result<Self, StoreError> {
        let dir = dir.into();
        if !dir.starts_with('/') || (dir.len() > 1 && dir.ends_with('/')) {
            return Err(StoreError::InvalidPath(dir));
        }
        Ok(StoreDir(dir))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the canonical printed form `<dir>/<hash>-<name>`
    pub fn parse_path(&self, s: &str) -> Result<StorePath, StoreError> {
        let Some((dir, base)) = s.rsplit_once('/') else {
            return Err(StoreError::InvalidPath(s.to_string()));
        };
        if dir != self.0 {
            return Err(StoreError::NotInStore(s.to_string(), self.0.clone()));
        }
        StorePath::from_base_name(base).map_err(|_| StoreError::InvalidPath(s.to_string()))
    }

    pub fn is_store_path(&self, s: &str) -> bool {
        self.parse_path(s).is_ok()
    }

    pub fn print_path(&self, path: &StorePath) -> String {
        format!("{}/{}", self.0, path.base_name())
    }
}
