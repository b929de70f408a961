//! Thin wrapper around the OS keyring for credential storage.

use crate::error::Result;

const SERVICE: &str = "stillwater";

/// Keyring entry holding the chat completion API key.
pub const CHAT_API_KEY: &str = "openai_api_key";

pub fn get(key: &str) -> Result<Option<String>> {
    let entry = keyring::Entry::new(SERVICE, key)?;
    match entry.get_password() {
        Ok(pw) => Ok(Some(pw)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let entry = keyring::Entry::new(SERVICE, key)?;
    entry.set_password(value)?;
    Ok(())
}

pub fn delete(key: &str) -> Result<()> {
    let entry = keyring::Entry::new(SERVICE, key)?;
    match entry.delete_credential() {
        Ok(()) => Ok(()),
        Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
