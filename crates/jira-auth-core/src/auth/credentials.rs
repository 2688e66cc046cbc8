use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "jira-auth";

/// Passwords kept in the OS keychain, one entry per (instance, username).
pub struct CredentialStore {
    instance: String,
}

impl CredentialStore {
    /// Store scoped to the JIRA instance at `base_url`
    pub fn for_instance(base_url: &str) -> Self {
        Self {
            instance: Self::instance_key(base_url),
        }
    }

    /// Scheme-less host and path, without trailing slash, so that
    /// `https://jira.example.com/` and `https://jira.example.com` share entries.
    fn instance_key(base_url: &str) -> String {
        let trimmed = base_url.trim().trim_end_matches('/');
        match trimmed.split_once("://") {
            Some((_, rest)) => rest.to_ascii_lowercase(),
            None => trimmed.to_ascii_lowercase(),
        }
    }

    fn account(&self, username: &str) -> String {
        format!("{}@{}", username, self.instance)
    }

    fn entry(&self, username: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, &self.account(username)).context("Failed to create keyring entry")
    }

    /// Store the password for a username in the OS keychain
    pub fn store(&self, username: &str, password: &str) -> Result<()> {
        self.entry(username)?
            .set_password(password)
            .context("Failed to store password in keychain")
    }

    /// Retrieve the password for a username from the OS keychain
    pub fn get_password(&self, username: &str) -> Result<String> {
        self.entry(username)?
            .get_password()
            .context("Failed to retrieve password from keychain")
    }

    /// Delete stored credentials for a username
    pub fn delete(&self, username: &str) -> Result<()> {
        self.entry(username)?
            .delete_credential()
            .context("Failed to delete credential from keychain")
    }

    /// Check if credentials exist for a username
    pub fn has_credentials(&self, username: &str) -> bool {
        self.entry(username)
            .map(|entry| entry.get_password().is_ok())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_key_normalization() {
        assert_eq!(
            CredentialStore::instance_key("https://Jira.Example.com/"),
            "jira.example.com"
        );
        assert_eq!(
            CredentialStore::instance_key("http://example.com/jira"),
            "example.com/jira"
        );
        assert_eq!(CredentialStore::instance_key("example.com"), "example.com");
    }

    #[test]
    fn test_account_includes_instance() {
        let store = CredentialStore::for_instance("https://jira.example.com");
        assert_eq!(store.account("fred"), "fred@jira.example.com");
    }
}
