//! Credential checking is a collaborator: the session layer only needs an
//! `Identity` once someone has vouched for the caller.

use async_trait::async_trait;
use subtle::{Choice, ConstantTimeEq};

use gatehouse_core::Identity;

#[async_trait]
pub trait CredentialCheck: Send + Sync {
    /// `None` for any failure; callers must not learn which part was wrong.
    async fn verify(&self, email: &str, password: &str) -> Option<Identity>;
}

#[derive(Clone)]
struct Account {
    identity: Identity,
    password: String,
}

/// In-memory accounts, enough for a bootstrap admin and for tests.
#[derive(Clone, Default)]
pub struct StaticCredentials {
    accounts: Vec<Account>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, identity: Identity, password: impl Into<String>) -> Self {
        self.accounts.push(Account {
            identity,
            password: password.into(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl core::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("accounts", &self.accounts.len())
            .finish()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Stand-in compared against when no account matches the email.
const NO_ACCOUNT_PASSWORD: &[u8] = b"no-such-account-placeholder-pass";

#[async_trait]
impl CredentialCheck for StaticCredentials {
    async fn verify(&self, email: &str, password: &str) -> Option<Identity> {
        let email = normalize_email(email);
        let account = self
            .accounts
            .iter()
            .find(|a| normalize_email(&a.identity.email) == email);

        // Known and unknown emails run the same comparison.
        let expected = account.map_or(NO_ACCOUNT_PASSWORD, |a| a.password.as_bytes());
        let known = Choice::from(u8::from(account.is_some()));
        let accepted = expected.ct_eq(password.as_bytes()) & known;

        if bool::from(accepted) {
            account.map(|a| a.identity.clone())
        } else {
            None
        }
    }
}
