use std::fmt::{Display, Formatter};

use chrono::{serde::ts_milliseconds, serde::ts_milliseconds_option, DateTime, Utc};
use data_encoding::HEXLOWER;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::store::StoredCollection;

/// An opaque, unguessable credential identifier, in UUIDv4 text form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialId(String);

impl CredentialId {
    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        let mut bytes = [0_u8; 16];
        rand::thread_rng().fill(&mut bytes);
        // Version 4, variant 1.
        bytes[6] = (bytes[6] & 0x0f) | 0x40;
        bytes[8] = (bytes[8] & 0x3f) | 0x80;
        let hex = HEXLOWER.encode(&bytes);
        Self(format!(
            "{}-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..32]
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CredentialId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CredentialId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A single-use voting credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub id: CredentialId,
    pub used: bool,
    #[serde(with = "ts_milliseconds", alias = "createdAt")]
    pub issued_at: DateTime<Utc>,
    #[serde(
        default,
        with = "ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub used_at: Option<DateTime<Utc>>,
}

impl Credential {
    fn new(issued_at: DateTime<Utc>) -> Self {
        Self {
            id: CredentialId::random(),
            used: false,
            issued_at,
            used_at: None,
        }
    }
}

impl StoredCollection for Credential {
    const NAME: &'static str = "credentials";
}

/// What a lookup or redemption found for a given credential ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redemption {
    /// The credential was unused, and now is used.
    Redeemed,
    AlreadyUsed,
    NotFound,
}

/// Current state of a credential, without changing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStatus {
    Unused,
    Used,
    NotFound,
}

/// The table of every issued credential, in issue order.
///
/// This is a plain value; exclusive access for redemption is provided by
/// [`crate::model::BallotBox`], which owns the only shared instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialStore {
    credentials: Vec<Credential>,
}

impl CredentialStore {
    pub fn from_credentials(credentials: Vec<Credential>) -> Self {
        Self { credentials }
    }

    /// Create and record a new unused credential.
    pub fn issue(&mut self, now: DateTime<Utc>) -> Credential {
        let mut credential = Credential::new(now);
        // IDs must be unique within the store.
        while self.find(&credential.id).is_some() {
            credential.id = CredentialId::random();
        }
        self.credentials.push(credential.clone());
        credential
    }

    pub fn status(&self, id: &CredentialId) -> CredentialStatus {
        match self.find(id) {
            Some(credential) if credential.used => CredentialStatus::Used,
            Some(_) => CredentialStatus::Unused,
            None => CredentialStatus::NotFound,
        }
    }

    /// Flip the credential to used if, and only if, it is currently unused.
    pub fn redeem_if_unused(&mut self, id: &CredentialId, now: DateTime<Utc>) -> Redemption {
        match self.credentials.iter_mut().find(|c| &c.id == id) {
            Some(credential) if credential.used => Redemption::AlreadyUsed,
            Some(credential) => {
                credential.used = true;
                credential.used_at = Some(now);
                Redemption::Redeemed
            }
            None => Redemption::NotFound,
        }
    }

    pub fn list(&self) -> &[Credential] {
        &self.credentials
    }

    fn find(&self, id: &CredentialId) -> Option<&Credential> {
        self.credentials.iter().find(|c| &c.id == id)
    }
}
