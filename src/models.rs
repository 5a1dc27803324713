// Core data structures for the subsync aggregator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Proxy protocol of a server entry
///
/// Only the scheme is interpreted; protocol-specific wire formats are
/// opaque to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    Vmess,
    Vless,
    Trojan,
    Shadowsocks,
    Socks,
}

impl Protocol {
    /// Create from a URI scheme
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme.to_lowercase().as_str() {
            "vmess" => Some(Self::Vmess),
            "vless" => Some(Self::Vless),
            "trojan" => Some(Self::Trojan),
            "ss" => Some(Self::Shadowsocks),
            "socks" => Some(Self::Socks),
            _ => None,
        }
    }

    /// Get URI scheme representation
    pub fn as_scheme(&self) -> &'static str {
        match self {
            Self::Vmess => "vmess",
            Self::Vless => "vless",
            Self::Trojan => "trojan",
            Self::Shadowsocks => "ss",
            Self::Socks => "socks",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_scheme())
    }
}

impl std::str::FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_scheme(s).ok_or_else(|| format!("unknown protocol: {s}"))
    }
}

/// One decoded proxy-server definition
///
/// Owned by the importer until merged into the store. `subscription_id`
/// is never null; the empty string marks an ungrouped manual import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub protocol: Protocol,
    pub address: String,
    pub port: u16,
    /// Authentication material (user id, password, or method:password)
    pub auth: String,
    pub subscription_id: String,
    pub remarks: String,
}

impl ServerConfig {
    pub fn new(
        protocol: Protocol,
        address: impl Into<String>,
        port: u16,
        auth: impl Into<String>,
    ) -> Self {
        Self {
            protocol,
            address: address.into(),
            port,
            auth: auth.into(),
            subscription_id: String::new(),
            remarks: String::new(),
        }
    }

    /// Set the owning subscription
    pub fn with_subscription(mut self, subscription_id: impl Into<String>) -> Self {
        self.subscription_id = subscription_id.into();
        self
    }

    /// Set the display remarks
    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = remarks.into();
        self
    }

    /// Equality key used for duplicate suppression: SHA-256 over
    /// protocol, address, port and auth material. Remarks and the owning
    /// subscription do not participate.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.protocol.as_scheme().as_bytes());
        hasher.update(b"|");
        hasher.update(self.address.as_bytes());
        hasher.update(b"|");
        hasher.update(self.port.to_string().as_bytes());
        hasher.update(b"|");
        hasher.update(self.auth.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// A persisted, named remote source of server definitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub remarks: String,
    pub url: String,
    pub enabled: bool,
    pub added_at: DateTime<Utc>,
}

impl Subscription {
    /// Create a new enabled subscription with a fresh id
    pub fn new(remarks: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            remarks: remarks.into(),
            url: url.into(),
            enabled: true,
            added_at: Utc::now(),
        }
    }
}

/// Merge policy for a batch import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Add entries, skipping any fingerprint already in the store
    Append,
    /// Remove the subscription's prior entries first, then insert the batch
    Replace,
}

impl ImportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Append => "append",
            Self::Replace => "replace",
        }
    }
}

/// A persisted server row as read back from the store
#[derive(Debug, Clone)]
pub struct ServerRecord {
    pub id: String,
    pub config: ServerConfig,
    pub fingerprint: String,
    pub added_at: DateTime<Utc>,
}
