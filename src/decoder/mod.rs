//! Payload decoding with two-tier transport fallback
//!
//! Subscription providers inconsistently wrap payloads in a transport
//! encoding: some serve a plain newline-separated list of share links,
//! others serve the same list base64-encoded as a whole. The chain
//! tries the plain parse first (supporting already-plain lists without
//! needless decode work) and only transport-decodes the payload when
//! the first tier yields nothing.

mod link;

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use regex::Regex;
use thiserror::Error;

use crate::models::ServerConfig;

pub use link::decode_link;

/// Errors that can occur while decoding payloads and links
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Both decode tiers produced zero entries
    #[error("No valid server entries in payload")]
    NothingDecoded,

    /// Link scheme is not a known proxy protocol
    #[error("Unsupported link scheme: {0}")]
    UnsupportedScheme(String),

    /// Link matched a known scheme but could not be decoded
    #[error("Malformed {scheme} link: {reason}")]
    MalformedLink { scheme: String, reason: String },
}

/// Two-tier payload decoder
pub struct DecoderChain {
    /// Matches lines that look like share links
    scheme_pattern: Regex,
}

impl DecoderChain {
    pub fn new() -> Self {
        Self {
            // Only lines starting with a known proxy scheme are link candidates
            scheme_pattern: Regex::new(r"^(?i)(vmess|vless|trojan|ss|socks)://").unwrap(),
        }
    }

    /// Decode a raw payload into server entries.
    ///
    /// Tier 1 parses the payload directly as a newline-separated list of
    /// share links. If that yields zero entries, tier 2 base64-decodes
    /// the whole payload and retries the parse on the decoded text. An
    /// empty result after both tiers is a decode failure, which callers
    /// signal as a non-positive count.
    pub fn decode_batch(&self, raw: &str) -> Vec<ServerConfig> {
        let direct = self.decode_lines(raw);
        if !direct.is_empty() {
            return direct;
        }

        match decode_base64_lenient(raw) {
            Some(decoded) => self.decode_lines(&decoded),
            None => Vec::new(),
        }
    }

    /// Decode a single share link, surfacing the cause on malformed input
    pub fn decode_single(&self, text: &str) -> Result<ServerConfig, DecodeError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(DecodeError::NothingDecoded);
        }
        link::decode_link(trimmed)
    }

    fn decode_lines(&self, text: &str) -> Vec<ServerConfig> {
        let mut configs = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || !self.scheme_pattern.is_match(line) {
                continue;
            }

            match link::decode_link(line) {
                Ok(config) => configs.push(config),
                Err(e) => {
                    tracing::debug!(error = %e, "skipping undecodable line");
                }
            }
        }

        configs
    }
}

impl Default for DecoderChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Lenient base64 decode used for transport-encoded payloads and link
/// bodies: whitespace is stripped first, then the standard and URL-safe
/// alphabets are tried with and without padding. Returns `None` unless
/// the result is valid UTF-8.
pub fn decode_base64_lenient(input: &str) -> Option<String> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    for engine in [&STANDARD, &STANDARD_NO_PAD, &URL_SAFE, &URL_SAFE_NO_PAD] {
        if let Ok(bytes) = engine.decode(&compact) {
            if let Ok(text) = String::from_utf8(bytes) {
                return Some(text);
            }
        }
    }

    None
}
