// SPDX-License-Identifier: Apache-2.0

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use yubin_core::canonical;
use yubin_model::RecordFamily;

type HmacSha256 = Hmac<Sha256>;
const CURSOR_VERSION_V1: &str = "v1";
const MAX_CURSOR_DEPTH: u32 = 10_000;
const MAX_CURSOR_TOKEN_LEN: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum CursorErrorCode {
    InvalidFormat,
    UnsupportedVersion,
    InvalidSignature,
    InvalidPayload,
    FamilyMismatch,
    QueryHashMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorError {
    pub code: CursorErrorCode,
    pub message: String,
}

impl CursorError {
    #[must_use]
    pub fn new(code: CursorErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for CursorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for CursorError {}

/// Keyset position: the next page starts after `last_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CursorPayload {
    pub cursor_version: String,
    pub family: RecordFamily,
    pub query_hash: String,
    pub last_id: u64,
    #[serde(default)]
    pub depth: u32,
}

impl CursorPayload {
    #[must_use]
    pub fn new(family: RecordFamily, query_hash: String, last_id: u64, depth: u32) -> Self {
        Self {
            cursor_version: CURSOR_VERSION_V1.to_string(),
            family,
            query_hash,
            last_id,
            depth,
        }
    }
}

fn mac_for(secret: &[u8], payload_part: &str) -> Result<HmacSha256, CursorError> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| CursorError::new(CursorErrorCode::InvalidPayload, e.to_string()))?;
    mac.update(payload_part.as_bytes());
    Ok(mac)
}

/// `v1.<base64 canonical json>.<base64 hmac-sha256>`
pub fn encode_cursor(payload: &CursorPayload, secret: &[u8]) -> Result<String, CursorError> {
    let payload_part = canonical::encode_cursor_payload(payload)
        .map_err(|e| CursorError::new(CursorErrorCode::InvalidPayload, e.to_string()))?;
    let sig = mac_for(secret, &payload_part)?.finalize().into_bytes();
    Ok(format!(
        "{CURSOR_VERSION_V1}.{payload_part}.{}",
        URL_SAFE_NO_PAD.encode(sig)
    ))
}

pub fn decode_cursor(
    token: &str,
    secret: &[u8],
    expected_family: RecordFamily,
    expected_hash: &str,
) -> Result<CursorPayload, CursorError> {
    if token.len() > MAX_CURSOR_TOKEN_LEN {
        return Err(CursorError::new(
            CursorErrorCode::InvalidFormat,
            "cursor exceeds max length",
        ));
    }
    let (payload_part, sig_part) = match token.split('.').collect::<Vec<_>>().as_slice() {
        [version, payload, sig] if *version == CURSOR_VERSION_V1 => (*payload, *sig),
        [version, _, _] => {
            return Err(CursorError::new(
                CursorErrorCode::UnsupportedVersion,
                format!("unsupported cursor version: {version}"),
            ))
        }
        _ => {
            return Err(CursorError::new(
                CursorErrorCode::InvalidFormat,
                "invalid cursor format",
            ))
        }
    };
    let expected = URL_SAFE_NO_PAD
        .decode(sig_part)
        .map_err(|e| CursorError::new(CursorErrorCode::InvalidFormat, e.to_string()))?;
    mac_for(secret, payload_part)?
        .verify_slice(&expected)
        .map_err(|_| {
            CursorError::new(
                CursorErrorCode::InvalidSignature,
                "cursor signature mismatch",
            )
        })?;
    let payload: CursorPayload = canonical::decode_cursor_payload(payload_part)
        .map_err(|e| CursorError::new(CursorErrorCode::InvalidPayload, e))?;

    if payload.cursor_version != CURSOR_VERSION_V1 {
        return Err(CursorError::new(
            CursorErrorCode::UnsupportedVersion,
            "cursor version unsupported",
        ));
    }
    if payload.family != expected_family {
        return Err(CursorError::new(
            CursorErrorCode::FamilyMismatch,
            format!("cursor was issued for {}", payload.family),
        ));
    }
    if payload.query_hash != expected_hash {
        return Err(CursorError::new(
            CursorErrorCode::QueryHashMismatch,
            "cursor query hash mismatch",
        ));
    }
    if payload.depth > MAX_CURSOR_DEPTH {
        return Err(CursorError::new(
            CursorErrorCode::InvalidPayload,
            "cursor depth exceeds max",
        ));
    }
    Ok(payload)
}
