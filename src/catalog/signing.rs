//! AWS Signature Version 4 for Product Advertising API requests.

use super::error::CatalogError;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
/// Service name used in the credential scope.
pub const SERVICE: &str = "ProductAdvertisingAPI";
pub const CONTENT_ENCODING: &str = "amz-1.0";
pub const CONTENT_TYPE: &str = "application/json; charset=utf-8";
const SIGNED_HEADERS: &str = "content-encoding;content-type;host;x-amz-date;x-amz-target";

/// Everything that goes into one request signature.
pub struct SigningRequest<'a> {
    pub access_key: &'a str,
    pub secret_key: &'a str,
    pub region: &'a str,
    pub host: &'a str,
    pub path: &'a str,
    pub target: &'a str,
    pub payload: &'a str,
    /// Basic ISO-8601 timestamp, e.g. `20260101T120000Z`.
    pub amz_date: &'a str,
}

/// Returns the `Authorization` header value for `req`.
///
/// # Errors
///
/// Returns [`CatalogError::Signing`] if the HMAC key cannot be built.
pub fn authorization_header(req: &SigningRequest<'_>) -> Result<String, CatalogError> {
    let date = req.amz_date.get(..8).unwrap_or(req.amz_date);
    let scope = format!("{date}/{}/{SERVICE}/aws4_request", req.region);

    let canonical_request = format!(
        "POST\n{path}\n\ncontent-encoding:{CONTENT_ENCODING}\ncontent-type:{CONTENT_TYPE}\nhost:{host}\nx-amz-date:{amz_date}\nx-amz-target:{target}\n\n{SIGNED_HEADERS}\n{payload_hash}",
        path = req.path,
        host = req.host,
        amz_date = req.amz_date,
        target = req.target,
        payload_hash = sha256_hex(req.payload.as_bytes()),
    );

    let string_to_sign = format!(
        "{ALGORITHM}\n{}\n{scope}\n{}",
        req.amz_date,
        sha256_hex(canonical_request.as_bytes())
    );

    let k_date = hmac_sha256(format!("AWS4{}", req.secret_key).as_bytes(), date.as_bytes())?;
    let k_region = hmac_sha256(&k_date, req.region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, SERVICE.as_bytes())?;
    let k_signing = hmac_sha256(&k_service, b"aws4_request")?;
    let signature = encode_hex(&hmac_sha256(&k_signing, string_to_sign.as_bytes())?);

    Ok(format!(
        "{ALGORITHM} Credential={}/{scope}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
        req.access_key
    ))
}

fn hmac_sha256(key: &[u8], payload: &[u8]) -> Result<Vec<u8>, CatalogError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| CatalogError::Signing(e.to_string()))?;
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn sha256_hex(payload: &[u8]) -> String {
    encode_hex(Sha256::digest(payload).as_slice())
}

fn encode_hex(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}
