//! Bidirectional mapping between property/ACL maps and wire headers.
//!
//! Every domain property travels as a header named
//! `x-silo-meta-<key>`; ACL entries use `x-silo-meta-acl-<principal>`.
//! Decoding runs in two passes: strip the reserved prefix to recover
//! domain entries, then fold non-prefixed standard headers into the
//! reserved property names with first-match-wins precedence. Callers
//! never see a key with the prefix still attached.

use http::header::{
    HeaderMap, HeaderName, HeaderValue, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, ETAG,
    LAST_MODIFIED,
};

use common::props::{
    PROP_CHECKSUM, PROP_CONTENT_ENCODING, PROP_MIMETYPE, PROP_MODIFIED, PROP_SIZE,
};
use common::{AclMap, AclType, Properties};

/// Reserved prefix for custom property headers.
pub const PROPERTIES_PREFIX: &str = "x-silo-meta-";
/// Reserved prefix for ACL headers; the suffix is the principal id.
pub const ACL_PREFIX: &str = "x-silo-meta-acl-";
/// Attached to every write request.
pub const CLIENT_VERSION_HEADER: &str = "x-silo-client-version";
/// Value of [`CLIENT_VERSION_HEADER`].
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");
/// Checksum header echoed by the service; ETag is the fallback.
pub const CONTENT_MD5: &str = "content-md5";
/// Names the source item of a server-side copy: `/<space>/<content>`.
pub const COPY_SOURCE_HEADER: &str = "x-silo-copy-source";
/// Store id of the copy source, when it differs from the target store.
pub const COPY_SOURCE_STORE_HEADER: &str = "x-silo-copy-source-store";

/// A property or ACL entry that cannot be represented as a header.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("property key cannot form a header name: {0}")]
    InvalidKey(String),
    #[error("property value for {0} cannot form a header value")]
    InvalidValue(String),
}

/// Encode a property map into prefixed headers.
///
/// `content-encoding` passes through unprefixed; everything else gets
/// the reserved prefix. Keys are case-insensitive on the wire and come
/// back lowercased.
pub fn encode_properties(properties: &Properties) -> Result<HeaderMap, CodecError> {
    let mut headers = HeaderMap::new();
    for (key, value) in properties {
        if key == PROP_CONTENT_ENCODING {
            headers.insert(CONTENT_ENCODING, header_value(key, value)?);
            continue;
        }
        headers.insert(prefixed_name(key)?, header_value(key, value)?);
    }
    Ok(headers)
}

/// Encode an ACL map into `x-silo-meta-acl-<principal>` headers.
pub fn encode_acls(acls: &AclMap) -> Result<HeaderMap, CodecError> {
    let mut headers = HeaderMap::new();
    for (principal, level) in acls {
        let name = HeaderName::from_bytes(format!("{ACL_PREFIX}{principal}").as_bytes())
            .map_err(|_| CodecError::InvalidKey(principal.clone()))?;
        headers.insert(name, HeaderValue::from_static(level.as_str()));
    }
    Ok(headers)
}

/// Decode response headers into a property map.
pub fn decode_properties(headers: &HeaderMap) -> Properties {
    let mut properties = Properties::new();

    // Pass 1: prefixed custom headers (ACL entries are not properties).
    for (name, value) in headers {
        let name = name.as_str();
        if name.starts_with(ACL_PREFIX) {
            continue;
        }
        if let Some(key) = name.strip_prefix(PROPERTIES_PREFIX) {
            if let Ok(value) = value.to_str() {
                properties.insert(key.to_string(), value.to_string());
            }
        } else if name == CONTENT_ENCODING.as_str() {
            if let Ok(value) = value.to_str() {
                properties.insert(PROP_CONTENT_ENCODING.to_string(), value.to_string());
            }
        }
    }

    // Pass 2: standard headers fill the reserved names, first match
    // wins -- an explicit prefixed property always takes precedence.
    if !properties.contains_key(PROP_CHECKSUM) {
        if let Some(checksum) = response_checksum(headers) {
            properties.insert(PROP_CHECKSUM.to_string(), checksum);
        }
    }
    fill_from(&mut properties, PROP_SIZE, headers.get(CONTENT_LENGTH));
    fill_from(&mut properties, PROP_MODIFIED, headers.get(LAST_MODIFIED));
    fill_from(&mut properties, PROP_MIMETYPE, headers.get(CONTENT_TYPE));

    properties
}

/// Decode response headers into an ACL map. Entries with an
/// unrecognized access level are dropped.
pub fn decode_acls(headers: &HeaderMap) -> AclMap {
    let mut acls = AclMap::new();
    for (name, value) in headers {
        if let Some(principal) = name.as_str().strip_prefix(ACL_PREFIX) {
            if let Ok(level) = value.to_str().unwrap_or_default().parse::<AclType>() {
                acls.insert(principal.to_string(), level);
            }
        }
    }
    acls
}

/// Checksum echoed by the service: Content-MD5, falling back to the
/// entity tag with surrounding quotes stripped.
pub fn response_checksum(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(CONTENT_MD5) {
        if let Ok(value) = value.to_str() {
            return Some(value.to_string());
        }
    }
    headers
        .get(ETAG)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_matches('"').to_string())
}

fn prefixed_name(key: &str) -> Result<HeaderName, CodecError> {
    HeaderName::from_bytes(format!("{PROPERTIES_PREFIX}{key}").as_bytes())
        .map_err(|_| CodecError::InvalidKey(key.to_string()))
}

fn header_value(key: &str, value: &str) -> Result<HeaderValue, CodecError> {
    HeaderValue::from_str(value).map_err(|_| CodecError::InvalidValue(key.to_string()))
}

fn fill_from(properties: &mut Properties, key: &str, value: Option<&HeaderValue>) {
    if properties.contains_key(key) {
        return;
    }
    if let Some(value) = value.and_then(|v| v.to_str().ok()) {
        properties.insert(key.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_properties_round_trip() {
        let mut properties = Properties::new();
        properties.insert("department".to_string(), "imaging".to_string());
        properties.insert("reviewed".to_string(), "true".to_string());
        properties.insert(PROP_CONTENT_ENCODING.to_string(), "gzip".to_string());

        let headers = encode_properties(&properties).unwrap();
        assert!(headers.contains_key("x-silo-meta-department"));
        assert_eq!(headers.get(CONTENT_ENCODING).unwrap(), "gzip");

        assert_eq!(decode_properties(&headers), properties);
    }

    #[test]
    fn test_explicit_property_beats_standard_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-silo-meta-checksum", "aaa111".parse().unwrap());
        headers.insert(CONTENT_MD5, "bbb222".parse().unwrap());
        headers.insert(ETAG, "\"ccc333\"".parse().unwrap());
        headers.insert(CONTENT_LENGTH, "17".parse().unwrap());
        headers.insert(CONTENT_TYPE, "text/plain".parse().unwrap());

        let properties = decode_properties(&headers);
        assert_eq!(properties.get(PROP_CHECKSUM).unwrap(), "aaa111");
        assert_eq!(properties.get(PROP_SIZE).unwrap(), "17");
        assert_eq!(properties.get(PROP_MIMETYPE).unwrap(), "text/plain");
    }

    #[test]
    fn test_content_md5_beats_etag() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_MD5, "bbb222".parse().unwrap());
        headers.insert(ETAG, "\"ccc333\"".parse().unwrap());
        assert_eq!(response_checksum(&headers).unwrap(), "bbb222");

        let mut headers = HeaderMap::new();
        headers.insert(ETAG, "\"ccc333\"".parse().unwrap());
        assert_eq!(response_checksum(&headers).unwrap(), "ccc333");
    }

    #[test]
    fn test_acl_round_trip() {
        let mut acls = AclMap::new();
        acls.insert("alice".to_string(), AclType::Write);
        acls.insert("bob".to_string(), AclType::Read);

        let headers = encode_acls(&acls).unwrap();
        assert_eq!(headers.get("x-silo-meta-acl-alice").unwrap(), "WRITE");
        assert_eq!(decode_acls(&headers), acls);
    }

    #[test]
    fn test_acl_headers_are_not_properties() {
        let mut headers = HeaderMap::new();
        headers.insert("x-silo-meta-acl-alice", "WRITE".parse().unwrap());
        headers.insert("x-silo-meta-owner", "alice".parse().unwrap());

        let properties = decode_properties(&headers);
        assert_eq!(properties.len(), 1);
        assert_eq!(properties.get("owner").unwrap(), "alice");
    }

    #[test]
    fn test_unknown_acl_level_dropped() {
        let mut headers = HeaderMap::new();
        headers.insert("x-silo-meta-acl-alice", "OWNER".parse().unwrap());
        assert!(decode_acls(&headers).is_empty());
    }

    #[test]
    fn test_invalid_property_key_rejected() {
        let mut properties = Properties::new();
        properties.insert("bad key".to_string(), "value".to_string());
        assert!(encode_properties(&properties).is_err());
    }
}
