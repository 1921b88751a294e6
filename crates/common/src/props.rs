use std::collections::BTreeMap;

/// Property mapping attached to spaces and content items.
///
/// A `BTreeMap` keeps iteration order deterministic, so the headers a
/// property set encodes into are stable across calls.
pub type Properties = BTreeMap<String, String>;

/// Hex MD5 digest of a content item, echoed by the service on writes.
pub const PROP_CHECKSUM: &str = "checksum";
/// Content size in bytes.
pub const PROP_SIZE: &str = "size";
/// Last-modified timestamp, as reported by the service.
pub const PROP_MODIFIED: &str = "modified";
/// Content mimetype.
pub const PROP_MIMETYPE: &str = "mimetype";
/// Content encoding; passes through unprefixed on the wire.
pub const PROP_CONTENT_ENCODING: &str = "content-encoding";

/// Space creation date.
pub const PROP_SPACE_CREATED: &str = "created";
/// Number of items in a space.
pub const PROP_SPACE_COUNT: &str = "count";
/// Space access mode (e.g. OPEN or CLOSED), owned by the service.
pub const PROP_SPACE_ACCESS: &str = "access";
