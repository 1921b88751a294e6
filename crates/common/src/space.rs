use serde::{Deserialize, Serialize};

use crate::props::Properties;

/// A named container of content items.
///
/// Built fresh from response data on every call; never cached or mutated
/// after construction. `contents` is always a single page of ids bounded
/// by the listing limit, never the full listing -- walk the whole space
/// through a `ContentIterator` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    pub id: String,
    pub properties: Properties,
    pub contents: Vec<String>,
}

impl Space {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            properties: Properties::new(),
            contents: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_round_trip() {
        let mut space = Space::new("photos");
        space.properties.insert("count".into(), "2".into());
        space.contents.push("cat.jpg".into());

        let json = serde_json::to_string(&space).unwrap();
        let back: Space = serde_json::from_str(&json).unwrap();
        assert_eq!(back, space);
    }
}
