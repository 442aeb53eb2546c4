//! Dotted field-path whitelists, compiled into a keep/recurse tree.
//!
//! A path spec like `["user.screen_name", "text"]` compiles into a
//! [`PathTree`] that the projector walks alongside the JSON document.
//! A field registered with no suffix is a [`PathNode::Leaf`] (keep the
//! whole subtree untouched); a field registered with a dotted suffix is
//! a [`PathNode::Node`] (keep the field, but filter inside it).

use std::collections::HashMap;

/// Default whitelist for "safe" display use: enough to read the tweet and
/// attribute it, without the account metadata that rides along in the raw
/// payload.
pub const DEFAULT_FIELDS: &[&str] = &[
    "id",
    "id_str",
    "created_at",
    "text",
    "full_text",
    "lang",
    "retweet_count",
    "favorite_count",
    "in_reply_to_status_id_str",
    "in_reply_to_screen_name",
    "coordinates",
    "user.id_str",
    "user.screen_name",
    "user.name",
    "place.full_name",
    "place.country_code",
    "entities.hashtags",
    "entities.urls",
    "entities.user_mentions",
    "entities.media",
];

/// One entry in a [`PathTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathNode {
    /// Keep this field and everything beneath it, unfiltered.
    Leaf,

    /// Keep this field, but recurse filtering into its value.
    Node(PathTree),
}

impl PathNode {
    /// The nested tree, if this entry recurses.
    #[must_use]
    pub const fn as_node(&self) -> Option<&PathTree> {
        match self {
            Self::Leaf => None,
            Self::Node(tree) => Some(tree),
        }
    }
}

/// A compiled field whitelist: field name to keep/recurse entry.
///
/// Invariant: at most one entry per field name per level, and a `Node`
/// entry is always the union of every dotted suffix registered under
/// that field. Once built, a tree is read-only and can be reused across
/// any number of projections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTree {
    entries: HashMap<String, PathNode>,
}

impl PathTree {
    /// Compile a list of dotted field paths into a tree.
    ///
    /// Merge rule when a field name appears more than once: nested
    /// specifications union their children, and a bare field name never
    /// demotes an existing nested entry back to "keep everything". The
    /// more specific registration always wins, regardless of order, so
    /// listing a field twice cannot accidentally widen it.
    pub fn build<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::default();
        for path in paths {
            tree.insert(path.as_ref());
        }
        tree
    }

    /// Register one dotted path.
    fn insert(&mut self, path: &str) {
        let path = path.trim();
        if path.is_empty() {
            return;
        }

        match path.split_once('.') {
            None => {
                // A bare name is a Leaf candidate. If the field already
                // recurses, the nested entry stands.
                self.entries
                    .entry(path.to_string())
                    .or_insert(PathNode::Leaf);
            }
            Some((head, rest)) if rest.trim().is_empty() => {
                // Trailing dot, e.g. "user." - treat as the bare name.
                self.insert(head);
            }
            Some((head, rest)) => {
                let entry = self
                    .entries
                    .entry(head.to_string())
                    .or_insert_with(|| PathNode::Node(Self::default()));
                match entry {
                    PathNode::Node(sub) => sub.insert(rest),
                    PathNode::Leaf => {
                        // An earlier bare registration is upgraded to a
                        // nested one.
                        let mut sub = Self::default();
                        sub.insert(rest);
                        *entry = PathNode::Node(sub);
                    }
                }
            }
        }
    }

    /// Look up the entry for a field name at this level.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&PathNode> {
        self.entries.get(field)
    }

    /// True if no fields are registered at this level.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of fields registered at this level.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Split free-text path input into individual paths.
///
/// Paths may be separated by commas or newlines; surrounding whitespace
/// is trimmed and empty entries dropped.
#[must_use]
pub fn parse_path_spec(text: &str) -> Vec<String> {
    text.split(|c: char| c == ',' || c == '\n' || c == '\r')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
