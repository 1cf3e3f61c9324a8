//! Selector tokens of the "jolly" VM expression language and matching of a
//! single token against a single VM record.
//!
//! ```text
//! token := '-'? ( 'all' | 'all-' NODE | NUMBER | NUMBER ':' NUMBER | NAME | '%'? NAME '%'? )
//! ```

use std::fmt;

use crate::types::VmRecord;

/// Keyword selecting every VM in the cluster.
pub const ALL: &str = "all";
/// Prefix selecting every VM on one node (`all-pve1`).
pub const ALL_ON_NODE_PREFIX: &str = "all-";
/// Marks a token whose matches are removed from the result.
pub const EXCLUSION_MARKER: char = '-';
/// Wildcard marker for name patterns.
pub const WILDCARD: char = '%';
/// Separator between the bounds of a numeric range.
pub const RANGE_SEPARATOR: char = ':';

/// Which part of a name a wildcard pattern must match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WildcardAnchor {
    /// `web%` - the name starts with the pattern
    Prefix,
    /// `%01` - the name ends with the pattern
    Suffix,
    /// `%web%` - the name contains the pattern
    Contains,
}

/// One fragment of a selector expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorToken {
    /// Every VM in the catalog.
    All,
    /// Every VM hosted on the named node.
    AllOnNode(String),
    /// The VM with this exact id.
    Id(u64),
    /// VMs whose id lies in `min..=max`.
    Range { min: u64, max: u64 },
    /// Case-insensitive exact name.
    Name(String),
    /// Case-insensitive wildcard name; `pattern` has the markers stripped.
    Wildcard {
        pattern: String,
        anchor: WildcardAnchor,
    },
    /// A token that can never match: a malformed range or a wildcard that
    /// only appears inside the name.
    Unmatchable(String),
    /// Records matched by the inner token are removed from the result.
    Exclude(Box<SelectorToken>),
}

impl SelectorToken {
    /// Parse one raw token. Parsing never fails; tokens that cannot select
    /// anything become [`SelectorToken::Unmatchable`].
    pub fn parse(raw: &str) -> Self {
        if let Some(inner) = raw.strip_prefix(EXCLUSION_MARKER) {
            return SelectorToken::Exclude(Box::new(Self::parse_inclusion(inner)));
        }
        Self::parse_inclusion(raw)
    }

    fn parse_inclusion(raw: &str) -> Self {
        if raw.is_empty() {
            return SelectorToken::Unmatchable(String::new());
        }
        if raw == ALL {
            return SelectorToken::All;
        }
        if let Some(node) = raw.strip_prefix(ALL_ON_NODE_PREFIX) {
            return SelectorToken::AllOnNode(node.to_string());
        }
        if raw.contains(RANGE_SEPARATOR) {
            return Self::parse_range(raw);
        }
        if let Ok(id) = raw.parse::<u64>() {
            return SelectorToken::Id(id);
        }
        if raw.contains(WILDCARD) {
            return Self::parse_wildcard(raw);
        }
        SelectorToken::Name(raw.to_lowercase())
    }

    fn parse_range(raw: &str) -> Self {
        let bounds: Vec<&str> = raw.split(RANGE_SEPARATOR).collect();
        match bounds.as_slice() {
            [min, max] => match (min.parse::<u64>(), max.parse::<u64>()) {
                (Ok(min), Ok(max)) => SelectorToken::Range { min, max },
                _ => SelectorToken::Unmatchable(raw.to_string()),
            },
            _ => SelectorToken::Unmatchable(raw.to_string()),
        }
    }

    fn parse_wildcard(raw: &str) -> Self {
        let pattern = raw.replace(WILDCARD, "").to_lowercase();
        let anchor = match (raw.starts_with(WILDCARD), raw.ends_with(WILDCARD)) {
            (true, true) => WildcardAnchor::Contains,
            (false, true) => WildcardAnchor::Prefix,
            (true, false) => WildcardAnchor::Suffix,
            (false, false) => return SelectorToken::Unmatchable(raw.to_string()),
        };
        SelectorToken::Wildcard { pattern, anchor }
    }

    /// Whether this token removes records instead of adding them.
    pub fn is_exclusion(&self) -> bool {
        matches!(self, SelectorToken::Exclude(_))
    }
}

impl fmt::Display for SelectorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorToken::All => f.write_str(ALL),
            SelectorToken::AllOnNode(node) => write!(f, "{}{}", ALL_ON_NODE_PREFIX, node),
            SelectorToken::Id(id) => write!(f, "{}", id),
            SelectorToken::Range { min, max } => write!(f, "{}{}{}", min, RANGE_SEPARATOR, max),
            SelectorToken::Name(name) => f.write_str(name),
            SelectorToken::Wildcard { pattern, anchor } => match anchor {
                WildcardAnchor::Prefix => write!(f, "{}{}", pattern, WILDCARD),
                WildcardAnchor::Suffix => write!(f, "{}{}", WILDCARD, pattern),
                WildcardAnchor::Contains => write!(f, "{}{}{}", WILDCARD, pattern, WILDCARD),
            },
            SelectorToken::Unmatchable(raw) => f.write_str(raw),
            SelectorToken::Exclude(inner) => write!(f, "{}{}", EXCLUSION_MARKER, inner),
        }
    }
}

/// Check whether `record` is selected by `token`.
///
/// Group tokens (`all`, `all-<node>`) match every record they cover. An
/// exclusion token matches what its inner token matches.
pub fn matches(record: &VmRecord, token: &SelectorToken) -> bool {
    match token {
        SelectorToken::All => true,
        SelectorToken::AllOnNode(node) => record.node == *node,
        SelectorToken::Id(id) => record.vmid == *id,
        SelectorToken::Range { min, max } => (*min..=*max).contains(&record.vmid),
        SelectorToken::Name(name) => record.name.to_lowercase() == *name,
        SelectorToken::Wildcard { pattern, anchor } => {
            let name = record.name.to_lowercase();
            match anchor {
                WildcardAnchor::Prefix => name.starts_with(pattern.as_str()),
                WildcardAnchor::Suffix => name.ends_with(pattern.as_str()),
                WildcardAnchor::Contains => name.contains(pattern.as_str()),
            }
        }
        SelectorToken::Unmatchable(_) => false,
        SelectorToken::Exclude(inner) => matches(record, inner),
    }
}

/// Parse `raw` and match it against `record` in one step.
pub fn matches_str(record: &VmRecord, raw: &str) -> bool {
    matches(record, &SelectorToken::parse(raw))
}
