//! Resolution of selector expressions against a VM catalog.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{ProxvmError, Result};
use crate::selector::{matches, SelectorToken};
use crate::types::VmRecord;

/// A parsed selector expression split into inclusion and exclusion tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    /// Tokens whose matches are added, in expression order
    pub include: Vec<SelectorToken>,
    /// Inner tokens of `-` fragments, whose matches are removed
    pub exclude: Vec<SelectorToken>,
}

impl Selector {
    /// Split a comma-separated expression into tokens.
    ///
    /// Fragments are trimmed; empty fragments are ignored.
    pub fn parse(expression: &str) -> Self {
        let mut selector = Selector::default();
        for raw in expression.split(',').map(str::trim).filter(|raw| !raw.is_empty()) {
            match SelectorToken::parse(raw) {
                SelectorToken::Exclude(inner) => selector.exclude.push(*inner),
                token => selector.include.push(token),
            }
        }
        selector
    }

    /// Resolve against `catalog`.
    ///
    /// The result holds no duplicates and keeps the order in which records
    /// were first selected. The catalog is never modified.
    pub fn resolve(&self, catalog: &[VmRecord]) -> Vec<VmRecord> {
        let mut selected: Vec<&VmRecord> = Vec::new();
        for token in &self.include {
            let found = select(catalog, token);
            if found.is_empty() {
                debug!(token = %token, "Selector token matched no VM");
            }
            selected.extend(found);
        }

        for token in &self.exclude {
            let excluded: HashSet<u64> = select(catalog, token).iter().map(|r| r.vmid).collect();
            selected.retain(|r| !excluded.contains(&r.vmid));
        }

        let mut seen = HashSet::new();
        selected
            .into_iter()
            .filter(|r| seen.insert(r.vmid))
            .cloned()
            .collect()
    }
}

/// Records selected by a single inclusion token.
///
/// Group tokens select every record they cover; any other token selects the
/// first matching record only.
fn select<'a>(catalog: &'a [VmRecord], token: &SelectorToken) -> Vec<&'a VmRecord> {
    match token {
        SelectorToken::All | SelectorToken::AllOnNode(_) => {
            catalog.iter().filter(|r| matches(r, token)).collect()
        }
        SelectorToken::Exclude(inner) => select(catalog, inner),
        _ => catalog.iter().find(|r| matches(r, token)).into_iter().collect(),
    }
}

/// Resolve a selector expression against a catalog.
pub fn resolve(catalog: &[VmRecord], expression: &str) -> Vec<VmRecord> {
    Selector::parse(expression).resolve(catalog)
}

/// Find the first record matching a single id, range, name or wildcard.
///
/// Group and exclusion syntax has no meaning here: `all`, `all-<node>` and
/// `-<token>` are looked up as literal names. Fails with
/// [`ProxvmError::NotFound`] when nothing matches.
pub fn resolve_one(catalog: &[VmRecord], id_or_name: &str) -> Result<VmRecord> {
    let raw = id_or_name.trim();
    let token = match SelectorToken::parse(raw) {
        SelectorToken::All | SelectorToken::AllOnNode(_) | SelectorToken::Exclude(_) => {
            SelectorToken::Name(raw.to_lowercase())
        }
        token => token,
    };
    catalog
        .iter()
        .find(|r| matches(r, &token))
        .cloned()
        .ok_or_else(|| ProxvmError::NotFound(id_or_name.to_string()))
}
