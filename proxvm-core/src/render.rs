//! Canonical text rendering of configuration maps.
//!
//! ```text
//! #description
//! cores: 2
//! memory: 2048
//!
//! [snap1]
//! cores: 1
//! ```

use crate::config::value_text;
use crate::types::{ConfigMap, SnapshotConfig};

/// Key whose value is rendered as a leading comment.
pub const DESCRIPTION_KEY: &str = "description";

const LINE_TERMINATOR: &str = "\n";

/// Render one configuration block.
///
/// The description comes first as a single `#` line with its value
/// unchanged, every other key follows
/// in ordinal order as `key: value`. A non-blank `section` adds a `[section]`
/// header. Every line, including the last, ends with a newline.
pub fn render_config(config: &ConfigMap, section: Option<&str>) -> String {
    let mut out = String::new();

    if let Some(name) = section.filter(|name| !name.trim().is_empty()) {
        push_line(&mut out, &format!("[{}]", name));
    }

    if let Some(description) = config.get(DESCRIPTION_KEY) {
        push_line(&mut out, &format!("#{}", value_text(description)));
    }

    let mut keys: Vec<&String> = config.keys().filter(|k| *k != DESCRIPTION_KEY).collect();
    keys.sort();
    for key in keys {
        push_line(&mut out, &format!("{}: {}", key, value_text(&config[key.as_str()])));
    }

    out
}

/// Render the live configuration followed by one section per snapshot.
///
/// `snapshots` must already be ordered oldest first. Blocks are separated by
/// an empty line.
pub fn aggregate_all_configs(current: &ConfigMap, snapshots: &[SnapshotConfig]) -> String {
    std::iter::once(render_config(current, None))
        .chain(
            snapshots
                .iter()
                .map(|snapshot| render_config(&snapshot.config, Some(&snapshot.name))),
        )
        .collect::<Vec<_>>()
        .join(LINE_TERMINATOR)
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push_str(LINE_TERMINATOR);
}
