//! Passthrough aggregation
//!
//! Groups passthrough bodies by kind into one `templates/<kind>.yaml` file
//! per kind, in first-seen order.

use indexmap::IndexMap;
use tpl2helm_core::ChartFile;

use crate::kind;

/// Separator between documents of the same kind
pub const DOCUMENT_SEPARATOR: &str = "---\n";
pub const TEMPLATES_DIR: &str = "templates";
pub const TEMPLATE_EXTENSION: &str = "yaml";

/// Label-merged, re-encoded body of an object the classifier did not claim
#[derive(Debug, Clone, PartialEq)]
pub struct PassthroughBody {
    pub kind: String,
    pub body: Vec<u8>,
}

/// Output file name for a kind
pub fn template_name(kind: &str) -> String {
    format!("{}/{}.{}", TEMPLATES_DIR, kind.to_lowercase(), TEMPLATE_EXTENSION)
}

/// Concatenate passthrough bodies into one chart file per kind
pub fn aggregate(bodies: Vec<PassthroughBody>) -> Vec<ChartFile> {
    let mut groups: IndexMap<String, Vec<u8>> = IndexMap::new();

    for PassthroughBody { kind, body } in bodies {
        if kind::is_suppressed(&kind) {
            tracing::warn!("Dropping {} body that reached aggregation", kind);
            continue;
        }

        let data = groups.entry(kind).or_default();
        if !data.is_empty() {
            if !data.ends_with(b"\n") {
                data.push(b'\n');
            }
            data.extend_from_slice(DOCUMENT_SEPARATOR.as_bytes());
        }
        data.extend_from_slice(&body);
    }

    groups
        .into_iter()
        .map(|(kind, data)| ChartFile::new(template_name(&kind), data))
        .collect()
}
