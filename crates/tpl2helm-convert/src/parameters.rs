//! Parameter placeholder rewriting
//!
//! Template bodies reference parameters as `${NAME}` (string form) or
//! `${{NAME}}` (non-string form). Both become a `.Values` reference under
//! the lower-cased parameter name. Bodies are scanned once, left to right,
//! and a placeholder is only replaced when its name and closing braces match
//! exactly, so `${FOO}` never touches `${FOO_BAR}`.

use indexmap::IndexMap;
use std::collections::HashMap;
use tpl2helm_core::{ChartFile, Parameter};

use crate::error::{ConversionWarning, warnings};

/// File holding the include of the shared application template
pub const BASE_TEMPLATE_NAME: &str = "templates/basic_deployment.yaml";
pub const BASE_TEMPLATE_BODY: &str = "{{- include \"common.appSpec\" . -}}";

/// Values entry written for a parameter without a default
pub fn missing_default_marker(key: &str) -> String {
    format!("# TODO: must define a default value for .{}", key)
}

/// Values key of a parameter
pub fn value_key(name: &str) -> String {
    name.to_lowercase()
}

/// Template expression reading the value under `key`
pub fn value_reference(key: &str) -> String {
    if is_identifier(key) {
        format!("{{{{ .Values.{} }}}}", key)
    } else {
        format!("{{{{ index .Values \"{}\" }}}}", key)
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Result of rewriting parameters across the chart templates
#[derive(Debug, Clone, Default)]
pub struct RewriteOutput {
    /// One entry per parameter key, in declaration order
    pub values: IndexMap<String, String>,
    pub warnings: Vec<ConversionWarning>,
    /// Number of placeholders replaced across all bodies
    pub replaced: usize,
}

/// Rewrite every placeholder in `files`, append the base template and build
/// the flattened parameter values
pub fn rewrite(parameters: &[Parameter], files: &mut Vec<ChartFile>) -> RewriteOutput {
    let mut output = RewriteOutput::default();
    let mut references: HashMap<&str, String> = HashMap::with_capacity(parameters.len());

    for parameter in parameters {
        let key = value_key(&parameter.name);
        tracing::info!("Convert parameter {} to value .{}", parameter.name, key);

        references.insert(parameter.name.as_str(), value_reference(&key));

        if output.values.contains_key(&key) {
            output
                .warnings
                .push(warnings::duplicate_parameter(&parameter.name, &key));
        }

        if parameter.is_generated() {
            output.warnings.push(warnings::generated_parameter(
                &parameter.name,
                parameter.from.as_deref(),
            ));
        }

        let value = match parameter.default_value() {
            Some(value) => value.to_string(),
            None => {
                output
                    .warnings
                    .push(warnings::missing_default(&parameter.name, &key));
                missing_default_marker(&key)
            }
        };
        output.values.insert(key, value);
    }

    for file in files.iter_mut() {
        let (data, count) = replace_placeholders(&file.data, &references);
        if count > 0 {
            tracing::debug!("Replaced {} placeholders in {}", count, file.name);
            file.data = data;
            output.replaced += count;
        }
    }

    files.push(ChartFile::new(BASE_TEMPLATE_NAME, BASE_TEMPLATE_BODY));

    output
}

/// Single pass over `data`, replacing placeholders whose name is known
fn replace_placeholders(data: &[u8], references: &HashMap<&str, String>) -> (Vec<u8>, usize) {
    let mut out = Vec::with_capacity(data.len());
    let mut count = 0;
    let mut i = 0;

    while i < data.len() {
        if data[i] == b'$' {
            if let Some((name, len)) = placeholder(&data[i..]) {
                if let Some(reference) = references.get(name) {
                    out.extend_from_slice(reference.as_bytes());
                    count += 1;
                    i += len;
                    continue;
                }
            }
        }
        out.push(data[i]);
        i += 1;
    }

    (out, count)
}

/// Parse `${NAME}` or `${{NAME}}` at the start of `bytes`, returning the
/// name and the placeholder length
fn placeholder(bytes: &[u8]) -> Option<(&str, usize)> {
    if !bytes.starts_with(b"${") {
        return None;
    }

    let expanded = bytes.get(2) == Some(&b'{');
    let start = if expanded { 3 } else { 2 };
    let end = start + bytes[start..].iter().position(|&b| b == b'}')?;

    let name = std::str::from_utf8(&bytes[start..end]).ok()?;
    if name.is_empty() || name.contains(|c: char| c == '{' || c == '$' || c.is_whitespace()) {
        return None;
    }

    if expanded {
        (bytes.get(end + 1) == Some(&b'}')).then_some((name, end + 2))
    } else {
        Some((name, end + 1))
    }
}
