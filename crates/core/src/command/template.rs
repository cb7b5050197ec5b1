//! Positional `{}` templates

use crate::error::{Error, Result};

/// The positional placeholder token used by catalog templates
pub const PLACEHOLDER: &str = "{}";

/// Count the positional placeholders in a template
pub fn placeholder_count(template: &str) -> usize {
    template.matches(PLACEHOLDER).count()
}

/// Fill each placeholder, in order, with the matching value.
///
/// The value count must equal the placeholder count exactly; anything else is
/// a catalog defect and is reported as [`Error::TemplateMismatch`].
pub fn substitute(method: &str, template: &str, values: &[String]) -> Result<String> {
    let placeholders = placeholder_count(template);
    if placeholders != values.len() {
        return Err(Error::TemplateMismatch {
            method: method.to_string(),
            placeholders,
            values: values.len(),
        });
    }

    let mut out = String::with_capacity(template.len() + values.iter().map(String::len).sum::<usize>());
    let mut pieces = template.split(PLACEHOLDER);
    if let Some(head) = pieces.next() {
        out.push_str(head);
    }
    for (piece, value) in pieces.zip(values) {
        out.push_str(value);
        out.push_str(piece);
    }
    Ok(out)
}
