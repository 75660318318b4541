use crate::compiler::template::Template;
use crate::error::{Result, TurkError};
use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::debug;

static REPEAT_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<!--\s*localturk-repeat\s*-->").expect("marker regex"));

// Opening tags of form elements that submit a value.
static FORM_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(?:input|textarea|select)\s[^>]*>").expect("field regex"));

static NAME_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\s)name="([^"]+)""#).expect("name regex"));

pub struct Compiler;

impl Compiler {
    pub fn new() -> Self {
        Self
    }

    pub fn compile(&self, markup: &str) -> Result<Template> {
        // 1. Pass 1: Split on region markers
        let parts: Vec<&str> = REPEAT_MARKER.split(markup).collect();
        let (head, repeat, tail) = match parts.as_slice() {
            [whole] => ("", *whole, ""),
            [head, repeat, tail] => (*head, *repeat, *tail),
            _ => return Err(TurkError::Parse { markers: parts.len() - 1 }),
        };

        // 2. Pass 2: Give every named field an index suffix
        let repeat = index_field_names(repeat);
        debug!(
            head_len = head.len(),
            repeat_len = repeat.len(),
            tail_len = tail.len(),
            "Compiled template"
        );

        Ok(Template {
            head: head.to_string(),
            repeat,
            tail: tail.to_string(),
        })
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewrite `name="x"` to `name="x__${index}"` on each form field tag,
/// leaving every other byte untouched.
fn index_field_names(repeat: &str) -> String {
    FORM_FIELD
        .replace_all(repeat, |caps: &Captures| {
            NAME_ATTR
                .replacen(&caps[0], 1, "${1}name=\"${2}__$${index}\"")
                .into_owned()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renames_only_named_fields() {
        let out = index_field_names(r#"<input type="text" name="answer"> <input type="submit"> <b name="x">"#);
        assert_eq!(out, r#"<input type="text" name="answer__${index}"> <input type="submit"> <b name="x">"#);
    }

    #[test]
    fn ignores_prefixed_name_attributes() {
        let out = index_field_names(r#"<input data-name="d" name="n"/>"#);
        assert_eq!(out, r#"<input data-name="d" name="n__${index}"/>"#);
    }
}
