use crate::compiler::template::Template;
use crate::store::Record;

/// Escape `&`, `<`, `>` and `"`. Single quotes are left alone.
pub fn html_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Instantiate the repeatable region once per task.
///
/// `index` is the position inside `batch`, not the global task number. Only
/// the first `${key}` occurrence of each column is substituted, and columns
/// are substituted one after another into the same text, so a value that
/// itself contains `${other}` is filled in by a later column. Every column
/// is also mirrored into a hidden `key__index` field so untouched task data
/// comes back with the submission.
pub fn render(template: &Template, batch: &[Record]) -> String {
    let mut out = String::from(&template.head);

    for (index, task) in batch.iter().enumerate() {
        let mut fragment = template.repeat.clone();
        for (key, value) in task {
            fragment = fragment.replacen(&format!("${{{key}}}"), &html_escape(value), 1);
        }
        fragment = fragment.replace("${index}", &index.to_string());

        for (key, value) in task {
            fragment.push_str(&format!(
                "<input type=hidden name='{key}__{index}' value=\"{}\" />",
                html_escape(value)
            ));
        }
        out.push_str(&fragment);
    }

    out.push_str(&template.tail);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_only_four_characters() {
        assert_eq!(html_escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;'&amp;'&lt;/a&gt;");
    }
}
