use std::sync::LazyLock;

use regex::Regex;

use crate::document::Document;
use crate::error::{IntegrityError, Result};

const MARKER: &str = "has the attributes";

/// Writable, not enumerable, configurable: what a data property gets when
/// its clause carries no attributes paragraph.
pub const DEFAULT_DATA_ATTRIBUTES: &str = "wc";

static ATTRIBUTES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\{\s*\[\[Writable\]\]:\s*(true|false),\s*\[\[Enumerable\]\]:\s*(true|false),\s*\[\[Configurable\]\]:\s*(true|false)\s*\}",
    )
    .unwrap()
});

/// The `wec` code declared by the section's attributes paragraph, or `None`
/// when it has none.
pub fn attribute_code(doc: &Document, id: &str) -> Result<Option<String>> {
    let paragraphs: Vec<String> = doc
        .paragraphs(id)?
        .into_iter()
        .filter(|p| p.contains(MARKER))
        .collect();

    match paragraphs.as_slice() {
        [] => Ok(None),
        [sentence] => parse_sentence(id, sentence).map(Some),
        _ => Err(IntegrityError::AmbiguousAttributes {
            id: id.to_string(),
            count: paragraphs.len(),
        }),
    }
}

/// [`attribute_code`] with the data-property default applied.
pub fn data_attributes(doc: &Document, id: &str) -> Result<String> {
    Ok(attribute_code(doc, id)?.unwrap_or_else(|| DEFAULT_DATA_ATTRIBUTES.to_string()))
}

fn parse_sentence(id: &str, sentence: &str) -> Result<String> {
    let caps = ATTRIBUTES_RE
        .captures(sentence)
        .ok_or_else(|| IntegrityError::MalformedAttributes {
            id: id.to_string(),
            text: sentence.to_string(),
        })?;
    let flag = |i: usize| &caps[i] == "true";
    Ok(code(&[('w', flag(1)), ('e', flag(2)), ('c', flag(3))]))
}

/// Letters whose flag holds, in the given order.
pub fn code(flags: &[(char, bool)]) -> String {
    flags.iter().filter(|(_, set)| *set).map(|(c, _)| *c).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with(paragraphs: &[&str]) -> Document {
        let body: String = paragraphs.iter().map(|p| format!("<p>{}</p>", p)).collect();
        Document::parse(&format!(
            r#"<emu-clause id="sec-math.pi"><h1>Math.PI</h1>{}</emu-clause>"#,
            body
        ))
    }

    fn sentence(w: &str, e: &str, c: &str) -> String {
        format!(
            "This property has the attributes {{ [[Writable]]: <emu-val>{}</emu-val>, [[Enumerable]]: {}, [[Configurable]]: {} }}.",
            w, e, c
        )
    }

    #[test]
    fn writable_configurable() {
        let doc = doc_with(&["The value.", &sentence("true", "false", "true")]);
        assert_eq!(attribute_code(&doc, "sec-math.pi").unwrap().as_deref(), Some("wc"));
    }

    #[test]
    fn all_false_is_empty_code() {
        let doc = doc_with(&[&sentence("false", "false", "false")]);
        assert_eq!(attribute_code(&doc, "sec-math.pi").unwrap().as_deref(), Some(""));
    }

    #[test]
    fn all_true() {
        let doc = doc_with(&[&sentence("true", "true", "true")]);
        assert_eq!(data_attributes(&doc, "sec-math.pi").unwrap(), "wec");
    }

    #[test]
    fn missing_paragraph_defaults_for_data_properties() {
        let doc = doc_with(&["Just prose."]);
        assert_eq!(attribute_code(&doc, "sec-math.pi").unwrap(), None);
        assert_eq!(data_attributes(&doc, "sec-math.pi").unwrap(), "wc");
    }

    #[test]
    fn two_paragraphs_are_fatal() {
        let s = sentence("true", "false", "true");
        let doc = doc_with(&[&s, &s]);
        assert_eq!(
            attribute_code(&doc, "sec-math.pi"),
            Err(IntegrityError::AmbiguousAttributes {
                id: "sec-math.pi".into(),
                count: 2
            })
        );
    }

    #[test]
    fn sentence_off_template_is_fatal() {
        let doc = doc_with(&["It has the attributes { [[Enumerable]]: false, [[Configurable]]: true }."]);
        assert!(matches!(
            attribute_code(&doc, "sec-math.pi"),
            Err(IntegrityError::MalformedAttributes { .. })
        ));
    }

    #[test]
    fn code_keeps_fixed_order() {
        assert_eq!(code(&[('g', true), ('s', false), ('e', false), ('c', true)]), "gc");
    }
}
