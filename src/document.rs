//! The loaded specification document.
//!
//! Parsing happens once; every later lookup (clauses by id, attribute
//! paragraphs, reference lists) goes through the id index built here.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};
use regex::Regex;
use tracing::debug;

use crate::error::{IntegrityError, Result};

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

pub struct Document {
    dom: RcDom,
    ids: HashMap<String, Handle>,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        let ids = index_ids(&dom.document);
        debug!("Indexed {} element ids", ids.len());
        Document { dom, ids }
    }

    pub fn root(&self) -> &Handle {
        &self.dom.document
    }

    /// Exact id lookup. Ids such as `sec-array.prototype.map` or
    /// `sec-get-regexp-@@species` are used verbatim, no selector escaping applies.
    pub fn element_by_id(&self, id: &str) -> Option<&Handle> {
        self.ids.get(id)
    }

    /// Collapsed text of every direct `<p>` child of the element with `id`.
    pub fn paragraphs(&self, id: &str) -> Result<Vec<String>> {
        let element = self
            .element_by_id(id)
            .ok_or_else(|| IntegrityError::MissingAnchor(id.to_string()))?;
        let paragraphs = element
            .children
            .borrow()
            .iter()
            .filter(|c| local_name(c) == Some("p"))
            .map(|p| collapse_whitespace(&text_content(p)))
            .collect();
        Ok(paragraphs)
    }

    /// Names defined by `<dfn>` terms under `anchor`, `%` wrappers stripped,
    /// in document order without repeats.
    pub fn reference_list(&self, anchor: &str) -> Result<Vec<String>> {
        let element = self
            .element_by_id(anchor)
            .ok_or_else(|| IntegrityError::MissingAnchor(anchor.to_string()))?;

        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for dfn in descendants(element).filter(|n| local_name(n) == Some("dfn")) {
            let text = collapse_whitespace(&text_content(&dfn));
            let name = text.trim_matches('%');
            if IDENTIFIER_RE.is_match(name) && seen.insert(name.to_string()) {
                names.push(name.to_string());
            }
        }

        if names.is_empty() {
            return Err(IntegrityError::EmptyReferenceList(anchor.to_string()));
        }
        debug!("Reference list '{}': {:?}", anchor, names);
        Ok(names)
    }
}

fn index_ids(root: &Handle) -> HashMap<String, Handle> {
    let mut ids = HashMap::new();
    for node in descendants(root) {
        if let Some(id) = attr(&node, "id") {
            ids.entry(id).or_insert(node);
        }
    }
    ids
}

/// Pre-order walk over every node below `root` (excluding `root`).
pub fn descendants(root: &Handle) -> impl Iterator<Item = Handle> {
    let mut stack: Vec<Handle> = root.children.borrow().iter().rev().cloned().collect();
    std::iter::from_fn(move || {
        let node = stack.pop()?;
        stack.extend(node.children.borrow().iter().rev().cloned());
        Some(node)
    })
}

pub fn local_name(node: &Node) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(&*name.local),
        _ => None,
    }
}

pub fn attr(node: &Node, key: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| &*a.name.local == key)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

pub fn has_class(node: &Node, class: &str) -> bool {
    attr(node, "class").is_some_and(|c| c.split_whitespace().any(|c| c == class))
}

pub fn text_content(node: &Node) -> String {
    let mut out = String::new();
    collect_text(node, &mut out, &|_| false);
    out
}

/// Text of `node`, skipping any element subtree for which `skip` returns true.
pub fn collect_text(node: &Node, out: &mut String, skip: &dyn Fn(&Node) -> bool) {
    match &node.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        NodeData::Element { .. } if skip(node) => {}
        _ => {
            for child in node.children.borrow().iter() {
                collect_text(child, out, skip);
            }
        }
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}
