use std::rc::Rc;

use markup5ever_rcdom::Handle;
use serde::Serialize;

use crate::document::{attr, collapse_whitespace, collect_text, has_class, local_name, Document};

const CLAUSE_TAGS: [&str; 2] = ["emu-clause", "emu-annex"];

/// One clause of the document outline. Children are reference-counted so
/// restructured trees can share untouched branches with the original.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: String,
    pub id: String,
    pub children: Vec<Rc<Section>>,
}

impl Section {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// First section anywhere below this one with exactly this title.
    pub fn descendant(&self, title: &str) -> Option<&Rc<Section>> {
        self.children
            .iter()
            .find_map(|c| if c.title == title { Some(c) } else { c.descendant(title) })
    }
}

/// Mirror the document's clause nesting. Nothing is filtered here.
pub fn build_toc(doc: &Document) -> Vec<Rc<Section>> {
    child_clauses(doc.root()).iter().map(build_section).collect()
}

fn build_section(clause: &Handle) -> Rc<Section> {
    Rc::new(Section {
        title: clause_title(clause),
        id: attr(clause, "id").unwrap_or_default(),
        children: child_clauses(clause).iter().map(build_section).collect(),
    })
}

/// Nearest clause descendants: wrappers such as `<div>` between two clauses
/// don't add a nesting level.
fn child_clauses(node: &Handle) -> Vec<Handle> {
    let mut clauses = Vec::new();
    for child in node.children.borrow().iter() {
        match local_name(child) {
            Some(tag) if CLAUSE_TAGS.contains(&tag) => clauses.push(child.clone()),
            Some(_) => clauses.extend(child_clauses(child)),
            None => {}
        }
    }
    clauses
}

fn clause_title(clause: &Handle) -> String {
    let heading = clause
        .children
        .borrow()
        .iter()
        .find(|c| local_name(c) == Some("h1"))
        .cloned();
    let Some(heading) = heading else {
        return String::new();
    };
    let mut text = String::new();
    collect_text(&heading, &mut text, &|n| has_class(n, "secnum"));
    collapse_whitespace(&text)
}

#[cfg(test)]
pub fn section(title: &str, children: Vec<Rc<Section>>) -> Rc<Section> {
    let id = format!(
        "sec-{}",
        title.to_lowercase().replace(|c: char| c.is_whitespace(), "-")
    );
    Rc::new(Section {
        title: title.to_string(),
        id,
        children,
    })
}

#[cfg(test)]
pub fn leaf(title: &str) -> Rc<Section> {
    section(title, vec![])
}
