//! Cut the built-in object chapters out of the TOC and reshape the few
//! groups whose layout differs from the usual "X Objects" clause.

use std::rc::Rc;

use tracing::debug;

use super::toc::Section;
use crate::error::{expect_title, IntegrityError, Result};

pub const FIRST_CHAPTER: &str = "Fundamental Objects";
pub const LAST_CHAPTER: &str = "Reflection";

const NATIVE_ERROR_TYPES: &str = "Native Error Types Used in This Standard";
pub const NATIVE_ERROR_STRUCTURE: &str = "_NativeError_ Object Structure";
const TYPED_ARRAY_BOUNDARY: &str = "Abstract Operations for TypedArray Objects";
pub const TYPED_ARRAY_TEMPLATE: &str = "_TypedArray_ Objects";
const OBJECT_PROTOTYPE: &str = "Properties of the Object Prototype Object";
const LEGACY_ACCESSORS: &str = "Legacy Object.prototype Accessor Methods";
const ITERATION_GROUPS: [&str; 2] = [
    "The %IteratorPrototype% Object",
    "The %AsyncIteratorPrototype% Object",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rewrite {
    ErrorObjects,
    TypedArrayObjects,
    ObjectObjects,
    Iteration,
    Drop,
    Keep,
}

impl Rewrite {
    fn for_title(title: &str) -> Self {
        match title {
            "Error Objects" => Rewrite::ErrorObjects,
            "TypedArray Objects" => Rewrite::TypedArrayObjects,
            "Object Objects" => Rewrite::ObjectObjects,
            "Iteration" => Rewrite::Iteration,
            // Module namespaces have no constructor or global name to document.
            "Module Namespace Objects" => Rewrite::Drop,
            t if is_abstract_group(t) => Rewrite::Drop,
            _ => Rewrite::Keep,
        }
    }

    fn apply(self, group: &Rc<Section>) -> Result<Vec<Rc<Section>>> {
        match self {
            Rewrite::ErrorObjects => split_error_objects(group),
            Rewrite::TypedArrayObjects => split_typed_arrays(group),
            Rewrite::ObjectObjects => flatten_legacy_accessors(group).map(|g| vec![g]),
            Rewrite::Iteration => iteration_prototypes(group),
            Rewrite::Drop => Ok(vec![]),
            Rewrite::Keep => Ok(vec![Rc::clone(group)]),
        }
    }
}

/// A clause grouping abstract operations rather than documenting members.
pub fn is_abstract_group(title: &str) -> bool {
    title.starts_with("Abstract Operations")
}

/// One group per built-in object, in document order.
pub fn reclassify(toc: &[Rc<Section>]) -> Result<Vec<Rc<Section>>> {
    let chapters = chapter_range(toc)?;
    let mut groups = Vec::new();
    for chapter in chapters {
        for group in &chapter.children {
            let rewrite = Rewrite::for_title(&group.title);
            if rewrite != Rewrite::Keep {
                debug!("Rewriting '{}' as {:?}", group.title, rewrite);
            }
            groups.extend(rewrite.apply(group)?);
        }
    }
    Ok(groups)
}

fn chapter_range(toc: &[Rc<Section>]) -> Result<&[Rc<Section>]> {
    let position = |title: &str| {
        toc.iter()
            .position(|s| s.title == title)
            .ok_or_else(|| IntegrityError::MissingSection(title.to_string()))
    };
    let first = position(FIRST_CHAPTER)?;
    let last = position(LAST_CHAPTER)?;
    if last < first {
        return Err(IntegrityError::UnexpectedTitle {
            expected: FIRST_CHAPTER.to_string(),
            found: LAST_CHAPTER.to_string(),
        });
    }
    Ok(&toc[first..=last])
}

fn child_position(group: &Section, title: &str) -> Result<usize> {
    group
        .children
        .iter()
        .position(|c| c.title == title)
        .ok_or_else(|| IntegrityError::MissingSection(format!("{} > {}", group.title, title)))
}

fn with_children(group: &Section, title: &str, children: Vec<Rc<Section>>) -> Rc<Section> {
    Rc::new(Section {
        title: title.to_string(),
        id: group.id.clone(),
        children,
    })
}

/// `Error Objects` → [Error (up to the native error list), the `_NativeError_`
/// template, any later sibling groups such as AggregateError].
fn split_error_objects(group: &Rc<Section>) -> Result<Vec<Rc<Section>>> {
    let boundary = child_position(group, NATIVE_ERROR_TYPES)?;
    let template = group
        .children
        .get(boundary + 1)
        .ok_or_else(|| IntegrityError::MissingSection(NATIVE_ERROR_STRUCTURE.to_string()))?;
    expect_title(&template.title, NATIVE_ERROR_STRUCTURE)?;

    let mut groups = vec![
        with_children(group, &group.title, group.children[..boundary].to_vec()),
        Rc::clone(template),
    ];
    for sibling in &group.children[boundary + 2..] {
        groups.extend(Rewrite::for_title(&sibling.title).apply(sibling)?);
    }
    Ok(groups)
}

/// `TypedArray Objects` → [%TypedArray% intrinsic, `_TypedArray_` template].
fn split_typed_arrays(group: &Rc<Section>) -> Result<Vec<Rc<Section>>> {
    let boundary = child_position(group, TYPED_ARRAY_BOUNDARY)?;
    let template = group.children[boundary + 1..].to_vec();
    if template.is_empty() {
        return Err(IntegrityError::MissingSection(format!(
            "{} > clauses after '{}'",
            group.title, TYPED_ARRAY_BOUNDARY
        )));
    }
    Ok(vec![
        with_children(group, &group.title, group.children[..boundary].to_vec()),
        with_children(group, TYPED_ARRAY_TEMPLATE, template),
    ])
}

/// Lift the legacy `__defineGetter__`-style methods one level so they sit
/// beside the other prototype members.
fn flatten_legacy_accessors(group: &Rc<Section>) -> Result<Rc<Section>> {
    let index = child_position(group, OBJECT_PROTOTYPE)?;
    let prototype = &group.children[index];

    let mut members = Vec::with_capacity(prototype.children.len());
    for child in &prototype.children {
        if child.title == LEGACY_ACCESSORS {
            members.extend(child.children.iter().cloned());
        } else {
            members.push(Rc::clone(child));
        }
    }

    let mut children = group.children.clone();
    children[index] = with_children(prototype, &prototype.title, members);
    Ok(with_children(group, &group.title, children))
}

fn iteration_prototypes(group: &Rc<Section>) -> Result<Vec<Rc<Section>>> {
    ITERATION_GROUPS
        .iter()
        .map(|title| {
            group
                .descendant(title)
                .cloned()
                .ok_or_else(|| IntegrityError::MissingSection(format!("{} > {}", group.title, title)))
        })
        .collect()
}
