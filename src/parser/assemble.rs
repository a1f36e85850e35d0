use std::collections::HashSet;
use std::rc::Rc;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::debug;

use super::classify::{classify_members, is_bare, partition};
use super::reclassify::is_abstract_group;
use super::signature::{looks_like_signature, parse_signature};
use super::toc::Section;
use crate::catalog::{Binding, Class, Constructor, Method, Namespace, Property};
use crate::document::Document;
use crate::error::{IntegrityError, Result};

static VALUE_PROPERTIES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Value Properties of ").unwrap());
static FUNCTION_PROPERTIES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Function Properties of ").unwrap());
static STATIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Properties of (?:the )?.+ (?:Constructors?|Intrinsic Object)$").unwrap()
});
static PROTOTYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Properties of (?:the )?.+ Prototype Objects?$").unwrap());
static INSTANCES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Properties of (?:the )?.+ Instances$").unwrap());
static CONSTRUCTOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^The .+ (?:Constructors?|Intrinsic Object)$").unwrap());
static PARENTHETICAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\([^)]*\)").unwrap());

/// One catalog entry per reclassified group.
pub fn assemble(doc: &Document, group: &Section) -> Result<Binding> {
    if group.title.ends_with("Object") {
        assemble_namespace(doc, group).map(Binding::Namespace)
    } else {
        assemble_class(doc, group).map(Binding::Class)
    }
}

/// `The Math Object` → `Math`, `The %IteratorPrototype% Object` → `%IteratorPrototype%`.
pub fn namespace_name(title: &str) -> String {
    let name = title.strip_prefix("The ").unwrap_or(title);
    name.strip_suffix(" Object").unwrap_or(name).trim().to_string()
}

/// `Array Objects` → `Array`, `RegExp (Regular Expression) Objects` → `RegExp`,
/// `_NativeError_ Object Structure` → `_NativeError_`.
pub fn class_name(title: &str) -> String {
    let name = title
        .strip_suffix(" Object Structure")
        .or_else(|| title.strip_suffix(" Objects"))
        .unwrap_or(title);
    PARENTHETICAL_RE.replace_all(name, "").trim().to_string()
}

fn marker<'a>(group: &'a Section, re: &Regex, label: &'static str) -> Result<Option<&'a Rc<Section>>> {
    let mut matches = group.children.iter().filter(|c| re.is_match(&c.title));
    let first = matches.next();
    if matches.next().is_some() {
        return Err(IntegrityError::AmbiguousGroup {
            group: group.title.clone(),
            marker: label,
        });
    }
    Ok(first)
}

fn members_of(doc: &Document, subgroup: Option<&Rc<Section>>) -> Result<(Vec<Property>, Vec<Method>)> {
    match subgroup {
        Some(s) => classify_members(doc, &s.children).map(partition),
        None => Ok((Vec::new(), Vec::new())),
    }
}

fn only_properties(group: &Section, (properties, methods): (Vec<Property>, Vec<Method>)) -> Result<Vec<Property>> {
    match methods.first() {
        Some(m) => Err(IntegrityError::MisplacedMember {
            group: group.title.clone(),
            expected: "properties",
            name: m.name.clone(),
        }),
        None => Ok(properties),
    }
}

fn only_methods(group: &Section, (properties, methods): (Vec<Property>, Vec<Method>)) -> Result<Vec<Method>> {
    match properties.first() {
        Some(p) => Err(IntegrityError::MisplacedMember {
            group: group.title.clone(),
            expected: "methods",
            name: p.name.clone(),
        }),
        None => Ok(methods),
    }
}

fn assemble_namespace(doc: &Document, group: &Section) -> Result<Namespace> {
    let name = namespace_name(&group.title);
    let values = marker(group, &VALUE_PROPERTIES_RE, "Value Properties of")?;
    let functions = marker(group, &FUNCTION_PROPERTIES_RE, "Function Properties of")?;

    let (static_properties, static_methods) = if values.is_none() && functions.is_none() {
        // No structural markers: read the direct member clauses. Only calls
        // normalize to a `Name()` form, so this splits on the `()` suffix.
        let bare: Vec<Rc<Section>> = group
            .children
            .iter()
            .filter(|c| !is_abstract_group(&c.title) && is_bare(c))
            .cloned()
            .collect();
        partition(classify_members(doc, &bare)?)
    } else {
        let properties = match values {
            Some(v) => only_properties(v, members_of(doc, Some(v))?)?,
            None => Vec::new(),
        };
        let methods = match functions {
            Some(f) => only_methods(f, members_of(doc, Some(f))?)?,
            None => Vec::new(),
        };
        (properties, methods)
    };

    debug!(
        "Namespace {}: {} properties, {} methods",
        name,
        static_properties.len(),
        static_methods.len()
    );
    Ok(Namespace {
        name,
        global: false,
        static_properties,
        static_methods,
    })
}

fn assemble_class(doc: &Document, group: &Section) -> Result<Class> {
    let name = class_name(&group.title);

    let (static_properties, static_methods) = members_of(doc, marker(group, &STATIC_RE, "Properties of … Constructor")?)?;
    let (prototype_properties, prototype_methods) =
        members_of(doc, marker(group, &PROTOTYPE_RE, "Properties of … Prototype Object")?)?;
    let instance_properties = match marker(group, &INSTANCES_RE, "Properties of … Instances")? {
        Some(instances) => only_properties(instances, members_of(doc, Some(instances))?)?,
        None => Vec::new(),
    };

    let shared: HashSet<&str> = static_properties
        .iter()
        .chain(&prototype_properties)
        .map(|p| p.name.as_str())
        .collect();
    if let Some(clash) = instance_properties.iter().find(|p| shared.contains(p.name.as_str())) {
        return Err(IntegrityError::OverlappingMember {
            class: name,
            name: clash.name.clone(),
        });
    }

    let constructor = match marker(group, &CONSTRUCTOR_RE, "The … Constructor")? {
        Some(ctor) => constructor(ctor)?,
        None => None,
    };

    debug!(
        "Class {}: {} static, {} prototype, {} instance members",
        name,
        static_properties.len() + static_methods.len(),
        prototype_properties.len() + prototype_methods.len(),
        instance_properties.len()
    );
    Ok(Class {
        name,
        global: false,
        constructor,
        static_properties,
        static_methods,
        prototype_properties,
        prototype_methods,
        instance_properties: Arc::from(instance_properties),
    })
}

fn constructor(group: &Section) -> Result<Option<Constructor>> {
    let Some(first) = group.children.first() else {
        return Ok(None);
    };
    if !looks_like_signature(&first.title) {
        return Err(IntegrityError::BadSignature(first.title.clone()));
    }
    let (name, parameters) = parse_signature(&first.title)?;
    Ok(Some(Constructor { name, parameters }))
}
