use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::attributes::{code, data_attributes};
use super::signature::{looks_like_signature, parse_signature};
use super::toc::Section;
use crate::catalog::{Method, Property};
use crate::document::Document;
use crate::error::{IntegrityError, Result};

static ABSTRACT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[A-Z][A-Za-z0-9]*\s*\(|`|.*Record$)").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Property(Property),
    Method(Method),
}

impl Member {
    pub fn name(&self) -> &str {
        match self {
            Member::Property(p) => &p.name,
            Member::Method(m) => &m.name,
        }
    }
}

/// Leaf clause describing an abstract operation or a spec-internal type
/// (`ToPrimitive ( ... )`, `` `sticky` ``, `Match Record`).
pub fn is_abstract_member(section: &Section) -> bool {
    section.is_leaf() && ABSTRACT_RE.is_match(&section.title)
}

/// A property or method clause: nothing below it but abstract operations,
/// or exactly one get/set pair.
pub fn is_bare(section: &Section) -> bool {
    is_accessor_pair(&section.children) || section.children.iter().all(|c| is_abstract_member(c))
}

fn accessor_half(title: &str) -> Option<(char, &str)> {
    title
        .strip_prefix("get ")
        .map(|base| ('g', base))
        .or_else(|| title.strip_prefix("set ").map(|base| ('s', base)))
}

fn is_accessor_pair(children: &[Rc<Section>]) -> bool {
    match children {
        [a, b] => match (accessor_half(&a.title), accessor_half(&b.title)) {
            (Some((ka, base_a)), Some((kb, base_b))) => {
                ka != kb && strip_all_spaces(base_a) == strip_all_spaces(base_b)
            }
            _ => false,
        },
        _ => false,
    }
}

fn strip_all_spaces(title: &str) -> String {
    title.split_whitespace().collect()
}

enum Classified {
    Member(Member),
    Accessor { name: String, get: bool, set: bool },
}

fn classify_one(doc: &Document, section: &Section) -> Result<Classified> {
    if !is_bare(section) {
        return Err(IntegrityError::NotBare(section.title.clone()));
    }

    if is_accessor_pair(&section.children) {
        return Ok(Classified::Accessor {
            name: strip_all_spaces(&section.title),
            get: true,
            set: true,
        });
    }

    if let Some((half, base)) = accessor_half(&section.title) {
        return Ok(Classified::Accessor {
            name: strip_all_spaces(base),
            get: half == 'g',
            set: half == 's',
        });
    }

    if looks_like_signature(&section.title) {
        let (name, parameters) = parse_signature(&section.title)?;
        let attributes = data_attributes(doc, &section.id)?;
        return Ok(Classified::Member(Member::Method(Method {
            name,
            parameters,
            attributes,
        })));
    }

    Ok(Classified::Member(Member::Property(Property {
        name: strip_all_spaces(&section.title),
        attributes: data_attributes(doc, &section.id)?,
    })))
}

/// Classify every member clause of a group, in order. Abstract-operation
/// leaves are not members and are skipped; separate `get X` / `set X`
/// clauses merge into one accessor property.
pub fn classify_members(doc: &Document, sections: &[Rc<Section>]) -> Result<Vec<Member>> {
    let mut members: Vec<Member> = Vec::new();
    let mut accessors: Vec<(usize, bool, bool)> = Vec::new();

    for section in sections {
        if is_abstract_member(section) {
            debug!("Skipping abstract operation '{}'", section.title);
            continue;
        }
        match classify_one(doc, section)? {
            Classified::Member(member) => members.push(member),
            Classified::Accessor { name, get, set } => {
                let existing = accessors
                    .iter_mut()
                    .find(|(idx, _, _)| members[*idx].name() == name);
                match existing {
                    Some((_, g, s)) => {
                        *g |= get;
                        *s |= set;
                    }
                    None => {
                        accessors.push((members.len(), get, set));
                        members.push(Member::Property(Property {
                            name,
                            attributes: String::new(),
                        }));
                    }
                }
            }
        }
    }

    for (idx, get, set) in accessors {
        if let Member::Property(p) = &mut members[idx] {
            p.attributes = code(&[('g', get), ('s', set), ('c', true)]);
        }
    }
    Ok(members)
}

/// Split classified members into (properties, methods).
pub fn partition(members: Vec<Member>) -> (Vec<Property>, Vec<Method>) {
    let mut properties = Vec::new();
    let mut methods = Vec::new();
    for member in members {
        match member {
            Member::Property(p) => properties.push(p),
            Member::Method(m) => methods.push(m),
        }
    }
    (properties, methods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::toc::{build_toc, leaf, section};

    const WC: &str = "<p>This function has the attributes { [[Writable]]: true, [[Enumerable]]: false, [[Configurable]]: true }.</p>";
    const NONE: &str = "<p>This property has the attributes { [[Writable]]: false, [[Enumerable]]: false, [[Configurable]]: false }.</p>";

    fn group() -> (Document, Rc<Section>) {
        let html = format!(
            r#"<emu-clause id="sec-props"><h1>Properties of the Map Prototype Object</h1>
                 <emu-clause id="sec-map.prototype.get"><h1>Map.prototype.get ( key )</h1>{WC}</emu-clause>
                 <emu-clause id="sec-map.prototype.foreach"><h1>Map.prototype.forEach ( callbackfn [ , thisArg ] )</h1>
                   <emu-clause id="sec-helper"><h1>MapHelper ( x )</h1></emu-clause>
                 </emu-clause>
                 <emu-clause id="sec-map.prototype-@@tostringtag"><h1>Map.prototype [ @@toStringTag ]</h1>{NONE}</emu-clause>
                 <emu-clause id="sec-map.prototype.constructor"><h1>Map.prototype.constructor</h1></emu-clause>
                 <emu-clause id="sec-get-map.prototype.size"><h1>get Map.prototype.size</h1></emu-clause>
                 <emu-clause id="sec-map.prototype.__proto__"><h1>Map.prototype.__proto__</h1>
                   <emu-clause id="sec-get-proto"><h1>get Map.prototype.__proto__</h1></emu-clause>
                   <emu-clause id="sec-set-proto"><h1>set Map.prototype.__proto__</h1></emu-clause>
                 </emu-clause>
                 <emu-clause id="sec-get-x"><h1>get Map.prototype.x</h1></emu-clause>
                 <emu-clause id="sec-set-x"><h1>set Map.prototype.x</h1></emu-clause>
                 <emu-clause id="sec-internal"><h1>MapIteratorNext ( iter )</h1></emu-clause>
               </emu-clause>"#
        );
        let doc = Document::parse(&html);
        let toc = build_toc(&doc);
        let group = toc[0].clone();
        (doc, group)
    }

    #[test]
    fn classifies_each_member_kind() {
        let (doc, group) = group();
        let members = classify_members(&doc, &group.children).unwrap();
        let (properties, methods) = partition(members);

        let method_names: Vec<&str> = methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(method_names, vec!["Map.prototype.get()", "Map.prototype.forEach()"]);
        assert_eq!(methods[0].attributes, "wc");
        assert_eq!(methods[1].parameters.optional, 1);

        let props: Vec<(&str, &str)> = properties
            .iter()
            .map(|p| (p.name.as_str(), p.attributes.as_str()))
            .collect();
        assert_eq!(
            props,
            vec![
                ("Map.prototype[@@toStringTag]", ""),
                ("Map.prototype.constructor", "wc"),
                ("Map.prototype.size", "gc"),
                ("Map.prototype.__proto__", "gsc"),
                ("Map.prototype.x", "gsc"),
            ]
        );
    }

    #[test]
    fn bare_shapes() {
        assert!(is_bare(&leaf("Math.PI")));
        assert!(is_bare(&section(
            "Object.prototype.__proto__",
            vec![leaf("get Object.prototype.__proto__"), leaf("set Object.prototype.__proto__")]
        )));
        assert!(is_bare(&section("JSON.parse ( text [ , reviver ] )", vec![leaf("InternalizeJSONProperty ( holder, name, reviver )")])));
        assert!(is_bare(&section("RegExp.prototype.exec ( string )", vec![leaf("`lastIndex`"), leaf("Match Record")])));
        assert!(!is_bare(&section("Legacy Accessor Methods", vec![leaf("Object.prototype.__defineGetter__ ( P, getter )")])));
        assert!(!is_bare(&section(
            "Pair",
            vec![leaf("get A.b"), leaf("get A.b")]
        )));
    }

    #[test]
    fn nested_member_group_is_fatal() {
        let (doc, _) = group();
        let nested = section("Map.prototype.odd", vec![section("Inner", vec![leaf("deep")])]);
        assert_eq!(
            classify_members(&doc, &[nested]),
            Err(IntegrityError::NotBare("Map.prototype.odd".into()))
        );
    }
}
