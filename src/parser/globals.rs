use std::collections::HashSet;
use std::rc::Rc;

use tracing::info;

use super::attributes::data_attributes;
use super::signature::parse_signature;
use super::toc::Section;
use crate::catalog::{Binding, Function, GlobalProperty};
use crate::document::Document;
use crate::error::{expect_title, IntegrityError, Result};

pub const GLOBAL_OBJECT: &str = "The Global Object";
const GLOBAL_GROUPS: [&str; 4] = [
    "Value Properties of the Global Object",
    "Function Properties of the Global Object",
    "Constructor Properties of the Global Object",
    "Other Properties of the Global Object",
];
const URI_FUNCTIONS: &str = "URI Handling Functions";

/// Locate the global object clause at the top level or anywhere below it.
pub fn find_global_object(toc: &[Rc<Section>]) -> Result<&Rc<Section>> {
    toc.iter()
        .find(|s| s.title == GLOBAL_OBJECT)
        .or_else(|| toc.iter().find_map(|s| s.descendant(GLOBAL_OBJECT)))
        .ok_or_else(|| IntegrityError::MissingSection(GLOBAL_OBJECT.to_string()))
}

/// Flag the classes and namespaces the global object exposes, then append
/// the global value properties and global functions.
pub fn propagate_globals(doc: &Document, global: &Section, catalog: &mut Vec<Binding>) -> Result<()> {
    let [values, functions, constructors, others] = match global.children.as_slice() {
        [a, b, c, d] => [a, b, c, d],
        children => {
            return Err(IntegrityError::ChildCount {
                title: global.title.clone(),
                expected: GLOBAL_GROUPS.len(),
                found: children.len(),
            })
        }
    };
    for (group, expected) in [values, functions, constructors, others].iter().zip(GLOBAL_GROUPS) {
        expect_title(&group.title, expected)?;
    }

    for ctor in &constructors.children {
        let (call, _) = parse_signature(&ctor.title)?;
        let name = call.trim_end_matches("()");
        flag(catalog, name, "constructor")?;
    }
    for other in &others.children {
        flag(catalog, other.title.trim(), "namespace")?;
    }

    let mut properties = Vec::with_capacity(values.children.len());
    for value in &values.children {
        properties.push(Binding::GlobalProperty(GlobalProperty {
            name: value.title.split_whitespace().collect(),
            attributes: data_attributes(doc, &value.id)?,
        }));
    }

    let mut global_functions = Vec::new();
    for function in &functions.children {
        if function.title == URI_FUNCTIONS {
            for leaf in function.children.iter().filter(|c| starts_lowercase(&c.title)) {
                global_functions.push(global_function(leaf)?);
            }
        } else {
            global_functions.push(global_function(function)?);
        }
    }

    info!(
        "Global object: {} constructors, {} namespaces, {} properties, {} functions",
        constructors.children.len(),
        others.children.len(),
        properties.len(),
        global_functions.len()
    );
    catalog.extend(properties);
    catalog.extend(global_functions);
    Ok(())
}

fn starts_lowercase(title: &str) -> bool {
    title.chars().next().is_some_and(|c| c.is_lowercase())
}

fn global_function(section: &Section) -> Result<Binding> {
    let (name, parameters) = parse_signature(&section.title)?;
    Ok(Binding::Function(Function {
        name,
        parameters,
        global: true,
    }))
}

fn flag(catalog: &mut [Binding], name: &str, kind: &'static str) -> Result<()> {
    let target = catalog.iter_mut().find_map(|b| match b {
        Binding::Class(c) if kind == "constructor" && c.name == name => Some(&mut c.global),
        Binding::Namespace(n) if kind == "namespace" && n.name == name => Some(&mut n.global),
        _ => None,
    });
    match target {
        Some(global) => {
            *global = true;
            Ok(())
        }
        None => Err(IntegrityError::UnmatchedGlobal {
            kind,
            name: name.to_string(),
        }),
    }
}

/// Every catalog name must be unique once templates are expanded and the
/// global entries appended.
pub fn check_unique(catalog: &[Binding]) -> Result<()> {
    let mut seen = HashSet::new();
    for binding in catalog {
        if !seen.insert(binding.name()) {
            return Err(IntegrityError::DuplicateName(binding.name().to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Class, Namespace};
    use crate::parser::toc::build_toc;
    use std::sync::Arc;

    fn class(name: &str) -> Binding {
        Binding::Class(Class {
            name: name.into(),
            global: false,
            constructor: None,
            static_properties: vec![],
            static_methods: vec![],
            prototype_properties: vec![],
            prototype_methods: vec![],
            instance_properties: Arc::from(Vec::new()),
        })
    }

    fn namespace(name: &str) -> Binding {
        Binding::Namespace(Namespace {
            name: name.into(),
            global: false,
            static_properties: vec![],
            static_methods: vec![],
        })
    }

    fn global_html(constructors: &str) -> String {
        format!(
            r#"<emu-clause id="sec-global-object"><h1>The Global Object</h1>
                 <emu-clause id="sec-vp"><h1>Value Properties of the Global Object</h1>
                   <emu-clause id="sec-globalthis"><h1>globalThis</h1>
                     <p>It has the attributes {{ [[Writable]]: true, [[Enumerable]]: false, [[Configurable]]: true }}.</p></emu-clause>
                   <emu-clause id="sec-value-properties-of-the-global-object-nan"><h1>NaN</h1>
                     <p>This property has the attributes {{ [[Writable]]: false, [[Enumerable]]: false, [[Configurable]]: false }}.</p></emu-clause>
                 </emu-clause>
                 <emu-clause id="sec-fp"><h1>Function Properties of the Global Object</h1>
                   <emu-clause id="sec-eval-x"><h1>eval ( x )</h1>
                     <emu-clause id="sec-performeval"><h1>PerformEval ( x, strictCaller, direct )</h1></emu-clause></emu-clause>
                   <emu-clause id="sec-parseint-string-radix"><h1>parseInt ( string, radix )</h1></emu-clause>
                   <emu-clause id="sec-uri"><h1>URI Handling Functions</h1>
                     <emu-clause id="sec-encode"><h1>Encode ( string, extraUnescaped )</h1></emu-clause>
                     <emu-clause id="sec-decodeuri"><h1>decodeURI ( encodedURI )</h1></emu-clause>
                     <emu-clause id="sec-encodeuricomponent"><h1>encodeURIComponent ( uriComponent )</h1></emu-clause>
                   </emu-clause>
                 </emu-clause>
                 <emu-clause id="sec-cp"><h1>Constructor Properties of the Global Object</h1>{constructors}</emu-clause>
                 <emu-clause id="sec-op"><h1>Other Properties of the Global Object</h1>
                   <emu-clause id="sec-math"><h1>Math</h1></emu-clause>
                 </emu-clause>
               </emu-clause>"#
        )
    }

    fn run(html: &str, catalog: &mut Vec<Binding>) -> Result<()> {
        let doc = Document::parse(html);
        let toc = build_toc(&doc);
        let global = find_global_object(&toc)?;
        propagate_globals(&doc, global, catalog)
    }

    #[test]
    fn flags_and_synthesizes_globals() {
        let html = global_html(
            r#"<emu-clause id="sec-array"><h1>Array ( . . . )</h1></emu-clause>
               <emu-clause id="sec-int8"><h1>Int8Array ( . . . )</h1></emu-clause>"#,
        );
        let mut catalog = vec![class("Array"), class("Int8Array"), class("Hidden"), namespace("Math")];
        run(&html, &mut catalog).unwrap();

        let flags: Vec<(&str, bool)> = catalog.iter().map(|b| (b.name(), b.is_global())).collect();
        assert_eq!(
            flags,
            vec![
                ("Array", true),
                ("Int8Array", true),
                ("Hidden", false),
                ("Math", true),
                ("globalThis", true),
                ("NaN", true),
                ("eval()", true),
                ("parseInt()", true),
                ("decodeURI()", true),
                ("encodeURIComponent()", true),
            ]
        );
        match &catalog[5] {
            Binding::GlobalProperty(p) => assert_eq!(p.attributes, ""),
            other => panic!("unexpected {:?}", other),
        }
        match &catalog[7] {
            Binding::Function(f) => assert_eq!(f.parameters.required, 2),
            other => panic!("unexpected {:?}", other),
        }
        assert!(check_unique(&catalog).is_ok());
    }

    #[test]
    fn unmatched_constructor_aborts() {
        let html = global_html(r#"<emu-clause id="sec-foo"><h1>Foo ( . . . )</h1></emu-clause>"#);
        let mut catalog = vec![namespace("Math")];
        assert_eq!(
            run(&html, &mut catalog),
            Err(IntegrityError::UnmatchedGlobal {
                kind: "constructor",
                name: "Foo".into()
            })
        );
    }

    #[test]
    fn constructor_names_do_not_match_namespaces() {
        let html = global_html(r#"<emu-clause id="sec-m"><h1>Math ( . . . )</h1></emu-clause>"#);
        let mut catalog = vec![namespace("Math")];
        assert!(matches!(
            run(&html, &mut catalog),
            Err(IntegrityError::UnmatchedGlobal { kind: "constructor", .. })
        ));
    }

    #[test]
    fn unmatched_namespace_aborts() {
        let html = global_html("");
        let mut catalog = vec![];
        assert_eq!(
            run(&html, &mut catalog),
            Err(IntegrityError::UnmatchedGlobal {
                kind: "namespace",
                name: "Math".into()
            })
        );
    }

    #[test]
    fn global_object_needs_four_groups() {
        let html = r#"<emu-clause id="g"><h1>The Global Object</h1>
                        <emu-clause id="v"><h1>Value Properties of the Global Object</h1></emu-clause>
                      </emu-clause>"#;
        assert_eq!(
            run(html, &mut vec![]),
            Err(IntegrityError::ChildCount {
                title: GLOBAL_OBJECT.into(),
                expected: 4,
                found: 1
            })
        );
    }

    #[test]
    fn duplicate_names_are_fatal() {
        let catalog = vec![class("Array"), namespace("Array")];
        assert_eq!(
            check_unique(&catalog),
            Err(IntegrityError::DuplicateName("Array".into()))
        );
    }
}
