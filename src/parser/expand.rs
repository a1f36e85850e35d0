use std::sync::Arc;

use tracing::info;

use crate::catalog::{Binding, Class, Constructor, Method, Property};
use crate::error::{IntegrityError, Result};

pub const TYPED_ARRAY_PLACEHOLDER: &str = "_TypedArray_";
pub const NATIVE_ERROR_PLACEHOLDER: &str = "_NativeError_";

/// A parametrized class and the concrete names it stands for.
pub struct Template {
    pub placeholder: &'static str,
    pub names: Vec<String>,
}

/// Copy of `class` with every occurrence of `placeholder` in its own name and
/// its constructor, static and prototype member names replaced. Instance
/// properties are shared with the template.
pub fn substitute(class: &Class, placeholder: &str, replacement: &str) -> Class {
    let rename = |name: &str| name.replace(placeholder, replacement);
    let properties = |list: &[Property]| -> Vec<Property> {
        list.iter()
            .map(|p| Property {
                name: rename(&p.name),
                attributes: p.attributes.clone(),
            })
            .collect()
    };
    let methods = |list: &[Method]| -> Vec<Method> {
        list.iter()
            .map(|m| Method {
                name: rename(&m.name),
                parameters: m.parameters,
                attributes: m.attributes.clone(),
            })
            .collect()
    };

    Class {
        name: rename(&class.name),
        global: class.global,
        constructor: class.constructor.as_ref().map(|c| Constructor {
            name: rename(&c.name),
            parameters: c.parameters,
        }),
        static_properties: properties(&class.static_properties),
        static_methods: methods(&class.static_methods),
        prototype_properties: properties(&class.prototype_properties),
        prototype_methods: methods(&class.prototype_methods),
        instance_properties: Arc::clone(&class.instance_properties),
    }
}

/// Replace each template class, in place, by one sibling per concrete name.
pub fn expand_templates(catalog: Vec<Binding>, templates: &[Template]) -> Result<Vec<Binding>> {
    for template in templates {
        let found = catalog
            .iter()
            .filter(|b| matches!(b, Binding::Class(c) if c.name == template.placeholder))
            .count();
        if found != 1 {
            return Err(IntegrityError::MissingSection(format!(
                "exactly one '{}' template class (found {})",
                template.placeholder, found
            )));
        }
    }

    let mut expanded = Vec::with_capacity(catalog.len());
    for binding in catalog {
        let template = match &binding {
            Binding::Class(c) => templates.iter().find(|t| c.name == t.placeholder).map(|t| (c, t)),
            _ => None,
        };
        match template {
            Some((class, template)) => {
                info!(
                    "Expanding {} into {} classes",
                    template.placeholder,
                    template.names.len()
                );
                expanded.extend(
                    template
                        .names
                        .iter()
                        .map(|name| Binding::Class(substitute(class, template.placeholder, name))),
                );
            }
            None => expanded.push(binding),
        }
    }
    Ok(expanded)
}
