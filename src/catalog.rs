use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::parser::toc::Section;

/// Arity of a call signature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Parameters {
    pub required: usize,
    pub optional: usize,
    pub rest: bool,
}

/// A data or accessor property. `attributes` is a `wec` or `gsec` code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    pub name: String,
    pub attributes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Method {
    pub name: String,
    pub parameters: Parameters,
    pub attributes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Constructor {
    pub name: String,
    pub parameters: Parameters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Namespace {
    pub name: String,
    pub global: bool,
    pub static_properties: Vec<Property>,
    pub static_methods: Vec<Method>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub name: String,
    pub global: bool,
    pub constructor: Option<Constructor>,
    pub static_properties: Vec<Property>,
    pub static_methods: Vec<Method>,
    pub prototype_properties: Vec<Property>,
    pub prototype_methods: Vec<Method>,
    /// Shared between every sibling produced from one template.
    pub instance_properties: Arc<[Property]>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalProperty {
    pub name: String,
    pub attributes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Function {
    pub name: String,
    pub parameters: Parameters,
    pub global: bool,
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Binding {
    Namespace(Namespace),
    Class(Class),
    GlobalProperty(GlobalProperty),
    Function(Function),
}

impl Binding {
    pub fn name(&self) -> &str {
        match self {
            Binding::Namespace(n) => &n.name,
            Binding::Class(c) => &c.name,
            Binding::GlobalProperty(p) => &p.name,
            Binding::Function(f) => &f.name,
        }
    }

    pub fn is_global(&self) -> bool {
        match self {
            Binding::Namespace(n) => n.global,
            Binding::Class(c) => c.global,
            Binding::GlobalProperty(_) => true,
            Binding::Function(f) => f.global,
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub namespaces: usize,
    pub classes: usize,
    pub global_properties: usize,
    pub functions: usize,
    pub global: usize,
}

impl CatalogStats {
    pub fn of(catalog: &[Binding]) -> Self {
        let mut stats = CatalogStats::default();
        for binding in catalog {
            match binding {
                Binding::Namespace(_) => stats.namespaces += 1,
                Binding::Class(_) => stats.classes += 1,
                Binding::GlobalProperty(_) => stats.global_properties += 1,
                Binding::Function(_) => stats.functions += 1,
            }
            if binding.is_global() {
                stats.global += 1;
            }
        }
        stats
    }

    pub fn print(&self) {
        println!("Namespaces:        {}", self.namespaces);
        println!("Classes:           {}", self.classes);
        println!("Global properties: {}", self.global_properties);
        println!("Functions:         {}", self.functions);
        println!("Globally exposed:  {}", self.global);
    }
}

/// Pretty JSON with a trailing newline, so repeated runs are byte-identical.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    Ok(out)
}

pub async fn write_toc(path: &Path, toc: &[Rc<Section>]) -> Result<()> {
    let json = to_pretty_json(toc)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write TOC to {}", path.display()))?;
    info!("Wrote TOC ({} top-level clauses) to {}", toc.len(), path.display());
    Ok(())
}

pub async fn write_catalog(path: &Path, catalog: &[Binding]) -> Result<()> {
    let json = to_pretty_json(catalog)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write catalog to {}", path.display()))?;
    info!("Wrote {} catalog entries to {}", catalog.len(), path.display());
    Ok(())
}
