pub mod assemble;
pub mod attributes;
pub mod classify;
pub mod expand;
pub mod globals;
pub mod reclassify;
pub mod signature;
pub mod toc;

use std::rc::Rc;

use tracing::info;

use crate::catalog::Binding;
use crate::document::Document;
use crate::error::Result;
use expand::{Template, NATIVE_ERROR_PLACEHOLDER, TYPED_ARRAY_PLACEHOLDER};
use toc::Section;

/// Where the two reference lists live in the document.
#[derive(Debug, Clone)]
pub struct Anchors {
    pub typed_arrays: String,
    pub native_errors: String,
}

/// TOC → groups → descriptors → expanded templates → global flags.
pub fn build_catalog(doc: &Document, toc: &[Rc<Section>], anchors: &Anchors) -> Result<Vec<Binding>> {
    let global = globals::find_global_object(toc)?;
    let groups = reclassify::reclassify(toc)?;
    info!("Reclassified built-in chapters into {} groups", groups.len());

    let catalog = groups
        .iter()
        .map(|group| assemble::assemble(doc, group))
        .collect::<Result<Vec<_>>>()?;

    let templates = [
        Template {
            placeholder: TYPED_ARRAY_PLACEHOLDER,
            names: doc.reference_list(&anchors.typed_arrays)?,
        },
        Template {
            placeholder: NATIVE_ERROR_PLACEHOLDER,
            names: doc.reference_list(&anchors.native_errors)?,
        },
    ];
    let mut catalog = expand::expand_templates(catalog, &templates)?;

    globals::propagate_globals(doc, global, &mut catalog)?;
    globals::check_unique(&catalog)?;
    info!("Catalog holds {} bindings", catalog.len());
    Ok(catalog)
}
