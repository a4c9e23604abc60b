//! Metadata the runtime does not report, recovered from the static descriptor.
//!
//! Runtimes expose enum properties without their enum type, and nested
//! instances often without their blueprint name. Both are looked up in the
//! descriptor, with deterministic fallbacks when the lookup misses.

use hashbrown::HashMap;
use log::debug;

use crate::descriptor::{BlueprintDescriptor, DocumentDescriptor};
use crate::kind::PropertyKind;
use crate::runtime::ViewModelInstance;

/// Name-indexed view over every blueprint in a descriptor. The definitions
/// catalog wins over artboard blueprints of the same name.
#[derive(Debug, Default)]
pub struct BlueprintCatalog<'a> {
    descriptor: Option<&'a DocumentDescriptor>,
    by_name: HashMap<&'a str, &'a BlueprintDescriptor>,
}

/// Inputs to the nested-blueprint lookup chain.
pub struct NestedLookup<'s> {
    pub parent_blueprint: Option<&'s str>,
    pub property: &'s str,
    pub instance: &'s dyn ViewModelInstance,
}

type NestedSource = for<'c, 's> fn(&BlueprintCatalog<'c>, &NestedLookup<'s>) -> Option<String>;

/// Ordered sources for a nested instance's blueprint name. The property name
/// is the final fallback and always succeeds.
pub const NESTED_BLUEPRINT_SOURCES: [(&str, NestedSource); 2] = [
    ("parent declaration", from_parent_declaration),
    ("instance name", from_instance_name),
];

impl<'a> BlueprintCatalog<'a> {
    pub fn new(descriptor: Option<&'a DocumentDescriptor>) -> Self {
        let mut by_name = HashMap::new();
        if let Some(doc) = descriptor {
            for bp in doc.blueprints() {
                by_name.entry(bp.blueprint_name.as_str()).or_insert(bp);
            }
        }
        Self {
            descriptor,
            by_name,
        }
    }

    pub fn descriptor(&self) -> Option<&'a DocumentDescriptor> {
        self.descriptor
    }

    pub fn blueprint(&self, name: &str) -> Option<&'a BlueprintDescriptor> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Enum type of `property` on `blueprint`, or the property name itself
    /// when the descriptor has no record of it.
    pub fn enum_type_name(&self, blueprint: Option<&str>, property: &str) -> String {
        let recorded = blueprint
            .and_then(|bp| self.blueprint(bp))
            .and_then(|bp| bp.property(property))
            .and_then(|p| p.enum_type_name.as_deref())
            .filter(|name| !name.is_empty());
        match recorded {
            Some(name) => name.to_string(),
            None => {
                debug!(
                    "metadata: no enum type recorded for `{}` on blueprint {:?}; \
                     keying it by property name",
                    property, blueprint
                );
                property.to_string()
            }
        }
    }

    /// Blueprint name for a nested instance reached through `lookup.property`.
    pub fn nested_blueprint_name(&self, lookup: &NestedLookup<'_>) -> String {
        self.known_nested_blueprint(lookup).unwrap_or_else(|| {
            debug!(
                "metadata: nested `{}` has no known blueprint; using the property name",
                lookup.property
            );
            lookup.property.to_string()
        })
    }

    /// Like [`Self::nested_blueprint_name`], but `None` when only the
    /// property-name fallback would apply.
    pub fn known_nested_blueprint(&self, lookup: &NestedLookup<'_>) -> Option<String> {
        NESTED_BLUEPRINT_SOURCES.iter().find_map(|(label, source)| {
            let name = source(self, lookup)?;
            debug!(
                "metadata: nested `{}` resolved to blueprint `{}` via {}",
                lookup.property, name, label
            );
            Some(name)
        })
    }

    /// Value names of an enum type, when the descriptor lists them.
    pub fn enum_values(&self, enum_type_name: &str) -> Option<&'a [String]> {
        enum_values(self.descriptor?, enum_type_name)
    }
}

fn from_parent_declaration(
    catalog: &BlueprintCatalog<'_>,
    lookup: &NestedLookup<'_>,
) -> Option<String> {
    let parent = catalog.blueprint(lookup.parent_blueprint?)?;
    let declared = parent.property(lookup.property)?;
    if declared.kind != PropertyKind::ViewModel {
        return None;
    }
    declared
        .view_model_name
        .clone()
        .filter(|name| !name.is_empty())
}

fn from_instance_name(
    _catalog: &BlueprintCatalog<'_>,
    lookup: &NestedLookup<'_>,
) -> Option<String> {
    lookup.instance.name().filter(|name| !name.is_empty())
}

/// Enum type of `property_name` on `blueprint_name`, falling back to the
/// property name.
pub fn resolve_enum_type_name(
    descriptor: Option<&DocumentDescriptor>,
    blueprint_name: &str,
    property_name: &str,
) -> String {
    BlueprintCatalog::new(descriptor).enum_type_name(Some(blueprint_name), property_name)
}

/// Blueprint name of a nested instance reached through `property` on
/// `parent_blueprint`.
pub fn resolve_nested_blueprint_name(
    descriptor: Option<&DocumentDescriptor>,
    parent_blueprint: Option<&str>,
    property: &str,
    instance: &dyn ViewModelInstance,
) -> String {
    BlueprintCatalog::new(descriptor).nested_blueprint_name(&NestedLookup {
        parent_blueprint,
        property,
        instance,
    })
}

/// Ordered value names of `enum_type_name`, when the document lists them.
pub fn enum_values<'d>(
    descriptor: &'d DocumentDescriptor,
    enum_type_name: &str,
) -> Option<&'d [String]> {
    descriptor.enums.get(enum_type_name).map(Vec::as_slice)
}
