//! Writers for the building blocks shared by most elements.

use std::fmt::Display;

use ipxact_core::{
    AccessPolicy, Assertion, Choice, DefinitionRef, DocumentData, MemoryArray, ModeReference,
    NameGroup, Parameter, Revision, Vlnv, VlnvType, XmlElement, XmlNode,
};

use crate::profile::SchemaProfile;

/// New `ipxact:` element.
pub(crate) fn element(local: &str) -> XmlElement {
    XmlElement::new(SchemaProfile::tag(local))
}

/// Append `<ipxact:local>value</ipxact:local>` unless `value` is empty.
pub(crate) fn push_text(parent: &mut XmlElement, local: &str, value: &str) {
    parent.push_text_element(SchemaProfile::tag(local), value);
}

/// Append a text element even when `value` is empty.
pub(crate) fn push_required(parent: &mut XmlElement, local: &str, value: &str) {
    parent.push(XmlElement::with_text(SchemaProfile::tag(local), value));
}

pub(crate) fn push_bool(parent: &mut XmlElement, local: &str, value: Option<bool>) {
    if let Some(value) = value {
        push_required(parent, local, if value { "true" } else { "false" });
    }
}

pub(crate) fn push_keyword<T: Display>(parent: &mut XmlElement, local: &str, value: Option<T>) {
    if let Some(value) = value {
        push_required(parent, local, &value.to_string());
    }
}

/// Set an attribute unless `value` is empty.
pub(crate) fn set_attribute(element: &mut XmlElement, name: &str, value: &str) {
    if !value.is_empty() {
        element.set_attribute(name, value);
    }
}

/// Append a name group. `name` is always written.
pub fn write_name_group(parent: &mut XmlElement, group: &NameGroup, profile: &SchemaProfile) {
    push_required(parent, "name", &group.name);
    push_text(parent, "displayName", &group.display_name);
    if profile.has_short_description {
        push_text(parent, "shortDescription", &group.short_description);
    }
    push_text(parent, "description", &group.description);
}

/// Append `isPresent` where the revision defines it.
pub(crate) fn push_is_present(parent: &mut XmlElement, is_present: &str, profile: &SchemaProfile) {
    if profile.has_is_present {
        push_text(parent, "isPresent", is_present);
    }
}

/// Append a `vendorExtensions` element holding `extensions` verbatim.
pub fn write_vendor_extensions(parent: &mut XmlElement, extensions: &[XmlNode]) {
    if extensions.is_empty() {
        return;
    }
    let mut list = element("vendorExtensions");
    list.children = extensions.to_vec();
    parent.push(list);
}

fn range(list: &str, item: &str, left: &str, right: &str) -> Option<XmlElement> {
    if left.is_empty() && right.is_empty() {
        return None;
    }
    let mut range = element(item);
    push_required(&mut range, "left", left);
    push_required(&mut range, "right", right);
    let mut list = element(list);
    list.push(range);
    Some(list)
}

/// One `parameter` element.
pub fn write_parameter(parameter: &Parameter, profile: &SchemaProfile) -> XmlElement {
    let mut out = element("parameter");
    set_attribute(&mut out, "parameterId", &parameter.value_id);
    set_attribute(&mut out, "resolve", &parameter.resolve);
    set_attribute(&mut out, "type", &parameter.parameter_type);
    set_attribute(&mut out, "choiceRef", &parameter.choice_ref);
    set_attribute(&mut out, "minimum", &parameter.minimum);
    set_attribute(&mut out, "maximum", &parameter.maximum);

    write_name_group(&mut out, &parameter.name_group, profile);
    if let Some(vectors) = range("vectors", "vector", &parameter.vector_left, &parameter.vector_right) {
        out.push(vectors);
    }
    if let Some(arrays) = range("arrays", "array", &parameter.array_left, &parameter.array_right) {
        out.push(arrays);
    }
    push_required(&mut out, "value", &parameter.value);
    write_vendor_extensions(&mut out, &parameter.vendor_extensions);
    out
}

/// Append a `parameters` list unless it is empty.
pub fn write_parameters(parent: &mut XmlElement, parameters: &[Parameter], profile: &SchemaProfile) {
    if parameters.is_empty() {
        return;
    }
    let mut list = element("parameters");
    for parameter in parameters {
        list.push(write_parameter(parameter, profile));
    }
    parent.push(list);
}

/// Append a `choices` list unless it is empty.
pub fn write_choices(parent: &mut XmlElement, choices: &[Choice]) {
    if choices.is_empty() {
        return;
    }
    let mut list = element("choices");
    for choice in choices {
        let mut out = element("choice");
        push_required(&mut out, "name", &choice.name);
        for enumeration in &choice.enumerations {
            let mut item = XmlElement::with_text(SchemaProfile::tag("enumeration"), enumeration.value.as_str());
            set_attribute(&mut item, "text", &enumeration.text);
            set_attribute(&mut item, "help", &enumeration.help);
            out.push(item);
        }
        list.push(out);
    }
    parent.push(list);
}

/// Append an `assertions` list unless it is empty.
pub fn write_assertions(parent: &mut XmlElement, assertions: &[Assertion], profile: &SchemaProfile) {
    if assertions.is_empty() {
        return;
    }
    let mut list = element("assertions");
    for assertion in assertions {
        let mut out = element("assertion");
        write_name_group(&mut out, &assertion.name_group, profile);
        push_required(&mut out, "assert", &assertion.assert);
        write_vendor_extensions(&mut out, &assertion.vendor_extensions);
        list.push(out);
    }
    parent.push(list);
}

pub fn write_mode_refs(parent: &mut XmlElement, mode_refs: &[ModeReference]) {
    for mode_ref in mode_refs {
        let mut out = XmlElement::with_text(SchemaProfile::tag("modeRef"), mode_ref.reference.as_str());
        set_attribute(&mut out, "priority", &mode_ref.priority);
        parent.push(out);
    }
}

/// Append `accessPolicies` where the revision defines them.
pub fn write_access_policies(parent: &mut XmlElement, policies: &[AccessPolicy], profile: &SchemaProfile) {
    if !profile.has_access_policies || policies.is_empty() {
        return;
    }
    let mut list = element("accessPolicies");
    for policy in policies {
        let mut out = element("accessPolicy");
        write_mode_refs(&mut out, &policy.mode_refs);
        push_keyword(&mut out, "access", policy.access);
        write_vendor_extensions(&mut out, &policy.vendor_extensions);
        list.push(out);
    }
    parent.push(list);
}

/// Append array dimensions: an `array` element in Std22, bare `dim`
/// elements in Std14.
pub fn write_memory_array(parent: &mut XmlElement, array: Option<&MemoryArray>, stride_tag: &str, profile: &SchemaProfile) {
    let Some(array) = array else {
        return;
    };
    if profile.has_memory_arrays {
        let mut out = element("array");
        for dimension in &array.dimensions {
            let mut dim = XmlElement::with_text(SchemaProfile::tag("dim"), dimension.value.as_str());
            set_attribute(&mut dim, "indexVar", &dimension.index_var);
            out.push(dim);
        }
        push_text(&mut out, stride_tag, &array.stride);
        parent.push(out);
    } else {
        for dimension in &array.dimensions {
            push_required(parent, "dim", &dimension.value);
        }
    }
}

/// Append a `...DefinitionRef` element where the revision defines it.
/// Returns whether it was written.
pub(crate) fn push_definition_ref(
    parent: &mut XmlElement,
    local: &str,
    reference: Option<&DefinitionRef>,
    profile: &SchemaProfile,
) -> bool {
    match reference {
        Some(reference) if profile.has_definition_refs => {
            let mut out = XmlElement::with_text(SchemaProfile::tag(local), reference.name.as_str());
            set_attribute(&mut out, "typeDefinitions", &reference.type_definitions);
            parent.push(out);
            true
        }
        _ => false,
    }
}

/// An element carrying a VLNV in attributes, e.g. `extends` or `busType`.
pub(crate) fn vlnv_element(local: &str, vlnv: &Vlnv) -> XmlElement {
    element(local)
        .attr("vendor", vlnv.vendor.as_str())
        .attr("library", vlnv.library.as_str())
        .attr("name", vlnv.name.as_str())
        .attr("version", vlnv.version.as_str())
}

/// Root attributes: the standard set for documents built in memory, the
/// ones read with the document otherwise.
///
/// IP-XACT namespace declarations of another revision are renamed to the
/// target revision and the `ipxact` prefix is always declared. The schema location is kept only when
/// the revision is unchanged.
fn root_attributes(data: &DocumentData, profile: &SchemaProfile) -> Vec<(String, String)> {
    let ipxact = format!("xmlns:{}", crate::profile::PREFIX);
    if data.root_attributes.is_empty() {
        return vec![
            ("xmlns:xsi".to_string(), crate::profile::XSI_NAMESPACE.to_string()),
            (ipxact, profile.namespace.to_string()),
            ("xmlns:kactus2".to_string(), crate::profile::KACTUS2_NAMESPACE.to_string()),
            ("xsi:schemaLocation".to_string(), profile.schema_location.to_string()),
        ];
    }

    let mut attributes: Vec<(String, String)> = data
        .root_attributes
        .iter()
        .map(|(key, value)| {
            let is_declaration = key == "xmlns" || key.starts_with("xmlns:");
            let declared = SchemaProfile::revision_for_namespace(value);
            let value = if is_declaration && declared != Revision::Unknown && declared != profile.revision {
                profile.namespace.to_string()
            } else if key == "xsi:schemaLocation" && data.revision != profile.revision {
                profile.schema_location.to_string()
            } else {
                value.clone()
            };
            (key.clone(), value)
        })
        .collect();

    if !attributes.iter().any(|(key, _)| *key == ipxact) {
        attributes.push((ipxact, profile.namespace.to_string()));
    }
    attributes
}

/// Root element with namespace declarations and the VLNV children.
pub(crate) fn document_root(kind: VlnvType, data: &DocumentData, profile: &SchemaProfile) -> XmlElement {
    let mut root = element(kind.as_str());
    root.attributes = root_attributes(data, profile);
    push_required(&mut root, "vendor", &data.vlnv.vendor);
    push_required(&mut root, "library", &data.vlnv.library);
    push_required(&mut root, "name", &data.vlnv.name);
    push_required(&mut root, "version", &data.vlnv.version);
    root
}

/// Document-level display name, short description, and description, in
/// the Std22 position after the VLNV.
pub(crate) fn push_document_name_group(root: &mut XmlElement, data: &DocumentData, profile: &SchemaProfile) {
    if profile.has_document_name_group {
        push_text(root, "displayName", &data.display_name);
        push_text(root, "shortDescription", &data.short_description);
        push_text(root, "description", &data.description);
    }
}

/// Std14 description position, after the kind-specific elements.
pub(crate) fn push_late_description(root: &mut XmlElement, data: &DocumentData, profile: &SchemaProfile) {
    if !profile.has_document_name_group {
        push_text(root, "description", &data.description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{STD14, STD22};
    use ipxact_core::Dimension;

    #[test]
    fn parameter_omits_unset_attributes() {
        let mut parameter = Parameter::new("width", "32");
        parameter.value_id = "id".into();
        parameter.vector_left = "7".into();
        parameter.vector_right = "0".into();
        let out = write_parameter(&parameter, &STD22);

        assert_eq!(out.name, "ipxact:parameter");
        assert_eq!(out.attributes, vec![("parameterId".to_string(), "id".to_string())]);
        let names: Vec<_> = out.elements().map(XmlElement::local_name).collect();
        assert_eq!(names, ["name", "vectors", "value"]);
    }

    #[test]
    fn memory_array_shape_follows_revision() {
        let array = MemoryArray {
            dimensions: vec![Dimension::new("4")],
            stride: "8".into(),
        };

        let mut std22 = element("register");
        write_memory_array(&mut std22, Some(&array), "stride", &STD22);
        let written = std22.child("array").unwrap();
        assert_eq!(written.child_text("dim").as_deref(), Some("4"));
        assert_eq!(written.child_text("stride").as_deref(), Some("8"));

        let mut std14 = element("register");
        write_memory_array(&mut std14, Some(&array), "stride", &STD14);
        assert!(std14.child("array").is_none());
        assert_eq!(std14.child_text("dim").as_deref(), Some("4"));
    }

    #[test]
    fn short_description_is_std22_only() {
        let mut group = NameGroup::new("n");
        group.short_description = "short".into();

        let mut out = element("e");
        write_name_group(&mut out, &group, &STD14);
        assert!(out.child("shortDescription").is_none());

        let mut out = element("e");
        write_name_group(&mut out, &group, &STD22);
        assert_eq!(out.child_text("shortDescription").as_deref(), Some("short"));
    }

    fn read_attributes(revision: Revision, schema_location: &str) -> DocumentData {
        let mut data = DocumentData::new(Vlnv::default(), revision);
        data.root_attributes = vec![
            ("xmlns:ipxact".into(), STD14.namespace.into()),
            ("xmlns:acme".into(), "http://acme.example/ext".into()),
            ("xsi:schemaLocation".into(), schema_location.into()),
            ("xmlns:xsi".into(), crate::profile::XSI_NAMESPACE.into()),
        ];
        data
    }

    #[test]
    fn root_keeps_the_attributes_it_was_read_with() {
        let location = "http://www.accellera.org/XMLSchema/IPXACT/1685-2014/ index.xsd";
        let data = read_attributes(Revision::Std14, location);
        let root = document_root(VlnvType::BusDefinition, &data, &STD14);
        assert_eq!(root.attribute("xmlns:acme"), Some("http://acme.example/ext"));
        assert_eq!(root.attribute("xsi:schemaLocation"), Some(location));
        assert_eq!(root.attributes, data.root_attributes);
    }

    #[test]
    fn ipxact_prefix_is_declared_when_missing() {
        let mut data = DocumentData::new(Vlnv::default(), Revision::Std22);
        data.root_attributes = vec![("xmlns".into(), STD22.namespace.into())];
        let root = document_root(VlnvType::Component, &data, &STD22);
        let keys: Vec<_> = root.attributes.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, ["xmlns", "xmlns:ipxact"]);
    }

    #[test]
    fn revision_change_renames_the_ipxact_namespace() {
        let data = read_attributes(Revision::Std14, "custom.xsd");
        let root = document_root(VlnvType::BusDefinition, &data, &STD22);
        assert_eq!(root.attribute("xmlns:ipxact"), Some(STD22.namespace));
        assert_eq!(root.attribute("xsi:schemaLocation"), Some(STD22.schema_location));
        assert_eq!(root.attribute("xmlns:acme"), Some("http://acme.example/ext"));
    }

    #[test]
    fn documents_built_in_memory_get_the_standard_declarations() {
        let data = DocumentData::new(Vlnv::default(), Revision::Std22);
        let root = document_root(VlnvType::Component, &data, &STD22);
        let keys: Vec<_> = root.attributes.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, ["xmlns:xsi", "xmlns:ipxact", "xmlns:kactus2", "xsi:schemaLocation"]);
    }
}
