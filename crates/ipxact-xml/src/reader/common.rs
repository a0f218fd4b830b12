//! Readers for the building blocks shared by most elements.

use std::str::FromStr;

use ipxact_core::{
    AccessPolicy, Assertion, Choice, DefinitionRef, DocumentData, Enumeration, MemoryArray,
    ModeReference, NameGroup, Parameter, Vlnv, VlnvType, XmlElement, XmlNode,
};

use super::ReadContext;

/// Text of a child element, empty when absent.
pub(crate) fn text(element: &XmlElement, local: &str) -> String {
    element.child_text(local).unwrap_or_default()
}

/// Name group of an element. A missing `name` is recorded as an issue.
pub fn read_name_group(element: &XmlElement, ctx: &mut ReadContext) -> NameGroup {
    let name = match element.child_text("name") {
        Some(name) => name,
        None => {
            ctx.issue(format!("{} has no name", element.local_name()));
            String::new()
        }
    };
    let short_description = ctx
        .child_if(element, "shortDescription", ctx.profile().has_short_description)
        .map(XmlElement::text)
        .unwrap_or_default();
    NameGroup {
        name,
        display_name: text(element, "displayName"),
        short_description,
        description: text(element, "description"),
    }
}

/// `isPresent` of an element, read only where the revision defines it.
pub(crate) fn read_is_present(element: &XmlElement, ctx: &ReadContext) -> String {
    ctx.child_if(element, "isPresent", ctx.profile().has_is_present)
        .map(XmlElement::text)
        .unwrap_or_default()
}

/// Tri-state boolean child.
pub(crate) fn read_bool(element: &XmlElement, local: &str, ctx: &mut ReadContext) -> Option<bool> {
    let value = element.child_text(local)?;
    parse_bool(&value, local, ctx)
}

pub(crate) fn parse_bool(value: &str, what: &str, ctx: &mut ReadContext) -> Option<bool> {
    match value.trim() {
        "true" => Some(true),
        "false" => Some(false),
        other => {
            ctx.issue(format!("invalid {what} value '{other}'"));
            None
        }
    }
}

/// Keyword child parsed into a closed vocabulary.
pub(crate) fn read_keyword<T>(element: &XmlElement, local: &str, ctx: &mut ReadContext) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value = element.child_text(local)?;
    parse_keyword(value.trim(), ctx)
}

pub(crate) fn parse_keyword<T>(value: &str, ctx: &mut ReadContext) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            ctx.issue(e.to_string());
            None
        }
    }
}

/// Children of `vendorExtensions`, kept verbatim.
pub fn read_vendor_extensions(element: &XmlElement) -> Vec<XmlNode> {
    element
        .child("vendorExtensions")
        .map(|extensions| extensions.children.clone())
        .unwrap_or_default()
}

/// One `parameter` element.
pub fn read_parameter(element: &XmlElement, ctx: &mut ReadContext) -> Parameter {
    let name_group = read_name_group(element, ctx);
    let attribute = |name: &str| element.attribute(name).unwrap_or_default().to_string();
    let bounds = |list: &str, item: &str| {
        element
            .child(list)
            .and_then(|list| list.child(item))
            .map(|range| (text(range, "left"), text(range, "right")))
            .unwrap_or_default()
    };
    let (vector_left, vector_right) = bounds("vectors", "vector");
    let (array_left, array_right) = bounds("arrays", "array");

    Parameter {
        name_group,
        value_id: attribute("parameterId"),
        parameter_type: attribute("type"),
        value: text(element, "value"),
        resolve: attribute("resolve"),
        choice_ref: attribute("choiceRef"),
        minimum: attribute("minimum"),
        maximum: attribute("maximum"),
        vector_left,
        vector_right,
        array_left,
        array_right,
        vendor_extensions: read_vendor_extensions(element),
    }
}

/// Parameters under a `parameters` child.
pub fn read_parameters(element: &XmlElement, ctx: &mut ReadContext) -> Vec<Parameter> {
    let Some(list) = element.child("parameters") else {
        return Vec::new();
    };
    list.children_named("parameter")
        .map(|parameter| read_parameter(parameter, ctx))
        .collect()
}

/// Choices under a `choices` child.
pub fn read_choices(element: &XmlElement) -> Vec<Choice> {
    let Some(list) = element.child("choices") else {
        return Vec::new();
    };
    list.children_named("choice")
        .map(|choice| Choice {
            name: text(choice, "name"),
            enumerations: choice
                .children_named("enumeration")
                .map(|enumeration| Enumeration {
                    value: enumeration.text(),
                    text: enumeration.attribute("text").unwrap_or_default().to_string(),
                    help: enumeration.attribute("help").unwrap_or_default().to_string(),
                })
                .collect(),
        })
        .collect()
}

/// Assertions under an `assertions` child.
pub fn read_assertions(element: &XmlElement, ctx: &mut ReadContext) -> Vec<Assertion> {
    let Some(list) = element.child("assertions") else {
        return Vec::new();
    };
    list.children_named("assertion")
        .map(|assertion| Assertion {
            name_group: read_name_group(assertion, ctx),
            assert: text(assertion, "assert"),
            vendor_extensions: read_vendor_extensions(assertion),
        })
        .collect()
}

/// `modeRef` children.
pub fn read_mode_refs(element: &XmlElement) -> Vec<ModeReference> {
    element
        .children_named("modeRef")
        .map(|mode_ref| {
            ModeReference::new(mode_ref.text(), mode_ref.attribute("priority").unwrap_or_default())
        })
        .collect()
}

/// Access policies under an `accessPolicies` child (Std22).
pub fn read_access_policies(element: &XmlElement, ctx: &mut ReadContext) -> Vec<AccessPolicy> {
    let allowed = ctx.profile().has_access_policies;
    let Some(list) = ctx.child_if(element, "accessPolicies", allowed) else {
        return Vec::new();
    };
    list.children_named("accessPolicy")
        .map(|policy| AccessPolicy {
            mode_refs: read_mode_refs(policy),
            access: read_keyword(policy, "access", ctx),
            vendor_extensions: read_vendor_extensions(policy),
        })
        .collect()
}

/// Array dimensions: the Std22 `array` child, or bare Std14 `dim` children.
pub fn read_memory_array(element: &XmlElement, stride_tag: &str, ctx: &ReadContext) -> Option<MemoryArray> {
    let (source, stride) = if ctx.profile().has_memory_arrays {
        let array = element.child("array")?;
        (array, text(array, stride_tag))
    } else {
        (element, String::new())
    };
    let dimensions: Vec<_> = source
        .children_named("dim")
        .map(|dim| ipxact_core::Dimension {
            value: dim.text(),
            index_var: dim.attribute("indexVar").unwrap_or_default().to_string(),
        })
        .collect();
    if dimensions.is_empty() && stride.is_empty() {
        return None;
    }
    Some(MemoryArray { dimensions, stride })
}

/// A `...DefinitionRef` child with its `typeDefinitions` attribute (Std22).
pub(crate) fn read_definition_ref(element: &XmlElement, local: &str, ctx: &ReadContext) -> Option<DefinitionRef> {
    let reference = ctx.child_if(element, local, ctx.profile().has_definition_refs)?;
    Some(DefinitionRef {
        type_definitions: reference.attribute("typeDefinitions").unwrap_or_default().to_string(),
        name: reference.text(),
    })
}

/// A VLNV held in `vendor`, `library`, `name`, and `version` attributes.
pub(crate) fn read_vlnv_attributes(element: &XmlElement, kind: VlnvType) -> Vlnv {
    let attribute = |name: &str| element.attribute(name).unwrap_or_default().to_string();
    Vlnv::new(
        kind,
        attribute("vendor"),
        attribute("library"),
        attribute("name"),
        attribute("version"),
    )
}

/// Shared document parts of a root element. Choices are read only when
/// `with_choices` is set.
pub(crate) fn read_document_data(
    root: &XmlElement,
    kind: VlnvType,
    with_choices: bool,
    ctx: &mut ReadContext,
) -> DocumentData {
    let vlnv = Vlnv::new(
        kind,
        text(root, "vendor"),
        text(root, "library"),
        text(root, "name"),
        text(root, "version"),
    );
    if !vlnv.is_valid() {
        ctx.issue(format!("{} has an incomplete VLNV '{vlnv}'", root.local_name()));
    }
    let document_group = ctx.profile().has_document_name_group;
    let optional_text = |local: &str| {
        ctx.child_if(root, local, document_group)
            .map(XmlElement::text)
            .unwrap_or_default()
    };
    let display_name = optional_text("displayName");
    let short_description = optional_text("shortDescription");

    DocumentData {
        vlnv,
        revision: ctx.revision(),
        display_name,
        short_description,
        description: text(root, "description"),
        parameters: read_parameters(root, ctx),
        choices: if with_choices { read_choices(root) } else { Vec::new() },
        assertions: read_assertions(root, ctx),
        vendor_extensions: read_vendor_extensions(root),
        prolog: Vec::new(),
        root_attributes: root.attributes.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{STD14, STD22};
    use crate::tree::XmlDocument;

    fn element(text: &str) -> XmlElement {
        XmlDocument::parse(text).unwrap().root
    }

    #[test]
    fn parameter_attributes_and_ranges() {
        let parameter = element(
            r#"<ipxact:parameter parameterId="id_1" type="int" resolve="user" minimum="0" maximum="9">
                <ipxact:name>width</ipxact:name>
                <ipxact:vectors><ipxact:vector><ipxact:left>7</ipxact:left><ipxact:right>0</ipxact:right></ipxact:vector></ipxact:vectors>
                <ipxact:value>8</ipxact:value>
            </ipxact:parameter>"#,
        );
        let mut ctx = ReadContext::new(&STD14);
        let parameter = read_parameter(&parameter, &mut ctx);

        assert!(ctx.issues().is_empty());
        assert_eq!(parameter.name_group.name, "width");
        assert_eq!(parameter.value_id, "id_1");
        assert_eq!(parameter.parameter_type, "int");
        assert_eq!(parameter.resolve, "user");
        assert_eq!((parameter.minimum.as_str(), parameter.maximum.as_str()), ("0", "9"));
        assert_eq!((parameter.vector_left.as_str(), parameter.vector_right.as_str()), ("7", "0"));
        assert!(!parameter.has_array());
        assert_eq!(parameter.value, "8");
    }

    #[test]
    fn missing_name_is_an_issue_not_an_error() {
        let mut ctx = ReadContext::new(&STD22);
        let group = read_name_group(&element("<ipxact:field/>"), &mut ctx);
        assert_eq!(group.name, "");
        assert_eq!(ctx.issues().len(), 1);
    }

    #[test]
    fn invalid_boolean_is_reported_and_left_unset() {
        let mut ctx = ReadContext::new(&STD22);
        let e = element("<e><ipxact:volatile>maybe</ipxact:volatile></e>");
        assert_eq!(read_bool(&e, "volatile", &mut ctx), None);
        assert_eq!(ctx.issues().len(), 1);
    }

    #[test]
    fn memory_array_depends_on_revision() {
        let std14 = element("<r><ipxact:dim>4</ipxact:dim><ipxact:dim>2</ipxact:dim></r>");
        let array = read_memory_array(&std14, "stride", &ReadContext::new(&STD14)).unwrap();
        assert_eq!(array.dimensions.len(), 2);
        assert_eq!(array.stride, "");

        let std22 = element(
            r#"<r><ipxact:array><ipxact:dim indexVar="i">8</ipxact:dim><ipxact:stride>4</ipxact:stride></ipxact:array></r>"#,
        );
        let array = read_memory_array(&std22, "stride", &ReadContext::new(&STD22)).unwrap();
        assert_eq!(array.dimensions[0].index_var, "i");
        assert_eq!(array.stride, "4");
        assert!(read_memory_array(&std14, "stride", &ReadContext::new(&STD22)).is_none());
    }
}
