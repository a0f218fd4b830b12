//! Bus and abstraction definition readers.

use ipxact_core::{AbstractionDefinition, BusDefinition, NameGroup, PortAbstraction, Vlnv, VlnvType, XmlElement};

use super::common::{read_bool, read_document_data, read_is_present, read_vendor_extensions, read_vlnv_attributes, text};
use super::ReadContext;

fn read_extends(root: &XmlElement, kind: VlnvType) -> Vlnv {
    root.child("extends")
        .map(|extends| read_vlnv_attributes(extends, kind))
        .unwrap_or_default()
}

/// A `busDefinition` root element.
pub fn read_bus_definition(root: &XmlElement, ctx: &mut ReadContext) -> BusDefinition {
    let profile = ctx.profile();
    ctx.enter("bus definition", &text(root, "name"));
    let data = read_document_data(root, VlnvType::BusDefinition, profile.has_definition_choices, ctx);

    let direct_connection = read_bool(root, "directConnection", ctx).unwrap_or(false);
    let broadcast = if profile.has_broadcast {
        read_bool(root, "broadcast", ctx)
    } else {
        if root.child("broadcast").is_some() {
            ctx.issue(format!("broadcast is not supported in {} documents and was skipped", profile.revision));
        }
        None
    };
    let is_addressable = read_bool(root, "isAddressable", ctx).unwrap_or(false);
    let system_group_names = root
        .child("systemGroupNames")
        .map(|names| names.children_named("systemGroupName").map(XmlElement::text).collect())
        .unwrap_or_default();
    let definition = BusDefinition {
        data,
        direct_connection,
        broadcast,
        is_addressable,
        extends: read_extends(root, VlnvType::BusDefinition),
        max_initiators: text(root, profile.max_initiators),
        max_targets: text(root, profile.max_targets),
        system_group_names,
    };
    ctx.leave();
    definition
}

fn read_port(element: &XmlElement, ctx: &mut ReadContext) -> PortAbstraction {
    let name = match element.child_text("logicalName") {
        Some(name) => name,
        None => {
            ctx.issue("port has no logical name");
            String::new()
        }
    };
    let profile = ctx.profile();
    let short_description = ctx
        .child_if(element, "shortDescription", profile.has_short_description)
        .map(XmlElement::text)
        .unwrap_or_default();
    let body = element
        .elements()
        .find(|child| matches!(child.local_name(), "wire" | "transactional"))
        .cloned();
    if body.is_none() {
        ctx.issue(format!("port '{name}' is neither wire nor transactional"));
    }

    PortAbstraction {
        name_group: NameGroup {
            name,
            display_name: text(element, "displayName"),
            short_description,
            description: text(element, "description"),
        },
        is_present: read_is_present(element, ctx),
        match_element: ctx.child_if(element, "match", profile.has_definition_refs).cloned(),
        body,
        packets: ctx.child_if(element, "packets", profile.has_definition_refs).cloned(),
        vendor_extensions: read_vendor_extensions(element),
    }
}

/// An `abstractionDefinition` root element.
pub fn read_abstraction_definition(root: &XmlElement, ctx: &mut ReadContext) -> AbstractionDefinition {
    let profile = ctx.profile();
    ctx.enter("abstraction definition", &text(root, "name"));
    let data = read_document_data(root, VlnvType::AbstractionDefinition, profile.has_definition_choices, ctx);

    let bus_type = match root.child("busType") {
        Some(bus_type) => read_vlnv_attributes(bus_type, VlnvType::BusDefinition),
        None => {
            ctx.issue("abstraction definition has no bus type");
            Vlnv::default()
        }
    };
    let logical_ports = match root.child("ports") {
        Some(ports) => ports.children_named("port").map(|port| read_port(port, ctx)).collect(),
        None => Vec::new(),
    };
    let definition = AbstractionDefinition {
        data,
        bus_type,
        extends: read_extends(root, VlnvType::AbstractionDefinition),
        logical_ports,
    };
    ctx.leave();
    definition
}
