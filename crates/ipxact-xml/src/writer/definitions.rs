//! Bus and abstraction definition writers.

use ipxact_core::{AbstractionDefinition, BusDefinition, PortAbstraction, VlnvType, XmlElement};

use super::common::{
    document_root, element, push_bool, push_document_name_group, push_is_present,
    push_late_description, push_required, push_text, vlnv_element, write_assertions,
    write_choices, write_parameters, write_vendor_extensions,
};
use crate::profile::SchemaProfile;

/// A `busDefinition` root element.
pub fn write_bus_definition(definition: &BusDefinition, profile: &SchemaProfile) -> XmlElement {
    let data = &definition.data;
    let mut root = document_root(VlnvType::BusDefinition, data, profile);
    push_document_name_group(&mut root, data, profile);

    push_bool(&mut root, "directConnection", Some(definition.direct_connection));
    if profile.has_broadcast {
        push_bool(&mut root, "broadcast", definition.broadcast);
    }
    push_bool(&mut root, "isAddressable", Some(definition.is_addressable));
    if definition.extends.is_set() {
        root.push(vlnv_element("extends", &definition.extends));
    }
    push_text(&mut root, profile.max_initiators, &definition.max_initiators);
    push_text(&mut root, profile.max_targets, &definition.max_targets);
    if !definition.system_group_names.is_empty() {
        let mut names = element("systemGroupNames");
        for name in &definition.system_group_names {
            push_required(&mut names, "systemGroupName", name);
        }
        root.push(names);
    }

    push_late_description(&mut root, data, profile);
    if profile.has_definition_choices {
        write_choices(&mut root, &data.choices);
    }
    write_parameters(&mut root, &data.parameters, profile);
    write_assertions(&mut root, &data.assertions, profile);
    write_vendor_extensions(&mut root, &data.vendor_extensions);
    root
}

fn write_port(port: &PortAbstraction, profile: &SchemaProfile) -> XmlElement {
    let mut out = element("port");
    push_is_present(&mut out, &port.is_present, profile);
    push_required(&mut out, "logicalName", &port.name_group.name);
    push_text(&mut out, "displayName", &port.name_group.display_name);
    if profile.has_short_description {
        push_text(&mut out, "shortDescription", &port.name_group.short_description);
    }
    push_text(&mut out, "description", &port.name_group.description);
    if profile.has_definition_refs {
        if let Some(matcher) = &port.match_element {
            out.push(matcher.clone());
        }
    }
    if let Some(body) = &port.body {
        out.push(body.clone());
    }
    if profile.has_definition_refs {
        if let Some(packets) = &port.packets {
            out.push(packets.clone());
        }
    }
    write_vendor_extensions(&mut out, &port.vendor_extensions);
    out
}

/// An `abstractionDefinition` root element.
pub fn write_abstraction_definition(definition: &AbstractionDefinition, profile: &SchemaProfile) -> XmlElement {
    let data = &definition.data;
    let mut root = document_root(VlnvType::AbstractionDefinition, data, profile);
    push_document_name_group(&mut root, data, profile);

    root.push(vlnv_element("busType", &definition.bus_type));
    if definition.extends.is_set() {
        root.push(vlnv_element("extends", &definition.extends));
    }
    if !definition.logical_ports.is_empty() {
        let mut ports = element("ports");
        for port in &definition.logical_ports {
            ports.push(write_port(port, profile));
        }
        root.push(ports);
    }

    push_late_description(&mut root, data, profile);
    if profile.has_definition_choices {
        write_choices(&mut root, &data.choices);
    }
    write_parameters(&mut root, &data.parameters, profile);
    write_assertions(&mut root, &data.assertions, profile);
    write_vendor_extensions(&mut root, &data.vendor_extensions);
    root
}
