//! Component readers.

use ipxact_core::{AddressSpace, AddressSpaceRef, Component, Cpu, Mode, VlnvType, XmlElement};

use super::common::{read_document_data, read_is_present, read_name_group, read_parameters, read_vendor_extensions, text};
use super::memory::read_memory_map;
use super::ReadContext;

/// Component children with a typed representation.
const MODELED: &[&str] = &[
    "vendor",
    "library",
    "name",
    "version",
    "displayName",
    "shortDescription",
    "description",
    "modes",
    "addressSpaces",
    "memoryMaps",
    "choices",
    "cpus",
    "parameters",
    "assertions",
    "vendorExtensions",
];

/// One `mode` element.
pub fn read_mode(element: &XmlElement, ctx: &mut ReadContext) -> Mode {
    Mode {
        name_group: read_name_group(element, ctx),
        condition: text(element, "condition"),
        vendor_extensions: read_vendor_extensions(element),
    }
}

/// One `addressSpace` element.
pub fn read_address_space(element: &XmlElement, ctx: &mut ReadContext) -> AddressSpace {
    let name_group = read_name_group(element, ctx);
    ctx.enter("address space", &name_group.name);
    let space = AddressSpace {
        name_group,
        is_present: read_is_present(element, ctx),
        range: text(element, "range"),
        width: text(element, "width"),
        segments: element.child("segments").cloned(),
        address_unit_bits: text(element, "addressUnitBits"),
        executable_images: element.children_named("executableImage").cloned().collect(),
        local_memory_map: element.child("localMemoryMap").cloned(),
        parameters: read_parameters(element, ctx),
        vendor_extensions: read_vendor_extensions(element),
    };
    ctx.leave();
    space
}

/// One `cpu` element.
pub fn read_cpu(element: &XmlElement, ctx: &mut ReadContext) -> Cpu {
    let name_group = read_name_group(element, ctx);
    ctx.enter("cpu", &name_group.name);

    let standalone = ctx.profile().has_standalone_cpus;
    let mut cpu = Cpu {
        name_group,
        is_present: read_is_present(element, ctx),
        parameters: read_parameters(element, ctx),
        vendor_extensions: read_vendor_extensions(element),
        ..Default::default()
    };
    if standalone {
        cpu.range = text(element, "range");
        cpu.width = text(element, "width");
        cpu.address_unit_bits = text(element, "addressUnitBits");
        cpu.executable_images = element.children_named("executableImage").cloned().collect();
        cpu.memory_map_ref = element
            .child("memoryMapRef")
            .and_then(|reference| reference.attribute("memoryMapRef"))
            .unwrap_or_default()
            .to_string();
    } else {
        cpu.address_space_refs = element
            .children_named("addressSpaceRef")
            .map(|reference| AddressSpaceRef {
                reference: reference.attribute("addressSpaceRef").unwrap_or_default().to_string(),
                is_present: text(reference, "isPresent"),
            })
            .collect();
    }
    ctx.leave();
    cpu
}

/// A `component` root element.
pub fn read_component(root: &XmlElement, ctx: &mut ReadContext) -> Component {
    ctx.enter("component", &text(root, "name"));
    let data = read_document_data(root, VlnvType::Component, true, ctx);

    let has_modes = ctx.profile().has_modes;
    let modes = match ctx.child_if(root, "modes", has_modes) {
        Some(list) => list.children_named("mode").map(|mode| read_mode(mode, ctx)).collect(),
        None => Vec::new(),
    };
    let address_spaces = match root.child("addressSpaces") {
        Some(list) => list
            .children_named("addressSpace")
            .map(|space| read_address_space(space, ctx))
            .collect(),
        None => Vec::new(),
    };
    let memory_maps = match root.child("memoryMaps") {
        Some(list) => list
            .children_named("memoryMap")
            .map(|map| read_memory_map(map, ctx))
            .collect(),
        None => Vec::new(),
    };
    let cpus = match root.child("cpus") {
        Some(list) => list.children_named("cpu").map(|cpu| read_cpu(cpu, ctx)).collect(),
        None => Vec::new(),
    };
    let other_elements = root
        .elements()
        .filter(|child| !MODELED.iter().any(|name| *name == child.local_name()))
        .cloned()
        .collect();
    ctx.leave();

    Component {
        data,
        modes,
        address_spaces,
        memory_maps,
        cpus,
        other_elements,
    }
}
