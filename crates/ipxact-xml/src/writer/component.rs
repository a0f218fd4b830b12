//! Component writers.

use ipxact_core::{AddressSpace, Component, Cpu, Mode, VlnvType, XmlElement};

use super::common::{
    document_root, element, push_is_present, push_required, push_text, write_assertions,
    write_choices, write_name_group, write_parameters, write_vendor_extensions,
};
use super::memory::write_memory_map;
use crate::profile::SchemaProfile;

/// One `mode` element.
pub fn write_mode(mode: &Mode, profile: &SchemaProfile) -> XmlElement {
    let mut out = element("mode");
    write_name_group(&mut out, &mode.name_group, profile);
    push_text(&mut out, "condition", &mode.condition);
    write_vendor_extensions(&mut out, &mode.vendor_extensions);
    out
}

/// One `addressSpace` element.
pub fn write_address_space(space: &AddressSpace, profile: &SchemaProfile) -> XmlElement {
    let mut out = element("addressSpace");
    write_name_group(&mut out, &space.name_group, profile);
    push_is_present(&mut out, &space.is_present, profile);
    push_required(&mut out, "range", &space.range);
    push_required(&mut out, "width", &space.width);
    if let Some(segments) = &space.segments {
        out.push(segments.clone());
    }
    push_text(&mut out, "addressUnitBits", &space.address_unit_bits);
    for image in &space.executable_images {
        out.push(image.clone());
    }
    if let Some(local_map) = &space.local_memory_map {
        out.push(local_map.clone());
    }
    write_parameters(&mut out, &space.parameters, profile);
    write_vendor_extensions(&mut out, &space.vendor_extensions);
    out
}

/// One `cpu` element.
pub fn write_cpu(cpu: &Cpu, profile: &SchemaProfile) -> XmlElement {
    let mut out = element("cpu");
    write_name_group(&mut out, &cpu.name_group, profile);
    push_is_present(&mut out, &cpu.is_present, profile);
    if profile.has_standalone_cpus {
        push_text(&mut out, "range", &cpu.range);
        push_text(&mut out, "width", &cpu.width);
        push_text(&mut out, "addressUnitBits", &cpu.address_unit_bits);
        for image in &cpu.executable_images {
            out.push(image.clone());
        }
        if !cpu.memory_map_ref.is_empty() {
            out.push(element("memoryMapRef").attr("memoryMapRef", cpu.memory_map_ref.as_str()));
        }
    } else {
        for reference in &cpu.address_space_refs {
            let mut out_ref = element("addressSpaceRef").attr("addressSpaceRef", reference.reference.as_str());
            push_text(&mut out_ref, "isPresent", &reference.is_present);
            out.push(out_ref);
        }
    }
    write_parameters(&mut out, &cpu.parameters, profile);
    write_vendor_extensions(&mut out, &cpu.vendor_extensions);
    out
}

fn push_list<T>(parent: &mut XmlElement, local: &str, items: &[T], write: impl Fn(&T) -> XmlElement) {
    if items.is_empty() {
        return;
    }
    let mut out = element(local);
    for item in items {
        out.push(write(item));
    }
    parent.push(out);
}

/// A `component` root element. Unmodeled children are placed at their
/// schema position; children the schema order does not know go just
/// before `vendorExtensions`.
pub fn write_component(component: &Component, profile: &SchemaProfile) -> XmlElement {
    let data = &component.data;
    let mut root = document_root(VlnvType::Component, data, profile);
    let known = |local: &str| profile.component_order.iter().any(|name| *name == local);

    for &local in profile.component_order {
        let modeled = match local {
            "vendor" | "library" | "name" | "version" => continue,
            "displayName" => {
                push_text(&mut root, local, &data.display_name);
                true
            }
            "shortDescription" => {
                push_text(&mut root, local, &data.short_description);
                true
            }
            "description" => {
                push_text(&mut root, local, &data.description);
                true
            }
            "modes" => {
                push_list(&mut root, local, &component.modes, |mode| write_mode(mode, profile));
                true
            }
            "addressSpaces" => {
                push_list(&mut root, local, &component.address_spaces, |space| {
                    write_address_space(space, profile)
                });
                true
            }
            "memoryMaps" => {
                push_list(&mut root, local, &component.memory_maps, |map| write_memory_map(map, profile));
                true
            }
            "choices" => {
                write_choices(&mut root, &data.choices);
                true
            }
            "cpus" => {
                push_list(&mut root, local, &component.cpus, |cpu| write_cpu(cpu, profile));
                true
            }
            "parameters" => {
                write_parameters(&mut root, &data.parameters, profile);
                true
            }
            "assertions" => {
                write_assertions(&mut root, &data.assertions, profile);
                true
            }
            "vendorExtensions" => {
                for other in component.other_elements.iter().filter(|e| !known(e.local_name())) {
                    root.push(other.clone());
                }
                write_vendor_extensions(&mut root, &data.vendor_extensions);
                true
            }
            _ => false,
        };
        if !modeled {
            for other in component.other_elements_named(local) {
                root.push(other.clone());
            }
        }
    }
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{STD14, STD22};
    use ipxact_core::{AddressSpaceRef, MemoryMap, Revision, Vlnv};

    fn component() -> Component {
        let vlnv = Vlnv::new(VlnvType::Component, "v", "l", "c", "1.0");
        let mut component = Component::new(vlnv, Revision::Std22);
        component.data.description = "described".into();
        component.modes.push(Mode::new("normal"));
        component.memory_maps.push(MemoryMap::new("regs"));
        component.other_elements = vec![
            XmlElement::new("ipxact:fileSets"),
            XmlElement::new("ipxact:busInterfaces"),
            XmlElement::new("ipxact:futureElement"),
            XmlElement::new("ipxact:indirectInterfaces"),
        ];
        component
    }

    fn child_names(element: &XmlElement) -> Vec<&str> {
        element.elements().map(XmlElement::local_name).collect()
    }

    #[test]
    fn std22_component_follows_schema_order() {
        let out = write_component(&component(), &STD22);
        assert_eq!(
            child_names(&out),
            ["vendor", "library", "name", "version", "description", "busInterfaces", "indirectInterfaces", "modes", "memoryMaps", "fileSets", "futureElement"]
        );
        assert_eq!(out.name, "ipxact:component");
        assert_eq!(out.attribute("xmlns:ipxact"), Some(STD22.namespace));
    }

    #[test]
    fn std14_component_drops_modes_and_moves_description() {
        let out = write_component(&component(), &STD14);
        assert_eq!(
            child_names(&out),
            ["vendor", "library", "name", "version", "busInterfaces", "indirectInterfaces", "memoryMaps", "fileSets", "description", "futureElement"]
        );
    }

    #[test]
    fn cpu_shape_follows_revision() {
        let mut cpu = Cpu::new("core");
        cpu.address_space_refs.push(AddressSpaceRef::new("space"));
        cpu.memory_map_ref = "regs".into();

        let std14 = write_cpu(&cpu, &STD14);
        assert_eq!(child_names(&std14), ["name", "addressSpaceRef"]);
        assert_eq!(
            std14.child("addressSpaceRef").unwrap().attribute("addressSpaceRef"),
            Some("space")
        );

        let std22 = write_cpu(&cpu, &STD22);
        assert_eq!(child_names(&std22), ["name", "memoryMapRef"]);
    }
}
