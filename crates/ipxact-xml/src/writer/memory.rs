//! Writers for memory maps and everything below them.

use ipxact_core::{
    AccessType, AddressBlock, AlternateRegister, EnumeratedValue, Field, FieldAccessPolicy,
    FieldReset, MemoryBlock, MemoryMap, ModifiedWrite, ReadAction, Register, RegisterData,
    RegisterFile, SubspaceMap, TestConstraint, WriteValueConstraint, XmlElement,
};

use super::common::{
    element, push_bool, push_definition_ref, push_is_present, push_keyword, push_required,
    push_text, set_attribute, write_access_policies, write_memory_array, write_mode_refs,
    write_name_group, write_parameters, write_vendor_extensions,
};
use crate::profile::SchemaProfile;

fn push_modified_write(parent: &mut XmlElement, value: Option<ModifiedWrite>, modify: &str) {
    if let Some(value) = value {
        let mut out = XmlElement::with_text(SchemaProfile::tag("modifiedWriteValue"), value.as_str());
        set_attribute(&mut out, "modify", modify);
        parent.push(out);
    }
}

fn push_write_value_constraint(parent: &mut XmlElement, constraint: Option<&WriteValueConstraint>) {
    let Some(constraint) = constraint else {
        return;
    };
    let mut out = element("writeValueConstraint");
    match constraint {
        WriteValueConstraint::WriteAsRead => push_required(&mut out, "writeAsRead", "true"),
        WriteValueConstraint::UseEnumeratedValues => push_required(&mut out, "useEnumeratedValues", "true"),
        WriteValueConstraint::MinMax { minimum, maximum } => {
            push_required(&mut out, "minimum", minimum);
            push_required(&mut out, "maximum", maximum);
        }
    }
    parent.push(out);
}

fn push_read_action(parent: &mut XmlElement, value: Option<ReadAction>, modify: &str) {
    if let Some(value) = value {
        let mut out = XmlElement::with_text(SchemaProfile::tag("readAction"), value.as_str());
        set_attribute(&mut out, "modify", modify);
        parent.push(out);
    }
}

fn push_testable(parent: &mut XmlElement, testable: Option<bool>, constraint: Option<TestConstraint>) {
    if let Some(testable) = testable {
        let mut out = XmlElement::with_text(
            SchemaProfile::tag("testable"),
            if testable { "true" } else { "false" },
        );
        if let Some(constraint) = constraint {
            out.set_attribute("testConstraint", constraint.as_str());
        }
        parent.push(out);
    }
}

fn push_resets(parent: &mut XmlElement, resets: &[FieldReset]) {
    if resets.is_empty() {
        return;
    }
    let mut list = element("resets");
    for reset in resets {
        let mut out = element("reset");
        set_attribute(&mut out, "resetTypeRef", &reset.reset_type_ref);
        push_required(&mut out, "value", &reset.value);
        push_text(&mut out, "mask", &reset.mask);
        list.push(out);
    }
    parent.push(list);
}

fn write_enumerated_value(value: &EnumeratedValue, profile: &SchemaProfile) -> XmlElement {
    let mut out = element("enumeratedValue");
    if let Some(usage) = value.usage {
        out.set_attribute("usage", usage.as_str());
    }
    write_name_group(&mut out, &value.name_group, profile);
    push_required(&mut out, "value", &value.value);
    write_vendor_extensions(&mut out, &value.vendor_extensions);
    out
}

fn push_enumerated_values(parent: &mut XmlElement, values: &[EnumeratedValue], profile: &SchemaProfile) {
    if values.is_empty() {
        return;
    }
    let mut list = element("enumeratedValues");
    for value in values {
        list.push(write_enumerated_value(value, profile));
    }
    parent.push(list);
}

/// One `fieldAccessPolicy` element.
pub fn write_field_access_policy(policy: &FieldAccessPolicy, profile: &SchemaProfile) -> XmlElement {
    let mut out = element("fieldAccessPolicy");
    write_mode_refs(&mut out, &policy.mode_refs);
    push_definition_ref(
        &mut out,
        "fieldAccessPolicyDefinitionRef",
        policy.definition_ref.as_ref(),
        profile,
    );
    push_keyword(&mut out, "access", policy.access);
    push_modified_write(&mut out, policy.modified_write_value, &policy.modified_write_modify);
    push_write_value_constraint(&mut out, policy.write_value_constraint.as_ref());
    push_read_action(&mut out, policy.read_action, &policy.read_action_modify);
    push_text(&mut out, "readResponse", &policy.read_response);
    if let Some(broadcasts) = &policy.broadcasts {
        out.push(broadcasts.clone());
    }
    if let Some(restrictions) = &policy.access_restrictions {
        out.push(restrictions.clone());
    }
    push_testable(&mut out, policy.testable, policy.test_constraint);
    push_text(&mut out, "reserved", &policy.reserved);
    write_vendor_extensions(&mut out, &policy.vendor_extensions);
    out
}

/// One `field` element.
pub fn write_field(field: &Field, profile: &SchemaProfile) -> XmlElement {
    let mut out = element("field");
    set_attribute(&mut out, "fieldID", &field.id);
    write_name_group(&mut out, &field.name_group, profile);
    push_is_present(&mut out, &field.is_present, profile);
    if profile.has_memory_arrays {
        write_memory_array(&mut out, field.memory_array.as_ref(), "bitStride", profile);
    }
    push_required(&mut out, "bitOffset", &field.bit_offset);

    if profile.has_access_policies {
        if let Some(alias_of) = &field.alias_of {
            out.push(alias_of.clone());
        }
        let by_reference = push_definition_ref(
            &mut out,
            "fieldDefinitionRef",
            field.field_definition_ref.as_ref(),
            profile,
        );
        if !by_reference {
            push_resets(&mut out, &field.resets);
            push_text(&mut out, "typeIdentifier", &field.type_identifier);
            push_required(&mut out, "bitWidth", &field.bit_width);
            push_bool(&mut out, "volatile", field.volatile);
            if !field.field_access_policies.is_empty() {
                let mut list = element("fieldAccessPolicies");
                for policy in &field.field_access_policies {
                    list.push(write_field_access_policy(policy, profile));
                }
                out.push(list);
            }
            push_enumerated_values(&mut out, &field.enumerated_values, profile);
        }
    } else {
        push_resets(&mut out, &field.resets);
        push_text(&mut out, "typeIdentifier", &field.type_identifier);
        push_required(&mut out, "bitWidth", &field.bit_width);
        push_bool(&mut out, "volatile", field.volatile);
        push_keyword(&mut out, "access", field.access);
        push_enumerated_values(&mut out, &field.enumerated_values, profile);
        push_modified_write(&mut out, field.modified_write_value, &field.modified_write_modify);
        push_write_value_constraint(&mut out, field.write_value_constraint.as_ref());
        push_read_action(&mut out, field.read_action, &field.read_action_modify);
        push_testable(&mut out, field.testable, field.test_constraint);
        push_text(&mut out, "reserved", &field.reserved);
    }

    write_parameters(&mut out, &field.parameters, profile);
    write_vendor_extensions(&mut out, &field.vendor_extensions);
    out
}

fn push_fields(parent: &mut XmlElement, fields: &[Field], profile: &SchemaProfile) {
    for field in fields {
        parent.push(write_field(field, profile));
    }
}

/// Register-level `access`, written only where access policies do not
/// replace it.
fn push_legacy_access(parent: &mut XmlElement, access: Option<AccessType>, profile: &SchemaProfile) {
    if !profile.has_access_policies {
        push_keyword(parent, "access", access);
    }
}

/// One `alternateRegister` element.
pub fn write_alternate_register(register: &AlternateRegister, profile: &SchemaProfile) -> XmlElement {
    let mut out = element("alternateRegister");
    write_name_group(&mut out, &register.name_group, profile);
    push_is_present(&mut out, &register.is_present, profile);
    if profile.has_modes {
        write_mode_refs(&mut out, &register.mode_refs);
    } else if !register.alternate_groups.is_empty() {
        let mut groups = element("alternateGroups");
        for group in &register.alternate_groups {
            push_required(&mut groups, "alternateGroup", group);
        }
        out.push(groups);
    }
    push_text(&mut out, "typeIdentifier", &register.type_identifier);
    push_bool(&mut out, "volatile", register.volatile);
    push_legacy_access(&mut out, register.access, profile);
    write_access_policies(&mut out, &register.access_policies, profile);
    push_fields(&mut out, &register.fields, profile);
    write_parameters(&mut out, &register.parameters, profile);
    write_vendor_extensions(&mut out, &register.vendor_extensions);
    out
}

/// One `register` element.
pub fn write_register(register: &Register, profile: &SchemaProfile) -> XmlElement {
    let mut out = element("register");
    write_name_group(&mut out, &register.name_group, profile);
    push_is_present(&mut out, &register.is_present, profile);
    write_memory_array(&mut out, register.memory_array.as_ref(), "stride", profile);
    push_required(&mut out, "addressOffset", &register.address_offset);

    let by_reference = push_definition_ref(
        &mut out,
        "registerDefinitionRef",
        register.register_definition_ref.as_ref(),
        profile,
    );
    if !by_reference {
        push_text(&mut out, "typeIdentifier", &register.type_identifier);
        push_required(&mut out, "size", &register.size);
        push_bool(&mut out, "volatile", register.volatile);
        push_legacy_access(&mut out, register.access, profile);
        write_access_policies(&mut out, &register.access_policies, profile);
        push_fields(&mut out, &register.fields, profile);
    }

    if !register.alternate_registers.is_empty() {
        let mut list = element("alternateRegisters");
        for alternate in &register.alternate_registers {
            list.push(write_alternate_register(alternate, profile));
        }
        out.push(list);
    }
    write_parameters(&mut out, &register.parameters, profile);
    write_vendor_extensions(&mut out, &register.vendor_extensions);
    out
}

fn push_register_data(parent: &mut XmlElement, data: &[RegisterData], profile: &SchemaProfile) {
    for item in data {
        parent.push(match item {
            RegisterData::Register(register) => write_register(register, profile),
            RegisterData::RegisterFile(file) => write_register_file(file, profile),
        });
    }
}

/// One `registerFile` element.
pub fn write_register_file(file: &RegisterFile, profile: &SchemaProfile) -> XmlElement {
    let mut out = element("registerFile");
    write_name_group(&mut out, &file.name_group, profile);
    push_is_present(&mut out, &file.is_present, profile);
    write_memory_array(&mut out, file.memory_array.as_ref(), "stride", profile);
    push_required(&mut out, "addressOffset", &file.address_offset);

    let by_reference = push_definition_ref(
        &mut out,
        "registerFileDefinitionRef",
        file.register_file_definition_ref.as_ref(),
        profile,
    );
    if !by_reference {
        push_text(&mut out, "typeIdentifier", &file.type_identifier);
        push_required(&mut out, "range", &file.range);
        write_access_policies(&mut out, &file.access_policies, profile);
        push_register_data(&mut out, &file.register_data, profile);
    }
    write_parameters(&mut out, &file.parameters, profile);
    write_vendor_extensions(&mut out, &file.vendor_extensions);
    out
}

/// One `addressBlock` element.
pub fn write_address_block(block: &AddressBlock, profile: &SchemaProfile) -> XmlElement {
    let mut out = element("addressBlock");
    write_name_group(&mut out, &block.name_group, profile);
    push_is_present(&mut out, &block.is_present, profile);
    if profile.has_memory_arrays {
        write_memory_array(&mut out, block.memory_array.as_ref(), "stride", profile);
    }
    push_required(&mut out, "baseAddress", &block.base_address);

    let by_reference = push_definition_ref(
        &mut out,
        "addressBlockDefinitionRef",
        block.address_block_definition_ref.as_ref(),
        profile,
    );
    if !by_reference {
        push_text(&mut out, "typeIdentifier", &block.type_identifier);
        push_required(&mut out, "range", &block.range);
        push_required(&mut out, "width", &block.width);
        push_keyword(&mut out, "usage", block.usage);
        push_bool(&mut out, "volatile", block.volatile);
        push_legacy_access(&mut out, block.access, profile);
        write_access_policies(&mut out, &block.access_policies, profile);
        write_parameters(&mut out, &block.parameters, profile);
        push_register_data(&mut out, &block.register_data, profile);
    }
    write_vendor_extensions(&mut out, &block.vendor_extensions);
    out
}

/// One `subspaceMap` element.
pub fn write_subspace_map(map: &SubspaceMap, profile: &SchemaProfile) -> XmlElement {
    let mut out = element("subspaceMap");
    set_attribute(&mut out, profile.subspace_initiator_ref, &map.initiator_ref);
    set_attribute(&mut out, "segmentRef", &map.segment_ref);
    write_name_group(&mut out, &map.name_group, profile);
    push_is_present(&mut out, &map.is_present, profile);
    push_required(&mut out, "baseAddress", &map.base_address);
    write_parameters(&mut out, &map.parameters, profile);
    write_vendor_extensions(&mut out, &map.vendor_extensions);
    out
}

/// One `memoryMap` element.
pub fn write_memory_map(map: &MemoryMap, profile: &SchemaProfile) -> XmlElement {
    let mut out = element("memoryMap");
    write_name_group(&mut out, &map.name_group, profile);
    push_is_present(&mut out, &map.is_present, profile);
    for block in &map.blocks {
        out.push(match block {
            MemoryBlock::AddressBlock(block) => write_address_block(block, profile),
            MemoryBlock::SubspaceMap(map) => write_subspace_map(map, profile),
        });
    }
    for remap in &map.memory_remaps {
        out.push(remap.clone());
    }
    push_text(&mut out, "addressUnitBits", &map.address_unit_bits);
    push_text(&mut out, "shared", &map.shared);
    write_vendor_extensions(&mut out, &map.vendor_extensions);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{STD14, STD22};
    use ipxact_core::{AccessPolicy, DefinitionRef, ModeReference};

    fn child_names(element: &XmlElement) -> Vec<&str> {
        element.elements().map(XmlElement::local_name).collect()
    }

    #[test]
    fn std14_field_order() {
        let mut field = Field::new("f", "0", "8");
        field.id = "id".into();
        field.is_present = "1".into();
        field.volatile = Some(false);
        field.access = Some(AccessType::ReadOnly);
        field.read_action = Some(ReadAction::Clear);
        field.testable = Some(true);
        field.test_constraint = Some(TestConstraint::Unconstrained);
        field.reserved = "0".into();

        let out = write_field(&field, &STD14);
        assert_eq!(out.attribute("fieldID"), Some("id"));
        assert_eq!(
            child_names(&out),
            ["name", "isPresent", "bitOffset", "bitWidth", "volatile", "access", "readAction", "testable", "reserved"]
        );
        assert_eq!(
            out.child("testable").unwrap().attribute("testConstraint"),
            Some("unConstrained")
        );
    }

    #[test]
    fn std22_field_moves_access_into_policies() {
        let mut field = Field::new("f", "0", "8");
        field.access = Some(AccessType::ReadOnly);
        field.field_access_policies.push(FieldAccessPolicy {
            access: Some(AccessType::ReadWrite),
            ..Default::default()
        });

        let out = write_field(&field, &STD22);
        assert_eq!(child_names(&out), ["name", "bitOffset", "bitWidth", "fieldAccessPolicies"]);
        let policy = out.child("fieldAccessPolicies").unwrap().child("fieldAccessPolicy").unwrap();
        assert_eq!(policy.child_text("access").as_deref(), Some("read-write"));
    }

    #[test]
    fn definition_reference_replaces_inline_values() {
        let mut register = Register::new("r", "0", "32");
        register.register_definition_ref = Some(DefinitionRef {
            type_definitions: "defs".into(),
            name: "ctrl".into(),
        });
        register.fields.push(Field::new("f", "0", "1"));

        let std22 = write_register(&register, &STD22);
        assert_eq!(child_names(&std22), ["name", "addressOffset", "registerDefinitionRef"]);
        assert_eq!(
            std22.child("registerDefinitionRef").unwrap().attribute("typeDefinitions"),
            Some("defs")
        );

        let std14 = write_register(&register, &STD14);
        assert_eq!(child_names(&std14), ["name", "addressOffset", "size", "field"]);
    }

    #[test]
    fn field_order_is_preserved() {
        let mut register = Register::new("r", "0", "32");
        for name in ["c", "a", "b"] {
            register.fields.push(Field::new(name, "0", "1"));
        }
        let out = write_register(&register, &STD22);
        let fields: Vec<_> = out
            .children_named("field")
            .map(|field| field.child_text("name").unwrap_or_default())
            .collect();
        assert_eq!(fields, ["c", "a", "b"]);
    }

    #[test]
    fn alternate_register_selectors_follow_revision() {
        let mut alternate = AlternateRegister::new("alt");
        alternate.alternate_groups.push("group".into());
        alternate.mode_refs.push(ModeReference::new("test", "0"));
        alternate.access_policies.push(AccessPolicy::default());

        let std14 = write_alternate_register(&alternate, &STD14);
        assert_eq!(child_names(&std14), ["name", "alternateGroups"]);

        let std22 = write_alternate_register(&alternate, &STD22);
        assert_eq!(child_names(&std22), ["name", "modeRef", "accessPolicies"]);
    }

    #[test]
    fn subspace_initiator_attribute_is_renamed() {
        let mut map = SubspaceMap::new("sub", "0");
        map.initiator_ref = "bus".into();
        assert_eq!(write_subspace_map(&map, &STD14).attribute("masterRef"), Some("bus"));
        assert_eq!(write_subspace_map(&map, &STD22).attribute("initiatorRef"), Some("bus"));
    }
}
