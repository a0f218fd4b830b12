//! Readers for memory maps and everything below them.

use ipxact_core::{
    AccessType, AddressBlock, AlternateRegister, EnumeratedValue, Field, FieldAccessPolicy,
    FieldReset, MemoryBlock, MemoryMap, ModifiedWrite, ReadAction, Register, RegisterData,
    RegisterFile, SubspaceMap, TestConstraint, WriteValueConstraint, XmlElement,
};

use super::common::{
    read_access_policies, read_bool, read_definition_ref, read_is_present, read_keyword,
    read_memory_array, read_mode_refs, read_name_group, read_parameters, read_vendor_extensions,
    text,
};
use super::ReadContext;

/// Access properties shared by Std14 fields and Std22 field access policies.
#[derive(Default)]
struct AccessProperties {
    access: Option<AccessType>,
    modified_write_value: Option<ModifiedWrite>,
    modified_write_modify: String,
    write_value_constraint: Option<WriteValueConstraint>,
    read_action: Option<ReadAction>,
    read_action_modify: String,
    testable: Option<bool>,
    test_constraint: Option<TestConstraint>,
    reserved: String,
}

fn read_access_properties(element: &XmlElement, ctx: &mut ReadContext) -> AccessProperties {
    let mut properties = AccessProperties {
        access: read_keyword(element, "access", ctx),
        modified_write_value: read_keyword(element, "modifiedWriteValue", ctx),
        read_action: read_keyword(element, "readAction", ctx),
        testable: read_bool(element, "testable", ctx),
        reserved: text(element, "reserved"),
        ..Default::default()
    };
    if let Some(modified) = element.child("modifiedWriteValue") {
        properties.modified_write_modify = modified.attribute("modify").unwrap_or_default().to_string();
    }
    if let Some(action) = element.child("readAction") {
        properties.read_action_modify = action.attribute("modify").unwrap_or_default().to_string();
    }
    if let Some(constraint) = element.child("testable").and_then(|t| t.attribute("testConstraint")) {
        properties.test_constraint = super::common::parse_keyword(constraint, ctx);
    }
    if let Some(constraint) = element.child("writeValueConstraint") {
        properties.write_value_constraint = read_write_value_constraint(constraint, ctx);
    }
    properties
}

fn read_write_value_constraint(element: &XmlElement, ctx: &mut ReadContext) -> Option<WriteValueConstraint> {
    if element.child("writeAsRead").is_some() {
        Some(WriteValueConstraint::WriteAsRead)
    } else if element.child("useEnumeratedValues").is_some() {
        Some(WriteValueConstraint::UseEnumeratedValues)
    } else if element.child("minimum").is_some() || element.child("maximum").is_some() {
        Some(WriteValueConstraint::MinMax {
            minimum: text(element, "minimum"),
            maximum: text(element, "maximum"),
        })
    } else {
        ctx.issue("empty write value constraint");
        None
    }
}

fn read_enumerated_value(element: &XmlElement, ctx: &mut ReadContext) -> EnumeratedValue {
    let usage = match element.attribute("usage") {
        Some(usage) => super::common::parse_keyword(usage, ctx),
        None => None,
    };
    EnumeratedValue {
        name_group: read_name_group(element, ctx),
        value: text(element, "value"),
        usage,
        vendor_extensions: read_vendor_extensions(element),
    }
}

fn read_resets(element: &XmlElement) -> Vec<FieldReset> {
    let Some(resets) = element.child("resets") else {
        return Vec::new();
    };
    resets
        .children_named("reset")
        .map(|reset| FieldReset {
            reset_type_ref: reset.attribute("resetTypeRef").unwrap_or_default().to_string(),
            value: text(reset, "value"),
            mask: text(reset, "mask"),
        })
        .collect()
}

/// One `fieldAccessPolicy` element.
pub fn read_field_access_policy(element: &XmlElement, ctx: &mut ReadContext) -> FieldAccessPolicy {
    let properties = read_access_properties(element, ctx);
    FieldAccessPolicy {
        mode_refs: read_mode_refs(element),
        definition_ref: read_definition_ref(element, "fieldAccessPolicyDefinitionRef", ctx),
        access: properties.access,
        modified_write_value: properties.modified_write_value,
        modified_write_modify: properties.modified_write_modify,
        write_value_constraint: properties.write_value_constraint,
        read_action: properties.read_action,
        read_action_modify: properties.read_action_modify,
        read_response: text(element, "readResponse"),
        broadcasts: element.child("broadcasts").cloned(),
        access_restrictions: element.child("accessRestrictions").cloned(),
        testable: properties.testable,
        test_constraint: properties.test_constraint,
        reserved: properties.reserved,
        vendor_extensions: read_vendor_extensions(element),
    }
}

/// One `field` element.
pub fn read_field(element: &XmlElement, ctx: &mut ReadContext) -> Field {
    let name_group = read_name_group(element, ctx);
    ctx.enter("field", &name_group.name);

    let profile = ctx.profile();
    let properties = if profile.has_access_policies {
        AccessProperties::default()
    } else {
        read_access_properties(element, ctx)
    };
    let field_access_policies = match ctx.child_if(element, "fieldAccessPolicies", profile.has_access_policies) {
        Some(list) => list
            .children_named("fieldAccessPolicy")
            .map(|policy| read_field_access_policy(policy, ctx))
            .collect(),
        None => Vec::new(),
    };
    let enumerated_values = match element.child("enumeratedValues") {
        Some(list) => list
            .children_named("enumeratedValue")
            .map(|value| read_enumerated_value(value, ctx))
            .collect(),
        None => Vec::new(),
    };

    let field = Field {
        name_group,
        id: element.attribute("fieldID").unwrap_or_default().to_string(),
        is_present: read_is_present(element, ctx),
        memory_array: read_memory_array(element, "bitStride", ctx),
        bit_offset: text(element, "bitOffset"),
        alias_of: ctx.child_if(element, "aliasOf", profile.has_definition_refs).cloned(),
        resets: read_resets(element),
        type_identifier: text(element, "typeIdentifier"),
        bit_width: text(element, "bitWidth"),
        field_definition_ref: read_definition_ref(element, "fieldDefinitionRef", ctx),
        volatile: read_bool(element, "volatile", ctx),
        access: properties.access,
        enumerated_values,
        modified_write_value: properties.modified_write_value,
        modified_write_modify: properties.modified_write_modify,
        write_value_constraint: properties.write_value_constraint,
        read_action: properties.read_action,
        read_action_modify: properties.read_action_modify,
        testable: properties.testable,
        test_constraint: properties.test_constraint,
        reserved: properties.reserved,
        field_access_policies,
        parameters: read_parameters(element, ctx),
        vendor_extensions: read_vendor_extensions(element),
    };
    ctx.leave();
    field
}

fn read_fields(element: &XmlElement, ctx: &mut ReadContext) -> Vec<Field> {
    element
        .children_named("field")
        .map(|field| read_field(field, ctx))
        .collect()
}

/// Register-level `access`, which Std22 replaced with access policies.
fn read_legacy_access(element: &XmlElement, ctx: &mut ReadContext) -> Option<AccessType> {
    if ctx.profile().has_access_policies {
        let _ = ctx.child_if(element, "access", false);
        return None;
    }
    read_keyword(element, "access", ctx)
}

/// One `alternateRegister` element.
pub fn read_alternate_register(element: &XmlElement, ctx: &mut ReadContext) -> AlternateRegister {
    let name_group = read_name_group(element, ctx);
    ctx.enter("alternate register", &name_group.name);

    let has_modes = ctx.profile().has_modes;
    let alternate_groups = match ctx.child_if(element, "alternateGroups", !has_modes) {
        Some(groups) => groups.children_named("alternateGroup").map(XmlElement::text).collect(),
        None => Vec::new(),
    };
    let register = AlternateRegister {
        name_group,
        is_present: read_is_present(element, ctx),
        alternate_groups,
        mode_refs: if has_modes { read_mode_refs(element) } else { Vec::new() },
        type_identifier: text(element, "typeIdentifier"),
        volatile: read_bool(element, "volatile", ctx),
        access: read_legacy_access(element, ctx),
        access_policies: read_access_policies(element, ctx),
        fields: read_fields(element, ctx),
        parameters: read_parameters(element, ctx),
        vendor_extensions: read_vendor_extensions(element),
    };
    ctx.leave();
    register
}

/// One `register` element.
pub fn read_register(element: &XmlElement, ctx: &mut ReadContext) -> Register {
    let name_group = read_name_group(element, ctx);
    ctx.enter("register", &name_group.name);

    let alternate_registers = match element.child("alternateRegisters") {
        Some(list) => list
            .children_named("alternateRegister")
            .map(|alternate| read_alternate_register(alternate, ctx))
            .collect(),
        None => Vec::new(),
    };
    let register = Register {
        name_group,
        is_present: read_is_present(element, ctx),
        memory_array: read_memory_array(element, "stride", ctx),
        address_offset: text(element, "addressOffset"),
        register_definition_ref: read_definition_ref(element, "registerDefinitionRef", ctx),
        type_identifier: text(element, "typeIdentifier"),
        size: text(element, "size"),
        volatile: read_bool(element, "volatile", ctx),
        access: read_legacy_access(element, ctx),
        access_policies: read_access_policies(element, ctx),
        fields: read_fields(element, ctx),
        alternate_registers,
        parameters: read_parameters(element, ctx),
        vendor_extensions: read_vendor_extensions(element),
    };
    ctx.leave();
    register
}

/// Registers and register files among the children of `element`, in
/// document order.
fn read_register_data(element: &XmlElement, ctx: &mut ReadContext) -> Vec<RegisterData> {
    element
        .elements()
        .filter_map(|child| match child.local_name() {
            "register" => Some(RegisterData::from(read_register(child, ctx))),
            "registerFile" => Some(RegisterData::from(read_register_file(child, ctx))),
            _ => None,
        })
        .collect()
}

/// One `registerFile` element.
pub fn read_register_file(element: &XmlElement, ctx: &mut ReadContext) -> RegisterFile {
    let name_group = read_name_group(element, ctx);
    ctx.enter("register file", &name_group.name);

    let register_file = RegisterFile {
        name_group,
        is_present: read_is_present(element, ctx),
        memory_array: read_memory_array(element, "stride", ctx),
        address_offset: text(element, "addressOffset"),
        register_file_definition_ref: read_definition_ref(element, "registerFileDefinitionRef", ctx),
        type_identifier: text(element, "typeIdentifier"),
        range: text(element, "range"),
        access_policies: read_access_policies(element, ctx),
        register_data: read_register_data(element, ctx),
        parameters: read_parameters(element, ctx),
        vendor_extensions: read_vendor_extensions(element),
    };
    ctx.leave();
    register_file
}

/// One `addressBlock` element.
pub fn read_address_block(element: &XmlElement, ctx: &mut ReadContext) -> AddressBlock {
    let name_group = read_name_group(element, ctx);
    ctx.enter("address block", &name_group.name);

    let block = AddressBlock {
        name_group,
        is_present: read_is_present(element, ctx),
        memory_array: read_memory_array(element, "stride", ctx),
        base_address: text(element, "baseAddress"),
        address_block_definition_ref: read_definition_ref(element, "addressBlockDefinitionRef", ctx),
        type_identifier: text(element, "typeIdentifier"),
        range: text(element, "range"),
        width: text(element, "width"),
        usage: read_keyword(element, "usage", ctx),
        volatile: read_bool(element, "volatile", ctx),
        access: read_legacy_access(element, ctx),
        access_policies: read_access_policies(element, ctx),
        parameters: read_parameters(element, ctx),
        register_data: read_register_data(element, ctx),
        vendor_extensions: read_vendor_extensions(element),
    };
    ctx.leave();
    block
}

/// One `subspaceMap` element.
pub fn read_subspace_map(element: &XmlElement, ctx: &mut ReadContext) -> SubspaceMap {
    let name_group = read_name_group(element, ctx);
    let initiator_ref = element
        .attribute(ctx.profile().subspace_initiator_ref)
        .or_else(|| element.attribute("masterRef"))
        .or_else(|| element.attribute("initiatorRef"))
        .unwrap_or_default()
        .to_string();
    SubspaceMap {
        name_group,
        is_present: read_is_present(element, ctx),
        initiator_ref,
        segment_ref: element.attribute("segmentRef").unwrap_or_default().to_string(),
        base_address: text(element, "baseAddress"),
        parameters: read_parameters(element, ctx),
        vendor_extensions: read_vendor_extensions(element),
    }
}

/// One `memoryMap` element.
pub fn read_memory_map(element: &XmlElement, ctx: &mut ReadContext) -> MemoryMap {
    let name_group = read_name_group(element, ctx);
    ctx.enter("memory map", &name_group.name);

    let mut blocks = Vec::new();
    for child in element.elements() {
        match child.local_name() {
            "addressBlock" => blocks.push(MemoryBlock::from(read_address_block(child, ctx))),
            "subspaceMap" => blocks.push(MemoryBlock::from(read_subspace_map(child, ctx))),
            "bank" => ctx.issue(format!(
                "bank '{}' is not supported and was skipped",
                text(child, "name")
            )),
            _ => {}
        }
    }
    let memory_map = MemoryMap {
        name_group,
        is_present: read_is_present(element, ctx),
        blocks,
        memory_remaps: element.children_named("memoryRemap").cloned().collect(),
        address_unit_bits: text(element, "addressUnitBits"),
        shared: text(element, "shared"),
        vendor_extensions: read_vendor_extensions(element),
    };
    ctx.leave();
    memory_map
}
