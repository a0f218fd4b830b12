//! Validator chain over whole documents.

use ipxact_core::{
    AccessPolicy, AddressBlock, BusDefinition, Component, DocumentParameterFinder, Field, MemoryMap, Mode,
    ModeReference, Parameter, Register, RegisterData, RegisterFile, Revision, Vlnv, VlnvType,
};
use ipxact_expr::{ExpressionEvaluator, NullFinder};
use ipxact_validate::{
    AddressBlockValidator, ComponentValidator, DocumentValidator, FieldValidator, MemoryMapValidator,
    RegisterFileValidator, RegisterValidator, ValidationEnv, Validator,
};
use rstest::rstest;

fn env(revision: Revision) -> ValidationEnv<'static> {
    ValidationEnv::new(ExpressionEvaluator::new(&NullFinder), revision)
}

fn errors_of<T, V: Validator<T>>(validator: &V, item: &T, context: &str) -> Vec<String> {
    let mut errors = Vec::new();
    validator.find_errors_in(&mut errors, item, context);
    errors
}

fn register(name: &str, offset: &str) -> Register {
    let mut register = Register::new(name, offset, "32");
    register.fields.push(Field::new("data", "0", "32"));
    register
}

fn uart() -> Component {
    let mut component = Component::new(Vlnv::new(VlnvType::Component, "acme", "ip", "uart", "1.0"), Revision::Std22);
    let mut block = AddressBlock::new("regs", "0");
    block.range = "'h20".into();
    block.register_data.push(register("ctrl", "0").into());
    block.register_data.push(register("status", "4").into());
    let mut map = MemoryMap::new("bus");
    map.blocks.push(block.into());
    component.memory_maps.push(map);
    component
}

#[test]
fn field_exceeding_its_register_is_reported() {
    let env = env(Revision::Std14);
    let mut register = Register::new("r", "0", "8");
    register.fields.push(Field::new("f", "4", "8"));

    let errors = errors_of(&RegisterValidator::new(&env), &register, "address block regs");
    assert_eq!(errors, ["Field f is not contained within r"]);
    assert!(FieldValidator::new(&env).validate(&register.fields[0]));
}

#[test]
fn register_file_with_duplicate_registers() {
    let env = env(Revision::Std14);
    let mut register_file = RegisterFile::new("bank", "0", "16");
    register_file.register_data.push(register("reg", "0").into());
    register_file.register_data.push(register("reg", "8").into());

    let errors = errors_of(&RegisterFileValidator::new(&env), &register_file, "address block regs");
    assert_eq!(
        errors,
        ["Name reg of registers in register file 'bank' within address block regs is not unique."]
    );
}

#[rstest]
#[case(Register::new("", "0", "8"), false)]
#[case(register("ctrl", "0"), true)]
#[case(Register::new("ctrl", "x", "8"), false)]
fn register_validation_is_total(#[case] register: Register, #[case] valid: bool) {
    let env = env(Revision::Std14);
    let validator = RegisterValidator::new(&env);
    assert_eq!(validator.validate(&register), valid);
    assert_eq!(validator.validate(&register), errors_of(&validator, &register, "").is_empty());
}

#[rstest]
#[case(Revision::Std14)]
#[case(Revision::Std22)]
fn validation_is_total_across_the_tree(#[case] revision: Revision) {
    let env = env(revision);
    let mut component = uart();
    component.data.revision = revision;
    let block = component.memory_maps[0].blocks[0].as_address_block().cloned().unwrap_or_default();

    let block_validator = AddressBlockValidator::new(&env);
    assert_eq!(block_validator.validate(&block), errors_of(&block_validator, &block, "").is_empty());
    let map_validator = MemoryMapValidator::new(&env);
    let map = &component.memory_maps[0];
    assert_eq!(map_validator.validate(map), errors_of(&map_validator, map, "").is_empty());
    let component_validator = ComponentValidator::new(&env);
    assert!(component_validator.validate(&component));
}

#[test]
fn siblings_sharing_a_name_produce_one_error_each_kind() {
    let env = env(Revision::Std14);
    let mut block = AddressBlock::new("regs", "0");
    block.range = "'h100".into();
    block.register_data.push(register("twin", "0").into());
    block.register_data.push(register("twin", "'h10").into());
    let mut file = RegisterFile::new("pair", "'h20", "'h10");
    file.register_data.push(register("inner", "0").into());
    block.register_data.push(file.clone().into());
    file.address_offset = "'h40".into();
    block.register_data.push(RegisterData::from(file));

    let errors = errors_of(&AddressBlockValidator::new(&env), &block, "memory map bus");
    assert_eq!(
        errors,
        [
            "Name twin of registers in address block 'regs' within memory map bus is not unique.",
            "Name pair of register files in address block 'regs' within memory map bus is not unique.",
        ]
    );
}

#[test]
fn mode_references_resolve_against_the_component() {
    let mut component = uart();
    component.modes.push(Mode::new("normal"));
    let policy = |mode: &str, priority: &str| AccessPolicy {
        mode_refs: vec![ModeReference::new(mode, priority)],
        ..Default::default()
    };
    if let Some(RegisterData::Register(ctrl)) = component.memory_maps[0].blocks[0]
        .as_address_block_mut()
        .and_then(|block| block.register_data.first_mut())
    {
        ctrl.access_policies.push(policy("normal", "0"));
        ctrl.access_policies.push(policy("debug", "1"));
    }

    let env = env(Revision::Unknown);
    let errors = errors_of(&ComponentValidator::new(&env), &component, "");
    assert_eq!(
        errors,
        ["Mode reference debug in access policies of register 'ctrl' within address block regs does not refer to any existing mode."]
    );
}

#[test]
fn expressions_resolve_through_the_document_parameters() {
    let mut component = uart();
    let mut width = Parameter::new("width", "32");
    width.value_id = "width_id".into();
    component.data.parameters.push(width);
    if let Some(RegisterData::Register(ctrl)) = component.memory_maps[0].blocks[0]
        .as_address_block_mut()
        .and_then(|block| block.register_data.first_mut())
    {
        ctrl.size = "width_id".into();
        ctrl.fields[0].bit_width = "width_id".into();
    }

    let finder = DocumentParameterFinder::for_component(&component);
    let env = ValidationEnv::new(ExpressionEvaluator::new(&finder), Revision::Std22);
    assert!(ComponentValidator::new(&env).validate(&component));

    let unresolved = ValidationEnv::new(ExpressionEvaluator::new(&NullFinder), Revision::Std22);
    let errors = errors_of(&ComponentValidator::new(&unresolved), &component, "");
    assert!(errors.contains(&"Invalid size specified for register 'ctrl' within address block regs".to_string()));
}

#[test]
fn documents_are_validated_by_kind() {
    let env = env(Revision::Unknown);
    let validator = DocumentValidator::new(&env);
    assert!(validator.errors(&uart().into()).is_empty());

    let mut bus = BusDefinition::new(Vlnv::new(VlnvType::BusDefinition, "acme", "bus", "apb", "1.0"), Revision::Std14);
    bus.max_initiators = "many".into();
    assert_eq!(
        validator.errors(&bus.into()),
        ["Invalid max initiators set for bus definition acme:bus:apb:1.0"]
    );
}
