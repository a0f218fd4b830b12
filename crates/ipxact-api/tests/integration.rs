//! Editing documents through the library, the facades, and the configured
//! reader and writer.

use ipxact_api::{
    parse_config_toml, BlockExpression, FieldExpression, MemoryBlockInterface, MemoryLibrary, ParameterExpression,
    ParametersInterface, RegisterExpression, ToolConfig,
};
use ipxact_core::{Component, Document, DocumentParameterFinder, LibraryInterface, Revision, Vlnv};
use ipxact_validate::{DocumentValidator, ValidationEnv};
use ipxact_xml::STD22;

fn timer_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ipxact:component xmlns:ipxact="{}">
    <ipxact:vendor>acme</ipxact:vendor>
    <ipxact:library>ip</ipxact:library>
    <ipxact:name>timer</ipxact:name>
    <ipxact:version>1.0</ipxact:version>
    <ipxact:memoryMaps>
        <ipxact:memoryMap>
            <ipxact:name>regs</ipxact:name>
            <ipxact:addressBlock>
                <ipxact:name>block</ipxact:name>
                <ipxact:baseAddress>'h0</ipxact:baseAddress>
                <ipxact:range>16</ipxact:range>
                <ipxact:width>32</ipxact:width>
                <ipxact:register>
                    <ipxact:name>ctrl</ipxact:name>
                    <ipxact:addressOffset>0</ipxact:addressOffset>
                    <ipxact:size>32</ipxact:size>
                    <ipxact:field>
                        <ipxact:name>count</ipxact:name>
                        <ipxact:bitOffset>0</ipxact:bitOffset>
                        <ipxact:bitWidth>width_id</ipxact:bitWidth>
                    </ipxact:field>
                </ipxact:register>
            </ipxact:addressBlock>
            <ipxact:addressUnitBits>8</ipxact:addressUnitBits>
        </ipxact:memoryMap>
    </ipxact:memoryMaps>
    <ipxact:parameters>
        <ipxact:parameter parameterId="width_id" resolve="immediate" type="int">
            <ipxact:name>width</ipxact:name>
            <ipxact:value>16</ipxact:value>
        </ipxact:parameter>
    </ipxact:parameters>
</ipxact:component>
"#,
        STD22.namespace
    )
}

fn timer_vlnv() -> Vlnv {
    "acme:ip:timer:1.0".parse().unwrap()
}

fn load(config: &ToolConfig) -> MemoryLibrary {
    let mut library = MemoryLibrary::new("/library");
    let (vlnv, issues) = library.load_xml(&config.reader(), &timer_xml()).unwrap();
    assert_eq!(vlnv, timer_vlnv());
    assert!(issues.is_empty(), "unexpected issues: {issues:?}");
    library
}

fn component(document: &mut Document) -> &mut Component {
    document.as_component_mut().unwrap()
}

#[test]
fn edit_through_facades_and_store_back() {
    let config = ToolConfig::default();
    let mut library = load(&config);
    let mut document = library.resolve(&timer_vlnv()).unwrap();

    let parameters = component(&mut document).data.parameters.clone();
    let finder = DocumentParameterFinder::from_parameters(&parameters);
    let env = ValidationEnv::new(config.evaluator(&finder), Revision::Std22);

    {
        let map = &mut component(&mut document).memory_maps[0];
        let mut blocks = MemoryBlockInterface::new(map, env);
        assert_eq!(blocks.names(), ["block"]);
        assert_eq!(blocks.expression("block", BlockExpression::Range).unwrap().value, "16");

        let mut registers = blocks.registers("block").unwrap();
        let status = registers.add("status");
        assert_eq!(registers.expression(&status, RegisterExpression::AddressOffset).unwrap().expression, "'h4");
        assert!(!registers.is_valid(&status).unwrap());

        let mut fields = registers.fields(&status).unwrap();
        let ready = fields.add(None, "ready");
        fields.set_expression(&ready, FieldExpression::BitWidth, "width_id").unwrap();
        assert_eq!(fields.expression(&ready, FieldExpression::BitWidth).unwrap().value, "16");
        assert!(registers.is_valid(&status).unwrap());
        assert_eq!(registers.total_references("width_id"), 2);
    }

    let validator_env = ValidationEnv::new(config.evaluator(&finder), Revision::Unknown);
    assert!(DocumentValidator::new(&validator_env).errors(&document).is_empty());

    library.write_model_to_file(&document).unwrap();
    let text = library.export_xml(&config.writer(), &timer_vlnv(), Revision::Std22).unwrap();
    assert!(text.contains("<ipxact:name>status</ipxact:name>"));

    let mut reread = MemoryLibrary::new("/other");
    let (vlnv, issues) = reread.load_xml(&config.reader(), &text).unwrap();
    assert!(issues.is_empty());
    assert_eq!(reread.document(&vlnv), library.document(&vlnv));
}

#[test]
fn parameter_usage_is_counted_across_the_document() {
    let config = ToolConfig::default();
    let library = load(&config);
    let mut document = library.resolve(&timer_vlnv()).unwrap();
    let tree = document.clone();

    let mut parameters = ParametersInterface::new(&mut component(&mut document).data.parameters, Revision::Std22)
        .with_context("component acme:ip:timer:1.0");
    assert_eq!(parameters.usage_in("width", &tree).unwrap(), 1);

    let depth = parameters.add(None, "depth");
    let id = parameters.value_id(&depth).unwrap().to_string();
    parameters.set_expression(&depth, ParameterExpression::Value, "width_id * 2").unwrap();
    assert_eq!(parameters.expression(&depth, ParameterExpression::Value).unwrap().value, "32");
    assert_eq!(parameters.reference_count("width").unwrap(), 1);
    assert!(parameters.all_valid());
    assert_eq!(parameters.usage_in(&depth, &tree).unwrap(), 0);
    assert!(id.starts_with("uuid_"));
}

#[test]
fn configured_division_policy_reaches_the_facades() {
    let strict = parse_config_toml("[evaluator]\ndivision-by-zero = \"error\"").unwrap();
    let lenient = ToolConfig::default();
    let library = load(&lenient);

    for (config, expected) in [(&strict, "x"), (&lenient, "0")] {
        let mut document = library.resolve(&timer_vlnv()).unwrap();
        let parameters = component(&mut document).data.parameters.clone();
        let finder = DocumentParameterFinder::from_parameters(&parameters);
        let env = ValidationEnv::new(config.evaluator(&finder), Revision::Std22);

        let map = &mut component(&mut document).memory_maps[0];
        let mut blocks = MemoryBlockInterface::new(map, env);
        blocks.set_expression("block", BlockExpression::Width, "width_id / 0").unwrap();
        assert_eq!(blocks.expression("block", BlockExpression::Width).unwrap().value, expected);
    }
}

#[test]
fn missing_documents_and_names_are_errors() {
    let config = ToolConfig::default();
    let library = load(&config);
    let missing: Vlnv = "acme:ip:timer:2.0".parse().unwrap();
    assert!(library.export_xml(&config.writer(), &missing, Revision::Std22).is_err());

    let mut document = library.resolve(&timer_vlnv()).unwrap();
    let map = &mut component(&mut document).memory_maps[0];
    let env = ValidationEnv::new(config.evaluator(&ipxact_expr::NullFinder), Revision::Std22);
    let mut blocks = MemoryBlockInterface::new(map, env);
    assert_eq!(blocks.rename("nothing", "x").unwrap_err().to_string(), "no item named 'nothing'");
    blocks.rename("block", "block").unwrap();
    assert_eq!(blocks.names(), ["block"]);
}
