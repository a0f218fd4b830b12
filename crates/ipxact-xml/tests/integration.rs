//! Integration tests for reading and writing whole documents.

use ipxact_core::{Document, Revision, XmlNode};
use ipxact_xml::profile::{KACTUS2_NAMESPACE, XSI_NAMESPACE};
use ipxact_xml::{
    DocumentReader, DocumentWriter, ParseError, SchemaProfile, WriterOptions, XmlDocument,
    XmlError, STD14, STD22,
};
use rstest::rstest;

fn root_attributes(profile: &SchemaProfile) -> String {
    format!(
        r#"xmlns:xsi="{XSI_NAMESPACE}" xmlns:ipxact="{}" xmlns:kactus2="{KACTUS2_NAMESPACE}" xsi:schemaLocation="{}""#,
        profile.namespace, profile.schema_location
    )
}

fn std14_bus_definition() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!--Commented section-->
<ipxact:busDefinition {}>
    <ipxact:vendor>tut.fi</ipxact:vendor>
    <ipxact:library>TestLibrary</ipxact:library>
    <ipxact:name>TestBusDefinition</ipxact:name>
    <ipxact:version>0.1</ipxact:version>
    <ipxact:directConnection>true</ipxact:directConnection>
    <ipxact:isAddressable>false</ipxact:isAddressable>
    <ipxact:extends vendor="tut.fi" library="TestLibrary" name="Base" version="0.1"/>
    <ipxact:maxMasters>4</ipxact:maxMasters>
    <ipxact:maxSlaves>width_id * 2</ipxact:maxSlaves>
    <ipxact:systemGroupNames>
        <ipxact:systemGroupName>system</ipxact:systemGroupName>
    </ipxact:systemGroupNames>
    <ipxact:description>Test bus</ipxact:description>
    <ipxact:parameters>
        <ipxact:parameter parameterId="width_id" resolve="user" type="int">
            <ipxact:name>width</ipxact:name>
            <ipxact:vectors>
                <ipxact:vector>
                    <ipxact:left>7</ipxact:left>
                    <ipxact:right>0</ipxact:right>
                </ipxact:vector>
            </ipxact:vectors>
            <ipxact:value>8</ipxact:value>
        </ipxact:parameter>
    </ipxact:parameters>
    <ipxact:assertions>
        <ipxact:assertion>
            <ipxact:name>positive</ipxact:name>
            <ipxact:assert>width_id &gt; 0</ipxact:assert>
        </ipxact:assertion>
    </ipxact:assertions>
    <ipxact:vendorExtensions>
        <kactus2:version>3.13.0</kactus2:version>
        <kactus2:note kind="free">keep &amp; carry</kactus2:note>
    </ipxact:vendorExtensions>
</ipxact:busDefinition>
"#,
        root_attributes(&STD14)
    )
}

fn std22_component() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ipxact:component {}>
    <ipxact:vendor>tut.fi</ipxact:vendor>
    <ipxact:library>TestLibrary</ipxact:library>
    <ipxact:name>TestComponent</ipxact:name>
    <ipxact:version>1.0</ipxact:version>
    <ipxact:displayName>Test component</ipxact:displayName>
    <ipxact:description>A component</ipxact:description>
    <ipxact:busInterfaces>
        <ipxact:busInterface>
            <ipxact:name>bus</ipxact:name>
        </ipxact:busInterface>
    </ipxact:busInterfaces>
    <ipxact:modes>
        <ipxact:mode>
            <ipxact:name>normal</ipxact:name>
            <ipxact:condition>1</ipxact:condition>
        </ipxact:mode>
    </ipxact:modes>
    <ipxact:memoryMaps>
        <ipxact:memoryMap>
            <ipxact:name>regs</ipxact:name>
            <ipxact:addressBlock>
                <ipxact:name>block</ipxact:name>
                <ipxact:baseAddress>'h0</ipxact:baseAddress>
                <ipxact:range>16</ipxact:range>
                <ipxact:width>32</ipxact:width>
                <ipxact:usage>register</ipxact:usage>
                <ipxact:register>
                    <ipxact:name>ctrl</ipxact:name>
                    <ipxact:addressOffset>0</ipxact:addressOffset>
                    <ipxact:size>32</ipxact:size>
                    <ipxact:accessPolicies>
                        <ipxact:accessPolicy>
                            <ipxact:modeRef priority="0">normal</ipxact:modeRef>
                            <ipxact:access>read-write</ipxact:access>
                        </ipxact:accessPolicy>
                    </ipxact:accessPolicies>
                    <ipxact:field>
                        <ipxact:name>enable</ipxact:name>
                        <ipxact:bitOffset>0</ipxact:bitOffset>
                        <ipxact:resets>
                            <ipxact:reset>
                                <ipxact:value>0</ipxact:value>
                            </ipxact:reset>
                        </ipxact:resets>
                        <ipxact:bitWidth>1</ipxact:bitWidth>
                        <ipxact:volatile>true</ipxact:volatile>
                        <ipxact:fieldAccessPolicies>
                            <ipxact:fieldAccessPolicy>
                                <ipxact:access>read-write</ipxact:access>
                            </ipxact:fieldAccessPolicy>
                        </ipxact:fieldAccessPolicies>
                        <ipxact:enumeratedValues>
                            <ipxact:enumeratedValue usage="read-write">
                                <ipxact:name>on</ipxact:name>
                                <ipxact:value>1</ipxact:value>
                            </ipxact:enumeratedValue>
                        </ipxact:enumeratedValues>
                    </ipxact:field>
                    <ipxact:field>
                        <ipxact:name>mode</ipxact:name>
                        <ipxact:bitOffset>1</ipxact:bitOffset>
                        <ipxact:bitWidth>width_id</ipxact:bitWidth>
                    </ipxact:field>
                </ipxact:register>
            </ipxact:addressBlock>
            <ipxact:subspaceMap initiatorRef="bus">
                <ipxact:name>sub</ipxact:name>
                <ipxact:baseAddress>'h100</ipxact:baseAddress>
            </ipxact:subspaceMap>
            <ipxact:addressUnitBits>8</ipxact:addressUnitBits>
        </ipxact:memoryMap>
    </ipxact:memoryMaps>
    <ipxact:model>
        <ipxact:views/>
    </ipxact:model>
    <ipxact:parameters>
        <ipxact:parameter parameterId="width_id" resolve="immediate" type="int">
            <ipxact:name>width</ipxact:name>
            <ipxact:value>8</ipxact:value>
        </ipxact:parameter>
    </ipxact:parameters>
    <ipxact:vendorExtensions>
        <kactus2:version>3.13.0</kactus2:version>
    </ipxact:vendorExtensions>
</ipxact:component>
"#,
        root_attributes(&STD22)
    )
}

/// Root attributes as Kactus2 writes them, plus a vendor namespace and a
/// foreign attribute.
fn foreign_namespace_bus_definition() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ipxact:busDefinition xmlns:ipxact="{ns}/" xmlns:acme="http://acme.example/ext" xmlns:xsi="{XSI_NAMESPACE}" xsi:schemaLocation="{ns}/ {ns}/index.xsd" acme:origin="generated">
    <ipxact:vendor>acme</ipxact:vendor>
    <ipxact:library>buses</ipxact:library>
    <ipxact:name>hinted</ipxact:name>
    <ipxact:version>1.0</ipxact:version>
    <ipxact:directConnection>true</ipxact:directConnection>
    <ipxact:isAddressable>false</ipxact:isAddressable>
    <ipxact:vendorExtensions>
        <acme:hint>x</acme:hint>
    </ipxact:vendorExtensions>
</ipxact:busDefinition>
"#,
        ns = STD14.namespace
    )
}

fn std14_component() -> String {
    format!(
        r#"<ipxact:component {}>
    <ipxact:vendor>tut.fi</ipxact:vendor>
    <ipxact:library>TestLibrary</ipxact:library>
    <ipxact:name>Indirect</ipxact:name>
    <ipxact:version>1.0</ipxact:version>
    <ipxact:busInterfaces>
        <ipxact:busInterface>
            <ipxact:name>bus</ipxact:name>
        </ipxact:busInterface>
    </ipxact:busInterfaces>
    <ipxact:indirectInterfaces>
        <ipxact:indirectInterface>
            <ipxact:name>indirect</ipxact:name>
        </ipxact:indirectInterface>
    </ipxact:indirectInterfaces>
    <ipxact:memoryMaps>
        <ipxact:memoryMap>
            <ipxact:name>regs</ipxact:name>
            <ipxact:addressUnitBits>8</ipxact:addressUnitBits>
        </ipxact:memoryMap>
    </ipxact:memoryMaps>
    <ipxact:parameters>
        <ipxact:parameter parameterId="width_id">
            <ipxact:name>width</ipxact:name>
            <ipxact:value>8</ipxact:value>
        </ipxact:parameter>
    </ipxact:parameters>
</ipxact:component>"#,
        root_attributes(&STD14)
    )
}

fn read(text: &str) -> Document {
    let parsed = DocumentReader::default().parse_str(text).expect("parse document");
    assert!(parsed.is_clean(), "unexpected issues: {:?}", parsed.issues);
    parsed.value
}

#[rstest]
#[case::std14_bus_definition(std14_bus_definition(), Revision::Std14)]
#[case::std22_component(std22_component(), Revision::Std22)]
#[case::foreign_namespace(foreign_namespace_bus_definition(), Revision::Std14)]
fn round_trip_preserves_the_tree(#[case] text: String, #[case] revision: Revision) {
    let original = XmlDocument::parse(&text).expect("parse xml");
    let document = read(&text);
    assert_eq!(document.revision(), revision);

    let written = DocumentWriter::default().write(&document, revision);
    assert!(
        written.root.equivalent(&original.root),
        "written tree differs:\n{}",
        written.to_xml_string(4).unwrap_or_default()
    );
    assert_eq!(written.prolog, original.prolog);
}

#[rstest]
#[case::compact(0)]
#[case::indented(2)]
fn write_then_read_is_idempotent(#[case] indent: usize) {
    let writer = DocumentWriter::new(WriterOptions {
        indent,
        ..WriterOptions::default()
    });
    for text in [std14_bus_definition(), std22_component(), foreign_namespace_bus_definition(), std14_component()] {
        let document = read(&text);
        let written = writer
            .write_string(&document, document.revision())
            .expect("write document");
        assert_eq!(read(&written), document);
    }
}

#[test]
fn std14_bus_definition_model() {
    let document = read(&std14_bus_definition());
    let bus = document.as_bus_definition().expect("bus definition");

    assert!(bus.direct_connection);
    assert_eq!(bus.broadcast, None);
    assert!(!bus.is_addressable);
    assert_eq!(bus.extends.to_string(), "tut.fi:TestLibrary:Base:0.1");
    assert_eq!(bus.max_targets, "width_id * 2");
    assert_eq!(bus.data.assertions[0].assert, "width_id > 0");
    assert_eq!(
        bus.data.prolog,
        vec![XmlNode::Comment("Commented section".into())]
    );
    assert_eq!(bus.data.vendor_extensions.len(), 2);
}

#[test]
fn written_std14_bus_definition_leaves_broadcast_out() {
    let document = read(&std14_bus_definition());
    let text = DocumentWriter::default()
        .write_string(&document, Revision::Std14)
        .expect("write");

    assert!(text.contains("<ipxact:directConnection>true</ipxact:directConnection>"));
    assert!(!text.contains("broadcast"));
    assert!(text.contains("<kactus2:note kind=\"free\">keep &amp; carry</kactus2:note>"));
    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
}

#[test]
fn std22_choices_are_dropped_when_writing_std14() {
    let mut document = read(&std14_bus_definition());
    document.data_mut().choices.push(ipxact_core::Choice {
        name: "widths".into(),
        enumerations: Vec::new(),
    });

    let std22 = DocumentWriter::default().write(&document, Revision::Std22);
    assert!(std22.root.child("choices").is_some());
    assert_eq!(std22.root.attribute("xmlns:ipxact"), Some(STD22.namespace));
    assert!(std22.root.child("maxInitiators").is_some());

    let std14 = DocumentWriter::default().write(&document, Revision::Std14);
    assert!(std14.root.child("choices").is_none());
}

#[test]
fn std22_component_converts_to_std14() {
    let document = read(&std22_component());
    let written = DocumentWriter::default().write(&document, Revision::Std14);
    let root = &written.root;

    assert!(root.child("modes").is_none());
    assert!(root.child("displayName").is_none());
    let names: Vec<_> = root.elements().map(|e| e.local_name()).collect();
    assert_eq!(
        names,
        ["vendor", "library", "name", "version", "busInterfaces", "memoryMaps", "model", "description", "parameters", "vendorExtensions"]
    );

    let map = root.child("memoryMaps").and_then(|maps| maps.child("memoryMap")).expect("memory map");
    assert_eq!(
        map.child("subspaceMap").and_then(|sub| sub.attribute("masterRef")),
        Some("bus")
    );
    let register = map
        .child("addressBlock")
        .and_then(|block| block.child("register"))
        .expect("register");
    assert!(register.child("accessPolicies").is_none());
    let field = register.child("field").expect("field");
    assert!(field.child("fieldAccessPolicies").is_none());
}

#[test]
fn foreign_root_attributes_survive_writing() {
    let document = read(&foreign_namespace_bus_definition());
    let text = DocumentWriter::default()
        .write_string(&document, Revision::Std14)
        .expect("write");
    assert!(text.contains(r#"xmlns:acme="http://acme.example/ext""#));
    assert!(text.contains(r#"acme:origin="generated""#));
    assert!(text.contains("<acme:hint>x</acme:hint>"));

    let std22 = DocumentWriter::default().write(&document, Revision::Std22);
    assert_eq!(std22.root.attribute("xmlns:ipxact"), Some(STD22.namespace));
    assert_eq!(std22.root.attribute("xsi:schemaLocation"), Some(STD22.schema_location));
    assert_eq!(std22.root.attribute("xmlns:acme"), Some("http://acme.example/ext"));
}

#[test]
fn std14_component_children_follow_the_schema() {
    let document = read(&std14_component());
    let written = DocumentWriter::default().write(&document, Revision::Std14);
    let names: Vec<_> = written.root.elements().map(|e| e.local_name()).collect();
    assert_eq!(
        names,
        ["vendor", "library", "name", "version", "busInterfaces", "indirectInterfaces", "memoryMaps", "parameters"]
    );
}

#[test]
fn component_model_keeps_mixed_content() {
    let document = read(&std22_component());
    let component = document.as_component().expect("component");

    assert_eq!(component.mode_names(), ["normal"]);
    let map = component.memory_map("regs").expect("memory map");
    assert_eq!(map.blocks.len(), 2);
    assert_eq!(map.address_unit_bits, "8");
    let block = map.blocks[0].as_address_block().expect("address block");
    let register = block.register_data[0].as_register().expect("register");
    let fields: Vec<_> = register.fields.iter().map(|f| f.name_group.name.as_str()).collect();
    assert_eq!(fields, ["enable", "mode"]);
    assert_eq!(register.access_policies[0].mode_refs[0].reference, "normal");
    assert_eq!(component.other_elements.len(), 2);
}

#[test]
fn elements_outside_the_revision_are_skipped() {
    let text = format!(
        r#"<ipxact:busDefinition {}>
            <ipxact:vendor>v</ipxact:vendor>
            <ipxact:library>l</ipxact:library>
            <ipxact:name>n</ipxact:name>
            <ipxact:version>1</ipxact:version>
            <ipxact:directConnection>false</ipxact:directConnection>
            <ipxact:isAddressable>true</ipxact:isAddressable>
            <ipxact:parameters>
                <ipxact:parameter parameterId="p">
                    <ipxact:name>p</ipxact:name>
                    <ipxact:shortDescription>only in 2022</ipxact:shortDescription>
                    <ipxact:value>1</ipxact:value>
                </ipxact:parameter>
            </ipxact:parameters>
        </ipxact:busDefinition>"#,
        root_attributes(&STD14)
    );
    let document = read(&text);
    assert_eq!(document.data().parameters[0].name_group.short_description, "");
}

#[test]
fn missing_names_are_issues() {
    let text = format!(
        r#"<ipxact:component {}>
            <ipxact:vendor>v</ipxact:vendor>
            <ipxact:library>l</ipxact:library>
            <ipxact:name>c</ipxact:name>
            <ipxact:version>1</ipxact:version>
            <ipxact:memoryMaps>
                <ipxact:memoryMap>
                    <ipxact:name>regs</ipxact:name>
                    <ipxact:addressBlock>
                        <ipxact:baseAddress>0</ipxact:baseAddress>
                    </ipxact:addressBlock>
                </ipxact:memoryMap>
            </ipxact:memoryMaps>
        </ipxact:component>"#,
        root_attributes(&STD22)
    );
    let parsed = DocumentReader::default().parse_str(&text).expect("parse");

    assert_eq!(parsed.issues.len(), 1);
    assert_eq!(parsed.issues[0].path, "component 'c' / memory map 'regs'");
    let component = parsed.value.as_component().expect("component");
    assert_eq!(component.memory_maps[0].blocks.len(), 1);
}

#[test]
fn unknown_document_kind_is_fatal() {
    let result = DocumentReader::default().parse_str("<ipxact:design/>");
    assert_eq!(result, Err(ParseError::UnknownDocumentKind("design".into())));
}

#[test]
fn undeclared_revision_uses_the_target() {
    let text = "<ipxact:busDefinition>\
        <ipxact:vendor>v</ipxact:vendor><ipxact:library>l</ipxact:library>\
        <ipxact:name>n</ipxact:name><ipxact:version>1</ipxact:version>\
        </ipxact:busDefinition>";

    let parsed = DocumentReader::with_target(Revision::Std14).parse_str(text).expect("parse");
    assert_eq!(parsed.value.revision(), Revision::Std14);

    let result = DocumentReader::with_target(Revision::Unknown).parse_str(text);
    assert_eq!(result, Err(ParseError::UnsupportedRevision));
}

#[test]
fn malformed_xml_is_fatal() {
    let result = DocumentReader::default().parse_str("<ipxact:component><ipxact:name></ipxact:component>");
    assert!(matches!(result, Err(ParseError::Xml(XmlError::Malformed { .. }))));
}
