//! Expression enumeration, valueId reference counting, and parameter lookup.
//!
//! Expressions refer to parameters textually by valueId. Counting the uses
//! of a parameter is a scan over every expression string of a tree, driven
//! by [`HasExpressions`].

use std::collections::HashMap;

use ipxact_expr::{count_references, ParameterFinder};
use tracing::warn;

use crate::abstraction_definition::{AbstractionDefinition, PortAbstraction};
use crate::access::WriteValueConstraint;
use crate::bus_definition::BusDefinition;
use crate::common::HasName;
use crate::component::Component;
use crate::cpu::Cpu;
use crate::document::{Assertion, Document, DocumentData};
use crate::field::{EnumeratedValue, Field, FieldAccessPolicy};
use crate::memory::{AddressBlock, AddressSpace, MemoryBlock, MemoryMap, SubspaceMap};
use crate::memory_array::MemoryArray;
use crate::mode::Mode;
use crate::parameter::Parameter;
use crate::register::{AlternateRegister, Register, RegisterData, RegisterFile};

/// Receives the expressions of a tree walk.
pub trait ExpressionVisitor {
    /// A named child item is entered.
    fn enter(&mut self, _kind: &'static str, _name: &str) {}

    /// The most recently entered item is left.
    fn leave(&mut self) {}

    /// One expression of the current item.
    fn expression(&mut self, attribute: &'static str, expression: &str);
}

/// Items holding expression strings.
pub trait HasExpressions {
    /// `(attribute, expression)` pairs held directly by this item.
    fn expressions(&self) -> Vec<(&'static str, &str)>;

    /// Visit the child items that hold expressions of their own.
    fn visit_children(&self, _visitor: &mut dyn ExpressionVisitor) {}

    /// Visit this item's expressions, then its children.
    fn visit_expressions(&self, visitor: &mut dyn ExpressionVisitor) {
        for (attribute, expression) in self.expressions() {
            visitor.expression(attribute, expression);
        }
        self.visit_children(visitor);
    }
}

fn visit_item(visitor: &mut dyn ExpressionVisitor, kind: &'static str, name: &str, item: &dyn HasExpressions) {
    visitor.enter(kind, name);
    item.visit_expressions(visitor);
    visitor.leave();
}

fn visit_parameters(visitor: &mut dyn ExpressionVisitor, parameters: &[Parameter]) {
    for parameter in parameters {
        visit_item(visitor, "parameter", parameter.name(), parameter);
    }
}

fn array_expressions<'a>(array: Option<&'a MemoryArray>, out: &mut Vec<(&'static str, &'a str)>) {
    if let Some(array) = array {
        out.extend(array.dimensions.iter().map(|dim| ("dimension", dim.value.as_str())));
        out.push(("stride", array.stride.as_str()));
    }
}

fn constraint_expressions<'a>(
    constraint: Option<&'a WriteValueConstraint>,
    out: &mut Vec<(&'static str, &'a str)>,
) {
    if let Some(WriteValueConstraint::MinMax { minimum, maximum }) = constraint {
        out.push(("writeConstraintMinimum", minimum.as_str()));
        out.push(("writeConstraintMaximum", maximum.as_str()));
    }
}

impl HasExpressions for Parameter {
    fn expressions(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("value", self.value.as_str()),
            ("minimum", self.minimum.as_str()),
            ("maximum", self.maximum.as_str()),
            ("vectorLeft", self.vector_left.as_str()),
            ("vectorRight", self.vector_right.as_str()),
            ("arrayLeft", self.array_left.as_str()),
            ("arrayRight", self.array_right.as_str()),
        ]
    }
}

impl HasExpressions for EnumeratedValue {
    fn expressions(&self) -> Vec<(&'static str, &str)> {
        vec![("value", self.value.as_str())]
    }
}

impl HasExpressions for FieldAccessPolicy {
    fn expressions(&self) -> Vec<(&'static str, &str)> {
        let mut out = vec![
            ("readResponse", self.read_response.as_str()),
            ("reserved", self.reserved.as_str()),
        ];
        constraint_expressions(self.write_value_constraint.as_ref(), &mut out);
        out
    }
}

impl HasExpressions for Field {
    fn expressions(&self) -> Vec<(&'static str, &str)> {
        let mut out = vec![
            ("isPresent", self.is_present.as_str()),
            ("bitOffset", self.bit_offset.as_str()),
            ("bitWidth", self.bit_width.as_str()),
        ];
        for reset in &self.resets {
            out.push(("resetValue", reset.value.as_str()));
            out.push(("resetMask", reset.mask.as_str()));
        }
        out.push(("reserved", self.reserved.as_str()));
        constraint_expressions(self.write_value_constraint.as_ref(), &mut out);
        array_expressions(self.memory_array.as_ref(), &mut out);
        out
    }

    fn visit_children(&self, visitor: &mut dyn ExpressionVisitor) {
        for value in &self.enumerated_values {
            visit_item(visitor, "enumerated value", value.name(), value);
        }
        for policy in &self.field_access_policies {
            policy.visit_expressions(visitor);
        }
        visit_parameters(visitor, &self.parameters);
    }
}

impl HasExpressions for Register {
    fn expressions(&self) -> Vec<(&'static str, &str)> {
        let mut out = vec![
            ("isPresent", self.is_present.as_str()),
            ("addressOffset", self.address_offset.as_str()),
            ("size", self.size.as_str()),
        ];
        array_expressions(self.memory_array.as_ref(), &mut out);
        out
    }

    fn visit_children(&self, visitor: &mut dyn ExpressionVisitor) {
        for field in &self.fields {
            visit_item(visitor, "field", field.name(), field);
        }
        for alternate in &self.alternate_registers {
            visit_item(visitor, "alternate register", alternate.name(), alternate);
        }
        visit_parameters(visitor, &self.parameters);
    }
}

impl HasExpressions for AlternateRegister {
    fn expressions(&self) -> Vec<(&'static str, &str)> {
        vec![("isPresent", self.is_present.as_str())]
    }

    fn visit_children(&self, visitor: &mut dyn ExpressionVisitor) {
        for field in &self.fields {
            visit_item(visitor, "field", field.name(), field);
        }
        visit_parameters(visitor, &self.parameters);
    }
}

impl HasExpressions for RegisterFile {
    fn expressions(&self) -> Vec<(&'static str, &str)> {
        let mut out = vec![
            ("isPresent", self.is_present.as_str()),
            ("addressOffset", self.address_offset.as_str()),
            ("range", self.range.as_str()),
        ];
        array_expressions(self.memory_array.as_ref(), &mut out);
        out
    }

    fn visit_children(&self, visitor: &mut dyn ExpressionVisitor) {
        visit_register_data(visitor, &self.register_data);
        visit_parameters(visitor, &self.parameters);
    }
}

fn visit_register_data(visitor: &mut dyn ExpressionVisitor, data: &[RegisterData]) {
    for item in data {
        match item {
            RegisterData::Register(register) => visit_item(visitor, "register", register.name(), register),
            RegisterData::RegisterFile(file) => visit_item(visitor, "register file", file.name(), file),
        }
    }
}

impl HasExpressions for AddressBlock {
    fn expressions(&self) -> Vec<(&'static str, &str)> {
        let mut out = vec![
            ("isPresent", self.is_present.as_str()),
            ("baseAddress", self.base_address.as_str()),
            ("range", self.range.as_str()),
            ("width", self.width.as_str()),
        ];
        array_expressions(self.memory_array.as_ref(), &mut out);
        out
    }

    fn visit_children(&self, visitor: &mut dyn ExpressionVisitor) {
        visit_parameters(visitor, &self.parameters);
        visit_register_data(visitor, &self.register_data);
    }
}

impl HasExpressions for SubspaceMap {
    fn expressions(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("isPresent", self.is_present.as_str()),
            ("baseAddress", self.base_address.as_str()),
        ]
    }

    fn visit_children(&self, visitor: &mut dyn ExpressionVisitor) {
        visit_parameters(visitor, &self.parameters);
    }
}

impl HasExpressions for MemoryBlock {
    fn expressions(&self) -> Vec<(&'static str, &str)> {
        match self {
            MemoryBlock::AddressBlock(block) => block.expressions(),
            MemoryBlock::SubspaceMap(map) => map.expressions(),
        }
    }

    fn visit_children(&self, visitor: &mut dyn ExpressionVisitor) {
        match self {
            MemoryBlock::AddressBlock(block) => block.visit_children(visitor),
            MemoryBlock::SubspaceMap(map) => map.visit_children(visitor),
        }
    }
}

impl HasExpressions for MemoryMap {
    fn expressions(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("isPresent", self.is_present.as_str()),
            ("addressUnitBits", self.address_unit_bits.as_str()),
        ]
    }

    fn visit_children(&self, visitor: &mut dyn ExpressionVisitor) {
        for block in &self.blocks {
            let kind = match block {
                MemoryBlock::AddressBlock(_) => "address block",
                MemoryBlock::SubspaceMap(_) => "subspace map",
            };
            visit_item(visitor, kind, block.name(), block);
        }
    }
}

impl HasExpressions for AddressSpace {
    fn expressions(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("isPresent", self.is_present.as_str()),
            ("range", self.range.as_str()),
            ("width", self.width.as_str()),
            ("addressUnitBits", self.address_unit_bits.as_str()),
        ]
    }

    fn visit_children(&self, visitor: &mut dyn ExpressionVisitor) {
        visit_parameters(visitor, &self.parameters);
    }
}

impl HasExpressions for Cpu {
    fn expressions(&self) -> Vec<(&'static str, &str)> {
        let mut out = vec![
            ("isPresent", self.is_present.as_str()),
            ("range", self.range.as_str()),
            ("width", self.width.as_str()),
            ("addressUnitBits", self.address_unit_bits.as_str()),
        ];
        out.extend(
            self.address_space_refs
                .iter()
                .map(|reference| ("addressSpaceRefIsPresent", reference.is_present.as_str())),
        );
        out
    }

    fn visit_children(&self, visitor: &mut dyn ExpressionVisitor) {
        visit_parameters(visitor, &self.parameters);
    }
}

impl HasExpressions for Mode {
    fn expressions(&self) -> Vec<(&'static str, &str)> {
        vec![("condition", self.condition.as_str())]
    }
}

impl HasExpressions for Assertion {
    fn expressions(&self) -> Vec<(&'static str, &str)> {
        vec![("assert", self.assert.as_str())]
    }
}

impl HasExpressions for PortAbstraction {
    fn expressions(&self) -> Vec<(&'static str, &str)> {
        vec![("isPresent", self.is_present.as_str())]
    }
}

impl HasExpressions for DocumentData {
    fn expressions(&self) -> Vec<(&'static str, &str)> {
        Vec::new()
    }

    fn visit_children(&self, visitor: &mut dyn ExpressionVisitor) {
        visit_parameters(visitor, &self.parameters);
        for assertion in &self.assertions {
            visit_item(visitor, "assertion", assertion.name(), assertion);
        }
    }
}

impl HasExpressions for BusDefinition {
    fn expressions(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("maxInitiators", self.max_initiators.as_str()),
            ("maxTargets", self.max_targets.as_str()),
        ]
    }

    fn visit_children(&self, visitor: &mut dyn ExpressionVisitor) {
        self.data.visit_children(visitor);
    }
}

impl HasExpressions for AbstractionDefinition {
    fn expressions(&self) -> Vec<(&'static str, &str)> {
        Vec::new()
    }

    fn visit_children(&self, visitor: &mut dyn ExpressionVisitor) {
        self.data.visit_children(visitor);
        for port in &self.logical_ports {
            visit_item(visitor, "port", port.logical_name(), port);
        }
    }
}

impl HasExpressions for Component {
    fn expressions(&self) -> Vec<(&'static str, &str)> {
        Vec::new()
    }

    fn visit_children(&self, visitor: &mut dyn ExpressionVisitor) {
        self.data.visit_children(visitor);
        for mode in &self.modes {
            visit_item(visitor, "mode", mode.name(), mode);
        }
        for space in &self.address_spaces {
            visit_item(visitor, "address space", space.name(), space);
        }
        for map in &self.memory_maps {
            visit_item(visitor, "memory map", map.name(), map);
        }
        for cpu in &self.cpus {
            visit_item(visitor, "cpu", cpu.name(), cpu);
        }
    }
}

impl HasExpressions for Document {
    fn expressions(&self) -> Vec<(&'static str, &str)> {
        match self {
            Document::BusDefinition(d) => d.expressions(),
            Document::AbstractionDefinition(d) => d.expressions(),
            Document::Component(d) => d.expressions(),
        }
    }

    fn visit_children(&self, visitor: &mut dyn ExpressionVisitor) {
        match self {
            Document::BusDefinition(d) => d.visit_children(visitor),
            Document::AbstractionDefinition(d) => d.visit_children(visitor),
            Document::Component(d) => d.visit_children(visitor),
        }
    }
}

/// An expression that mentions a valueId.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSite {
    /// Path of the item holding the expression, e.g.
    /// `memory map 'regs' / address block 'ctrl'`. Empty for the root.
    pub path: String,
    /// Attribute holding the expression.
    pub attribute: &'static str,
    /// Number of whole-word occurrences.
    pub count: usize,
}

/// Collects the expressions of a tree that mention one valueId.
#[derive(Debug)]
pub struct ReferenceCounter<'a> {
    id: &'a str,
    path: Vec<String>,
    sites: Vec<ReferenceSite>,
}

impl<'a> ReferenceCounter<'a> {
    pub fn new(id: &'a str) -> Self {
        ReferenceCounter {
            id,
            path: Vec::new(),
            sites: Vec::new(),
        }
    }

    /// Every expression in `item` and its children that mentions `id`.
    pub fn sites(item: &dyn HasExpressions, id: &'a str) -> Vec<ReferenceSite> {
        let mut counter = ReferenceCounter::new(id);
        item.visit_expressions(&mut counter);
        counter.into_sites()
    }

    /// Total number of mentions of `id` in `item` and its children.
    pub fn count(item: &dyn HasExpressions, id: &str) -> usize {
        ReferenceCounter::sites(item, id).iter().map(|site| site.count).sum()
    }

    /// Number of mentions of `id` in `item`'s own expressions.
    pub fn count_own(item: &dyn HasExpressions, id: &str) -> usize {
        item.expressions()
            .iter()
            .map(|(_, expression)| count_references(expression, id))
            .sum()
    }

    pub fn into_sites(self) -> Vec<ReferenceSite> {
        self.sites
    }
}

impl ExpressionVisitor for ReferenceCounter<'_> {
    fn enter(&mut self, kind: &'static str, name: &str) {
        self.path.push(format!("{kind} '{name}'"));
    }

    fn leave(&mut self) {
        self.path.pop();
    }

    fn expression(&mut self, attribute: &'static str, expression: &str) {
        let count = count_references(expression, self.id);
        if count > 0 {
            self.sites.push(ReferenceSite {
                path: self.path.join(" / "),
                attribute,
                count,
            });
        }
    }
}

/// Resolves valueIds against the parameters declared anywhere in a
/// document tree.
///
/// When two parameters share a valueId, the first in document order wins.
#[derive(Debug, Default)]
pub struct DocumentParameterFinder<'a> {
    parameters: HashMap<&'a str, &'a Parameter>,
}

impl<'a> DocumentParameterFinder<'a> {
    /// Finder over every parameter of a document.
    pub fn new(document: &'a Document) -> Self {
        let mut finder = DocumentParameterFinder::default();
        finder.add_all(&document.data().parameters);
        match document {
            Document::Component(component) => finder.add_component(component),
            Document::BusDefinition(_) | Document::AbstractionDefinition(_) => {}
        }
        finder
    }

    /// Finder over every parameter of a component.
    pub fn for_component(component: &'a Component) -> Self {
        let mut finder = DocumentParameterFinder::default();
        finder.add_all(&component.data.parameters);
        finder.add_component(component);
        finder
    }

    /// Finder over a flat parameter list.
    pub fn from_parameters(parameters: &'a [Parameter]) -> Self {
        let mut finder = DocumentParameterFinder::default();
        finder.add_all(parameters);
        finder
    }

    /// Add parameters; existing valueIds are kept.
    pub fn add_all(&mut self, parameters: &'a [Parameter]) {
        for parameter in parameters {
            if parameter.value_id.is_empty() {
                continue;
            }
            if self.parameters.contains_key(parameter.value_id.as_str()) {
                warn!(
                    value_id = %parameter.value_id,
                    name = parameter.name(),
                    "duplicate parameter valueId ignored"
                );
                continue;
            }
            self.parameters.insert(parameter.value_id.as_str(), parameter);
        }
    }

    /// Parameter with the given valueId.
    pub fn parameter(&self, id: &str) -> Option<&'a Parameter> {
        self.parameters.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    fn add_component(&mut self, component: &'a Component) {
        for space in &component.address_spaces {
            self.add_all(&space.parameters);
        }
        for cpu in &component.cpus {
            self.add_all(&cpu.parameters);
        }
        for map in &component.memory_maps {
            for block in &map.blocks {
                self.add_all(block.parameters());
                if let MemoryBlock::AddressBlock(block) = block {
                    self.add_register_data(&block.register_data);
                }
            }
        }
    }

    fn add_register_data(&mut self, data: &'a [RegisterData]) {
        for item in data {
            match item {
                RegisterData::Register(register) => {
                    self.add_all(&register.parameters);
                    for field in &register.fields {
                        self.add_all(&field.parameters);
                    }
                    for alternate in &register.alternate_registers {
                        self.add_all(&alternate.parameters);
                        for field in &alternate.fields {
                            self.add_all(&field.parameters);
                        }
                    }
                }
                RegisterData::RegisterFile(file) => {
                    self.add_all(&file.parameters);
                    self.add_register_data(&file.register_data);
                }
            }
        }
    }
}

impl ParameterFinder for DocumentParameterFinder<'_> {
    fn value_for_id(&self, id: &str) -> Option<String> {
        self.parameter(id).map(|parameter| parameter.value.clone())
    }

    fn has_id(&self, id: &str) -> bool {
        self.parameters.contains_key(id)
    }

    fn name_for_id(&self, id: &str) -> Option<String> {
        self.parameter(id).map(|parameter| parameter.name().to_string())
    }
}
