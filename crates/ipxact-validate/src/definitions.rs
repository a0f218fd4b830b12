//! Bus definition, abstraction definition, and whole-document validation.

use ipxact_core::{AbstractionDefinition, BusDefinition, Document, Vlnv};

use crate::common::{
    find_duplicates, find_errors_in_document_data, find_errors_in_is_present, has_valid_name,
    is_empty_or_non_negative,
};
use crate::component::ComponentValidator;
use crate::{ValidationEnv, Validator};

fn find_errors_in_extends(errors: &mut Vec<String>, own: &Vlnv, extends: &Vlnv, kind: &str, context: &str) {
    if !extends.is_set() {
        return;
    }
    if !extends.is_valid() {
        errors.push(format!("Invalid extended {kind} set for {context}"));
    } else if extends == own {
        errors.push(format!("The {context} cannot extend itself."));
    }
}

/// Checks a bus definition.
#[derive(Debug, Clone, Copy)]
pub struct BusDefinitionValidator<'a> {
    env: &'a ValidationEnv<'a>,
}

impl<'a> BusDefinitionValidator<'a> {
    pub fn new(env: &'a ValidationEnv<'a>) -> Self {
        BusDefinitionValidator { env }
    }
}

impl Validator<BusDefinition> for BusDefinitionValidator<'_> {
    fn find_errors_in(&self, errors: &mut Vec<String>, bus: &BusDefinition, _context: &str) {
        let env = self.env.for_definition(&bus.data);
        let context = format!("bus definition {}", bus.data.vlnv);

        find_errors_in_document_data(errors, &env, &bus.data, &context);
        find_errors_in_extends(errors, &bus.data.vlnv, &bus.extends, "bus definition", &context);
        if !is_empty_or_non_negative(&env, &bus.max_initiators) {
            errors.push(format!("Invalid max initiators set for {context}"));
        }
        if !is_empty_or_non_negative(&env, &bus.max_targets) {
            errors.push(format!("Invalid max targets set for {context}"));
        }

        if bus.system_group_names.iter().any(|group| !has_valid_name(group)) {
            errors.push(format!("Empty system group name in {context}"));
        }
        find_duplicates(bus.system_group_names.iter().map(String::as_str), |group| {
            errors.push(format!("System group name {group} within {context} is not unique."));
        });
    }
}

/// Checks an abstraction definition and its logical ports.
#[derive(Debug, Clone, Copy)]
pub struct AbstractionDefinitionValidator<'a> {
    env: &'a ValidationEnv<'a>,
}

impl<'a> AbstractionDefinitionValidator<'a> {
    pub fn new(env: &'a ValidationEnv<'a>) -> Self {
        AbstractionDefinitionValidator { env }
    }
}

impl Validator<AbstractionDefinition> for AbstractionDefinitionValidator<'_> {
    fn find_errors_in(&self, errors: &mut Vec<String>, abstraction: &AbstractionDefinition, _context: &str) {
        let env = self.env.for_definition(&abstraction.data);
        let context = format!("abstraction definition {}", abstraction.data.vlnv);

        find_errors_in_document_data(errors, &env, &abstraction.data, &context);
        if !abstraction.bus_type.is_valid() {
            errors.push(format!("No valid bus type set for {context}"));
        }
        find_errors_in_extends(
            errors,
            &abstraction.data.vlnv,
            &abstraction.extends,
            "abstraction definition",
            &context,
        );

        if abstraction.logical_ports.is_empty() {
            errors.push(format!("No ports specified within {context}"));
        }
        for port in &abstraction.logical_ports {
            let name = port.logical_name();
            if !has_valid_name(name) {
                errors.push(format!("Invalid logical name specified for port {name} within {context}"));
            }
            if port.kind().is_none() {
                errors.push(format!("Port {name} within {context} must be a wire or a transactional port."));
            }
            if env.is_std14() {
                find_errors_in_is_present(errors, &env, &port.is_present, &format!("port {name} within {context}"));
            }
        }
        find_duplicates(abstraction.logical_ports.iter().map(|port| port.logical_name()), |name| {
            errors.push(format!("Logical name {name} of ports in {context} is not unique."));
        });
    }
}

/// Checks any document, dispatching on its kind.
#[derive(Debug, Clone, Copy)]
pub struct DocumentValidator<'a> {
    env: &'a ValidationEnv<'a>,
}

impl<'a> DocumentValidator<'a> {
    pub fn new(env: &'a ValidationEnv<'a>) -> Self {
        DocumentValidator { env }
    }

    /// All messages for `document`.
    pub fn errors(&self, document: &Document) -> Vec<String> {
        let mut errors = Vec::new();
        self.find_errors_in(&mut errors, document, "");
        errors
    }
}

impl Validator<Document> for DocumentValidator<'_> {
    fn find_errors_in(&self, errors: &mut Vec<String>, document: &Document, context: &str) {
        let before = errors.len();
        if !document.has_valid_kind() {
            errors.push(format!(
                "VLNV type {} does not match the document kind {} of {}",
                document.vlnv().kind,
                document.kind(),
                document.vlnv()
            ));
        }
        match document {
            Document::BusDefinition(bus) => BusDefinitionValidator::new(self.env).find_errors_in(errors, bus, context),
            Document::AbstractionDefinition(abstraction) => {
                AbstractionDefinitionValidator::new(self.env).find_errors_in(errors, abstraction, context)
            }
            Document::Component(component) => {
                ComponentValidator::new(self.env).find_errors_in(errors, component, context)
            }
        }
        tracing::debug!(
            vlnv = %document.vlnv(),
            kind = %document.kind(),
            found = errors.len() - before,
            "validated document"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipxact_core::{Component, PortAbstraction, Revision, VlnvType};
    use ipxact_expr::{ExpressionEvaluator, NullFinder};

    fn env() -> ValidationEnv<'static> {
        ValidationEnv::new(ExpressionEvaluator::new(&NullFinder), Revision::Unknown)
    }

    fn vlnv(kind: VlnvType, name: &str) -> Vlnv {
        Vlnv::new(kind, "acme", "bus", name, "1.0")
    }

    #[test]
    fn bus_definition_limits_and_groups() {
        let mut bus = BusDefinition::new(vlnv(VlnvType::BusDefinition, "apb"), Revision::Std22);
        bus.max_initiators = "1".into();
        bus.max_targets = "-1".into();
        bus.system_group_names = vec!["clk".into(), "clk".into()];
        bus.extends = bus.data.vlnv.clone();

        let env = env();
        let mut errors = Vec::new();
        BusDefinitionValidator::new(&env).find_errors_in(&mut errors, &bus, "");
        assert_eq!(
            errors,
            [
                "The bus definition acme:bus:apb:1.0 cannot extend itself.",
                "Invalid max targets set for bus definition acme:bus:apb:1.0",
                "System group name clk within bus definition acme:bus:apb:1.0 is not unique.",
            ]
        );
    }

    #[test]
    fn abstraction_ports() {
        let mut abstraction =
            AbstractionDefinition::new(vlnv(VlnvType::AbstractionDefinition, "apb_rtl"), Revision::Std14);
        abstraction.bus_type = vlnv(VlnvType::BusDefinition, "apb");
        abstraction.logical_ports.push(PortAbstraction::wire("PCLK"));
        abstraction.logical_ports.push(PortAbstraction::wire("PCLK"));
        abstraction.logical_ports.push(PortAbstraction {
            name_group: ipxact_core::NameGroup::new("PADDR"),
            is_present: "5".into(),
            ..Default::default()
        });

        let env = env();
        let mut errors = Vec::new();
        AbstractionDefinitionValidator::new(&env).find_errors_in(&mut errors, &abstraction, "");
        assert_eq!(
            errors,
            [
                "Port PADDR within abstraction definition acme:bus:apb_rtl:1.0 must be a wire or a transactional port.",
                "Invalid isPresent set for port PADDR within abstraction definition acme:bus:apb_rtl:1.0. Value should evaluate to 0 or 1.",
                "Logical name PCLK of ports in abstraction definition acme:bus:apb_rtl:1.0 is not unique.",
            ]
        );
    }

    #[test]
    fn abstraction_needs_bus_type_and_ports() {
        let abstraction =
            AbstractionDefinition::new(vlnv(VlnvType::AbstractionDefinition, "empty"), Revision::Std22);
        let env = env();
        let mut errors = Vec::new();
        AbstractionDefinitionValidator::new(&env).find_errors_in(&mut errors, &abstraction, "");
        assert_eq!(
            errors,
            [
                "No valid bus type set for abstraction definition acme:bus:empty:1.0",
                "No ports specified within abstraction definition acme:bus:empty:1.0",
            ]
        );
    }

    #[test]
    fn documents_dispatch_on_kind() {
        let env = env();
        let validator = DocumentValidator::new(&env);

        let component = Component::new(vlnv(VlnvType::Component, "uart"), Revision::Std22);
        assert!(validator.validate(&Document::from(component)));

        let mut bus = BusDefinition::new(Vlnv::new(VlnvType::BusDefinition, "", "bus", "apb", "1.0"), Revision::Std14);
        bus.data.vlnv.kind = VlnvType::Component;
        assert_eq!(
            validator.errors(&Document::from(bus)),
            [
                "VLNV type component does not match the document kind busDefinition of :bus:apb:1.0",
                "No vendor specified for vlnv within bus definition :bus:apb:1.0",
            ]
        );
    }
}
