//! Validator chain for IP-XACT documents.
//!
//! Every model entity has a validator that appends one human-readable
//! message per violated rule to a caller-owned list. Validators never stop
//! at the first problem: a whole subtree is checked in one pass, and
//! containers call the validators of their children.
//!
//! Validators share a [`ValidationEnv`] holding the expression evaluator,
//! the document revision, and, once [`ValidationEnv::component_change`] has
//! been called, the names declared by the containing component. Mode
//! references, CPU references, and parameter choices are checked against
//! that scope.
//!
//! ```
//! use ipxact_core::{Field, Register, Revision};
//! use ipxact_expr::{ExpressionEvaluator, NullFinder};
//! use ipxact_validate::{RegisterValidator, ValidationEnv, Validator};
//!
//! let evaluator = ExpressionEvaluator::new(&NullFinder);
//! let env = ValidationEnv::new(evaluator, Revision::Std14);
//!
//! let mut register = Register::new("ctrl", "0", "8");
//! register.fields.push(Field::new("wide", "4", "8"));
//!
//! let mut errors = Vec::new();
//! RegisterValidator::new(&env).find_errors_in(&mut errors, &register, "test");
//! assert!(errors.contains(&"Field wide is not contained within ctrl".to_string()));
//! ```

pub mod common;
pub mod component;
pub mod definitions;
pub mod field;
pub mod memory;
pub mod parameter;
pub mod register;

use ipxact_core::{Choice, Component, DocumentData, Revision};
use ipxact_expr::ExpressionEvaluator;

pub use common::{MemoryReserve, ModeRefCheck};
pub use component::{AddressSpaceValidator, ComponentValidator, CpuValidator, ModeValidator};
pub use definitions::{AbstractionDefinitionValidator, BusDefinitionValidator, DocumentValidator};
pub use field::{EnumeratedValueValidator, FieldAccessPolicyValidator, FieldValidator};
pub use memory::{AddressBlockValidator, MemoryMapValidator, SubspaceMapValidator};
pub use parameter::{ChoiceValidator, ParameterValidator};
pub use register::{RegisterFileValidator, RegisterValidator};

/// Checks one kind of model entity.
pub trait Validator<T: ?Sized> {
    /// Append a message for every rule `item` violates. `context` names the
    /// containing item and ends up in the messages.
    fn find_errors_in(&self, errors: &mut Vec<String>, item: &T, context: &str);

    /// Whether `item` violates no rule.
    fn validate(&self, item: &T) -> bool {
        let mut errors = Vec::new();
        self.find_errors_in(&mut errors, item, "");
        errors.is_empty()
    }
}

/// Names declared by the component whose items are being validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentScope {
    pub mode_names: Vec<String>,
    pub address_space_names: Vec<String>,
    pub memory_map_names: Vec<String>,
}

/// State shared by the validators of one document.
#[derive(Debug, Clone)]
pub struct ValidationEnv<'a> {
    evaluator: ExpressionEvaluator<'a>,
    revision: Revision,
    choices: Vec<Choice>,
    component: Option<ComponentScope>,
}

impl<'a> ValidationEnv<'a> {
    /// An environment with no choices and no component scope.
    pub fn new(evaluator: ExpressionEvaluator<'a>, revision: Revision) -> Self {
        ValidationEnv {
            evaluator,
            revision,
            choices: Vec::new(),
            component: None,
        }
    }

    /// Use `choices` to resolve parameter choice references.
    pub fn with_choices(mut self, choices: &[Choice]) -> Self {
        self.choices = choices.to_vec();
        self
    }

    /// Pick up the revision, choices, and declared names of `component`.
    pub fn component_change(&mut self, component: &Component) {
        self.revision = component.revision();
        self.choices = component.data.choices.clone();
        self.component = Some(ComponentScope {
            mode_names: component.mode_names(),
            address_space_names: component
                .address_spaces
                .iter()
                .map(|space| space.name_group.name.clone())
                .collect(),
            memory_map_names: component
                .memory_maps
                .iter()
                .map(|map| map.name_group.name.clone())
                .collect(),
        });
    }

    /// Copy of this environment scoped to `component`.
    pub fn for_component(&self, component: &Component) -> Self {
        let mut env = self.clone();
        env.component_change(component);
        env
    }

    /// Copy of this environment scoped to a bus or abstraction definition:
    /// its revision and choices, and no component scope.
    pub fn for_definition(&self, data: &DocumentData) -> Self {
        ValidationEnv {
            evaluator: self.evaluator,
            revision: data.revision,
            choices: data.choices.clone(),
            component: None,
        }
    }

    pub fn evaluator(&self) -> &ExpressionEvaluator<'a> {
        &self.evaluator
    }

    pub fn revision(&self) -> Revision {
        self.revision
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    /// Declared names of the current component, if one is set.
    pub fn component(&self) -> Option<&ComponentScope> {
        self.component.as_ref()
    }

    pub(crate) fn is_std14(&self) -> bool {
        self.revision == Revision::Std14
    }

    pub(crate) fn is_std22(&self) -> bool {
        self.revision == Revision::Std22
    }

    /// Integer value of an expression, `None` when empty or not an integer.
    pub(crate) fn int(&self, expression: &str) -> Option<i128> {
        if expression.trim().is_empty() {
            return None;
        }
        self.evaluator.evaluate_int(expression).ok()
    }

    /// Integer value of an expression, zero when it does not evaluate.
    pub(crate) fn int_or_zero(&self, expression: &str) -> i128 {
        self.int(expression).unwrap_or(0)
    }
}
