//! Component operating modes (Std22).

use serde::{Deserialize, Serialize};

use crate::common::{named_extendable, NameGroup};
use crate::node::XmlNode;

/// A named operating mode, active while its condition evaluates to true.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Mode {
    /// Name and descriptions.
    pub name_group: NameGroup,
    /// Condition expression.
    pub condition: String,
    /// Opaque vendor extensions.
    pub vendor_extensions: Vec<XmlNode>,
}

named_extendable!(Mode);

impl Mode {
    pub fn new(name: impl Into<String>) -> Self {
        Mode {
            name_group: NameGroup::new(name),
            ..Default::default()
        }
    }
}
