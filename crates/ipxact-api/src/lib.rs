//! Editor-facing layer over the IP-XACT model.
//!
//! - **Facades:** name-indexed access to parameters, fields, registers, and
//!   memory blocks, with typed expression accessors that return both the
//!   stored expression and its evaluated value, per-item validation, and
//!   valueId reference counting
//! - **Library:** [`MemoryLibrary`], an in-memory [`ipxact_core::LibraryInterface`]
//! - **Configuration:** [`ToolConfig`] loaded from TOML, building the
//!   evaluator, reader, and writer used by the other layers
//!
//! ```
//! use ipxact_api::{FieldExpression, FieldInterface};
//! use ipxact_core::{Field, Revision};
//! use ipxact_expr::{ExpressionEvaluator, NullFinder};
//! use ipxact_validate::ValidationEnv;
//!
//! let mut fields = vec![Field::new("enable", "0", "1")];
//! let env = ValidationEnv::new(ExpressionEvaluator::new(&NullFinder), Revision::Std22);
//! let mut interface = FieldInterface::new(&mut fields, env);
//!
//! let name = interface.add(None, "enable");
//! assert_eq!(name, "enable_1");
//! let offset = interface.expression(&name, FieldExpression::BitOffset).unwrap();
//! assert_eq!(offset.value, "1");
//! ```

pub mod common;
pub mod config;
pub mod error;
pub mod field;
pub mod library;
pub mod memory_block;
pub mod parameters;
pub mod register;

pub use common::ExpressionValue;
pub use config::{config_to_toml, parse_config_toml, ToolConfig, WriterSection};
pub use error::{ApiError, Result};
pub use field::{FieldExpression, FieldInterface};
pub use library::MemoryLibrary;
pub use memory_block::{BlockExpression, MemoryBlockInterface};
pub use parameters::{ParameterExpression, ParametersInterface};
pub use register::{RegisterExpression, RegisterInterface};
