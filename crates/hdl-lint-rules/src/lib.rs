//! # hdl-lint-rules
//!
//! Built-in SystemVerilog lint rules for hdl-lint.
//!
//! ## Available Rules
//!
//! | Id | Name | Description |
//! |----|------|-------------|
//! | `REPETITION_IN_SEQUENCE` | `repetition-in-sequence` | `[->n]`/`[=n]` only on boolean operands |
//! | `PROTOTYPE_RETURN_DATA_TYPE` | `prototype-return-data-type` | Function prototypes must declare a return type |
//! | `PARAMETER_DYNAMIC_ARRAY` | `parameter-dynamic-array` | Parameters must not be dynamic arrays |
//! | `IMPLICIT_DATA_TYPE_IN_DECLARATION` | `implicit-data-type` | Packed declarations must name their data type |
//! | `HIERARCHICAL_INTERFACE_IDENTIFIER` | `hierarchical-interface-identifier` | Interface types must not be hierarchical paths |
//! | `DPI_DECLARATION_STRING` | `dpi-declaration-string` | DPI declarations must use `"DPI-C"` |
//! | `CLASS_VARIABLE_LIFETIME` | `class-variable-lifetime` | Class variables must not be `automatic` |
//! | `COVERGROUP_EXPRESSION` | `covergroup-expression` | Coverpoint expressions must not have side effects |
//!
//! ## Usage
//!
//! ```ignore
//! use hdl_lint_core::Dispatcher;
//! use hdl_lint_rules::{ImplicitDataType, PrototypeReturnDataType};
//!
//! let dispatcher = Dispatcher::builder()
//!     .rule(PrototypeReturnDataType::new())
//!     .rule(ImplicitDataType::new().placeholder_name("<anon>"))
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
pub mod class_variable_lifetime;
pub mod covergroup_expression;
pub mod dpi_declaration_string;
pub mod hierarchical_interface_identifier;
pub mod implicit_data_type;
pub mod parameter_dynamic_array;
pub mod prototype_return_data_type;
pub mod repetition_in_sequence;

pub use catalog::{all_rules, rules_from_config, select_rules, UnknownRule};
pub use class_variable_lifetime::ClassVariableLifetime;
pub use covergroup_expression::CovergroupExpression;
pub use dpi_declaration_string::DpiDeclarationString;
pub use hierarchical_interface_identifier::HierarchicalInterfaceIdentifier;
pub use implicit_data_type::ImplicitDataType;
pub use parameter_dynamic_array::ParameterDynamicArray;
pub use prototype_return_data_type::PrototypeReturnDataType;
pub use repetition_in_sequence::RepetitionInSequence;

/// Re-export core types for convenience.
pub use hdl_lint_core::{Diagnostic, Rule, Severity};
