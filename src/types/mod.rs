mod check;
mod error;
pub mod message;
mod object;
mod path;
mod plan;
mod registry;
mod result;
mod rule;
mod settings;
mod template;
mod validator;
mod value;

pub use check::{Check, CompareOp, Guard, Presence};
pub use error::CompileError;
pub use object::Object;
pub use path::{Path, Segment};
pub use plan::{CompiledPlan, NodeId, PlanNode, SpecId};
pub(crate) use plan::{CompiledSpec, PlannedCheck, Step};
pub use registry::SpecRegistry;
pub use result::{ErrorEntry, ValidationResult};
pub use rule::{RuleBuilder, RuleNode, Specification};
pub use settings::{Settings, DEFAULT_MAX_DEPTH, DEFAULT_TRANSLATION};
pub use template::{ErrorShape, Template};
pub use validator::{Validator, ValidatorBuilder};
pub use value::{Model, Value};
