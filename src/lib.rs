mod compile;
mod execute;
mod template;
mod types;

pub mod checks;
pub mod parse;

pub use types::message;
pub use types::{
    Check, CompareOp, CompileError, CompiledPlan, ErrorEntry, ErrorShape, Guard, Model, NodeId,
    Object, Path, PlanNode, Presence, RuleBuilder, RuleNode, Segment, Settings, SpecId,
    SpecRegistry, Specification, Template, ValidationResult, Validator, ValidatorBuilder, Value,
    DEFAULT_MAX_DEPTH, DEFAULT_TRANSLATION,
};
