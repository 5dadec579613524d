use std::fmt;

use super::error::CompileError;
use super::plan::CompiledPlan;
use super::registry::SpecRegistry;
use super::result::ValidationResult;
use super::rule::Specification;
use super::settings::Settings;
use super::template::Template;
use super::value::{Model, Value};

/// A compiled specification ready to validate models.
///
/// Owns the [`CompiledPlan`], its [`Template`], and the [`Settings`]. All three
/// are immutable after construction, so one validator can be shared across
/// threads (e.g. behind an `Arc`) and used for any number of concurrent runs.
///
/// # Example
///
/// ```
/// use vouch::{checks, Object, Specification, Validator};
///
/// let validator = Validator::builder(Specification::build("Person", |s| {
///     s.member("name", |m| m.required().check(checks::not_empty()))
///         .member("age", |m| m.check(checks::between(0_i64, 150_i64)))
/// }))
/// .build()
/// .unwrap();
///
/// let person = Object::new().set("age", 200_i64).into();
/// let result = validator.validate(&person, false);
/// assert_eq!(result.codes(), ["Between", "Required"]);
/// assert!(!validator.is_valid(&person));
/// ```
#[derive(Debug, Clone)]
pub struct Validator {
    plan: CompiledPlan,
    template: Template,
    settings: Settings,
}

impl Validator {
    /// Compile `root`, resolving nested references through `registry`.
    ///
    /// # Errors
    ///
    /// Returns a [`CompileError`] if the specification graph is malformed:
    /// an unresolved reference, conflicting or guarded presence rules,
    /// a duplicate registry name, a cycle that does not descend into the
    /// model, or an invalid check path.
    pub fn new(
        root: &Specification,
        registry: &SpecRegistry,
        settings: Settings,
    ) -> Result<Self, CompileError> {
        let plan = crate::compile::compile(root, registry)?;
        let template = crate::template::derive(&plan);
        Ok(Self {
            plan,
            template,
            settings,
        })
    }

    /// Start building a validator for `root`.
    #[must_use]
    pub fn builder(root: Specification) -> ValidatorBuilder {
        ValidatorBuilder {
            root,
            registry: SpecRegistry::new(),
            settings: Settings::default(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Every error shape this validator can report, by path.
    #[must_use]
    pub fn template(&self) -> &Template {
        &self.template
    }

    #[must_use]
    pub fn plan(&self) -> &CompiledPlan {
        &self.plan
    }

    /// Whether `value` satisfies the specification. Stops at the first violation.
    #[must_use]
    pub fn is_valid(&self, value: &Value) -> bool {
        self.validate(value, true).is_valid()
    }

    /// Validate `value`, collecting every violation unless `fail_fast` is set,
    /// in which case the result holds at most the first one.
    pub fn validate(&self, value: &Value, fail_fast: bool) -> ValidationResult {
        crate::execute::execute(&self.plan, value, fail_fast, self.settings.max_depth())
    }

    #[must_use]
    pub fn is_valid_model(&self, model: &impl Model) -> bool {
        self.is_valid(&model.to_value())
    }

    pub fn validate_model(&self, model: &impl Model, fail_fast: bool) -> ValidationResult {
        self.validate(&model.to_value(), fail_fast)
    }
}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Validator({}, {} template paths)",
            self.plan.spec_name(self.plan.root()),
            self.template.len()
        )
    }
}

/// Builder for [`Validator`], collecting nested specifications and settings.
#[derive(Debug)]
#[must_use]
pub struct ValidatorBuilder {
    root: Specification,
    registry: SpecRegistry,
    settings: Settings,
}

impl ValidatorBuilder {
    /// Make `spec` available to [`RuleNode::Nested`](super::RuleNode::Nested) references.
    pub fn register(mut self, spec: Specification) -> Self {
        self.registry.insert(spec);
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Compile the collected specifications.
    ///
    /// # Errors
    ///
    /// Returns a [`CompileError`] under the same conditions as [`Validator::new`].
    pub fn build(self) -> Result<Validator, CompileError> {
        Validator::new(&self.root, &self.registry, self.settings)
    }
}
