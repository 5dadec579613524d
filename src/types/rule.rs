use super::check::{Check, Guard, Presence};
use super::Value;

/// One node of a rule tree.
///
/// Nodes apply to the value of the scope they appear in: the specification's
/// root, a [`Member`](RuleNode::Member), or a collection element.
#[derive(Debug, Clone)]
pub enum RuleNode {
    /// A check on the current value.
    Check(Check),
    /// Presence policy for the current scope.
    Presence(Presence),
    /// Descend into the member `name` of the current object.
    Member { name: String, rules: Vec<RuleNode> },
    /// Apply `rules` to every element of the current list.
    CollectionOf(Vec<RuleNode>),
    /// Apply `rules` only when `guard` holds for the current value.
    Conditional { guard: Guard, rules: Vec<RuleNode> },
    /// Apply the specification registered under this name to the current value.
    Nested(String),
}

/// A named rule tree describing how to validate one kind of model.
///
/// The name is the specification's identity: [`RuleNode::Nested`] references
/// resolve by name, and recursion through the same name is what the compiler
/// treats as a cycle.
///
/// # Example
///
/// ```
/// use vouch::{Specification, checks};
///
/// let person = Specification::build("Person", |s| {
///     s.member("name", |m| m.required().check(checks::not_empty()))
///         .member("age", |m| m.check(checks::between(0_i64, 150_i64)))
/// });
/// assert_eq!(person.name(), "Person");
/// ```
#[derive(Debug, Clone)]
pub struct Specification {
    name: String,
    rules: Vec<RuleNode>,
}

impl Specification {
    #[must_use]
    pub fn new(name: impl Into<String>, rules: Vec<RuleNode>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }

    /// Define a specification with a [`RuleBuilder`] closure.
    #[must_use]
    pub fn build(name: impl Into<String>, f: impl FnOnce(RuleBuilder) -> RuleBuilder) -> Self {
        Self::new(name, f(RuleBuilder::default()).rules)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn rules(&self) -> &[RuleNode] {
        &self.rules
    }
}

/// Collects the rules of one scope. Passed to the closures of
/// [`Specification::build`], [`member`](Self::member), [`each`](Self::each)
/// and [`when`](Self::when).
#[derive(Debug, Default)]
pub struct RuleBuilder {
    rules: Vec<RuleNode>,
}

impl RuleBuilder {
    #[must_use]
    pub fn check(mut self, check: Check) -> Self {
        self.rules.push(RuleNode::Check(check));
        self
    }

    #[must_use]
    pub fn presence(mut self, presence: Presence) -> Self {
        self.rules.push(RuleNode::Presence(presence));
        self
    }

    /// Report an absent value with the `Required` code.
    #[must_use]
    pub fn required(self) -> Self {
        self.presence(Presence::required())
    }

    #[must_use]
    pub fn optional(self) -> Self {
        self.presence(Presence::Optional)
    }

    /// Report a present value with the `Forbidden` code.
    #[must_use]
    pub fn forbidden(self) -> Self {
        self.presence(Presence::forbidden())
    }

    #[must_use]
    pub fn member(mut self, name: &str, f: impl FnOnce(RuleBuilder) -> RuleBuilder) -> Self {
        self.rules.push(RuleNode::Member {
            name: name.to_owned(),
            rules: f(RuleBuilder::default()).rules,
        });
        self
    }

    /// Rules for every element of the current list.
    #[must_use]
    pub fn each(mut self, f: impl FnOnce(RuleBuilder) -> RuleBuilder) -> Self {
        self.rules
            .push(RuleNode::CollectionOf(f(RuleBuilder::default()).rules));
        self
    }

    /// Rules that apply only when `guard` holds for the current value.
    #[must_use]
    pub fn when(
        mut self,
        guard: impl Fn(&Value) -> bool + Send + Sync + 'static,
        f: impl FnOnce(RuleBuilder) -> RuleBuilder,
    ) -> Self {
        self.rules.push(RuleNode::Conditional {
            guard: Guard::new(guard),
            rules: f(RuleBuilder::default()).rules,
        });
        self
    }

    /// Apply the specification registered under `name`.
    #[must_use]
    pub fn nested(mut self, name: &str) -> Self {
        self.rules.push(RuleNode::Nested(name.to_owned()));
        self
    }

    #[must_use]
    pub fn rule(mut self, node: RuleNode) -> Self {
        self.rules.push(node);
        self
    }
}
