use super::rule::Specification;

/// Registration table mapping specification names to rule trees.
///
/// [`RuleNode::Nested`](super::RuleNode::Nested) references are resolved
/// against this table when a [`Validator`](super::Validator) is compiled, so
/// specifications authored independently can refer to each other (and to
/// themselves) by name. Duplicate names are reported at compile time.
#[derive(Debug, Clone, Default)]
pub struct SpecRegistry {
    specs: Vec<Specification>,
}

impl SpecRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a specification (builder style).
    #[must_use]
    pub fn register(mut self, spec: Specification) -> Self {
        self.specs.push(spec);
        self
    }

    /// Register a specification (mutable reference version).
    pub fn insert(&mut self, spec: Specification) {
        self.specs.push(spec);
    }

    /// Look up a specification by name. With duplicates, the first registration wins.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Specification> {
        self.specs.iter().find(|s| s.name() == name)
    }

    /// The number of registered specifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Iterate over all registered specifications in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Specification> {
        self.specs.iter()
    }
}
