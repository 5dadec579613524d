use std::fmt;

use super::check::{Check, Guard, Presence};
use super::path::Path;

/// Stable identity of a [`PlanNode`] inside a [`CompiledPlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Identity of a compiled specification inside a [`CompiledPlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpecId(pub(crate) usize);

/// A check with its report location resolved.
#[derive(Debug, Clone)]
pub(crate) struct PlannedCheck {
    pub(crate) check: Check,
    /// Relative to the scope the check runs in; the root path reports in place.
    pub(crate) at: Path,
}

/// One executable step of a scope, in declaration order.
#[derive(Debug, Clone)]
pub(crate) enum Step {
    Check(PlannedCheck),
    Member { name: String, node: NodeId },
    Elements(NodeId),
    When { guard: Guard, steps: Vec<Step> },
    /// Run a compiled specification's root steps on the current value.
    Enter(SpecId),
    /// Like `Enter`, but closes a reference cycle and is bounded by the depth cap.
    BackRef(SpecId),
}

/// A scope of a compiled specification: its root, a member, or a collection element.
#[derive(Debug, Clone)]
pub struct PlanNode {
    pub(crate) spec: SpecId,
    pub(crate) path: Path,
    pub(crate) presence: Presence,
    pub(crate) steps: Vec<Step>,
}

impl PlanNode {
    /// The specification this scope belongs to.
    #[must_use]
    pub fn spec(&self) -> SpecId {
        self.spec
    }

    /// Location of the scope relative to its specification's root.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn presence(&self) -> &Presence {
        &self.presence
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledSpec {
    pub(crate) name: String,
    pub(crate) root: NodeId,
}

/// The immutable execution graph produced by compiling a specification.
///
/// Scopes live in an arena addressed by [`NodeId`]; nested specifications are
/// compiled once and referenced by [`SpecId`]. The plan is never mutated after
/// compilation and can be shared freely across threads.
#[derive(Debug, Clone)]
pub struct CompiledPlan {
    pub(crate) nodes: Vec<PlanNode>,
    pub(crate) specs: Vec<CompiledSpec>,
    pub(crate) root: SpecId,
}

impl CompiledPlan {
    /// The specification the plan was compiled from.
    #[must_use]
    pub fn root(&self) -> SpecId {
        self.root
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> &PlanNode {
        &self.nodes[id.0]
    }

    /// Root scope of a compiled specification.
    #[must_use]
    pub fn spec_root(&self, id: SpecId) -> NodeId {
        self.specs[id.0].root
    }

    #[must_use]
    pub fn spec_name(&self, id: SpecId) -> &str {
        &self.specs[id.0].name
    }

    /// Look up a compiled specification by name.
    #[must_use]
    pub fn spec_id(&self, name: &str) -> Option<SpecId> {
        self.specs.iter().position(|s| s.name == name).map(SpecId)
    }

    /// Number of scopes in the plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of distinct specifications compiled into the plan.
    #[must_use]
    pub fn spec_count(&self) -> usize {
        self.specs.len()
    }

    /// Every scope as `(specification name, path relative to it)`, in arena order.
    #[must_use]
    pub fn scopes(&self) -> Vec<(&str, &Path)> {
        self.nodes
            .iter()
            .map(|n| (self.spec_name(n.spec), &n.path))
            .collect()
    }

    /// Names of the specifications reached through a back-reference, i.e. the
    /// ones whose execution is bounded by the depth cap.
    #[must_use]
    pub fn recursive_specs(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for node in &self.nodes {
            collect_back_refs(&node.steps, &mut |id| {
                let name = self.spec_name(id);
                if !names.contains(&name) {
                    names.push(name);
                }
            });
        }
        names
    }
}

fn collect_back_refs(steps: &[Step], out: &mut impl FnMut(SpecId)) {
    for step in steps {
        match step {
            Step::BackRef(id) => out(*id),
            Step::When { steps, .. } => collect_back_refs(steps, out),
            Step::Check(_) | Step::Member { .. } | Step::Elements(_) | Step::Enter(_) => {}
        }
    }
}

impl fmt::Display for CompiledPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CompiledPlan({}, {} specs, {} scopes)",
            self.spec_name(self.root),
            self.specs.len(),
            self.nodes.len(),
        )
    }
}
