use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::types::{CompiledSpec, PlannedCheck, Step};
use crate::{
    Check, CompileError, CompiledPlan, NodeId, Path, PlanNode, Presence, RuleNode, Segment,
    SpecId, SpecRegistry, Specification,
};

/// Compile `root` into an execution plan, resolving nested references through
/// `registry`. `root` shadows a registry entry with the same name.
pub(crate) fn compile(
    root: &Specification,
    registry: &SpecRegistry,
) -> Result<CompiledPlan, CompileError> {
    check_duplicates(registry)?;

    let mut lookup: HashMap<&str, &Specification> =
        registry.iter().map(|s| (s.name(), s)).collect();
    lookup.insert(root.name(), root);

    let mut compiler = Compiler {
        lookup,
        nodes: Vec::new(),
        declared: Vec::new(),
        specs: Vec::new(),
        compiled: HashMap::new(),
        stack: Vec::new(),
        path: Path::root(),
    };
    let root_id = compiler.compile_spec(root)?;

    let plan = CompiledPlan {
        nodes: compiler.nodes,
        specs: compiler.specs,
        root: root_id,
    };
    debug!(
        spec = root.name(),
        specs = plan.spec_count(),
        scopes = plan.len(),
        "compiled validation plan"
    );
    Ok(plan)
}

fn check_duplicates(registry: &SpecRegistry) -> Result<(), CompileError> {
    let mut seen = HashSet::new();
    for spec in registry.iter() {
        if !seen.insert(spec.name()) {
            return Err(CompileError::DuplicateSpecification {
                name: spec.name().to_owned(),
            });
        }
    }
    Ok(())
}

/// A specification currently being expanded.
struct Frame {
    spec: SpecId,
    /// Where the specification's root sits, relative to the compilation root.
    entered_at: Path,
}

struct Compiler<'a> {
    lookup: HashMap<&'a str, &'a Specification>,
    nodes: Vec<PlanNode>,
    /// Presence declared by each node's rules, indexed like `nodes`.
    declared: Vec<Option<Presence>>,
    specs: Vec<CompiledSpec>,
    /// Memo of every specification compiled so far, including those still on the stack.
    compiled: HashMap<&'a str, SpecId>,
    stack: Vec<Frame>,
    path: Path,
}

impl<'a> Compiler<'a> {
    fn compile_spec(&mut self, spec: &'a Specification) -> Result<SpecId, CompileError> {
        let id = SpecId(self.specs.len());
        let root = self.alloc(id, Path::root());
        self.specs.push(CompiledSpec {
            name: spec.name().to_owned(),
            root,
        });
        self.compiled.insert(spec.name(), id);

        self.stack.push(Frame {
            spec: id,
            entered_at: self.path.clone(),
        });
        let rules: Vec<&'a RuleNode> = spec.rules().iter().collect();
        let result = self.compile_scope(root, &rules);
        self.stack.pop();

        result.map(|()| id)
    }

    fn compile_scope(&mut self, node: NodeId, rules: &[&'a RuleNode]) -> Result<(), CompileError> {
        let declared = self.resolve_presence(rules)?;
        // Recorded before the steps so back-references into this scope can see it.
        self.declared[node.0] = declared.clone();

        let steps = self.compile_steps(rules, false)?;
        let effective = self.spliced_presence(declared, &steps)?;
        self.declared[node.0] = effective.clone();
        let slot = &mut self.nodes[node.0];
        slot.presence = effective.unwrap_or_default();
        slot.steps = steps;
        Ok(())
    }

    /// The presence policy declared directly in a scope. Repeating the same
    /// kind is allowed (the last declaration wins); mixing kinds is not.
    fn resolve_presence(&self, rules: &[&'a RuleNode]) -> Result<Option<Presence>, CompileError> {
        let mut declared: Option<&Presence> = None;
        for rule in rules {
            if let RuleNode::Presence(presence) = rule {
                if declared.is_some_and(|previous| !previous.same_kind(presence)) {
                    return Err(self.conflicting_presence());
                }
                declared = Some(presence);
            }
        }
        Ok(declared.cloned())
    }

    /// Specifications spliced into a scope without a guard apply their root
    /// presence at the same path. It must agree with the scope's own, and
    /// fills it in when the scope declares none.
    fn spliced_presence(
        &self,
        mut declared: Option<Presence>,
        steps: &[Step],
    ) -> Result<Option<Presence>, CompileError> {
        for step in steps {
            let (Step::Enter(id) | Step::BackRef(id)) = step else {
                continue;
            };
            let Some(target) = &self.declared[self.specs[id.0].root.0] else {
                continue;
            };
            let own = declared.get_or_insert_with(|| target.clone());
            if !own.same_kind(target) {
                return Err(self.conflicting_presence());
            }
        }
        Ok(declared)
    }

    fn compile_steps(
        &mut self,
        rules: &[&'a RuleNode],
        guarded: bool,
    ) -> Result<Vec<Step>, CompileError> {
        let mut steps = Vec::with_capacity(rules.len());
        let mut members_seen: HashSet<&'a str> = HashSet::new();
        let mut elements_seen = false;

        for (i, &rule) in rules.iter().enumerate() {
            match rule {
                RuleNode::Presence(_) => {
                    if guarded {
                        return Err(CompileError::GuardedPresence {
                            spec: self.spec_name().to_owned(),
                            path: self.relative_path().to_string(),
                        });
                    }
                }
                RuleNode::Check(check) => steps.push(Step::Check(self.plan_check(check)?)),
                RuleNode::Member { name, .. } => {
                    if !is_member_name(name) {
                        return Err(CompileError::InvalidMemberName {
                            spec: self.spec_name().to_owned(),
                            path: self.relative_path().to_string(),
                            name: name.clone(),
                        });
                    }
                    // Later declarations of the same member were merged into the first one.
                    if !members_seen.insert(name.as_str()) {
                        continue;
                    }
                    let merged = merged_member_rules(&rules[i..], name);
                    let node = self.compile_child(Segment::Member(name.clone()), &merged)?;
                    steps.push(Step::Member {
                        name: name.clone(),
                        node,
                    });
                }
                RuleNode::CollectionOf(_) => {
                    if std::mem::replace(&mut elements_seen, true) {
                        continue;
                    }
                    let element_rules = merged_element_rules(&rules[i..]);
                    let node = self.compile_child(Segment::Any, &element_rules)?;
                    steps.push(Step::Elements(node));
                }
                RuleNode::Conditional { guard, rules } => {
                    let inner: Vec<&'a RuleNode> = rules.iter().collect();
                    steps.push(Step::When {
                        guard: guard.clone(),
                        steps: self.compile_steps(&inner, true)?,
                    });
                }
                RuleNode::Nested(name) => steps.push(self.reference(name)?),
            }
        }
        Ok(steps)
    }

    fn compile_child(
        &mut self,
        segment: Segment,
        rules: &[&'a RuleNode],
    ) -> Result<NodeId, CompileError> {
        self.path.push(segment);
        let node = self.alloc(self.frame().spec, self.relative_path());
        let result = self.compile_scope(node, rules);
        self.path.pop();
        result.map(|()| node)
    }

    fn reference(&mut self, name: &str) -> Result<Step, CompileError> {
        if let Some(pos) = self
            .stack
            .iter()
            .position(|f| self.specs[f.spec.0].name == name)
        {
            let frame = &self.stack[pos];
            if frame.entered_at == self.path {
                let mut cycle: Vec<String> = self.stack[pos..]
                    .iter()
                    .map(|f| self.specs[f.spec.0].name.clone())
                    .collect();
                cycle.push(name.to_owned());
                return Err(CompileError::NonDescendingCycle { path: cycle });
            }
            debug!(spec = name, path = %self.path, "recursive specification reference");
            return Ok(Step::BackRef(frame.spec));
        }

        if let Some(&id) = self.compiled.get(name) {
            return Ok(Step::Enter(id));
        }

        let Some(&target) = self.lookup.get(name) else {
            return Err(CompileError::UnresolvedSpecification {
                spec: self.spec_name().to_owned(),
                path: self.relative_path().to_string(),
                reference: name.to_owned(),
            });
        };
        self.compile_spec(target).map(Step::Enter)
    }

    fn plan_check(&self, check: &Check) -> Result<PlannedCheck, CompileError> {
        let at = match check.relocation() {
            None => Path::root(),
            Some(text) => text
                .parse::<Path>()
                .map_err(|source| CompileError::InvalidPath {
                    spec: self.spec_name().to_owned(),
                    path: self.relative_path().to_string(),
                    at: text.to_owned(),
                    source,
                })?,
        };
        Ok(PlannedCheck {
            check: check.clone(),
            at,
        })
    }

    fn alloc(&mut self, spec: SpecId, path: Path) -> NodeId {
        self.nodes.push(PlanNode {
            spec,
            path,
            presence: Presence::Optional,
            steps: Vec::new(),
        });
        self.declared.push(None);
        NodeId(self.nodes.len() - 1)
    }

    fn frame(&self) -> &Frame {
        self.stack
            .last()
            .expect("scopes are only compiled inside a specification")
    }

    fn conflicting_presence(&self) -> CompileError {
        CompileError::ConflictingPresence {
            spec: self.spec_name().to_owned(),
            path: self.relative_path().to_string(),
        }
    }

    fn spec_name(&self) -> &str {
        &self.specs[self.frame().spec.0].name
    }

    /// Current location relative to the root of the specification being expanded.
    fn relative_path(&self) -> Path {
        let base = self.frame().entered_at.len();
        Path::from_segments(self.path.segments()[base..].to_vec())
    }
}

/// Rules of every `Member` named `name` in `rules`, concatenated in declaration order.
fn merged_member_rules<'a>(rules: &[&'a RuleNode], name: &str) -> Vec<&'a RuleNode> {
    rules
        .iter()
        .filter_map(|rule| match rule {
            RuleNode::Member { name: n, rules } if n == name => Some(rules.iter()),
            _ => None,
        })
        .flatten()
        .collect()
}

/// Rules of every `CollectionOf` in `rules`, concatenated in declaration order.
fn merged_element_rules<'a>(rules: &[&'a RuleNode]) -> Vec<&'a RuleNode> {
    rules
        .iter()
        .filter_map(|rule| match rule {
            RuleNode::CollectionOf(rules) => Some(rules.iter()),
            _ => None,
        })
        .flatten()
        .collect()
}

/// Member names must render unambiguously in a [`Path`].
fn is_member_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(&['.', '[', ']'][..])
}

#[cfg(test)]
mod tests {
    use super::compile;
    use crate::types::Step;
    use crate::{checks, CompileError, Path, Presence, SpecRegistry, Specification};

    fn node_paths(plan: &crate::CompiledPlan) -> Vec<(String, String)> {
        plan.scopes()
            .into_iter()
            .map(|(spec, path)| (spec.to_owned(), path.to_string()))
            .collect()
    }

    #[test]
    fn compile_simple_specification() {
        let spec = Specification::build("Person", |s| {
            s.member("name", |m| m.required().check(checks::not_empty()))
                .member("age", |m| m.check(checks::between(0_i64, 150_i64)))
        });
        let plan = compile(&spec, &SpecRegistry::new()).unwrap();

        assert_eq!(plan.spec_count(), 1);
        assert_eq!(plan.len(), 3);
        assert_eq!(
            node_paths(&plan),
            [
                ("Person".to_owned(), String::new()),
                ("Person".to_owned(), "name".to_owned()),
                ("Person".to_owned(), "age".to_owned()),
            ]
        );
        let name = plan.node(crate::NodeId(1));
        assert!(matches!(name.presence(), Presence::Required { .. }));
    }

    #[test]
    fn collection_compiles_one_element_scope() {
        let spec = Specification::build("Customer", |s| {
            s.member("orders", |m| m.each(|e| e.member("total", |t| t.check(checks::gt(0_i64)))))
        });
        let plan = compile(&spec, &SpecRegistry::new()).unwrap();
        let paths: Vec<String> = node_paths(&plan).into_iter().map(|(_, p)| p).collect();
        assert_eq!(paths, ["", "orders", "orders[*]", "orders[*].total"]);
    }

    #[test]
    fn nested_specification_compiled_once() {
        let address = Specification::build("Address", |s| {
            s.member("city", |m| m.required())
        });
        let customer = Specification::build("Customer", |s| {
            s.member("home", |m| m.nested("Address"))
                .member("work", |m| m.nested("Address"))
        });
        let registry = SpecRegistry::new().register(address);
        let plan = compile(&customer, &registry).unwrap();

        assert_eq!(plan.spec_count(), 2);
        let address_id = plan.spec_id("Address").unwrap();
        let address_root = plan.node(plan.spec_root(address_id));
        assert_eq!(address_root.path(), &Path::root());
        assert_eq!(
            node_paths(&plan)
                .iter()
                .filter(|(spec, _)| spec == "Address")
                .count(),
            2
        );
        assert!(plan.recursive_specs().is_empty());
    }

    #[test]
    fn self_reference_becomes_back_reference() {
        let node = Specification::build("Node", |s| {
            s.member("name", |m| m.required())
                .member("children", |m| m.each(|e| e.nested("Node")))
        });
        let plan = compile(&node, &SpecRegistry::new()).unwrap();

        assert_eq!(plan.spec_count(), 1);
        assert_eq!(plan.recursive_specs(), ["Node"]);
        let element = plan
            .scopes()
            .iter()
            .position(|(_, p)| p.to_string() == "children[*]")
            .unwrap();
        let steps = &plan.node(crate::NodeId(element)).steps;
        assert!(matches!(steps.as_slice(), [Step::BackRef(id)] if *id == plan.root()));
    }

    #[test]
    fn mutual_recursion_through_registry() {
        let a = Specification::build("A", |s| s.member("b", |m| m.nested("B")));
        let b = Specification::build("B", |s| s.member("a", |m| m.nested("A")));
        let registry = SpecRegistry::new().register(b);
        let plan = compile(&a, &registry).unwrap();
        assert_eq!(plan.spec_count(), 2);
        assert_eq!(plan.recursive_specs(), ["A"]);
    }

    #[test]
    fn root_shadows_registry_entry() {
        let registered = Specification::build("Root", |s| s.member("x", |m| m.required()));
        let root = Specification::build("Root", |s| s.member("y", |m| m.required()));
        let registry = SpecRegistry::new().register(registered);
        let plan = compile(&root, &registry).unwrap();
        let paths: Vec<String> = node_paths(&plan).into_iter().map(|(_, p)| p).collect();
        assert_eq!(paths, ["", "y"]);
    }

    #[test]
    fn members_with_same_name_are_merged() {
        let spec = Specification::build("S", |s| {
            s.member("email", |m| m.required())
                .member("other", |m| m)
                .member("email", |m| m.check(checks::not_empty()))
        });
        let plan = compile(&spec, &SpecRegistry::new()).unwrap();
        assert_eq!(plan.len(), 3);
        let email = plan.node(crate::NodeId(1));
        assert_eq!(email.path().to_string(), "email");
        assert!(matches!(email.presence(), Presence::Required { .. }));
        assert_eq!(email.steps.len(), 1);
    }

    #[test]
    fn unresolved_reference() {
        let spec = Specification::build("S", |s| s.member("a", |m| m.nested("Missing")));
        let err = compile(&spec, &SpecRegistry::new()).unwrap_err();
        match err {
            CompileError::UnresolvedSpecification {
                spec,
                path,
                reference,
            } => {
                assert_eq!(spec, "S");
                assert_eq!(path, "a");
                assert_eq!(reference, "Missing");
            }
            other => panic!("expected UnresolvedSpecification, got {other:?}"),
        }
    }

    #[test]
    fn conflicting_presence() {
        let spec = Specification::build("S", |s| {
            s.member("a", |m| m.required()).member("a", |m| m.optional())
        });
        let err = compile(&spec, &SpecRegistry::new()).unwrap_err();
        assert!(matches!(
            err,
            CompileError::ConflictingPresence { ref path, .. } if path == "a"
        ));
    }

    #[test]
    fn repeated_presence_of_same_kind_is_allowed() {
        let spec = Specification::build("S", |s| {
            s.member("a", |m| {
                m.required()
                    .presence(Presence::required().with_code("Missing"))
            })
        });
        let plan = compile(&spec, &SpecRegistry::new()).unwrap();
        assert!(matches!(
            plan.node(crate::NodeId(1)).presence(),
            Presence::Required { code, .. } if code == "Missing"
        ));
    }

    #[test]
    fn guarded_members_may_differ_in_presence() {
        let spec = Specification::build("S", |s| {
            s.when(|v| v.member("kind").is_some(), |w| w.member("a", |m| m.required()))
                .member("a", |m| m.optional())
        });
        assert!(compile(&spec, &SpecRegistry::new()).is_ok());
    }

    #[test]
    fn repeated_collections_are_merged() {
        let spec = Specification::build("S", |s| {
            s.member("items", |m| {
                m.each(|e| e.required())
                    .each(|e| e.required().check(checks::not_empty()))
            })
        });
        let plan = compile(&spec, &SpecRegistry::new()).unwrap();
        let paths: Vec<String> = node_paths(&plan).into_iter().map(|(_, p)| p).collect();
        assert_eq!(paths, ["", "items", "items[*]"]);
        let element = plan.node(crate::NodeId(2));
        assert!(matches!(element.presence(), Presence::Required { .. }));
        assert_eq!(element.steps.len(), 1);
    }

    #[test]
    fn conflicting_presence_across_collections() {
        let spec = Specification::build("S", |s| {
            s.member("items", |m| m.each(|e| e.required()).each(|e| e.optional()))
        });
        let err = compile(&spec, &SpecRegistry::new()).unwrap_err();
        assert!(matches!(
            err,
            CompileError::ConflictingPresence { ref path, .. } if path == "items[*]"
        ));
    }

    #[test]
    fn nested_root_presence_must_agree() {
        let registry =
            SpecRegistry::new().register(Specification::build("X", |s| s.forbidden()));
        let spec = Specification::build("S", |s| s.member("a", |m| m.required().nested("X")));
        let err = compile(&spec, &registry).unwrap_err();
        assert!(matches!(
            err,
            CompileError::ConflictingPresence { ref spec, ref path } if spec == "S" && path == "a"
        ));
    }

    #[test]
    fn nested_root_presence_may_repeat_or_fill_in() {
        let registry = SpecRegistry::new().register(Specification::build("X", |s| s.required()));
        let spec = Specification::build("S", |s| {
            s.member("a", |m| m.required().nested("X"))
                .member("b", |m| m.nested("X"))
        });
        assert!(compile(&spec, &registry).is_ok());
    }

    #[test]
    fn nested_root_presence_fills_in_member_presence() {
        let registry = SpecRegistry::new().register(Specification::build("X", |s| s.required()));
        let spec = Specification::build("S", |s| s.member("a", |m| m.nested("X")));
        let plan = compile(&spec, &registry).unwrap();
        assert!(matches!(plan.node(crate::NodeId(1)).presence(), Presence::Required { .. }));
    }

    #[test]
    fn spliced_specifications_must_agree() {
        let registry = SpecRegistry::new()
            .register(Specification::build("X", |s| s.required()))
            .register(Specification::build("Y", |s| s.forbidden()));
        let spec = Specification::build("S", |s| s.member("a", |m| m.nested("X").nested("Y")));
        assert!(matches!(
            compile(&spec, &registry),
            Err(CompileError::ConflictingPresence { .. })
        ));
    }

    #[test]
    fn back_reference_presence_must_agree() {
        let node = Specification::build("Node", |s| {
            s.required().member("parent", |m| m.forbidden().nested("Node"))
        });
        let err = compile(&node, &SpecRegistry::new()).unwrap_err();
        assert!(matches!(
            err,
            CompileError::ConflictingPresence { ref spec, ref path } if spec == "Node" && path == "parent"
        ));
    }

    #[test]
    fn guarded_reference_skips_presence_agreement() {
        let registry =
            SpecRegistry::new().register(Specification::build("X", |s| s.forbidden()));
        let spec = Specification::build("S", |s| {
            s.member("a", |m| m.required().when(|_| false, |w| w.nested("X")))
        });
        assert!(compile(&spec, &registry).is_ok());
    }

    #[test]
    fn member_names_must_render_unambiguously() {
        for name in ["", "a.b", "rows[0]", "x]"] {
            let spec = Specification::build("S", |s| {
                s.member("outer", |m| m.member(name, |n| n.required()))
            });
            match compile(&spec, &SpecRegistry::new()) {
                Err(CompileError::InvalidMemberName { spec, path, name: bad }) => {
                    assert_eq!((spec.as_str(), path.as_str(), bad.as_str()), ("S", "outer", name));
                }
                other => panic!("expected InvalidMemberName for {name:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn presence_directly_in_condition_is_rejected() {
        let spec = Specification::build("S", |s| {
            s.member("a", |m| m.when(|_| true, |w| w.required()))
        });
        let err = compile(&spec, &SpecRegistry::new()).unwrap_err();
        assert!(matches!(err, CompileError::GuardedPresence { ref path, .. } if path == "a"));
    }

    #[test]
    fn duplicate_registry_names() {
        let registry = SpecRegistry::new()
            .register(Specification::new("A", vec![]))
            .register(Specification::new("A", vec![]));
        let err = compile(&Specification::new("Root", vec![]), &registry).unwrap_err();
        assert!(matches!(err, CompileError::DuplicateSpecification { ref name } if name == "A"));
    }

    #[test]
    fn non_descending_cycle() {
        let a = Specification::build("A", |s| s.nested("B"));
        let b = Specification::build("B", |s| s.check(checks::not_empty()).nested("A"));
        let registry = SpecRegistry::new().register(b);
        match compile(&a, &registry) {
            Err(CompileError::NonDescendingCycle { path }) => {
                assert_eq!(path, ["A", "B", "A"]);
            }
            other => panic!("expected NonDescendingCycle, got {other:?}"),
        }
    }

    #[test]
    fn direct_self_reference_is_non_descending() {
        let spec = Specification::build("Loop", |s| s.nested("Loop"));
        assert!(matches!(
            compile(&spec, &SpecRegistry::new()),
            Err(CompileError::NonDescendingCycle { .. })
        ));
    }

    #[test]
    fn invalid_relocation_path() {
        let spec = Specification::build("S", |s| {
            s.member("a", |m| m.check(checks::not_empty().at("x[")))
        });
        let err = compile(&spec, &SpecRegistry::new()).unwrap_err();
        assert!(matches!(err, CompileError::InvalidPath { ref at, .. } if at == "x["));
    }

    #[test]
    fn relocation_is_parsed() {
        let spec = Specification::build("S", |s| s.check(checks::not_empty().at("confirm")));
        let plan = compile(&spec, &SpecRegistry::new()).unwrap();
        match &plan.node(crate::NodeId(0)).steps[..] {
            [Step::Check(check)] => assert_eq!(check.at, Path::root().member("confirm")),
            other => panic!("expected one check, got {other:?}"),
        }
    }
}
