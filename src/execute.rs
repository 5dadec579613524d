use std::collections::BTreeMap;
use std::ops::ControlFlow;

use tracing::trace;

use crate::types::{PlannedCheck, Step};
use crate::{
    CompiledPlan, ErrorEntry, NodeId, Path, Presence, Segment, SpecId, ValidationResult, Value,
};

/// Run `plan` against `value`. With `fail_fast`, stops at the first entry.
pub(crate) fn execute(
    plan: &CompiledPlan,
    value: &Value,
    fail_fast: bool,
    max_depth: usize,
) -> ValidationResult {
    let mut run = Run {
        plan,
        fail_fast,
        max_depth,
        depth: vec![0; plan.spec_count()],
        path: Path::root(),
        result: ValidationResult::default(),
    };
    let stopped = run.scope(plan.spec_root(plan.root()), present(value)).is_break();
    trace!(
        spec = plan.spec_name(plan.root()),
        errors = run.result.len(),
        stopped,
        "validation run finished"
    );
    run.result
}

/// Absent values are missing members and nulls.
fn present(value: &Value) -> Option<&Value> {
    (!value.is_null()).then_some(value)
}

/// `Break` once a fail-fast run has recorded its entry.
type Flow = ControlFlow<()>;

/// State of one validation run. Nothing here outlives the run.
struct Run<'p> {
    plan: &'p CompiledPlan,
    fail_fast: bool,
    max_depth: usize,
    /// Back-reference re-entries currently open, per specification.
    depth: Vec<usize>,
    /// Concrete location of the scope being run, with indices.
    path: Path,
    result: ValidationResult,
}

impl<'p> Run<'p> {
    fn scope(&mut self, node: NodeId, value: Option<&Value>) -> Flow {
        let plan = self.plan;
        let node = plan.node(node);
        match (&node.presence, value) {
            (Presence::Required { code, message }, None)
            | (Presence::Forbidden { code, message }, Some(_)) => {
                self.report(code, &Path::root(), message, BTreeMap::new())
            }
            (_, None) => ControlFlow::Continue(()),
            (_, Some(value)) => self.steps(&node.steps, value),
        }
    }

    fn steps(&mut self, steps: &'p [Step], value: &Value) -> Flow {
        for step in steps {
            match step {
                Step::Check(planned) => self.check(planned, value)?,
                Step::Member { name, node } => {
                    self.path.push(Segment::Member(name.clone()));
                    let flow = self.scope(*node, value.member(name).and_then(present));
                    self.path.pop();
                    flow?;
                }
                Step::Elements(node) => {
                    for (index, element) in value.as_list().unwrap_or_default().iter().enumerate() {
                        self.path.push(Segment::Index(index));
                        let flow = self.scope(*node, present(element));
                        self.path.pop();
                        flow?;
                    }
                }
                Step::When { guard, steps } => {
                    if guard.holds(value) {
                        self.steps(steps, value)?;
                    }
                }
                Step::Enter(spec) => self.enter(*spec, value)?,
                Step::BackRef(spec) => self.back_ref(*spec, value)?,
            }
        }
        ControlFlow::Continue(())
    }

    fn check(&mut self, planned: &PlannedCheck, value: &Value) -> Flow {
        let check = &planned.check;
        if check.passes(value) {
            return ControlFlow::Continue(());
        }
        self.report(check.code(), &planned.at, check.message(), check.args().clone())
    }

    fn enter(&mut self, spec: SpecId, value: &Value) -> Flow {
        self.scope(self.plan.spec_root(spec), Some(value))
    }

    fn back_ref(&mut self, spec: SpecId, value: &Value) -> Flow {
        let depth = self.depth[spec.0];
        if depth >= self.max_depth {
            trace!(
                spec = self.plan.spec_name(spec),
                path = %self.path,
                depth,
                "recursion depth cap reached, branch skipped"
            );
            return ControlFlow::Continue(());
        }
        self.depth[spec.0] += 1;
        let flow = self.enter(spec, value);
        self.depth[spec.0] -= 1;
        flow
    }

    fn report(
        &mut self,
        code: &str,
        at: &Path,
        message: &str,
        args: BTreeMap<String, Value>,
    ) -> Flow {
        let path = self.path.join(at);
        self.result.push(ErrorEntry::new(code, path, message, args));
        if self.fail_fast {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}
