use tracing::debug;

use crate::types::Step;
use crate::{CompiledPlan, NodeId, Path, Segment, SpecId, Template};

/// Derive the template of `plan` without running any rule body.
pub(crate) fn derive(plan: &CompiledPlan) -> Template {
    let mut walk = Walk {
        plan,
        template: Template::default(),
        path: Path::root(),
        unrolled: Vec::new(),
    };
    walk.scope(plan.spec_root(plan.root()));
    debug!(
        spec = plan.spec_name(plan.root()),
        paths = walk.template.len(),
        recursions = walk.template.recursions().len(),
        "derived template"
    );
    walk.template
}

struct Walk<'p> {
    plan: &'p CompiledPlan,
    template: Template,
    /// Template path of the scope being walked, with `[*]` for elements.
    path: Path,
    /// Back-referenced specifications being unrolled, with the path of their unrolling.
    unrolled: Vec<(SpecId, Path)>,
}

impl<'p> Walk<'p> {
    fn scope(&mut self, node: NodeId) {
        let plan = self.plan;
        let node = plan.node(node);
        if let Some(shape) = node.presence.shape() {
            self.template.add(self.path.clone(), shape);
        }
        self.steps(&node.steps);
    }

    fn steps(&mut self, steps: &'p [Step]) {
        for step in steps {
            match step {
                Step::Check(planned) => {
                    let path = self.path.join(&planned.at).generalize();
                    self.template.add(path, planned.check.shape());
                }
                Step::Member { name, node } => self.child(Segment::Member(name.clone()), *node),
                Step::Elements(node) => self.child(Segment::Any, *node),
                Step::When { steps, .. } => self.steps(steps),
                Step::Enter(spec) => self.scope(self.plan.spec_root(*spec)),
                Step::BackRef(spec) => self.back_ref(*spec),
            }
        }
    }

    fn child(&mut self, segment: Segment, node: NodeId) {
        self.path.push(segment);
        self.scope(node);
        self.path.pop();
    }

    fn back_ref(&mut self, spec: SpecId) {
        if let Some((_, first)) = self.unrolled.iter().find(|(id, _)| *id == spec) {
            self.template.add_recursion(self.path.clone(), first.clone());
            return;
        }
        self.unrolled.push((spec, self.path.clone()));
        self.scope(self.plan.spec_root(spec));
        self.unrolled.pop();
    }
}
