//! Property tests for dead-code elimination.
//!
//! Trees are generated as scope-free shapes and then lowered with every
//! positional reference clamped into scope. Function references only name
//! functions a group has already declared, or the function being lowered.
//! Properties checked:
//!
//! 1. After purity propagation, `PURE` matches bit 0 of `meta` on every node.
//! 2. Every surviving positional reference still lands inside its scope.
//! 3. Every surviving reference still names the binding it named before.
//! 4. No reachable node has been released.
//! 5. Every node that leaves the arena is accounted for in the stats.
//! 6. Impure values bound directly in a reachable group are never dropped.

use std::collections::BTreeMap;

use proptest::prelude::*;

use loam_expr::{
    ExprArena, ExprId, ExprKind, ExprTree, Literal, Stack, StaticPrimTable, SumRef, VarTarget,
};

use crate::{optimize_deadcode, propagate_purity};

#[derive(Debug, Clone)]
enum Shape {
    Lit(i64),
    Print,
    Add,
    Construct(usize),
    Destruct,
    Get(usize, usize),
    Var(usize),
    FnRef(usize),
    App(Box<Shape>, Box<Shape>),
    Lambda(Box<Shape>),
    /// Values, function bodies (each wrapped in a lambda), body.
    Def(Vec<Shape>, Vec<Shape>, Box<Shape>),
}

fn arb_shape(depth: u32) -> BoxedStrategy<Shape> {
    let leaf = prop_oneof![
        3 => (-5i64..5).prop_map(Shape::Lit),
        1 => Just(Shape::Print),
        1 => Just(Shape::Add),
        1 => (0usize..2).prop_map(Shape::Construct),
        1 => Just(Shape::Destruct),
        1 => (0usize..2, 0usize..2).prop_map(|(m, f)| Shape::Get(m, f)),
        4 => (0usize..6).prop_map(Shape::Var),
        2 => (0usize..4).prop_map(Shape::FnRef),
    ];
    if depth == 0 {
        return leaf.boxed();
    }
    let inner = arb_shape(depth - 1);
    prop_oneof![
        2 => leaf,
        2 => (inner.clone(), inner.clone())
            .prop_map(|(f, x)| Shape::App(Box::new(f), Box::new(x))),
        1 => inner.clone().prop_map(|b| Shape::Lambda(Box::new(b))),
        2 => (
            prop::collection::vec(inner.clone(), 0..4),
            prop::collection::vec(inner.clone(), 0..3),
            inner,
        )
            .prop_map(|(values, functions, body)| Shape::Def(values, functions, Box::new(body))),
    ]
    .boxed()
}

fn pair() -> SumRef {
    SumRef {
        name: "pair".to_string(),
        members: vec!["left".to_string(), "right".to_string()],
    }
}

/// A function a reference may name, and whether naming it is a recursive call.
#[derive(Debug, Clone, Copy)]
struct Visible {
    id: ExprId,
    recursive: bool,
}

fn lower(arena: &mut ExprArena, shape: &Shape, scope: usize, fns: &[Visible]) -> ExprId {
    match shape {
        Shape::Lit(n) => arena.literal(Literal::Integer(*n)),
        Shape::Print => arena.prim("print", 1),
        Shape::Add => arena.prim("add", 2),
        Shape::Construct(member) => arena.construct(pair(), *member),
        Shape::Destruct => arena.destruct(pair()),
        Shape::Get(member, field) => arena.get_field(pair(), *member, *field),
        Shape::Var(raw) => {
            if scope == 0 {
                arena.literal(Literal::Unit)
            } else {
                arena.var(format!("v{}", raw % scope), raw % scope)
            }
        }
        Shape::FnRef(raw) => match fns.get(raw % fns.len().max(1)) {
            Some(visible) => {
                let name = format!("f{}", visible.id.index());
                arena.fn_ref(name, visible.id, visible.recursive)
            }
            None => arena.literal(Literal::Unit),
        },
        Shape::App(func, arg) => {
            let func = lower(arena, func, scope, fns);
            let arg = lower(arena, arg, scope, fns);
            arena.app(func, arg)
        }
        Shape::Lambda(body) => {
            let body = lower(arena, body, scope + 1, fns);
            arena.lambda("x", body)
        }
        Shape::Def(values, functions, body) => {
            let values: Vec<(String, ExprId)> = values
                .iter()
                .enumerate()
                .map(|(i, value)| (format!("b{i}"), lower(arena, value, scope, fns)))
                .collect();
            let inner = scope + values.len();

            let mut visible = fns.to_vec();
            let mut lowered = Vec::with_capacity(functions.len());
            for fn_body in functions {
                let slot = arena.reserve();
                visible.push(Visible {
                    id: slot,
                    recursive: true,
                });
                let fn_body = lower(arena, fn_body, inner + 1, &visible);
                arena.fill(
                    slot,
                    ExprKind::Lambda {
                        name: "x".to_string(),
                        body: fn_body,
                    },
                );
                if let Some(last) = visible.last_mut() {
                    last.recursive = false;
                }
                lowered.push((format!("f{}", slot.index()), slot));
            }

            let body = lower(arena, body, inner, &visible);
            arena.def(values, lowered, body)
        }
    }
}

fn build(shape: &Shape) -> ExprTree {
    let mut arena = ExprArena::new();
    let root = lower(&mut arena, shape, 0, &[]);
    ExprTree { arena, root }
}

/// Walk the reachable tree, checking scoping and liveness of every node.
fn check_scoped(arena: &ExprArena, id: ExprId, scope: usize) -> Result<(), String> {
    let Some(expr) = arena.get(id) else {
        return Err(format!("node {} reachable but released", id.index()));
    };
    match &expr.kind {
        ExprKind::VarRef {
            target: VarTarget::Index(index),
            ..
        } if *index >= scope => Err(format!("index {index} escapes scope of {scope}")),
        ExprKind::VarRef {
            target: VarTarget::Binding(target),
            ..
        } if !arena.contains(*target) => {
            Err(format!("identity reference to released node {}", target.index()))
        }
        ExprKind::App { func, arg } => {
            check_scoped(arena, *func, scope)?;
            check_scoped(arena, *arg, scope)
        }
        ExprKind::Lambda { body, .. } => check_scoped(arena, *body, scope + 1),
        ExprKind::DefBinding(def) => {
            for &value in &def.values {
                check_scoped(arena, value, scope)?;
            }
            let inner = scope + def.values.len();
            for &function in &def.functions {
                check_scoped(arena, function, inner)?;
            }
            check_scoped(arena, def.body, inner)
        }
        _ => Ok(()),
    }
}

/// The binder a positional index lands on: the lambda itself for an
/// argument, the bound expression for a group value.
fn binder_at(arena: &ExprArena, stack: Option<&Stack<'_>>, index: usize) -> Option<ExprId> {
    let mut frame = stack?;
    let mut idx = index;
    loop {
        let size = frame.size(arena);
        if idx < size {
            break;
        }
        idx -= size;
        frame = frame.next?;
    }
    match &arena[frame.expr].kind {
        ExprKind::DefBinding(def) => def.values.get(idx).copied(),
        _ => Some(frame.expr),
    }
}

/// Record what every reachable reference names, keyed by the reference node.
fn reference_targets(
    arena: &ExprArena,
    id: ExprId,
    stack: Option<&Stack<'_>>,
    out: &mut BTreeMap<ExprId, Option<ExprId>>,
) {
    match &arena[id].kind {
        ExprKind::VarRef { target, .. } => {
            let named = match *target {
                VarTarget::Index(index) => binder_at(arena, stack, index),
                VarTarget::Binding(target) => Some(target),
            };
            out.insert(id, named);
        }
        ExprKind::App { func, arg } => {
            reference_targets(arena, *func, stack, out);
            reference_targets(arena, *arg, stack, out);
        }
        ExprKind::Lambda { body, .. } => {
            let frame = Stack::new(id, stack);
            reference_targets(arena, *body, Some(&frame), out);
        }
        ExprKind::DefBinding(def) => {
            for &value in &def.values {
                reference_targets(arena, value, stack, out);
            }
            let frame = Stack::new(id, stack);
            for &function in &def.functions {
                reference_targets(arena, function, Some(&frame), out);
            }
            reference_targets(arena, def.body, Some(&frame), out);
        }
        _ => {}
    }
}

/// Nodes whose `PURE` flag disagrees with bit 0 of their meta.
fn purity_mismatches(arena: &ExprArena, id: ExprId, out: &mut Vec<ExprId>) {
    let expr = &arena[id];
    if expr.is_pure() != expr.meta.pure_at(0) {
        out.push(id);
    }
    for child in expr.children() {
        purity_mismatches(arena, child, out);
    }
}

/// Impure values bound by groups reachable without entering a dropped value.
fn impure_group_values(arena: &ExprArena, id: ExprId, out: &mut Vec<ExprId>) {
    match &arena[id].kind {
        ExprKind::App { func, arg } => {
            impure_group_values(arena, *func, out);
            impure_group_values(arena, *arg, out);
        }
        ExprKind::Lambda { body, .. } => impure_group_values(arena, *body, out),
        ExprKind::DefBinding(def) => {
            for &value in &def.values {
                if !arena[value].is_pure() {
                    out.push(value);
                    impure_group_values(arena, value, out);
                }
            }
            impure_group_values(arena, def.body, out);
        }
        _ => {}
    }
}

proptest! {
    #[test]
    fn pure_flag_matches_meta(shape in arb_shape(4)) {
        let mut tree = build(&shape);
        propagate_purity(&mut tree.arena, tree.root, None, &StaticPrimTable::with_builtins());
        let mut mismatches = Vec::new();
        purity_mismatches(&tree.arena, tree.root, &mut mismatches);
        prop_assert!(mismatches.is_empty(), "mismatched nodes: {:?}", mismatches);
    }

    #[test]
    fn references_stay_in_scope(shape in arb_shape(4)) {
        let mut tree = build(&shape);
        optimize_deadcode(&mut tree, &StaticPrimTable::with_builtins());
        prop_assert_eq!(check_scoped(&tree.arena, tree.root, 0), Ok(()));
    }

    #[test]
    fn renumbering_preserves_targets(shape in arb_shape(4)) {
        let mut tree = build(&shape);
        let mut before = BTreeMap::new();
        reference_targets(&tree.arena, tree.root, None, &mut before);

        optimize_deadcode(&mut tree, &StaticPrimTable::with_builtins());
        let mut after = BTreeMap::new();
        reference_targets(&tree.arena, tree.root, None, &mut after);

        for (reference, named) in after {
            prop_assert_eq!(before.get(&reference), Some(&named), "reference {:?}", reference);
        }
    }

    #[test]
    fn released_nodes_are_accounted_for(shape in arb_shape(4)) {
        let mut tree = build(&shape);
        let before = tree.arena.live_count();
        let stats = optimize_deadcode(&mut tree, &StaticPrimTable::with_builtins());
        prop_assert_eq!(tree.arena.live_count() + stats.released_nodes, before);
    }

    #[test]
    fn impure_values_survive(shape in arb_shape(4)) {
        let prims = StaticPrimTable::with_builtins();
        let mut tree = build(&shape);
        propagate_purity(&mut tree.arena, tree.root, None, &prims);
        let mut impure = Vec::new();
        impure_group_values(&tree.arena, tree.root, &mut impure);

        optimize_deadcode(&mut tree, &prims);
        for id in impure {
            prop_assert!(tree.arena.contains(id));
        }
    }
}
