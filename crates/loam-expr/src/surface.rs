//! Serializable nested form of the expression tree and its lowering into an
//! arena.
//!
//! The surface form is what tools write by hand or emit from the resolver:
//! positional references carry their index, function references carry the
//! name of a function binding in an enclosing group.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::arena::{Expr, ExprArena, ExprId, ExprKind, ExprTree, SumRef, def_binding};
use crate::meta::{Flags, Literal};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceExpr {
    Literal(Literal),
    Construct {
        sum: SumRef,
        member: usize,
    },
    Destruct {
        sum: SumRef,
    },
    Get {
        sum: SumRef,
        member: usize,
        field: usize,
    },
    Prim {
        name: String,
        #[serde(default)]
        arity: usize,
    },
    Var {
        #[serde(default)]
        name: String,
        index: usize,
        #[serde(default)]
        recursive: bool,
    },
    FnRef {
        name: String,
        #[serde(default)]
        recursive: bool,
    },
    App {
        func: Box<SurfaceExpr>,
        arg: Box<SurfaceExpr>,
    },
    Lambda {
        name: String,
        body: Box<SurfaceExpr>,
    },
    Def {
        #[serde(default)]
        values: Vec<SurfaceBinding>,
        #[serde(default)]
        functions: Vec<SurfaceBinding>,
        body: Box<SurfaceExpr>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceBinding {
    pub name: String,
    pub expr: SurfaceExpr,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum LowerError {
    #[error("function binding `{name}` must be a lambda")]
    FunctionNotLambda { name: String },
    #[error("reference to unknown function binding `{name}`")]
    UnknownFunction { name: String },
    #[error("binding `{name}` is declared more than once in one group")]
    DuplicateBinding { name: String },
    #[error("function `{from}` calls `{to}`, which is declared after it, without marking the call recursive")]
    ForwardFunctionReference { from: String, to: String },
}

/// Allocate a surface tree into a fresh arena.
///
/// Function references resolve to the innermost enclosing group that declares
/// the name. Value bindings are lowered outside their own group, so they can
/// only name functions of enclosing groups. Inside a group, a function may
/// name itself and earlier siblings freely; naming a later sibling requires
/// the reference to be marked recursive.
pub fn lower_surface(expr: &SurfaceExpr) -> Result<ExprTree, LowerError> {
    let mut lowerer = Lowerer {
        arena: ExprArena::new(),
        functions: Vec::new(),
    };
    let root = lowerer.lower(expr)?;
    Ok(ExprTree {
        arena: lowerer.arena,
        root,
    })
}

struct Lowerer {
    arena: ExprArena,
    functions: Vec<FunctionScope>,
}

/// Function names of one group, with the declaration position of each.
struct FunctionScope {
    slots: BTreeMap<String, (usize, ExprId)>,
    names: Vec<String>,
    /// Position of the function whose body is being lowered, if any.
    lowering: Option<usize>,
}

impl Lowerer {
    fn lookup_function(&self, name: &str, recursive: bool) -> Result<ExprId, LowerError> {
        let Some(scope) = self.functions.iter().rev().find(|s| s.slots.contains_key(name)) else {
            return Err(LowerError::UnknownFunction {
                name: name.to_string(),
            });
        };
        let (position, slot) = scope.slots[name];
        match scope.lowering {
            Some(current) if position > current && !recursive => {
                Err(LowerError::ForwardFunctionReference {
                    from: scope.names[current].clone(),
                    to: name.to_string(),
                })
            }
            _ => Ok(slot),
        }
    }

    fn lower(&mut self, expr: &SurfaceExpr) -> Result<ExprId, LowerError> {
        let id = match expr {
            SurfaceExpr::Literal(value) => self.arena.literal(value.clone()),
            SurfaceExpr::Construct { sum, member } => self.arena.construct(sum.clone(), *member),
            SurfaceExpr::Destruct { sum } => self.arena.destruct(sum.clone()),
            SurfaceExpr::Get { sum, member, field } => {
                self.arena.get_field(sum.clone(), *member, *field)
            }
            SurfaceExpr::Prim { name, arity } => self.arena.prim(name.clone(), *arity),
            SurfaceExpr::Var {
                name,
                index,
                recursive,
            } => {
                let id = self.arena.var(name.clone(), *index);
                self.arena[id].flags.set(Flags::RECURSIVE, *recursive);
                id
            }
            SurfaceExpr::FnRef { name, recursive } => {
                let target = self.lookup_function(name, *recursive)?;
                self.arena.fn_ref(name.clone(), target, *recursive)
            }
            SurfaceExpr::App { func, arg } => {
                let func = self.lower(func)?;
                let arg = self.lower(arg)?;
                self.arena.app(func, arg)
            }
            SurfaceExpr::Lambda { name, body } => {
                let body = self.lower(body)?;
                self.arena.lambda(name.clone(), body)
            }
            SurfaceExpr::Def {
                values,
                functions,
                body,
            } => self.lower_def(values, functions, body)?,
        };
        Ok(id)
    }

    fn lower_def(
        &mut self,
        values: &[SurfaceBinding],
        functions: &[SurfaceBinding],
        body: &SurfaceExpr,
    ) -> Result<ExprId, LowerError> {
        let mut seen = BTreeSet::new();
        for binding in values.iter().chain(functions) {
            if !seen.insert(binding.name.as_str()) {
                return Err(LowerError::DuplicateBinding {
                    name: binding.name.clone(),
                });
            }
        }

        let mut lowered_values = Vec::with_capacity(values.len());
        for binding in values {
            lowered_values.push((binding.name.clone(), self.lower(&binding.expr)?));
        }

        let mut scope = FunctionScope {
            slots: BTreeMap::new(),
            names: Vec::with_capacity(functions.len()),
            lowering: None,
        };
        let mut slots = Vec::with_capacity(functions.len());
        for (position, binding) in functions.iter().enumerate() {
            let slot = self.arena.reserve();
            scope.slots.insert(binding.name.clone(), (position, slot));
            scope.names.push(binding.name.clone());
            slots.push(slot);
        }

        self.functions.push(scope);
        let lowered = self.lower_group(functions, &slots, body);
        self.functions.pop();
        let (lowered_functions, body) = lowered?;

        let kind = ExprKind::DefBinding(def_binding(lowered_values, lowered_functions, body));
        Ok(self.arena.alloc(Expr::new(kind)))
    }

    fn lower_group(
        &mut self,
        functions: &[SurfaceBinding],
        slots: &[ExprId],
        body: &SurfaceExpr,
    ) -> Result<(Vec<(String, ExprId)>, ExprId), LowerError> {
        let mut lowered = Vec::with_capacity(functions.len());
        for (position, (binding, &slot)) in functions.iter().zip(slots).enumerate() {
            let SurfaceExpr::Lambda {
                name: arg,
                body: fn_body,
            } = &binding.expr
            else {
                return Err(LowerError::FunctionNotLambda {
                    name: binding.name.clone(),
                });
            };
            self.set_lowering(Some(position));
            let fn_body = self.lower(fn_body)?;
            self.arena.fill(
                slot,
                ExprKind::Lambda {
                    name: arg.clone(),
                    body: fn_body,
                },
            );
            lowered.push((binding.name.clone(), slot));
        }
        self.set_lowering(None);
        let body = self.lower(body)?;
        Ok((lowered, body))
    }

    fn set_lowering(&mut self, position: Option<usize>) {
        if let Some(scope) = self.functions.last_mut() {
            scope.lowering = position;
        }
    }
}
