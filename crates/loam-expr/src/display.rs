//! S-expression dump of an expression tree.
//!
//! Positional references print as `name$index` so renumbering is visible;
//! identity references print as `@name`, with a trailing `!` when recursive.

use std::fmt::Write;

use crate::arena::{ExprArena, ExprId, ExprKind, VarTarget};
use crate::meta::Flags;

impl ExprArena {
    pub fn display(&self, id: ExprId) -> String {
        let mut out = String::new();
        self.write_expr(&mut out, id);
        out
    }

    fn write_expr(&self, out: &mut String, id: ExprId) {
        let Some(expr) = self.get(id) else {
            out.push_str("<released>");
            return;
        };
        // Writing to a String cannot fail.
        let _ = match &expr.kind {
            ExprKind::Literal(value) => write!(out, "{value}"),
            ExprKind::Construct { sum, member } => {
                write!(out, "(con {}.{})", sum.name, sum.member_name(*member))
            }
            ExprKind::Destruct { sum } => write!(out, "(des {})", sum.name),
            ExprKind::Get { sum, member, field } => write!(
                out,
                "(get {}.{}.{field})",
                sum.name,
                sum.member_name(*member)
            ),
            ExprKind::Prim { name, arity } => write!(out, "(prim {name}/{arity})"),
            ExprKind::VarRef { name, target } => {
                let recursive = if expr.flags.contains(Flags::RECURSIVE) {
                    "!"
                } else {
                    ""
                };
                match target {
                    VarTarget::Index(index) => write!(out, "{name}${index}{recursive}"),
                    VarTarget::Binding(_) => write!(out, "@{name}{recursive}"),
                }
            }
            ExprKind::App { func, arg } => {
                out.push_str("(app ");
                self.write_expr(out, *func);
                out.push(' ');
                self.write_expr(out, *arg);
                out.push(')');
                Ok(())
            }
            ExprKind::Lambda { name, body } => {
                let _ = write!(out, "(\\{name} ");
                self.write_expr(out, *body);
                out.push(')');
                Ok(())
            }
            ExprKind::DefBinding(def) => {
                let names = def.names_by_index();
                out.push_str("(def");
                let bindings = def
                    .values
                    .iter()
                    .map(|id| ("val", *id))
                    .chain(def.functions.iter().map(|id| ("fun", *id)));
                for (index, (kind, binding)) in bindings.enumerate() {
                    let name = names.get(index).copied().flatten().unwrap_or("_");
                    let _ = write!(out, " ({kind} {name} ");
                    self.write_expr(out, binding);
                    out.push(')');
                }
                out.push(' ');
                self.write_expr(out, def.body);
                out.push(')');
                Ok(())
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use crate::arena::ExprArena;
    use crate::meta::Literal;

    #[test]
    fn prints_def_with_values_and_functions() {
        let mut arena = ExprArena::new();
        let x = arena.literal(Literal::Integer(1));
        let slot = arena.reserve();
        let arg = arena.var("a", 0);
        arena.fill(
            slot,
            crate::arena::ExprKind::Lambda {
                name: "a".to_string(),
                body: arg,
            },
        );
        let call = arena.fn_ref("f", slot, false);
        let x_ref = arena.var("x", 0);
        let body = arena.app(call, x_ref);
        let def = arena.def(
            vec![("x".to_string(), x)],
            vec![("f".to_string(), slot)],
            body,
        );

        assert_eq!(
            arena.display(def),
            "(def (val x 1) (fun f (\\a a$0)) (app @f x$0))"
        );
    }
}
