//! Synthetic inputs for the optimizer benchmarks.

use loam_expr::{Literal, SurfaceBinding, SurfaceExpr};
use loam_ssa::Term;

/// One definition group with `values` value bindings and `functions` lambda
/// bindings. Every fourth value prints, the rest are dead literals; the body
/// reads the last value.
pub fn wide_def(values: usize, functions: usize) -> SurfaceExpr {
    let print = |n: usize| SurfaceExpr::App {
        func: Box::new(SurfaceExpr::Prim {
            name: "print".to_string(),
            arity: 1,
        }),
        arg: Box::new(integer(n)),
    };
    let values = (0..values)
        .map(|i| SurfaceBinding {
            name: format!("v{i}"),
            expr: if i % 4 == 0 { print(i) } else { integer(i) },
        })
        .collect::<Vec<_>>();
    let functions = (0..functions)
        .map(|i| SurfaceBinding {
            name: format!("f{i}"),
            expr: SurfaceExpr::Lambda {
                name: "x".to_string(),
                body: Box::new(SurfaceExpr::Var {
                    name: "x".to_string(),
                    index: 0,
                    recursive: false,
                }),
            },
        })
        .collect::<Vec<_>>();
    let body = SurfaceExpr::Var {
        name: format!("v{}", values.len().saturating_sub(1)),
        index: values.len().saturating_sub(1),
        recursive: false,
    };
    SurfaceExpr::Def {
        values,
        functions,
        body: Box::new(body),
    }
}

/// A root block holding an identity function followed by `calls` rounds of
/// `lit`, a call of the identity function on it, and `neg` of the result.
/// Every other literal is left unused.
pub fn call_chain(calls: usize) -> Term {
    let mut terms = vec![Term::fun(vec![Term::arg().with_label("y")], 2).with_label("id")];
    for k in 0..calls {
        let base = 2 + 4 * k;
        terms.push(Term::lit(Literal::Integer(k as i64)));
        terms.push(Term::app(vec![1, base]));
        terms.push(Term::prim("neg", vec![base + 1]));
        terms.push(Term::lit(Literal::Unit));
    }
    let output = terms.len();
    Term::fun(terms, output)
}

fn integer(n: usize) -> SurfaceExpr {
    SurfaceExpr::Literal(Literal::Integer(n as i64))
}
