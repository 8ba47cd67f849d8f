//! Textual dump of a function block.
//!
//! One line per term: scope position, optional label, purity mask, then the
//! variant's rendering. An operand that is not strictly below the term using
//! it, or a block output past the end of its block, is flagged with ` !!!`
//! but printed as is.

use std::fmt::{self, Write};

use crate::term::{FunBlock, Term, TermId, TermKind};

/// Position and indentation while walking a dump.
#[derive(Debug, Clone, Copy, Default)]
pub struct TermFormat {
    /// Id of the term being rendered.
    pub id: TermId,
    pub depth: usize,
}

impl TermFormat {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Dump `root`, whose id is 0, and everything nested in it.
pub fn dump(root: &Term) -> String {
    let mut out = String::new();
    let mut format = TermFormat::new();
    // Writing to a String cannot fail.
    let _ = write_line(&mut out, root, &mut format);
    out
}

fn write_line(out: &mut impl Write, term: &Term, format: &mut TermFormat) -> fmt::Result {
    write!(out, "{}", format.id)?;
    if !term.label.is_empty() {
        write!(out, " ({})", term.label)?;
    }
    write!(out, " [{}] = ", term.meta)?;
    term.format(out, format)
}

impl Term {
    /// Render the part of a dump line after `=`, plus any nested lines.
    pub fn format(&self, out: &mut impl Write, format: &mut TermFormat) -> fmt::Result {
        match &self.kind {
            TermKind::Arg => writeln!(out, "<arg>"),
            TermKind::Lit(value) => writeln!(out, "{value}"),
            TermKind::App { args } => {
                write!(out, "App(")?;
                write_operands(out, args, format)?;
                writeln!(out, ")")
            }
            TermKind::Prim { name, args } => {
                write!(out, "{name}(")?;
                write_operands(out, args, format)?;
                writeln!(out, ")")
            }
            TermKind::Get { index, args } => {
                write!(out, "Get:{index}(")?;
                write_operands(out, args, format)?;
                writeln!(out, ")")
            }
            TermKind::Des { args } => {
                write!(out, "Des(")?;
                write_operands(out, args, format)?;
                writeln!(out, ")")
            }
            TermKind::Con { tag, args } => {
                write!(out, "Con:{tag}(")?;
                write_operands(out, args, format)?;
                writeln!(out, ")")
            }
            TermKind::Fun(block) => block.format(out, format),
        }
    }
}

impl FunBlock {
    fn format(&self, out: &mut impl Write, format: &mut TermFormat) -> fmt::Result {
        write!(out, "FunRet:{}", self.output)?;
        if self.output > format.id + self.terms.len() {
            write!(out, " !!!")?;
        }
        writeln!(out)?;

        let base = format.id;
        format.depth += 2;
        for term in &self.terms {
            format.id += 1;
            write!(out, "{:width$}", "", width = format.depth + 2)?;
            write_line(out, term, format)?;
        }
        format.id = base;
        format.depth -= 2;
        Ok(())
    }
}

fn write_operands(out: &mut impl Write, args: &[TermId], format: &TermFormat) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(out, " ")?;
        }
        write!(out, "{arg}")?;
        if *arg >= format.id {
            write!(out, " !!!")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_expr::Literal;

    #[test]
    fn flat_block_dump() {
        let root = Term::fun(
            vec![
                Term::arg().with_label("x"),
                Term::lit(Literal::Integer(2)),
                Term::prim("add", vec![1, 2]),
            ],
            3,
        );
        assert_eq!(
            dump(&root),
            "0 [0] = FunRet:3\n    1 (x) [0] = <arg>\n    2 [0] = 2\n    3 [0] = add(1 2)\n"
        );
    }

    #[test]
    fn forward_operand_is_flagged() {
        let root = Term::fun(vec![Term::app(vec![1, 2]), Term::arg()], 2);
        let text = dump(&root);
        assert!(text.contains("1 [0] = App(1 !!! 2 !!!)"), "{text}");
    }

    #[test]
    fn output_past_block_is_flagged() {
        let root = Term::fun(vec![Term::arg()], 2);
        assert!(dump(&root).starts_with("0 [0] = FunRet:2 !!!\n"));
    }

    #[test]
    fn nested_block_ids_restart_after_block() {
        // 1 = fun { 2 = arg } -> 2; then 2 = App(1 1)
        let inner = Term::fun(vec![Term::arg()], 2);
        let root = Term::fun(vec![inner, Term::app(vec![1, 1])], 2);
        assert_eq!(
            dump(&root),
            "0 [0] = FunRet:2\n    1 [0] = FunRet:2\n      2 [0] = <arg>\n    2 [0] = App(1 1)\n"
        );
    }
}
