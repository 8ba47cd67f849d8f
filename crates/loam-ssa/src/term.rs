//! SSA terms.
//!
//! A term's id is its position in the scope chain, not a global counter. The
//! root function block has id 0; the `j`th term of a function block whose id
//! is `b` has id `b + 1 + j`. A nested block's terms therefore share ids with
//! the terms that follow the block in its parent, but the two are never in
//! scope at the same time.

use serde::{Deserialize, Serialize};

use loam_expr::{Flags, Literal, Purity};

use crate::source_map::SourceMap;

/// Scope-position id of a term.
pub type TermId = usize;

/// One instruction in a function block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(skip)]
    pub meta: Purity,
    #[serde(skip)]
    pub flags: Flags,
    pub kind: TermKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermKind {
    /// The next argument of the enclosing function block.
    Arg,
    Lit(Literal),
    /// `args[0]` applied to `args[1..]`, one argument at a time.
    App { args: Vec<TermId> },
    /// Saturated call of a named primitive.
    Prim { name: String, args: Vec<TermId> },
    /// Field `index` of the single operand.
    Get { index: usize, args: Vec<TermId> },
    /// Pattern match: one handler per constructor, then the scrutinee.
    Des { args: Vec<TermId> },
    /// Data construction tagged with the constructor name.
    Con { tag: String, args: Vec<TermId> },
    Fun(FunBlock),
}

/// A nested SSA region: ordered terms and the id of the one it returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunBlock {
    pub terms: Vec<Term>,
    pub output: TermId,
}

impl Term {
    pub fn new(kind: TermKind) -> Self {
        Term {
            label: String::new(),
            meta: Purity::NONE,
            flags: Flags::EMPTY,
            kind,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn arg() -> Self {
        Term::new(TermKind::Arg)
    }

    pub fn lit(value: Literal) -> Self {
        Term::new(TermKind::Lit(value))
    }

    pub fn app(args: Vec<TermId>) -> Self {
        Term::new(TermKind::App { args })
    }

    pub fn prim(name: impl Into<String>, args: Vec<TermId>) -> Self {
        Term::new(TermKind::Prim {
            name: name.into(),
            args,
        })
    }

    pub fn get(index: usize, arg: TermId) -> Self {
        Term::new(TermKind::Get {
            index,
            args: vec![arg],
        })
    }

    pub fn des(args: Vec<TermId>) -> Self {
        Term::new(TermKind::Des { args })
    }

    pub fn con(tag: impl Into<String>, args: Vec<TermId>) -> Self {
        Term::new(TermKind::Con {
            tag: tag.into(),
            args,
        })
    }

    pub fn fun(terms: Vec<Term>, output: TermId) -> Self {
        Term::new(TermKind::Fun(FunBlock { terms, output }))
    }

    pub fn is_pure(&self) -> bool {
        self.flags.contains(Flags::PURE)
    }

    pub fn is_used(&self) -> bool {
        self.flags.contains(Flags::USED)
    }

    pub fn is_arg(&self) -> bool {
        matches!(self.kind, TermKind::Arg)
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            TermKind::Arg => "arg",
            TermKind::Lit(_) => "lit",
            TermKind::App { .. } => "app",
            TermKind::Prim { .. } => "prim",
            TermKind::Get { .. } => "get",
            TermKind::Des { .. } => "des",
            TermKind::Con { .. } => "con",
            TermKind::Fun(_) => "fun",
        }
    }

    /// Ids this term reads. A function block's output is not an operand.
    pub fn operands(&self) -> &[TermId] {
        match &self.kind {
            TermKind::App { args }
            | TermKind::Prim { args, .. }
            | TermKind::Get { args, .. }
            | TermKind::Des { args }
            | TermKind::Con { args, .. } => args,
            TermKind::Arg | TermKind::Lit(_) | TermKind::Fun(_) => &[],
        }
    }

    fn operands_mut(&mut self) -> &mut [TermId] {
        match &mut self.kind {
            TermKind::App { args }
            | TermKind::Prim { args, .. }
            | TermKind::Get { args, .. }
            | TermKind::Des { args }
            | TermKind::Con { args, .. } => args,
            TermKind::Arg | TermKind::Lit(_) | TermKind::Fun(_) => &mut [],
        }
    }

    /// Rewrite every id this term holds through `map`.
    ///
    /// For a function block only the output is rewritten, so `map` must
    /// already cover the block's own terms; nested terms are remapped by
    /// [`crate::source_map::relocate`].
    pub fn update(&mut self, map: &SourceMap) {
        if let TermKind::Fun(block) = &mut self.kind {
            block.output = map.get(block.output);
        }
        for operand in self.operands_mut() {
            *operand = map.get(*operand);
        }
    }

    /// Number of terms in this term, counting nested blocks.
    pub fn size(&self) -> usize {
        match &self.kind {
            TermKind::Fun(block) => 1 + block.size(),
            _ => 1,
        }
    }
}

impl FunBlock {
    pub fn arity(&self) -> usize {
        self.terms.iter().filter(|term| term.is_arg()).count()
    }

    /// Number of terms in the block, counting nested blocks.
    pub fn size(&self) -> usize {
        self.terms.iter().map(Term::size).sum()
    }

    /// Whether any operand or output inside the block names `id`.
    pub fn mentions(&self, id: TermId) -> bool {
        self.output == id
            || self.terms.iter().any(|term| {
                term.operands().contains(&id)
                    || matches!(&term.kind, TermKind::Fun(inner) if inner.mentions(id))
            })
    }
}
