//! Scoped expression tree for loam.
//!
//! The tree is what the name resolver hands to the optimizer: every variable
//! reference is already resolved, either to a position in the lexical
//! environment (a de Bruijn-style index) or directly to the function binding
//! it names. Nodes live in an [`ExprArena`] and are addressed by [`ExprId`]
//! handles, so identity references are plain handle comparisons.

pub mod arena;
pub mod display;
pub mod meta;
pub mod prim;
pub mod stack;
pub mod surface;

pub use arena::{DefBinding, Expr, ExprArena, ExprId, ExprKind, ExprTree, SumRef, VarTarget};
pub use meta::{Flags, Literal, Purity};
pub use prim::{PrimInfo, PrimTable, StaticPrimTable};
pub use stack::{Stack, resolve};
pub use surface::{LowerError, SurfaceBinding, SurfaceExpr, lower_surface};
