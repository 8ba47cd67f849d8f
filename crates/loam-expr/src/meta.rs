//! Per-node analysis state: flags, the purity mask, and literal values.

use std::fmt;
use std::ops::{BitAnd, BitOr};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

/// Analysis flags carried by expression nodes and SSA terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Flags(u8);

impl Flags {
    pub const EMPTY: Flags = Flags(0);
    /// Evaluating the node has no side effect.
    pub const PURE: Flags = Flags(1 << 0);
    /// The node (a binding or term) is needed by the surviving program.
    pub const USED: Flags = Flags(1 << 1);
    /// A reference that is a self or mutual call inside its own target.
    pub const RECURSIVE: Flags = Flags(1 << 2);

    pub fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn set(&mut self, flag: Flags, on: bool) {
        if on {
            self.0 |= flag.0;
        } else {
            self.0 &= !flag.0;
        }
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

// ---------------------------------------------------------------------------
// Purity mask
// ---------------------------------------------------------------------------

/// Purity lattice value.
///
/// Bit `d` is set when the expression, after `d` further applications or
/// eliminations, has produced no side effect. Bit 0 covers evaluating the
/// expression itself. Depths beyond 63 saturate: shifting a mask left drops
/// its top bit, so deeply curried purity is forgotten rather than invented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Purity(pub u64);

impl Purity {
    /// Nothing is known to be pure.
    pub const NONE: Purity = Purity(0);
    /// Evaluation is pure; nothing is known about applying the result.
    pub const EVAL: Purity = Purity(1);
    /// Pure at every depth.
    pub const ALL: Purity = Purity(u64::MAX);

    pub fn is_pure(self) -> bool {
        self.0 & 1 != 0
    }

    /// Whether applying the value `depth` times stays free of effects.
    pub fn pure_at(self, depth: u32) -> bool {
        depth < u64::BITS && (self.0 >> depth) & 1 != 0
    }

    /// Purity of applying a value with this mask to an argument.
    ///
    /// Applying consumes one layer of the mask. If either the function or the
    /// argument is impure to reach, the application step itself is impure, but
    /// the deeper layers still describe further applications.
    pub fn apply(self, arg: Purity) -> Purity {
        let reachable = self.is_pure() && arg.is_pure();
        let mut bits = self.0 >> 1;
        if !reachable {
            bits &= !1;
        }
        Purity(bits)
    }

    /// Purity of a one-argument abstraction whose body has this mask.
    pub fn abstraction(self) -> Purity {
        Purity((self.0 << 1) | 1)
    }

    /// Clear bit 0 when `pure` is false, leaving the deeper layers alone.
    pub fn with_eval(self, pure: bool) -> Purity {
        if pure { self } else { Purity(self.0 & !1) }
    }
}

impl BitAnd for Purity {
    type Output = Purity;

    fn bitand(self, rhs: Purity) -> Purity {
        Purity(self.0 & rhs.0)
    }
}

impl fmt::Display for Purity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Literals
// ---------------------------------------------------------------------------

/// A literal value, shared by the expression tree and SSA terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Integer(i64),
    Double(f64),
    String(String),
    Unit,
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(value) => write!(f, "{value}"),
            Literal::Double(value) => write!(f, "{value:?}"),
            Literal::String(value) => write!(f, "{value:?}"),
            Literal::Unit => write!(f, "()"),
        }
    }
}
