//! Term optimizer passes. Each one covers every term variant and leaves
//! operands strictly below their users.

pub mod inline;
pub mod purity;
pub mod sweep;
pub mod usage;

pub use inline::pass_inline;
pub use purity::pass_purity;
pub use sweep::pass_sweep;
pub use usage::pass_usage;
