//! The declarative pieces of a model: functions, blocks, identities, operators.
pub mod block;
pub mod function;
pub mod identity;
pub mod ops;

pub use block::{normalize, BlockShape, LegacyBlock, PartialStateUpdates, UpdateBlock};
pub use function::{FnOrigin, PolicyFn, StateUpdateFn, StepContext};
pub use identity::Identity;
pub use ops::PolicyOp;
