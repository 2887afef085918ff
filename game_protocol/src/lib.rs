//! `game_protocol`
//!
//! Wire protocol shared by both message directions.
//!
//! Design goals:
//! - One schema definition for serialization and dispatch, so outbound
//!   tagging and inbound interpretation cannot drift apart.
//! - Keep serialization explicit and strict: a malformed payload for a
//!   recognized method is an error, an unrecognized method is not.
//! - No `unsafe`.

pub mod math;
pub mod rpc;

pub mod prelude {
    //! Commonly used exports.

    pub use crate::math::*;
    pub use crate::rpc::*;
}
