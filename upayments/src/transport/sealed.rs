//! Sealed trait marker for Transport implementations.
//!
//! External crates cannot implement `Transport`; the client relies on its
//! contract (one attempt per call, every HTTP status returned as a response).

pub(crate) mod private {
    /// Sealed trait marker.
    pub trait Sealed {}
}
