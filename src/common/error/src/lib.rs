//! Shared error types for flatframe.

mod error;

pub use error::{FrameError, FrameResult, GenericError};
