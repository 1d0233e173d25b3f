//! Async runtime utilities for flatframe.
//!
//! Lets synchronous callers drive the async execution engine.

use std::future::Future;

use common_error::{FrameError, FrameResult};
use tokio::runtime::Runtime;

/// Get or create a Tokio runtime for blocking operations.
pub fn get_runtime() -> FrameResult<Runtime> {
    Runtime::new().map_err(|e| FrameError::InternalError(format!("Failed to create runtime: {e}")))
}

/// Block on a future using a fresh runtime.
pub fn block_on<F: Future>(future: F) -> FrameResult<F::Output> {
    let runtime = get_runtime()?;
    Ok(runtime.block_on(future))
}
