//! Delegate abstraction: one unit of caller-supplied work.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use super::Context;

/// Outcome of a delegate call.
pub type DelegateResult = anyhow::Result<()>;

/// Shared, type-erased delegate as stored by executors and schedulers.
pub type SharedDelegate<T> = Arc<dyn Delegate<T>>;

/// A unit of work invoked with a context and an argument.
///
/// The core never mutates a delegate, it only calls it, possibly from many
/// tasks at once. Delegates should watch `ctx` and return early once it is
/// done; cancellation is cooperative.
///
/// Any `Fn(Context, T) -> impl Future<Output = DelegateResult>` closure is a
/// delegate:
///
/// ```rust,ignore
/// use nolan::core::{delegate_fn, Context};
///
/// let greet = delegate_fn(|_ctx: Context, name: String| async move {
///     tracing::info!("hello {name}");
///     Ok(())
/// });
/// ```
#[async_trait]
pub trait Delegate<T>: Send + Sync + 'static
where
    T: Send + 'static,
{
    /// Run the delegate.
    async fn call(&self, ctx: Context, arg: T) -> DelegateResult;
}

#[async_trait]
impl<T, F, Fut> Delegate<T> for F
where
    T: Send + 'static,
    F: Fn(Context, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = DelegateResult> + Send + 'static,
{
    async fn call(&self, ctx: Context, arg: T) -> DelegateResult {
        (self)(ctx, arg).await
    }
}

/// Wrap a closure into a [`SharedDelegate`].
pub fn delegate_fn<T, F, Fut>(f: F) -> SharedDelegate<T>
where
    T: Send + 'static,
    F: Fn(Context, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = DelegateResult> + Send + 'static,
{
    Arc::new(f)
}
