//! Container runtime seam
//!
//! Registry authentication, blob transfer and manifest handling all happen in
//! an external container tool. The migrator only needs the handful of opaque
//! operations in [`ContainerRuntime`].

pub mod cli;

use crate::error::RuntimeError;
use crate::image::ImageRef;
use crate::registry::Credentials;
use async_trait::async_trait;

pub use cli::CliRuntime;

pub type RuntimeResult<T> = std::result::Result<T, RuntimeError>;

#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Name used in log lines
    fn name(&self) -> &str;

    /// Probes the runtime and returns its version string
    async fn version(&self) -> RuntimeResult<String>;

    /// Fetches `image` into the local image store
    async fn pull(&self, image: &ImageRef) -> RuntimeResult<()>;

    /// Points `target` at the local content of `source`
    async fn tag(&self, source: &ImageRef, target: &ImageRef) -> RuntimeResult<()>;

    async fn push(&self, image: &ImageRef) -> RuntimeResult<()>;

    /// Deletes the local reference; callers treat failure as best-effort
    async fn remove(&self, image: &ImageRef) -> RuntimeResult<()>;

    async fn login(&self, registry: &str, credentials: &Credentials) -> RuntimeResult<()>;

    async fn logout(&self, registry: &str) -> RuntimeResult<()>;
}
