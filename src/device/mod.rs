pub mod replay;

use async_trait::async_trait;

use crate::errors::GridTapResult;

/// Seam to the external device driver (Appium/UiAutomator2, adb, ...).
///
/// Implementations issue one command at a time; callers re-observe after
/// every tap before acting again.
#[async_trait]
pub trait DeviceDriver: Send + Sync {
    /// Raw UI hierarchy XML for the current screen.
    async fn page_source(&self) -> GridTapResult<String>;

    /// Current screen size in pixels as `(width, height)`.
    async fn window_size(&self) -> GridTapResult<(u32, u32)>;

    /// PNG screenshot of the current screen.
    async fn screenshot(&self) -> GridTapResult<Vec<u8>>;

    /// Single tap at pixel coordinates.
    async fn tap(&self, x: i32, y: i32) -> GridTapResult<()>;
}
