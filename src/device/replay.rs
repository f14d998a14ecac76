/// Offline device backed by a captured page source and screenshot.
///
/// Useful for replaying a single observation from disk: reads are served
/// from the snapshot and taps are only recorded.
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::device::DeviceDriver;
use crate::errors::{GridTapError, GridTapResult};

pub struct ReplayDevice {
    page_source: String,
    screenshot: Option<Vec<u8>>,
    width: u32,
    height: u32,
    taps: Mutex<Vec<(i32, i32)>>,
}

impl ReplayDevice {
    pub fn new(page_source: String, screenshot: Option<Vec<u8>>, width: u32, height: u32) -> Self {
        Self {
            page_source,
            screenshot,
            width,
            height,
            taps: Mutex::new(Vec::new()),
        }
    }

    /// Load a snapshot from disk. Either file may be omitted.
    pub async fn from_files(
        page_source: Option<&Path>,
        screenshot: Option<&Path>,
        width: u32,
        height: u32,
    ) -> GridTapResult<Self> {
        let source = match page_source {
            Some(p) => tokio::fs::read_to_string(p).await?,
            None => String::new(),
        };
        let shot = match screenshot {
            Some(p) => Some(tokio::fs::read(p).await?),
            None => None,
        };
        Ok(Self::new(source, shot, width, height))
    }

    /// Taps received so far, in order.
    pub fn taps(&self) -> Vec<(i32, i32)> {
        self.taps.lock().map(|t| t.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl DeviceDriver for ReplayDevice {
    async fn page_source(&self) -> GridTapResult<String> {
        if self.page_source.is_empty() {
            return Err(GridTapError::Device("no page source captured".into()));
        }
        Ok(self.page_source.clone())
    }

    async fn window_size(&self) -> GridTapResult<(u32, u32)> {
        Ok((self.width, self.height))
    }

    async fn screenshot(&self) -> GridTapResult<Vec<u8>> {
        self.screenshot
            .clone()
            .ok_or_else(|| GridTapError::Device("no screenshot captured".into()))
    }

    async fn tap(&self, x: i32, y: i32) -> GridTapResult<()> {
        let mut taps = self
            .taps
            .lock()
            .map_err(|e| GridTapError::Device(format!("tap log poisoned: {e}")))?;
        taps.push((x, y));
        tracing::debug!(x, y, "replay tap recorded");
        Ok(())
    }
}
