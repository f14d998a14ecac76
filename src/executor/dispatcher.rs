/// Tool dispatcher: routes named tool calls to the extractor, the grid mapper
/// and the device, and renders every outcome as a JSON record.
///
/// The dispatcher holds at most one [`ExtractionSession`]. Every tap drops it,
/// so an index can never be reused after the screen may have changed.
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::config::GridSettings;
use crate::device::DeviceDriver;
use crate::errors::{GridTapError, GridTapResult};
use crate::executor::responses::{
    DeviceInfoResponse, ElementsResponse, ErrorResponse, GridShape, LocateResponse,
    ObserveResponse, ScreenSize, Status, TapCellResponse, TapResponse,
};
use crate::executor::tools::FunctionCall;
use crate::perception::extractor::{extract_from_source, ExtractOptions, ExtractionSession};
use crate::perception::grid::GridOverlay;
use crate::perception::overlay::{render_overlay, to_data_url, OverlayStyle};

#[derive(Debug, Default, Deserialize)]
struct ElementsArgs {
    #[serde(default)]
    include_all: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct TapArgs {
    index: usize,
}

#[derive(Debug, Deserialize)]
struct TapCellArgs {
    cell: String,
}

#[derive(Debug, Deserialize)]
struct PointArgs {
    x: i32,
    y: i32,
}

pub struct ToolDispatcher<D: DeviceDriver> {
    device: D,
    grid: GridOverlay,
    cols: u32,
    rows: u32,
    style: OverlayStyle,
    options: ExtractOptions,
    session: Option<ExtractionSession>,
}

impl<D: DeviceDriver> ToolDispatcher<D> {
    /// Query the device for its screen size and build the grid for it.
    pub async fn connect(
        device: D,
        grid: &GridSettings,
        options: ExtractOptions,
    ) -> GridTapResult<Self> {
        let (width, height) = device.window_size().await?;
        let overlay = GridOverlay::new(width, height, grid.cols, grid.rows)?;
        tracing::info!(width, height, cols = grid.cols, rows = grid.rows, "dispatcher connected");
        Ok(Self {
            device,
            grid: overlay,
            cols: grid.cols,
            rows: grid.rows,
            style: grid.overlay.clone(),
            options,
            session: None,
        })
    }

    pub fn grid(&self) -> &GridOverlay {
        &self.grid
    }

    pub fn session(&self) -> Option<&ExtractionSession> {
        self.session.as_ref()
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Run a tool call from a chat model.
    pub async fn dispatch_call(&mut self, call: &FunctionCall) -> Value {
        self.dispatch(&call.name, &call.arguments).await
    }

    /// Run `name` with JSON-encoded `arguments`. Never fails: errors come back
    /// as `{"status": "error", "message": ...}`.
    pub async fn dispatch(&mut self, name: &str, arguments: &str) -> Value {
        tracing::debug!(tool = name, "dispatching tool");
        let result = match name {
            "get_screen_elements" => self.get_screen_elements(arguments).await,
            "tap" => self.tap(arguments).await,
            "tap_cell" => self.tap_cell(arguments).await,
            "tap_at" => self.tap_at(arguments).await,
            "locate_cell" => self.locate_cell(arguments),
            "observe_screen" => self.observe_screen().await,
            "get_device_info" => self.get_device_info().await,
            other => Err(GridTapError::UnknownTool(other.to_string())),
        };
        match result {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "tool failed");
                let mut response = ErrorResponse::new(e.to_string());
                if name == "get_screen_elements" {
                    response = response.with_empty_elements();
                }
                to_json(&response)
            }
        }
    }

    async fn get_screen_elements(&mut self, arguments: &str) -> GridTapResult<Value> {
        let args: ElementsArgs = parse_args(arguments)?;
        self.session = None;
        self.refresh_grid().await?;

        let mut options = self.options.clone();
        if let Some(include_all) = args.include_all {
            options.include_all = include_all;
        }

        let source = self.device.page_source().await?;
        let session = extract_from_source(
            &source,
            self.grid.screen_width(),
            self.grid.screen_height(),
            &options,
        )?;
        let response = ElementsResponse::from(&session);
        self.session = Some(session);
        Ok(to_json(&response))
    }

    async fn tap(&mut self, arguments: &str) -> GridTapResult<Value> {
        let args: TapArgs = parse_args(arguments)?;
        let session = self
            .session
            .as_ref()
            .ok_or(GridTapError::ElementNotFound { index: args.index })?;
        let (x, y) = session.center_of(args.index)?;
        let text = session
            .get(args.index)
            .map(|e| e.text.clone())
            .filter(|t| !t.is_empty());

        // A rejected index leaves the listing usable; a tap invalidates it.
        self.session = None;
        self.device.tap(x, y).await?;
        tracing::info!(index = args.index, x, y, "tapped element");
        Ok(to_json(&TapResponse {
            status: Status::Success,
            action: "tap".into(),
            coordinates: (x, y).into(),
            element_index: Some(args.index),
            element_text: text,
        }))
    }

    async fn tap_cell(&mut self, arguments: &str) -> GridTapResult<Value> {
        let args: TapCellArgs = parse_args(arguments)?;
        let (x, y) = self.grid.cell_to_pixel(&args.cell)?;

        self.session = None;
        self.device.tap(x, y).await?;
        let cell = args.cell.trim().to_ascii_uppercase();
        tracing::info!(cell = %cell, x, y, "tapped cell");
        Ok(to_json(&TapCellResponse {
            status: Status::Success,
            action: "tap_cell".into(),
            cell,
            coordinates: (x, y).into(),
        }))
    }

    async fn tap_at(&mut self, arguments: &str) -> GridTapResult<Value> {
        let PointArgs { x, y } = parse_args(arguments)?;
        self.session = None;
        self.device.tap(x, y).await?;
        tracing::info!(x, y, "tapped coordinates");
        Ok(to_json(&TapResponse {
            status: Status::Success,
            action: "tap".into(),
            coordinates: (x, y).into(),
            element_index: None,
            element_text: None,
        }))
    }

    fn locate_cell(&self, arguments: &str) -> GridTapResult<Value> {
        let PointArgs { x, y } = parse_args(arguments)?;
        Ok(to_json(&LocateResponse {
            status: Status::Success,
            cell: self.grid.pixel_to_cell(x, y),
            coordinates: (x, y).into(),
        }))
    }

    async fn observe_screen(&mut self) -> GridTapResult<Value> {
        self.refresh_grid().await?;
        let shot = self.device.screenshot().await?;
        let annotated = render_overlay(&self.grid, &shot, &self.style)?;
        Ok(to_json(&ObserveResponse {
            status: Status::Success,
            screen_size: ScreenSize {
                width: self.grid.screen_width(),
                height: self.grid.screen_height(),
            },
            grid: GridShape {
                columns: self.grid.cols(),
                rows: self.grid.rows(),
            },
            grid_description: self.grid.describe(),
            image: to_data_url(&annotated),
        }))
    }

    async fn get_device_info(&mut self) -> GridTapResult<Value> {
        self.refresh_grid().await?;
        Ok(to_json(&DeviceInfoResponse {
            status: Status::Success,
            screen_width: self.grid.screen_width(),
            screen_height: self.grid.screen_height(),
        }))
    }

    /// Rebuild the grid if the screen size changed (rotation, resolution switch).
    async fn refresh_grid(&mut self) -> GridTapResult<()> {
        let (width, height) = self.device.window_size().await?;
        if (width, height) != (self.grid.screen_width(), self.grid.screen_height()) {
            tracing::info!(width, height, "screen size changed; rebuilding grid");
            self.grid = GridOverlay::new(width, height, self.cols, self.rows)?;
        }
        Ok(())
    }
}

fn parse_args<T: DeserializeOwned>(arguments: &str) -> GridTapResult<T> {
    let raw = if arguments.trim().is_empty() { "{}" } else { arguments };
    serde_json::from_str(raw).map_err(|e| GridTapError::InvalidArguments(e.to_string()))
}

fn to_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        serde_json::json!({ "status": "error", "message": format!("serialize response: {e}") })
    })
}
