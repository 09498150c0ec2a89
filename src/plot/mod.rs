//! Plot call facade over an external rendering engine.
//!
//! The engine owns figures, styling, and encoding; this module only maps
//! typed plot operations onto it and relays each rendered frame to the
//! browser.

use crate::client::RelayClient;
use crate::config::RelaySettings;
use crate::error::RelayError;

/// One plotting operation with its argument bundle
#[derive(Debug, Clone, PartialEq)]
pub enum PlotOp {
    /// Connected line through the given points
    Line { x: Vec<f64>, y: Vec<f64> },
    /// Unconnected markers at the given points
    Scatter { x: Vec<f64>, y: Vec<f64> },
    /// Labeled vertical bars
    Bar { labels: Vec<String>, heights: Vec<f64> },
    /// Histogram over raw samples
    Histogram { values: Vec<f64>, bins: usize },
    /// Row-major grid of scalar cells
    Heatmap {
        rows: usize,
        cols: usize,
        values: Vec<f64>,
    },
}

/// Rendering engine boundary.
///
/// Implementations apply operations to their current figure and encode
/// it as an image (typically PNG) on demand.
pub trait RenderEngine {
    /// Apply one operation to the current figure.
    fn apply(&mut self, op: &PlotOp) -> anyhow::Result<()>;

    /// Encode the current figure as an image.
    fn render(&mut self) -> anyhow::Result<Vec<u8>>;
}

/// Plotting facade: applies each operation to the engine and relays the
/// newly rendered frame.
pub struct Plotter<E: RenderEngine> {
    engine: E,
    client: RelayClient,
}

impl<E: RenderEngine> Plotter<E> {
    /// Plotter relaying through the default port.
    pub fn new(engine: E) -> Self {
        Self::with_settings(engine, RelaySettings::default())
    }

    /// Plotter relaying through the given settings.
    pub fn with_settings(engine: E, settings: RelaySettings) -> Self {
        Self {
            engine,
            client: RelayClient::with_settings(settings),
        }
    }

    /// Apply one operation and relay the rendered frame.
    ///
    /// Engine failures propagate without pushing anything.
    pub fn draw(&mut self, op: PlotOp) -> Result<(), RelayError> {
        self.engine.apply(&op)?;
        let frame = self.engine.render()?;
        self.client.push_frame(&frame)
    }

    /// Relay an already-encoded image without involving the engine.
    pub fn show_image(&mut self, encoded: &[u8]) -> Result<(), RelayError> {
        self.client.push_frame(encoded)
    }

    /// Draw a connected line.
    pub fn line(&mut self, x: &[f64], y: &[f64]) -> Result<(), RelayError> {
        self.draw(PlotOp::Line {
            x: x.to_vec(),
            y: y.to_vec(),
        })
    }

    /// Draw unconnected markers.
    pub fn scatter(&mut self, x: &[f64], y: &[f64]) -> Result<(), RelayError> {
        self.draw(PlotOp::Scatter {
            x: x.to_vec(),
            y: y.to_vec(),
        })
    }

    /// Draw labeled vertical bars.
    pub fn bar(&mut self, labels: &[&str], heights: &[f64]) -> Result<(), RelayError> {
        self.draw(PlotOp::Bar {
            labels: labels.iter().map(|s| s.to_string()).collect(),
            heights: heights.to_vec(),
        })
    }

    /// Draw a histogram over raw samples.
    pub fn histogram(&mut self, values: &[f64], bins: usize) -> Result<(), RelayError> {
        self.draw(PlotOp::Histogram {
            values: values.to_vec(),
            bins,
        })
    }

    /// Draw a row-major heatmap.
    pub fn heatmap(&mut self, rows: usize, cols: usize, values: &[f64]) -> Result<(), RelayError> {
        self.draw(PlotOp::Heatmap {
            rows,
            cols,
            values: values.to_vec(),
        })
    }

    /// The engine behind this plotter.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// The relay client behind this plotter.
    pub fn client_mut(&mut self) -> &mut RelayClient {
        &mut self.client
    }

    /// Stop the relay server owned by this plotter's client.
    pub fn stop(&mut self) {
        self.client.stop();
    }
}
