//! # Preview Plot
//!
//! View state for the preview axes and the contract with the plotting collaborator.
//!
//! ## View State
//! Axis zoom is a pair of base-10 exponents in [-3, 3]:
//! - `y_limit = (-10^y, 10^y)`
//! - `x_limit = (0, 10^x)`
//!
//! [`ViewState`] is a plain `Copy` value. Zoom operations return a new value that the
//! caller passes into the next render; nothing is mutated behind the caller's back.
//!
//! ## Rendering
//! [`PlotFrame`] bundles everything a surface needs: time and amplitude slices, limits
//! and an optional marker index. [`SvgSurface`] is the bundled surface; it draws a
//! min/max envelope per pixel column so a 15 s preview at 44.1 kHz stays small.

use serde::{Deserialize, Serialize};

/// Smallest allowed scale exponent
pub const MIN_SCALE_EXP: i32 = -3;
/// Largest allowed scale exponent
pub const MAX_SCALE_EXP: i32 = 3;

/// Axis zoom exponents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    pub y_scale_exp: i32,
    pub x_scale_exp: i32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            y_scale_exp: 0,
            x_scale_exp: 1,
        }
    }
}

impl ViewState {
    /// Build a view, clamping both exponents into range
    pub fn new(y_scale_exp: i32, x_scale_exp: i32) -> Self {
        Self {
            y_scale_exp: y_scale_exp.clamp(MIN_SCALE_EXP, MAX_SCALE_EXP),
            x_scale_exp: x_scale_exp.clamp(MIN_SCALE_EXP, MAX_SCALE_EXP),
        }
    }

    pub fn is_valid(&self) -> bool {
        let range = MIN_SCALE_EXP..=MAX_SCALE_EXP;
        range.contains(&self.y_scale_exp) && range.contains(&self.x_scale_exp)
    }

    pub fn y_limit(&self) -> (f64, f64) {
        let y = 10f64.powi(self.y_scale_exp);
        (-y, y)
    }

    pub fn x_limit(&self) -> (f64, f64) {
        (0.0, 10f64.powi(self.x_scale_exp))
    }

    pub fn zoom_y_out(self) -> Self {
        Self::new(self.y_scale_exp + 1, self.x_scale_exp)
    }

    pub fn zoom_y_in(self) -> Self {
        Self::new(self.y_scale_exp - 1, self.x_scale_exp)
    }

    pub fn zoom_x_out(self) -> Self {
        Self::new(self.y_scale_exp, self.x_scale_exp + 1)
    }

    pub fn zoom_x_in(self) -> Self {
        Self::new(self.y_scale_exp, self.x_scale_exp - 1)
    }
}

/// One render request for the plotting collaborator
#[derive(Debug, Clone, Copy)]
pub struct PlotFrame<'a> {
    pub time: &'a [f64],
    pub amplitude: &'a [f64],
    pub y_limit: (f64, f64),
    pub x_limit: (f64, f64),
    pub marker: Option<usize>,
}

impl<'a> PlotFrame<'a> {
    pub fn new(time: &'a [f64], amplitude: &'a [f64], view: ViewState, marker: Option<usize>) -> Self {
        Self {
            time,
            amplitude,
            y_limit: view.y_limit(),
            x_limit: view.x_limit(),
            marker,
        }
    }

    /// Time of the marker sample, if the marker is set and in range
    pub fn marker_time(&self) -> Option<f64> {
        self.marker.and_then(|i| self.time.get(i).copied())
    }
}

/// Plotting collaborator: draws axes, the waveform and an optional marker
pub trait PlotSurface {
    fn render(&mut self, frame: &PlotFrame<'_>);
}

/// Renders frames to standalone SVG documents
#[derive(Debug, Clone)]
pub struct SvgSurface {
    pub width: u32,
    pub height: u32,
    pub title: String,
    document: String,
}

impl SvgSurface {
    pub fn new(width: u32, height: u32, title: impl Into<String>) -> Self {
        Self {
            width,
            height,
            title: title.into(),
            document: String::new(),
        }
    }

    /// The most recently rendered document (empty before the first render)
    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn into_document(self) -> String {
        self.document
    }
}

impl PlotSurface for SvgSurface {
    fn render(&mut self, frame: &PlotFrame<'_>) {
        self.document = to_svg(frame, self.width, self.height, &self.title);
    }
}

const MARGIN: f64 = 50.0;

/// Maps data coordinates into the plot rectangle
struct Projection {
    x0: f64,
    x_span: f64,
    y0: f64,
    y_span: f64,
    left: f64,
    top: f64,
    plot_width: f64,
    plot_height: f64,
}

impl Projection {
    fn new(frame: &PlotFrame<'_>, width: u32, height: u32) -> Self {
        let plot_width = (width as f64 - 2.0 * MARGIN).max(1.0);
        let plot_height = (height as f64 - 2.0 * MARGIN).max(1.0);
        Self {
            x0: frame.x_limit.0,
            x_span: (frame.x_limit.1 - frame.x_limit.0).max(f64::MIN_POSITIVE),
            y0: frame.y_limit.0,
            y_span: (frame.y_limit.1 - frame.y_limit.0).max(f64::MIN_POSITIVE),
            left: MARGIN,
            top: MARGIN,
            plot_width,
            plot_height,
        }
    }

    fn x(&self, time: f64) -> f64 {
        self.left + (time - self.x0) / self.x_span * self.plot_width
    }

    fn y(&self, amplitude: f64) -> f64 {
        let clamped = amplitude.clamp(self.y0, self.y0 + self.y_span);
        self.top + self.plot_height - (clamped - self.y0) / self.y_span * self.plot_height
    }
}

/// Per-pixel-column min/max of the finite samples inside the x range
fn column_envelope(frame: &PlotFrame<'_>, columns: usize) -> Vec<Option<(f64, f64)>> {
    let mut envelope: Vec<Option<(f64, f64)>> = vec![None; columns];
    let (x0, x1) = frame.x_limit;
    let span = x1 - x0;
    if columns == 0 || span <= 0.0 {
        return envelope;
    }

    for (&time, &amp) in frame.time.iter().zip(frame.amplitude) {
        if time < x0 || time > x1 || !amp.is_finite() {
            continue;
        }
        let column = (((time - x0) / span) * columns as f64) as usize;
        let slot = &mut envelope[column.min(columns - 1)];
        *slot = Some(match *slot {
            Some((lo, hi)) => (lo.min(amp), hi.max(amp)),
            None => (amp, amp),
        });
    }
    envelope
}

fn format_limit(value: f64) -> String {
    if value.abs() >= 1.0 || value == 0.0 {
        format!("{}", value)
    } else {
        format!("{:e}", value)
    }
}

/// Escape special XML characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Render a frame as an SVG document
pub fn to_svg(frame: &PlotFrame<'_>, width: u32, height: u32, title: &str) -> String {
    let projection = Projection::new(frame, width, height);
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
        w = width,
        h = height
    ));
    svg.push_str("  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"16\">{}</text>\n",
        width as f64 / 2.0,
        MARGIN / 2.0,
        escape_xml(title)
    ));

    // Plot frame
    svg.push_str(&format!(
        "  <rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"none\" stroke=\"#888\"/>\n",
        projection.left, projection.top, projection.plot_width, projection.plot_height
    ));

    // Horizontal axis at zero, highlighted
    let zero = projection.y(0.0);
    svg.push_str(&format!(
        "  <line class=\"zero-axis\" x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"black\" stroke-width=\"2\"/>\n",
        projection.left,
        zero,
        projection.left + projection.plot_width,
        zero
    ));

    // Waveform envelope
    let columns = projection.plot_width.round() as usize;
    let column_width = projection.plot_width / columns.max(1) as f64;
    let mut points = Vec::new();
    for (column, bounds) in column_envelope(frame, columns).into_iter().enumerate() {
        if let Some((lo, hi)) = bounds {
            let x = projection.left + (column as f64 + 0.5) * column_width;
            points.push(format!("{:.2},{:.2}", x, projection.y(hi)));
            if lo != hi {
                points.push(format!("{:.2},{:.2}", x, projection.y(lo)));
            }
        }
    }
    if !points.is_empty() {
        svg.push_str(&format!(
            "  <polyline class=\"signal\" fill=\"none\" stroke=\"#1f77b4\" stroke-width=\"1\" points=\"{}\"/>\n",
            points.join(" ")
        ));
    }

    // Playback marker
    if let Some(time) = frame.marker_time() {
        if time >= frame.x_limit.0 && time <= frame.x_limit.1 {
            let x = projection.x(time);
            svg.push_str(&format!(
                "  <line class=\"marker\" x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"red\" stroke-width=\"1.5\"/>\n",
                x,
                projection.top,
                x,
                projection.top + projection.plot_height
            ));
        }
    }

    // Limits and axis labels
    let bottom = projection.top + projection.plot_height;
    svg.push_str(&format!(
        "  <text x=\"{:.2}\" y=\"{:.2}\" font-size=\"11\">{}</text>\n",
        projection.left,
        bottom + 15.0,
        format_limit(frame.x_limit.0)
    ));
    svg.push_str(&format!(
        "  <text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"end\" font-size=\"11\">{}</text>\n",
        projection.left + projection.plot_width,
        bottom + 15.0,
        format_limit(frame.x_limit.1)
    ));
    svg.push_str(&format!(
        "  <text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"end\" font-size=\"11\">{}</text>\n",
        projection.left - 4.0,
        projection.top + 4.0,
        format_limit(frame.y_limit.1)
    ));
    svg.push_str(&format!(
        "  <text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"end\" font-size=\"11\">{}</text>\n",
        projection.left - 4.0,
        bottom,
        format_limit(frame.y_limit.0)
    ));
    svg.push_str(&format!(
        "  <text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"12\">Time (s)</text>\n",
        projection.left + projection.plot_width / 2.0,
        bottom + 35.0
    ));
    svg.push_str(&format!(
        "  <text x=\"15\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"12\" transform=\"rotate(-90 15 {:.2})\">Amplitude</text>\n",
        projection.top + projection.plot_height / 2.0,
        projection.top + projection.plot_height / 2.0
    ));

    svg.push_str("</svg>\n");
    svg
}
