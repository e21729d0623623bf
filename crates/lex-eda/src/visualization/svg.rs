//! Minimal SVG writer used by the plot renderers.

use crate::utils::escape_markup;

/// Blank space around the plotting area, in pixels.
#[derive(Debug, Clone, Copy)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 70.0,
            right: 20.0,
            top: 40.0,
            bottom: 50.0,
        }
    }
}

/// Maps a data interval onto a pixel interval.
#[derive(Debug, Clone, Copy)]
pub struct LinearScale {
    d0: f64,
    d1: f64,
    r0: f64,
    r1: f64,
}

impl LinearScale {
    /// A degenerate domain is widened by 0.5 on both sides.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        let (mut d0, mut d1) = domain;
        if d1 - d0 == 0.0 {
            d0 -= 0.5;
            d1 += 0.5;
        }
        Self {
            d0,
            d1,
            r0: range.0,
            r1: range.1,
        }
    }

    pub fn map(&self, value: f64) -> f64 {
        self.r0 + (value - self.d0) / (self.d1 - self.d0) * (self.r1 - self.r0)
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.d0, self.d1)
    }
}

/// Text alignment relative to the anchor point.
#[derive(Debug, Clone, Copy)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

/// An SVG document under construction.
pub struct SvgCanvas {
    width: u32,
    height: u32,
    body: String,
}

impl SvgCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        let mut canvas = Self {
            width,
            height,
            body: String::new(),
        };
        canvas.rect(0.0, 0.0, width as f64, height as f64, "#ffffff", None);
        canvas
    }

    pub fn width(&self) -> f64 {
        self.width as f64
    }

    pub fn height(&self) -> f64 {
        self.height as f64
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str, stroke: Option<&str>) {
        let stroke = stroke
            .map(|s| format!(" stroke=\"{}\" stroke-width=\"1\"", s))
            .unwrap_or_default();
        self.body.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"{}/>\n",
            x,
            y,
            w.max(0.0),
            h.max(0.0),
            fill,
            stroke
        ));
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str, width: f64) {
        self.body.push_str(&format!(
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{}\"/>\n",
            x1, y1, x2, y2, stroke, width
        ));
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, stroke: &str) {
        self.body.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{}\" fill=\"none\" stroke=\"{}\"/>\n",
            cx, cy, r, stroke
        ));
    }

    pub fn polyline(&mut self, points: &[(f64, f64)], stroke: &str, width: f64) {
        if points.is_empty() {
            return;
        }
        let coords: Vec<String> = points
            .iter()
            .map(|(x, y)| format!("{:.2},{:.2}", x, y))
            .collect();
        self.body.push_str(&format!(
            "<polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>\n",
            coords.join(" "),
            stroke,
            width
        ));
    }

    pub fn text(&mut self, x: f64, y: f64, text: &str, size: u32, anchor: Anchor) {
        self.body.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"{}\" text-anchor=\"{}\">{}</text>\n",
            x,
            y,
            size,
            anchor.as_str(),
            escape_markup(text)
        ));
    }

    /// Text rotated 90 degrees counter-clockwise around its anchor.
    pub fn vertical_text(&mut self, x: f64, y: f64, text: &str, size: u32) {
        self.body.push_str(&format!(
            "<text x=\"{x:.2}\" y=\"{y:.2}\" font-size=\"{}\" text-anchor=\"middle\" transform=\"rotate(-90 {x:.2} {y:.2})\">{}</text>\n",
            size,
            escape_markup(text),
        ));
    }

    /// Centered title along the top edge.
    pub fn title(&mut self, text: &str) {
        let x = self.width() / 2.0;
        self.text(x, 24.0, text, 16, Anchor::Middle);
    }

    /// Left and bottom axis lines around the plot area, with five labelled
    /// ticks on each scale that is given.
    pub fn axes(&mut self, margins: Margins, x: Option<&LinearScale>, y: Option<&LinearScale>) {
        let bottom = self.height() - margins.bottom;
        let right = self.width() - margins.right;
        self.line(margins.left, bottom, right, bottom, "#333333", 1.0);
        self.line(margins.left, margins.top, margins.left, bottom, "#333333", 1.0);

        if let Some(x) = x {
            let (d0, d1) = x.domain();
            for i in 0..5 {
                let value = d0 + (d1 - d0) * i as f64 / 4.0;
                let px = x.map(value);
                self.line(px, bottom, px, bottom + 4.0, "#333333", 1.0);
                self.text(px, bottom + 18.0, &tick_label(value), 11, Anchor::Middle);
            }
        }
        if let Some(y) = y {
            let (d0, d1) = y.domain();
            for i in 0..5 {
                let value = d0 + (d1 - d0) * i as f64 / 4.0;
                let py = y.map(value);
                self.line(margins.left - 4.0, py, margins.left, py, "#333333", 1.0);
                self.text(margins.left - 8.0, py + 4.0, &tick_label(value), 11, Anchor::End);
            }
        }
    }

    pub fn finish(self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"sans-serif\">\n{}</svg>\n",
            self.body,
            w = self.width,
            h = self.height,
        )
    }
}

/// Compact tick label: integers without decimals, small values in
/// scientific notation.
pub fn tick_label(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e9 {
        format!("{}", value as i64)
    } else if value.abs() >= 1e5 || value.abs() < 1e-2 {
        format!("{:.2e}", value)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_scale() {
        let scale = LinearScale::new((0.0, 10.0), (100.0, 200.0));
        assert_eq!(scale.map(0.0), 100.0);
        assert_eq!(scale.map(5.0), 150.0);

        // inverted pixel range, as used for y axes
        let y = LinearScale::new((0.0, 4.0), (300.0, 100.0));
        assert_eq!(y.map(4.0), 100.0);
    }

    #[test]
    fn test_degenerate_scale_is_widened() {
        let scale = LinearScale::new((3.0, 3.0), (0.0, 10.0));
        assert_eq!(scale.domain(), (2.5, 3.5));
        assert_eq!(scale.map(3.0), 5.0);
    }

    #[test]
    fn test_canvas_output() {
        let mut canvas = SvgCanvas::new(120, 80);
        canvas.title("a < b");
        canvas.line(0.0, 0.0, 10.0, 10.0, "#000000", 1.0);
        let svg = canvas.finish();

        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"120\" height=\"80\""));
        assert!(svg.contains("a &lt; b"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_tick_label() {
        assert_eq!(tick_label(3.0), "3");
        assert_eq!(tick_label(2.5), "2.50");
        assert_eq!(tick_label(0.001), "1.00e-3");
    }
}
