//! Chart rendering for report views.
//!
//! Output is a horizontal bar chart written as standalone SVG, one bar per
//! entry in the order given by the report builder.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::report::ReportEntry;

/// Renders an ordered sequence of report entries to an image file.
pub trait ChartRenderer {
    fn render(&self, entries: &[ReportEntry], path: &Path) -> Result<()>;
}

/// Horizontal bar chart emitted as SVG.
pub struct SvgChart {
    pub width: u32,
    pub row_height: u32,
    pub label_width: u32,
}

impl Default for SvgChart {
    fn default() -> Self {
        Self {
            width: 1000,
            row_height: 24,
            label_width: 360,
        }
    }
}

impl ChartRenderer for SvgChart {
    fn render(&self, entries: &[ReportEntry], path: &Path) -> Result<()> {
        fs::write(path, self.draw(entries))
            .with_context(|| format!("writing chart {}", path.display()))?;

        info!(path = %path.display(), bars = entries.len(), "Chart written");
        Ok(())
    }
}

impl SvgChart {
    fn draw(&self, entries: &[ReportEntry]) -> String {
        let height = self.row_height * entries.len().max(1) as u32;
        let max = entries
            .iter()
            .map(|e| e.miles_per_citation)
            .fold(0.0_f64, f64::max);
        let bar_area = f64::from(self.width - self.label_width);

        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\">\n",
            self.width, height
        );

        for (i, entry) in entries.iter().enumerate() {
            let y = i as u32 * self.row_height;
            let bar_width = if max > 0.0 {
                entry.miles_per_citation / max * bar_area
            } else {
                0.0
            };

            svg.push_str(&format!(
                "<text x=\"{}\" y=\"{}\" text-anchor=\"end\" font-size=\"12\" \
                 font-family=\"sans-serif\">{}</text>\n",
                self.label_width - 8,
                y + self.row_height * 2 / 3,
                escape_text(&entry.label)
            ));
            svg.push_str(&format!(
                "<rect x=\"{}\" y=\"{}\" width=\"{:.1}\" height=\"{}\" fill=\"steelblue\"/>\n",
                self.label_width,
                y + 2,
                bar_width,
                self.row_height - 4
            ));
        }

        svg.push_str("</svg>\n");
        svg
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
