//! Visualization utilities for vehicle_sim
//!
//! Provides a unified interface for plotting simulation results using gnuplot.
//! This is the display collaborator of the core: it only consumes copies of
//! poses, trajectories and ellipse geometry.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::common::Vector2D;
use crate::localization::ConfidenceEllipse;

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const GREEN: &str = "#00FF00";
    pub const BLUE: &str = "#0000FF";
    pub const YELLOW: &str = "#FFFF00";
    pub const GRAY: &str = "#808080";

    // Semantic colors
    pub const GROUND_TRUTH: &str = BLUE;
    pub const DEAD_RECKONING: &str = YELLOW;
    pub const ESTIMATED: &str = "#35C788";
    pub const MEASUREMENT: &str = "#DD3355";
    pub const UNCERTAINTY: &str = "#800080";
    pub const VEHICLE: &str = "#00FFFF";
}

/// Style for trajectory rendering
#[derive(Debug, Clone)]
pub struct PathStyle {
    pub color: String,
    pub line_width: f64,
    pub caption: String,
}

impl PathStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 2.0,
            caption: caption.to_string(),
        }
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }
}

/// Style for point rendering
#[derive(Debug, Clone)]
pub struct PointStyle {
    pub color: String,
    pub size: f64,
    pub symbol: char,
    pub caption: String,
}

impl PointStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            size: 1.0,
            symbol: 'O',
            caption: caption.to_string(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_symbol(mut self, symbol: char) -> Self {
        self.symbol = symbol;
        self
    }
}

enum Series {
    Lines(Vec<f64>, Vec<f64>, PathStyle),
    Points(Vec<f64>, Vec<f64>, PointStyle),
}

/// Main visualizer struct.
///
/// Series are collected first and emitted onto a single pair of axes when the
/// figure is shown or saved.
pub struct Visualizer {
    title: String,
    x_label: String,
    y_label: String,
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
    aspect_ratio: Option<f64>,
    series: Vec<Series>,
}

impl Visualizer {
    pub fn new() -> Self {
        Self {
            title: String::new(),
            x_label: "X [m]".to_string(),
            y_label: "Y [m]".to_string(),
            x_range: None,
            y_range: None,
            aspect_ratio: Some(1.0),
            series: Vec::new(),
        }
    }

    /// Set the plot title
    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    /// Set X axis range
    pub fn set_x_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.x_range = Some((min, max));
        self
    }

    /// Set Y axis range
    pub fn set_y_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.y_range = Some((min, max));
        self
    }

    /// Set aspect ratio (None for auto)
    pub fn set_aspect_ratio(&mut self, ratio: Option<f64>) -> &mut Self {
        self.aspect_ratio = ratio;
        self
    }

    /// Plot a trajectory from x,y vectors
    pub fn plot_path_xy(&mut self, x: &[f64], y: &[f64], style: &PathStyle) -> &mut Self {
        self.series
            .push(Series::Lines(x.to_vec(), y.to_vec(), style.clone()));
        self
    }

    /// Plot scattered points from x,y vectors
    pub fn plot_points_xy(&mut self, x: &[f64], y: &[f64], style: &PointStyle) -> &mut Self {
        self.series
            .push(Series::Points(x.to_vec(), y.to_vec(), style.clone()));
        self
    }

    /// Plot a single point (start, goal, etc.)
    pub fn plot_point(&mut self, point: Vector2D, style: &PointStyle) -> &mut Self {
        self.plot_points_xy(&[point.x], &[point.y], style)
    }

    /// Plot a confidence ellipse centered on `center` as a closed polyline
    pub fn plot_ellipse(
        &mut self,
        center: Vector2D,
        ellipse: &ConfidenceEllipse,
        style: &PathStyle,
    ) -> &mut Self {
        const SEGMENTS: usize = 72;
        let semi_major = ellipse.major_axis / 2.0;
        let semi_minor = ellipse.minor_axis / 2.0;

        let mut x = Vec::with_capacity(SEGMENTS + 1);
        let mut y = Vec::with_capacity(SEGMENTS + 1);
        for k in 0..=SEGMENTS {
            let t = 2.0 * std::f64::consts::PI * k as f64 / SEGMENTS as f64;
            let local = Vector2D::new(semi_major * t.cos(), semi_minor * t.sin());
            let point = center + local.rotate(ellipse.angle);
            x.push(point.x);
            y.push(point.y);
        }
        self.series.push(Series::Lines(x, y, style.clone()));
        self
    }

    /// Finalize and show the plot
    pub fn show(&mut self) -> Result<(), String> {
        let mut figure = self.build_figure();
        figure.show().map(|_| ()).map_err(|e| e.to_string())
    }

    /// Save plot to PNG file
    pub fn save_png(&mut self, path: &str, width: u32, height: u32) -> Result<(), String> {
        self.build_figure()
            .save_to_png(path, width, height)
            .map_err(|e| e.to_string())
    }

    /// Save plot to SVG file
    pub fn save_svg(&mut self, path: &str) -> Result<(), String> {
        self.build_figure()
            .save_to_svg(path, 800, 600)
            .map_err(|e| e.to_string())
    }

    fn build_figure(&self) -> Figure {
        let mut figure = Figure::new();
        {
            let axes = figure.axes2d();

            if !self.title.is_empty() {
                axes.set_title(&self.title, &[]);
            }
            axes.set_x_label(&self.x_label, &[]);
            axes.set_y_label(&self.y_label, &[]);

            if let Some((min, max)) = self.x_range {
                axes.set_x_range(AutoOption::Fix(min), AutoOption::Fix(max));
            }
            if let Some((min, max)) = self.y_range {
                axes.set_y_range(AutoOption::Fix(min), AutoOption::Fix(max));
            }
            if let Some(ratio) = self.aspect_ratio {
                axes.set_aspect_ratio(AutoOption::Fix(ratio));
            }

            for series in &self.series {
                match series {
                    Series::Lines(x, y, style) => {
                        axes.lines(
                            x,
                            y,
                            &[
                                Caption(&style.caption),
                                Color(&style.color),
                                LineWidth(style.line_width),
                            ],
                        );
                    }
                    Series::Points(x, y, style) => {
                        axes.points(
                            x,
                            y,
                            &[
                                Caption(&style.caption),
                                Color(&style.color),
                                PointSymbol(style.symbol),
                                PointSize(style.size),
                            ],
                        );
                    }
                }
            }
        }
        figure
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_style() {
        let style = PathStyle::new(colors::RED, "Test Path").with_line_width(3.0);
        assert_eq!(style.line_width, 3.0);
        assert_eq!(style.color, colors::RED);
    }

    #[test]
    fn test_ellipse_polyline_is_closed() {
        let mut vis = Visualizer::new();
        let ellipse = ConfidenceEllipse {
            minor_axis: 1.0,
            major_axis: 2.0,
            angle: 0.3,
        };
        vis.plot_ellipse(
            Vector2D::new(1.0, 2.0),
            &ellipse,
            &PathStyle::new(colors::UNCERTAINTY, "Uncertainty"),
        );

        match &vis.series[0] {
            Series::Lines(x, y, _) => {
                assert!((x[0] - x[x.len() - 1]).abs() < 1e-12);
                assert!((y[0] - y[y.len() - 1]).abs() < 1e-12);
            }
            _ => panic!("expected a line series"),
        }
    }
}
