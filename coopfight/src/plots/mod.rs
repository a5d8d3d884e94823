//! Figure rendering
//!
//! Every figure is drawn once per configured [`FigureFormat`] into
//! `{output_dir}/{header}_{fragment}.{ext}`. Styling is passed around as an
//! explicit [`PlotStyle`] value.

mod panels;

pub use panels::{
    plot_panel_fighting_events_density, plot_panel_fighting_events_scatter,
    plot_panel_fighting_events_time_series, plot_panel_global_fractions, plot_panel_time_series,
};

use crate::error::{Error, Result};
use crate::Strategy;
use naming::decode_game;
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FigureFormat {
    Pdf,
    Png,
    Svg,
}

impl FigureFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            FigureFormat::Pdf => "pdf",
            FigureFormat::Png => "png",
            FigureFormat::Svg => "svg",
        }
    }
}

/// RGB triplets for the three strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyColors {
    pub cooperator: [u8; 3],
    pub defector: [u8; 3],
    pub fighter: [u8; 3],
}

impl Default for StrategyColors {
    fn default() -> Self {
        StrategyColors {
            // firebrick
            cooperator: [178, 34, 34],
            // royalblue
            defector: [65, 105, 225],
            // darkgoldenrod
            fighter: [184, 134, 11],
        }
    }
}

impl StrategyColors {
    pub fn color(&self, strategy: Strategy) -> RGBColor {
        let [r, g, b] = match strategy {
            Strategy::Cooperator => self.cooperator,
            Strategy::Defector => self.defector,
            Strategy::Fighter => self.fighter,
        };
        RGBColor(r, g, b)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotStyle {
    pub output_dir: PathBuf,
    pub formats: Vec<FigureFormat>,
    pub font_family: String,
    pub title_font_size: f64,
    pub label_font_size: f64,
    pub tick_font_size: f64,
    pub line_width: u32,
    pub point_size: u32,
    pub colors: StrategyColors,
}

impl Default for PlotStyle {
    fn default() -> Self {
        PlotStyle {
            output_dir: PathBuf::from("figures").join("temp"),
            formats: vec![FigureFormat::Pdf, FigureFormat::Png],
            font_family: "sans-serif".to_string(),
            title_font_size: 30.0,
            label_font_size: 20.0,
            tick_font_size: 20.0,
            line_width: 4,
            point_size: 3,
            colors: StrategyColors::default(),
        }
    }
}

impl PlotStyle {
    pub fn font(&self, size: f64) -> FontDesc<'_> {
        (self.font_family.as_str(), size).into_font()
    }

    pub fn title_font(&self) -> FontDesc<'_> {
        self.font(self.title_font_size)
    }

    pub fn label_font(&self) -> FontDesc<'_> {
        self.font(self.label_font_size)
    }

    pub fn tick_font(&self) -> FontDesc<'_> {
        self.font(self.tick_font_size)
    }

    pub fn file_path(&self, header: &str, fragment: &str, format: FigureFormat) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}.{}", header, fragment, format.extension()))
    }
}

/// Something that can be drawn onto any plotters backend
pub trait Figure {
    /// File name prefix
    fn header(&self) -> &'static str;

    /// Canvas size in pixels
    fn size(&self) -> (u32, u32);

    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        style: &PlotStyle,
    ) -> DrawResult
    where
        DB::ErrorType: 'static;
}

/// Render `figure` once per configured format and return the written paths
pub fn save_figure<F: Figure>(
    figure: &F,
    fragment: &str,
    style: &PlotStyle,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(&style.output_dir).map_err(|e| Error::io(&style.output_dir, e))?;

    let mut written = Vec::with_capacity(style.formats.len());
    for &format in &style.formats {
        let path = style.file_path(figure.header(), fragment, format);
        let drawn = match format {
            FigureFormat::Pdf => render_pdf(figure, &path, style),
            FigureFormat::Png => {
                let root = BitMapBackend::new(&path, figure.size()).into_drawing_area();
                render(figure, &root, style)
            }
            FigureFormat::Svg => {
                let root = SVGBackend::new(&path, figure.size()).into_drawing_area();
                render(figure, &root, style)
            }
        };
        drawn.map_err(|e| Error::Render(format!("{}: {}", path.display(), e)))?;
        log::info!("saved {}", path.display());
        written.push(path);
    }
    Ok(written)
}

fn render<F: Figure, DB: DrawingBackend>(
    figure: &F,
    root: &DrawingArea<DB, Shift>,
    style: &PlotStyle,
) -> DrawResult
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    figure.draw(root, style)?;
    root.present()?;
    Ok(())
}

/// Draw through the SVG backend into memory, then convert to PDF
fn render_pdf<F: Figure>(figure: &F, path: &Path, style: &PlotStyle) -> DrawResult {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, figure.size()).into_drawing_area();
        render(figure, &root, style)?;
    }

    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_data(svg.as_bytes(), &options)?;
    let pdf = svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|e| format!("pdf conversion failed: {:?}", e))?;

    fs::write(path, pdf)?;
    Ok(())
}

/// `b=…, ρ=…, γ=…, α=…, Z=…` from the parameters encoded in `fragment`
pub fn game_title(fragment: &str) -> Result<String> {
    let params = decode_game(fragment);
    let lookup = |key: &str| {
        params
            .get(key)
            .map(|v| v.to_string())
            .ok_or_else(|| Error::MissingFragmentParameter {
                key: key.to_string(),
                fragment: fragment.to_string(),
            })
    };
    Ok(format!(
        "b={}, ρ={}, γ={}, α={}, Z={}",
        lookup("payoff_defection")?,
        lookup("fraction_investment")?,
        lookup("parameter_technology")?,
        lookup("rate_consumption")?,
        lookup("parameter_noise")?,
    ))
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

const VIRIDIS: [(u8, u8, u8); 9] = [
    (68, 1, 84),
    (71, 44, 122),
    (59, 81, 139),
    (44, 113, 142),
    (33, 144, 141),
    (39, 173, 129),
    (92, 200, 99),
    (170, 220, 50),
    (253, 231, 37),
];

/// Viridis color at `t` in `[0, 1]`, linear between anchors
pub fn viridis(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let lo = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = scaled - lo as f64;
    let (r0, g0, b0) = VIRIDIS[lo];
    let (r1, g1, b1) = VIRIDIS[lo + 1];
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    RGBColor(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}

/// Split a polyline at points with a non-finite coordinate
pub(crate) fn finite_runs(points: impl IntoIterator<Item = (f64, f64)>) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (x, y) in points {
        if x.is_finite() && y.is_finite() {
            current.push((x, y));
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Axis range covering the finite values with 5% padding
pub(crate) fn value_range(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return (0.0, 1.0);
    }
    if lo == hi {
        return (lo - 0.5, hi + 0.5);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

/// Vertical viridis gradient between `lo` and `hi`
pub(crate) fn draw_color_bar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    lo: f64,
    hi: f64,
    label: &str,
    style: &PlotStyle,
) -> DrawResult
where
    DB::ErrorType: 'static,
{
    let hi = if hi > lo { hi } else { lo + 1.0 };
    let mut bar = ChartBuilder::on(area)
        .margin_top(60)
        .margin_bottom(60)
        .margin_right(10)
        .x_label_area_size(0)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..1.0, lo..hi)?;

    bar.configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(0)
        .y_desc(label)
        .axis_desc_style(style.label_font())
        .label_style(style.tick_font())
        .draw()?;

    let steps = 128;
    bar.draw_series((0..steps).map(|i| {
        let y0 = lo + (hi - lo) * i as f64 / steps as f64;
        let y1 = lo + (hi - lo) * (i + 1) as f64 / steps as f64;
        let t = (i as f64 + 0.5) / steps as f64;
        Rectangle::new([(0.0, y0), (1.0, y1)], viridis(t).filled())
    }))?;
    Ok(())
}
