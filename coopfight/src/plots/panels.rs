use super::{
    draw_color_bar, finite_runs, game_title, round2, save_figure, value_range, viridis, DrawResult,
    Figure, PlotStyle,
};
use crate::config::{EventPanelSettings, GlobalPanelSettings};
use crate::error::{Error, Result};
use crate::events::{EventTable, FightColumns};
use crate::stats::{
    initial_fraction, payoff_per_capita, strategy_fractions, winner_density, DensityGrid,
    WinFractions,
};
use crate::table::{build_2d_array, Grid2d, ParameterTable};
use crate::{Strategy, TimeSeries};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Population fractions (left) and payoff per capita (right) over time
pub fn plot_panel_time_series(
    series: &TimeSeries,
    fragment: &str,
    style: &PlotStyle,
) -> Result<Vec<PathBuf>> {
    let title = time_panel_title(series, fragment)?;
    let figure = TimePanel {
        fractions: strategy_fractions(series),
        payoffs: payoff_per_capita(series),
        title,
    };
    save_figure(&figure, fragment, style)
}

fn time_panel_title(series: &TimeSeries, fragment: &str) -> Result<String> {
    let initial = |strategy| {
        initial_fraction(series, strategy)
            .map(|f| round2(f).to_string())
            .unwrap_or_else(|| "nan".to_string())
    };
    Ok(format!(
        "f_C(0)={}, f_D(0)={}, {}",
        initial(Strategy::Cooperator),
        initial(Strategy::Defector),
        game_title(fragment)?
    ))
}

struct TimePanel {
    fractions: BTreeMap<Strategy, Vec<f64>>,
    payoffs: BTreeMap<Strategy, Vec<f64>>,
    title: String,
}

impl TimePanel {
    fn draw_lines<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        lines: &BTreeMap<Strategy, Vec<f64>>,
        y_range: (f64, f64),
        y_desc: &str,
        style: &PlotStyle,
    ) -> DrawResult
    where
        DB::ErrorType: 'static,
    {
        let steps = lines.values().map(Vec::len).max().unwrap_or(0);
        let x_max = steps.saturating_sub(1).max(1) as f64;

        let mut chart = ChartBuilder::on(area)
            .margin(20)
            .x_label_area_size(70)
            .y_label_area_size(90)
            .build_cartesian_2d(0.0..x_max, y_range.0..y_range.1)?;

        chart
            .configure_mesh()
            .x_desc("t")
            .y_desc(y_desc)
            .axis_desc_style(style.title_font())
            .label_style(style.tick_font())
            .draw()?;

        for (&strategy, values) in lines {
            let color = style.colors.color(strategy);
            let width = style.line_width;
            let runs = finite_runs(values.iter().enumerate().map(|(t, &v)| (t as f64, v)));
            chart
                .draw_series(
                    runs.into_iter()
                        .map(|run| PathElement::new(run, color.stroke_width(width))),
                )?
                .label(strategy.short())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 30, y)], color.stroke_width(width))
                });
        }

        chart
            .configure_series_labels()
            .label_font(style.font(15.0))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        Ok(())
    }
}

impl Figure for TimePanel {
    fn header(&self) -> &'static str {
        "coopfight_time_panel"
    }

    fn size(&self) -> (u32, u32) {
        (2000, 1200)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, style: &PlotStyle) -> DrawResult
    where
        DB::ErrorType: 'static,
    {
        let body = root.titled(&self.title, style.title_font())?;
        let panels = body.split_evenly((1, 2));

        self.draw_lines(&panels[0], &self.fractions, (-0.05, 1.05), "f_X", style)?;
        let payoff_range = value_range(self.payoffs.values().flatten().copied());
        self.draw_lines(&panels[1], &self.payoffs, payoff_range, "Π_X", style)?;
        Ok(())
    }
}

/// One density panel per winning strategy over the two investments
pub fn plot_panel_fighting_events_density(
    table: &EventTable,
    fragment: &str,
    settings: &EventPanelSettings,
    style: &PlotStyle,
) -> Result<Vec<PathBuf>> {
    let figure = DensityPanel {
        title: game_title(fragment)?,
        grids: Strategy::ALL
            .iter()
            .map(|&s| {
                (
                    s,
                    winner_density(
                        table,
                        s,
                        settings.xlim_max,
                        settings.ylim_max,
                        settings.gridsize,
                    ),
                )
            })
            .collect(),
    };
    save_figure(&figure, fragment, style)
}

struct DensityPanel {
    title: String,
    grids: Vec<(Strategy, DensityGrid)>,
}

impl Figure for DensityPanel {
    fn header(&self) -> &'static str {
        "coopfight_event_panel"
    }

    fn size(&self) -> (u32, u32) {
        (2400, 800)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, style: &PlotStyle) -> DrawResult
    where
        DB::ErrorType: 'static,
    {
        let body = root.titled(&self.title, style.title_font())?;
        let panels = body.split_evenly((1, self.grids.len().max(1)));

        for ((strategy, grid), panel) in self.grids.iter().zip(panels.iter()) {
            let width = panel.dim_in_pixel().0;
            let (plot_area, bar_area) = panel.split_horizontally(width.saturating_sub(130));

            let caption_style = style
                .label_font()
                .color(&style.colors.color(*strategy));
            let mut chart = ChartBuilder::on(&plot_area)
                .caption(format!("Winner: {}", strategy), caption_style)
                .margin(10)
                .x_label_area_size(50)
                .y_label_area_size(70)
                .build_cartesian_2d(0.0..grid.xlim, 0.0..grid.ylim)?;

            chart
                .configure_mesh()
                .disable_mesh()
                .x_desc("Investment Focal")
                .y_desc("Investment Enemy")
                .axis_desc_style(style.font(15.0))
                .label_style(style.font(15.0))
                .draw()?;

            chart.draw_series(std::iter::once(Rectangle::new(
                [(0.0, 0.0), (grid.xlim, grid.ylim)],
                viridis(0.0).filled(),
            )))?;

            let max = grid.max_count();
            if max == 0 {
                continue;
            }
            chart.draw_series(grid.counts.iter().enumerate().flat_map(|(ix, column)| {
                column
                    .iter()
                    .enumerate()
                    .filter(|&(_, &count)| count > 0)
                    .map(move |(iy, &count)| {
                        let (lower, upper) = grid.bin_bounds(ix, iy);
                        let t = count as f64 / max as f64;
                        Rectangle::new([lower, upper], viridis(t).filled())
                    })
            }))?;

            draw_color_bar(&bar_area, 0.0, max as f64, "events", style)?;
        }
        Ok(())
    }
}

/// Every retained event at (investment focal, investment enemy), colored
/// by the strategy that won it
pub fn plot_panel_fighting_events_scatter(
    columns: &FightColumns,
    fragment: &str,
    style: &PlotStyle,
) -> Result<Vec<PathBuf>> {
    columns.validate()?;
    let figure = ScatterPanel {
        title: game_title(fragment)?,
        columns,
    };
    save_figure(&figure, fragment, style)
}

struct ScatterPanel<'a> {
    title: String,
    columns: &'a FightColumns,
}

impl Figure for ScatterPanel<'_> {
    fn header(&self) -> &'static str {
        "coopfight_event_scatter"
    }

    fn size(&self) -> (u32, u32) {
        (2000, 1200)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, style: &PlotStyle) -> DrawResult
    where
        DB::ErrorType: 'static,
    {
        let columns = self.columns;
        let body = root.titled(&self.title, style.title_font())?;
        let x_range = value_range(columns.investment_focal.iter().copied().chain([0.0]));
        let y_range = value_range(columns.investment_enemy.iter().copied().chain([0.0]));

        let mut chart = ChartBuilder::on(&body)
            .margin(20)
            .x_label_area_size(70)
            .y_label_area_size(90)
            .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)?;

        chart
            .configure_mesh()
            .x_desc("Investment Focal")
            .y_desc("Investment Enemy")
            .axis_desc_style(style.label_font())
            .label_style(style.tick_font())
            .draw()?;

        let points = columns
            .investment_focal
            .iter()
            .zip(&columns.investment_enemy)
            .enumerate()
            .filter_map(|(i, (&x, &y))| Some((x, y, columns.winner_strategy(i)?)));
        chart.draw_series(points.map(|(x, y, winner)| {
            Circle::new((x, y), style.point_size, style.colors.color(winner).filled())
        }))?;
        Ok(())
    }
}

/// Fraction of events won by each strategy over time
pub fn plot_panel_fighting_events_time_series(
    fractions: &WinFractions,
    fragment: &str,
    style: &PlotStyle,
) -> Result<Vec<PathBuf>> {
    save_figure(&WinsPanel { fractions }, fragment, style)
}

struct WinsPanel<'a> {
    fractions: &'a WinFractions,
}

impl Figure for WinsPanel<'_> {
    fn header(&self) -> &'static str {
        "coopfight_event_wins"
    }

    fn size(&self) -> (u32, u32) {
        (1400, 800)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, style: &PlotStyle) -> DrawResult
    where
        DB::ErrorType: 'static,
    {
        let time = &self.fractions.time;
        let t_min = time.first().copied().unwrap_or(0) as f64;
        let t_max = time.last().copied().unwrap_or(0) as f64;
        let t_max = if t_max > t_min { t_max } else { t_min + 1.0 };

        let mut chart = ChartBuilder::on(root)
            .caption(
                "Time Evolution of Fraction of Events Won by Strategy",
                style.label_font(),
            )
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(80)
            .build_cartesian_2d(t_min..t_max, -0.05..1.05)?;

        chart
            .configure_mesh()
            .x_desc("Time")
            .y_desc("Fraction of Events Won")
            .axis_desc_style(style.label_font())
            .label_style(style.font(15.0))
            .draw()?;

        for strategy in self.fractions.strategies() {
            let Some(values) = self.fractions.series(strategy) else {
                continue;
            };
            let color = style.colors.color(strategy);
            let points = time.iter().zip(values).map(|(&t, &v)| (t as f64, v));
            chart
                .draw_series(LineSeries::new(points, color.stroke_width(2)))?
                .label(format!("{} Wins", strategy))
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 30, y)], color.stroke_width(2))
                });
        }

        chart
            .configure_series_labels()
            .label_font(style.font(15.0))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        Ok(())
    }
}

/// Heatmaps of the observables over the two control parameters, sharing
/// one color scale
pub fn plot_panel_global_fractions(
    table: &ParameterTable,
    fragment: &str,
    settings: &GlobalPanelSettings,
    style: &PlotStyle,
) -> Result<Vec<PathBuf>> {
    let grids = settings
        .observables
        .iter()
        .map(|observable| {
            build_2d_array(
                table,
                observable,
                &settings.id_control_1,
                &settings.id_control_2,
                &settings.filter_params,
            )
            .map(|grid| (observable.clone(), grid))
        })
        .collect::<Result<Vec<_>>>()?;

    if grids.is_empty() {
        return Err(Error::MissingColumn("observables".to_string()));
    }

    let figure = GlobalPanel {
        grids,
        id_control_1: &settings.id_control_1,
        id_control_2: &settings.id_control_2,
    };
    save_figure(&figure, fragment, style)
}

struct GlobalPanel<'a> {
    grids: Vec<(String, Grid2d)>,
    id_control_1: &'a str,
    id_control_2: &'a str,
}

impl GlobalPanel<'_> {
    fn color_range(&self) -> (f64, f64) {
        self.grids
            .iter()
            .filter_map(|(_, grid)| grid.finite_range())
            .reduce(|(lo_a, hi_a), (lo_b, hi_b)| (lo_a.min(lo_b), hi_a.max(hi_b)))
            .unwrap_or((0.0, 1.0))
    }
}

/// Label for a tick at cell index `position`, empty between cells
fn axis_label(values: &[f64], position: f64) -> String {
    let idx = position.round();
    if (position - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    values
        .get(idx as usize)
        .map(|v| v.to_string())
        .unwrap_or_default()
}

impl Figure for GlobalPanel<'_> {
    fn header(&self) -> &'static str {
        "coopfight_global"
    }

    fn size(&self) -> (u32, u32) {
        (600 * self.grids.len() as u32 + 150, 600)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, style: &PlotStyle) -> DrawResult
    where
        DB::ErrorType: 'static,
    {
        let (lo, hi) = self.color_range();
        let span = if hi > lo { hi - lo } else { 1.0 };
        let (heat_area, bar_area) = root.split_horizontally(600 * self.grids.len() as u32);
        let panels = heat_area.split_evenly((1, self.grids.len()));

        for ((observable, grid), panel) in self.grids.iter().zip(panels.iter()) {
            let (n1, n2) = grid.shape();
            let x_max = n2.max(1) as f64 - 0.5;
            let y_max = n1.max(1) as f64 - 0.5;

            let mut chart = ChartBuilder::on(panel)
                .caption(observable, style.font(18.0))
                .margin(10)
                .x_label_area_size(60)
                .y_label_area_size(70)
                .build_cartesian_2d(-0.5..x_max, -0.5..y_max)?;

            chart
                .configure_mesh()
                .disable_mesh()
                .x_labels(n2.max(1))
                .y_labels(n1.max(1))
                .x_label_formatter(&|x| axis_label(&grid.control_2_values, *x))
                .y_label_formatter(&|y| axis_label(&grid.control_1_values, *y))
                .x_desc(self.id_control_2)
                .y_desc(self.id_control_1)
                .axis_desc_style(style.font(15.0))
                .label_style(style.font(13.0))
                .draw()?;

            chart.draw_series(grid.values.iter().enumerate().flat_map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(_, v)| v.is_finite())
                    .map(move |(j, &v)| {
                        let (x, y) = (j as f64, i as f64);
                        Rectangle::new(
                            [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                            viridis((v - lo) / span).filled(),
                        )
                    })
            }))?;
        }

        draw_color_bar(&bar_area, lo, hi, "Value", style)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use naming::GameConfig;

    #[test]
    fn time_title_reports_both_initial_fractions() {
        let series = TimeSeries {
            number_cooperators: vec![1, 1],
            number_defectors: vec![2, 1],
            number_fighters: vec![0, 1],
            payoff_cooperators: vec![0.0, 0.0],
            payoff_defectors: vec![0.0, 0.0],
            payoff_fighters: vec![0.0, 0.0],
        };
        let title = time_panel_title(&series, &GameConfig::default().fragment()).unwrap();
        assert_eq!(
            title,
            "f_C(0)=0.33, f_D(0)=0.67, b=1.2, ρ=0.1, γ=0.5, α=0.1, Z=0.2"
        );
    }

    #[test]
    fn time_title_on_empty_population() {
        let title = time_panel_title(&TimeSeries::default(), &GameConfig::default().fragment())
            .unwrap();
        assert!(title.starts_with("f_C(0)=nan, f_D(0)=nan"));
    }

    #[test]
    fn tick_labels_only_on_cells() {
        let values = [0.1, 0.2, 0.5];
        assert_eq!(axis_label(&values, 0.0), "0.1");
        assert_eq!(axis_label(&values, 2.0), "0.5");
        assert_eq!(axis_label(&values, 0.5), "");
        assert_eq!(axis_label(&values, 3.0), "");
        assert_eq!(axis_label(&values, -1.0), "");
    }

    #[test]
    fn global_color_range_spans_all_grids() {
        let grid = |v: f64| Grid2d {
            values: vec![vec![v, f64::NAN]],
            control_1_values: vec![1.0],
            control_2_values: vec![0.1, 0.2],
        };
        let panel = GlobalPanel {
            grids: vec![("a".to_string(), grid(0.2)), ("b".to_string(), grid(0.7))],
            id_control_1: "payoff_defection",
            id_control_2: "fraction_investment",
        };
        assert_eq!(panel.color_range(), (0.2, 0.7));
    }

    #[test]
    fn global_panel_rejects_missing_columns_before_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let style = PlotStyle {
            output_dir: dir.path().join("figures"),
            ..PlotStyle::default()
        };
        let table = ParameterTable::from_columns([
            ("payoff_defection", vec![1.0]),
            ("fraction_investment", vec![0.1]),
        ])
        .unwrap();

        let err = plot_panel_global_fractions(
            &table,
            "fc0.3",
            &GlobalPanelSettings::default(),
            &style,
        )
        .unwrap_err();
        assert!(matches!(err, Error::MissingColumn(_)));
        assert!(!style.output_dir.exists());
    }

    #[test]
    fn time_panel_needs_decodable_fragment() {
        let dir = tempfile::tempdir().unwrap();
        let style = PlotStyle {
            output_dir: dir.path().join("figures"),
            ..PlotStyle::default()
        };
        let err = plot_panel_time_series(&TimeSeries::default(), "net_adl_lpb_nx10_ny10", &style)
            .unwrap_err();
        assert!(matches!(err, Error::MissingFragmentParameter { .. }));
        assert!(!style.output_dir.exists());
    }
}
