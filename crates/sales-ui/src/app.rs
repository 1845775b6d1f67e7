//! Dashboard application state and TUI event loop.
//!
//! [`App`] owns the theme, the cutoff date, the selected region, and the
//! loaded dataset. Every region change re-runs the trend query against the
//! in-memory dataset; nothing is read from disk after startup.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::{
    cursor::Show,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use tracing::{debug, info};

use sales_core::error::LoadError;
use sales_core::models::{CanonicalDataset, ChartSeries, DerivedMetrics, Region, RegionFilter};
use sales_data::metrics::compute_summary;
use sales_data::query::query_trend;

use crate::dashboard_view::{self, DashboardViewData};
use crate::themes::Theme;

// ── DashboardState ────────────────────────────────────────────────────────────

/// What the dashboard is able to show.
#[derive(Debug, Clone)]
pub enum DashboardState {
    /// The dataset loaded; metrics are fixed, the series follows the region.
    Ready {
        dataset: CanonicalDataset,
        metrics: DerivedMetrics,
        series: ChartSeries,
    },
    /// The canonical dataset has not been produced yet.
    NoData { path: PathBuf },
    /// The dataset exists but could not be loaded.
    Failed { message: String },
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    pub theme: Theme,
    pub cutoff: NaiveDate,
    pub region: RegionFilter,
    pub state: DashboardState,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
}

impl App {
    /// Build the app from the outcome of loading the dataset at `path`.
    ///
    /// A missing file becomes [`DashboardState::NoData`], any other load
    /// error [`DashboardState::Failed`]; neither is fatal.
    pub fn from_load_result(
        theme_name: &str,
        cutoff: NaiveDate,
        region: RegionFilter,
        path: &Path,
        loaded: Result<CanonicalDataset, LoadError>,
    ) -> Self {
        let state = match loaded {
            Ok(dataset) => {
                let metrics = compute_summary(&dataset, cutoff);
                let series = query_trend(&dataset, region, cutoff);
                info!(
                    "Dashboard ready: {} record(s), {} point(s) for region={}",
                    dataset.len(),
                    series.points.len(),
                    region
                );
                DashboardState::Ready {
                    dataset,
                    metrics,
                    series,
                }
            }
            Err(e) if e.is_not_found() => DashboardState::NoData {
                path: path.to_path_buf(),
            },
            Err(e) => DashboardState::Failed {
                message: e.to_string(),
            },
        };

        Self {
            theme: Theme::from_name(theme_name),
            cutoff,
            region,
            state,
            should_quit: false,
        }
    }

    /// The series currently on screen, if the dataset is loaded.
    pub fn series(&self) -> Option<&ChartSeries> {
        match &self.state {
            DashboardState::Ready { series, .. } => Some(series),
            _ => None,
        }
    }

    /// Switch the region filter and recompute the chart series.
    pub fn set_region(&mut self, region: RegionFilter) {
        if region == self.region {
            return;
        }
        self.region = region;
        if let DashboardState::Ready {
            dataset, series, ..
        } = &mut self.state
        {
            *series = query_trend(dataset, region, self.cutoff);
            debug!("Region changed to {region}: {} point(s)", series.points.len());
        }
    }

    /// Apply one key press. Releases and repeats are ignored.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Right | KeyCode::Tab => self.set_region(self.region.next()),
            KeyCode::Left | KeyCode::BackTab => self.set_region(self.region.previous()),
            KeyCode::Char(c @ '1'..='5') => {
                let index = c as usize - '1' as usize;
                self.set_region(RegionFilter::CHOICES[index]);
            }
            KeyCode::Char(c) => {
                if let Some(region) = shortcut_region(c) {
                    self.set_region(region);
                }
            }
            _ => {}
        }
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the dashboard until the user quits.
    ///
    /// Pending key events are drained without blocking, then the loop sleeps
    /// for one tick so the runtime can service other futures (the OS Ctrl+C
    /// handler in particular). Exits on `q`, `Esc`, or `Ctrl+C`.
    pub async fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal).await;

        restore_terminal()?;
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        let tick_rate = Duration::from_millis(50);

        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;

            while !self.should_quit && event::poll(Duration::ZERO)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }

            tokio::time::sleep(tick_rate).await;
        }
        Ok(())
    }

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        match &self.state {
            DashboardState::Ready {
                metrics, series, ..
            } => dashboard_view::render_dashboard(
                frame,
                area,
                DashboardViewData { metrics, series },
                &self.theme,
            ),
            DashboardState::NoData { path } => {
                dashboard_view::render_no_data(frame, area, path, &self.theme)
            }
            DashboardState::Failed { message } => {
                dashboard_view::render_load_error(frame, area, message, &self.theme)
            }
        }
    }
}

/// Leave raw mode and the alternate screen and show the cursor again.
///
/// Safe to call when the terminal was never switched, so the binary can use
/// it after dropping a [`App::run`] future early.
pub fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, Show)?;
    Ok(())
}

/// Letter shortcuts: `a`ll, `n`orth, `s`outh, `e`ast, `w`est.
fn shortcut_region(c: char) -> Option<RegionFilter> {
    match c.to_ascii_lowercase() {
        'a' => Some(RegionFilter::All),
        'n' => Some(RegionFilter::Only(Region::North)),
        's' => Some(RegionFilter::Only(Region::South)),
        'e' => Some(RegionFilter::Only(Region::East)),
        'w' => Some(RegionFilter::Only(Region::West)),
        _ => None,
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use ratatui::backend::TestBackend;
    use rust_decimal::Decimal;
    use sales_core::models::NormalizedSalesRecord;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, d).unwrap()
    }

    fn dataset() -> CanonicalDataset {
        CanonicalDataset::from_records(vec![
            NormalizedSalesRecord::new(Decimal::new(1000, 2), date(10), "north"),
            NormalizedSalesRecord::new(Decimal::new(500, 2), date(12), "south"),
            NormalizedSalesRecord::new(Decimal::new(1000, 2), date(20), "south"),
        ])
    }

    fn ready_app() -> App {
        App::from_load_result(
            "dark",
            date(15),
            RegionFilter::All,
            Path::new("out.csv"),
            Ok(dataset()),
        )
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    // ── from_load_result ──────────────────────────────────────────────────────

    #[test]
    fn test_from_load_result_ready() {
        let app = ready_app();
        assert!(!app.should_quit);
        match &app.state {
            DashboardState::Ready { metrics, series, .. } => {
                assert_eq!(metrics.total_sales, Decimal::new(2500, 2));
                assert_eq!(series.points.len(), 3);
                assert_eq!(series.cutoff.index, 2);
            }
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn test_from_load_result_not_found_is_no_data() {
        let app = App::from_load_result(
            "light",
            date(15),
            RegionFilter::All,
            Path::new("missing.csv"),
            Err(LoadError::NotFound(PathBuf::from("missing.csv"))),
        );
        assert!(matches!(app.state, DashboardState::NoData { .. }));
        assert!(app.series().is_none());
    }

    #[test]
    fn test_from_load_result_other_error_is_failed() {
        let app = App::from_load_result(
            "dark",
            date(15),
            RegionFilter::All,
            Path::new("out.csv"),
            Err(LoadError::Malformed {
                path: PathBuf::from("out.csv"),
                line: 7,
                message: "bad".to_string(),
            }),
        );
        match app.state {
            DashboardState::Failed { message } => assert!(message.contains("out.csv:7")),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    // ── Region changes ────────────────────────────────────────────────────────

    #[test]
    fn test_set_region_recomputes_series() {
        let mut app = ready_app();
        app.set_region(RegionFilter::Only(Region::South));

        let series = app.series().unwrap();
        assert_eq!(series.region, RegionFilter::Only(Region::South));
        assert_eq!(series.points.len(), 2);
        assert_eq!(series.cutoff.index, 1);
    }

    #[test]
    fn test_set_region_keeps_metrics() {
        let mut app = ready_app();
        app.set_region(RegionFilter::Only(Region::North));
        match &app.state {
            DashboardState::Ready { metrics, .. } => {
                assert_eq!(metrics.total_sales, Decimal::new(2500, 2));
            }
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn test_arrow_keys_cycle() {
        let mut app = ready_app();
        app.handle_key(press(KeyCode::Right));
        assert_eq!(app.region, RegionFilter::Only(Region::North));
        app.handle_key(press(KeyCode::Tab));
        assert_eq!(app.region, RegionFilter::Only(Region::South));
        app.handle_key(press(KeyCode::Left));
        app.handle_key(press(KeyCode::Left));
        assert_eq!(app.region, RegionFilter::All);
        app.handle_key(press(KeyCode::Left));
        assert_eq!(app.region, RegionFilter::Only(Region::West));
    }

    #[test]
    fn test_number_and_letter_shortcuts() {
        let mut app = ready_app();
        app.handle_key(press(KeyCode::Char('4')));
        assert_eq!(app.region, RegionFilter::Only(Region::East));
        app.handle_key(press(KeyCode::Char('1')));
        assert_eq!(app.region, RegionFilter::All);
        app.handle_key(press(KeyCode::Char('w')));
        assert_eq!(app.region, RegionFilter::Only(Region::West));
        app.handle_key(press(KeyCode::Char('S')));
        assert_eq!(app.region, RegionFilter::Only(Region::South));
        app.handle_key(press(KeyCode::Char('x')));
        assert_eq!(app.region, RegionFilter::Only(Region::South));
        assert!(!app.should_quit);
    }

    #[test]
    fn test_quit_keys() {
        for key in [
            press(KeyCode::Char('q')),
            press(KeyCode::Esc),
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            let mut app = ready_app();
            app.handle_key(key);
            assert!(app.should_quit, "{key:?} should quit");
        }
    }

    #[test]
    fn test_key_release_ignored() {
        let mut app = ready_app();
        app.handle_key(KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert!(!app.should_quit);
    }

    #[test]
    fn test_region_keys_without_data_only_track_selection() {
        let mut app = App::from_load_result(
            "dark",
            date(15),
            RegionFilter::All,
            Path::new("missing.csv"),
            Err(LoadError::NotFound(PathBuf::from("missing.csv"))),
        );
        app.handle_key(press(KeyCode::Char('n')));
        assert_eq!(app.region, RegionFilter::Only(Region::North));
        assert!(app.series().is_none());
    }

    // ── Render ────────────────────────────────────────────────────────────────

    #[test]
    fn test_render_every_state_does_not_panic() {
        let apps = [
            ready_app(),
            App::from_load_result(
                "classic",
                date(15),
                RegionFilter::All,
                Path::new("missing.csv"),
                Err(LoadError::NotFound(PathBuf::from("missing.csv"))),
            ),
            App::from_load_result(
                "light",
                date(15),
                RegionFilter::All,
                Path::new("out.csv"),
                Err(LoadError::MissingColumn {
                    path: PathBuf::from("out.csv"),
                    column: "sales".to_string(),
                }),
            ),
        ];

        for app in &apps {
            let mut terminal = Terminal::new(TestBackend::new(110, 36)).unwrap();
            terminal.draw(|frame| app.render(frame)).unwrap();
        }
    }
}
