//! Ratatui-based terminal UI.
//!
//! A customer form on the left, the prediction on the right: CLV, tier,
//! derived metrics, recommendations, and a revenue projection chart.
//! Nothing is predicted until the operator submits the form.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotters::style::RGBColor;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use tracing::warn;

use crate::app::pipeline::{PredictionOutput, run_prediction};
use crate::domain::{AGE_MAX, AGE_MIN, Frequency, MIN_MONTHLY_AMOUNT, RawInput, Tier};
use crate::error::AppError;
use crate::models::{ModelStore, Predictor};
use crate::report::{fmt_mad, tier_range};
use crate::scoring::TIER_BOUNDS;

mod plotters_chart;

use plotters_chart::ProjectionChart;

const FIELD_COUNT: usize = 8;
const MONTHLY_FIELD: usize = 3;
const MONTHLY_STEP: f64 = 5.0;
/// Upper bound on projection chart segments.
const MAX_PROJECTION_POINTS: usize = 240;

/// Start the TUI with `form` as the initial form state.
pub fn run(form: RawInput, store: Arc<ModelStore>) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(form, store);
    app.status = "Loading model...".to_string();
    terminal
        .draw(|f| app.draw(f))
        .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
    app.reload_model();

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    form: RawInput,
    frequency: Frequency,
    selected_field: usize,
    editing_monthly: bool,
    monthly_input: String,
    status: String,
    store: Arc<ModelStore>,
    predictor: Option<Arc<dyn Predictor>>,
    model_error: Option<String>,
    output: Option<PredictionOutput>,
}

impl App {
    fn new(mut form: RawInput, store: Arc<ModelStore>) -> Self {
        let frequency = Frequency::ALL
            .into_iter()
            .find(|f| f.label() == form.frequency)
            .unwrap_or(Frequency::Medium);
        form.frequency = frequency.label().to_string();

        Self {
            form,
            frequency,
            selected_field: 0,
            editing_monthly: false,
            monthly_input: String::new(),
            status: String::new(),
            store,
            predictor: None,
            model_error: None,
            output: None,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100)).map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_monthly {
            self.handle_monthly_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field + 1 < FIELD_COUNT {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right | KeyCode::Char(' ') => self.adjust_field(1),
            KeyCode::Enter if self.selected_field == MONTHLY_FIELD => {
                self.editing_monthly = true;
                self.monthly_input.clear();
                self.status = "Type the monthly amount (MAD). Enter to apply, Esc to cancel.".to_string();
            }
            KeyCode::Enter | KeyCode::Char('p') => self.submit(),
            KeyCode::Char('m') => self.reload_model(),
            _ => {}
        }

        false
    }

    fn handle_monthly_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing_monthly = false;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing_monthly = false;
                self.apply_monthly_input();
            }
            KeyCode::Backspace => {
                self.monthly_input.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
                self.monthly_input.push(c);
            }
            _ => {}
        }
    }

    fn apply_monthly_input(&mut self) {
        let trimmed = self.monthly_input.trim();
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= MIN_MONTHLY_AMOUNT => {
                self.form.monthly_amount = v;
                self.status = format!("monthly: {} MAD", fmt_mad(v, 2));
            }
            Ok(_) => {
                self.status = format!("Monthly amount must be at least {MIN_MONTHLY_AMOUNT} MAD.");
            }
            Err(e) => {
                self.status = format!("Invalid amount '{trimmed}': {e}");
            }
        }
    }

    fn adjust_field(&mut self, delta: i32) {
        let up = delta >= 0;
        let form = &mut self.form;
        match self.selected_field {
            0 => {
                form.creation_month = if up {
                    form.creation_month % 12 + 1
                } else {
                    (form.creation_month + 10) % 12 + 1
                };
            }
            1 => form.plan = if up { form.plan.next() } else { form.plan.prev() },
            2 => form.country = if up { form.country.next() } else { form.country.prev() },
            3 => {
                let next = form.monthly_amount + if up { MONTHLY_STEP } else { -MONTHLY_STEP };
                form.monthly_amount = next.max(MIN_MONTHLY_AMOUNT);
            }
            4 => form.recency = if up { form.recency.next() } else { form.recency.prev() },
            5 => {
                self.frequency = if up { self.frequency.next() } else { self.frequency.prev() };
                form.frequency = self.frequency.label().to_string();
            }
            6 => {
                form.age = if up {
                    (form.age + 1).min(AGE_MAX)
                } else {
                    form.age.saturating_sub(1).max(AGE_MIN)
                };
            }
            7 => form.foreign = !form.foreign,
            _ => {}
        }
    }

    fn reload_model(&mut self) {
        match self.store.get() {
            Ok(predictor) => {
                self.status = format!("Model ready: {}", predictor.name());
                self.predictor = Some(predictor);
                self.model_error = None;
            }
            Err(err) => {
                warn!(error = %err, "model load failed");
                self.status = "Model unavailable. Press m to retry.".to_string();
                self.predictor = None;
                self.model_error = Some(err.to_string());
            }
        }
    }

    fn submit(&mut self) {
        if self.predictor.is_none() {
            self.reload_model();
        }
        let Some(predictor) = self.predictor.clone() else {
            return;
        };

        match run_prediction(predictor.as_ref(), &self.form) {
            Ok(output) => {
                self.status = format!(
                    "CLV {} MAD ({})",
                    fmt_mad(output.result.clv, 0),
                    output.result.tier.label()
                );
                self.output = Some(output);
            }
            Err(err) => {
                // Stale results would describe a different form state.
                self.output = None;
                self.status = format!("{err}. Adjust the inputs and try again.");
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let model = self
            .predictor
            .as_ref()
            .map(|p| p.name().to_string())
            .unwrap_or_else(|| "-".to_string());

        let lines = vec![
            Line::from(vec![
                Span::styled("clv", Style::default().fg(Color::Cyan)),
                Span::raw(" - Customer Lifetime Value prediction"),
            ]),
            Line::from(Span::styled(format!("model: {model}"), Style::default().fg(Color::Gray))),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(42), Constraint::Min(0)])
            .split(area);

        self.draw_form(frame, chunks[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(14), Constraint::Min(0)])
            .split(chunks[1]);

        self.draw_results(frame, right[0]);
        self.draw_chart(frame, right[1]);
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let f = &self.form;
        let monthly = if self.editing_monthly {
            format!("{}_", self.monthly_input)
        } else {
            format!("{} MAD", fmt_mad(f.monthly_amount, 2))
        };

        let items = vec![
            ListItem::new(format!("Creation month : {}", f.creation_month)),
            ListItem::new(format!("Plan           : {}", f.plan.label())),
            ListItem::new(format!("Country        : {}", f.country.label())),
            ListItem::new(format!("Monthly amount : {monthly}")),
            ListItem::new(format!("Recency        : {}", f.recency.label())),
            ListItem::new(format!("Frequency      : {}", f.frequency)),
            ListItem::new(format!("Age            : {}", f.age)),
            ListItem::new(format!("Foreign        : {}", if f.foreign { "yes" } else { "no" })),
        ];

        let list = List::new(items)
            .block(Block::default().title("Customer").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_results(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Prediction").borders(Borders::ALL);

        if let Some(err) = &self.model_error {
            let p = Paragraph::new(vec![
                Line::from(Span::styled(
                    "Model could not be loaded.",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(err.as_str()),
                Line::from(""),
                Line::from("Check CLV_MODEL_PATH / CLV_MODEL_URL, then press m."),
            ])
            .wrap(Wrap { trim: true })
            .block(block);
            frame.render_widget(p, area);
            return;
        }

        let Some(output) = &self.output else {
            let p = Paragraph::new("Fill in the form and press Enter (or p) to predict.")
                .style(Style::default().fg(Color::Gray))
                .block(block);
            frame.render_widget(p, area);
            return;
        };

        let r = &output.result;
        let m = &r.metrics;
        let tier_style = Style::default().fg(tier_color(r.tier)).add_modifier(Modifier::BOLD);

        let mut lines = vec![
            Line::from(vec![
                Span::raw("CLV: "),
                Span::styled(format!("{} MAD", fmt_mad(r.clv, 0)), tier_style),
                Span::raw("  tier: "),
                Span::styled(r.tier.label(), tier_style),
                Span::styled(format!("  ({})", tier_range(r.tier)), Style::default().fg(Color::Gray)),
            ]),
            Line::from(format!(
                "Lifetime: {:.1} months  churn risk: {}",
                m.lifetime_months,
                m.churn_risk.label()
            )),
            Line::from(format!(
                "Annual revenue: {} MAD  24-month: {} MAD",
                fmt_mad(m.annual_revenue, 0),
                fmt_mad(m.revenue_24m, 0)
            )),
            Line::from(format!("Growth potential: {} MAD", fmt_mad(m.growth_potential, 0))),
            Line::from(""),
            Line::from(Span::styled("Recommendations", Style::default().add_modifier(Modifier::BOLD))),
        ];
        for rec in r.recommendations {
            lines.push(Line::from(format!("- {rec}")));
        }

        let p = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true }).block(block);
        frame.render_widget(p, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Revenue projection").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(output) = &self.output else {
            return;
        };

        let projection = projection_series(output.result.clv, output.input.monthly_amount);
        let thresholds = TIER_BOUNDS.map(|(upper, _)| upper);
        let widget = ProjectionChart {
            revenue: &projection.revenue,
            clv: output.result.clv,
            crossing: (output.result.metrics.lifetime_months, output.result.clv),
            clv_color: tier_rgb(output.result.tier),
            thresholds: &thresholds,
            x_bounds: projection.x_bounds,
            y_bounds: projection.y_bounds,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  Enter predict/edit amount  m reload model  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

#[derive(Debug, Clone)]
struct Projection {
    revenue: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

/// Cumulative revenue over time, out past the estimated lifetime.
///
/// Monthly points up to `MAX_PROJECTION_POINTS` steps; longer horizons are
/// sampled evenly and always end exactly on the horizon.
fn projection_series(clv: f64, monthly_amount: f64) -> Projection {
    let lifetime = if monthly_amount > 0.0 { clv / monthly_amount } else { 0.0 };
    let horizon = (lifetime * 1.25).max(24.0).ceil();
    let horizon = if horizon.is_finite() { horizon } else { 24.0 };

    let steps = (horizon as usize).clamp(1, MAX_PROJECTION_POINTS);
    let step = horizon / steps as f64;
    let revenue: Vec<(f64, f64)> = (0..=steps)
        .map(|i| {
            let m = if i == steps { horizon } else { i as f64 * step };
            (m, m * monthly_amount)
        })
        .collect();

    let top = clv.max(horizon * monthly_amount);
    let y_max = if top.is_finite() && top > 0.0 { top * 1.05 } else { 1.0 };

    Projection {
        revenue,
        x_bounds: [0.0, horizon],
        y_bounds: [0.0, y_max],
    }
}

fn tier_color(tier: Tier) -> Color {
    match tier {
        Tier::Standard => Color::Green,
        Tier::Loyal => Color::Cyan,
        Tier::Premium => Color::Yellow,
        Tier::Vip => Color::Red,
    }
}

fn tier_rgb(tier: Tier) -> RGBColor {
    match tier {
        Tier::Standard => RGBColor(40, 167, 69),
        Tier::Loyal => RGBColor(23, 162, 184),
        Tier::Premium => RGBColor(255, 193, 7),
        Tier::Vip => RGBColor(220, 53, 69),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Country, ModelRecord, Plan, Recency};
    use crate::error::ClvError;
    use crate::models::ModelError;

    struct Ratio(f64);

    impl Predictor for Ratio {
        fn name(&self) -> &str {
            "ratio"
        }

        fn predict(&self, record: &ModelRecord) -> Result<f64, ModelError> {
            Ok(record.monthly_amount * self.0)
        }
    }

    fn form() -> RawInput {
        RawInput {
            creation_month: 12,
            plan: Plan::Prepaid,
            country: Country::Morocco,
            monthly_amount: 3.0,
            recency: Recency::Recent,
            frequency: "High".to_string(),
            age: AGE_MIN,
            foreign: false,
        }
    }

    fn app_with(store: ModelStore) -> App {
        App::new(form(), Arc::new(store))
    }

    fn ready_app() -> App {
        app_with(ModelStore::with_loader(|| Ok(Arc::new(Ratio(30.0)) as Arc<dyn Predictor>)))
    }

    #[test]
    fn widgets_stay_in_bounds() {
        let mut app = ready_app();

        app.selected_field = 0;
        app.adjust_field(1);
        assert_eq!(app.form.creation_month, 1);
        app.adjust_field(-1);
        assert_eq!(app.form.creation_month, 12);

        app.selected_field = MONTHLY_FIELD;
        app.adjust_field(-1);
        assert_eq!(app.form.monthly_amount, MIN_MONTHLY_AMOUNT);

        app.selected_field = 5;
        app.adjust_field(1);
        assert_eq!(app.form.frequency, "Single");

        app.selected_field = 6;
        app.adjust_field(-1);
        assert_eq!(app.form.age, AGE_MIN);

        app.selected_field = 7;
        app.adjust_field(1);
        assert!(app.form.foreign);
    }

    #[test]
    fn typed_amount_below_minimum_is_refused() {
        let mut app = ready_app();
        app.selected_field = MONTHLY_FIELD;
        app.handle_key(KeyCode::Enter);
        assert!(app.editing_monthly);
        for c in "0.5".chars() {
            app.handle_key(KeyCode::Char(c));
        }
        app.handle_key(KeyCode::Enter);
        assert!(!app.editing_monthly);
        assert_eq!(app.form.monthly_amount, 3.0);

        app.handle_key(KeyCode::Enter);
        for c in "150".chars() {
            app.handle_key(KeyCode::Char(c));
        }
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.form.monthly_amount, 150.0);
    }

    #[test]
    fn submit_shows_prediction() {
        let mut app = ready_app();
        app.form.monthly_amount = 150.0;
        app.handle_key(KeyCode::Char('p'));
        let out = app.output.as_ref().unwrap();
        assert_eq!(out.record.frequency, "4");
        assert_eq!(out.result.tier, Tier::Loyal);
        assert!(app.status.contains("4,500"));
    }

    #[test]
    fn unavailable_model_is_reported_and_retryable() {
        let mut app = app_with(ModelStore::with_loader(|| {
            Err(ClvError::ModelUnavailable("no artifact".into()))
        }));
        app.submit();
        assert!(app.output.is_none());
        assert!(app.model_error.as_deref().unwrap().contains("no artifact"));
        assert!(!app.handle_key(KeyCode::Char('m')));
        assert!(app.model_error.is_some());
    }

    #[test]
    fn projection_reaches_past_lifetime() {
        let p = projection_series(2500.0, 59.0);
        assert!(p.x_bounds[1] >= 2500.0 / 59.0);
        assert_eq!(p.revenue[0], (0.0, 0.0));
        assert!(p.y_bounds[1] >= 2500.0);

        let short = projection_series(100.0, 50.0);
        assert_eq!(short.x_bounds, [0.0, 24.0]);
        assert_eq!(short.revenue.len(), 25);
        assert_eq!(short.revenue[1], (1.0, 50.0));
    }

    #[test]
    fn long_lifetime_projection_is_sampled() {
        let p = projection_series(4_000_000.0, 1.0);
        assert_eq!(p.revenue.len(), MAX_PROJECTION_POINTS + 1);
        assert_eq!(p.x_bounds, [0.0, 5_000_000.0]);
        assert_eq!(*p.revenue.last().unwrap(), (5_000_000.0, 5_000_000.0));
        assert!(p.revenue.windows(2).all(|w| w[0].0 < w[1].0));
        assert!(p.y_bounds[1] >= 4_000_000.0);
    }
}
