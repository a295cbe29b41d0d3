//! Drawing the dashboard. Pure functions of [`Dashboard`] state.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Chart, Dataset, GraphType, List, ListItem, ListState, Paragraph,
        Tabs, Wrap,
    },
};
use weather_core::{ChartBounds, CityState, Dashboard, PanelVariant, Tab, WeatherIcon};

const TITLE: &str = "Weather Dashboard";
const ACCENT: Color = Color::LightBlue;

pub fn render(f: &mut Frame, dashboard: &Dashboard) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, rows[0], dashboard);
    render_tabs(f, rows[1], dashboard);
    match dashboard.tab() {
        Tab::Current => render_current(f, rows[2], dashboard),
        Tab::Forecast => render_forecast(f, rows[2], dashboard),
    }
    render_footer(f, rows[3], dashboard);
}

fn render_header(f: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let line = Line::from(vec![
        Span::styled(TITLE, Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        Span::raw("   "),
        Span::raw(dashboard.now().format("%H:%M:%S").to_string()),
    ]);
    f.render_widget(
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn render_tabs(f: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let titles: Vec<Line> = Tab::all().iter().map(|t| Line::from(t.title())).collect();
    let idx = Tab::all()
        .iter()
        .position(|t| *t == dashboard.tab())
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(idx)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .divider(" | ");
    f.render_widget(tabs, area);
}

fn render_footer(f: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let refresh_style = if dashboard.is_loading() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White).bg(Color::Blue)
    };

    let mut spans = vec![
        Span::styled(" r  Refresh Weather ", refresh_style),
        Span::raw("   "),
        Span::styled("tab", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" switch view  "),
    ];
    if dashboard.tab() == Tab::Forecast {
        spans.push(Span::styled("↑/↓", Style::default().add_modifier(Modifier::BOLD)));
        spans.push(Span::raw(" city  "));
    }
    spans.push(Span::styled("q", Style::default().add_modifier(Modifier::BOLD)));
    spans.push(Span::raw(" quit"));

    f.render_widget(
        Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn placeholder(f: &mut Frame, area: Rect, text: &str, block: Block) {
    f.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::LightBlue))
            .block(block),
        area,
    );
}

fn render_current(f: &mut Frame, area: Rect, dashboard: &Dashboard) {
    if dashboard.is_loading() {
        placeholder(f, area, "Loading weather data...", Block::default().borders(Borders::ALL));
        return;
    }

    let cities = dashboard.cities();
    let per_row = 2;
    let row_count = cities.len().div_ceil(per_row).max(1);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, row_count as u32); row_count])
        .split(area);

    for (row_area, chunk) in rows.iter().zip(cities.chunks(per_row)) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, per_row as u32); per_row])
            .split(*row_area);
        for (tile_area, state) in cols.iter().zip(chunk) {
            render_tile(f, *tile_area, state, dashboard.variant());
        }
    }
}

fn render_tile(f: &mut Frame, area: Rect, state: &CityState, variant: PanelVariant) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {} ", state.city.name),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    let Some(reading) = &state.reading else {
        f.render_widget(
            Paragraph::new("No data available")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Gray))
                .block(block),
            area,
        );
        return;
    };

    let icon = WeatherIcon::for_temperature(reading.temperature_c);
    let mut lines = vec![Line::from(vec![
        Span::styled(icon.glyph(), icon_style(icon)),
        Span::raw(" "),
        Span::styled(
            format!("{:.1}°C", reading.temperature_c),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ])];

    if variant == PanelVariant::Detailed {
        let humidity = reading
            .humidity_pct
            .map(|h| format!("{h:.0}%"))
            .unwrap_or_else(|| "-".to_string());
        let wind = reading
            .wind_speed_kmh
            .map(|w| format!("{w:.1} km/h"))
            .unwrap_or_else(|| "-".to_string());
        lines.push(Line::from(format!("Humidity {humidity}   Wind {wind}")));
    }

    lines.push(Line::from(Span::styled(
        format!("Updated: {}", reading.observed_at.format("%H:%M:%S")),
        Style::default().fg(Color::Gray),
    )));

    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block),
        area,
    );
}

fn icon_style(icon: WeatherIcon) -> Style {
    match icon {
        WeatherIcon::Sun => Style::default().fg(Color::Yellow),
        WeatherIcon::Cloud => Style::default().fg(Color::Gray),
        WeatherIcon::Droplet => Style::default().fg(Color::Blue),
    }
}

fn render_forecast(f: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(16), Constraint::Min(0)])
        .split(area);

    render_city_picker(f, cols[0], dashboard);
    render_chart(f, cols[1], dashboard);
}

fn render_city_picker(f: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let items: Vec<ListItem> = dashboard
        .registry()
        .names()
        .map(|name| ListItem::new(name.to_string()))
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("City"))
        .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state =
        ListState::default().with_selected(dashboard.registry().position(dashboard.selected_city()));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_chart(f: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let chart = dashboard.chart();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            chart.title(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ));

    if chart.is_loading() {
        placeholder(f, area, "Loading forecast data...", Block::default().borders(Borders::ALL));
        return;
    }

    let points = chart.points();
    let Some(bounds) = ChartBounds::from_points(points) else {
        placeholder(f, area, "No forecast data available", block);
        return;
    };

    let temperature: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.temperature_c))
        .collect();
    let humidity: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.humidity_pct))
        .collect();
    // wind has its own scale, drawn on the right edge
    let wind: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, bounds.right_to_left(p.wind_speed_kmh)))
        .collect();

    let datasets = vec![
        dataset("Temperature (°C)", Color::Blue, &temperature),
        dataset("Humidity (%)", Color::Green, &humidity),
        dataset("Wind Speed (km/h)", Color::Yellow, &wind),
    ];

    let last = points.len() - 1;
    let x_labels: Vec<String> = [0, last / 2, last]
        .iter()
        .map(|&i| points[i].label.clone())
        .collect();

    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(8)])
        .split(area);

    let chart_widget = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, last.max(1) as f64])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds(bounds.left)
                .labels(axis_labels(bounds.left)),
        );
    f.render_widget(chart_widget, inner[0]);

    render_right_axis(f, inner[1], bounds.right);
}

fn dataset<'a>(name: &'a str, color: Color, data: &'a [(f64, f64)]) -> Dataset<'a> {
    Dataset::default()
        .name(name)
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(data)
}

fn axis_labels([lo, hi]: [f64; 2]) -> Vec<String> {
    [lo, (lo + hi) / 2.0, hi]
        .iter()
        .map(|v| format!("{v:.0}"))
        .collect()
}

/// Wind speed scale, top to bottom, aligned with the plot area.
fn render_right_axis(f: &mut Frame, area: Rect, range: [f64; 2]) {
    let block = Block::default().borders(Borders::TOP | Borders::BOTTOM | Borders::RIGHT);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.height < 3 {
        return;
    }

    let labels = axis_labels(range);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(inner);

    let style = Style::default().fg(Color::Yellow);
    f.render_widget(Paragraph::new(labels[2].as_str()).style(style), rows[0]);
    f.render_widget(Paragraph::new(labels[1].as_str()).style(style), rows[2]);
    f.render_widget(Paragraph::new(labels[0].as_str()).style(style), rows[4]);
}
