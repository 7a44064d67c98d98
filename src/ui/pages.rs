//! Host console pages
//!
//! Each page is a vertical stack of rows, each row split into panels. The
//! stack is taller than most terminals, so pages scroll. Panels that carry a
//! selector are tour targets: they are registered with the region map only
//! while fully on screen, so a target scrolled out of view is "not found".

use super::header::NAV_SELECTOR;
use crate::app::Route;
use crate::engine::locator::RegionMap;
use crate::geometry::TargetRect;
use crate::theme::{Colors, Styles};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Bar, BarChart, BarGroup, Block, BorderType, List, ListItem, Paragraph, Row, Table, Wrap,
    },
};

type RenderFn = fn(&mut Frame, Rect);

/// A titled box on a page
#[derive(Clone, Copy)]
struct Panel {
    selector: Option<&'static str>,
    width_pct: u16,
    render: RenderFn,
}

impl Panel {
    const fn new(width_pct: u16, render: RenderFn) -> Self {
        Self {
            selector: None,
            width_pct,
            render,
        }
    }

    const fn target(selector: &'static str, width_pct: u16, render: RenderFn) -> Self {
        Self {
            selector: Some(selector),
            width_pct,
            render,
        }
    }
}

/// One horizontal band of panels
struct Band {
    height: u16,
    panels: Vec<Panel>,
}

impl Band {
    fn new(height: u16, panels: Vec<Panel>) -> Self {
        Self { height, panels }
    }
}

fn bands(route: Route) -> Vec<Band> {
    match route {
        Route::Landing => vec![Band::new(12, vec![Panel::new(100, landing_hero)])],
        Route::Login => vec![Band::new(9, vec![Panel::new(100, login_form)])],
        Route::Dashboard => vec![
            Band::new(5, vec![Panel::target("#kpi-cards", 100, kpi_cards)]),
            Band::new(
                10,
                vec![
                    Panel::target("#activity-feed", 60, activity_feed),
                    Panel::new(40, announcements),
                ],
            ),
            Band::new(8, vec![Panel::new(100, service_health)]),
        ],
        Route::Fleet => vec![
            Band::new(
                11,
                vec![
                    Panel::target("#fleet-table", 60, fleet_table),
                    Panel::target("#fleet-map", 40, fleet_map),
                ],
            ),
            Band::new(
                3,
                vec![
                    Panel::target("#add-vehicle", 30, add_vehicle),
                    Panel::new(70, fleet_summary),
                ],
            ),
            Band::new(9, vec![Panel::new(100, maintenance)]),
        ],
        Route::Hr => vec![
            Band::new(11, vec![Panel::target("#hr-directory", 100, hr_directory)]),
            Band::new(8, vec![Panel::target("#leave-requests", 100, leave_requests)]),
        ],
        Route::Finance => vec![
            Band::new(11, vec![Panel::target("#finance-ledger", 100, finance_ledger)]),
            Band::new(
                10,
                vec![
                    Panel::target("#expense-chart", 70, expense_chart),
                    Panel::new(30, budget_notes),
                ],
            ),
            Band::new(
                3,
                vec![
                    Panel::target("#export-button", 30, export_button),
                    Panel::new(70, export_hint),
                ],
            ),
        ],
    }
}

/// Total height of a page's content
pub fn content_height(route: Route) -> u16 {
    bands(route).iter().map(|b| b.height).sum()
}

/// Largest scroll offset for a page shown in a body `body_height` rows tall
pub fn max_scroll(route: Route, body_height: u16) -> u16 {
    content_height(route).saturating_sub(body_height)
}

/// Every selector a page can register
pub fn selectors(route: Route) -> Vec<&'static str> {
    let mut all: Vec<&'static str> = bands(route)
        .iter()
        .flat_map(|b| b.panels.iter().filter_map(|p| p.selector))
        .collect();
    if route.is_workspace() {
        all.insert(0, NAV_SELECTOR);
    }
    all
}

/// Render a page into `body`, scrolled down by `scroll` rows
pub fn render_page(f: &mut Frame, body: Rect, route: Route, scroll: u16, regions: &mut RegionMap) {
    let mut top = i32::from(body.y) - i32::from(scroll);
    for band in bands(route) {
        let height = i32::from(band.height);
        let columns = Layout::horizontal(
            band.panels
                .iter()
                .map(|p| Constraint::Percentage(p.width_pct)),
        )
        .split(Rect::new(body.x, 0, body.width, 1));

        for (panel, column) in band.panels.iter().zip(columns.iter()) {
            let rect = TargetRect::new(top, i32::from(column.x), i32::from(column.width), height);
            let Some((area, fully_visible)) = visible_part(rect, body) else {
                continue;
            };
            (panel.render)(f, area);
            if fully_visible && let Some(selector) = panel.selector {
                regions.register(selector, rect);
            }
        }
        top += height;
    }
}

/// Part of `rect` inside `body`, and whether that is all of it
fn visible_part(rect: TargetRect, body: Rect) -> Option<(Rect, bool)> {
    let top = rect.top.max(i32::from(body.top()));
    let bottom = rect.bottom().min(i32::from(body.bottom()));
    if bottom <= top || rect.width <= 0 {
        return None;
    }
    let y = u16::try_from(top).ok()?;
    let x = u16::try_from(rect.left).ok()?;
    let height = u16::try_from(bottom - top).ok()?;
    let width = u16::try_from(rect.width).ok()?;
    let full = top == rect.top && bottom == rect.bottom();
    Some((Rect::new(x, y, width, height), full))
}

fn panel(title: &str) -> Block<'_> {
    Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Styles::border_inactive())
        .title(Span::styled(format!(" {} ", title), Styles::header()))
}

// ============================================================================
// Public pages
// ============================================================================

fn landing_hero(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::styled("Ops Console", Styles::title()),
        Line::from(""),
        Line::styled("Fleet, people and money in one terminal.", Styles::text()),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", Styles::text_muted()),
            Span::styled("Enter", Styles::nav_key()),
            Span::styled(" to sign in", Styles::text_muted()),
        ]),
    ];
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(panel("Welcome")),
        area,
    );
}

fn login_form(f: &mut Frame, area: Rect) {
    let field = |label: &'static str, value: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", label), Styles::text_secondary()),
            Span::styled(value, Style::default().fg(Colors::FG_PRIMARY).bg(Colors::BG_SECONDARY)),
        ])
    };
    let lines = vec![
        Line::from(""),
        field("Email", " ops@example.com      "),
        Line::from(""),
        field("Password", " ••••••••••           "),
        Line::from(""),
        Line::styled("  Press Enter to continue", Styles::text_muted()),
    ];
    f.render_widget(Paragraph::new(lines).block(panel("Sign in")), area);
}

// ============================================================================
// Dashboard
// ============================================================================

const KPIS: [(&str, &str, &str); 4] = [
    ("Active vehicles", "128", "+4"),
    ("Open requests", "17", "-3"),
    ("Headcount", "342", "+2"),
    ("Monthly spend", "$1.24M", "+6%"),
];

fn kpi_cards(f: &mut Frame, area: Rect) {
    let block = panel("Key metrics");
    let inner = block.inner(area);
    f.render_widget(block, area);
    let cells = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(inner);
    for ((label, value, delta), cell) in KPIS.iter().zip(cells.iter()) {
        let delta_style = if delta.starts_with('-') {
            Styles::error()
        } else {
            Styles::success()
        };
        let lines = vec![
            Line::styled(*label, Styles::text_muted()),
            Line::from(vec![
                Span::styled(*value, Styles::text().add_modifier(Modifier::BOLD)),
                Span::raw(" "),
                Span::styled(*delta, delta_style),
            ]),
        ];
        f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), *cell);
    }
}

const ACTIVITY: [(&str, &str); 7] = [
    ("09:12", "Van 14 checked in at North depot"),
    ("09:05", "Leave request approved for R. Osei"),
    ("08:58", "Invoice #4471 marked paid"),
    ("08:41", "Truck 3 flagged for brake service"),
    ("08:30", "New hire onboarding: M. Lindqvist"),
    ("08:02", "Fuel card limit raised for Van 9"),
    ("07:45", "Night shift handover completed"),
];

fn activity_feed(f: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = ACTIVITY
        .iter()
        .map(|(time, text)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", time), Styles::text_muted()),
                Span::styled(*text, Styles::text()),
            ]))
        })
        .collect();
    f.render_widget(List::new(items).block(panel("Recent activity")), area);
}

fn announcements(f: &mut Frame, area: Rect) {
    let text = "Quarter close is on the 28th. Please submit outstanding expenses \
                before then. The North depot car park is closed on Saturday.";
    f.render_widget(
        Paragraph::new(text)
            .style(Styles::text_secondary())
            .wrap(Wrap { trim: true })
            .block(panel("Announcements")),
        area,
    );
}

fn service_health(f: &mut Frame, area: Rect) {
    let rows = [
        ("Dispatch API", "operational"),
        ("Payroll export", "operational"),
        ("Telematics feed", "degraded"),
        ("Ledger sync", "operational"),
    ];
    let table = Table::new(
        rows.iter().map(|(name, status)| {
            let style = if *status == "operational" {
                Styles::success()
            } else {
                Styles::warning()
            };
            Row::new(vec![Line::styled(*name, Styles::text()), Line::styled(*status, style)])
        }),
        [Constraint::Percentage(60), Constraint::Percentage(40)],
    )
    .block(panel("Service health"));
    f.render_widget(table, area);
}

// ============================================================================
// Fleet
// ============================================================================

const VEHICLES: [(&str, &str, &str, &str); 7] = [
    ("VAN-09", "Transit", "North depot", "In service"),
    ("VAN-14", "Transit", "North depot", "In service"),
    ("TRK-03", "Actros", "Workshop", "Maintenance"),
    ("TRK-07", "Actros", "Route 12", "On route"),
    ("CAR-21", "Octavia", "HQ", "Available"),
    ("VAN-02", "Sprinter", "South depot", "On route"),
    ("TRK-11", "FH16", "Route 4", "On route"),
];

fn fleet_table(f: &mut Frame, area: Rect) {
    let header = Row::new(["Unit", "Model", "Location", "Status"]).style(Styles::header());
    let rows = VEHICLES.iter().map(|(unit, model, location, status)| {
        Row::new([*unit, *model, *location, *status]).style(Styles::text())
    });
    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Fill(1),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(panel("Vehicles"));
    f.render_widget(table, area);
}

fn fleet_map(f: &mut Frame, area: Rect) {
    let map = [
        "  .-----N-----.  ",
        " /  ●      ●   \\ ",
        "|     ╳ HQ      |",
        "|  ●        ●   |",
        " \\     ●       / ",
        "  '-----S-----'  ",
    ];
    let lines: Vec<Line> = map
        .iter()
        .map(|row| Line::styled(*row, Style::default().fg(Colors::INFO)))
        .collect();
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(panel("Live map")),
        area,
    );
}

fn add_vehicle(f: &mut Frame, area: Rect) {
    f.render_widget(
        Paragraph::new(Line::styled("+ Add vehicle", Styles::button_primary()))
            .alignment(Alignment::Center)
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .border_style(Styles::border_active()),
            ),
        area,
    );
}

fn fleet_summary(f: &mut Frame, area: Rect) {
    f.render_widget(
        Paragraph::new(" 7 units  ·  4 on route  ·  1 in workshop")
            .style(Styles::text_secondary())
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .border_style(Styles::border_inactive()),
            ),
        area,
    );
}

fn maintenance(f: &mut Frame, area: Rect) {
    let rows = [
        ("TRK-03", "Brake pads", "Today"),
        ("VAN-14", "Tyre rotation", "Thu"),
        ("CAR-21", "Annual inspection", "Next week"),
        ("TRK-11", "Oil change", "Next week"),
        ("VAN-02", "Wiper blades", "This month"),
    ];
    let table = Table::new(
        rows.iter().map(|(unit, task, due)| Row::new([*unit, *task, *due]).style(Styles::text())),
        [Constraint::Length(8), Constraint::Fill(1), Constraint::Length(12)],
    )
    .header(Row::new(["Unit", "Task", "Due"]).style(Styles::header()))
    .block(panel("Maintenance schedule"));
    f.render_widget(table, area);
}

// ============================================================================
// People
// ============================================================================

const STAFF: [(&str, &str, &str); 7] = [
    ("Amara Osei", "Dispatch", "Team lead"),
    ("Jonas Lindqvist", "Workshop", "Mechanic"),
    ("Priya Nair", "Finance", "Controller"),
    ("Tomás Ferreira", "Fleet", "Driver"),
    ("Hana Sato", "People", "HR partner"),
    ("Lea Novak", "Dispatch", "Planner"),
    ("Sam Carter", "Fleet", "Driver"),
];

fn hr_directory(f: &mut Frame, area: Rect) {
    let table = Table::new(
        STAFF
            .iter()
            .map(|(name, team, role)| Row::new([*name, *team, *role]).style(Styles::text())),
        [Constraint::Fill(2), Constraint::Fill(1), Constraint::Fill(1)],
    )
    .header(Row::new(["Name", "Team", "Role"]).style(Styles::header()))
    .block(panel("Directory"));
    f.render_widget(table, area);
}

fn leave_requests(f: &mut Frame, area: Rect) {
    let requests = [
        ("Tomás Ferreira", "3 days", "pending"),
        ("Lea Novak", "1 day", "approved"),
        ("Sam Carter", "5 days", "pending"),
        ("Hana Sato", "2 days", "declined"),
    ];
    let items: Vec<ListItem> = requests
        .iter()
        .map(|(name, length, status)| {
            let style = match *status {
                "approved" => Styles::success(),
                "declined" => Styles::error(),
                _ => Styles::warning(),
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<18}", name), Styles::text()),
                Span::styled(format!("{:<8}", length), Styles::text_muted()),
                Span::styled(*status, style),
            ]))
        })
        .collect();
    f.render_widget(List::new(items).block(panel("Leave requests")), area);
}

// ============================================================================
// Finance
// ============================================================================

const LEDGER: [(&str, &str, &str, &str); 7] = [
    ("04-01", "Fuel", "Fleet", "-18,420"),
    ("04-02", "Payroll", "People", "-412,300"),
    ("04-03", "Contract revenue", "Sales", "+655,000"),
    ("04-05", "Tyres", "Fleet", "-7,880"),
    ("04-08", "Software", "IT", "-3,150"),
    ("04-09", "Insurance", "Fleet", "-22,600"),
    ("04-12", "Consulting revenue", "Sales", "+48,000"),
];

fn finance_ledger(f: &mut Frame, area: Rect) {
    let rows = LEDGER.iter().map(|(date, item, unit, amount)| {
        let amount_style = if amount.starts_with('-') {
            Styles::error()
        } else {
            Styles::success()
        };
        Row::new(vec![
            Line::styled(*date, Styles::text_muted()),
            Line::styled(*item, Styles::text()),
            Line::styled(*unit, Styles::text_secondary()),
            Line::styled(*amount, amount_style).alignment(Alignment::Right),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Fill(2),
            Constraint::Fill(1),
            Constraint::Length(10),
        ],
    )
    .header(Row::new(["Date", "Item", "Unit", "Amount"]).style(Styles::header()))
    .block(panel("Ledger"));
    f.render_widget(table, area);
}

fn expense_chart(f: &mut Frame, area: Rect) {
    let data = [("Fuel", 18), ("Pay", 41), ("Tyres", 8), ("IT", 3), ("Ins", 23)];
    let bars: Vec<Bar> = data
        .iter()
        .map(|(label, value)| {
            Bar::default()
                .label(Line::from(*label))
                .value(*value)
                .style(Style::default().fg(Colors::PRIMARY))
        })
        .collect();
    let chart = BarChart::default()
        .block(panel("Expenses by category (k)"))
        .data(BarGroup::default().bars(&bars))
        .bar_width(5)
        .bar_gap(2);
    f.render_widget(chart, area);
}

fn budget_notes(f: &mut Frame, area: Rect) {
    f.render_widget(
        Paragraph::new("Fleet is 4% over budget this month, driven by insurance renewal.")
            .style(Styles::text_secondary())
            .wrap(Wrap { trim: true })
            .block(panel("Notes")),
        area,
    );
}

fn export_button(f: &mut Frame, area: Rect) {
    f.render_widget(
        Paragraph::new(Line::styled("⇩ Export CSV", Styles::button_primary()))
            .alignment(Alignment::Center)
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .border_style(Styles::border_active()),
            ),
        area,
    );
}

fn export_hint(f: &mut Frame, area: Rect) {
    f.render_widget(
        Paragraph::new(" Exports the ledger rows currently shown")
            .style(Styles::text_muted())
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .border_style(Styles::border_inactive()),
            ),
        area,
    );
}
