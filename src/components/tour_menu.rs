//! Tour menu
//!
//! Lists every registered flow with its kind, trigger route and status, and
//! lets the user replay a tour, resume a hidden one, end the active one or
//! reset completion tracking.

use super::help_overlay::centered;
use super::keybindings::KeyAction;
use crate::engine::controller::TourEngine;
use crate::engine::machine::Transition;
use crate::theme::{Colors, Styles};
use crate::types::FlowKind;
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Clear, List, ListItem, ListState},
};
use strum::Display;

/// Status of a flow as seen from the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum FlowStatus {
    Active,
    Hidden,
    Completed,
    Available,
}

impl FlowStatus {
    fn style(self) -> Style {
        match self {
            Self::Active => Styles::title(),
            Self::Hidden => Styles::warning(),
            Self::Completed => Styles::success(),
            Self::Available => Styles::text_secondary(),
        }
    }
}

/// One row of the menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TourMenuEntry {
    pub flow_id: String,
    pub kind: FlowKind,
    pub trigger_route: Option<String>,
    pub steps: usize,
    pub status: FlowStatus,
}

/// Snapshot the registry and tour state as menu rows
pub fn entries(engine: &TourEngine) -> Vec<TourMenuEntry> {
    let state = engine.state();
    engine
        .registry()
        .iter()
        .map(|flow| {
            let status = match state.active() {
                Some(active) if active.flow_id == flow.id && active.visible => FlowStatus::Active,
                Some(active) if active.flow_id == flow.id => FlowStatus::Hidden,
                _ if state.is_completed(&flow.id) => FlowStatus::Completed,
                _ => FlowStatus::Available,
            };
            TourMenuEntry {
                flow_id: flow.id.clone(),
                kind: flow.kind(),
                trigger_route: flow.trigger_route.clone(),
                steps: flow.len(),
                status,
            }
        })
        .collect()
}

/// What a menu key press did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuOutcome {
    /// Selection moved or nothing happened
    Stay,
    /// Close the menu, optionally with a status message
    Close(Option<String>),
    /// Stay open with a status message
    Message(String),
}

/// Menu selection state
#[derive(Debug, Clone, Default)]
pub struct TourMenuState {
    selected: usize,
}

impl TourMenuState {
    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn select_next(&mut self, len: usize) {
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    pub fn select_prev(&mut self, len: usize) {
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    /// Apply a menu key action to the engine
    pub fn handle(&mut self, action: KeyAction, engine: &mut TourEngine) -> MenuOutcome {
        let rows = entries(engine);
        match action {
            KeyAction::NavigateUp => {
                self.select_prev(rows.len());
                MenuOutcome::Stay
            }
            KeyAction::NavigateDown => {
                self.select_next(rows.len());
                MenuOutcome::Stay
            }
            KeyAction::Select => {
                let Some(entry) = rows.get(self.selected) else {
                    return MenuOutcome::Stay;
                };
                match engine.start_flow(&entry.flow_id) {
                    Transition::Started { flow_id } => {
                        MenuOutcome::Close(Some(format!("Started {}", flow_id)))
                    }
                    Transition::Ignored(reason) => MenuOutcome::Message(reason.to_string()),
                    _ => MenuOutcome::Stay,
                }
            }
            KeyAction::ResumeTour => match engine.show_tooltip() {
                Transition::VisibilityChanged { flow_id, .. } => {
                    MenuOutcome::Close(Some(format!("Resumed {}", flow_id)))
                }
                Transition::Ignored(reason) => MenuOutcome::Message(reason.to_string()),
                _ => MenuOutcome::Stay,
            },
            KeyAction::EndTour => match engine.skip_flow() {
                Transition::Finished { flow_id, .. } => {
                    MenuOutcome::Message(format!("Ended {}", flow_id))
                }
                Transition::Ignored(reason) => MenuOutcome::Message(reason.to_string()),
                _ => MenuOutcome::Stay,
            },
            KeyAction::ResetCompleted => {
                engine.reset_completed();
                MenuOutcome::Message("Completion tracking reset".to_string())
            }
            KeyAction::Back => MenuOutcome::Close(None),
            _ => MenuOutcome::Stay,
        }
    }

    /// Render the menu centered in `parent`
    pub fn render(&self, f: &mut Frame, parent: Rect, rows: &[TourMenuEntry]) {
        let area = centered(parent, 70, 60);
        f.render_widget(Clear, area);

        let items: Vec<ListItem> = rows
            .iter()
            .map(|entry| {
                let route = entry.trigger_route.as_deref().unwrap_or("manual");
                ListItem::new(Line::from(vec![
                    Span::styled(format!(" {:<16}", entry.flow_id), Styles::text()),
                    Span::styled(format!("{:<9}", entry.kind.to_string()), Styles::text_muted()),
                    Span::styled(format!("{:<12}", route), Styles::text_secondary()),
                    Span::styled(format!("{:>2} steps  ", entry.steps), Styles::text_muted()),
                    Span::styled(entry.status.to_string(), entry.status.style()),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .border_style(Styles::border_active())
                    .style(Style::default().bg(Colors::BG_PRIMARY))
                    .title(" Guided Tours ")
                    .title_bottom(
                        Line::styled(
                            " Enter start  v resume  x end  r reset  Esc close ",
                            Styles::nav_hint(),
                        )
                        .centered(),
                    ),
            )
            .highlight_style(Styles::selected())
            .highlight_symbol("▶");

        let mut state = ListState::default().with_selected(Some(self.selected));
        f.render_stateful_widget(list, area, &mut state);
    }
}
