//! Built-in tours for the operations console

use super::{Flow, FlowRegistry, Step};
use crate::types::Side;

pub(super) fn registry() -> FlowRegistry {
    let flows = [
        welcome(),
        dashboard_tour(),
        fleet_tour(),
        hr_tour(),
        finance_tour(),
        export_tip(),
    ];
    FlowRegistry {
        flows: flows.into_iter().map(|f| (f.id.clone(), f)).collect(),
    }
}

/// First-launch introduction, shown as full-screen slides
fn welcome() -> Flow {
    Flow::new(
        "welcome",
        vec![
            Step::slide(
                "intro",
                "Welcome to Ops Console",
                "One place for fleet, people and money. This short introduction \
                 shows where everything lives.",
            )
            .with_image("console-overview"),
            Step::slide(
                "modules",
                "Three workspaces",
                "Fleet tracks vehicles and maintenance. HR keeps the staff directory \
                 and leave requests. Finance holds the ledger and expense reports.",
            )
            .with_image("workspaces"),
            Step::slide(
                "help",
                "Tours on demand",
                "Each workspace has its own guided tour. Press t at any time to open \
                 the tour menu and replay one.",
            ),
        ],
    )
}

fn dashboard_tour() -> Flow {
    Flow::new(
        "dashboard-tour",
        vec![
            Step::tooltip(
                "nav",
                "Navigation",
                "Switch workspaces here. The highlighted tab is the page you are on.",
                "#nav",
                Side::Bottom,
            ),
            Step::tooltip(
                "kpis",
                "Key figures",
                "Live counts for active vehicles, staff on shift and open invoices.",
                "#kpi-cards",
                Side::Bottom,
            ),
            Step::tooltip(
                "activity",
                "Activity feed",
                "The latest changes across every workspace, newest first.",
                "#activity-feed",
                Side::Top,
            ),
        ],
    )
    .triggered_on("/dashboard")
}

fn fleet_tour() -> Flow {
    Flow::new(
        "fleet-tour",
        vec![
            Step::tooltip(
                "table",
                "Vehicle list",
                "Every vehicle with its status and next service date. Use the arrow \
                 keys to move through the list.",
                "#fleet-table",
                Side::Right,
            ),
            Step::tooltip(
                "map",
                "Depot map",
                "Where vehicles are parked right now, grouped by depot.",
                "#fleet-map",
                Side::Left,
            ),
            Step::tooltip(
                "add",
                "Add a vehicle",
                "Register a new vehicle. It appears in the list once saved.",
                "#add-vehicle",
                Side::Top,
            ),
        ],
    )
    .triggered_on("/fleet")
}

fn hr_tour() -> Flow {
    Flow::new(
        "hr-tour",
        vec![
            Step::tooltip(
                "directory",
                "Staff directory",
                "Everyone in the organisation with their team and role.",
                "#hr-directory",
                Side::Right,
            ),
            Step::tooltip(
                "leave",
                "Leave requests",
                "Pending requests wait here for approval.",
                "#leave-requests",
                Side::Left,
            ),
        ],
    )
    .triggered_on("/hr")
}

fn finance_tour() -> Flow {
    Flow::new(
        "finance-tour",
        vec![
            Step::tooltip(
                "ledger",
                "General ledger",
                "Posted transactions for the current period.",
                "#finance-ledger",
                Side::Bottom,
            ),
            Step::tooltip(
                "expenses",
                "Expenses by category",
                "Spending for the month, split by cost centre.",
                "#expense-chart",
                Side::Top,
            ),
            Step::tooltip(
                "export",
                "Export",
                "Download the ledger as CSV. Scroll down if the button is off screen.",
                "#export-button",
                Side::Top,
            ),
        ],
    )
    .triggered_on("/finance")
}

/// Single ad-hoc tooltip, started from the tour menu only
fn export_tip() -> Flow {
    Flow::new(
        "export-tip",
        vec![Step::tooltip(
            "export",
            "Quick export",
            "Exports respect the filters currently applied to the ledger.",
            "#export-button",
            Side::Left,
        )],
    )
}
