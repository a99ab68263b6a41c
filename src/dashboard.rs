//! The dashboard page.
//!
//! The page is a shell: the balance card, transaction list and budget
//! overview are filled in by `static/dashboard.js`, which talks to the JSON
//! API. The server provides the layout, the modals and the current month in
//! the local timezone.

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::Date;

use crate::{
    AppState,
    auth::Session,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_GROUP_STYLE, HeadElement, base},
    internal_server_error::InternalServerError,
    month::YearMonth,
    timezone::local_today,
};

/// The categories offered when recording a transaction.
const TRANSACTION_CATEGORIES: [&str; 7] = [
    "Salary",
    "Food",
    "Transport",
    "Shopping",
    "Bills",
    "Entertainment",
    "Other",
];

/// The categories offered when setting a budget. Budgets only track expenses.
const BUDGET_CATEGORIES: [&str; 6] = [
    "Food",
    "Transport",
    "Shopping",
    "Bills",
    "Entertainment",
    "Other",
];

const DASHBOARD_SCRIPT: &str = "/static/dashboard.js";

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The local timezone as a canonical timezone name, e.g. "Asia/Manila".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The first letter of the user's display name, shown in the avatar.
fn avatar_initial(session: &Session) -> String {
    let name = if session.full_name.trim().is_empty() {
        &session.username
    } else {
        &session.full_name
    };

    name.trim()
        .chars()
        .next()
        .map(|initial| initial.to_uppercase().collect())
        .unwrap_or_default()
}

fn header_view(session: &Session) -> Markup {
    let display_name = if session.full_name.trim().is_empty() {
        session.username.as_str()
    } else {
        session.full_name.as_str()
    };

    html! {
        header
        {
            div class="header-content"
            {
                div class="logo" { "BudgetFlow" }

                div class="user-info"
                {
                    span { "Welcome, " (display_name) }
                    div class="user-avatar" { (avatar_initial(session)) }

                    form action=(endpoints::LOG_OUT) method="post" class="inline-form"
                    {
                        button type="submit" class="logout-btn" { "Log out" }
                    }
                }
            }
        }
    }
}

fn balance_card_view() -> Markup {
    html! {
        div class="balance-card"
        {
            div class="balance-label" { "Balance this month" }
            div class="balance-amount" id="totalBalance" { "₱0.00" }

            div class="balance-stats"
            {
                div class="stat-item"
                {
                    div class="stat-icon income" { "💰" }
                    div class="stat-info"
                    {
                        h4 { "Income" }
                        p id="totalIncome" { "₱0.00" }
                    }
                }

                div class="stat-item"
                {
                    div class="stat-icon expense" { "💸" }
                    div class="stat-info"
                    {
                        h4 { "Expenses" }
                        p id="totalExpense" { "₱0.00" }
                    }
                }
            }
        }
    }
}

fn action_buttons_view() -> Markup {
    html! {
        div class="action-buttons"
        {
            button type="button" class="action-btn income" data-open-transaction="income"
            {
                span class="action-icon" { "+" }
                span { "Add Income" }
            }

            button type="button" class="action-btn expense" data-open-transaction="expense"
            {
                span class="action-icon" { "−" }
                span { "Add Expense" }
            }
        }
    }
}

fn lists_view() -> Markup {
    html! {
        div class="grid"
        {
            div class="card"
            {
                div class="card-header"
                {
                    h2 class="card-title" { "Recent Transactions" }
                }

                div class="transaction-list" id="transactionList"
                {
                    p class="empty-state" { "No transactions yet" }
                }
            }

            div class="card"
            {
                div class="card-header"
                {
                    h2 class="card-title" { "Budget Overview" }
                    button type="button" class="btn-small" id="openBudgetModal" { "Set Budget" }
                }

                div class="budget-list" id="budgetList"
                {
                    p class="empty-state" { "No budgets set" }
                }
            }
        }
    }
}

fn category_options(categories: &[&str]) -> Markup {
    html! {
        @for category in categories
        {
            option value=(category) { (category) }
        }
    }
}

fn modal_actions(submit_text: &str) -> Markup {
    html! {
        div class="modal-actions"
        {
            button type="button" class=(BUTTON_SECONDARY_STYLE) data-close-modal { "Cancel" }
            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_text) }
        }
    }
}

fn transaction_modal_view(today: Date) -> Markup {
    html! {
        div id="transactionModal" class="modal"
        {
            div class="modal-content"
            {
                div class="modal-header"
                {
                    h2 id="modalTitle" { "Add Transaction" }
                    button type="button" class="close" aria-label="Close" data-close-modal { "×" }
                }

                form id="transactionForm"
                {
                    input type="hidden" id="transactionId";

                    div class=(FORM_GROUP_STYLE)
                    {
                        label for="transactionType" { "Type" }
                        select id="transactionType" required
                        {
                            option value="income" { "Income" }
                            option value="expense" { "Expense" }
                        }
                    }

                    div class=(FORM_GROUP_STYLE)
                    {
                        label for="transactionCategory" { "Category" }
                        select id="transactionCategory" required
                        {
                            (category_options(&TRANSACTION_CATEGORIES))
                        }
                    }

                    div class=(FORM_GROUP_STYLE)
                    {
                        label for="transactionAmount" { "Amount (₱)" }
                        input type="number" id="transactionAmount" step="0.01" min="0.01" required;
                    }

                    div class=(FORM_GROUP_STYLE)
                    {
                        label for="transactionNote" { "Note (Optional)" }
                        input type="text" id="transactionNote" placeholder="Add a note...";
                    }

                    div class=(FORM_GROUP_STYLE)
                    {
                        label for="transactionDate" { "Date" }
                        input type="date" id="transactionDate" value=(today) required;
                    }

                    (modal_actions("Save Transaction"))
                }
            }
        }
    }
}

fn budget_modal_view() -> Markup {
    html! {
        div id="budgetModal" class="modal"
        {
            div class="modal-content"
            {
                div class="modal-header"
                {
                    h2 { "Set Budget" }
                    button type="button" class="close" aria-label="Close" data-close-modal { "×" }
                }

                form id="budgetForm"
                {
                    div class=(FORM_GROUP_STYLE)
                    {
                        label for="budgetCategory" { "Category" }
                        select id="budgetCategory" required
                        {
                            (category_options(&BUDGET_CATEGORIES))
                        }
                    }

                    div class=(FORM_GROUP_STYLE)
                    {
                        label for="budgetAmount" { "Monthly Budget (₱)" }
                        input type="number" id="budgetAmount" step="0.01" min="0.01" required;
                    }

                    (modal_actions("Save Budget"))
                }
            }
        }
    }
}

fn dashboard_view(session: &Session, today: Date) -> Markup {
    let month = YearMonth::from_date(today);

    let content = html! {
        (header_view(session))

        main class="container" id="dashboard" data-month=(month) data-today=(today)
        {
            (balance_card_view())
            (action_buttons_view())
            (lists_view())
        }

        (transaction_modal_view(today))
        (budget_modal_view())
    };

    base(
        "Dashboard",
        &[HeadElement::ScriptLink(DASHBOARD_SCRIPT.to_owned())],
        &content,
    )
}

/// Display the dashboard for the logged-in user.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(session): Extension<Session>,
) -> Response {
    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => {
            tracing::error!("Could not get the current date: {error}");

            return InternalServerError {
                description: "Invalid Timezone Settings",
                fix: "Check the server's timezone setting. It should be a canonical timezone name, e.g. Asia/Manila.",
            }
            .into_response();
        }
    };

    dashboard_view(&session, today).into_response()
}
