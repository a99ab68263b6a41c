use maud::{DOCTYPE, Markup, html};

// Form styles
pub const FORM_GROUP_STYLE: &str = "form-group";
pub const FORM_ERROR_STYLE: &str = "alert alert-error";
pub const FORM_SUCCESS_STYLE: &str = "alert alert-success";

// Button styles
pub const BUTTON_PRIMARY_STYLE: &str = "btn btn-primary";
pub const BUTTON_SECONDARY_STYLE: &str = "btn btn-secondary";

pub const LINK_STYLE: &str = "link";

pub enum HeadElement {
    /// The file path or URL to a JavaScript script, loaded with `defer`.
    ScriptLink(String),
}

pub fn base(title: &str, head_elements: &[HeadElement], content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - BudgetFlow" }
                link href="/static/main.css" rel="stylesheet";

                @for element in head_elements
                {
                    @match element
                    {
                        HeadElement::ScriptLink(path) => script src=(path) defer {}
                    }
                }
            }

            body
            {
                (content)
            }
        }
    }
}

pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    let content = html!(
        section class="error-page"
        {
            h1 class="error-code" { (header) }
            p class="error-description" { (description) }
            p class="error-fix" { (fix) }

            a href="/" class=(BUTTON_PRIMARY_STYLE)
            {
                "Back to Homepage"
            }
        }
    );

    base(title, &[], &content)
}

/// The card layout shared by the log-in and registration pages.
pub fn log_in_register(form_title: &str, form: &Markup) -> Markup {
    html! {
        div class="auth-page"
        {
            div class="auth-card"
            {
                div class="logo" { "BudgetFlow" }

                h1 class="auth-title" { (form_title) }

                (form)
            }
        }
    }
}

/// A labelled input that is required and keeps its value when the form is re-rendered.
pub fn text_input(label: &str, name: &str, type_: &str, value: &str, autofocus: bool) -> Markup {
    html! {
        div class=(FORM_GROUP_STYLE)
        {
            label for=(name) { (label) }

            input
                type=(type_)
                name=(name)
                id=(name)
                value=(value)
                required
                autofocus[autofocus];
        }
    }
}

/// A labelled password input. Passwords are never echoed back to the client.
pub fn password_input(label: &str, name: &str) -> Markup {
    html! {
        div class=(FORM_GROUP_STYLE)
        {
            label for=(name) { (label) }

            input
                type="password"
                name=(name)
                id=(name)
                placeholder="••••••••"
                required;
        }
    }
}

/// An error message shown above a form, if there is one.
pub fn form_error(error_message: Option<&str>) -> Markup {
    html! {
        @if let Some(error_message) = error_message
        {
            div class=(FORM_ERROR_STYLE) role="alert" { (error_message) }
        }
    }
}
