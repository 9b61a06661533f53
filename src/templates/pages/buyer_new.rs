use crate::auth::CurrentUser;
use crate::domain::validation::ValidationErrors;
use crate::leads::form::LeadFormValues;
use crate::templates::components::lead_form::{lead_form, LeadFormVm};
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub fn new_buyer_page(
    user: &CurrentUser,
    values: &LeadFormValues,
    errors: Option<&ValidationErrors>,
) -> Markup {
    desktop_layout(
        "New lead",
        Some(user),
        html! {
            main class="container narrow" {
                h1 { "New lead" }
                (lead_form(&LeadFormVm {
                    action: "/buyers".to_string(),
                    values,
                    errors,
                    updated_at: None,
                    submit_label: "Create lead",
                }))
            }
        },
    )
}
