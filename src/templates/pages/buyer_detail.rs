use crate::auth::CurrentUser;
use crate::domain::changes::HistoryRecord;
use crate::domain::lead::LeadRecord;
use crate::domain::validation::ValidationErrors;
use crate::leads::form::LeadFormValues;
use crate::templates::components::lead_form::{lead_form, LeadFormVm};
use crate::templates::components::history_list;
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub struct BuyerDetailVm<'a> {
    pub user: &'a CurrentUser,
    pub lead: &'a LeadRecord,
    pub values: LeadFormValues,
    pub errors: Option<&'a ValidationErrors>,
    pub history: &'a [HistoryRecord],
    /// Set when the last save lost to a newer write.
    pub conflict: bool,
}

pub fn buyer_detail_page(vm: &BuyerDetailVm<'_>) -> Markup {
    let lead = vm.lead;
    let editable = vm.user.can_edit(lead);

    desktop_layout(
        &lead.fields.full_name,
        Some(vm.user),
        html! {
            main class="container" {
                p { a href="/buyers" { "← All leads" } }
                h1 { (lead.fields.full_name) }
                p class="muted" {
                    "Created " (lead.created_at.format("%Y-%m-%d %H:%M UTC"))
                    " · last updated " (lead.updated_at.format("%Y-%m-%d %H:%M UTC"))
                }

                @if vm.conflict {
                    div class="form-errors" role="alert" {
                        p { "Record changed, please refresh." }
                        p { a href=(format!("/buyers/{}", lead.id)) { "Load the latest version" } }
                    }
                }

                div class="grid two-col" {
                    section {
                        @if editable {
                            (lead_form(&LeadFormVm {
                                action: format!("/buyers/{}", lead.id),
                                values: &vm.values,
                                errors: vm.errors,
                                updated_at: Some(lead.updated_at),
                                submit_label: "Save changes",
                            }))
                        } @else {
                            p class="muted" { "Only the owner or an admin can edit this lead." }
                            dl {
                                dt { "Phone" } dd { (lead.fields.phone) }
                                dt { "Email" } dd { (lead.fields.email.as_deref().unwrap_or("—")) }
                                dt { "City" } dd { (lead.fields.city) }
                                dt { "Property" } dd { (lead.fields.property_type) }
                                dt { "Status" } dd { (lead.fields.status) }
                                dt { "Notes" } dd { (lead.fields.notes.as_deref().unwrap_or("—")) }
                            }
                        }
                    }

                    section class="card" {
                        h3 { "Recent changes" }
                        (history_list(vm.history))
                    }
                }
            }
        },
    )
}
