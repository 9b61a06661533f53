use crate::auth::CurrentUser;
use crate::domain::lead::LeadRecord;
use crate::domain::query::{LeadFilter, LeadPage};
use crate::templates::components::{filters_form, pagination_nav};
use crate::templates::desktop_layout;
use maud::{html, Markup};

fn budget(lead: &LeadRecord) -> String {
    match (lead.fields.budget_min, lead.fields.budget_max) {
        (Some(min), Some(max)) => format!("₹{min} – ₹{max}"),
        (Some(min), None) => format!("from ₹{min}"),
        (None, Some(max)) => format!("up to ₹{max}"),
        (None, None) => "—".to_string(),
    }
}

pub fn buyers_list_page(user: &CurrentUser, page: &LeadPage, filter: &LeadFilter) -> Markup {
    let export_qs = filter.query_string(None);

    desktop_layout(
        "Leads",
        Some(user),
        html! {
            main class="container" {
                div class="flex items-center justify-between" {
                    h1 { "Buyer leads" }
                    a href="/buyers/new" class="button primary" { "New lead" }
                }

                (filters_form(filter))

                @if page.buyers.is_empty() {
                    p class="muted" { "No leads match these filters." }
                } @else {
                    table class="leads" {
                        thead {
                            tr {
                                th { "Name" }
                                th { "Phone" }
                                th { "City" }
                                th { "Property" }
                                th { "Budget" }
                                th { "Timeline" }
                                th { "Status" }
                                th { "Updated" }
                            }
                        }
                        tbody {
                            @for lead in &page.buyers {
                                tr {
                                    td { a href=(format!("/buyers/{}", lead.id)) { (lead.fields.full_name) } }
                                    td { (lead.fields.phone) }
                                    td { (lead.fields.city) }
                                    td {
                                        (lead.fields.property_type)
                                        @if let Some(bhk) = lead.fields.bhk { " · " (bhk) " BHK" }
                                    }
                                    td { (budget(lead)) }
                                    td { (lead.fields.timeline) }
                                    td { span class="badge" { (lead.fields.status) } }
                                    td { (lead.updated_at.format("%Y-%m-%d %H:%M")) }
                                }
                            }
                        }
                    }
                }

                (pagination_nav(&page.pagination, filter))

                section class="card" {
                    h3 { "Export" }
                    p {
                        a href=(format!("/api/buyers/export?{export_qs}")) { "Download CSV" }
                        " · "
                        a href=(format!("/api/buyers/export.xlsx?{export_qs}")) { "Download XLSX" }
                    }
                    p class="microcopy" { "Exports include every lead matching the current filters." }
                }

                section class="card" {
                    h3 { "Import CSV" }
                    form method="post" action="/buyers/import" {
                        label for="csv" class="sr-only" { "CSV data" }
                        textarea id="csv" name="csv" rows="6" placeholder="fullName,email,phone,city,propertyType,bhk,purpose,budgetMin,budgetMax,timeline,source,notes,tags,status" {}
                        button type="submit" { "Import" }
                    }
                }
            }
        },
    )
}
