use crate::auth::CurrentUser;
use crate::spreadsheets::ImportReport;
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub fn import_report_page(user: &CurrentUser, report: &ImportReport) -> Markup {
    desktop_layout(
        "Import results",
        Some(user),
        html! {
            main class="container narrow" {
                h1 { "Import results" }
                p { strong { (report.inserted) } " leads imported." }

                @if !report.errors.is_empty() {
                    h3 { (report.errors.len()) " rows skipped" }
                    table {
                        thead { tr { th { "Row" } th { "Problems" } } }
                        tbody {
                            @for row in &report.errors {
                                tr {
                                    td { (row.row) }
                                    td {
                                        ul {
                                            @for e in &row.errors { li { (e) } }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }

                p { a href="/buyers" { "← Back to leads" } }
            }
        },
    )
}
