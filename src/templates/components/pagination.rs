use crate::domain::query::{LeadFilter, Pagination};
use maud::{html, Markup};

pub fn pagination_nav(p: &Pagination, filter: &LeadFilter) -> Markup {
    let href = |page: i64| format!("/buyers?{}", filter.query_string(Some(page)));

    html! {
        nav class="pagination" aria-label="Pagination" {
            @if p.has_prev() {
                a href=(href(p.page - 1)) rel="prev" { "← Previous" }
            }
            span { "Page " (p.page) " of " (p.total_pages.max(1)) " · " (p.total) " leads" }
            @if p.has_next() {
                a href=(href(p.page + 1)) rel="next" { "Next →" }
            }
        }
    }
}
