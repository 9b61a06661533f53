pub mod error;
pub mod filters;
pub mod history;
pub mod lead_form;
pub mod pagination;
pub mod sign_in;

pub use error::error_page;
pub use filters::filters_form;
pub use history::history_list;
pub use pagination::pagination_nav;
pub use sign_in::sign_in_form;

use maud::{html, Markup};

/// A `<select>` over fixed labels. `blank` adds a leading empty option.
pub fn select(name: &str, options: &[&'static str], current: &str, blank: Option<&str>) -> Markup {
    html! {
        select name=(name) id=(name) {
            @if let Some(text) = blank {
                option value="" selected[current.is_empty()] { (text) }
            }
            @for opt in options {
                option value=(opt) selected[current == *opt] { (opt) }
            }
        }
    }
}

pub fn labels<T: Copy>(all: &[T], as_str: fn(T) -> &'static str) -> Vec<&'static str> {
    all.iter().map(|v| as_str(*v)).collect()
}
