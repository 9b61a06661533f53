use maud::{html, Markup, DOCTYPE};

/// Standalone error page; it does not need a signed-in user.
pub fn error_page(status: u16, message: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "Error " (status) }
                link rel="stylesheet" href="/static/main.css";
            }
            body class="container narrow" {
                h1 { "Error " (status) }
                p { (message) }
                p { a href="/buyers" { "← Back to leads" } }
            }
        }
    }
}
