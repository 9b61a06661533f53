use crate::auth::CurrentUser;
use maud::{html, Markup, DOCTYPE};

pub fn desktop_layout(title: &str, user: Option<&CurrentUser>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " · Buyer Leads" }
                link rel="stylesheet" href="/static/main.css";
                script src="/static/htmx.js" defer {};
            }
            body {
                header class="flex items-center justify-between px-6 py-3 shadow" {
                    h3 { a href="/buyers" { "Buyer Leads" } }
                    nav {
                        ul {
                            li { a href="/buyers" { "Leads" } }
                            li { a href="/buyers/new" { "New lead" } }
                        }
                    }

                    @match user {
                        Some(u) => {
                            div class="inline" {
                                span class="text-sm" {
                                    (u.email)
                                    @if u.is_admin() { " (admin)" }
                                }
                                form method="post" action="/logout" class="inline" {
                                    button type="submit" class="link" { "Sign out" }
                                }
                            }
                        }
                        None => {
                            a href="/login" class="text-base font-medium hover:text-blue-600" { "Sign in" }
                        }
                    }
                }
                (content)
            }
        }
    }
}
