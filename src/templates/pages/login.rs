use crate::templates::{components::sign_in_form, desktop_layout};
use maud::{html, Markup};

pub fn login_page() -> Markup {
    desktop_layout(
        "Sign in",
        None,
        html! {
            main class="container narrow" {
                h1 { "Sign in" }
                p class="lead" {
                    "No password: enter your email and open the link we send. First time here? The same link creates your account."
                }

                (sign_in_form())
            }
        },
    )
}
