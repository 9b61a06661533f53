use maud::{html, Markup};

/// Fragment swapped in place of the sign-in form.
pub fn check_email_content(email: &str) -> Markup {
    html! {
        div class="text-center py-8 px-4 fade-in" {
            h3 class="text-lg leading-6 font-medium" { "Check your email" }

            div class="mt-2" {
                p class="text-sm" {
                    "We sent a sign-in link to "
                    strong { (email) }
                    "."
                }
                p class="text-sm mt-2" {
                    "The link works once and expires shortly."
                }
            }

            div class="mt-6" {
                a href="/login" class="text-sm font-medium" { "Try with a different email" }
            }
        }
    }
}
