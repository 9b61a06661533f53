use maud::{html, Markup};

/// Email-only sign-in. With htmx loaded the reply replaces `#sign-in-result`.
pub fn sign_in_form() -> Markup {
    html! {
        form method="post" action="/auth/request-link"
            hx-post="/auth/request-link" hx-target="#sign-in-result" hx-swap="innerHTML"
            class="sign-in"
        {
            label for="email" { "Work email" }
            input type="email" id="email" name="email" placeholder="agent@example.com" autocomplete="email" required;
            button type="submit" class="primary" { "Email me a link" }
        }
        div id="sign-in-result" {}
    }
}
