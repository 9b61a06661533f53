use crate::auth::magic::request_magic_link;
use crate::auth::Role;
use crate::router::handle;
use crate::tests::utils::{body_string, get, now_unix, post_form, sign_in, test_state};

#[test]
fn login_page_loads_successfully() {
    let state = test_state();

    let resp = handle(get("/login", None), &state).expect("Failed to handle request");
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("Sign in"));
    assert!(body.contains("form"));
}

#[test]
fn request_link_returns_partial_html_for_htmx() {
    let state = test_state();
    let email = "test@example.com";

    let resp = handle(post_form("/auth/request-link", None, &[("email", email)]), &state)
        .expect("Failed to handle request");
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("Check your email"));
    assert!(body.contains(email));
    // A fragment, not a full page.
    assert!(!body.contains("<html"));
}

#[test]
fn magic_link_sets_session_cookie_and_redirects() {
    let state = test_state();
    let issued = request_magic_link(&state.db, state.magic_link_config(), "c@d.com", now_unix())
        .unwrap();

    let resp = handle(get(&issued.link, None), &state).unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers().get("Location").unwrap(), "/buyers");

    let cookie = resp
        .headers()
        .get("Set-Cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("HttpOnly"));

    // The new session opens the leads page.
    let session = cookie.split(';').next().unwrap();
    let page = handle(get("/buyers", Some(session)), &state).unwrap();
    assert_eq!(page.status(), 200);
    assert!(body_string(page).contains("c@d.com"));

    // The link works only once.
    let again = handle(get(&issued.link, None), &state);
    assert!(matches!(again, Err(crate::errors::ServerError::Unauthorized(_))));
}

#[test]
fn logout_revokes_the_session() {
    let state = test_state();
    let (_, cookie) = sign_in(&state, "bye@example.com", Role::User);

    let resp = handle(post_form("/logout", Some(&cookie), &[]), &state).unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers().get("Location").unwrap(), "/login");

    let after = handle(get("/buyers", Some(&cookie)), &state);
    assert!(matches!(after, Err(crate::errors::ServerError::Unauthorized(_))));
}
