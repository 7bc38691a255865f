//! Server-rendered HTML for the session-authenticated pages.

use chrono::Datelike;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::fmt::Write as _;

use super::session::Flash;
use crate::db::{RequestLog, TrackedFile, User};

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:0;color:#222}\
header,footer{background:#2d3a4a;color:#fff;padding:.75rem 1.5rem}\
header a{color:#fff;margin-right:1rem}main{padding:1.5rem;max-width:60rem}\
.flash{padding:.5rem 1rem;margin-bottom:.5rem;border-radius:4px}\
.flash-success{background:#d4edda}.flash-info{background:#d1ecf1}.flash-danger{background:#f8d7da}\
form label{display:block;margin-top:.5rem}table{border-collapse:collapse;width:100%}\
td,th{border-bottom:1px solid #ddd;padding:.25rem .5rem;text-align:left}";

/// Wraps `body` (already escaped) in the site chrome.
#[must_use]
pub fn layout(title: &str, user: Option<&User>, flashes: &[Flash], body: &str) -> String {
    let mut nav = String::from(r#"<a href="/">Home</a>"#);
    match user {
        Some(user) => {
            let _ = write!(
                nav,
                r#"<a href="/dashboard">Dashboard</a><a href="/auth/profile">{}</a><a href="/auth/logout">Log out</a>"#,
                text(&user.username)
            );
        }
        None => {
            nav.push_str(r#"<a href="/auth/login">Log in</a><a href="/auth/register">Register</a>"#);
        }
    }

    let mut flash_html = String::new();
    for flash in flashes {
        let _ = write!(
            flash_html,
            r#"<div class="flash {}">{}</div>"#,
            flash.level.css_class(),
            text(&flash.message)
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | FileWriter</title>
<style>{STYLE}</style>
</head>
<body>
<header><nav>{nav}</nav></header>
<main>
{flash_html}
{body}
</main>
<footer>&copy; {year} FileWriter</footer>
</body>
</html>"#,
        title = text(title),
        year = chrono::Utc::now().year(),
    )
}

#[must_use]
pub fn index_body(user: Option<&User>) -> String {
    user.map_or_else(
        || {
            String::from(
                r#"<h1>FileWriter</h1>
<p>File operations for automation agents, with an audited API.</p>
<p><a href="/auth/login">Log in</a> or <a href="/auth/register">create an account</a>.</p>"#,
            )
        },
        |user| {
            format!(
                r#"<h1>Welcome back, {}</h1>
<p><a href="/dashboard">Open the dashboard</a> to see tracked files and recent API activity.</p>"#,
                text(&user.username)
            )
        },
    )
}

#[must_use]
pub fn dashboard_body(
    user: &User,
    user_count: Option<u64>,
    files: &[TrackedFile],
    logs: &[RequestLog],
) -> String {
    let mut body = format!("<h1>Dashboard</h1><p>Signed in as {}.</p>", text(&user.username));
    if let Some(count) = user_count {
        let _ = write!(body, "<p>Registered users: {count}</p>");
    }

    body.push_str("<h2>Tracked files</h2>");
    if files.is_empty() {
        body.push_str("<p>No files have been written through the API yet.</p>");
    } else {
        body.push_str("<table><tr><th>File</th><th>Last modified</th><th>By</th></tr>");
        for file in files {
            let _ = write!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                text(&file.filename),
                text(&file.last_modified),
                text(&file.modified_by)
            );
        }
        body.push_str("</table>");
    }

    body.push_str("<h2>Recent API requests</h2>");
    if logs.is_empty() {
        body.push_str("<p>No API requests recorded.</p>");
    } else {
        body.push_str(
            "<table><tr><th>Time</th><th>Method</th><th>Endpoint</th><th>Status</th><th>IP</th></tr>",
        );
        for log in logs {
            let _ = write!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                text(&log.timestamp),
                text(&log.method),
                text(&log.endpoint),
                log.status_code,
                text(log.ip_address.as_deref().unwrap_or("-"))
            );
        }
        body.push_str("</table>");
    }

    body
}

#[must_use]
pub fn register_body(username: &str, email: &str) -> String {
    format!(
        r#"<h1>Register</h1>
<form method="post" action="/auth/register">
<label>Username <input name="username" value="{}" required></label>
<label>Email <input type="email" name="email" value="{}" required></label>
<label>Password <input type="password" name="password" required></label>
<label>Confirm password <input type="password" name="confirm_password" required></label>
<button type="submit">Register</button>
</form>
<p>Already registered? <a href="/auth/login">Log in</a>.</p>"#,
        attr(username),
        attr(email)
    )
}

#[must_use]
pub fn login_body(email: &str, next: Option<&str>) -> String {
    let action = next.map_or_else(
        || "/auth/login".to_string(),
        |next| format!("/auth/login?next={}", urlencoding::encode(next)),
    );

    format!(
        r#"<h1>Log in</h1>
<form method="post" action="{}">
<label>Email <input type="email" name="email" value="{}" required></label>
<label>Password <input type="password" name="password" required></label>
<label><input type="checkbox" name="remember" value="1"> Remember me</label>
<button type="submit">Log in</button>
</form>
<p>No account? <a href="/auth/register">Register</a>.</p>"#,
        attr(&action),
        attr(email)
    )
}

#[must_use]
pub fn profile_body(user: &User) -> String {
    format!(
        r#"<h1>Profile</h1>
<table>
<tr><th>Username</th><td>{}</td></tr>
<tr><th>Email</th><td>{}</td></tr>
<tr><th>Member since</th><td>{}</td></tr>
<tr><th>Role</th><td>{}</td></tr>
</table>
<h2>Change password</h2>
<form method="post" action="/auth/change_password">
<label>Current password <input type="password" name="current_password" required></label>
<label>New password <input type="password" name="new_password" required></label>
<label>Confirm new password <input type="password" name="confirm_password" required></label>
<button type="submit">Change password</button>
</form>"#,
        text(&user.username),
        text(&user.email),
        text(&user.created_at),
        if user.is_admin { "Administrator" } else { "User" }
    )
}

#[must_use]
pub fn error_body(message: &str) -> String {
    format!(
        r#"<h1>{}</h1><p><a href="/">Return home</a></p>"#,
        text(message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::session::FlashLevel;

    fn user() -> User {
        User {
            id: 1,
            username: "<amaru>".to_string(),
            email: "amaru@example.com".to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            is_active: true,
            is_admin: false,
        }
    }

    #[test]
    fn test_layout_escapes_and_shows_year() {
        let flashes = [Flash {
            level: FlashLevel::Danger,
            message: "<b>bad</b>".to_string(),
        }];
        let page = layout("Home", Some(&user()), &flashes, "<p>hi</p>");

        assert!(page.contains("&lt;amaru&gt;"));
        assert!(page.contains("&lt;b&gt;bad&lt;/b&gt;"));
        assert!(page.contains("flash-danger"));
        assert!(page.contains("<p>hi</p>"));
        assert!(page.contains(&chrono::Utc::now().year().to_string()));
        assert!(page.contains("/auth/logout"));
    }

    #[test]
    fn test_login_form_keeps_next() {
        let body = login_body("a@b.c", Some("/dashboard"));
        assert!(body.contains("/auth/login?next=%2Fdashboard"));
        assert!(!login_body("", None).contains("next="));
    }
}
