//! services/api/src/web/pages.rs
//!
//! HTML pages served for every GET route and for the chart result.
//!
//! Pages are plain functions from view data to markup. Forms tagged
//! `json-form` are submitted with `fetch` and report the JSON envelope
//! returned by the POST endpoints inline.

use crate::markup::escape;
use axum::response::Html;
use habit_tracker_core::domain::Habit;

const FORM_SCRIPT: &str = r#"<script>
document.querySelectorAll("form.json-form").forEach(function (form) {
  form.addEventListener("submit", async function (event) {
    event.preventDefault();
    var feedback = form.querySelector(".feedback");
    var response = await fetch(form.action, {
      method: "POST",
      body: new URLSearchParams(new FormData(form)),
      credentials: "same-origin"
    });
    var body = await response.json();
    var text = body.success ? body.message : (body.errors || [body.error]).join(" ");
    feedback.textContent = text;
    feedback.className = "feedback " + (body.success ? "ok" : "failed");
    if (body.success && form.dataset.next) {
      window.location = form.dataset.next;
    }
  });
});
</script>"#;

fn layout(title: &str, authenticated: bool, body: &str) -> Html<String> {
    let nav = if authenticated {
        r#"<a href="/">Habits</a> <a href="/add">Add</a> <a href="/update">Log entry</a> <a href="/remove">Remove</a> <a href="/logout">Log out</a>"#
    } else {
        r#"<a href="/login">Log in</a> <a href="/register">Register</a>"#
    };
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Habit Tracker: {title}</title>
</head>
<body>
<nav>{nav}</nav>
<main>
<h1>{title}</h1>
{body}
</main>
{FORM_SCRIPT}
</body>
</html>"#,
        title = escape(title),
    ))
}

fn habit_options(habits: &[Habit]) -> String {
    habits
        .iter()
        .map(|h| {
            let name = escape(&h.name);
            format!(r#"<option value="{name}">{name}</option>"#)
        })
        .collect::<Vec<_>>()
        .join("")
}

pub fn login_page() -> Html<String> {
    layout(
        "Log In",
        false,
        r#"<form class="json-form" action="/login" method="post" data-next="/">
<input name="username" placeholder="Username" autocomplete="username" autofocus>
<input name="password" type="password" placeholder="Password" autocomplete="current-password">
<button type="submit">Log In</button>
<p class="feedback"></p>
</form>"#,
    )
}

pub fn register_page() -> Html<String> {
    layout(
        "Register",
        false,
        r#"<form class="json-form" action="/register" method="post" data-next="/login">
<input name="username" placeholder="Username" autocomplete="username" autofocus>
<input name="password" type="password" placeholder="Password" autocomplete="new-password">
<input name="confirmation" type="password" placeholder="Confirm password" autocomplete="new-password">
<button type="submit">Register</button>
<p class="feedback"></p>
</form>"#,
    )
}

pub fn index_page(habits: &[Habit]) -> Html<String> {
    let body = if habits.is_empty() {
        r#"<p>No habits yet. <a href="/add">Add one</a> to start tracking.</p>"#.to_string()
    } else {
        let items = habits
            .iter()
            .map(|h| format!("<li>{}</li>", escape(&h.name)))
            .collect::<Vec<_>>()
            .join("");
        format!(
            r#"<ul>{items}</ul>
<form action="/" method="post">
<select name="habit_name">{options}</select>
<button type="submit">Plot</button>
</form>"#,
            options = habit_options(habits)
        )
    };
    layout("Your Habits", true, &body)
}

pub fn add_page() -> Html<String> {
    layout(
        "Add Habit",
        true,
        r#"<form class="json-form" action="/add" method="post">
<input name="habit_name" placeholder="Habit name" autofocus>
<button type="submit">Add</button>
<p class="feedback"></p>
</form>"#,
    )
}

pub fn remove_page(habits: &[Habit]) -> Html<String> {
    let body = format!(
        r#"<form class="json-form" action="/remove" method="post" data-next="/remove">
<select name="habit_name">{}</select>
<button type="submit">Remove</button>
<p class="feedback"></p>
</form>"#,
        habit_options(habits)
    );
    layout("Remove Habit", true, &body)
}

pub fn update_page(habits: &[Habit]) -> Html<String> {
    let body = format!(
        r#"<form class="json-form" action="/update" method="post">
<select name="habit_name">{}</select>
<input name="duration" type="number" min="0" step="any" placeholder="Duration (minutes)">
<input name="timestamp" type="date">
<button type="submit">Log</button>
<p class="feedback"></p>
</form>"#,
        habit_options(habits)
    );
    layout("Log Habit Entry", true, &body)
}

/// What the graph page shows: a rendered chart, or the reason there is none.
pub enum GraphView {
    Chart { habit_name: String, data_uri: String },
    Error(String),
}

pub fn graph_page(view: &GraphView) -> Html<String> {
    let body = match view {
        GraphView::Chart {
            habit_name,
            data_uri,
        } => format!(
            r#"<img src="{}" alt="Duration of {} over time">"#,
            escape(data_uri),
            escape(habit_name)
        ),
        GraphView::Error(message) => format!(r#"<p class="error">{}</p>"#, escape(message)),
    };
    layout("Habit Graph", true, &body)
}
