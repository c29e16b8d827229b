use crate::dashboard::{BadgeList, DashboardView, ReadyView};
use crate::logger::{FeedbackKind, LoggerView};
use crate::models::Category;
use std::fmt::Write as _;

const TRANSPORT_MODES: [&str; 4] = ["car", "bus", "train", "flight"];
const FOOD_TYPES: [&str; 5] = ["beef", "chicken", "dairy", "veg", "rice"];
const FOOD_UNITS: [&str; 3] = ["kg", "g", "serving"];

pub fn render_logger(view: &LoggerView) -> String {
    // Only a pending navigation reloads; a reload would drop unsent input.
    let refresh = if view.navigation_pending {
        r#"<meta http-equiv="refresh" content="1" />"#
    } else {
        ""
    };
    let feedback = match &view.feedback {
        Some(feedback) => {
            let class = match feedback.kind {
                FeedbackKind::Success => "success",
                FeedbackKind::Error => "error",
            };
            format!(
                r#"<div class="status {class} expiring" role="status">{}</div>"#,
                escape_html(&feedback.text)
            )
        }
        None => String::new(),
    };

    LOGGER_HTML
        .replace("{{STYLE}}", BASE_STYLE)
        .replace("{{REFRESH}}", refresh)
        .replace("{{TABS}}", &render_tabs(view.active_tab))
        .replace("{{FIELDS}}", &render_fields(view))
        .replace("{{FEEDBACK}}", &feedback)
        .replace("{{DISABLED}}", if view.submitting { "disabled" } else { "" })
        .replace(
            "{{BUTTON}}",
            if view.submitting { "Saving..." } else { "Log activity" },
        )
}

fn render_tabs(active: Category) -> String {
    let mut html = String::new();
    for tab in Category::ALL {
        let class = if tab == active { "tab active" } else { "tab" };
        let _ = write!(
            html,
            r#"<button class="{class}" type="submit" name="tab" value="{value}" formaction="/logger/tab">{label}</button>"#,
            value = tab.label(),
            label = capitalize(tab.label()),
        );
    }
    html
}

fn render_fields(view: &LoggerView) -> String {
    match view.active_tab {
        Category::Transport => format!(
            "{}{}",
            select_field("Mode", "mode", &TRANSPORT_MODES, &view.transport.mode),
            input_field("Distance (km)", "distance", &view.transport.distance),
        ),
        Category::Food => format!(
            "{}{}{}",
            select_field("Food", "category", &FOOD_TYPES, &view.food.category),
            input_field("Quantity", "quantity", &view.food.quantity),
            select_field("Unit", "unit", &FOOD_UNITS, &view.food.unit),
        ),
        Category::Energy => input_field("Electricity (kWh)", "kwh", &view.energy.kwh),
    }
}

fn select_field(label: &str, name: &str, options: &[&str], current: &str) -> String {
    let mut html = format!(
        r#"<label>{label}<select name="{name}"><option value="">Select...</option>"#
    );
    for option in options {
        let selected = if option.eq_ignore_ascii_case(current.trim()) {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            html,
            r#"<option value="{option}"{selected}>{}</option>"#,
            capitalize(option)
        );
    }
    html.push_str("</select></label>");
    html
}

fn input_field(label: &str, name: &str, value: &str) -> String {
    format!(
        r#"<label>{label}<input name="{name}" inputmode="decimal" value="{}" /></label>"#,
        escape_html(value)
    )
}

pub fn render_dashboard(view: &DashboardView) -> String {
    let body = match view {
        DashboardView::Loading => {
            r#"<p class="subtitle">Loading your footprint...</p>"#.to_string()
        }
        DashboardView::Failed { message } => format!(
            r#"<div class="status error" role="alert">{}</div>
      <form method="get" action="/dashboard"><button class="primary" type="submit">Reload</button></form>"#,
            escape_html(message)
        ),
        DashboardView::Ready(ready) => render_ready(ready),
    };

    DASHBOARD_HTML
        .replace("{{STYLE}}", BASE_STYLE)
        .replace("{{BODY}}", &body)
}

fn render_ready(view: &ReadyView) -> String {
    let total: f64 = view.proportions.iter().map(|slice| slice.value).sum();
    let mut segments = String::new();
    let mut legend = String::new();
    for slice in &view.proportions {
        let share = if total > 0.0 { slice.value / total * 100.0 } else { 0.0 };
        let _ = write!(
            segments,
            r#"<span class="segment" style="width: {share:.2}%; background: {color}" title="{label}"></span>"#,
            color = slice.color,
            label = slice.label,
        );
        let _ = write!(
            legend,
            r#"<li><span class="swatch" style="background: {color}"></span>{label}: {value:.2} kg</li>"#,
            color = slice.color,
            label = slice.label,
            value = slice.value,
        );
    }

    let peak = view
        .trend
        .iter()
        .map(|point| point.value)
        .fold(0.0_f64, f64::max);
    let mut trend = String::new();
    for point in &view.trend {
        let height = if peak > 0.0 { point.value / peak * 100.0 } else { 0.0 };
        let _ = write!(
            trend,
            r#"<div class="bar"><span style="height: {height:.1}%"></span><small>{}</small></div>"#,
            escape_html(&point.label)
        );
    }

    let badges = match &view.badges {
        BadgeList::Earned(names) => {
            let items: String = names
                .iter()
                .map(|name| format!("<li>{}</li>", escape_html(name)))
                .collect();
            format!(r#"<ul class="badges">{items}</ul>"#)
        }
        BadgeList::Placeholder(text) => {
            format!(r#"<p class="placeholder">{}</p>"#, escape_html(text))
        }
    };

    format!(
        r#"<section class="panel">
        <div class="stat">
          <span class="label">Eco score</span>
          <span class="value">{headline}</span>
          <div class="fill"><span style="width: {fill:.1}%"></span></div>
        </div>
        <div class="stat">
          <span class="label">Total today</span>
          <span class="value">{total_display} kg CO2e</span>
          <span class="hint">{recommendation}</span>
        </div>
      </section>
      <section>
        <h2>Breakdown</h2>
        <div class="stacked">{segments}</div>
        <ul class="legend">{legend}</ul>
      </section>
      <section>
        <h2>This week</h2>
        <div class="trend">{trend}</div>
      </section>
      <section>
        <h2>Badges</h2>
        {badges}
      </section>"#,
        headline = escape_html(&view.score.headline),
        fill = view.score.fill_percent,
        total_display = escape_html(&view.summary.total_emission),
        recommendation = escape_html(&view.summary.recommendation),
    )
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const LOGGER_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  {{REFRESH}}
  <title>Log Activity</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Log an activity</h1>
      <p class="subtitle">Record one trip, meal or energy reading at a time.</p>
    </header>
    <form class="fields" method="post" action="/logger/submit">
      {{FIELDS}}
      <button class="primary" type="submit" {{DISABLED}}>{{BUTTON}}</button>
      {{FEEDBACK}}
      <div class="tabs">{{TABS}}</div>
    </form>
    <a class="link" href="/dashboard">View dashboard</a>
  </main>
</body>
</html>
"#;

const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Carbon Dashboard</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Your footprint</h1>
      <p class="subtitle">Scores come from the carbon service for your last logged activity.</p>
    </header>
    {{BODY}}
    <a class="link" href="/">Log another activity</a>
  </main>
</body>
</html>
"#;

const BASE_STYLE: &str = r#"
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #eef6ec;
      --bg-2: #bfe3c0;
      --ink: #1f2a24;
      --accent: #2f9e5b;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.88);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * { box-sizing: border-box; }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #e3f4e1 60%, #f4faf2 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 24px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    h2 { font-size: 1rem; text-transform: uppercase; letter-spacing: 0.12em; color: #6b7a70; }

    .subtitle { margin: 0; color: #5f6a62; }

    .tabs { display: flex; gap: 8px; order: -2; }

    .tab {
      border: 1px solid rgba(47, 72, 88, 0.15);
      background: white;
      border-radius: 999px;
      padding: 8px 18px;
      font: inherit;
      cursor: pointer;
    }

    .tab.active { background: var(--accent-2); color: white; }

    .fields { display: grid; gap: 14px; }

    label { display: grid; gap: 6px; font-size: 0.9rem; color: #4d5a52; }

    input, select {
      font: inherit;
      padding: 10px 12px;
      border-radius: 12px;
      border: 1px solid rgba(47, 72, 88, 0.2);
    }

    .primary {
      font: inherit;
      font-weight: 600;
      border: none;
      border-radius: 16px;
      padding: 14px 18px;
      background: var(--accent);
      color: white;
      cursor: pointer;
    }

    .primary:disabled { opacity: 0.6; cursor: progress; }

    .status { border-radius: 14px; padding: 12px 16px; }
    .status.success { background: #dcf5e3; color: #1d6b3a; }
    .status.error { background: #fde2dd; color: #9b2c1c; }
    .fields .status { order: -1; }
    .status.expiring { animation: expire 0s linear 3s forwards; }

    @keyframes expire {
      to { visibility: hidden; height: 0; padding: 0; margin: 0; overflow: hidden; }
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 8px;
    }

    .stat .label { font-size: 0.85rem; text-transform: uppercase; letter-spacing: 0.12em; color: #7d8a80; }
    .stat .value { font-size: 1.7rem; font-weight: 600; color: var(--accent-2); }
    .stat .hint { color: #5f6a62; font-size: 0.9rem; }

    .fill { height: 10px; border-radius: 999px; background: #e5ede6; overflow: hidden; }
    .fill span { display: block; height: 100%; background: var(--accent); }

    .stacked { display: flex; height: 18px; border-radius: 999px; overflow: hidden; background: #e5ede6; }
    .segment { display: block; height: 100%; }

    .legend, .badges { list-style: none; padding: 0; margin: 8px 0 0; display: grid; gap: 6px; }
    .swatch { display: inline-block; width: 10px; height: 10px; border-radius: 3px; margin-right: 8px; }

    .trend { display: grid; grid-template-columns: repeat(7, 1fr); gap: 10px; height: 160px; align-items: end; }
    .bar { display: grid; gap: 6px; height: 100%; align-content: end; text-align: center; }
    .bar span { display: block; background: var(--accent-2); border-radius: 8px 8px 0 0; }

    .placeholder { color: #7d8a80; font-style: italic; }
    .link { color: var(--accent-2); }
"#;
