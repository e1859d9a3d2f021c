//! HTML fragments for the lookup pages. The landing page swaps fragments in
//! with htmx, so everything below the form renders server-side.
use crate::models::{Card, Notes};

/// Minimal escaping for text interpolated into markup.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Full landing page: project/user pickers posting into the result pane.
pub fn index_page(projects: &[String], users: &[String]) -> String {
    let project_options: String = projects
        .iter()
        .map(|p| format!("<option value=\"{0}\">{0}</option>", escape(p)))
        .collect();
    let user_options: String = users
        .iter()
        .map(|u| format!("<option value=\"{0}\">{0}</option>", escape(u)))
        .collect();

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>PAD Checker</title>
<script src="https://unpkg.com/htmx.org@1.9.12"></script>
</head>
<body>
<h1>PAD Checker</h1>
<form hx-post="/search" hx-target="#result">
  <label>Project
    <select name="project" required>{project_options}</select>
  </label>
  <label>User (optional)
    <select name="username">
      <option value=""></option>
      {user_options}
    </select>
  </label>
  <button type="submit">Find latest card</button>
  <button type="button" hx-post="/refresh-cache" hx-swap="none">Refresh data</button>
</form>
<div id="result"></div>
</body>
</html>
"##
    )
}

/// Result fragment: one card with its recent-cards context, or an error
/// line when the search came up empty.
pub fn card_result(
    card: Option<&Card>,
    username: Option<&str>,
    error: Option<&str>,
    recent_cards: &[Card],
) -> String {
    let mut html = String::from("<div class=\"card-result\">\n");

    if let Some(message) = error {
        html.push_str(&format!(
            "<p class=\"error\">{}</p>\n",
            escape(message)
        ));
    }

    if let Some(card) = card {
        if let Some(user) = username {
            html.push_str(&format!(
                "<p>Latest card for <strong>{}</strong>:</p>\n",
                escape(user)
            ));
        }
        html.push_str(&card_details(card));
        html.push_str(&newer_poll(&card.project_name, card.id));
    }

    if !recent_cards.is_empty() {
        html.push_str("<h3>Recent cards in this project</h3>\n<ul>\n");
        for recent in recent_cards {
            html.push_str(&format!(
                "<li><a hx-get=\"/card/{0}\" hx-target=\"#result\" href=\"#\">Card #{0}</a> \
                 &mdash; {1} ({2})</li>\n",
                recent.id,
                escape(&recent.sample_name),
                escape(&recent.date_of_creation),
            ));
        }
        html.push_str("</ul>\n");
    }

    html.push_str("</div>\n");
    html
}

/// Alert fragment shown when the project has a newer card than the one on
/// screen. An id match renders nothing at all.
pub fn newer_alert(project: &str, new_id: i64) -> String {
    format!(
        "<div class=\"newer-alert\">A newer card is available in {0}: \
         <a hx-get=\"/card/{new_id}\" hx-target=\"#result\" href=\"#\">Card #{new_id}</a></div>\n",
        escape(project),
    )
}

fn card_details(card: &Card) -> String {
    let mut html = format!(
        "<h2>Card #{}</h2>\n<dl>\n\
         <dt>Sample</dt><dd>{}</dd>\n\
         <dt>Project</dt><dd>{}</dd>\n\
         <dt>User</dt><dd>{}</dd>\n\
         <dt>Created</dt><dd>{}</dd>\n",
        card.id,
        escape(&card.sample_name),
        escape(&card.project_name),
        escape(&card.user_name),
        escape(&card.date_of_creation),
    );

    if let Some(sample_id) = card.sample_id {
        html.push_str(&format!("<dt>Sample ID</dt><dd>{sample_id}</dd>\n"));
    }
    if let Some(quantity) = card.quantity {
        html.push_str(&format!("<dt>Quantity</dt><dd>{quantity}</dd>\n"));
    }
    if let Some(camera) = &card.camera_type {
        html.push_str(&format!("<dt>Camera</dt><dd>{}</dd>\n", escape(camera)));
    }
    html.push_str("</dl>\n");

    if let Some(image_url) = &card.image_url {
        html.push_str(&format!(
            "<img src=\"{}\" alt=\"card image\" width=\"320\">\n",
            escape(image_url)
        ));
    }

    if let Some(notes) = &card.notes {
        html.push_str(&notes_details(notes));
    }

    html
}

fn notes_details(notes: &Notes) -> String {
    // unparsed notes are still worth showing, just verbatim
    if let Some(raw) = &notes.raw {
        return format!("<h3>Notes</h3>\n<pre>{}</pre>\n", escape(raw));
    }

    let mut rows = String::new();
    let mut push_row = |label: &str, value: Option<String>| {
        if let Some(value) = value {
            rows.push_str(&format!(
                "<tr><th>{label}</th><td>{}</td></tr>\n",
                escape(&value)
            ));
        }
    };

    push_row("Phone", notes.phone_id.clone());
    push_row("User", notes.user.clone());
    push_row("App", notes.app_type.clone());
    push_row("Build", notes.build.map(|b| b.to_string()));
    push_row("Neural net", notes.neural_net.clone());
    push_row("Predicted drug", notes.predicted_drug.clone());
    push_row("Prediction score", notes.prediction_score.map(|s| s.to_string()));
    push_row("Safe", notes.safe_status.clone());
    push_row("Quantity (NN)", notes.quantity_nn.map(|q| q.to_string()));
    push_row("Quantity (PLS)", notes.quantity_pls.map(|q| q.to_string()));
    push_row("PLS used", notes.pls_used.map(|p| p.to_string()));
    push_row("Notes", notes.notes_text.clone());

    if rows.is_empty() {
        return String::new();
    }

    format!("<h3>Notes</h3>\n<table>\n{rows}</table>\n")
}

fn newer_poll(project: &str, current_id: i64) -> String {
    format!(
        "<div hx-get=\"/check-newer?project={}&current_id={current_id}\" \
         hx-trigger=\"every 30s\" hx-swap=\"innerHTML\"></div>\n",
        urlencode(project),
    )
}

fn urlencode(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char);
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}
