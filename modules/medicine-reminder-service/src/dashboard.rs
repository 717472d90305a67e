//! Read-only dashboard page listing today's reminders.

use crate::routes::AppState;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use medicine_reminder_types::{Reminder, ReminderStatus, TimeOfDay};
use std::sync::Arc;

pub async fn dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let now = TimeOfDay::now_local();
    let stats = state.db.get_stats().ok();
    let rows = render_list(state.db.list_reminders(), &now);
    let uptime = state.start_time.elapsed().as_secs();

    let stats_html = if let Some(s) = &stats {
        format!(
            r#"<div class="stats">
                <div class="stat"><span class="val">{}</span><span class="lbl">Medicines</span></div>
                <div class="stat green"><span class="val">{}</span><span class="lbl">Taken</span></div>
                <div class="stat yellow"><span class="val">{}</span><span class="lbl">Pending</span></div>
            </div>"#,
            s.total, s.taken, s.pending
        )
    } else {
        "<p>No stats available.</p>".to_string()
    };

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Medicine Reminder</title>
<style>
  * {{ margin: 0; padding: 0; box-sizing: border-box; }}
  body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: #eef2ff; color: #1f2937; padding: 20px; }}
  h1 {{ color: #3730a3; margin-bottom: 8px; }}
  .meta {{ color: #6b7280; font-size: 0.85em; margin-bottom: 20px; }}
  .stats {{ display: flex; gap: 16px; margin-bottom: 24px; flex-wrap: wrap; }}
  .stat {{ background: #fff; border: 1px solid #e5e7eb; border-radius: 8px; padding: 16px 24px; text-align: center; min-width: 140px; }}
  .stat .val {{ display: block; font-size: 2em; font-weight: bold; color: #4338ca; }}
  .stat.green .val {{ color: #16a34a; }}
  .stat.yellow .val {{ color: #d97706; }}
  .stat .lbl {{ display: block; font-size: 0.85em; color: #6b7280; margin-top: 4px; }}
  table {{ width: 100%; border-collapse: collapse; background: #fff; }}
  th {{ color: #6b7280; text-align: left; padding: 8px 12px; font-size: 0.85em; text-transform: uppercase; border-bottom: 1px solid #e5e7eb; }}
  td {{ padding: 8px 12px; border-bottom: 1px solid #f3f4f6; font-size: 0.9em; }}
  .badge {{ padding: 2px 8px; border-radius: 12px; font-size: 0.8em; }}
  .taken {{ background: #dcfce7; color: #166534; }}
  .due {{ background: #fee2e2; color: #991b1b; font-weight: bold; }}
  .pending {{ background: #fef3c7; color: #92400e; }}
</style>
</head>
<body>
  <h1>Medicine Reminder</h1>
  <p class="meta">Current time: {now} &middot; Uptime: {uptime}</p>

  {stats_html}

  <table>
    <thead><tr><th>Time</th><th>Medicine</th><th>Notes</th><th>Status</th></tr></thead>
    <tbody>{rows}</tbody>
  </table>

  <script>setTimeout(() => location.reload(), 15000);</script>
</body>
</html>"#,
        now = now,
        uptime = format_uptime(uptime),
        stats_html = stats_html,
        rows = rows,
    );

    ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html)
}

/// Table body for a store read, sorted by time. A failed read becomes an error row.
fn render_list(reminders: Result<Vec<Reminder>, String>, now: &TimeOfDay) -> String {
    match reminders {
        Ok(mut reminders) => {
            reminders.sort_by_key(|r| r.time);
            render_rows(&reminders, now)
        }
        Err(e) => {
            log::error!("[REMINDER_STORE] Failed to load reminders: {}", e);
            "<tr><td colspan=\"4\">Failed to load reminders</td></tr>".to_string()
        }
    }
}

fn render_rows(reminders: &[Reminder], now: &TimeOfDay) -> String {
    if reminders.is_empty() {
        return "<tr><td colspan=\"4\">No medicine reminders yet.</td></tr>".to_string();
    }

    let mut rows = String::new();
    for r in reminders {
        let status = r.status_at(now);
        let class = match status {
            ReminderStatus::Taken => "taken",
            ReminderStatus::DueNow => "due",
            ReminderStatus::Pending => "pending",
        };
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td><span class=\"badge {}\">{}</span></td></tr>\n",
            r.time,
            escape_html(&r.medicine_name),
            escape_html(r.notes.as_deref().unwrap_or("-")),
            class,
            status.label(),
        ));
    }
    rows
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn format_uptime(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
