use crate::models::{DataSource, Quantity, TrendPoint};
use crate::stats::progress_label;
use crate::workflow::{AdminTable, Dashboard};

#[derive(Debug, Clone)]
pub enum Notice {
    Success(String),
    Error(String),
}

pub fn render_index(dashboard: &Dashboard, notice: Option<&Notice>) -> String {
    let chart = trend_chart(&dashboard.trend).unwrap_or_default();
    let percent = dashboard.progress_ratio * 100.0;
    page(
        "Coffee Grounds Pickup",
        &INDEX_BODY
            .replace("{{COUNT}}", &dashboard.metrics.request_count.to_string())
            .replace("{{TOTAL}}", &format_kg(dashboard.metrics.total_kg))
            .replace("{{CAFES}}", &dashboard.metrics.distinct_cafes.to_string())
            .replace("{{GOAL}}", &format_kg(dashboard.goal_kg))
            .replace("{{PERCENT_WIDTH}}", &format!("{percent:.1}"))
            .replace("{{PERCENT}}", &progress_label(dashboard.progress_ratio))
            .replace("{{CHART}}", &chart)
            .replace("{{NOTICE}}", &notice_html(notice)),
    )
}

pub fn render_admin_login(error: Option<&str>) -> String {
    let notice = error.map(|message| Notice::Error(message.to_string()));
    page(
        "Admin · Coffee Grounds Pickup",
        &ADMIN_LOGIN_BODY.replace("{{NOTICE}}", &notice_html(notice.as_ref())),
    )
}

pub fn render_admin_grid(table: &AdminTable, password: &str) -> String {
    let rows: String = table
        .records
        .iter()
        .map(|record| {
            format!(
                concat!(
                    "<tr>",
                    "<td><input name=\"cafe_name\" value=\"{}\" /></td>",
                    "<td><input name=\"quantity_kg\" value=\"{}\" /></td>",
                    "<td><input name=\"requested_at\" value=\"{}\" /></td>",
                    "<td><button type=\"button\" class=\"btn-ghost\" data-remove>Remove</button></td>",
                    "</tr>"
                ),
                escape_html(&record.cafe_name),
                escape_html(&quantity_text(&record.quantity_kg)),
                escape_html(&record.requested_at),
            )
        })
        .collect();

    let source_note = match table.source {
        DataSource::Unavailable => {
            notice_html(Some(&Notice::Error(
                "The sheet could not be read. Saving will replace it with these rows.".to_string(),
            )))
        }
        _ => String::new(),
    };

    page(
        "Admin · Coffee Grounds Pickup",
        &ADMIN_GRID_BODY
            .replace("{{NOTICE}}", &source_note)
            .replace("{{PASSWORD}}", &escape_html(password))
            .replace(
                "{{REVISION}}",
                &escape_html(table.revision.as_ref().map_or("", |revision| revision.as_str())),
            )
            .replace("{{COUNT}}", &table.records.len().to_string())
            .replace("{{ROWS}}", &rows),
    )
}

/// A bar per day; `None` when there is nothing to draw.
pub fn trend_chart(points: &[TrendPoint]) -> Option<String> {
    if points.is_empty() {
        return None;
    }

    const WIDTH: f64 = 600.0;
    const HEIGHT: f64 = 240.0;
    const PAD_X: f64 = 44.0;
    const PAD_TOP: f64 = 20.0;
    const PAD_BOTTOM: f64 = 34.0;

    let max = points
        .iter()
        .map(|point| point.total_kg)
        .fold(0.0_f64, f64::max)
        .max(1.0);
    let plot_height = HEIGHT - PAD_TOP - PAD_BOTTOM;
    let slot = (WIDTH - PAD_X * 2.0) / points.len() as f64;
    let bar_width = (slot * 0.6).max(2.0);
    let label_every = points.len().div_ceil(12);

    let mut svg = format!(
        "<svg class=\"trend\" viewBox=\"0 0 {WIDTH} {HEIGHT}\" role=\"img\" aria-label=\"Pickup quantity per day\">"
    );
    for tick in 0..=4 {
        let value = max * f64::from(tick) / 4.0;
        let y = HEIGHT - PAD_BOTTOM - plot_height * f64::from(tick) / 4.0;
        svg.push_str(&format!(
            "<line class=\"grid\" x1=\"{PAD_X}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" />\
             <text class=\"axis\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">{}</text>",
            WIDTH - PAD_X,
            PAD_X - 8.0,
            y + 4.0,
            format_kg(value),
        ));
    }
    for (index, point) in points.iter().enumerate() {
        let height = plot_height * point.total_kg / max;
        let x = PAD_X + slot * index as f64 + (slot - bar_width) / 2.0;
        let y = HEIGHT - PAD_BOTTOM - height;
        svg.push_str(&format!(
            "<rect class=\"bar\" x=\"{x:.1}\" y=\"{y:.1}\" width=\"{bar_width:.1}\" height=\"{height:.1}\" rx=\"4\"><title>{} · {} kg</title></rect>",
            point.date,
            format_kg(point.total_kg),
        ));
        if index % label_every == 0 {
            svg.push_str(&format!(
                "<text class=\"axis\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>",
                x + bar_width / 2.0,
                HEIGHT - PAD_BOTTOM + 18.0,
                point.date.format("%m-%d"),
            ));
        }
    }
    svg.push_str("</svg>");
    Some(svg)
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn format_kg(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

fn quantity_text(quantity: &Quantity) -> String {
    match quantity {
        Quantity::Number(number) => number.to_string(),
        Quantity::Text(text) => text.clone(),
        Quantity::Missing => String::new(),
    }
}

fn notice_html(notice: Option<&Notice>) -> String {
    match notice {
        Some(Notice::Success(message)) => {
            format!("<p class=\"notice\" data-type=\"ok\">{}</p>", escape_html(message))
        }
        Some(Notice::Error(message)) => {
            format!("<p class=\"notice\" data-type=\"error\">{}</p>", escape_html(message))
        }
        None => String::new(),
    }
}

fn page(title: &str, body: &str) -> String {
    PAGE_HTML
        .replace("{{TITLE}}", &escape_html(title))
        .replace("{{BODY}}", body)
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="ko">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    :root {
      --bg: #f4ede4;
      --ink: #2e2119;
      --muted: #7b6a5d;
      --accent: #8a5a3b;
      --accent-soft: #e8d6c3;
      --card: #fffaf4;
      --danger: #b23a2a;
      --ok: #3f7a4a;
      --shadow: 0 18px 42px rgba(46, 33, 25, 0.14);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(160deg, var(--bg), #eadbc8 70%);
      color: var(--ink);
      font-family: "Trebuchet MS", "Apple SD Gothic Neo", sans-serif;
      display: grid;
      place-items: start center;
      padding: 36px 16px 56px;
    }

    .app {
      width: min(880px, 100%);
      background: var(--card);
      border-radius: 24px;
      box-shadow: var(--shadow);
      padding: 32px;
      display: grid;
      gap: 26px;
    }

    h1 {
      margin: 0;
      font-family: "Georgia", serif;
      font-size: clamp(1.8rem, 4vw, 2.4rem);
    }

    h2 {
      margin: 0 0 12px;
      font-size: 1.2rem;
    }

    .subtitle {
      margin: 6px 0 0;
      color: var(--muted);
    }

    form.intake {
      display: grid;
      grid-template-columns: 2fr 1fr auto;
      gap: 12px;
      align-items: end;
    }

    label {
      display: grid;
      gap: 6px;
      font-size: 0.85rem;
      color: var(--muted);
    }

    input {
      font: inherit;
      padding: 10px 12px;
      border: 1px solid var(--accent-soft);
      border-radius: 10px;
      background: white;
      width: 100%;
    }

    button {
      font: inherit;
      font-weight: 600;
      border: none;
      border-radius: 999px;
      padding: 11px 20px;
      cursor: pointer;
      background: var(--accent);
      color: white;
    }

    .btn-ghost {
      background: transparent;
      color: var(--accent);
      border: 1px solid var(--accent-soft);
      padding: 6px 12px;
    }

    .metrics {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 14px;
    }

    .stat {
      background: white;
      border: 1px solid var(--accent-soft);
      border-radius: 16px;
      padding: 16px;
      display: grid;
      gap: 6px;
    }

    .stat .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: var(--muted);
    }

    .stat .value {
      font-size: 1.6rem;
      font-weight: 600;
      color: var(--accent);
    }

    .progress {
      height: 14px;
      background: var(--accent-soft);
      border-radius: 999px;
      overflow: hidden;
    }

    .progress span {
      display: block;
      height: 100%;
      background: var(--accent);
    }

    svg.trend {
      width: 100%;
      height: auto;
      background: white;
      border-radius: 16px;
      border: 1px solid var(--accent-soft);
    }

    svg.trend .bar {
      fill: var(--accent);
    }

    svg.trend .grid {
      stroke: rgba(46, 33, 25, 0.1);
    }

    svg.trend .axis {
      fill: var(--muted);
      font-size: 11px;
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    td, th {
      padding: 6px;
      text-align: left;
      border-bottom: 1px solid var(--accent-soft);
    }

    .notice {
      margin: 0;
      padding: 12px 16px;
      border-radius: 12px;
      background: var(--accent-soft);
    }

    .notice[data-type="error"] {
      color: var(--danger);
    }

    .notice[data-type="ok"] {
      color: var(--ok);
    }

    .toolbar {
      display: flex;
      gap: 10px;
      flex-wrap: wrap;
    }

    a {
      color: var(--accent);
    }

    @media (max-width: 640px) {
      form.intake {
        grid-template-columns: 1fr;
      }
    }
  </style>
</head>
<body>
  <main class="app">
{{BODY}}
  </main>
</body>
</html>
"#;

const INDEX_BODY: &str = r#"    <header>
      <h1>☕ Coffee Grounds Pickup</h1>
      <p class="subtitle">Request a collection of spent coffee grounds from your cafe.</p>
    </header>
    {{NOTICE}}
    <form class="intake" method="post" action="/submit">
      <label>Cafe name
        <input name="cafe_name" type="text" autocomplete="organization" />
      </label>
      <label>Quantity (kg)
        <input name="quantity_kg" type="number" min="1" step="1" value="1" />
      </label>
      <button type="submit">Submit request</button>
    </form>
    <section class="metrics">
      <div class="stat">
        <span class="label">Requests</span>
        <span class="value" id="request-count">{{COUNT}}</span>
      </div>
      <div class="stat">
        <span class="label">Total collected (kg)</span>
        <span class="value" id="total-kg">{{TOTAL}}</span>
      </div>
      <div class="stat">
        <span class="label">Cafes</span>
        <span class="value" id="distinct-cafes">{{CAFES}}</span>
      </div>
    </section>
    <section>
      <h2>Goal progress · {{GOAL}} kg</h2>
      <div class="progress"><span style="width: {{PERCENT_WIDTH}}%"></span></div>
      <p class="subtitle" id="progress-label">{{PERCENT}}</p>
    </section>
    <section>
      {{CHART}}
    </section>
    <p class="subtitle"><a href="/admin">Admin</a></p>"#;

const ADMIN_LOGIN_BODY: &str = r#"    <header>
      <h1>Admin</h1>
      <p class="subtitle">Enter the admin password to view and edit pickup records.</p>
    </header>
    {{NOTICE}}
    <form class="intake" method="post" action="/admin">
      <label>Password
        <input name="password" type="password" autocomplete="current-password" />
      </label>
      <button type="submit">Open records</button>
    </form>
    <p class="subtitle"><a href="/">Back to the form</a></p>"#;

const ADMIN_GRID_BODY: &str = r#"    <header>
      <h1>Pickup records</h1>
      <p class="subtitle"><span id="row-count">{{COUNT}}</span> rows. Edits replace the whole sheet when saved.</p>
    </header>
    {{NOTICE}}
    <p class="notice" id="status" hidden></p>
    <table id="grid" data-password="{{PASSWORD}}" data-revision="{{REVISION}}">
      <thead>
        <tr><th>Cafe name</th><th>Quantity (kg)</th><th>Requested at</th><th></th></tr>
      </thead>
      <tbody>
{{ROWS}}
      </tbody>
    </table>
    <div class="toolbar">
      <button type="button" class="btn-ghost" id="add-row">Add row</button>
      <button type="button" id="save">Save changes</button>
    </div>
    <p class="subtitle"><a href="/">Back to the form</a></p>
    <script>
      const grid = document.getElementById('grid');
      const body = grid.querySelector('tbody');
      const statusEl = document.getElementById('status');
      const rowCount = document.getElementById('row-count');

      const setStatus = (message, type) => {
        statusEl.hidden = !message;
        statusEl.textContent = message;
        statusEl.dataset.type = type || '';
      };

      const cell = (name, value) => {
        const td = document.createElement('td');
        const input = document.createElement('input');
        input.name = name;
        input.value = value;
        td.appendChild(input);
        return td;
      };

      const addRow = () => {
        const tr = document.createElement('tr');
        tr.appendChild(cell('cafe_name', ''));
        tr.appendChild(cell('quantity_kg', ''));
        tr.appendChild(cell('requested_at', ''));
        const td = document.createElement('td');
        td.innerHTML = '<button type="button" class="btn-ghost" data-remove>Remove</button>';
        tr.appendChild(td);
        body.appendChild(tr);
      };

      const quantity = (raw) => {
        const trimmed = raw.trim();
        if (!trimmed) {
          return null;
        }
        return /^-?\d+(\.\d+)?$/.test(trimmed) ? Number(trimmed) : trimmed;
      };

      const collect = () => Array.from(body.querySelectorAll('tr')).map((tr) => ({
        cafe_name: tr.querySelector('[name="cafe_name"]').value,
        quantity_kg: quantity(tr.querySelector('[name="quantity_kg"]').value),
        requested_at: tr.querySelector('[name="requested_at"]').value
      }));

      body.addEventListener('click', (event) => {
        if (event.target.matches('[data-remove]')) {
          event.target.closest('tr').remove();
        }
      });

      document.getElementById('add-row').addEventListener('click', addRow);

      document.getElementById('save').addEventListener('click', async () => {
        setStatus('Saving...', 'info');
        const records = collect();
        const revision = grid.dataset.revision || null;
        try {
          const res = await fetch('/api/admin/records', {
            method: 'PUT',
            headers: {
              'content-type': 'application/json',
              'x-admin-password': grid.dataset.password
            },
            body: JSON.stringify({ records, revision })
          });
          if (!res.ok) {
            throw new Error((await res.text()) || 'Save failed');
          }
          const saved = await res.json();
          grid.dataset.revision = saved.revision || '';
          rowCount.textContent = saved.saved;
          setStatus(`Saved ${saved.saved} rows`, 'ok');
        } catch (err) {
          setStatus(err.message, 'error');
        }
      });
    </script>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Record, RecordSet};
    use chrono::NaiveDate;

    fn point(day: u32, total_kg: f64) -> TrendPoint {
        TrendPoint {
            date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            total_kg,
        }
    }

    #[test]
    fn escape_html_neutralizes_markup() {
        assert_eq!(
            escape_html(r#"<b>"Cafe" & 'Co'</b>"#),
            "&lt;b&gt;&quot;Cafe&quot; &amp; &#39;Co&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn chart_is_omitted_without_points() {
        assert!(trend_chart(&[]).is_none());
    }

    #[test]
    fn chart_draws_one_bar_per_day() {
        let svg = trend_chart(&[point(1, 3.0), point(2, 0.0), point(4, 12.5)]).unwrap();
        assert_eq!(svg.matches("class=\"bar\"").count(), 3);
        assert!(svg.contains("03-04"));
        assert!(svg.contains("12.5 kg"));
    }

    #[test]
    fn index_shows_metrics_and_progress() {
        let records = RecordSet::new(vec![Record {
            cafe_name: "Cafe A".to_string(),
            quantity_kg: Quantity::whole(250),
            requested_at: "2026-03-01 10:00".to_string(),
        }]);
        let dashboard = Dashboard::from_records(&records, DataSource::Loaded);
        let html = render_index(&dashboard, Some(&Notice::Success("Saved <Cafe A>".to_string())));

        assert!(html.contains(r#"id="request-count">1<"#));
        assert!(html.contains(r#"id="total-kg">250<"#));
        assert!(html.contains(r#"id="progress-label">25.0%<"#));
        assert!(html.contains("Saved &lt;Cafe A&gt;"));
        assert!(html.contains("<svg class=\"trend\""));
    }

    #[test]
    fn index_without_timestamps_has_no_chart() {
        let records = RecordSet::new(vec![Record {
            cafe_name: "Cafe A".to_string(),
            quantity_kg: Quantity::whole(1),
            requested_at: "later".to_string(),
        }]);
        let dashboard = Dashboard::from_records(&records, DataSource::Loaded);
        assert!(!render_index(&dashboard, None).contains("<svg"));
    }

    #[test]
    fn admin_grid_escapes_cells() {
        let table = AdminTable {
            records: RecordSet::new(vec![Record {
                cafe_name: "<script>".to_string(),
                quantity_kg: Quantity::Text("3\"".to_string()),
                requested_at: String::new(),
            }]),
            revision: None,
            source: DataSource::Loaded,
        };
        let html = render_admin_grid(&table, "pw\"x");
        assert!(html.contains("value=\"&lt;script&gt;\""));
        assert!(html.contains("value=\"3&quot;\""));
        assert!(html.contains("data-password=\"pw&quot;x\""));
    }
}
