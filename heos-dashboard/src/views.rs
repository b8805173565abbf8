//! Server-rendered HTML pages.
//!
//! Every value that reaches the markup goes through `html_escape`.

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use preset_store::Preset;

use crate::config::DashboardConfig;

/// Everything the dashboard page shows
pub struct DashboardView<'a> {
    pub device_name: &'a str,
    pub device_model: &'a str,
    pub online: bool,
    pub volume: &'a str,
    pub presets: &'a [Preset],
    pub current_station: &'a str,
    pub theme: &'a str,
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0 auto; max-width: 46rem; padding: 1rem; }
body.dark { background: #16181d; color: #e6e6e6; }
body.dark a { color: #8ab4f8; }
nav a { margin-right: 1rem; }
.status-online { color: #1a7f37; }
.status-offline { color: #cf222e; }
.presets form { display: inline-block; margin: 0.25rem; }
.presets button.current { font-weight: bold; outline: 2px solid #0969da; }
.controls form { display: inline-block; }
table { border-collapse: collapse; width: 100%; }
td, th { border-bottom: 1px solid #d0d7de; padding: 0.3rem; text-align: left; }
fieldset { margin-bottom: 1rem; }
"#;

fn page(title: &str, theme: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body class="{theme}">
<nav><a href="/">Dashboard</a><a href="/manage_stations">Stations</a><a href="/settings">Settings</a></nav>
{body}
</body>
</html>
"#,
        title = text(title),
        theme = attr(theme),
    )
}

pub fn dashboard(view: &DashboardView<'_>) -> String {
    let status = if view.online { "online" } else { "offline" };

    let presets: String = view
        .presets
        .iter()
        .map(|preset| {
            let class = if preset.name == view.current_station {
                " class=\"current\""
            } else {
                ""
            };
            format!(
                r#"<form method="post" action="/preset_play">
<input type="hidden" name="name" value="{name}">
<input type="hidden" name="uri" value="{uri}">
<button type="submit"{class}>{label}</button>
</form>"#,
                name = attr(&preset.name),
                uri = attr(&preset.uri),
                label = text(&preset.name),
            )
        })
        .collect();

    let now_playing = if view.current_station.is_empty() {
        String::new()
    } else {
        format!("<p>Now playing: <strong>{}</strong></p>", text(view.current_station))
    };

    let body = format!(
        r#"<h1>{name}</h1>
<p>{model} &middot; <span class="status-{status}">{status}</span></p>
{now_playing}
<section class="presets"><h2>Presets</h2>{presets}</section>
<section class="controls">
<h2>Playback</h2>
<form method="post" action="/play"><button>Play</button></form>
<form method="post" action="/pause"><button>Pause</button></form>
<form method="post" action="/stop"><button>Stop</button></form>
<form method="post" action="/poweroff"><button>Power off</button></form>
</section>
<section>
<h2>Volume</h2>
<form method="post" action="/setvolume">
<input type="range" name="level" min="0" max="100" value="{volume}">
<button type="submit">Set</button>
<span>Current: {volume_text}</span>
</form>
</section>"#,
        name = text(view.device_name),
        model = text(view.device_model),
        volume = attr(view.volume),
        volume_text = text(view.volume),
    );

    page(view.device_name, view.theme, &body)
}

pub fn manage_stations(presets: &[Preset], theme: &str) -> String {
    let rows: String = presets
        .iter()
        .map(|preset| {
            format!(
                r#"<tr>
<td><input type="checkbox" class="select" value="{name_attr}"></td>
<td>{name}</td><td>{uri}</td>
<td><form method="post" action="/remove_station"><input type="hidden" name="name" value="{name_attr}"><button>Remove</button></form></td>
</tr>"#,
                name_attr = attr(&preset.name),
                name = text(&preset.name),
                uri = text(&preset.uri),
            )
        })
        .collect();

    let body = format!(
        r#"<h1>Stations</h1>
<table>
<thead><tr><th></th><th>Name</th><th>Stream URI</th><th></th></tr></thead>
<tbody>{rows}</tbody>
</table>
<p><button id="remove-selected">Remove selected</button></p>
<h2>Add or update</h2>
<form method="post" action="/add_station">
<input name="name" placeholder="Name" required>
<input name="uri" placeholder="http://..." required>
<button type="submit">Save</button>
</form>
<h2>Import / export</h2>
<form method="post" action="/import_stations" enctype="multipart/form-data">
<input type="file" name="file" accept=".json">
<label><input type="checkbox" name="replace"> Replace existing</label>
<button type="submit">Import</button>
</form>
<p><a href="/export_stations">Download stations</a></p>
<script>
document.getElementById("remove-selected").addEventListener("click", async () => {{
  const names = [...document.querySelectorAll("input.select:checked")].map(el => el.value);
  if (names.length === 0) return;
  const res = await fetch("/remove_multiple_stations", {{
    method: "POST",
    headers: {{"Content-Type": "application/json"}},
    body: JSON.stringify({{names}})
  }});
  const data = await res.json();
  if (data.success) location.reload(); else alert(data.message);
}});
</script>"#
    );

    page("Stations", theme, &body)
}

pub fn settings(config: &DashboardConfig) -> String {
    let checked = |on: bool| if on { " checked" } else { "" };
    let selected = |theme: &str| {
        if config.ui.theme == theme {
            " selected"
        } else {
            ""
        }
    };

    let body = format!(
        r#"<h1>Settings</h1>
<form class="settings" action="/update_device_config">
<fieldset><legend>Device</legend>
<label>IP <input name="ip" value="{ip}"></label>
<label>Port <input name="port" type="number" value="{port}"></label>
<label>Name <input name="friendly_name" value="{friendly_name}"></label>
<p>Model: {model} &middot; Manufacturer: {manufacturer}</p>
<button type="submit">Save device</button>
<button type="button" id="test-connection">Test connection</button>
<button type="button" id="rediscover">Rediscover</button>
</fieldset>
</form>
<form class="settings" action="/update_app_config">
<fieldset><legend>Server</legend>
<label>Host <input name="host" value="{host}"></label>
<label>Port <input name="port" type="number" value="{app_port}"></label>
<label><input type="checkbox" name="debug"{debug}> Debug logging</label>
<button type="submit">Save server</button>
</fieldset>
</form>
<form class="settings" action="/update_ui_config">
<fieldset><legend>Interface</legend>
<label>Theme <select name="theme">
<option value="light"{light}>Light</option>
<option value="dark"{dark}>Dark</option>
</select></label>
<label>Default volume <input name="default_volume" type="number" min="0" max="100" value="{default_volume}"></label>
<button type="submit">Save interface</button>
</fieldset>
</form>
<p id="result"></p>
<script>
const show = data => {{
  document.getElementById("result").textContent =
    data.success ? "Saved." : (data.message || "Failed");
  if (data.reload) location.reload();
}};
document.querySelectorAll("form.settings").forEach(form => {{
  form.addEventListener("submit", async ev => {{
    ev.preventDefault();
    const res = await fetch(form.getAttribute("action"), {{
      method: "POST",
      body: new URLSearchParams(new FormData(form))
    }});
    show(await res.json());
  }});
}});
document.getElementById("test-connection").addEventListener("click", async () => {{
  const form = document.querySelector("form.settings");
  const res = await fetch("/test_connection", {{
    method: "POST",
    headers: {{"Content-Type": "application/json"}},
    body: JSON.stringify({{ip: form.ip.value, port: form.port.value}})
  }});
  const data = await res.json();
  document.getElementById("result").textContent = data.success
    ? "Connected" + (data.device_info ? ": " + (data.device_info.friendly_name || "") : "")
    : data.message;
}});
document.getElementById("rediscover").addEventListener("click", async () => {{
  const res = await fetch("/rediscover_device", {{method: "POST"}});
  const data = await res.json();
  if (data.success) location.reload(); else show(data);
}});
</script>"#,
        ip = attr(&config.device.ip),
        port = config.device.port,
        friendly_name = attr(&config.device.friendly_name),
        model = text(&config.device.model),
        manufacturer = text(&config.device.manufacturer),
        host = attr(&config.app.host),
        app_port = config.app.port,
        debug = checked(config.app.debug),
        light = selected("light"),
        dark = selected("dark"),
        default_volume = config.ui.default_volume,
    );

    page("Settings", &config.ui.theme, &body)
}
