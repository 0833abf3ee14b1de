//! Server-rendered dashboard page

use std::fmt::Write;

use crate::server::handlers::ALL_SERVERS;
use crate::server::views::{FleetResponse, ServerView, StationSummary, StationsResponse};
use crate::utils::{escape_html as esc, VersionInfo};

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:0;background:#f6f7f9;color:#1d2430}\
header{padding:16px 24px;background:#1d2430;color:#fff}\
main{display:grid;grid-template-columns:320px 1fr;gap:24px;padding:24px}\
.card{background:#fff;border-radius:8px;padding:12px 16px;margin-bottom:12px;box-shadow:0 1px 2px #0002}\
.metrics{display:flex;gap:16px}.metric{flex:1}.metric b{display:block;font-size:1.6em}\
.gauge{height:6px;background:#e3e6ea;border-radius:3px}.gauge div{height:6px;border-radius:3px}\
.ok{background:#2e9d5b}.low{background:#e0a020}.critical{background:#d64545}\
table{width:100%;border-collapse:collapse}td,th{text-align:left;padding:6px 8px;border-bottom:1px solid #e3e6ea}\
.good{color:#2e9d5b}.warn{color:#c98a00}.bad{color:#d64545}.muted{color:#7a8494}\
nav a{margin-right:8px}small{color:#7a8494}";

/// Everything the dashboard shows
pub struct DashboardPage<'a> {
    pub fleet: &'a FleetResponse,
    pub stations: &'a StationsResponse,
    pub backend: &'a str,
    pub version: &'a VersionInfo,
}

/// Render the dashboard as a complete HTML document
pub fn dashboard(page: &DashboardPage<'_>) -> String {
    let mut html = String::with_capacity(16 * 1024);
    html.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\">");
    html.push_str("<title>Photobooth Fleet Command</title>");
    let _ = write!(html, "<style>{}</style></head><body>", STYLE);
    let _ = write!(
        html,
        "<header><h1>Photobooth Fleet Command</h1><small>{} &middot; console {}</small></header>",
        esc(page.backend),
        esc(&page.version.version)
    );

    html.push_str("<main><aside>");
    render_servers(&mut html, page.fleet);
    html.push_str("</aside><section>");
    render_metrics(&mut html, page.fleet);
    render_filter(&mut html, page.fleet, page.stations);
    render_stations(&mut html, page.stations);
    html.push_str("</section></main></body></html>");
    html
}

fn render_metrics(html: &mut String, fleet: &FleetResponse) {
    if fleet.servers.is_empty() {
        return;
    }
    let avg = fleet
        .metrics
        .avg_disk_free_gb
        .map(|gb| format!("{:.1} GB", gb))
        .unwrap_or_else(|| "-".to_string());
    let version = fleet.metrics.manager_version.as_deref().unwrap_or("-");

    let _ = write!(
        html,
        "<div class=\"card metrics\">\
         <div class=\"metric\">Servers Online<b>{}</b></div>\
         <div class=\"metric\">Avg Free Disk<b>{}</b></div>\
         <div class=\"metric\">Manager Version<b>{}</b></div></div>",
        fleet.metrics.online_count,
        esc(&avg),
        esc(version)
    );
}

fn render_servers(html: &mut String, fleet: &FleetResponse) {
    html.push_str("<h2>Live Fleet Health</h2>");
    if fleet.servers.is_empty() {
        html.push_str(
            "<div class=\"card muted\">No servers online (or health folder unreadable).</div>",
        );
        return;
    }
    if fleet.metrics.skipped > 0 {
        let _ = write!(
            html,
            "<div class=\"card warn\">{} health record(s) could not be read.</div>",
            fleet.metrics.skipped
        );
    }
    for server in &fleet.servers {
        render_server(html, server);
    }
}

fn render_server(html: &mut String, server: &ServerView) {
    let id = server.server_id.as_deref().unwrap_or("-");
    let active = if server.active_stations.is_empty() {
        "-".to_string()
    } else {
        server.active_stations.join(", ")
    };
    let _ = write!(
        html,
        "<div class=\"card\"><h3>Server: {}</h3>\
         <p>Disk Space: {} GB Free</p>\
         <div class=\"gauge\"><div class=\"{}\" style=\"width:{:.0}%\"></div></div>\
         <p>Active Stations: <code>{}</code></p>\
         <small>Last Seen: {}</small></div>",
        esc(id),
        server.disk_free_gb,
        server.disk_level.as_str(),
        server.disk_gauge * 100.0,
        esc(&active),
        esc(server.last_seen.as_deref().unwrap_or("-"))
    );
}

fn render_filter(html: &mut String, fleet: &FleetResponse, stations: &StationsResponse) {
    let current = stations.server_filter.as_deref();
    html.push_str("<nav class=\"card\">Server View: ");
    let _ = write!(
        html,
        "<a href=\"/\"{}>{}</a>",
        if current.is_none() { " class=\"good\"" } else { "" },
        ALL_SERVERS
    );
    for id in &fleet.online_server_ids {
        let _ = write!(
            html,
            "<a href=\"/?server={}\"{}>{}</a>",
            esc(&url_encode(id)),
            if current == Some(id.as_str()) { " class=\"good\"" } else { "" },
            esc(id)
        );
    }
    html.push_str("</nav>");
}

fn render_stations(html: &mut String, stations: &StationsResponse) {
    html.push_str(
        "<div class=\"card\"><h2>Stations</h2><table>\
         <tr><th>Station</th><th>Status</th><th>Assigned Server</th><th>Processing</th></tr>",
    );
    for station in &stations.stations {
        render_station_row(html, station);
    }
    html.push_str("</table></div>");
}

fn render_station_row(html: &mut String, station: &StationSummary) {
    let class = station.status.map(|s| s.css_class()).unwrap_or("bad");
    let enabled = match station.station_enabled {
        Some(true) => "ON",
        Some(false) => "OFF",
        None => "-",
    };
    let _ = write!(
        html,
        "<tr><td>{}</td><td class=\"{}\" title=\"{}\">{}</td><td>{}</td><td>{}</td></tr>",
        esc(&station.station_id),
        class,
        esc(station.error.as_deref().unwrap_or("")),
        esc(&station.status_label),
        esc(station.assigned_server.as_deref().unwrap_or("-")),
        enabled
    );
}

/// Percent-encode a query value
fn url_encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
