//! Server-rendered HTML pages for operators

use anyhow::Context;
use handlebars::{Handlebars, RenderError};
use serde::Serialize;

use model::{alert::Alert, assistance::AssistanceRequest, time::iso8601};

use crate::flash::Flash;

const DASHBOARD: &str = "dashboard";
const ALERTS_HISTORY: &str = "alerts_history";
const ASSISTANCE_REQUESTS: &str = "assistance_requests";

const HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{{title}}</title>
<style>
body { font-family: Arial, sans-serif; margin: 20px; }
.header { background: #dc3545; color: white; padding: 20px; border-radius: 8px; margin-bottom: 20px; }
.flash-success { background: #d4edda; color: #155724; padding: 10px; border-radius: 4px; }
.flash-error { background: #f8d7da; color: #721c24; padding: 10px; border-radius: 4px; }
.request-card { border: 1px solid #ddd; border-left: 5px solid #dc3545; border-radius: 8px; padding: 15px; margin: 10px 0; background: #f8f9fa; }
.map-link { background: #007bff; color: white; padding: 5px 10px; text-decoration: none; border-radius: 4px; margin: 5px; }
.timestamp { color: #6c757d; font-size: 0.9em; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
label { display: block; margin-top: 10px; }
</style>
</head>
<body>
"#;

const FOOT: &str = r#"<hr>
<p><a href="/">Dashboard</a> | <a href="/alerts_history">Alert History</a> | <a href="/assistance_requests">Assistance Requests</a></p>
</body>
</html>
"#;

const DASHBOARD_TEMPLATE: &str = r#"{{> head}}
<div class="header"><h1>Disaster Alert Dashboard</h1><p>Broadcast alerts to every registered device</p></div>
{{#if flash}}<p class="flash-{{flash.level}}">{{flash.message}}</p>{{/if}}
{{#unless gateway_initialized}}<p class="flash-error">Push notifications are not configured: alerts are stored but not broadcast.</p>{{/unless}}
<form method="post" action="/send_alert">
<label>Disaster type
<select name="disaster_type">
<option value="flood">Flood</option>
<option value="fire">Fire</option>
<option value="earthquake">Earthquake</option>
<option value="hurricane">Hurricane</option>
<option value="tsunami">Tsunami</option>
<option value="other">Other</option>
</select></label>
<label>Message <textarea name="message" rows="4" cols="60" required></textarea></label>
<label>Safe location latitude <input name="latitude" type="text"></label>
<label>Safe location longitude <input name="longitude" type="text"></label>
<p><button type="submit">Send alert</button></p>
</form>
{{> foot}}"#;

const ALERTS_HISTORY_TEMPLATE: &str = r#"{{> head}}
<div class="header"><h1>Alert History</h1></div>
{{#if alerts}}
<table>
<tr><th>#</th><th>Type</th><th>Message</th><th>Location</th><th>Time</th><th>Status</th></tr>
{{#each alerts}}
<tr><td>{{id}}</td><td>{{disaster_type}}</td><td>{{message}}</td><td>{{#if map_url}}<a href="{{map_url}}" target="_blank">{{location}}</a>{{else}}-{{/if}}</td><td class="timestamp">{{time}}</td><td>{{status}}</td></tr>
{{/each}}
</table>
{{else}}
<p>No alerts sent yet.</p>
{{/if}}
{{> foot}}"#;

const ASSISTANCE_REQUESTS_TEMPLATE: &str = r#"{{> head}}
<div class="header"><h1>Emergency Assistance Requests</h1><p>Rescue requests from users</p></div>
{{#each requests}}
<div class="request-card">
<h3>Request #{{id}} - {{user_name}}</h3>
<p><strong>Message:</strong> {{message}}</p>
<p><strong>Location:</strong> {{location}}</p>
<p><strong>Device:</strong> {{device_info}}</p>
<p class="timestamp"><strong>Time:</strong> {{time}}</p>
<p><strong>Status:</strong> {{status}} <strong>Priority:</strong> {{priority}}</p>
<div>
<a href="{{map_url}}" target="_blank" class="map-link">View on Google Maps</a>
<a href="{{directions_url}}" target="_blank" class="map-link">Get Directions</a>
</div>
</div>
{{else}}
<p>No assistance requests yet.</p>
{{/each}}
{{> foot}}"#;

#[derive(Serialize)]
struct DashboardPage<'a> {
    title: &'static str,
    flash: Option<&'a Flash>,
    gateway_initialized: bool,
}

#[derive(Serialize)]
struct AlertRow<'a> {
    id: i32,
    disaster_type: String,
    message: &'a str,
    location: Option<String>,
    map_url: Option<String>,
    time: String,
    status: &'static str,
}

#[derive(Serialize)]
struct AlertsPage<'a> {
    title: &'static str,
    alerts: Vec<AlertRow<'a>>,
}

#[derive(Serialize)]
struct RequestCard<'a> {
    id: i32,
    user_name: &'a str,
    message: &'a str,
    location: String,
    device_info: &'a str,
    time: String,
    status: String,
    priority: String,
    map_url: String,
    directions_url: String,
}

#[derive(Serialize)]
struct RequestsPage<'a> {
    title: &'static str,
    requests: Vec<RequestCard<'a>>,
}

/// Page templates, registered once at startup. Values are HTML-escaped on
/// render.
pub struct Views {
    reg: Handlebars<'static>,
}

impl Views {
    pub fn new() -> anyhow::Result<Self> {
        let mut reg = Handlebars::new();
        reg.set_strict_mode(true);

        reg.register_partial("head", HEAD)
            .context("registering head partial")?;
        reg.register_partial("foot", FOOT)
            .context("registering foot partial")?;

        for (name, template) in [
            (DASHBOARD, DASHBOARD_TEMPLATE),
            (ALERTS_HISTORY, ALERTS_HISTORY_TEMPLATE),
            (ASSISTANCE_REQUESTS, ASSISTANCE_REQUESTS_TEMPLATE),
        ] {
            reg.register_template_string(name, template)
                .with_context(|| format!("registering {name} template"))?;
        }

        Ok(Views { reg })
    }

    pub fn dashboard(
        &self,
        flash: Option<&Flash>,
        gateway_initialized: bool,
    ) -> Result<String, RenderError> {
        let page = DashboardPage {
            title: "Disaster Alert Dashboard",
            flash,
            gateway_initialized,
        };
        self.reg.render(DASHBOARD, &page)
    }

    pub fn alerts_history(&self, alerts: &[Alert]) -> Result<String, RenderError> {
        let alerts = alerts
            .iter()
            .map(|alert| AlertRow {
                id: alert.id,
                disaster_type: alert.disaster_type.to_uppercase(),
                message: &alert.message,
                location: alert.location.map(|l| l.to_string()),
                map_url: alert.location.map(|l| l.map_url()),
                time: iso8601(&alert.created_at),
                status: alert.status.as_str(),
            })
            .collect();

        let page = AlertsPage {
            title: "Alert History",
            alerts,
        };
        self.reg.render(ALERTS_HISTORY, &page)
    }

    pub fn assistance_requests(
        &self,
        requests: &[AssistanceRequest],
    ) -> Result<String, RenderError> {
        let requests = requests
            .iter()
            .map(|req| RequestCard {
                id: req.id,
                user_name: &req.user_name,
                message: &req.message,
                location: req.location.to_string(),
                device_info: &req.device_info,
                time: iso8601(&req.created_at),
                status: req.status.to_uppercase(),
                priority: req.priority.to_uppercase(),
                map_url: req.location.map_url(),
                directions_url: req.location.directions_url(),
            })
            .collect();

        let page = RequestsPage {
            title: "Emergency Assistance Requests",
            requests,
        };
        self.reg.render(ASSISTANCE_REQUESTS, &page)
    }
}
