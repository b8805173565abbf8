//! Request handlers for the dashboard routes.
//!
//! Device calls are blocking, so they run on tokio's blocking pool.

use std::collections::HashMap;

use bytes::BufMut;
use futures::TryStreamExt;
use heos_api::HeosDevice;
use heos_discovery::DeviceInfo;
use serde_json::{json, Value};
use warp::http::{header, StatusCode, Uri};
use warp::multipart::{FormData, Part};
use warp::reply::{Reply, Response};
use warp::Rejection;

use crate::config::DashboardConfig;
use crate::state::SharedState;
use crate::views::{self, DashboardView};

type Form = HashMap<String, String>;

/// Failure inside a handler, reported as a JSON error body
#[derive(Debug)]
pub struct Internal(pub String);

impl warp::reject::Reject for Internal {}

fn internal(e: impl std::fmt::Display) -> Rejection {
    warp::reject::custom(Internal(e.to_string()))
}

async fn blocking<F, R>(f: F) -> Result<R, Rejection>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(internal)
}

pub fn json_error(status: StatusCode, message: &str) -> Response {
    warp::reply::with_status(
        warp::reply::json(&json!({"success": false, "message": message})),
        status,
    )
    .into_response()
}

fn json_reply(value: Value) -> Response {
    warp::reply::json(&value).into_response()
}

fn see_other(path: &'static str) -> Response {
    warp::redirect::see_other(Uri::from_static(path)).into_response()
}

/// Form field, treating an empty value as absent
fn field<'a>(form: &'a Form, key: &str) -> Option<&'a str> {
    form.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

fn html(body: String) -> Response {
    warp::reply::html(body).into_response()
}

pub async fn index(query: Form, state: SharedState) -> Result<Response, Rejection> {
    let config = state.config();
    let device = state.device();

    let (online, volume) = blocking(move || (device.check_connection(), device.get_volume())).await?;

    let presets = state.presets().presets().to_vec();
    let current_station = query.get("station").map(String::as_str).unwrap_or("");

    Ok(html(views::dashboard(&DashboardView {
        device_name: &config.device.friendly_name,
        device_model: &config.device.model,
        online,
        volume: &volume,
        presets: &presets,
        current_station,
        theme: &config.ui.theme,
    })))
}

pub async fn preset_play(form: Form, state: SharedState) -> Result<Response, Rejection> {
    if let Some(uri) = field(&form, "uri") {
        let device = state.device();
        let uri = uri.to_string();
        blocking(move || {
            device.set_stream_uri(&uri);
            device.play();
        })
        .await?;
    }

    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("station", form.get("name").map(String::as_str).unwrap_or(""))
        .finish();
    let location: Uri = format!("/?{}", query).parse().map_err(internal)?;

    Ok(warp::redirect::see_other(location).into_response())
}

/// Runs one transport command and returns to the dashboard
pub async fn transport(
    command: fn(&HeosDevice) -> String,
    state: SharedState,
) -> Result<Response, Rejection> {
    let device = state.device();
    blocking(move || command(&device)).await?;
    Ok(see_other("/"))
}

pub async fn set_volume(form: Form, state: SharedState) -> Result<Response, Rejection> {
    if let Some(level) = field(&form, "level") {
        let device = state.device();
        let level = level.to_string();
        let accepted = blocking(move || device.set_volume(&level)).await?;
        if !accepted {
            tracing::warn!("device did not accept volume change");
        }
    }
    Ok(see_other("/"))
}

pub async fn manage_stations(state: SharedState) -> Result<Response, Rejection> {
    let theme = state.config().ui.theme;
    let presets = state.presets().presets().to_vec();
    Ok(html(views::manage_stations(&presets, &theme)))
}

pub async fn add_station(form: Form, state: SharedState) -> Result<Response, Rejection> {
    let (Some(name), Some(uri)) = (field(&form, "name"), field(&form, "uri")) else {
        return Ok(json_error(StatusCode::BAD_REQUEST, "Name and URI are required"));
    };

    let (name, uri) = (name.to_string(), uri.to_string());
    blocking(move || state.presets().add(&name, &uri))
        .await?
        .map_err(internal)?;
    Ok(see_other("/manage_stations"))
}

pub async fn remove_station(form: Form, state: SharedState) -> Result<Response, Rejection> {
    let Some(name) = field(&form, "name") else {
        return Ok(json_error(StatusCode::BAD_REQUEST, "Station name is required"));
    };

    let name = name.to_string();
    blocking(move || state.presets().remove(&name))
        .await?
        .map_err(internal)?;
    Ok(see_other("/manage_stations"))
}

pub async fn remove_multiple_stations(body: Value, state: SharedState) -> Result<Response, Rejection> {
    let names: Vec<String> = body
        .get("names")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if names.is_empty() {
        return Ok(json_error(StatusCode::BAD_REQUEST, "No station names provided"));
    }

    let removed = blocking(move || state.presets().remove_many(&names))
        .await?
        .map_err(internal)?;

    if removed {
        Ok(json_reply(json!({"success": true})))
    } else {
        Ok(json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to remove stations",
        ))
    }
}

pub async fn export_stations(state: SharedState) -> Result<Response, Rejection> {
    let json = state.presets().to_json().map_err(internal)?;

    let mut response = Response::new(json.into());
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        header::HeaderValue::from_static("attachment; filename=\"heos_stations.json\""),
    );
    Ok(response)
}

async fn read_part(part: Part) -> Result<Vec<u8>, warp::Error> {
    part.stream()
        .try_fold(Vec::new(), |mut data, buf| async move {
            data.put(buf);
            Ok(data)
        })
        .await
}

pub async fn import_stations(form: FormData, state: SharedState) -> Result<Response, Rejection> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut replace = false;

    // Each part must be drained before the next one can be fetched
    futures::pin_mut!(form);
    while let Some(part) = form.try_next().await.map_err(internal)? {
        let name = part.name().to_string();
        match name.as_str() {
            "file" => {
                let filename = part.filename().unwrap_or("").to_string();
                let data = read_part(part).await.map_err(internal)?;
                upload = Some((filename, data));
            }
            "replace" => {
                replace = true;
                read_part(part).await.map_err(internal)?;
            }
            _ => {
                read_part(part).await.map_err(internal)?;
            }
        }
    }

    let Some((filename, data)) = upload else {
        return Ok(json_error(StatusCode::BAD_REQUEST, "No file uploaded"));
    };
    if filename.is_empty() {
        return Ok(json_error(StatusCode::BAD_REQUEST, "No file selected"));
    }
    if !filename.ends_with(".json") {
        return Ok(json_error(StatusCode::BAD_REQUEST, "Only JSON files are supported"));
    }

    let imported = match std::str::from_utf8(&data)
        .map_err(|e| e.to_string())
        .and_then(|text| preset_store::parse_presets(text).map_err(|e| e.to_string()))
    {
        Ok(imported) => imported,
        Err(message) => return Ok(json_error(StatusCode::INTERNAL_SERVER_ERROR, &message)),
    };

    let count = imported.len();
    blocking(move || {
        let mut presets = state.presets();
        if replace {
            presets.replace_all(imported)
        } else {
            imported
                .iter()
                .try_for_each(|preset| presets.add(&preset.name, &preset.uri))
        }
    })
    .await?
    .map_err(internal)?;
    tracing::info!(count, replace, %filename, "imported stations");

    Ok(see_other("/manage_stations"))
}

pub async fn settings(state: SharedState) -> Result<Response, Rejection> {
    Ok(html(views::settings(&state.config())))
}

/// Apply and persist a configuration change on the blocking pool
async fn save_config<F>(state: SharedState, update: F) -> Result<anyhow::Result<DashboardConfig>, Rejection>
where
    F: FnOnce(&mut DashboardConfig) -> anyhow::Result<()> + Send + 'static,
{
    blocking(move || state.update_config(update)).await
}

fn saved(result: anyhow::Result<DashboardConfig>) -> Response {
    match result {
        Ok(_) => json_reply(json!({"success": true})),
        Err(e) => {
            tracing::warn!(error = %format!("{:#}", e), "configuration update failed");
            json_reply(json!({"success": false, "message": format!("{:#}", e)}))
        }
    }
}

pub async fn update_device_config(form: Form, state: SharedState) -> Result<Response, Rejection> {
    let (Some(ip), Some(port)) = (field(&form, "ip"), field(&form, "port")) else {
        return Ok(json_reply(
            json!({"success": false, "message": "IP and port are required"}),
        ));
    };
    let Ok(port) = port.parse::<u16>() else {
        return Ok(json_reply(json!({"success": false, "message": "Invalid port"})));
    };
    let ip = ip.to_string();
    let friendly_name = field(&form, "friendly_name").map(str::to_string);

    let result = save_config(state.clone(), move |config| {
        config.device.ip = ip;
        config.device.port = port;
        if let Some(name) = friendly_name {
            config.device.friendly_name = name;
        }
        Ok(())
    })
    .await?;

    match result {
        Ok(config) => {
            state.replace_device(&config.device.ip, config.device.port);
            Ok(json_reply(json!({"success": true, "reload": true})))
        }
        Err(e) => Ok(saved(Err(e))),
    }
}

pub async fn update_app_config(form: Form, state: SharedState) -> Result<Response, Rejection> {
    let port = match field(&form, "port").map(str::parse::<u16>).transpose() {
        Ok(port) => port,
        Err(_) => return Ok(json_reply(json!({"success": false, "message": "Invalid port"}))),
    };
    let host = field(&form, "host").map(str::to_string);
    let debug = form.contains_key("debug");

    let result = save_config(state, move |config| {
        if let Some(port) = port {
            config.app.port = port;
        }
        if let Some(host) = host {
            config.app.host = host;
        }
        config.app.debug = debug;
        Ok(())
    })
    .await?;

    Ok(saved(result))
}

pub async fn update_ui_config(form: Form, state: SharedState) -> Result<Response, Rejection> {
    let default_volume = match field(&form, "default_volume").map(str::parse::<u8>).transpose() {
        Ok(volume) => volume,
        Err(_) => {
            return Ok(json_reply(
                json!({"success": false, "message": "Invalid default volume"}),
            ))
        }
    };
    let theme = field(&form, "theme").map(str::to_string);

    let result = save_config(state, move |config| {
        if let Some(theme) = theme {
            config.ui.theme = theme;
        }
        if let Some(volume) = default_volume {
            config.ui.default_volume = volume;
        }
        Ok(())
    })
    .await?;

    Ok(saved(result))
}

pub async fn update_config(body: Value, state: SharedState) -> Result<Response, Rejection> {
    let result = save_config(state, move |config| config.update_section_values(&body)).await?;
    Ok(saved(result))
}

/// Port given either as a JSON number or a numeric string
fn json_port(value: Option<&Value>) -> Option<u16> {
    match value? {
        Value::Number(n) => n.as_u64().and_then(|p| u16::try_from(p).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub async fn test_connection(body: Value, _state: SharedState) -> Result<Response, Rejection> {
    let ip = body
        .get("ip")
        .and_then(Value::as_str)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string);
    let (Some(ip), Some(port)) = (ip, json_port(body.get("port"))) else {
        return Ok(json_reply(
            json!({"success": false, "message": "IP and port are required"}),
        ));
    };

    let result = blocking(move || {
        let probe = HeosDevice::new(ip.clone(), port);
        if probe.check_connection() {
            Some(heos_discovery::get_device_info(&ip, port))
        } else {
            None
        }
    })
    .await?;

    Ok(json_reply(match result {
        Some(info) => {
            let device_info = (!info.is_empty()).then_some(info);
            json!({"success": true, "device_info": device_info})
        }
        None => json!({"success": false, "message": "Could not connect to device"}),
    }))
}

pub async fn rediscover_device(state: SharedState) -> Result<Response, Rejection> {
    let config = state.config();
    let (ip, port) = (config.device.ip.clone(), config.device.port);
    let info: DeviceInfo = blocking(move || heos_discovery::get_device_info(&ip, port)).await?;

    if !config.clone().apply_device_info(&info) {
        return Ok(json_reply(
            json!({"success": false, "message": "No new device information discovered"}),
        ));
    }

    let result = save_config(state, move |config| {
        config.apply_device_info(&info);
        Ok(())
    })
    .await?;

    Ok(saved(result))
}
