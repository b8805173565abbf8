//! Route table for the dashboard HTTP server.

use std::collections::HashMap;
use std::convert::Infallible;

use heos_api::HeosDevice;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::handlers::{self, json_error, Internal};
use crate::state::SharedState;

const FORM_LIMIT: u64 = 64 * 1024;
const UPLOAD_LIMIT: u64 = 1024 * 1024;

type Form = HashMap<String, String>;

fn with_state(state: SharedState) -> impl Filter<Extract = (SharedState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn form() -> impl Filter<Extract = (Form,), Error = Rejection> + Clone {
    warp::body::content_length_limit(FORM_LIMIT).and(warp::body::form())
}

fn json_body() -> impl Filter<Extract = (serde_json::Value,), Error = Rejection> + Clone {
    warp::body::content_length_limit(FORM_LIMIT).and(warp::body::json())
}

/// POST `/{name}` running one facade command, then back to the dashboard
fn command(
    name: &'static str,
    run: fn(&HeosDevice) -> String,
    state: SharedState,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path(name)
        .and(warp::path::end())
        .and(warp::post())
        .and(with_state(state))
        .and_then(move |state| handlers::transport(run, state))
}

/// All dashboard routes with rejection recovery applied
pub fn routes(
    state: SharedState,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let index = warp::path::end()
        .and(warp::get())
        .and(warp::query::<Form>())
        .and(with_state(state.clone()))
        .and_then(handlers::index);

    let preset_play = warp::path!("preset_play")
        .and(warp::post())
        .and(form())
        .and(with_state(state.clone()))
        .and_then(handlers::preset_play);

    let playback = command("play", |d| d.play(), state.clone())
        .or(command("pause", |d| d.pause(), state.clone()))
        .unify()
        .or(command("stop", |d| d.stop(), state.clone()))
        .unify()
        .or(command("poweroff", |d| d.power_off(), state.clone()))
        .unify();

    let set_volume = warp::path!("setvolume")
        .and(warp::post())
        .and(form())
        .and(with_state(state.clone()))
        .and_then(handlers::set_volume);

    let manage_stations = warp::path!("manage_stations")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::manage_stations);

    let add_station = warp::path!("add_station")
        .and(warp::post())
        .and(form())
        .and(with_state(state.clone()))
        .and_then(handlers::add_station);

    let remove_station = warp::path!("remove_station")
        .and(warp::post())
        .and(form())
        .and(with_state(state.clone()))
        .and_then(handlers::remove_station);

    let remove_multiple = warp::path!("remove_multiple_stations")
        .and(warp::post())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handlers::remove_multiple_stations);

    let export_stations = warp::path!("export_stations")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::export_stations);

    let import_stations = warp::path!("import_stations")
        .and(warp::post())
        .and(warp::multipart::form().max_length(UPLOAD_LIMIT))
        .and(with_state(state.clone()))
        .and_then(handlers::import_stations);

    let settings = warp::path!("settings")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::settings);

    let update_device = warp::path!("update_device_config")
        .and(warp::post())
        .and(form())
        .and(with_state(state.clone()))
        .and_then(handlers::update_device_config);

    let update_app = warp::path!("update_app_config")
        .and(warp::post())
        .and(form())
        .and(with_state(state.clone()))
        .and_then(handlers::update_app_config);

    let update_ui = warp::path!("update_ui_config")
        .and(warp::post())
        .and(form())
        .and(with_state(state.clone()))
        .and_then(handlers::update_ui_config);

    let update_config = warp::path!("update_config")
        .and(warp::post())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handlers::update_config);

    let test_connection = warp::path!("test_connection")
        .and(warp::post())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handlers::test_connection);

    let rediscover = warp::path!("rediscover_device")
        .and(warp::post())
        .and(with_state(state))
        .and_then(handlers::rediscover_device);

    let dashboard = index.or(preset_play).unify().or(playback).unify().or(set_volume).unify();

    let stations = manage_stations
        .or(add_station)
        .unify()
        .or(remove_station)
        .unify()
        .or(remove_multiple)
        .unify()
        .or(export_stations)
        .unify()
        .or(import_stations)
        .unify();

    let config = settings
        .or(update_device)
        .unify()
        .or(update_app)
        .unify()
        .or(update_ui)
        .unify()
        .or(update_config)
        .unify()
        .or(test_connection)
        .unify()
        .or(rediscover)
        .unify();

    dashboard
        .or(stations)
        .unify()
        .or(config)
        .unify()
        .recover(handle_rejection)
        .unify()
        .with(warp::trace::request())
}

/// Turn rejections into `{"success": false, "message": ...}` responses
async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let (code, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(Internal(message)) = err.find::<Internal>() {
        tracing::error!(%message, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, message.clone())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large".to_string())
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, "Unsupported media type".to_string())
    } else {
        tracing::warn!(rejection = ?err, "unhandled rejection");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
    };

    Ok(json_error(code, &message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::state::AppState;
    use mockito::Matcher;
    use preset_store::PresetStore;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tempfile::TempDir;

    const FORM: &str = "application/x-www-form-urlencoded";

    /// State pointing at a port nothing listens on
    fn offline_state(dir: &TempDir) -> SharedState {
        state_for_device(dir, "127.0.0.1", 1)
    }

    fn state_for_device(dir: &TempDir, ip: &str, port: u16) -> SharedState {
        let mut config = DashboardConfig::default();
        config.device.ip = ip.to_string();
        config.device.port = port;

        Arc::new(AppState::new(
            dir.path().join("config.yaml"),
            config,
            PresetStore::open(dir.path().join("stations.json")),
        ))
    }

    fn body_json(body: &[u8]) -> Value {
        serde_json::from_slice(body).unwrap()
    }

    fn multipart(filename: Option<&str>, content: &str, replace: bool) -> (String, String) {
        let boundary = "heos-test-boundary";
        let mut body = String::new();
        if let Some(filename) = filename {
            body.push_str(&format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/json\r\n\r\n{content}\r\n"
            ));
        }
        if replace {
            body.push_str(&format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"replace\"\r\n\r\non\r\n"
            ));
        }
        body.push_str(&format!("--{boundary}--\r\n"));
        (format!("multipart/form-data; boundary={boundary}"), body)
    }

    #[tokio::test]
    async fn test_index_offline_device() {
        let dir = TempDir::new().unwrap();
        let api = routes(offline_state(&dir));

        let res = warp::test::request().method("GET").path("/").reply(&api).await;

        assert_eq!(res.status(), StatusCode::OK);
        let html = String::from_utf8_lossy(res.body());
        assert!(html.contains("status-offline"));
        assert!(html.contains("Current: 0"));
        assert!(html.contains("Classic FM"));
    }

    #[tokio::test]
    async fn test_preset_play_without_uri_redirects() {
        let dir = TempDir::new().unwrap();
        let api = routes(offline_state(&dir));

        let res = warp::test::request()
            .method("POST")
            .path("/preset_play")
            .header("content-type", FORM)
            .body("name=Jazz+%26+Blues")
            .reply(&api)
            .await;

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()["location"], "/?station=Jazz+%26+Blues");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_preset_play_sends_uri_then_play() {
        let mut device = mockito::Server::new_async().await;
        let set_uri = device
            .mock("POST", "/upnp/control/renderer_dvc/AVTransport")
            .match_header("soapaction", Matcher::Regex("#SetAVTransportURI".into()))
            .match_body(Matcher::Regex("<CurrentURI>http://kexp/live</CurrentURI>".into()))
            .with_status(200)
            .with_body("<ok/>")
            .create_async()
            .await;
        let play = device
            .mock("POST", "/upnp/control/renderer_dvc/AVTransport")
            .match_header("soapaction", Matcher::Regex("#Play".into()))
            .with_status(200)
            .with_body("<ok/>")
            .create_async()
            .await;

        let address = device.host_with_port();
        let (host, port) = address.rsplit_once(':').unwrap();
        let port: u16 = port.parse().unwrap();
        let dir = TempDir::new().unwrap();
        let api = routes(state_for_device(&dir, host, port));

        let res = warp::test::request()
            .method("POST")
            .path("/preset_play")
            .header("content-type", FORM)
            .body("name=KEXP&uri=http%3A%2F%2Fkexp%2Flive")
            .reply(&api)
            .await;

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()["location"], "/?station=KEXP");
        set_uri.assert_async().await;
        play.assert_async().await;
    }

    #[tokio::test]
    async fn test_transport_commands_redirect_home() {
        let dir = TempDir::new().unwrap();
        let api = routes(offline_state(&dir));

        for path in ["/play", "/pause", "/stop", "/poweroff"] {
            let res = warp::test::request().method("POST").path(path).reply(&api).await;
            assert_eq!(res.status(), StatusCode::SEE_OTHER, "{}", path);
            assert_eq!(res.headers()["location"], "/");
        }
    }

    #[tokio::test]
    async fn test_unknown_path_is_json_404() {
        let dir = TempDir::new().unwrap();
        let api = routes(offline_state(&dir));

        let res = warp::test::request().method("GET").path("/nope").reply(&api).await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(res.body())["success"], false);
    }

    #[tokio::test]
    async fn test_add_station_requires_name_and_uri() {
        let dir = TempDir::new().unwrap();
        let state = offline_state(&dir);
        let api = routes(state.clone());

        let res = warp::test::request()
            .method("POST")
            .path("/add_station")
            .header("content-type", FORM)
            .body("name=KEXP&uri=")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res.body())["message"], "Name and URI are required");

        let res = warp::test::request()
            .method("POST")
            .path("/add_station")
            .header("content-type", FORM)
            .body("name=KEXP&uri=http%3A%2F%2Fkexp%2Flive")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()["location"], "/manage_stations");
        assert_eq!(state.presets().get("KEXP").unwrap().uri, "http://kexp/live");
    }

    #[tokio::test]
    async fn test_remove_station() {
        let dir = TempDir::new().unwrap();
        let state = offline_state(&dir);
        let api = routes(state.clone());

        let res = warp::test::request()
            .method("POST")
            .path("/remove_station")
            .header("content-type", FORM)
            .body("")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = warp::test::request()
            .method("POST")
            .path("/remove_station")
            .header("content-type", FORM)
            .body("name=NPR")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert!(state.presets().get("NPR").is_none());
    }

    #[tokio::test]
    async fn test_remove_multiple_stations() {
        let dir = TempDir::new().unwrap();
        let state = offline_state(&dir);
        let api = routes(state.clone());

        let cases = [
            (json!({"names": []}), StatusCode::BAD_REQUEST),
            (json!({"names": ["Unknown"]}), StatusCode::INTERNAL_SERVER_ERROR),
            (json!({"names": ["NPR", "Classic FM"]}), StatusCode::OK),
        ];

        for (body, expected) in cases {
            let res = warp::test::request()
                .method("POST")
                .path("/remove_multiple_stations")
                .json(&body)
                .reply(&api)
                .await;
            assert_eq!(res.status(), expected, "{}", body);
        }
        assert!(state.presets().presets().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let dir = TempDir::new().unwrap();
        let api = routes(offline_state(&dir));

        let res = warp::test::request()
            .method("POST")
            .path("/remove_multiple_stations")
            .header("content-type", "application/json")
            .body("{names")
            .reply(&api)
            .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res.body())["success"], false);
    }

    #[tokio::test]
    async fn test_export_stations_is_attachment() {
        let dir = TempDir::new().unwrap();
        let api = routes(offline_state(&dir));

        let res = warp::test::request()
            .method("GET")
            .path("/export_stations")
            .reply(&api)
            .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()["content-disposition"],
            "attachment; filename=\"heos_stations.json\""
        );
        let presets = preset_store::parse_presets(std::str::from_utf8(res.body()).unwrap()).unwrap();
        assert_eq!(presets.len(), 2);
    }

    #[tokio::test]
    async fn test_import_stations_validation() {
        let dir = TempDir::new().unwrap();
        let api = routes(offline_state(&dir));

        let cases = [
            (None, "No file uploaded"),
            (Some(""), "No file selected"),
            (Some("stations.txt"), "Only JSON files are supported"),
        ];

        for (filename, message) in cases {
            let (content_type, body) = multipart(filename, "[]", true);
            let res = warp::test::request()
                .method("POST")
                .path("/import_stations")
                .header("content-type", content_type)
                .body(body)
                .reply(&api)
                .await;
            assert_eq!(res.status(), StatusCode::BAD_REQUEST);
            assert_eq!(body_json(res.body())["message"], message);
        }
    }

    #[tokio::test]
    async fn test_import_stations_replace_and_merge() {
        let dir = TempDir::new().unwrap();
        let state = offline_state(&dir);
        let api = routes(state.clone());

        let upload = r#"[{"name": "NPR", "uri": "http://npr/alt"}, {"name": "WFMU", "uri": "http://wfmu/live"}]"#;

        let (content_type, body) = multipart(Some("mine.json"), upload, false);
        let res = warp::test::request()
            .method("POST")
            .path("/import_stations")
            .header("content-type", content_type)
            .body(body)
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(state.presets().presets().len(), 3);
        assert_eq!(state.presets().get("NPR").unwrap().uri, "http://npr/alt");

        let (content_type, body) = multipart(Some("mine.json"), upload, true);
        let res = warp::test::request()
            .method("POST")
            .path("/import_stations")
            .header("content-type", content_type)
            .body(body)
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(state.presets().presets().len(), 2);
        assert!(state.presets().get("Classic FM").is_none());
    }

    #[tokio::test]
    async fn test_import_invalid_entries() {
        let dir = TempDir::new().unwrap();
        let state = offline_state(&dir);
        let api = routes(state.clone());

        let (content_type, body) = multipart(Some("bad.json"), r#"[{"name": "x"}]"#, true);
        let res = warp::test::request()
            .method("POST")
            .path("/import_stations")
            .header("content-type", content_type)
            .body(body)
            .reply(&api)
            .await;

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(state.presets().presets().len(), 2);
    }

    #[tokio::test]
    async fn test_update_device_config_swaps_device() {
        let dir = TempDir::new().unwrap();
        let state = offline_state(&dir);
        let api = routes(state.clone());

        let res = warp::test::request()
            .method("POST")
            .path("/update_device_config")
            .header("content-type", FORM)
            .body("ip=192.168.1.77&port=60006&friendly_name=Den")
            .reply(&api)
            .await;

        assert_eq!(body_json(res.body()), json!({"success": true, "reload": true}));
        assert_eq!(state.device().endpoint().host(), "192.168.1.77");
        assert_eq!(state.config().device.friendly_name, "Den");
        let saved = std::fs::read_to_string(dir.path().join("config.yaml")).unwrap();
        assert!(saved.contains("192.168.1.77"));
    }

    #[tokio::test]
    async fn test_update_device_config_requires_fields() {
        let dir = TempDir::new().unwrap();
        let state = offline_state(&dir);
        let api = routes(state.clone());

        let res = warp::test::request()
            .method("POST")
            .path("/update_device_config")
            .header("content-type", FORM)
            .body("ip=192.168.1.77")
            .reply(&api)
            .await;

        assert_eq!(body_json(res.body())["success"], false);
        assert_eq!(state.device().endpoint().host(), "127.0.0.1");
    }

    #[tokio::test]
    async fn test_update_app_and_ui_config() {
        let dir = TempDir::new().unwrap();
        let state = offline_state(&dir);
        let api = routes(state.clone());

        let res = warp::test::request()
            .method("POST")
            .path("/update_app_config")
            .header("content-type", FORM)
            .body("port=8080&host=127.0.0.1")
            .reply(&api)
            .await;
        assert_eq!(body_json(res.body())["success"], true);

        let res = warp::test::request()
            .method("POST")
            .path("/update_ui_config")
            .header("content-type", FORM)
            .body("theme=dark&default_volume=45")
            .reply(&api)
            .await;
        assert_eq!(body_json(res.body())["success"], true);

        let config = state.config();
        assert_eq!(config.app.port, 8080);
        assert!(!config.app.debug);
        assert_eq!(config.ui.theme, "dark");
        assert_eq!(config.ui.default_volume, 45);
    }

    #[tokio::test]
    async fn test_update_app_config_rejects_hostname() {
        let dir = TempDir::new().unwrap();
        let state = offline_state(&dir);
        let api = routes(state.clone());

        let res = warp::test::request()
            .method("POST")
            .path("/update_app_config")
            .header("content-type", FORM)
            .body("host=localhost&port=8080")
            .reply(&api)
            .await;

        assert_eq!(body_json(res.body())["success"], false);
        assert_eq!(state.config().app.host, "0.0.0.0");
        assert_eq!(state.config().app.port, 5050);

        let res = warp::test::request()
            .method("POST")
            .path("/update_config")
            .json(&json!({"app": {"host": "localhost"}}))
            .reply(&api)
            .await;
        assert_eq!(body_json(res.body())["success"], false);
        assert_eq!(state.config().app.host, "0.0.0.0");
    }

    #[tokio::test]
    async fn test_update_config_json() {
        let dir = TempDir::new().unwrap();
        let state = offline_state(&dir);
        let api = routes(state.clone());

        let res = warp::test::request()
            .method("POST")
            .path("/update_config")
            .json(&json!({"ui": {"theme": "dark", "unknown": 1}}))
            .reply(&api)
            .await;
        assert_eq!(body_json(res.body())["success"], true);
        assert_eq!(state.config().ui.theme, "dark");

        let res = warp::test::request()
            .method("POST")
            .path("/update_config")
            .json(&json!({"ui": {"default_volume": "loud"}}))
            .reply(&api)
            .await;
        assert_eq!(body_json(res.body())["success"], false);
        assert_eq!(state.config().ui.default_volume, 30);
    }

    #[tokio::test]
    async fn test_test_connection() {
        let dir = TempDir::new().unwrap();
        let api = routes(offline_state(&dir));

        let res = warp::test::request()
            .method("POST")
            .path("/test_connection")
            .json(&json!({"ip": "127.0.0.1"}))
            .reply(&api)
            .await;
        assert_eq!(body_json(res.body())["message"], "IP and port are required");

        let res = warp::test::request()
            .method("POST")
            .path("/test_connection")
            .json(&json!({"ip": "127.0.0.1", "port": "1"}))
            .reply(&api)
            .await;
        assert_eq!(
            body_json(res.body()),
            json!({"success": false, "message": "Could not connect to device"})
        );
    }

    #[tokio::test]
    async fn test_rediscover_without_new_info() {
        let dir = TempDir::new().unwrap();
        let api = routes(offline_state(&dir));

        let res = warp::test::request()
            .method("POST")
            .path("/rediscover_device")
            .reply(&api)
            .await;

        assert_eq!(
            body_json(res.body()),
            json!({"success": false, "message": "No new device information discovered"})
        );
    }

    #[tokio::test]
    async fn test_pages_render() {
        let dir = TempDir::new().unwrap();
        let api = routes(offline_state(&dir));

        for path in ["/manage_stations", "/settings"] {
            let res = warp::test::request().method("GET").path(path).reply(&api).await;
            assert_eq!(res.status(), StatusCode::OK, "{}", path);
            assert!(res.headers()["content-type"].to_str().unwrap().starts_with("text/html"));
        }
    }
}
