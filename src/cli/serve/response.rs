//! HTTP responses for the development server.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::embed::serve::{HOTRELOAD_JS, HotreloadVars, inject};
use crate::utils::mime::{self, types};

/// Respond with a file from the output directory.
pub fn respond_file(request: Request, path: &Path, ws_port: Option<u16>) -> Result<()> {
    respond_path(request, 200, path, ws_port)
}

/// Respond with the site's `404.html`, or a plain body when there is none.
pub fn respond_not_found(request: Request, output: &Path, ws_port: Option<u16>) -> Result<()> {
    let custom = output.join("404.html");
    if custom.is_file() {
        return respond_path(request, 404, &custom, ws_port);
    }
    send(request, 404, types::PLAIN, b"404 Not Found".to_vec())
}

/// The initial build has not finished yet; the page polls until it has.
pub fn respond_building(request: Request) -> Result<()> {
    const BODY: &str = "<!DOCTYPE html><html><head><meta charset=\"utf-8\">\
        <meta http-equiv=\"refresh\" content=\"1\"><title>Building</title></head>\
        <body><p>Building site\u{2026}</p></body></html>";
    send(request, 503, types::HTML, BODY.as_bytes().to_vec())
}

/// Server is shutting down.
pub fn respond_unavailable(request: Request) -> Result<()> {
    send(request, 503, types::PLAIN, b"503 Service Unavailable".to_vec())
}

fn respond_path(request: Request, status: u16, path: &Path, ws_port: Option<u16>) -> Result<()> {
    let content_type = mime::from_path(path);
    if request.method() == &Method::Head {
        let response = Response::empty(StatusCode(status))
            .with_header(header("Content-Type", content_type)?);
        return request.respond(response).map_err(Into::into);
    }

    let body = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let body = match ws_port {
        Some(port) if content_type == types::HTML => with_hotreload(body, port),
        _ => body,
    };
    send(request, status, content_type, body)
}

/// Inline the live-reload client into an HTML body.
fn with_hotreload(body: Vec<u8>, ws_port: u16) -> Vec<u8> {
    match String::from_utf8(body) {
        Ok(html) => {
            let script = HOTRELOAD_JS.render(&HotreloadVars { ws_port });
            inject(&html, &script).into_bytes()
        }
        Err(e) => e.into_bytes(),
    }
}

fn send(request: Request, status: u16, content_type: &str, body: Vec<u8>) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(header("Content-Type", content_type)?)
        .with_header(header("Cache-Control", "no-store")?);
    request.respond(response)?;
    Ok(())
}

fn header(key: &str, value: &str) -> Result<Header> {
    Header::from_bytes(key, value).map_err(|()| anyhow!("invalid header `{key}: {value}`"))
}
