#![allow(dead_code)]

use evently_lib::{Page, ViewClient, ViewConfig};
use mockito::ServerGuard;

pub const TOKEN: &str = "tok-123";

/// A server-rendered page carrying the shared chrome (toast surface and
/// anti-forgery meta tag) around `body`.
pub fn document(kind: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><meta name="csrf-token" content="{TOKEN}"></head>
<body><main data-page="{kind}">{body}</main>
<div id="toast" class="toast"><strong id="toast-title">Evently</strong><div id="toast-message"></div></div>
</body></html>"#
    )
}

pub fn document_without_token(kind: &str, body: &str) -> String {
    document(kind, body).replace(&format!(r#"<meta name="csrf-token" content="{TOKEN}">"#), "")
}

pub fn config(server: &ServerGuard) -> ViewConfig {
    ViewConfig {
        base_url: server.url(),
        redirect_delay_ms: 20,
        dialog_close_delay_ms: 20,
        success_flash_ms: 10,
        ..ViewConfig::default()
    }
}

pub fn client(server: &ServerGuard, document: &str, location: &str) -> (ViewClient, Page) {
    client_with(config(server), document, location)
}

pub fn client_with(config: ViewConfig, document: &str, location: &str) -> (ViewClient, Page) {
    let page = Page::parse(document, location, "sessionid=abc");
    let client = ViewClient::new(config, page.clone()).expect("client");
    (client, page)
}

pub fn toast_messages(page: &Page) -> Vec<String> {
    page.toasts().into_iter().map(|t| t.message).collect()
}
