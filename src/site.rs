use std::{convert::Infallible, path::Path};

use axum::{
    http::{header, HeaderValue},
    response::Html,
    routing::{get, MethodRouter},
};
use tower_http::{
    services::{ServeDir, ServeFile},
    set_header::SetResponseHeader,
};

use crate::{auth::handlers::ENDPOINTS, state::AppState};

/// Serves files from `dir`; unknown paths get `index.html` so client-side
/// routes resolve. Responses are never cached.
pub fn static_files(
    dir: &Path,
) -> SetResponseHeader<ServeDir<ServeFile>, HeaderValue> {
    let index = ServeFile::new(dir.join("index.html"));
    let serve = ServeDir::new(dir).fallback(index);
    SetResponseHeader::overriding(serve, header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"))
}

/// `GET /` in development: an HTML index of the API endpoints.
pub fn sitemap_route() -> MethodRouter<AppState, Infallible> {
    get(|| async { Html(render_sitemap(ENDPOINTS)) })
}

pub fn render_sitemap(endpoints: &[(&str, &str)]) -> String {
    let items: String = endpoints
        .iter()
        .map(|(method, path)| format!("<li><code>{method}</code> <a href=\"{path}\">{path}</a></li>"))
        .collect();
    format!(
        "<!doctype html><html><head><title>API endpoints</title></head>\
         <body><h1>API endpoints</h1><ul>{items}</ul></body></html>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use std::fs;
    use tower::ServiceExt;

    fn public_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("index.html"), "<html>app shell</html>").unwrap();
        fs::create_dir(dir.path().join("assets")).unwrap();
        fs::write(dir.path().join("assets/app.js"), "console.log('hi')").unwrap();
        dir
    }

    async fn get_path(app: Router, uri: &str) -> (StatusCode, Option<HeaderValue>, String) {
        let res = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let cache = res.headers().get(header::CACHE_CONTROL).cloned();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, cache, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn serves_existing_file_uncached() {
        let dir = public_dir();
        let app = Router::new().fallback_service(static_files(dir.path()));
        let (status, cache, body) = get_path(app, "/assets/app.js").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "console.log('hi')");
        assert_eq!(cache.unwrap(), "max-age=0");
    }

    #[tokio::test]
    async fn unknown_path_falls_back_to_index() {
        let dir = public_dir();
        let app = Router::new().fallback_service(static_files(dir.path()));
        let (status, _, body) = get_path(app, "/some/client/route").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<html>app shell</html>");
    }

    #[tokio::test]
    async fn root_serves_index() {
        let dir = public_dir();
        let app = Router::new().fallback_service(static_files(dir.path()));
        let (status, _, body) = get_path(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("app shell"));
    }

    #[test]
    fn sitemap_lists_every_endpoint() {
        let html = render_sitemap(ENDPOINTS);
        for (method, path) in ENDPOINTS {
            assert!(html.contains(method));
            assert!(html.contains(&format!("href=\"{path}\"")));
        }
    }
}
