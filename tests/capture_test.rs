//! End-to-end page capture against a local mock server

mod common;

use common::{create_test_dir, create_test_html, mock_asset, mock_page, snapshot_dirs, test_config, test_engine};
use kodegen_tools_stash::CaptureError;
use kodegen_tools_stash::utils::hash_hex;
use mockito::{Matcher, Server};
use url::Url;

fn host_dir(server: &Server) -> String {
    let url = Url::parse(&server.url()).expect("server url");
    format!(
        "{}_{}",
        url.host_str().expect("host"),
        url.port().expect("port")
    )
}

#[tokio::test]
async fn capture_stores_page_and_both_assets() {
    let mut server = Server::new_async().await;
    let dir = create_test_dir();
    let config = test_config(dir.path(), &server);

    let base = server.url();
    let html = create_test_html(
        "Two Assets",
        &format!(
            r#"<link rel="stylesheet" href="{base}/static/site.css">
               <img src="img/logo.png" alt="logo">"#
        ),
    );
    let _page = mock_page(&mut server, "/post.html", &html).await;
    let css = mock_asset(&mut server, "/static/site.css", "text/css", b"body{color:red}").await;
    let png = mock_asset(&mut server, "/img/logo.png", "image/png", &[0x89, b'P', b'N', b'G']).await;

    let engine = test_engine(&config);
    let url = Url::parse(&format!("{base}/post.html")).expect("page url");
    let result = engine.capture(&url).await.expect("capture succeeds");

    css.assert_async().await;
    png.assert_async().await;
    assert_eq!(result.asset_count, 2);
    assert_eq!(result.title, "Two Assets");

    let site = dir.path().join(&result.cache_dir);
    let index = std::fs::read_to_string(site.join("index.html")).expect("index.html");
    let host = host_dir(&server);
    assert!(index.contains(&format!(r#"href="assets/{host}/static/site.css""#)));
    assert!(index.contains(&format!(r#"src="assets/{host}/img/logo.png""#)));
    assert!(!index.contains(&format!("{base}/static/site.css")));

    assert_eq!(
        std::fs::read(site.join("assets").join(&host).join("static").join("site.css")).expect("css file"),
        b"body{color:red}"
    );
    assert!(site.join("assets").join(&host).join("img").join("logo.png").is_file());
}

#[tokio::test]
async fn query_asset_on_second_host_is_stored_under_hashed_name() {
    let mut server = Server::new_async().await;
    let dir = create_test_dir();
    let config = test_config(dir.path(), &server);

    let base = server.url();
    let port = Url::parse(&base).expect("server url").port().expect("port");
    let other = format!("http://localhost:{port}");
    let html = create_test_html(
        "Two Hosts",
        &format!(
            r#"<script src="{base}/a.js"></script>
               <style>body {{ background: url('{other}/b.css?v=1'); }}</style>"#
        ),
    );
    let _page = mock_page(&mut server, "/two-hosts", &html).await;
    let js = mock_asset(&mut server, "/a.js", "application/javascript", b"let a = 1;").await;
    let css = server
        .mock("GET", "/b.css")
        .match_query(Matcher::UrlEncoded("v".into(), "1".into()))
        .with_status(200)
        .with_header("content-type", "text/css")
        .with_body("p{margin:0}")
        .create_async()
        .await;

    let engine = test_engine(&config);
    let url = Url::parse(&format!("{base}/two-hosts")).expect("page url");
    let result = engine.capture(&url).await.expect("capture succeeds");

    js.assert_async().await;
    css.assert_async().await;
    assert_eq!(result.asset_count, 2);

    let site = dir.path().join(&result.cache_dir);
    let index = std::fs::read_to_string(site.join("index.html")).expect("index.html");
    assert!(!index.contains(&format!("{base}/a.js")));
    assert!(!index.contains(&format!("{other}/b.css")));

    let css_name = format!("b_{}.css", &hash_hex("v=1")[..8]);
    assert!(index.contains(&format!("url('assets/localhost_{port}/{css_name}')")));
    assert_eq!(
        std::fs::read(site.join("assets").join(format!("localhost_{port}")).join(&css_name))
            .expect("css file"),
        b"p{margin:0}"
    );
}

#[tokio::test]
async fn escaped_asset_name_resolves_from_saved_page() {
    let mut server = Server::new_async().await;
    let dir = create_test_dir();
    let config = test_config(dir.path(), &server);

    let base = server.url();
    let html = create_test_html("Escaped", r#"<img src="/my%20logo.png" alt="logo">"#);
    let _page = mock_page(&mut server, "/escaped", &html).await;
    let png = mock_asset(&mut server, "/my%20logo.png", "image/png", &[0x89, b'P', b'N', b'G']).await;

    let engine = test_engine(&config);
    let url = Url::parse(&format!("{base}/escaped")).expect("page url");
    let result = engine.capture(&url).await.expect("capture succeeds");

    png.assert_async().await;
    assert_eq!(result.asset_count, 1);

    let index_path = dir.path().join(&result.cache_dir).join("index.html");
    let index = std::fs::read_to_string(&index_path).expect("index.html");
    let reference = format!("assets/{}/my%20logo.png", host_dir(&server));
    assert!(index.contains(&format!(r#"src="{reference}""#)));

    // Resolve the reference the way a browser does for a file:// page
    let page = Url::from_file_path(&index_path).expect("file url");
    let resolved = page
        .join(&reference)
        .expect("resolve reference")
        .to_file_path()
        .expect("file path");
    assert!(resolved.ends_with("my logo.png"));
    assert_eq!(
        std::fs::read(&resolved).expect("asset on disk"),
        [0x89, b'P', b'N', b'G']
    );
}

#[tokio::test]
async fn failed_asset_is_dropped_and_left_remote() {
    let mut server = Server::new_async().await;
    let dir = create_test_dir();
    let config = test_config(dir.path(), &server);

    let base = server.url();
    let html = create_test_html(
        "One Missing",
        &format!(
            r#"<script src="{base}/a.js"></script>
               <script src="{base}/missing.js"></script>
               <div style="background:url('{base}/bg.webp')"></div>"#
        ),
    );
    let _page = mock_page(&mut server, "/page", &html).await;
    let _a = mock_asset(&mut server, "/a.js", "application/javascript", b"let a = 1;").await;
    let _bg = mock_asset(&mut server, "/bg.webp", "image/webp", b"RIFF").await;
    let missing = server
        .mock("GET", "/missing.js")
        .with_status(404)
        .create_async()
        .await;

    let engine = test_engine(&config);
    let url = Url::parse(&format!("{base}/page")).expect("page url");
    let result = engine.capture(&url).await.expect("capture succeeds");

    missing.assert_async().await;
    assert_eq!(result.asset_count, 2);

    let index = std::fs::read_to_string(dir.path().join(&result.cache_dir).join("index.html"))
        .expect("index.html");
    assert!(index.contains(&format!(r#"src="{base}/missing.js""#)));
    assert!(index.contains(&format!("url('assets/{}/bg.webp')", host_dir(&server))));
}

#[tokio::test]
async fn bad_page_status_fails_and_leaves_nothing_behind() {
    let mut server = Server::new_async().await;
    let dir = create_test_dir();
    let config = test_config(dir.path(), &server);

    let _gone = server
        .mock("GET", "/gone")
        .with_status(410)
        .create_async()
        .await;

    let engine = test_engine(&config);
    let url = Url::parse(&format!("{}/gone", server.url())).expect("page url");
    let err = engine.capture(&url).await.expect_err("capture fails");

    assert!(matches!(err, CaptureError::BadResponse { status: 410, .. }));
    assert!(snapshot_dirs(dir.path()).is_empty());
}

#[tokio::test]
async fn non_http_url_is_rejected() {
    let server = Server::new_async().await;
    let dir = create_test_dir();
    let config = test_config(dir.path(), &server);

    let engine = test_engine(&config);
    let url = Url::parse("ftp://example.com/file.html").expect("ftp url");
    assert!(matches!(
        engine.capture(&url).await,
        Err(CaptureError::UnsupportedScheme(scheme)) if scheme == "ftp"
    ));
}

#[tokio::test]
async fn oversized_page_is_rejected() {
    let mut server = Server::new_async().await;
    let dir = create_test_dir();
    let config = kodegen_tools_stash::StashConfig::builder()
        .data_dir(dir.path())
        .api_base_url(format!("{}/api/", server.url()))
        .max_page_size_bytes(16)
        .build()
        .expect("config");

    let _page = mock_page(&mut server, "/big", &"x".repeat(64)).await;

    let engine = test_engine(&config);
    let url = Url::parse(&format!("{}/big", server.url())).expect("page url");
    assert!(matches!(
        engine.capture(&url).await,
        Err(CaptureError::TooLarge { limit: 16, .. })
    ));
    assert!(snapshot_dirs(dir.path()).is_empty());
}

#[tokio::test]
async fn title_falls_back_to_host() {
    let mut server = Server::new_async().await;
    let dir = create_test_dir();
    let config = test_config(dir.path(), &server);

    let _page = mock_page(&mut server, "/untitled", "<html><body>hi</body></html>").await;

    let engine = test_engine(&config);
    let url = Url::parse(&format!("{}/untitled", server.url())).expect("page url");
    let result = engine.capture(&url).await.expect("capture succeeds");
    assert_eq!(Some(result.title.as_str()), url.host_str());
    assert_eq!(result.asset_count, 0);
}
