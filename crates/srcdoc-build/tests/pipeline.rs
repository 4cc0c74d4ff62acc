//! End-to-end pipeline tests: source files on disk in, merged
//! document and diagnostics out.

use std::fs;
use std::sync::mpsc::channel;

use srcdoc_build::{build, parse, Config, Input, Output, OutputKind, ParseOptions};
use srcdoc_core::{Message, MessageHandler, Severity, Uri};

struct Collected {
    handler: MessageHandler,
    rx: std::sync::mpsc::Receiver<Message>,
}

fn collector() -> Collected {
    let (tx, rx) = channel();
    let handler = MessageHandler::new(move |m| {
        let _ = tx.send(m);
    });
    Collected { handler, rx }
}

impl Collected {
    fn finish(self) -> Vec<Message> {
        self.handler.stop();
        self.rx.iter().collect()
    }
}

fn write_project(files: &[(&str, &str)]) -> (tempfile::TempDir, Uri) {
    let tmp = tempfile::tempdir().unwrap();
    for (name, content) in files {
        let path = tmp.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    let dir = Uri::from_path(tmp.path());
    (tmp, dir)
}

fn go_input(dir: &Uri) -> Input {
    let mut input = Input {
        lang: "go".into(),
        dir: dir.clone(),
        recursive: true,
        ..Input::default()
    };
    input.sanitize(&Uri::default()).unwrap();
    input
}

fn serial() -> ParseOptions {
    ParseOptions {
        serial: true,
        ..ParseOptions::default()
    }
}

#[tokio::test]
async fn test_full_pipeline() {
    let (_tmp, dir) = write_project(&[
        (
            "doc.go",
            "// <apidoc version=\"1.0.0\">\n// <title>T</title>\n// <mimetype>application/json</mimetype>\n// </apidoc>\npackage a\n",
        ),
        (
            "users.go",
            "/* <api method=\"GET\">\n<path path=\"/users/{id}\"><param name=\"id\" type=\"number\"/></path>\n</api> */\npackage a\n",
        ),
    ]);

    let c = collector();
    let doc = parse(&c.handler, &[go_input(&dir)], &serial()).await;
    let msgs = c.finish();

    assert!(
        !msgs.iter().any(|m| m.severity == Severity::Erro),
        "unexpected errors: {msgs:?}"
    );
    assert_eq!(doc.title.as_ref().unwrap().text(), "T");
    assert_eq!(doc.apis.len(), 1);
    assert_eq!(doc.apis[0].method.as_ref().unwrap().method(), "GET");
}

#[tokio::test]
async fn test_string_literals_produce_no_blocks() {
    let (_tmp, dir) = write_project(&[(
        "s.go",
        "package a\nvar s = \"// <api/> not docs\"\n",
    )]);

    let c = collector();
    let doc = parse(&c.handler, &[go_input(&dir)], &serial()).await;
    let msgs = c.finish();

    assert!(msgs.is_empty(), "unexpected: {msgs:?}");
    assert!(doc.is_empty());
}

#[tokio::test]
async fn test_concurrent_parse_matches_serial_content() {
    let mut files: Vec<(String, String)> = Vec::new();
    for i in 0..20 {
        files.push((
            format!("f{i}.go"),
            format!("// <api method=\"GET\" id=\"api-{i}\">\n// <path path=\"/r/{i}\"/>\n// </api>\n"),
        ));
    }
    let borrowed: Vec<(&str, &str)> = files
        .iter()
        .map(|(n, c)| (n.as_str(), c.as_str()))
        .collect();
    let (_tmp, dir) = write_project(&borrowed);

    let c = collector();
    let doc = parse(&c.handler, &[go_input(&dir)], &ParseOptions::default()).await;
    let msgs = c.finish();

    assert!(
        !msgs.iter().any(|m| m.severity == Severity::Erro),
        "unexpected errors: {msgs:?}"
    );
    assert_eq!(doc.apis.len(), 20);

    // Content is deterministic even when order is not.
    let mut ids: Vec<String> = doc
        .apis
        .iter()
        .map(|a| a.id.as_ref().unwrap().raw().to_string())
        .collect();
    ids.sort();
    let expected: Vec<String> = {
        let mut v: Vec<String> = (0..20).map(|i| format!("api-{i}")).collect();
        v.sort();
        v
    };
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn test_duplicate_across_files_is_reported_once() {
    let (_tmp, dir) = write_project(&[
        ("a.go", "// <api method=\"GET\"><path path=\"/x\"/></api>\n"),
        ("b.go", "// <api method=\"GET\"><path path=\"/x\"/></api>\n"),
    ]);

    let c = collector();
    let doc = parse(&c.handler, &[go_input(&dir)], &serial()).await;
    let msgs = c.finish();

    let dups: Vec<_> = msgs
        .iter()
        .filter(|m| m.key == "err-duplicate-value")
        .collect();
    assert_eq!(dups.len(), 1);
    assert_eq!(doc.apis.len(), 2);
}

#[tokio::test]
async fn test_unclosed_comment_reports_and_continues_with_other_files() {
    let (_tmp, dir) = write_project(&[
        ("bad.go", "/* never closed\n"),
        ("good.go", "// <api method=\"GET\"><path path=\"/ok\"/></api>\n"),
    ]);

    let c = collector();
    let doc = parse(&c.handler, &[go_input(&dir)], &serial()).await;
    let msgs = c.finish();

    assert!(msgs.iter().any(|m| m.key == "err-not-found-end-flag"));
    assert_eq!(doc.apis.len(), 1);
}

#[tokio::test]
async fn test_cancellation_stops_workers() {
    let mut files: Vec<(String, String)> = Vec::new();
    for i in 0..50 {
        files.push((
            format!("f{i}.go"),
            format!("// <api method=\"GET\" id=\"c-{i}\">\n// <path path=\"/c/{i}\"/>\n// </api>\n"),
        ));
    }
    let borrowed: Vec<(&str, &str)> = files
        .iter()
        .map(|(n, c)| (n.as_str(), c.as_str()))
        .collect();
    let (_tmp, dir) = write_project(&borrowed);

    let opts = ParseOptions::default();
    opts.cancel.cancel();

    let c = collector();
    let doc = parse(&c.handler, &[go_input(&dir)], &opts).await;
    c.finish();

    // Cancelled before any worker ran: nothing was decoded.
    assert!(doc.apis.is_empty());
}

#[tokio::test]
async fn test_build_writes_output_only_without_errors() {
    let (tmp, dir) = write_project(&[
        ("ok.go", "// <api method=\"GET\"><path path=\"/x\"/></api>\n"),
    ]);
    let out = Uri::from_path(tmp.path().join("out.xml"));
    let output = Output {
        path: out.clone(),
        kind: OutputKind::Apidoc,
        style: None,
    };

    let c = collector();
    let wrote = build(&c.handler, &output, &[go_input(&dir)], &serial())
        .await
        .unwrap();
    let msgs = c.finish();
    assert!(wrote);
    assert!(out.exists());
    assert!(msgs.iter().any(|m| m.severity == Severity::Succ));

    // Now with an error in the sources: no output file.
    let (tmp2, dir2) = write_project(&[
        // Missing required path element.
        ("bad.go", "// <api method=\"GET\"></api>\n"),
    ]);
    let out2 = Uri::from_path(tmp2.path().join("out.xml"));
    let output2 = Output {
        path: out2.clone(),
        kind: OutputKind::Apidoc,
        style: None,
    };

    let c = collector();
    let wrote = build(&c.handler, &output2, &[go_input(&dir2)], &serial())
        .await
        .unwrap();
    c.finish();
    assert!(!wrote);
    assert!(!out2.exists());
}

#[tokio::test]
async fn test_config_end_to_end() {
    let (tmp, dir) = write_project(&[
        (
            "api.go",
            "// <api method=\"GET\"><path path=\"/x\"/></api>\npackage a\n",
        ),
    ]);
    fs::write(
        tmp.path().join(".srcdoc.yaml"),
        format!(
            "version: {}\ninputs:\n  - lang: go\n    dir: .\noutput:\n  path: api.xml\n  type: apidoc\n",
            srcdoc_core::VERSION
        ),
    )
    .unwrap();

    let cfg = Config::load(&dir).unwrap();
    let c = collector();
    let bytes = cfg.buffer(&c.handler).await.unwrap();
    c.finish();
    let xml = String::from_utf8(bytes).unwrap();
    assert!(xml.contains("<api "));
    assert!(xml.contains("path=\"/x\""));
}
