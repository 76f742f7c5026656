//! Shared test fixtures for the flashdeck integration tests.
//!
//! Provides temp deck directories populated from YAML snippets, and a tiny
//! loopback HTTP server for download tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::thread;

use flate2::write::GzEncoder;
use flate2::Compression;

pub const GEO_YAML: &str = r#"
decks:
  - name: geo
    cards:
      - ["Capital of France?", "Paris"]
      - ["Capital of Japan?", "Tokyo", "Formerly Edo"]
"#;

pub const MATH_YAML: &str = r#"
decks:
  - name: math
    cards:
      - ["2 + 2", "4"]
"#;

/// Create a temp directory holding the given `(file name, contents)` pairs.
///
/// The caller must keep the `TempDir` alive for the duration of the test.
pub fn deck_dir(files: &[(&str, &str)]) -> tempfile::TempDir {
    let tmp_dir = tempfile::tempdir().unwrap();
    for (name, contents) in files {
        write_file(tmp_dir.path(), name, contents);
    }
    tmp_dir
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

pub fn write_gz(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    let file = fs::File::create(&path).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(contents.as_bytes()).unwrap();
    encoder.finish().unwrap();
    path
}

/// Config root with a `decks` subdirectory holding the given files.
pub fn config_root(files: &[(&str, &str)]) -> tempfile::TempDir {
    let tmp_dir = tempfile::tempdir().unwrap();
    let decks = tmp_dir.path().join("decks");
    fs::create_dir_all(&decks).unwrap();
    for (name, contents) in files {
        write_file(&decks, name, contents);
    }
    tmp_dir
}

/// Serve fixed responses on a loopback port and return the base URL.
///
/// Paths not in `routes` get a 404. The server thread lives until the test
/// process exits.
pub fn serve(routes: &[(&str, &str)]) -> String {
    let routes: HashMap<String, String> = routes
        .iter()
        .map(|(path, body)| (path.to_string(), body.to_string()))
        .collect();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let mut stream = match stream {
                Ok(stream) => stream,
                Err(_) => continue,
            };
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            if reader.read_line(&mut request_line).is_err() {
                continue;
            }
            loop {
                let mut header = String::new();
                match reader.read_line(&mut header) {
                    Ok(0) => break,
                    Ok(_) if header == "\r\n" || header == "\n" => break,
                    Ok(_) => continue,
                    Err(_) => break,
                }
            }
            let path = request_line.split_whitespace().nth(1).unwrap_or("/");
            let (status, body) = match routes.get(path) {
                Some(body) => ("200 OK", body.as_str()),
                None => ("404 Not Found", "not found"),
            };
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
        }
    });

    format!("http://{}", addr)
}
