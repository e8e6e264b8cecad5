use std::path::{Path, PathBuf};

use crate::http::{Request, Response, Status};

/// Serves files out of `location` for a request whose URI has `mount` as
/// its prefix.
///
/// - `location` missing entirely: 404.
/// - `location` a regular file: that file is served regardless of the rest
///   of the request path (mirrors the original's single-file static route).
/// - `location` a directory: the URI tail past `mount` selects a file
///   under it, falling back to `index.html` when the tail is empty.
///
/// Path traversal is rejected before any filesystem access: a URI
/// containing `..`, `//`, or `~` never resolves to a file, matching the
/// original implementation's `static_route::matches` guard.
pub fn serve(mount: &str, location: &Path, request: &Request, response: &mut Response) {
    if !is_safe(request.uri()) {
        not_found(response);
        return;
    }

    if !location.exists() {
        not_found(response);
        return;
    }

    if !location.is_dir() {
        match std::fs::read(location) {
            Ok(body) => ok(response, body),
            Err(_) => not_found(response),
        }
        return;
    }

    let mut tail = request.uri().strip_prefix(mount).unwrap_or("");
    tail = tail.strip_prefix('/').unwrap_or(tail);

    let file_path: PathBuf = if tail.is_empty() {
        location.join("index.html")
    } else {
        location.join(tail)
    };

    if !file_path.exists() {
        not_found(response);
        return;
    }

    match std::fs::read(&file_path) {
        Ok(body) => ok(response, body),
        Err(_) => not_found(response),
    }
}

fn is_safe(uri: &str) -> bool {
    !uri.contains("..") && !uri.contains("//") && !uri.contains('~')
}

fn ok(response: &mut Response, body: Vec<u8>) {
    response.set_status(Status::Ok);
    response.set_body(body);
}

fn not_found(response: &mut Response) {
    response.set_status(Status::NotFound);
    response.set_body(b"404 Not found".to_vec());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use std::io::Write;

    fn tempdir() -> PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push(format!("hearth-static-files-test-{:p}", &dir));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn serves_index_html_for_directory_root() {
        let dir = tempdir();
        let mut file = std::fs::File::create(dir.join("index.html")).unwrap();
        file.write_all(b"hello").unwrap();

        let request = Request::new(Method::Get, "/static");
        let mut response = Response::new();
        serve("/static", &dir, &request, &mut response);

        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.body(), b"hello");
    }

    #[test]
    fn serves_named_file_under_directory() {
        let dir = tempdir();
        std::fs::write(dir.join("style.css"), b"body{}").unwrap();

        let request = Request::new(Method::Get, "/static/style.css");
        let mut response = Response::new();
        serve("/static", &dir, &request, &mut response);

        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.body(), b"body{}");
    }

    #[test]
    fn missing_location_is_not_found() {
        let request = Request::new(Method::Get, "/static/nope.txt");
        let mut response = Response::new();
        serve("/static", Path::new("/does/not/exist"), &request, &mut response);

        assert_eq!(response.status(), Status::NotFound);
        assert_eq!(response.body(), b"404 Not found");
    }

    #[test]
    fn traversal_attempt_is_rejected_before_filesystem_access() {
        let dir = tempdir();
        let request = Request::new(Method::Get, "/static/../../etc/passwd");
        let mut response = Response::new();
        serve("/static", &dir, &request, &mut response);

        assert_eq!(response.status(), Status::NotFound);
    }
}
