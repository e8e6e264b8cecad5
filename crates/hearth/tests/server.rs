//! End-to-end scenarios driven over real TCP sockets against a running
//! [`hearth::Server`]. Each test binds its own fixed port to avoid
//! clashing with the others when the suite runs concurrently.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use hearth::{Method, Request, Response, Server, Status};

fn read_response(stream: &mut TcpStream) -> String {
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => buffer.extend_from_slice(&chunk[..n]),
            Err(_) => break,
        }
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

fn send(port: u16, request: &[u8]) -> String {
    // The server posts its initial accepts as part of `start()`, but the
    // listen socket itself is already bound and listening before that, so
    // a short retry loop absorbs the brief window before the first accept
    // is posted.
    for _ in 0..20 {
        if let Ok(mut stream) = TcpStream::connect(("127.0.0.1", port)) {
            stream.write_all(request).unwrap();
            return read_response(&mut stream);
        }
        std::thread::sleep(Duration::from_millis(25));
    }
    panic!("could not connect to 127.0.0.1:{port}");
}

#[test]
fn hello_root_scenario() {
    let port = 18080;
    let mut server = Server::new(port);
    server
        .add_route(
            "/",
            &[Method::Get],
            Arc::new(|_req: &Request, res: &mut Response| {
                res.set_body(b"Hello, world!".to_vec());
            }),
        )
        .unwrap();
    server.start().unwrap();

    let response = send(port, b"GET / HTTP/1.1\r\nHost: x\r\n\r\n");

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("Connection: close\r\n"));
    assert!(response.contains("Content-Length: 13\r\n"));
    assert!(response.ends_with("Hello, world!"));

    server.stop();
}

#[test]
fn path_parameter_scenario() {
    let port = 18081;
    let mut server = Server::new(port);
    server
        .add_route(
            "/:name",
            &[Method::Post],
            Arc::new(|req: &Request, res: &mut Response| {
                let name = req.path_param_str("name").unwrap_or("");
                res.set_body(format!("Hello, {name}!").into_bytes());
            }),
        )
        .unwrap();
    server.start().unwrap();

    let response = send(port, b"POST /world HTTP/1.1\r\nHost: x\r\nContent-Length: 0\r\n\r\n");
    assert!(response.contains("Hello, world!"));

    let response = send(port, b"GET /world HTTP/1.1\r\nHost: x\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 405"));

    server.stop();
}

#[test]
fn static_file_scenario() {
    let port = 18082;

    let mut dir = std::env::temp_dir();
    dir.push(format!("hearth-server-test-static-{port}"));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("about.html"), b"<html>about</html>").unwrap();

    let mut server = Server::new(port);
    server.add_static_route("/pub", dir.clone()).unwrap();
    server.start().unwrap();

    let response = send(port, b"GET /pub/about.html HTTP/1.1\r\nHost: x\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.ends_with("<html>about</html>"));

    let response = send(port, b"GET /pub/../secret HTTP/1.1\r\nHost: x\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 404"));

    server.stop();
}

#[test]
fn parse_failure_scenario() {
    let port = 18083;
    let mut server = Server::new(port);
    server.start().unwrap();

    let response = send(port, b"NOTAMETHOD / HTTP/1.1\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 400"));
    assert!(response.contains(Status::BadRequest.reason()));

    server.stop();
}

#[test]
fn unknown_route_scenario() {
    let port = 18084;
    let mut server = Server::new(port);
    server.start().unwrap();

    let response = send(port, b"GET /nope HTTP/1.1\r\nHost: x\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 404"));
    assert!(response.contains(Status::NotFound.reason()));

    server.stop();
}

#[test]
fn oversize_message_closes_without_response() {
    let port = 18085;
    let mut server = Server::new(port);
    server.start().unwrap();

    let mut body = b"GET / HTTP/1.1\r\nHost: x\r\n\r\n".to_vec();
    body.extend(std::iter::repeat(b'a').take(70 * 1024));

    let response = send(port, &body);
    assert!(response.is_empty());

    server.stop();
}
