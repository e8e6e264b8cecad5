use criterion::*;
use hearth::{Request, Response, Status};

const HELLO_REQUEST: &[u8] = b"GET / HTTP/1.1\r\nHost: localhost\r\nUser-Agent: bench\r\n\r\n";
const POST_REQUEST: &[u8] =
    b"POST /users/42/posts HTTP/1.1\r\nHost: localhost\r\nContent-Length: 13\r\n\r\nHello, world!";

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("http_codec");
    group.throughput(Throughput::Bytes(HELLO_REQUEST.len() as u64));

    group.bench_function("parse_request_no_body", |b| {
        b.iter(|| Request::parse(black_box(HELLO_REQUEST)).unwrap())
    });

    group.bench_function("parse_request_with_body", |b| {
        b.iter(|| Request::parse(black_box(POST_REQUEST)).unwrap())
    });

    let response = {
        let mut response = Response::new();
        response.set_status(Status::Ok);
        response.set_header("Connection", "close");
        response.set_body(b"Hello, world!".to_vec());
        response
    };

    group.bench_function("serialize_response", |b| b.iter(|| black_box(&response).to_bytes()));

    let response_bytes = response.to_bytes();
    group.bench_function("parse_response", |b| {
        b.iter(|| Response::parse(black_box(&response_bytes)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
