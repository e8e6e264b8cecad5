use std::sync::Arc;

use criterion::*;
use hearth::{Method, Request, Response, RoutePath, RouteTree};

fn noop_handler(_req: &Request, _res: &mut Response) {}

fn build_tree() -> RouteTree {
    let mut tree = RouteTree::new();
    for path in ["/", "/users", "/users/:id", "/users/:id/posts", "/users/:id/posts/:post_id", "/health"] {
        tree.add_route(RoutePath::new(path).unwrap())
            .unwrap()
            .add_handler(Method::Get.slot(), Arc::new(noop_handler));
    }
    tree
}

fn criterion_benchmark(c: &mut Criterion) {
    let tree = build_tree();
    let mut group = c.benchmark_group("route_tree");

    group.bench_function("literal_lookup", |b| {
        b.iter(|| tree.find_route_with_params(black_box("/users")))
    });

    group.bench_function("path_parameter_lookup", |b| {
        b.iter(|| tree.find_route_with_params(black_box("/users/42/posts/7")))
    });

    group.bench_function("unknown_route_lookup", |b| {
        b.iter(|| tree.find_route_with_params(black_box("/nope/at/all")))
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
