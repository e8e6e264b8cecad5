use crate::routing::{RouteNode, RoutePath};

/// A radix tree of routes, rooted at `/`.
///
/// `find_route_with_params` walks the tree one path segment at a time,
/// preferring a literal child over the node's path-parameter child at
/// every step (see [`RouteNode::find_child`]), and collects the path
/// parameter bindings along the way.
pub struct RouteTree {
    root: RouteNode,
}

impl Default for RouteTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTree {
    pub fn new() -> Self {
        Self {
            root: RouteNode::new("/"),
        }
    }

    pub fn root(&self) -> &RouteNode {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut RouteNode {
        &mut self.root
    }

    /// Inserts (or returns the existing) node for `path`, creating any
    /// missing intermediate segments along the way.
    pub fn add_route(&mut self, path: RoutePath<'_>) -> crate::error::Result<&mut RouteNode> {
        let mut node = &mut self.root;
        for segment in path.parts() {
            node = node.add_child(segment)?;
        }
        Ok(node)
    }

    /// Looks up `path`, returning the last node reached, whether every
    /// segment matched, and the path parameters bound along the way (in the
    /// order their segments appeared).
    ///
    /// When a segment fails to match partway through, the walk stops there
    /// and returns `(last_matched_node, false, partial_params)` rather than
    /// discarding the node: a static mount has no child node for the files
    /// under it, so the caller needs the mount node itself to serve them,
    /// not an absence. A trailing empty segment (a URI ending in `/`) is a
    /// segment like any other and can fail to match just as a named one can.
    pub fn find_route_with_params(&self, path: &str) -> (Option<&RouteNode>, bool, Vec<(String, String)>) {
        let mut node = &self.root;
        let mut params = Vec::new();

        if path == "/" {
            return (Some(node), true, params);
        }

        for segment in path.split('/').skip(1) {
            match node.find_child(segment) {
                Some(child) => {
                    if let Some(name) = child.param_name() {
                        params.push((name.to_string(), segment.to_string()));
                    }
                    node = child;
                }
                None => return (Some(node), false, params),
            }
        }

        (Some(node), true, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;

    fn noop_handler(_req: &crate::http::Request, _res: &mut crate::http::Response) {}

    #[test]
    fn finds_literal_route() {
        let mut tree = RouteTree::new();
        let path = RoutePath::new("/hello").unwrap();
        tree.add_route(path)
            .unwrap()
            .add_handler(Method::Get.slot(), std::sync::Arc::new(noop_handler));

        let (found, matched, params) = tree.find_route_with_params("/hello");
        assert!(found.is_some());
        assert!(matched);
        assert!(params.is_empty());
    }

    #[test]
    fn finds_path_parameter_route_and_binds_it() {
        let mut tree = RouteTree::new();
        let path = RoutePath::new("/users/:id").unwrap();
        tree.add_route(path)
            .unwrap()
            .add_handler(Method::Get.slot(), std::sync::Arc::new(noop_handler));

        let (found, matched, params) = tree.find_route_with_params("/users/42");
        assert!(found.is_some());
        assert!(matched);
        assert_eq!(params, vec![("id".to_string(), "42".to_string())]);
    }

    #[test]
    fn literal_route_preempts_path_parameter_sibling() {
        let mut tree = RouteTree::new();
        tree.add_route(RoutePath::new("/users/:id").unwrap()).unwrap();
        tree.add_route(RoutePath::new("/users/me").unwrap())
            .unwrap()
            .add_handler(Method::Get.slot(), std::sync::Arc::new(noop_handler));

        let (_, matched, params) = tree.find_route_with_params("/users/me");
        assert!(matched);
        assert!(params.is_empty());
    }

    #[test]
    fn root_path_matches_root_node() {
        let tree = RouteTree::new();
        let (found, matched, params) = tree.find_route_with_params("/");
        assert!(found.is_some());
        assert!(matched);
        assert!(params.is_empty());
    }

    #[test]
    fn unknown_route_returns_last_matched_node_with_matched_false() {
        let tree = RouteTree::new();
        let (found, matched, params) = tree.find_route_with_params("/nope");
        assert!(found.is_some());
        assert!(!matched);
        assert!(params.is_empty());
    }

    #[test]
    fn partial_match_returns_last_matched_ancestor_not_matched() {
        let mut tree = RouteTree::new();
        tree.add_route(RoutePath::new("/pub").unwrap())
            .unwrap()
            .set_static_files("/pub", std::path::PathBuf::from("."));

        let (found, matched, _) = tree.find_route_with_params("/pub/about.html");
        let found = found.unwrap();
        assert!(!matched);
        assert_eq!(found.segment(), "pub");
        assert!(found.static_files().is_some());
    }

    #[test]
    fn trailing_slash_does_not_match_route_registered_without_one() {
        let mut tree = RouteTree::new();
        tree.add_route(RoutePath::new("/hello").unwrap())
            .unwrap()
            .add_handler(Method::Get.slot(), std::sync::Arc::new(noop_handler));

        let (_, matched, _) = tree.find_route_with_params("/hello/");
        assert!(!matched);
    }
}
