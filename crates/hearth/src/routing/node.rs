use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::http::METHOD_COUNT;
use crate::server::Handler;

/// A node in the radix tree representing one route, or one segment of a
/// route on the path to it.
///
/// The original source stores a path-parameter child as a raw pointer that
/// aliases an element owned by `children`. Rust can't express that safely,
/// so this keeps an index into `children` instead (see `DESIGN.md`, Open
/// Question on the original's `route_node*` aliasing).
pub struct RouteNode {
    segment: String,
    is_path_parameter: bool,
    handlers: [Option<Handler>; METHOD_COUNT],
    children: Vec<RouteNode>,
    path_parameter_child: Option<usize>,
    static_files: Option<(String, PathBuf)>,
}

impl RouteNode {
    pub fn new(segment: impl Into<String>) -> Self {
        let segment = segment.into();
        let is_path_parameter = segment.starts_with(':');

        Self {
            segment,
            is_path_parameter,
            handlers: Default::default(),
            children: Vec::new(),
            path_parameter_child: None,
            static_files: None,
        }
    }

    pub fn segment(&self) -> &str {
        &self.segment
    }

    pub fn is_path_parameter(&self) -> bool {
        self.is_path_parameter
    }

    /// The path-parameter name with its leading `:` stripped, if this node
    /// is a path-parameter node.
    pub fn param_name(&self) -> Option<&str> {
        self.is_path_parameter.then(|| &self.segment[1..])
    }

    pub fn children(&self) -> &[RouteNode] {
        &self.children
    }

    pub fn handlers(&self) -> &[Option<Handler>; METHOD_COUNT] {
        &self.handlers
    }

    /// The mount path and filesystem location this node serves files from,
    /// if [`Self::set_static_files`] registered it as a static route.
    pub fn static_files(&self) -> Option<(&str, &std::path::Path)> {
        self.static_files
            .as_ref()
            .map(|(mount, location)| (mount.as_str(), location.as_path()))
    }

    pub fn set_static_files(&mut self, mount: impl Into<String>, location: PathBuf) {
        self.static_files = Some((mount.into(), location));
    }

    /// Adds a child segment, or returns the existing child with the same
    /// segment text. A node may have at most one path-parameter child; a
    /// second distinct path-parameter segment under the same node is a
    /// registration error.
    pub fn add_child(&mut self, segment: &str) -> Result<&mut RouteNode> {
        if let Some(index) = self.children.iter().position(|c| c.segment == segment) {
            return Ok(&mut self.children[index]);
        }

        let child = RouteNode::new(segment);
        if child.is_path_parameter {
            if self.path_parameter_child.is_some() {
                return Err(Error::PathParameterConflict);
            }
            self.path_parameter_child = Some(self.children.len());
        }

        self.children.push(child);
        Ok(self.children.last_mut().expect("just pushed"))
    }

    pub fn add_handler(&mut self, slot: usize, handler: Handler) {
        self.handlers[slot] = Some(handler);
    }

    /// Finds the child matching a literal segment, preempting the
    /// path-parameter child if both could match — a literal segment always
    /// wins a tie with a path parameter at the same depth.
    pub fn find_child(&self, segment: &str) -> Option<&RouteNode> {
        self.children
            .iter()
            .find(|c| !c.is_path_parameter && c.segment == segment)
            .or_else(|| self.path_parameter_child.map(|i| &self.children[i]))
    }
}
