use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use tracing::{event, Level};
use windows::Win32::Networking::WinSock::SOCKET;

use crate::conn::Connection;
use crate::error::Result;
use crate::http::{Method, Request, Response, Status};
use crate::io::{Operation, OperationTarget, Reactor};
use crate::net::{Socket, WsaGuard};
use crate::routing::{serve_static_files, RoutePath, RouteTree};
use crate::server::config::ServerConfig;
use crate::server::handler::{ErrorHandler, Handler};

/// A raw pointer back to the owning [`Server`], captured by the
/// accept/read/write callbacks registered with the reactor at [`Server::start`].
///
/// Mirrors the original source's `this`-capturing lambdas
/// (`iocp_.set_on_accept([this](...) { on_accept(...); })`): the server
/// owns the reactor and stops its dispatch before it is ever dropped
/// (`stop` closes the listen socket and every client connection), so the
/// pointer stays valid for as long as any callback can run. Raw pointers
/// are not `Send`/`Sync` by default; this newtype asserts it the same way
/// [`Connection`]'s own back-pointer to `Server` does.
#[derive(Clone, Copy)]
struct ServerPtr(*const Server);

unsafe impl Send for ServerPtr {}
unsafe impl Sync for ServerPtr {}

/// The embeddable HTTP/1.1 server: owns the listen socket and reactor, the
/// route tree and error-handler table, and the client connection table.
///
/// Grounded on the original source's `server` (`start`/`stop`,
/// `accept_clients`, `on_accept`/`on_read`/`on_write`, `remove_client`,
/// `add_route`/`add_static_route`/`add_error_handler`) and
/// `server_connection` (`handle_request`/`handle_error`).
pub struct Server {
    config: ServerConfig,
    _wsa: WsaGuard,
    listen_socket: Mutex<Option<Socket>>,
    reactor: Option<Reactor>,
    routes: RouteTree,
    error_handlers: HashMap<u16, ErrorHandler>,
    clients: RwLock<HashMap<SOCKET, Arc<Connection>>>,
    is_listening: AtomicBool,
}

impl Server {
    /// Constructs a server listening on `port` with default configuration
    /// (see [`ServerConfig::new`]).
    pub fn new(port: u16) -> Self {
        Self::from_config(ServerConfig::new(port))
    }

    /// Returns a builder seeded with `port` and the documented defaults,
    /// for callers that need to override the backlog, worker thread count,
    /// or initial accept batch size before constructing the server.
    pub fn builder(port: u16) -> ServerConfig {
        ServerConfig::new(port)
    }

    pub fn from_config(config: ServerConfig) -> Self {
        let wsa = WsaGuard::new().expect("Winsock startup should not fail under normal OS conditions");

        let mut error_handlers: HashMap<u16, ErrorHandler> = HashMap::new();
        for status in Status::ALL_KNOWN {
            let handler: ErrorHandler = Arc::new(move |_: &Request, response: &mut Response| {
                response.set_body(status.reason().as_bytes().to_vec());
            });
            error_handlers.insert(status.code(), handler);
        }

        Self {
            config,
            _wsa: wsa,
            listen_socket: Mutex::new(None),
            reactor: None,
            routes: RouteTree::new(),
            error_handlers,
            clients: RwLock::new(HashMap::new()),
            is_listening: AtomicBool::new(false),
        }
    }

    /// Registers `handler` for `path` under each of `methods`. Route
    /// registration after [`Server::start`] is undefined behavior (the
    /// route tree is treated as immutable once the reactor starts
    /// dispatching reads concurrently against it).
    pub fn add_route(
        &mut self,
        path: &str,
        methods: &[Method],
        handler: Handler,
    ) -> Result<&mut crate::routing::RouteNode> {
        let node = self.routes.add_route(RoutePath::new(path)?)?;
        for method in methods {
            node.add_handler(method.slot(), Arc::clone(&handler));
        }
        event!(Level::INFO, path, "added route");
        Ok(node)
    }

    /// Registers a file-serving route at `path`, GET only, backed by
    /// `location` (a single file served as-is, or a directory served with
    /// an `index.html` fallback — see [`crate::routing::serve_static_files`]).
    pub fn add_static_route(
        &mut self,
        path: &str,
        location: impl Into<PathBuf>,
    ) -> Result<&mut crate::routing::RouteNode> {
        let node = self.routes.add_route(RoutePath::new(path)?)?;
        node.set_static_files(path.to_string(), location.into());
        event!(Level::INFO, path, "added static route");
        Ok(node)
    }

    /// Overrides the response an error handler produces for `status`.
    pub fn add_error_handler(&mut self, status: Status, handler: ErrorHandler) {
        self.error_handlers.insert(status.code(), handler);
    }

    /// Starts accepting connections: creates and binds the listen socket,
    /// starts the reactor's worker pool, and posts the configured number
    /// of initial accepts. Returns once the server is accepting; does not
    /// block. The host must keep the process alive afterward.
    pub fn start(&mut self) -> Result<()> {
        let socket = Socket::create(self.config.port)?;
        socket.listen(self.config.backlog)?;

        let mut reactor = Reactor::new()?;
        reactor.associate(socket.raw())?;

        let accept_ptr = ServerPtr(self as *const Server);
        let read_ptr = accept_ptr;
        let write_ptr = accept_ptr;

        reactor.set_on_accept(Arc::new(move |operation: Box<Operation>| {
            // SAFETY: `accept_ptr` stays valid until `stop` tears the
            // reactor down, which happens before `self` can be dropped.
            unsafe { (*accept_ptr.0).on_accept(operation) };
        }));
        reactor.set_on_read(Arc::new(move |operation: Box<Operation>| {
            // SAFETY: see above.
            unsafe { (*read_ptr.0).on_read(operation) };
        }));
        reactor.set_on_write(Arc::new(move |operation: Box<Operation>| {
            // SAFETY: see above.
            unsafe { (*write_ptr.0).on_write(operation) };
        }));

        reactor.start(self.config.worker_threads);

        let listen_raw = socket.raw();
        *self.listen_socket.lock().expect("listen socket mutex poisoned") = Some(socket);
        self.reactor = Some(reactor);
        self.is_listening.store(true, Ordering::SeqCst);

        event!(Level::INFO, port = self.config.port, "server socket initialized, accepting clients");

        let reactor = self.reactor.as_ref().expect("reactor was just installed");
        for _ in 0..self.config.concurrent_accepts {
            reactor.post_accept(listen_raw)?;
        }

        Ok(())
    }

    /// Stops accepting and closes every open connection. The listen socket
    /// is closed first, then each client connection, matching the original
    /// source's `stop` ordering. Reactor worker threads are not joined —
    /// they keep blocking on the completion port, reclaimed when the
    /// process exits.
    pub fn stop(&mut self) {
        self.is_listening.store(false, Ordering::SeqCst);

        *self.listen_socket.lock().expect("listen socket mutex poisoned") = None;

        let clients: Vec<Arc<Connection>> = self
            .clients
            .write()
            .expect("clients lock poisoned")
            .drain()
            .map(|(_, connection)| connection)
            .collect();

        for connection in clients {
            connection.close();
        }

        event!(Level::INFO, "server stopped");
    }

    fn on_accept(&self, operation: Box<Operation>) {
        let Some(reactor) = self.reactor.as_ref() else {
            return;
        };

        let accept_socket = operation.accept_socket;
        let socket = Socket::from_raw(accept_socket);
        if let Err(error) = socket.configure_connection_options() {
            event!(Level::WARN, %error, "failed to configure accepted socket options");
        }
        if let Err(error) = reactor.associate(accept_socket) {
            event!(Level::ERROR, %error, "failed to associate accepted socket with the reactor");
            return;
        }

        let connection = Arc::new(Connection::new(socket, self as *const Server));
        self.clients
            .write()
            .expect("clients lock poisoned")
            .insert(accept_socket, Arc::clone(&connection));

        event!(Level::INFO, socket = accept_socket.0, "accepted connection");
        connection.post_read(reactor);

        let listen_raw = self
            .listen_socket
            .lock()
            .expect("listen socket mutex poisoned")
            .as_ref()
            .map(Socket::raw);
        if let Some(listen_raw) = listen_raw {
            if let Err(error) = reactor.post_accept(listen_raw) {
                event!(Level::ERROR, %error, "failed to post replacement accept operation");
            }
        }
    }

    fn on_read(&self, operation: Box<Operation>) {
        let Some(reactor) = self.reactor.as_ref() else {
            return;
        };
        let OperationTarget::Connection(connection) = &operation.target else {
            return;
        };
        connection.on_read_raw(reactor, operation.transferred, &operation.buffer);
    }

    fn on_write(&self, operation: Box<Operation>) {
        let OperationTarget::Connection(connection) = &operation.target else {
            return;
        };
        connection.on_write_raw(operation.transferred);
    }

    /// Removes a client from the table. Called once by [`Connection::close`]
    /// as the final step of its own CAS-guarded teardown.
    pub(crate) fn remove_client(&self, socket: SOCKET) {
        let mut clients = self.clients.write().expect("clients lock poisoned");
        match clients.remove(&socket) {
            Some(_) => {
                event!(Level::INFO, socket = socket.0, remaining = clients.len(), "removed client");
            }
            None => {
                event!(Level::WARN, socket = socket.0, "attempted to remove a non-existent client");
            }
        }
    }

    /// Parses `bytes` as a request, routes it, dispatches to the matching
    /// handler (or the appropriate error handler), and posts the
    /// serialized response for writing. Called once per completed read —
    /// this crate never accumulates a request across more than one.
    pub(crate) fn handle_request(&self, connection: &Arc<Connection>, bytes: &[u8], reactor: &Reactor) {
        let mut response = Response::new();

        let request = match Request::parse(bytes) {
            Ok(request) => request,
            Err(_) => {
                let placeholder = Request::new(Method::Get, "/");
                self.handle_error(Status::BadRequest, &placeholder, &mut response);
                connection.post_write(reactor, response.to_bytes());
                return;
            }
        };

        let (node, matched, params) = self.routes.find_route_with_params(request.uri());
        response.set_header("Connection", "close");

        match node {
            // A static mount has no child node for the files it serves, so
            // the segment walk never fully "matches" past the mount itself:
            // check for a static mount before gating on `matched`.
            Some(node) if node.static_files().is_some() => {
                let mut request = request;
                for (name, value) in params {
                    request.bind_path_param(name, value);
                }
                let (mount, location) = node.static_files().expect("checked above");
                if request.method() == Method::Get {
                    serve_static_files(mount, location, &request, &mut response);
                } else {
                    self.handle_error(Status::MethodNotAllowed, &request, &mut response);
                }
            }
            Some(node) if matched => {
                let mut request = request;
                for (name, value) in params {
                    request.bind_path_param(name, value);
                }
                match node.handlers()[request.method().slot()].clone() {
                    None => self.handle_error(Status::MethodNotAllowed, &request, &mut response),
                    Some(handler) => handler(&request, &mut response),
                }
            }
            _ => self.handle_error(Status::NotFound, &request, &mut response),
        }

        connection.post_write(reactor, response.to_bytes());
    }

    fn handle_error(&self, status: Status, request: &Request, response: &mut Response) {
        response.set_header("Connection", "close");
        response.set_status(status);
        if let Some(handler) = self.error_handlers.get(&status.code()) {
            handler(request, response);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_error_handlers_populate_the_reason_phrase() {
        let server = Server::new(0);
        let handler = server.error_handlers.get(&Status::NotFound.code()).unwrap();
        let request = Request::new(Method::Get, "/missing");
        let mut response = Response::new();
        handler(&request, &mut response);
        assert_eq!(response.body(), Status::NotFound.reason().as_bytes());
    }

    #[test]
    fn add_route_registers_a_handler_for_each_method() {
        let mut server = Server::new(0);
        let handler: Handler = Arc::new(|_: &Request, response: &mut Response| {
            response.set_body(b"hi".to_vec());
        });
        server.add_route("/hello", &[Method::Get, Method::Post], handler).unwrap();

        let (node, matched, _) = server.routes.find_route_with_params("/hello");
        assert!(matched);
        let node = node.unwrap();
        assert!(node.handlers()[Method::Get.slot()].is_some());
        assert!(node.handlers()[Method::Post.slot()].is_some());
        assert!(node.handlers()[Method::Delete.slot()].is_none());
    }
}
