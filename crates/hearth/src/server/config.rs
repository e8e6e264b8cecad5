/// Builder-style server configuration, mirroring the teacher's
/// `TcpServerBuilder` shape generalized off its `Future`-returning surface.
///
/// `Server::new(port)` is the one-argument convenience constructor; this
/// builder is the extension point for the rest.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub(crate) port: u16,
    pub(crate) backlog: i32,
    pub(crate) worker_threads: Option<usize>,
    pub(crate) concurrent_accepts: usize,
}

impl ServerConfig {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            backlog: 1000,
            worker_threads: None,
            concurrent_accepts: 100,
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn backlog(mut self, backlog: i32) -> Self {
        self.backlog = backlog;
        self
    }

    /// Number of reactor worker threads. `None` (the default) spawns one
    /// per logical CPU.
    pub fn worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = Some(worker_threads);
        self
    }

    /// Number of accepts posted up front when the server starts, so a
    /// burst of incoming connections never waits on a fresh accept being
    /// posted.
    pub fn concurrent_accepts(mut self, concurrent_accepts: usize) -> Self {
        self.concurrent_accepts = concurrent_accepts;
        self
    }
}
