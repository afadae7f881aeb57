use std::{fs, io, path};


/// Largest request the endpoint accepts. A peer sending more is disconnected by the socket.
pub const MAX_MESSAGE_LEN: i64 = 64 << 20;

/// One logical request or reply: an ordered list of byte fields.
pub type Message = Vec<Vec<u8>>;


/// Strict request/reply channel: every received message is answered by exactly one `send`.
pub trait Transport {
    /// Blocks for the next request. `None` once no further request can ever arrive.
    fn recv(&mut self) -> io::Result<Option<Message>>;
    fn send(&mut self, reply: &[u8]) -> io::Result<()>;
}


fn io_error(e: zmq::Error) -> io::Error {
    let kind = match e {
        zmq::Error::EADDRINUSE => io::ErrorKind::AddrInUse,
        zmq::Error::EACCES => io::ErrorKind::PermissionDenied,
        zmq::Error::ENOENT => io::ErrorKind::NotFound,
        _ => io::ErrorKind::Other,
    };
    io::Error::new(kind, e)
}

/// The `ipc://` address of a socket file.
pub fn address(path: &path::Path) -> String {
    format!("ipc://{}", path.display())
}


/// ZeroMQ REP socket bound to a local socket file. Any number of REQ peers may
/// connect; requests are served one at a time in arrival order.
pub struct Endpoint {
    path: path::PathBuf,
    socket: zmq::Socket,
}

impl Endpoint {
    pub fn bind<P: AsRef<path::Path>>(path: P) -> io::Result<Endpoint> {
        let path = path.as_ref().to_path_buf();
        match fs::remove_file(&path) {
            Ok(()) => debug!("Removed stale socket {}", path.display()),
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        let socket = zmq::Context::new().socket(zmq::REP).map_err(io_error)?;
        socket.set_maxmsgsize(MAX_MESSAGE_LEN).map_err(io_error)?;
        socket.bind(&address(&path)).map_err(io_error)?;
        Ok(Endpoint { path, socket })
    }

    pub fn path(&self) -> &path::Path {
        &self.path
    }
}

impl Transport for Endpoint {
    fn recv(&mut self) -> io::Result<Option<Message>> {
        loop {
            match self.socket.recv_multipart(0) {
                Ok(parts) => return Ok(Some(parts)),
                Err(zmq::Error::EINTR) => trace!("recv interrupted, retrying"),
                Err(e) => return Err(io_error(e)),
            }
        }
    }

    // A peer that went away after asking simply never sees the reply.
    fn send(&mut self, reply: &[u8]) -> io::Result<()> {
        self.socket.send(reply, 0).map_err(io_error)
    }
}

impl Drop for Endpoint {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}


/// REQ peer of an `Endpoint`.
pub struct Client {
    socket: zmq::Socket,
}

impl Client {
    /// Connecting never waits for the endpoint: requests queue until it is bound.
    pub fn connect<P: AsRef<path::Path>>(path: P) -> io::Result<Client> {
        let socket = zmq::Context::new().socket(zmq::REQ).map_err(io_error)?;
        socket.set_linger(0).map_err(io_error)?;
        socket.connect(&address(path.as_ref())).map_err(io_error)?;
        Ok(Client { socket })
    }

    pub fn request<P: AsRef<[u8]>>(&mut self, parts: &[P]) -> io::Result<Message> {
        if parts.is_empty() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty request"));
        }
        self.socket.send_multipart(parts.iter().map(|p| p.as_ref()), 0).map_err(io_error)?;
        self.socket.recv_multipart(0).map_err(io_error)
    }

    /// Sends `opcode` followed by text fields and returns the first reply field as text.
    pub fn call(&mut self, opcode: u8, fields: &[&str]) -> io::Result<String> {
        let mut parts: Vec<&[u8]> = vec![std::slice::from_ref(&opcode)];
        parts.extend(fields.iter().map(|f| f.as_bytes()));

        let reply = self.request(&parts)?;
        let first = reply.into_iter().next().unwrap_or_default();
        String::from_utf8(first).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
