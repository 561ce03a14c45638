//! Network, unix-socket and vsock addresses as one sum type.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetTransport {
    Tcp,
    Udp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnixTransport {
    Unix,
    Unixpacket,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetAddr {
    pub transport: NetTransport,
    pub hostname: String,
    pub port: u16,
}

impl NetAddr {
    pub fn tcp(addr: SocketAddr) -> Self {
        Self {
            transport: NetTransport::Tcp,
            hostname: addr.ip().to_string(),
            port: addr.port(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnixAddr {
    pub transport: UnixTransport,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VsockAddr {
    pub cid: u32,
    pub port: u32,
}

/// Where a listener or peer lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Addr {
    Net(NetAddr),
    Unix(UnixAddr),
    Vsock(VsockAddr),
}

impl Addr {
    pub fn transport(&self) -> &'static str {
        match self {
            Self::Net(net) => match net.transport {
                NetTransport::Tcp => "tcp",
                NetTransport::Udp => "udp",
            },
            Self::Unix(unix) => match unix.transport {
                UnixTransport::Unix => "unix",
                UnixTransport::Unixpacket => "unixpacket",
            },
            Self::Vsock(_) => "vsock",
        }
    }

    pub fn as_net(&self) -> Option<&NetAddr> {
        match self {
            Self::Net(net) => Some(net),
            _ => None,
        }
    }

    pub fn as_unix(&self) -> Option<&UnixAddr> {
        match self {
            Self::Unix(unix) => Some(unix),
            _ => None,
        }
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Net(net) if net.hostname.contains(':') => {
                write!(f, "{}://[{}]:{}", self.transport(), net.hostname, net.port)
            }
            Self::Net(net) => write!(f, "{}://{}:{}", self.transport(), net.hostname, net.port),
            Self::Unix(unix) => write!(f, "{}:{}", self.transport(), unix.path.display()),
            Self::Vsock(vsock) => write!(f, "vsock:{}:{}", vsock.cid, vsock.port),
        }
    }
}
