use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::protocol::MAX_FRAME_LENGTH;
use crate::tiling::{Layout, Tiling};
use crate::{Error, Result};

/// Host side target, parsed from `<ip>:<port>,<width>x<height>,<tiling>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixSpec {
    pub target: SocketAddr,
    pub layout: Layout,
}

impl FromStr for MatrixSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (ip, rest) = s.split_once(':').ok_or(Error::MissingField("port separator"))?;
        let (port, rest) = rest.split_once(',').ok_or(Error::MissingField("port"))?;

        let ip: IpAddr = ip.parse().map_err(|_| invalid("IP address", ip))?;

        let (width, rest) = rest.split_once('x').ok_or(Error::MissingField("width"))?;
        let port = parse_nonzero::<u16>("port", port)?;

        let (height, tiling) = rest.split_once(',').ok_or(Error::MissingField("height"))?;
        let width = parse_nonzero::<usize>("width", width)?;
        let height = parse_nonzero::<usize>("height", height)?;
        let tiling: Tiling = tiling.parse()?;

        Ok(MatrixSpec {
            target: SocketAddr::new(ip, port),
            layout: Layout::new(width, height, tiling)?,
        })
    }
}

fn invalid(field: &'static str, value: &str) -> Error {
    Error::InvalidField {
        field,
        value: value.to_string(),
    }
}

fn parse_nonzero<T>(field: &'static str, value: &str) -> Result<T>
where
    T: FromStr + Default + PartialEq,
{
    match value.trim().parse::<T>() {
        Ok(n) if n != T::default() => Ok(n),
        _ => Err(invalid(field, value)),
    }
}

/// Device side configuration (JSON)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReceiverConfig {
    pub listen: ListenConfig,
    /// Reassembly buffer size in bytes (packed pixels, two bytes each)
    pub frame_length: usize,
    /// Bytes handed to the output per write
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_recv_timeout_ms")]
    pub recv_timeout_ms: u64,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputConfig {
    /// Write flushed chunks to a serial port
    Serial { port: String, baud_rate: u32 },
    /// Discard flushed frames
    Null,
}

fn default_chunk_size() -> usize {
    32
}

fn default_recv_timeout_ms() -> u64 {
    100
}

impl ReceiverConfig {
    /// Read, parse and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref())?;
        let config: ReceiverConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.frame_length == 0 || self.frame_length > MAX_FRAME_LENGTH {
            return Err(Error::Config(format!(
                "frame_length must be between 1 and {}, got {}",
                MAX_FRAME_LENGTH, self.frame_length
            )));
        }
        if self.chunk_size == 0 {
            return Err(Error::Config("chunk_size must be at least 1".into()));
        }
        if self.recv_timeout_ms == 0 {
            return Err(Error::Config("recv_timeout_ms must be at least 1".into()));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.listen.host, self.listen.port)
    }
}
