//! Scanned pairing payload parsing

use crate::protocol::constants::PAIRING_SCHEMES;
use crate::{Error, Result};

/// Connection target decoded from one scan
///
/// Produced once per scan and discarded after the connect attempt; a new
/// scan or manual edit produces a fresh payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingPayload {
    /// Authority part of the scanned URL, e.g. `192.168.1.5:8080`
    pub host: String,
    /// Final path segment: the identity the host assigned this session
    pub device_id: String,
    /// One-time pairing code from the `code` query parameter
    pub code: String,
    scheme: String,
    path: String,
}

impl PairingPayload {
    /// Parse an opaque scanned string of shape
    /// `ws://host[:port]/<deviceId>?code=<code>`.
    ///
    /// A malformed scan must never reach the transport, so every missing
    /// piece is reported to the caller instead of being defaulted.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let (scheme, rest) = raw
            .split_once("://")
            .ok_or_else(|| invalid("not a url"))?;
        if !PAIRING_SCHEMES.contains(&scheme) {
            return Err(invalid(&format!("unsupported scheme '{}'", scheme)));
        }

        let (location, query) = match rest.split_once('?') {
            Some((l, q)) => (l, Some(q)),
            None => (rest, None),
        };

        let (host, path) = match location.split_once('/') {
            Some((h, p)) => (h, p.trim_end_matches('/')),
            None => (location, ""),
        };
        if host.is_empty() {
            return Err(invalid("missing host"));
        }

        let device_id = path
            .rsplit('/')
            .find(|seg| !seg.is_empty())
            .ok_or_else(|| invalid("missing device id"))?;
        let device_id = urlencoding::decode(device_id)
            .map_err(|_| invalid("invalid device id"))?
            .to_string();

        let mut code = None;
        if let Some(query) = query {
            for part in query.split('&') {
                if let Some((key, value)) = part.split_once('=') {
                    if key == "code" {
                        code = Some(
                            urlencoding::decode(value)
                                .map_err(|_| invalid("invalid code"))?
                                .to_string(),
                        );
                    }
                }
            }
        }
        let code = code
            .filter(|c| !c.is_empty())
            .ok_or_else(|| invalid("missing code"))?;

        Ok(Self {
            host: host.to_string(),
            device_id,
            code,
            scheme: scheme.to_string(),
            path: format!("/{}", path),
        })
    }

    /// Rebuild the URL the connection is opened against (query stripped)
    pub fn endpoint(&self) -> String {
        format!("{}://{}{}", self.scheme, self.host, self.path)
    }
}

fn invalid(msg: &str) -> Error {
    Error::InvalidPairingData(msg.to_string())
}
