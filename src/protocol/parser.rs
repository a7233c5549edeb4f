//! FTP reply parsing
//!
//! Pure functions that pull structured data out of reply lines.

use crate::error::ClientError;
use std::net::{Ipv4Addr, SocketAddrV4};

/// Width of an FTP reply code.
const REPLY_CODE_DIGITS: usize = 3;

/// Parses the leading decimal integer of a reply line.
///
/// Leading whitespace is skipped. Returns 0 when the line does not start
/// with a digit or the number is wider than a reply code; 0 never matches
/// an expected code and stays clear of the reserved local range.
pub fn parse_reply_code(line: &str) -> u16 {
    let digits: Vec<u8> = line
        .trim_start()
        .bytes()
        .take_while(u8::is_ascii_digit)
        .take(REPLY_CODE_DIGITS + 1)
        .collect();

    if digits.len() > REPLY_CODE_DIGITS {
        return 0;
    }
    digits
        .iter()
        .fold(0u16, |acc, b| acc * 10 + u16::from(b - b'0'))
}

/// Extracts the data channel address from a 227 reply.
///
/// The payload sits between the first `(` and the first `)` after it, e.g.
/// `227 Entering Passive Mode (10,0,0,5,19,136)`.
pub fn parse_pasv_reply(reply: &str) -> Result<SocketAddrV4, ClientError> {
    let open = reply
        .find('(')
        .ok_or_else(|| ClientError::MalformedPassive(format!("no '(' in {:?}", reply)))?;
    let close = reply[open..]
        .find(')')
        .map(|offset| open + offset)
        .ok_or_else(|| ClientError::MalformedPassive(format!("no ')' in {:?}", reply)))?;

    parse_host_port(&reply[open + 1..close])
}

/// Parses `h1,h2,h3,h4,p1,p2` into an address and `port = p1 * 256 + p2`.
pub fn parse_host_port(payload: &str) -> Result<SocketAddrV4, ClientError> {
    let fields = payload
        .split(',')
        .map(|field| field.trim().parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|e| ClientError::MalformedPassive(format!("{:?}: {}", payload, e)))?;

    let [a, b, c, d, high, low] = fields[..] else {
        return Err(ClientError::MalformedPassive(format!(
            "expected 6 fields, got {} in {:?}",
            fields.len(),
            payload
        )));
    };

    let port = u16::from(high) << 8 | u16::from(low);
    Ok(SocketAddrV4::new(Ipv4Addr::new(a, b, c, d), port))
}
