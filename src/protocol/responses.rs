//! FTP reply codes
//!
//! Reply codes the client waits for, and the reserved codes it reports for
//! local failures.

/// 220 Service ready for new user
pub const READY: u16 = 220;
/// 230 User logged in
pub const LOGIN_SUCCESS: u16 = 230;
/// 227 Entering Passive Mode (h1,h2,h3,h4,p1,p2)
pub const ENTERING_PASSIVE: u16 = 227;
/// 331 User name okay, need password
pub const PASSWORD_REQUIRED: u16 = 331;

// Reserved codes. FTP replies never go above 659, so anything in this range
// is a local or internal failure.
pub const RESERVED_MIN: u16 = 65527;
pub const RESERVED_CANCELLED: u16 = 65527;
pub const RESERVED_NOT_BEGUN: u16 = 65528;
pub const RESERVED_BUSY: u16 = 65529;
pub const RESERVED_LOCAL_FILE: u16 = 65530;
pub const RESERVED_TRANSFER_IO: u16 = 65531;
pub const RESERVED_NO_DATA: u16 = 65532;
pub const RESERVED_BAD_PASSIVE: u16 = 65533;
pub const RESERVED_NO_CONTROL: u16 = 65534;
pub const RESERVED_TIMEOUT: u16 = 65535;

/// Whether a status code was produced locally rather than by the server.
pub fn is_reserved(code: u16) -> bool {
    code >= RESERVED_MIN
}
