//! Error handlers
//!
//! Maps client errors onto the code and description reported through `Status`.

use crate::error::types::ClientError;
use crate::protocol::responses;

/// Convert an error to the code reported in `Status.code`.
///
/// Protocol failures keep the server's own reply code; everything else maps
/// into the reserved range above the FTP reply codes.
pub fn error_to_status_code(err: &ClientError) -> u16 {
    match err {
        ClientError::SessionNotBegun => responses::RESERVED_NOT_BEGUN,
        ClientError::Busy => responses::RESERVED_BUSY,
        ClientError::LocalFile { .. } => responses::RESERVED_LOCAL_FILE,
        ClientError::ControlConnect { .. } => responses::RESERVED_NO_CONTROL,
        ClientError::ControlClosed => responses::RESERVED_NO_CONTROL,
        ClientError::ControlIo(_) => responses::RESERVED_NO_CONTROL,
        ClientError::UnexpectedReply { code, .. } => *code,
        ClientError::Timeout { .. } => responses::RESERVED_TIMEOUT,
        ClientError::MalformedPassive(_) => responses::RESERVED_BAD_PASSIVE,
        ClientError::DataConnect { .. } => responses::RESERVED_NO_DATA,
        ClientError::TransferIo(_) => responses::RESERVED_TRANSFER_IO,
        ClientError::Cancelled => responses::RESERVED_CANCELLED,
    }
}

/// Convert an error to the text reported in `Status.desc`.
pub fn error_description(err: &ClientError) -> String {
    match err {
        ClientError::SessionNotBegun => "begin() not called".into(),
        ClientError::Busy => "Transfer already in progress".into(),
        ClientError::LocalFile { .. } => "Local file error".into(),
        ClientError::ControlConnect { .. } => "No connection to FTP server".into(),
        ClientError::ControlClosed => "Connection closed by FTP server".into(),
        ClientError::ControlIo(_) => "Connection to FTP server lost".into(),
        ClientError::UnexpectedReply { text, .. } => text.clone(),
        ClientError::Timeout { context, .. } => (*context).into(),
        ClientError::MalformedPassive(_) => "FTP server response not understood.".into(),
        ClientError::DataConnect { .. } => "No data connection to FTP server".into(),
        ClientError::TransferIo(_) => "Data transfer failed".into(),
        ClientError::Cancelled => "Transfer cancelled".into(),
    }
}
