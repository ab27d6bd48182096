//! Request handlers bound by the engine at start-up

use crate::config::{ERROR_ECHO_LENGTH, ERROR_MARKER, RESET_MAGIC};
use crate::core::{DataDef, DeviceAddress};
use crate::frame::{Data, Frame, MAX_DATA_LENGTH};

const ERROR_HEADER_LENGTH: usize = 3;

/// Reports a request that no handler could serve.
///
/// Layout: marker, failed code, request length, then the leading request bytes.
pub(super) fn error_report(request: &Frame, code: DataDef) -> Data {
    let echo = &request.data[..request.data.length().min(ERROR_ECHO_LENGTH)];
    let mut raw = [0; MAX_DATA_LENGTH];
    raw[..ERROR_HEADER_LENGTH].copy_from_slice(&[
        ERROR_MARKER,
        code.into_u8(),
        request.data.length() as u8,
    ]);
    raw[ERROR_HEADER_LENGTH..][..echo.len()].copy_from_slice(echo);
    Data::from_raw(ERROR_HEADER_LENGTH + echo.len(), raw)
}

/// Reports the class and instance of this device.
pub(super) fn device_info(own: DeviceAddress) -> Data {
    let mut raw = [0; MAX_DATA_LENGTH];
    raw[0] = own.class.into_u8();
    raw[1] = own.instance.into_u8();
    Data::from_raw(2, raw)
}

/// Returns true if the request carries exactly the reset magic.
pub(super) fn is_reset_request(request: &Frame) -> bool {
    match <[u8; 8]>::try_from(&*request.data) {
        Ok(bytes) => u64::from_be_bytes(bytes) == RESET_MAGIC,
        Err(_) => false,
    }
}
