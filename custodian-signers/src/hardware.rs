//! Sessions with USB/HID signing devices.
//!
//! A device is driven through a transport that opens a handle. Every handle is used inside a
//! [`DeviceSession`], which owns the device's lock for as long as the handle is open and closes
//! the handle when it goes out of scope, whether signing succeeded, failed or panicked.
use custodian_core::validation::{
    code_in, field, integer, literal, object, one_of, starts_with_ignore_case, string,
    NoneSucceeded, ValidationError,
};
use futures_util::lock::MutexGuard;
use serde_json::Value;
use std::ops::{Deref, DerefMut};
use thiserror::Error;
use tracing::trace;

/// An open connection to a device
pub trait DeviceHandle: Send {
    /// Releases the connection. Called exactly once per opened handle.
    fn close(&mut self);
}

/// Holds a device lock and an open handle; the handle is closed when the session is dropped.
pub struct DeviceSession<'a, H: DeviceHandle + ?Sized> {
    handle: Box<H>,
    // released after the handle is closed
    _guard: MutexGuard<'a, ()>,
}

impl<'a, H: DeviceHandle + ?Sized> DeviceSession<'a, H> {
    pub fn new(guard: MutexGuard<'a, ()>, handle: Box<H>) -> Self {
        Self { handle, _guard: guard }
    }
}

impl<H: DeviceHandle + ?Sized> Deref for DeviceSession<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        &self.handle
    }
}

impl<H: DeviceHandle + ?Sized> DerefMut for DeviceSession<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        &mut self.handle
    }
}

impl<H: DeviceHandle + ?Sized> Drop for DeviceSession<'_, H> {
    fn drop(&mut self) {
        self.handle.close();
        trace!("closed device transport");
    }
}

/// A failure reported by the device or its bridge. The payload is untrusted JSON.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("device error: {payload}")]
pub struct DeviceError {
    pub payload: Value,
}

impl DeviceError {
    pub fn new(payload: Value) -> Self {
        Self { payload }
    }
}

/// Device failures that have a dedicated meaning for the user or the signing flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceFailure {
    UserRejected,
    DeviceLocked,
    AppNotOpen,
    BlindSigningDisabled,
    /// The bridge was initialized by an earlier session; not an error
    AlreadyInitialized,
}

impl DeviceFailure {
    pub fn user_message(&self) -> &'static str {
        match self {
            DeviceFailure::UserRejected => "the request was rejected on the device",
            DeviceFailure::DeviceLocked => "unlock the device and try again",
            DeviceFailure::AppNotOpen => "open the Ethereum app on the device and try again",
            DeviceFailure::BlindSigningDisabled => {
                "enable blind signing in the Ethereum app settings and try again"
            }
            DeviceFailure::AlreadyInitialized => "the device connection is already initialized",
        }
    }
}

const USER_REJECTED: &[i64] = &[0x6985];
const DEVICE_LOCKED: &[i64] = &[0x5515, 0x6b0c];
const APP_NOT_OPEN: &[i64] = &[0x6d00, 0x6e00, 0x6511];
const BLIND_SIGNING_DISABLED: &[i64] = &[0x6a80];

/// Classifies a Ledger status word payload, `{ "statusCode": n }`.
pub fn classify_ledger_failure(
    payload: &Value,
) -> Result<DeviceFailure, NoneSucceeded<ValidationError>> {
    let status = || object(payload).and_then(|obj| field(obj, "statusCode")).and_then(integer);
    let is = |codes: &[i64], failure| status().and_then(|code| code_in(code, codes)).map(|_| failure);

    one_of([
        is(USER_REJECTED, DeviceFailure::UserRejected),
        is(DEVICE_LOCKED, DeviceFailure::DeviceLocked),
        is(APP_NOT_OPEN, DeviceFailure::AppNotOpen),
        is(BLIND_SIGNING_DISABLED, DeviceFailure::BlindSigningDisabled),
    ])
}

const ALREADY_INITIALIZED_MESSAGE: &str = "TrezorConnect has been already initialized";

/// Classifies a Trezor bridge failure payload, `{ "code": "...", "error": "..." }`.
pub fn classify_trezor_failure(
    payload: &Value,
) -> Result<DeviceFailure, NoneSucceeded<ValidationError>> {
    let text = |key: &str| object(payload).and_then(|obj| field(obj, key)).and_then(string);
    let code = |expected: &str| text("code").and_then(|code| literal(code, expected));

    one_of([
        code("Init_AlreadyInitialized").map(|_| DeviceFailure::AlreadyInitialized),
        text("error")
            .and_then(|message| starts_with_ignore_case(message, ALREADY_INITIALIZED_MESSAGE))
            .map(|_| DeviceFailure::AlreadyInitialized),
        code("Failure_ActionCancelled").map(|_| DeviceFailure::UserRejected),
        code("Method_Cancel").map(|_| DeviceFailure::UserRejected),
        code("Failure_PinCancelled").map(|_| DeviceFailure::DeviceLocked),
    ])
}
