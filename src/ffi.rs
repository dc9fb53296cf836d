use crate::error::StoreError;
use crate::Service::{DataService, ServiceBuilder};
use crate::Structs::Message_Structs::MSG_INLINE;
use std::ptr;
use tracing::error;

// Error codes
const DS_SUCCESS: i32 = 0;
const DS_ERROR_NULL_POINTER: i32 = -1;
const DS_ERROR_INVALID_ARG: i32 = -2;
const DS_ERROR_CAPACITY: i32 = -3;
const DS_ERROR_UNKNOWN_DEVICE: i32 = -4;
const DS_ERROR_EMPTY: i32 = -5;
const DS_ERROR_INTERNAL: i32 = -6;
const DS_ERROR_UNKNOWN_OPCODE: i32 = -7;

/// Handle to a data service instance (opaque pointer)
pub struct ServiceHandle {
    inner: DataService,
}

fn status(err: &StoreError) -> i32 {
    match err {
        StoreError::CapacityExceeded { .. } => DS_ERROR_CAPACITY,
        StoreError::UnknownDevice(_) => DS_ERROR_UNKNOWN_DEVICE,
        StoreError::UnknownOpcode(_) => DS_ERROR_UNKNOWN_OPCODE,
        StoreError::Timeout => DS_ERROR_EMPTY,
        StoreError::PayloadTooLarge { .. }
        | StoreError::MessageTooLarge { .. }
        | StoreError::TruncatedMessage { .. } => DS_ERROR_INVALID_ARG,
        StoreError::NoEntry { .. } => DS_ERROR_INTERNAL,
    }
}

/// Create a new data service.
///
/// # Arguments
/// * `ds_size` - Arena size in bytes.
/// * `device_capacity` - Number of device ids the registry can hold.
///
/// # Returns
/// * Pointer to `ServiceHandle`, or NULL on failure.
#[no_mangle]
pub extern "C" fn ds_service_new(ds_size: usize, device_capacity: usize) -> *mut ServiceHandle {
    match ServiceBuilder::new()
        .with_arena_size(ds_size)
        .with_device_capacity(device_capacity)
        .build()
    {
        Ok(service) => Box::into_raw(Box::new(ServiceHandle { inner: service })),
        Err(e) => {
            error!("FFI Error: Failed to build data service: {}", e);
            ptr::null_mut()
        }
    }
}

/// Free a service handle.
#[no_mangle]
pub extern "C" fn ds_service_free(handle: *mut ServiceHandle) {
    if !handle.is_null() {
        unsafe {
            let _ = Box::from_raw(handle); // Dropped automatically
        }
    }
}

/// Queue an inbound message.
///
/// # Returns
/// * 0 on success, negative error code otherwise.
#[no_mangle]
pub extern "C" fn ds_request(handle: *mut ServiceHandle, data: *const u8, len: usize) -> i32 {
    if handle.is_null() || data.is_null() {
        return DS_ERROR_NULL_POINTER;
    }

    let service = unsafe { &(*handle).inner };
    let slice = unsafe { std::slice::from_raw_parts(data, len) };

    match service.request(slice) {
        Ok(()) => DS_SUCCESS,
        Err(e) => status(&e),
    }
}

/// Run the inbound relay. Returns the number of messages moved.
#[no_mangle]
pub extern "C" fn ds_rx_copy(handle: *mut ServiceHandle) -> i64 {
    if handle.is_null() {
        return DS_ERROR_NULL_POINTER as i64;
    }
    unsafe { (*handle).inner.rx_copy() as i64 }
}

/// Run the outbound relay. Returns the number of messages moved.
#[no_mangle]
pub extern "C" fn ds_tx_copy(handle: *mut ServiceHandle) -> i64 {
    if handle.is_null() {
        return DS_ERROR_NULL_POINTER as i64;
    }
    unsafe { (*handle).inner.tx_copy() as i64 }
}

/// Dispatch one inbound message.
///
/// # Returns
/// * 0 if the message was handled.
/// * DS_ERROR_EMPTY if non-blocking and nothing was relayed.
/// * The error code of the rejected message otherwise.
#[no_mangle]
pub extern "C" fn ds_handle_rx(handle: *mut ServiceHandle, blocking: bool) -> i32 {
    if handle.is_null() {
        return DS_ERROR_NULL_POINTER;
    }

    let service = unsafe { &(*handle).inner };
    let outcome = if blocking {
        service.handle_rx()
    } else {
        match service.try_handle_rx() {
            Some(outcome) => outcome,
            None => return DS_ERROR_EMPTY,
        }
    };

    match outcome {
        Ok(_) => DS_SUCCESS,
        Err(e) => status(&e),
    }
}

/// Take the next outbound message.
///
/// # Arguments
/// * `handle` - Pointer to `ServiceHandle`.
/// * `blocking` - If true, wait for a message. If false, return immediately if empty.
/// * `out_buf` - Buffer to write the message into.
/// * `out_len` - Input: size of buf, Output: size of message.
///
/// # Returns
/// * 0 on success.
/// * DS_ERROR_EMPTY if non-blocking and empty.
/// * DS_ERROR_INVALID_ARG if buf is smaller than `MSG_INLINE`; `out_len` is set
///   to the required size and nothing is dequeued.
#[no_mangle]
pub extern "C" fn ds_handle_tx(
    handle: *mut ServiceHandle,
    blocking: bool,
    out_buf: *mut u8,
    out_len: *mut usize,
) -> i32 {
    if handle.is_null() || out_buf.is_null() || out_len.is_null() {
        return DS_ERROR_NULL_POINTER;
    }

    let service = unsafe { &(*handle).inner };
    let max_len = unsafe { *out_len };

    // Refuse before taking anything off the queue
    if max_len < MSG_INLINE {
        unsafe { *out_len = MSG_INLINE };
        return DS_ERROR_INVALID_ARG;
    }

    let msg = if blocking {
        service.handle_tx()
    } else {
        match service.try_handle_tx() {
            Some(msg) => msg,
            None => return DS_ERROR_EMPTY,
        }
    };

    let bytes = msg.as_bytes();
    unsafe {
        ptr::copy_nonoverlapping(bytes.as_ptr(), out_buf, bytes.len());
        *out_len = bytes.len();
    }
    DS_SUCCESS
}
