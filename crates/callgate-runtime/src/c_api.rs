//! C ABI entry points for translated code
//!
//! Translated code calls these symbols directly. They operate on one
//! process-wide runtime (class registry, argument arena and bridge) created
//! on first use. The API follows these principles:
//! - strings are null-terminated UTF-8; a null owner means "no owner"
//! - argument buffers are stored with `callgate_args_store` and freed with
//!   `callgate_args_release`; the returned handle is passed to the invoke
//!   functions
//! - failures return the zero value and write a heap-allocated
//!   `CallgateError` to the optional `error` out-parameter
//! - error messages are byte strings with an explicit length and a
//!   terminating NUL; the caller frees errors with `callgate_error_free`

use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::ptr;
use std::sync::Arc;

use callgate_memory::ArgArena;
use callgate_sdk::{ArgHandle, BridgeError, BridgeResult, ErrorKind, FromValue};
use once_cell::sync::Lazy;

use crate::bridge::Bridge;
use crate::registry::ClassRegistry;

// ============================================================================
// Process-wide runtime
// ============================================================================

struct GlobalRuntime {
    classes: Arc<ClassRegistry>,
    memory: Arc<ArgArena>,
    bridge: Bridge,
}

static RUNTIME: Lazy<GlobalRuntime> = Lazy::new(|| {
    let classes = Arc::new(ClassRegistry::new());
    let memory = Arc::new(ArgArena::new());
    let bridge = Bridge::new(classes.clone(), memory.clone());
    GlobalRuntime {
        classes,
        memory,
        bridge,
    }
});

/// Class registry behind the C entry points
pub fn global_classes() -> &'static Arc<ClassRegistry> {
    &RUNTIME.classes
}

/// Argument arena behind the C entry points
pub fn global_memory() -> &'static Arc<ArgArena> {
    &RUNTIME.memory
}

/// Bridge behind the C entry points
pub fn global_bridge() -> &'static Bridge {
    &RUNTIME.bridge
}

// ============================================================================
// Errors
// ============================================================================

/// Error information
#[repr(C)]
pub struct CallgateError {
    kind: ErrorKind,
    message: *mut c_char,
    message_len: usize,
}

/// Copy a message into a NUL-terminated heap buffer, keeping interior NULs.
///
/// Returns the buffer and the message length without the terminator; the
/// buffer is freed with `free_message`.
fn message_to_c_bytes(s: &str) -> (*mut c_char, usize) {
    let mut bytes = Vec::with_capacity(s.len() + 1);
    bytes.extend_from_slice(s.as_bytes());
    bytes.push(0);
    let raw = Box::into_raw(bytes.into_boxed_slice()) as *mut u8;
    (raw as *mut c_char, s.len())
}

unsafe fn free_message(message: *mut c_char, len: usize) {
    if !message.is_null() {
        drop(Box::from_raw(ptr::slice_from_raw_parts_mut(message as *mut u8, len + 1)));
    }
}

/// Set error out-parameter
unsafe fn set_error(error_out: *mut *mut CallgateError, error: BridgeError) {
    if !error_out.is_null() {
        let (message, message_len) = message_to_c_bytes(&error.to_string());
        let err = Box::new(CallgateError {
            kind: error.kind(),
            message,
            message_len,
        });
        *error_out = Box::into_raw(err);
    }
}

unsafe fn read_str<'a>(ptr: *const c_char, what: &str) -> BridgeResult<&'a str> {
    if ptr.is_null() {
        return Ok("");
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| BridgeError::Resolution(format!("Invalid UTF-8 in {}", what)))
}

unsafe fn invoke_c<T: FromValue + Default>(
    owner: *const c_char,
    signature: *const c_char,
    args: u64,
    error: *mut *mut CallgateError,
) -> T {
    let result = read_str(owner, "owner").and_then(|owner| {
        let signature = read_str(signature, "signature")?;
        global_bridge().invoke_as::<T>(owner, signature, ArgHandle::from_raw(args))
    });
    match result {
        Ok(v) => v,
        Err(e) => {
            set_error(error, e);
            T::default()
        }
    }
}

/// Failure kind of an error (0 for NULL)
///
/// # Safety
/// `error` must be NULL or a pointer returned through an `error` out-parameter
#[no_mangle]
pub unsafe extern "C" fn callgate_error_kind(error: *const CallgateError) -> c_int {
    if error.is_null() {
        return 0;
    }
    (*error).kind as c_int
}

/// Error message (NULL for a NULL error). Valid until the error is freed.
///
/// The message is NUL-terminated but may contain interior NULs; use
/// `callgate_error_message_len` for its full length.
///
/// # Safety
/// `error` must be NULL or a pointer returned through an `error` out-parameter
#[no_mangle]
pub unsafe extern "C" fn callgate_error_message(error: *const CallgateError) -> *const c_char {
    if error.is_null() {
        return ptr::null();
    }
    (*error).message
}

/// Length in bytes of the error message, excluding the terminator (0 for NULL)
///
/// # Safety
/// `error` must be NULL or a pointer returned through an `error` out-parameter
#[no_mangle]
pub unsafe extern "C" fn callgate_error_message_len(error: *const CallgateError) -> usize {
    if error.is_null() {
        return 0;
    }
    (*error).message_len
}

/// Free an error
///
/// # Safety
/// `error` must be NULL or a pointer returned through an `error`
/// out-parameter, and must not be used afterwards
#[no_mangle]
pub unsafe extern "C" fn callgate_error_free(error: *mut CallgateError) {
    if error.is_null() {
        return;
    }
    let err = Box::from_raw(error);
    free_message(err.message, err.message_len);
}

// ============================================================================
// Argument buffers
// ============================================================================

/// Store a packed argument buffer, returning its handle (0 on failure).
///
/// The bytes are copied. A NULL `data` is accepted only with `len` 0.
///
/// # Safety
/// `data` must be NULL or point to at least `len` readable bytes
#[no_mangle]
pub unsafe extern "C" fn callgate_args_store(data: *const u8, len: usize) -> u64 {
    let bytes = if data.is_null() {
        if len != 0 {
            return 0;
        }
        Vec::new()
    } else {
        std::slice::from_raw_parts(data, len).to_vec()
    };
    global_memory().store(bytes).as_raw()
}

/// Free a stored argument buffer. Returns 1 if it was live, else 0.
#[no_mangle]
pub extern "C" fn callgate_args_release(handle: u64) -> c_int {
    global_memory().release(ArgHandle::from_raw(handle)) as c_int
}

// ============================================================================
// Invocation
// ============================================================================

macro_rules! c_entry_point {
    ($(#[$doc:meta])* $name:ident -> $ty:ty) => {
        $(#[$doc])*
        ///
        /// # Safety
        /// `owner` and `signature` must be NULL or valid null-terminated
        /// strings; `error` must be NULL or writable.
        #[no_mangle]
        pub unsafe extern "C" fn $name(
            owner: *const c_char,
            signature: *const c_char,
            args: u64,
            error: *mut *mut CallgateError,
        ) -> $ty {
            invoke_c::<$ty>(owner, signature, args, error)
        }
    };
}

c_entry_point!(
    /// Invoke a callable, discarding its result
    callgate_invoke_void -> ()
);
c_entry_point!(
    /// Invoke a callable returning a boolean
    callgate_invoke_i1 -> bool
);
c_entry_point!(
    /// Invoke a callable returning an 8-bit integer
    callgate_invoke_i8 -> i8
);
c_entry_point!(
    /// Invoke a callable returning a 16-bit integer
    callgate_invoke_i16 -> i16
);
c_entry_point!(
    /// Invoke a callable returning a 32-bit integer
    callgate_invoke_i32 -> i32
);
c_entry_point!(
    /// Invoke a callable returning a 64-bit integer
    callgate_invoke_i64 -> i64
);
c_entry_point!(
    /// Invoke a callable returning a 32-bit float
    callgate_invoke_f32 -> f32
);
c_entry_point!(
    /// Invoke a callable returning a 64-bit float
    callgate_invoke_f64 -> f64
);

// ============================================================================
// External pointers
// ============================================================================

/// Remove an external function. Returns 1 if one was removed, else 0.
///
/// # Safety
/// `signature` must be NULL or a valid null-terminated string
#[no_mangle]
pub unsafe extern "C" fn callgate_external_unregister(signature: *const c_char) -> c_int {
    match read_str(signature, "signature") {
        Ok(sig) => global_bridge().externals().unregister(sig).is_some() as c_int,
        Err(_) => 0,
    }
}

/// Remove every external function
#[no_mangle]
pub extern "C" fn callgate_external_clear() {
    global_bridge().externals().clear();
}
