//! Compiler backend backed by the prebuilt `libggcode` shared library.

#![allow(unsafe_code)]

use crate::bridge::{CompileResult, CompilerBackend, RenderMode};
use crate::buffer::BoundaryBuffer;
use crate::error::BridgeError;
use libloading::Library;
use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::info;

/// Exported entry point of the compiler library.
pub const COMPILE_SYMBOL: &[u8] = b"compile_ggcode_from_string\0";

/// `const char* compile_ggcode_from_string(const char* source, int mode)`
type CompileFn = unsafe extern "C" fn(*const c_char, c_int) -> *const c_char;

/// Dynamically loaded GGCODE compiler.
///
/// The library keeps its parser, evaluator and output buffer in process
/// globals that are reset at the start of each call, so calls are
/// serialized. The library is unloaded when the last handle is dropped.
pub struct NativeCompiler {
    path: PathBuf,
    compile: CompileFn,
    free_results: bool,
    call_lock: Mutex<()>,
    // Must outlive `compile`.
    _library: Library,
}

impl NativeCompiler {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        let path = path.as_ref().to_path_buf();

        // SAFETY: loading runs the library's initializers; the compiler
        // library has none beyond zero-initialized globals.
        let library = unsafe { Library::new(&path) }.map_err(|err| {
            BridgeError::unavailable(format!(
                "failed to load compiler library {}: {}",
                path.display(),
                err
            ))
        })?;

        // SAFETY: the symbol type matches the exported C signature.
        let compile = unsafe { library.get::<CompileFn>(COMPILE_SYMBOL) }
            .map(|symbol| *symbol)
            .map_err(|err| {
                BridgeError::unavailable(format!(
                    "compiler library {} has no compile entry point: {}",
                    path.display(),
                    err
                ))
            })?;

        info!(path = %path.display(), "loaded compiler library");

        Ok(Self {
            path,
            compile,
            free_results: true,
            call_lock: Mutex::new(()),
            _library: library,
        })
    }

    /// Whether returned strings are released with the C allocator after
    /// copying. The stock library `strdup`s every result.
    pub fn with_result_release(mut self, free_results: bool) -> Self {
        self.free_results = free_results;
        self
    }
}

impl CompilerBackend for NativeCompiler {
    fn name(&self) -> &str {
        "native"
    }

    fn invoke(&self, buffer: &BoundaryBuffer, mode: RenderMode) -> CompileResult {
        // The compiler resets its globals per call, so a poisoned lock carries
        // no stale state worth refusing over.
        let _guard = self
            .call_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // SAFETY: `buffer` is zero-terminated with no interior zero and stays
        // borrowed for the duration of the call.
        let raw = unsafe { (self.compile)(buffer.as_ptr(), mode.flag() as c_int) };
        if raw.is_null() {
            return Err(BridgeError::unavailable("compiler returned a null result"));
        }

        // SAFETY: a non-null result is a zero-terminated string owned by us.
        let output = unsafe { CStr::from_ptr(raw) }
            .to_string_lossy()
            .into_owned();

        if self.free_results {
            // SAFETY: allocated by the library with the C allocator and not
            // referenced again by it.
            unsafe { libc::free(raw as *mut libc::c_void) };
        }

        Ok(output)
    }
}

impl std::fmt::Debug for NativeCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeCompiler")
            .field("path", &self.path)
            .field("free_results", &self.free_results)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_library_is_unavailable() {
        let err = NativeCompiler::load("/nonexistent/libggcode.so").unwrap_err();
        match err {
            BridgeError::Unavailable(message) => {
                assert!(message.contains("/nonexistent/libggcode.so"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_library_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("libggcode.so");
        std::fs::write(&bogus, b"not an elf").unwrap();

        assert!(matches!(
            NativeCompiler::load(&bogus),
            Err(BridgeError::Unavailable(_))
        ));
    }

    // Fixture libraries are built from fixtures/fake_compiler.c by build.rs
    // when a C compiler is available.
    fn fixture(path: Option<&'static str>) -> Option<&'static str> {
        if path.is_none() {
            eprintln!("compiler fixture not built, skipping");
        }
        path
    }

    fn encode(text: &str) -> BoundaryBuffer {
        BoundaryBuffer::encode(&crate::sanitize(text)).unwrap()
    }

    #[test]
    fn library_without_entry_point_is_unavailable() {
        let Some(path) = fixture(option_env!("GGCODE_FIXTURE_LIBRARY_NO_ENTRY")) else {
            return;
        };

        match NativeCompiler::load(path).unwrap_err() {
            BridgeError::Unavailable(message) => {
                assert!(message.contains("no compile entry point"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invoke_copies_compiler_output() {
        let Some(path) = fixture(option_env!("GGCODE_FIXTURE_LIBRARY")) else {
            return;
        };
        let compiler = NativeCompiler::load(path).unwrap();

        let output = compiler
            .invoke(&encode("G1 &lt;X\r\n"), RenderMode::Annotated)
            .unwrap();
        assert_eq!(output, "mode=1 len=6:G1 <X\n");
    }

    #[test]
    fn invoke_passes_mode_flag() {
        let Some(path) = fixture(option_env!("GGCODE_FIXTURE_LIBRARY")) else {
            return;
        };
        let compiler = NativeCompiler::load(path).unwrap();

        let output = compiler.invoke(&encode("G0"), RenderMode::Bare).unwrap();
        assert_eq!(output, "mode=0 len=2:G0");
    }

    #[test]
    fn invoke_without_release_still_copies() {
        let Some(path) = fixture(option_env!("GGCODE_FIXTURE_LIBRARY")) else {
            return;
        };
        let compiler = NativeCompiler::load(path)
            .unwrap()
            .with_result_release(false);

        let output = compiler.invoke(&encode(""), RenderMode::Annotated).unwrap();
        assert_eq!(output, "mode=1 len=0:");
    }

    #[test]
    fn null_result_is_unavailable() {
        let Some(path) = fixture(option_env!("GGCODE_FIXTURE_LIBRARY")) else {
            return;
        };
        let compiler = NativeCompiler::load(path).unwrap();

        assert_eq!(
            compiler.invoke(&encode("NULL please"), RenderMode::Annotated),
            Err(BridgeError::unavailable("compiler returned a null result"))
        );
    }

    #[tokio::test]
    async fn bridge_drives_native_backend() {
        let Some(path) = fixture(option_env!("GGCODE_FIXTURE_LIBRARY")) else {
            return;
        };
        let backend = std::sync::Arc::new(NativeCompiler::load(path).unwrap());
        let bridge = crate::CompilerBridge::new(backend, crate::BridgeConfig::default());

        let (first, second) = tokio::join!(
            bridge.compile_source("G1 X1"),
            bridge.compile_source("G1 X2")
        );
        assert_eq!(first.unwrap(), "mode=1 len=5:G1 X1");
        assert_eq!(second.unwrap(), "mode=1 len=5:G1 X2");
    }

    #[test]
    fn symbol_name_is_zero_terminated() {
        assert_eq!(COMPILE_SYMBOL.last(), Some(&0));
        assert_eq!(
            &COMPILE_SYMBOL[..COMPILE_SYMBOL.len() - 1],
            b"compile_ggcode_from_string"
        );
    }
}
