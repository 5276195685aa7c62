//! Core of the GGCODE compile gateway.
//!
//! Untrusted source text is normalized by [`sanitize`], encoded into a
//! zero-terminated [`BoundaryBuffer`] and handed to the external compiler
//! through [`CompilerBridge`]. The [`ExampleCatalog`] indexes the sample
//! programs on disk and never touches the compiler.

#![deny(unsafe_code)]

pub mod bridge;
pub mod buffer;
pub mod catalog;
pub mod error;
pub mod native;
pub mod sanitize;

pub use bridge::{
    BridgeConfig, CompileResult, CompilerBackend, CompilerBridge, RenderMode, UnavailableCompiler,
};
pub use buffer::BoundaryBuffer;
pub use catalog::{ExampleCatalog, ExampleEntry, ExampleFile};
pub use error::{BridgeError, CatalogError};
pub use native::NativeCompiler;
pub use sanitize::{sanitize, SanitizedText};
