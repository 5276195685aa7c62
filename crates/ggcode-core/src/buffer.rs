use crate::error::BridgeError;
use crate::sanitize::SanitizedText;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// Zero-terminated UTF-8 buffer handed to the external compiler.
///
/// The compiler reads up to the first zero byte, so an interior zero would
/// silently truncate the program. Construction rejects such text instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryBuffer {
    bytes: CString,
}

impl BoundaryBuffer {
    pub fn encode(text: &SanitizedText) -> Result<Self, BridgeError> {
        CString::new(text.as_str())
            .map(|bytes| Self { bytes })
            .map_err(|err| BridgeError::Encoding {
                position: err.nul_position(),
            })
    }

    /// Length of the encoded source, excluding the terminator.
    pub fn len(&self) -> usize {
        self.bytes.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes_with_nul(&self) -> &[u8] {
        self.bytes.as_bytes_with_nul()
    }

    pub fn as_c_str(&self) -> &CStr {
        &self.bytes
    }

    /// Pointer valid for as long as `self` is borrowed.
    pub fn as_ptr(&self) -> *const c_char {
        self.bytes.as_ptr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::sanitize;

    #[test]
    fn appends_exactly_one_terminator() {
        let buffer = BoundaryBuffer::encode(&sanitize("G1 X10")).unwrap();
        assert_eq!(buffer.as_bytes_with_nul(), b"G1 X10\0");
        assert_eq!(buffer.len(), 6);
    }

    #[test]
    fn empty_text_is_a_lone_terminator() {
        let buffer = BoundaryBuffer::encode(&sanitize("")).unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.as_bytes_with_nul(), b"\0");
    }

    #[test]
    fn interior_zero_byte_is_rejected_with_offset() {
        let err = BoundaryBuffer::encode(&sanitize("let a = 1\n\0G1")).unwrap_err();
        assert_eq!(err, BridgeError::Encoding { position: 10 });
    }

    #[test]
    fn multibyte_text_is_utf8_encoded() {
        let buffer = BoundaryBuffer::encode(&sanitize("// ø 10µm")).unwrap();
        assert_eq!(
            buffer.as_bytes_with_nul(),
            "// ø 10µm\0".as_bytes()
        );
        assert_eq!(buffer.as_c_str().to_str().unwrap(), "// ø 10µm");
    }
}
