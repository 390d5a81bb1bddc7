//! Commonly used constants

/// Base64 engine for the `merchantSig` field. The HPP contract uses the
/// standard alphabet with padding, not the URL-safe variant.
pub const BASE64_ENGINE: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;
