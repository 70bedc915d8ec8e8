//! QR symbol encoding for record payloads.
//!
//! Wraps the `qrcode` encoder with a fixed raster style (module size and
//! quiet zone) and returns a grayscale bitmap ready for composition.

pub mod symbol;

pub use symbol::{
    DEFAULT_MODULE_SIZE, DEFAULT_QUIET_ZONE, QrSymbol, QrSymbolError, SymbolStyle, encode_symbol,
};
