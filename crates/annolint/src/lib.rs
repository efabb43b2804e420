#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use annolint_geometry as geometry;

#[doc(inline)]
pub use annolint_check as check;
