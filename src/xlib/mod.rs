//! Low-level Xlib interop
//!
//! Everything that knows about the native ABI lives under this module: the
//! structure mirrors in [`abi`] and the runtime symbol binding in
//! [`binding`]. The caller-facing types in the rest of the crate are
//! structurally independent of these layouts.

pub mod abi;
pub(crate) mod binding;
