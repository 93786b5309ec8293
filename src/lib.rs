// loupe: a small screen-magnifier toolkit.
// The library holds everything that can be tested headless; the binaries
// in src/main.rs and src/bin/ wire it to real windows and input devices.

pub mod capture;
pub mod controller;
pub mod draw;
pub mod error;
pub mod input;
pub mod lens;
pub mod notes;
pub mod scheduler;
pub mod types;

pub use error::{Error, Result};
