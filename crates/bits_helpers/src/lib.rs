mod bit;
pub use bit::*;

pub mod haptics;
pub mod input;

mod ribbit_communication;
pub use ribbit_communication::*;

mod window_resizing;
