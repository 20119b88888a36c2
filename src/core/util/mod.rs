pub mod clock;
pub mod numeric_util;
