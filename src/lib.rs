#![no_std]

pub mod config;
pub mod infrastructure;

/// Move a value into its own `StaticCell` and borrow it for `'static`
///
/// Every expansion site owns one cell, so it must run at most once.
#[macro_export]
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        CELL.init($val)
    }};
}
