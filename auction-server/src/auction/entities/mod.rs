mod auction;
mod error;
mod filter;

pub use {
    auction::*,
    error::*,
    filter::*,
};
