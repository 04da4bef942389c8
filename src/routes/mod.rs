//! Route handlers behind `handle_request`. Each returns a JSON body.

pub mod keys;
pub mod save;
pub mod util;
