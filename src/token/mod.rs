mod codec;
mod header;

pub use codec::{decode, encode, DecodedToken};
pub use header::Header;
