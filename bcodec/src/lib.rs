//! Persona definitions and the URL-safe share-token codec.
//!
//! A share token is self-contained: decoding it reconstructs the persona
//! with no external lookup, so a conversation can be bootstrapped purely
//! from a link.
//!
//! ```rust
//! use bcodec::{Persona, decode_share_token, encode_share_token};
//!
//! let persona = Persona::new("Tess", "Be terse.", "https://example.com/a.png");
//! let token = encode_share_token(&persona);
//! assert_eq!(decode_share_token(&token).unwrap(), persona);
//! ```

mod error;
mod persona;
mod token;

pub use error::{CodecError, CodecErrorKind};
pub use persona::Persona;
pub use token::{decode_share_token, encode_share_token};
