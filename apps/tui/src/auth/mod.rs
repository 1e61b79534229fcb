// Session token persistence

mod token_store;

pub use token_store::{StoredToken, TokenKind, TokenStore, TokenStoreError};
