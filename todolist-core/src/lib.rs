//! # todolist-core
//!
//! Types shared by the To-Do List API and its web front-end.
//!
//! ## Components
//!
//! - **Item:** The to-do list item and its wire representation.
//! - **Claims:** The claim set carried by a bearer token.
//! - **Validator:** Signature and claim validation of bearer tokens.

pub mod claims;
pub mod error;
pub mod item;
pub mod validator;

pub use claims::Claims;
pub use error::AuthError;
pub use item::{NewTodoItem, TodoItem};
pub use validator::{KeySource, TokenValidator, ValidatorSettings};
