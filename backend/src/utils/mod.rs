pub mod cookies;
pub mod extract;
pub mod password;
pub mod token;

pub use cookies::*;
pub use extract::*;
pub use password::*;
pub use token::*;
