pub mod errors;
pub mod requests;
pub mod todo;

pub use errors::*;
pub use requests::*;
pub use todo::*;
