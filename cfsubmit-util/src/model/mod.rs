mod contest;
mod credential;
mod driver;
mod submission;

pub use contest::*;
pub use credential::*;
pub use driver::*;
pub use submission::*;

pub type LangId = String;

pub type Handle = String;

pub type HandleRef<'a> = &'a str;
