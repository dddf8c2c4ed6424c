pub mod catalog;
pub mod error;
pub mod request;
pub mod response;
pub mod upstream;
