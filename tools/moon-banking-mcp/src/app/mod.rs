pub mod dispatcher;
pub mod registry;
