pub mod dispatcher;
pub mod responses;
pub mod tools;
