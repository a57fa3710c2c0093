pub mod ast;
pub mod callable;
pub mod class;
pub mod containers;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod natives;
pub mod parser;
pub mod reclaim;
pub mod resolver;
pub mod scanner;
pub mod session;
pub mod token;
pub mod value;
