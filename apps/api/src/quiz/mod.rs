pub mod catalog;
pub mod explanation;
pub mod generator;
pub mod handlers;
pub mod notice;
pub mod persistence;
pub mod policy;
pub mod prompts;
pub mod service;
pub mod session;
pub mod timer;
pub mod view;
