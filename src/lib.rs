// Library for tests to access modules

pub mod backend;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod routes;
pub mod series;
pub mod version;
pub mod worker;
