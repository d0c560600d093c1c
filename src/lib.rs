// Library for tests to access modules

pub mod config;
pub mod grafana;
pub mod histogram;
pub mod models;
pub mod report;
pub mod runner;
pub mod version;
