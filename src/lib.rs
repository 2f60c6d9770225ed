//! sharebox - A minimal multi-user file sharing service
//!
//! Authenticated users upload files into a flat blob store; anyone holding
//! a share link can download that one file without logging in.

pub mod auth;
pub mod cli;
pub mod config;
pub mod file_storage;
pub mod http_server;
pub mod observability;
pub mod sharing;
