//! Blogicum - a multi-author blog
//!
//! This library provides posts, categories, locations, comments and user
//! profiles behind a JSON API.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
