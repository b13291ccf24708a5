pub mod admin;
pub mod audit;
pub mod config;
pub mod db;
pub mod display;
pub mod dto;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
pub mod validation;
