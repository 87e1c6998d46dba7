pub mod canonical;
pub mod models;
pub mod profile;
pub mod url_builder;
pub mod validation;
pub mod verifier;
