pub mod auth_dto;
pub mod auth_handlers;
pub mod auth_service;
pub mod jwt;
pub mod password;
pub mod token_service;

pub use auth_service::AuthService;
pub use jwt::TokenError;
pub use token_service::TokenService;
