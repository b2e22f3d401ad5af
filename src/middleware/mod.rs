/*
 * Responsibility
 * - Public surface of the middleware layers
 *   - auth: session resolution + per-area route guard
 *   - http / cors / security_headers: cross-cutting transport concerns
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
