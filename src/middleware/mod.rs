/*
 * Responsibility
 * - public middleware surface (re-exports)
 * - auth: JWT check, http: request-id / trace / limits for the demo server
 */
pub mod auth;
pub mod http;
