/*
 * Responsibility
 * - concrete collaborators plugged into the middleware (token validators)
 */
pub mod auth;
