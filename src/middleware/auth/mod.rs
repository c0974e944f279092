/*!
 * JWT authentication middleware
 *
 * Responsibility:
 * - extract: where the token comes from
 * - validate: the seam to whatever verifies it
 * - jwt: the per-request decision (pass / attach claims / reject)
 * - claims: handing verified claims to handlers
 */

pub mod claims;
pub mod extract;
pub mod jwt;
pub mod validate;

pub use claims::{Claims, claims_from_extensions};
pub use extract::{
    ExtractError, TokenExtractor, auth_header_token_extractor, cookie_token_extractor,
    multi_token_extractor, parameter_token_extractor, token_extractor,
};
pub use jwt::{
    ErrorHandler, JwtMiddleware, JwtOption, apply, check_jwt, default_error_handler,
    with_credentials_optional, with_error_handler, with_token_extractor, with_validate_on_options,
};
pub use validate::{ValidateFn, ValidateToken, validate_fn};
