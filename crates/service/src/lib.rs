//! Service layer providing the business logic behind the HTTP surface.
//! - `token`: bearer token issue/verify/revoke state machine.
//! - `auth`: registration, login, logout and profile workflows.
//! - `message`: direct messages with sender-ownership authorization.
//! - `validate`: field validation and the aggregated error map.

pub mod auth;
pub mod message;
pub mod token;
pub mod validate;
