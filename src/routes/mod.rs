/// Router Module Index
///
/// Splits the API by access tier. Authentication is enforced per tier with an
/// axum layer; the finer role allow-lists live in the handlers.

/// Routes open to anonymous clients: health, account entry points, catalog reads.
pub mod public;

/// Routes behind the bearer-token middleware.
pub mod authenticated;

/// Role management, restricted to administrators as a whole.
pub mod admin;
