//! Mojang identity resolution
//!
//! Resolves account identities in both directions (display name to UUID and
//! UUID to display name). Ranking providers accept only one identifier form,
//! so a lookup that arrives in the other form goes through here first.
//! Successful lookups are cached both ways using moka async caches.

mod resolver;
mod types;

pub use resolver::IdentityResolver;
