//! Wire formats spoken by the resolvers.

pub mod dns;
