use crate::rpc::ApiRegistry;

pub mod posts;
pub mod system;
pub mod users;

/// Build the procedure registry for the whole RPC surface.
pub fn build_registry() -> ApiRegistry {
    let mut registry = ApiRegistry::new();
    posts::register(&mut registry);
    tests::register(&mut registry);
    users::register(&mut registry);
    registry
}
