pub mod debug_log;
pub mod fetch_coordinator;
pub mod navigation;
pub mod operations;
pub mod query_client;
pub mod recent_connections;
pub mod relationship_inference;
pub mod schema_model;
pub mod viewport;

#[must_use]
pub fn domain_name() -> &'static str {
    "scry-core"
}

#[cfg(test)]
mod tests {
    use super::domain_name;

    #[test]
    fn domain_name_is_stable() {
        assert_eq!(domain_name(), "scry-core");
    }
}
