pub mod export;
pub mod http;

#[must_use]
pub fn adapter_name() -> &'static str {
    "scry-adapters"
}
