pub mod types;
pub mod utils;
pub mod shutdown;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(h.status, "ok");
    }

    #[test]
    fn logging_init_is_idempotent() {
        utils::logging::init_logging_default();
        utils::logging::init_logging_json();
        tracing::info!("still logging after double init");
    }
}
