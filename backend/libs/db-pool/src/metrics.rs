use lazy_static::lazy_static;
use prometheus::{register_int_gauge_vec, IntGaugeVec};
use sqlx::PgPool;

lazy_static! {
    /// Connections per pool, split into idle, in use and the configured cap.
    static ref POOL_CONNECTIONS: IntGaugeVec = register_int_gauge_vec!(
        "db_pool_connections",
        "PostgreSQL pool connections by state",
        &["service", "state"]
    )
    .expect("failed to register db_pool_connections");
}

pub(crate) fn record_pool_state(pool: &PgPool, service: &str) {
    let open = i64::from(pool.size());
    let idle = pool.num_idle() as i64;
    let cap = i64::from(pool.options().get_max_connections());

    for (state, value) in [("idle", idle), ("in_use", open - idle), ("max", cap)] {
        POOL_CONNECTIONS
            .with_label_values(&[service, state])
            .set(value);
    }
}
