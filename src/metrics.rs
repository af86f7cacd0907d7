use lazy_static::lazy_static;
use prometheus::{Counter, Histogram, register_counter, register_histogram};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("notehost_requests_total", "Total number of requests").unwrap();
    pub static ref WRITES_ACCEPTED: Counter =
        register_counter!("notehost_writes_accepted_total", "Total accepted note writes").unwrap();
    pub static ref WRITES_REJECTED: Counter =
        register_counter!("notehost_writes_rejected_total", "Total rejected note writes").unwrap();
    pub static ref WRITE_LATENCY: Histogram = register_histogram!(
        "notehost_write_latency_seconds",
        "Note write latency in seconds"
    )
    .unwrap();
}
