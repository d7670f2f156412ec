use lazy_static::lazy_static;
use prometheus::Encoder;
use prometheus::IntCounterVec;
use prometheus::Opts;
use prometheus::Registry;
use prometheus::TextEncoder;


lazy_static! {
    pub static ref PROCESS_SPAWNS: IntCounterVec = IntCounterVec::new(
        Opts::new("harness_process_spawns", "database-server processes spawned"),
        &["role"]
    )
    .expect("metric can not be created");

    pub static ref PROCESS_KILLS: IntCounterVec = IntCounterVec::new(
        Opts::new("harness_process_kills", "database-server processes killed and reaped"),
        &["role"]
    )
    .expect("metric can not be created");

    pub static ref CONVERGENCE_RETRIES: IntCounterVec = IntCounterVec::new(
        Opts::new("harness_convergence_retries", "convergence loop rounds that had to retry"),
        &["operation"]
    )
    .expect("metric can not be created");

    pub static ref REGISTRY: Registry = {
        let registry = Registry::new();
        registry
            .register(Box::new(PROCESS_SPAWNS.clone()))
            .expect("collector can be registered");
        registry
            .register(Box::new(PROCESS_KILLS.clone()))
            .expect("collector can be registered");
        registry
            .register(Box::new(CONVERGENCE_RETRIES.clone()))
            .expect("collector can be registered");
        registry
    };
}

/// Renders every harness metric in the text exposition format
pub fn gather_text() -> String {
    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer) {
        tracing::error!("could not encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
