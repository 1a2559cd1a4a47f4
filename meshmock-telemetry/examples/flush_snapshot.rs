use meshmock_telemetry::{TelemetryConfig, TelemetryHandle};

fn main() {
    let telemetry = TelemetryHandle::from_config(TelemetryConfig::sample("http://localhost:4318"));

    for _ in 0..3 {
        telemetry
            .record_counter("mesh.op.interconnect", 1)
            .expect("within u64 range");
    }
    telemetry.record_reading("mesh.temperature_c", 42.17);
    telemetry.record_reading("mesh.temperature_c", 38.02);

    let snapshot = telemetry.flush();
    println!(
        "[meshmock-telemetry] counters={:?} readings={:?}",
        snapshot.counters, snapshot.readings
    );
}
