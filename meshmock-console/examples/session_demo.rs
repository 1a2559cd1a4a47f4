use meshmock_console::config::Config;
use meshmock_console::service::MeshSession;
use meshmock_telemetry::TelemetryHandle;

fn main() {
    let cfg = Config::sample();
    let telemetry = TelemetryHandle::from_config(cfg.telemetry.clone());

    let mut session = MeshSession::new(&cfg, telemetry.clone());
    let report = session.run().expect("sample session is valid");
    let snapshot = telemetry.flush();

    println!(
        "[meshmock-console] beamsplitter touched {} PUCs, rollback={}",
        report.beamsplitter_pucs, report.rolled_back
    );
    println!(
        "[meshmock-console] counters={:?} readings={:?}",
        snapshot.counters, snapshot.readings
    );
}
