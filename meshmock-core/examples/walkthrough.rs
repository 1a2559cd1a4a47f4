use std::f64::consts::PI;

use meshmock_core::{CouplingElementState, MeshConfig, MeshControl, MeshFacade, Scalar};

fn main() {
    let mut mesh = MeshFacade::new(&MeshConfig::default());
    mesh.connect();

    let pi_phase = CouplingElementState::new(0.0, PI).expect("valid state");
    mesh.set_puc_states(&[(2.into(), pi_phase), (5.into(), CouplingElementState::cross())])
        .expect("puc ids in range");

    let states = mesh
        .beamsplitter(2.into(), &Scalar::list([17, 19]), true)
        .expect("disjoint ports");
    println!("[meshmock-core] beamsplitter touched {} PUCs", states.len());
    println!(
        "[meshmock-core] output power {:?}",
        mesh.get_output_power(&Scalar::list([17, 19]))
            .expect("ports in range")
    );
    println!(
        "[meshmock-core] temperature {:.2} C",
        mesh.get_temp().expect("connected")
    );
    mesh.disconnect();
}
