// In demos/pipeline.rs
//
// Runs a producer, a relay and a worker against one data service and prints
// the transport side of the outbound queue until Ctrl+C.
//
// RUST_LOG=debug cargo run --example pipeline -- 5
use dmxp_dataservice::Service::{spawn_relay, spawn_worker};
use dmxp_dataservice::{Message, ServiceBuilder};
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let devices: u8 = env::args()
        .nth(1)
        .map(|s| s.parse().expect("Invalid number of devices"))
        .unwrap_or(4);

    let service = Arc::new(ServiceBuilder::new().build()?);
    service.with_store(|store| println!("Store: {:#?}", store));

    let relay = spawn_relay(Arc::clone(&service), Duration::from_millis(5))?;
    let worker = spawn_worker(Arc::clone(&service), Duration::from_millis(50))?;

    let keep_alive = Arc::new(AtomicBool::new(true));
    let keep_alive_for_handler = Arc::clone(&keep_alive);

    // Handle Ctrl+C to clean up
    ctrlc::set_handler(move || {
        keep_alive_for_handler.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    // Producer: every device reports a reading, then asks for it back
    let producer = {
        let service = Arc::clone(&service);
        let keep_alive = Arc::clone(&keep_alive);
        thread::spawn(move || {
            let mut tick: u8 = 0;
            while keep_alive.load(Ordering::Acquire) {
                for id in 1..=devices {
                    let reading = [id, tick, tick.wrapping_mul(3)];
                    let write = Message::write(id, 0x00, &reading).expect("reading fits");
                    let _ = service.request(write.as_bytes());
                    let _ = service.request(Message::read(0x00, id).as_bytes());
                }
                tick = tick.wrapping_add(1);
                thread::sleep(Duration::from_millis(250));
            }
        })
    };

    // Transport side
    while keep_alive.load(Ordering::Acquire) {
        if let Ok(msg) = service.handle_tx_timeout(Duration::from_millis(100)) {
            println!("TX: {:?}", msg);
        }
    }

    producer.join().expect("producer panicked");
    worker.stop();
    relay.stop();

    println!("Devices: {:02x?}", service.devices());
    println!("Stats: {:#?}", service.stats());
    Ok(())
}
