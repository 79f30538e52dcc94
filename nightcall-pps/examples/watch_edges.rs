//! Watch PPS edges on a device and print each one.
//!
//! Usage: cargo run --example watch_edges [/dev/pps0]

use std::time::Duration;

use nightcall_pps::{PpsDevice, PpsSource};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let device = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/dev/pps0".to_string());
    let pps = PpsDevice::new(&device)?;
    println!("watching {device} (ctrl-c to stop)");

    loop {
        match pps.wait_for_edge(Duration::from_secs(5))? {
            Some(edge) => println!(
                "edge #{} at {:.9} (clock offset {:+.3} ms)",
                edge.sequence,
                edge.utc_seconds,
                edge.clock_offset_ms()
            ),
            None => println!("no edge within 5 s"),
        }
    }
}
