//! Sync a directory and print progress while rsync runs
//!
//! ```bash
//! cargo run --example sync_progress -- /path/to/source/ /path/to/destination
//! ```

use rsync_task::{CommandRunner, RsyncOptions, Task};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let (Some(source), Some(destination)) = (args.next(), args.next()) else {
        eprintln!("usage: sync_progress <source> <destination>");
        std::process::exit(2);
    };

    let options = RsyncOptions {
        rsync_path: CommandRunner::locate_rsync(),
        extra_args: args.collect(),
        ..Default::default()
    };

    let mut task = Task::new(&source, &destination, options)?;
    let handle = task.handle();
    let run = tokio::spawn(async move { task.run().await });

    while !run.is_finished() {
        let state = handle.state();
        println!(
            "{:>6.2}%  {:>5}/{:<5} {:>10}  {}",
            state.progress, state.remain, state.total, state.speed, state.copied_object
        );
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    match run.await? {
        Ok(()) => println!("✓ Done: {:.2}%", handle.state().progress),
        Err(e) => {
            eprintln!("✗ rsync failed: {e}");
            eprint!("{}", handle.log().stderr);
        }
    }

    Ok(())
}
