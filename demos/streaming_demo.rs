//! Streaming Demo: the same answer delivered two ways, revealed one way.
//!
//! The sample response is first handed over in one burst, then replayed as
//! 1-3 char fragments with jittery gaps. Both reveal at the same steady
//! pace. Halfway through the second run a new "prompt" resets the stream,
//! and nothing from the old answer leaks into the new one.

use std::io::{self, IsTerminal};
use std::thread;
use std::time::{Duration, Instant};
use trickle::producer::SAMPLE_RESPONSE;
use trickle::{
    Delivery, DisplayUpdate, Epoch, PacerActor, PacerHandle, RevealConfig,
    RevealPrinter, UnitMode,
};

fn main() -> trickle::Result<()> {
    let config = RevealConfig::default()
        .with_delay(Duration::from_millis(8))
        .with_batch_size(2)
        .with_unit(UnitMode::Grapheme);
    let pacer = PacerActor::spawn(config)?;
    let handle = pacer.handle();

    let stdout = io::stdout();
    let styled = stdout.is_terminal();
    let mut printer = RevealPrinter::new(stdout.lock(), styled);

    // Run 1: one-shot delivery.
    let epoch = start(&handle, &pacer, &mut printer, "one-shot delivery")?;
    produce(&handle, epoch, Delivery::OneShot);
    let elapsed = drain(&pacer, &mut printer, epoch)?;
    println!("[one-shot revealed in {:.2}s]\n", elapsed.as_secs_f32());

    // Run 2: chunked delivery, interrupted.
    let epoch = start(&handle, &pacer, &mut printer, "chunked delivery (interrupted)")?;
    produce(
        &handle,
        epoch,
        Delivery::Chunked {
            min: 1,
            max: 3,
            interval: Duration::from_millis(3),
        },
    );
    thread::sleep(Duration::from_millis(600));

    let epoch = start(&handle, &pacer, &mut printer, "superseding prompt")?;
    produce(&handle, epoch, Delivery::OneShot);
    let elapsed = drain(&pacer, &mut printer, epoch)?;
    println!("[revealed in {:.2}s]", elapsed.as_secs_f32());

    pacer.join();
    Ok(())
}

/// Reset the pacer and print a header once the reset is visible.
fn start<W: io::Write>(
    handle: &PacerHandle,
    pacer: &PacerActor,
    printer: &mut RevealPrinter<W>,
    title: &str,
) -> trickle::Result<Epoch> {
    let epoch = handle.reset()?;
    while let Ok(update) = pacer.updates().recv() {
        printer.apply(&update)?;
        if update == (DisplayUpdate::Reset { epoch }) {
            break;
        }
    }
    printer.header(title)?;
    Ok(epoch)
}

/// Feed the sample response from a producer thread.
fn produce(handle: &PacerHandle, epoch: Epoch, delivery: Delivery) {
    let mut sink = handle.sink(epoch);
    thread::spawn(move || {
        // A superseded stream just stops.
        let _ = delivery.deliver(SAMPLE_RESPONSE, &mut sink);
    });
}

/// Render updates until `epoch` goes idle.
fn drain<W: io::Write>(
    pacer: &PacerActor,
    printer: &mut RevealPrinter<W>,
    epoch: Epoch,
) -> trickle::Result<Duration> {
    let start = Instant::now();
    while let Ok(update) = pacer.updates().recv() {
        printer.apply(&update)?;
        if update == (DisplayUpdate::Idle { epoch }) {
            break;
        }
    }
    Ok(start.elapsed())
}
