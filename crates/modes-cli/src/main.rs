//! Mode S squitter receiver command-line front end.
//!
//! Three invocation modes, matching the original receiver:
//! - no arguments: live mode, stream from the first I/Q device to stdout.
//! - one positional `FILE`: replay mode, decode a capture file to stdout.
//! - `-w FILE`: record mode, capture raw I/Q from a device to `FILE`.

use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex};

use anyhow::{Context, Result};
use clap::Parser;

use modes_core::source::{BlockSource, FileSource, RtlSdrSource, SourceEvent, BLOCK_BYTES};
use modes_core::{DecodedMessage, DecoderConfig, Processor};

#[derive(Parser)]
#[command(name = "modes-receiver")]
#[command(author, version, about = "Software-defined receiver for Mode S squitters", long_about = None)]
struct Cli {
    /// Replay a raw I/Q capture file instead of opening a device.
    file: Option<PathBuf>,

    /// Record raw I/Q from a device to FILE instead of decoding.
    #[arg(short = 'w', long = "write", value_name = "FILE")]
    write: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Index of the I/Q device to open in live/record mode.
    #[arg(long, default_value_t = 0)]
    device_index: u32,

    /// Attempt single-bit repair on CRCs XORed with the aircraft address.
    #[arg(long)]
    fix_xored_crcs: bool,

    /// Attempt double-bit error correction.
    #[arg(long)]
    fix_2_bit_errors: bool,

    /// Print the assembled decoder configuration as JSON and exit.
    #[arg(long)]
    dump_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let config = DecoderConfig {
        fix_xored_crcs: cli.fix_xored_crcs,
        fix_2_bit_errors: cli.fix_2_bit_errors,
        ..DecoderConfig::default()
    };

    if cli.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    if let Some(path) = cli.write {
        return record_mode(cli.device_index, &path);
    }

    if let Some(path) = cli.file {
        return replay_mode(&path, config);
    }

    live_mode(cli.device_index, config)
}

/// Decode a capture file synchronously, one block at a time. The original
/// receiver's file-replay path has no separate reader thread (a file read
/// never overflows the processor), so this mode skips the mutex/condvar
/// machinery `live_mode` uses.
fn replay_mode(path: &PathBuf, config: DecoderConfig) -> Result<()> {
    let mut source = FileSource::open(path).with_context(|| format!("could not open {}", path.display()))?;
    let mut processor = Processor::new(config);
    let mut buf = vec![0u8; BLOCK_BYTES];

    loop {
        match source.next_block(&mut buf)? {
            SourceEvent::Ready => {
                processor.process_block(&buf, |block_no, message| emit(block_no, message));
            }
            SourceEvent::Eof => break,
        }
    }

    Ok(())
}

fn record_mode(device_index: u32, path: &PathBuf) -> Result<()> {
    let mut source = RtlSdrSource::open(device_index).context("could not open I/Q device")?;
    let mut file = std::fs::File::create(path).with_context(|| format!("could not create {}", path.display()))?;
    let mut buf = vec![0u8; BLOCK_BYTES];

    loop {
        match source.next_block(&mut buf)? {
            SourceEvent::Ready => {
                use std::io::Write;
                file.write_all(&buf)?;
            }
            SourceEvent::Eof => break,
        }
    }

    Ok(())
}

/// Shared state between the reader and processor threads: a single pending
/// block slot plus the shutdown flag, as in the original's one-buffer
/// single-producer/single-consumer design.
struct Shared {
    pending: Option<Vec<u8>>,
    exiting: bool,
}

fn live_mode(device_index: u32, config: DecoderConfig) -> Result<()> {
    let mut source = RtlSdrSource::open(device_index).context("could not open I/Q device")?;

    let shared = Arc::new((Mutex::new(Shared { pending: None, exiting: false }), Condvar::new()));

    {
        let shared = shared.clone();
        ctrlc::set_handler(move || {
            let (lock, cond) = &*shared;
            lock.lock().unwrap().exiting = true;
            cond.notify_all();
        })
        .context("failed to set Ctrl+C handler")?;
    }

    let reader_shared = shared.clone();
    let reader = std::thread::spawn(move || {
        let (lock, cond) = &*reader_shared;
        let mut buf = vec![0u8; BLOCK_BYTES];
        loop {
            {
                if lock.lock().unwrap().exiting {
                    break;
                }
            }

            let event = source.next_block(&mut buf);
            let block = match event {
                Ok(SourceEvent::Ready) => buf.clone(),
                Ok(SourceEvent::Eof) | Err(_) => {
                    let mut guard = lock.lock().unwrap();
                    guard.exiting = true;
                    cond.notify_all();
                    break;
                }
            };

            // Non-blocking lock first: a failure means the processor is
            // still busy with the previous block, which is an overflow.
            match lock.try_lock() {
                Ok(mut guard) => {
                    guard.pending = Some(block);
                    cond.notify_one();
                }
                Err(_) => {
                    tracing::warn!("overflow: processor behind reader, dropping samples");
                    let mut guard = lock.lock().unwrap();
                    if guard.exiting {
                        break;
                    }
                    guard.pending = Some(block);
                    cond.notify_one();
                }
            }
        }
    });

    let mut processor = Processor::new(config);
    let (lock, cond) = &*shared;
    loop {
        let mut guard = lock.lock().unwrap();
        while guard.pending.is_none() && !guard.exiting {
            guard = cond.wait(guard).unwrap();
        }
        if guard.pending.is_none() {
            break;
        }
        let raw = guard.pending.take().unwrap();
        processor.process_block(&raw, |block_no, message| emit(block_no, message));
        // `guard` is dropped here, releasing the mutex only now that
        // interpolation/correlation/demodulation for this block is done.
    }

    reader.join().expect("reader thread panicked");
    Ok(())
}

fn emit(block_no: u64, message: &DecodedMessage) {
    println!("{}", modes_core::emit::format_record(block_no, message));
}
