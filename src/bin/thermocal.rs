//! Run a calibration session from a configuration file.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use thermocal::sim::{SimSettings, SimulatedRig};
use thermocal::{
    write_csv, AnalogInput, CalibrationSession, CalibrationTable, Config, LineTransport,
    SerialTransport, SessionOutcome,
};

/// Automated thermocouple calibration against a reference source.
#[derive(Parser, Debug)]
#[command(name = "thermocal")]
#[command(about = "Drive a thermocouple calibration run and export the coefficients")]
#[command(version)]
struct Args {
    /// Path to the JSON configuration file.
    #[arg(long, default_value = "thermocal.json")]
    config: PathBuf,

    /// Destination CSV for the calibration table.
    #[arg(long, default_value = "calibration.csv")]
    out: PathBuf,

    /// Validate the configuration and print the visiting order, then exit.
    #[arg(long)]
    dry_run: bool,

    /// Run against the software rig instead of real hardware.
    #[arg(long)]
    simulate: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match Config::from_path(&args.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(path = %args.config.display(), error = %e, "cannot load config");
            return ExitCode::FAILURE;
        }
    };
    if let Err(reason) = config.validate() {
        tracing::error!(%reason, "invalid configuration");
        return ExitCode::FAILURE;
    }

    let targets = config.targets.resolve();
    if args.dry_run {
        println!("visiting order ({} points):", targets.len());
        for target in &targets {
            println!("  {:.3}", target);
        }
        return ExitCode::SUCCESS;
    }

    if args.simulate {
        let mut settings = SimSettings::default();
        settings.probe_gains = vec![1.0; config.channels.len()];
        settings.probe_offsets = (0..config.channels.len())
            .map(|i| 0.3 + 0.1 * i as f64)
            .collect();
        let rig = SimulatedRig::new(settings);
        tracing::info!("running against the software rig");
        run_session(rig.source(), rig.probes(), config, &args)
    } else {
        // A real run needs a DAQ backend behind the AnalogInput seam; none
        // ships in this binary, so hardware mode only proves the source
        // link and then refuses rather than calibrate against fake probes.
        let transport = match SerialTransport::open(&config.serial) {
            Ok(transport) => transport,
            Err(e) => {
                tracing::error!(port = %config.serial.port, error = %e, "cannot open serial port");
                return ExitCode::FAILURE;
            }
        };
        drop(transport);
        tracing::error!(
            "no acquisition backend is built into this binary; run with \
             --simulate, or drive CalibrationSession from your own binary \
             with an AnalogInput implementation for your DAQ hardware"
        );
        ExitCode::FAILURE
    }
}

fn run_session<T: LineTransport, A: AnalogInput>(
    transport: T,
    probes: A,
    config: Config,
    args: &Args,
) -> ExitCode {
    let mut session = CalibrationSession::new(transport, probes, config.clone());

    let flag = session.interrupt_flag();
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        tracing::warn!(error = %e, "cannot install Ctrl-C handler");
    }

    let result = session.run();
    // Teardown runs on every path and keeps whatever was recorded.
    let points = session.finish();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(error = %e, "session failed");
            return ExitCode::FAILURE;
        }
    };

    let table = CalibrationTable::from_points(&points, &config.channels);
    export_with_retry(&table, args);

    println!("{}", thermocal::output::format_summary(outcome, &table));
    match outcome {
        SessionOutcome::Completed { .. } => ExitCode::SUCCESS,
        SessionOutcome::Interrupted { .. } => ExitCode::FAILURE,
    }
}

/// Write the table, blocking on operator acknowledgment for as long as the
/// destination stays unwritable. Collected data is never discarded here.
fn export_with_retry(table: &CalibrationTable, args: &Args) {
    loop {
        match write_csv(table, &args.out) {
            Ok(()) => {
                tracing::info!(path = %args.out.display(), "calibration table written");
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, "export failed");
                eprintln!(
                    "The file could not be written. Close any program using it and \
                     check write permissions."
                );
                eprint!("Press Enter to retry: ");
                let _ = io::stderr().flush();
                let mut ack = String::new();
                let _ = io::stdin().lock().read_line(&mut ack);
            }
        }
    }
}
