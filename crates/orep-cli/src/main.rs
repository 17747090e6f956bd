//! OREP launcher - starts the OREP RMI server or client.
//!
//! Child output is relayed on stdout; logs and diagnostics go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use orep_launcher::platform::{PsProcessLister, SysinfoProcessLister};
use orep_launcher::process::SystemRunner;
use orep_launcher::{
    LaunchReport, LauncherError, LauncherSettings, Orchestrator, ProcessLister, ProcessSource,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "orep-launch", version)]
#[command(about = "Launch the OREP RMI server or client")]
struct Args {
    /// Settings file (defaults to <config dir>/orep/launcher.json if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Compiled classes directory
    #[arg(long, global = true)]
    classes_dir: Option<PathBuf>,

    /// Java runtime, by name or path
    #[arg(long, global = true)]
    java: Option<String>,

    /// How to read the process table
    #[arg(long, global = true, value_enum)]
    process_source: Option<ProcessSourceArg>,

    /// Print a JSON report instead of the raw child output
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Check the registry and start the RMI server
    Server {
        /// Fully-qualified server class
        #[arg(long = "class")]
        class_name: Option<String>,

        /// Extra classpath entry, appended after the classes directory (repeatable)
        #[arg(long = "classpath")]
        classpath: Vec<String>,

        /// Hostname advertised through java.rmi.server.hostname
        #[arg(long)]
        hostname: Option<String>,
    },
    /// Generate stubs and start the RMI client
    Client {
        /// Fully-qualified client class
        #[arg(long = "class")]
        class_name: Option<String>,

        /// Extra classpath entry, appended after the classes directory (repeatable)
        #[arg(long = "classpath")]
        classpath: Vec<String>,

        /// Stub compiler, by name or path
        #[arg(long)]
        rmic: Option<String>,
    },
    /// Report whether rmiregistry is running
    Probe,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ProcessSourceArg {
    Ps,
    Sysinfo,
}

impl From<ProcessSourceArg> for ProcessSource {
    fn from(arg: ProcessSourceArg) -> Self {
        match arg {
            ProcessSourceArg::Ps => ProcessSource::Ps,
            ProcessSourceArg::Sysinfo => ProcessSource::Sysinfo,
        }
    }
}

/// Load the settings file and apply command-line overrides on top.
fn resolve_settings(args: &Args) -> Result<LauncherSettings> {
    let mut settings = LauncherSettings::load(args.config.as_deref())
        .context("failed to load launcher settings")?;

    if let Some(ref dir) = args.classes_dir {
        settings.classes_dir = dir.clone();
    }
    if let Some(ref java) = args.java {
        settings.java = java.clone();
    }
    if let Some(source) = args.process_source {
        settings.registry.source = source.into();
    }

    match &args.command {
        Cmd::Server {
            class_name,
            classpath,
            hostname,
        } => {
            if let Some(name) = class_name {
                settings.server.class_name = name.clone();
            }
            settings.server.extra_classpath.extend(classpath.iter().cloned());
            if hostname.is_some() {
                settings.server.hostname = hostname.clone();
            }
        }
        Cmd::Client {
            class_name,
            classpath,
            rmic,
        } => {
            if let Some(name) = class_name {
                settings.client.class_name = name.clone();
            }
            settings.client.extra_classpath.extend(classpath.iter().cloned());
            if let Some(rmic) = rmic {
                settings.stub_compiler = rmic.clone();
            }
        }
        Cmd::Probe => {}
    }

    Ok(settings)
}

fn process_lister(settings: &LauncherSettings) -> Box<dyn ProcessLister> {
    match settings.registry.source {
        ProcessSource::Ps => Box::new(PsProcessLister::new(
            settings.registry.lister.clone(),
            settings.registry.lister_args.clone(),
        )),
        ProcessSource::Sysinfo => Box::new(SysinfoProcessLister),
    }
}

/// Write the report to stdout. A closed stdout is reported as an error.
fn print_report(report: &LaunchReport, json: bool) -> Result<()> {
    let mut out = io::stdout().lock();
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(report)?)?;
    } else {
        let output = report.output();
        if !output.is_empty() {
            out.write_all(output.as_bytes())?;
            if !output.ends_with('\n') {
                writeln!(out)?;
            }
        }
    }
    out.flush().context("failed to write to stdout")?;
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let settings = resolve_settings(args)?;
    debug!("Effective settings: {:?}", settings);

    let lister = process_lister(&settings);
    let orchestrator = Orchestrator::new(&settings, &SystemRunner, lister.as_ref());

    match args.command {
        Cmd::Server { .. } => {
            let plan = settings.server_plan()?;
            let report = orchestrator.run_server(&plan)?;
            print_report(&report, args.json)?;
        }
        Cmd::Client { .. } => {
            let plan = settings.client_plan()?;
            let report = orchestrator.run_client(&plan)?;
            print_report(&report, args.json)?;
        }
        Cmd::Probe => {
            let status = orchestrator.probe_registry()?;
            let mut out = io::stdout().lock();
            if args.json {
                let body = serde_json::json!({
                    "token": settings.registry.token,
                    "registry": status,
                });
                writeln!(out, "{}", serde_json::to_string_pretty(&body)?)?;
            } else {
                writeln!(out, "{}: {}", settings.registry.token, status)?;
            }
            out.flush().context("failed to write to stdout")?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            let code = e
                .downcast_ref::<LauncherError>()
                .map(LauncherError::exit_code)
                .unwrap_or(1);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
