mod cli;

use toolshed::{config, open_registry};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use std::process::ExitCode;
use ts_core::Error;
use ts_tools::{
    decode_to_stdout, initialize, DetectReport, InvocationOutcome, ProcessRequest, Tool,
    ToolRegistry,
};

/// Exit status when the tool ran past its timeout (same as coreutils `timeout`).
const EXIT_TIMEOUT: u8 = 124;
/// Exit status when the tool is missing or could not be launched.
const EXIT_UNAVAILABLE: u8 = 127;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let settings_path = config::settings_path(cli.config.as_deref());

    // Initialize logging
    // Respect RUST_LOG env var if set, then the settings file, then the verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "toolshed=debug,ts_tools=debug,ts_core=debug".to_string()
        } else {
            config::load_config_or_default(&settings_path)
                .ok()
                .and_then(|c| c.app.log)
                .unwrap_or_else(|| "toolshed=info,ts_tools=info,ts_core=warn".to_string())
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    // Opened per command so `version` works even with a broken settings file.
    let open = || open_registry(&settings_path, cli.app_dir.as_deref());

    match cli.command {
        Commands::CheckTools { json } => check_tools(&open()?, json),
        Commands::Init => init(&open()?),
        Commands::Detect { tool } => detect(&open()?, tool),
        Commands::SetPath { tool, dir } => {
            let wrote = open()?.set_directory(tool, &dir)?;
            report_write(wrote, tool, "directory", &dir);
            Ok(ExitCode::SUCCESS)
        }
        Commands::SetTimeout { tool, secs } => {
            let wrote = open()?.set_timeout(tool, secs)?;
            report_write(wrote, tool, "timeout", &secs.to_string());
            Ok(ExitCode::SUCCESS)
        }
        Commands::DecodeAudio {
            input,
            output,
            rate,
            bits,
            channels,
        } => decode_audio(&open()?, &input, output.as_deref(), rate, bits, channels),
        Commands::Run { binary, args } => {
            let request = ProcessRequest::new(binary).args(args).capture_stdout();
            run(&open()?, &request)
        }
        Commands::Version => {
            println!("toolshed {}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn check_tools(registry: &ToolRegistry, json: bool) -> Result<ExitCode> {
    let statuses: Vec<_> = Tool::ALL.iter().map(|&tool| registry.status(tool)).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
    } else {
        println!("Checking external tools...\n");
        for status in &statuses {
            let mark = if status.configured { "✓" } else { "✗" };
            let timeout = if status.timeout_secs < 0 {
                "no timeout".to_string()
            } else {
                format!("timeout {}s", status.timeout_secs)
            };
            println!(
                "{} {} - {:?} ({}) [{}]",
                mark,
                status.tool,
                status.directory,
                status.resolved.display(),
                timeout
            );
        }
        println!();
        if statuses.iter().all(|s| s.configured) {
            println!("All tools are available!");
        } else {
            println!("Some tools are missing. Run `toolshed init` or `toolshed set-path`.");
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init(registry: &ToolRegistry) -> Result<ExitCode> {
    for report in initialize(registry) {
        match report {
            DetectReport::AlreadyConfigured { tool, directory } => {
                println!("✓ {} already configured: {:?}", tool, directory)
            }
            DetectReport::Detected { tool, directory } => {
                println!("✓ {} detected: {:?}", tool, directory)
            }
            DetectReport::NotFound { tool } => println!("✗ {} not found", tool),
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn detect(registry: &ToolRegistry, tool: Tool) -> Result<ExitCode> {
    match registry.autodetect(tool) {
        Some(dir) => {
            println!("{dir}");
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("{} not found", tool);
            Ok(ExitCode::from(EXIT_UNAVAILABLE))
        }
    }
}

fn report_write(wrote: bool, tool: Tool, what: &str, value: &str) {
    if wrote {
        println!("Set {} {} to {}", tool, what, value);
    } else {
        println!("{} {} already {}", tool, what, value);
    }
}

fn decode_audio(
    registry: &ToolRegistry,
    input: &Path,
    output: Option<&Path>,
    rate: u32,
    bits: u32,
    channels: u32,
) -> Result<ExitCode> {
    let request = decode_to_stdout(input, rate, bits, channels);

    let samples = match registry.decode_audio(&request) {
        Ok(samples) => samples,
        Err(e) => return Ok(report_error(&e)),
    };

    match output {
        Some(path) => {
            std::fs::write(path, &samples)
                .with_context(|| format!("Failed to write samples to {:?}", path))?;
            println!("Wrote {} bytes to {}", samples.len(), path.display());
        }
        None => println!("Decoded {} bytes", samples.len()),
    }
    Ok(ExitCode::SUCCESS)
}

fn run(registry: &ToolRegistry, request: &ProcessRequest) -> Result<ExitCode> {
    let outcome = match registry.run(request) {
        Ok(outcome) => outcome,
        Err(e) => return Ok(report_error(&e)),
    };

    if let InvocationOutcome::Success { stdout } | InvocationOutcome::ToolError { stdout, .. } =
        &outcome
    {
        print!("{}", String::from_utf8_lossy(stdout));
    }

    match outcome.into_result(request.binary().stem()) {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(e) => Ok(report_error(&e)),
    }
}

fn report_error(err: &Error) -> ExitCode {
    eprintln!("Error: {err}");
    match err {
        Error::Timeout { .. } => ExitCode::from(EXIT_TIMEOUT),
        e if e.is_unavailable() => ExitCode::from(EXIT_UNAVAILABLE),
        Error::ToolFailed { code, .. } => {
            let code = code.and_then(|c| u8::try_from(c).ok()).unwrap_or(1);
            ExitCode::from(code.max(1))
        }
        _ => ExitCode::FAILURE,
    }
}
