use crate::config::PortSource;
use crate::midi_output::port_matches;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// List available MIDI output devices
    #[arg(long)]
    pub device_list: bool,

    /// MIDI output port to send to (case-insensitive substring)
    #[arg(short, long, value_name = "PORT")]
    pub output: Option<String>,

    /// Settings file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print frames instead of sending them
    #[arg(long)]
    pub dry_run: bool,
}

/// Check that some port in `ports` matches `port`, naming where the port
/// setting came from when it does not.
pub fn validate_device(port: &str, source: &PortSource, ports: &[String]) -> Result<(), String> {
    if ports.iter().any(|name| port_matches(name, port)) {
        return Ok(());
    }

    let mut error_msg = format!(
        "Error: no MIDI output port matches '{}' (set by {})\n",
        port, source
    );
    if ports.is_empty() {
        error_msg.push_str("No MIDI output ports are available.\n");
    } else {
        error_msg.push_str("Available MIDI output ports:\n");
        for name in ports {
            error_msg.push_str(&format!("  - {}\n", name));
        }
    }
    error_msg.push_str(
        "Choose a port with --output, LUMISYNC_OUTPUT_PORT or output_port in the config file.\n",
    );
    Err(error_msg)
}
