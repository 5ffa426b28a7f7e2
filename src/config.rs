// config.rs

use crate::cli::Args;
use config::{Config, ConfigError, Environment, File};
use log::{debug, info};
use std::fmt;
use std::path::PathBuf;

/// Prefix of environment overrides, e.g. `LUMISYNC_OUTPUT_PORT` or
/// `LUMISYNC_DEVICE__MODEL_NAME`
pub const ENV_PREFIX: &str = "LUMISYNC";

/// Output port substring used when nothing else is configured
pub const DEFAULT_OUTPUT_PORT: &str = "LUMI";

const OUTPUT_PORT_VAR: &str = "LUMISYNC_OUTPUT_PORT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    Input,
    Output,
}

/// What the host may use a port for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortCapabilities {
    pub notes_cc: bool,
    pub script: bool,
    pub remote: bool,
    pub sync: bool,
}

impl PortCapabilities {
    pub const NONE: PortCapabilities = PortCapabilities {
        notes_cc: false,
        script: false,
        remote: false,
        sync: false,
    };

    pub const ALL: PortCapabilities = PortCapabilities {
        notes_cc: true,
        script: true,
        remote: true,
        sync: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortSpec {
    pub direction: PortDirection,
    pub capabilities: PortCapabilities,
}

impl PortSpec {
    const fn new(direction: PortDirection, capabilities: PortCapabilities) -> Self {
        PortSpec {
            direction,
            capabilities,
        }
    }
}

/// The keyboard exposes two endpoint pairs; only the first carries
/// notes, script, remote and sync traffic.
pub const LUMI_PORTS: [PortSpec; 4] = [
    PortSpec::new(PortDirection::Input, PortCapabilities::ALL),
    PortSpec::new(PortDirection::Input, PortCapabilities::NONE),
    PortSpec::new(PortDirection::Output, PortCapabilities::ALL),
    PortSpec::new(PortDirection::Output, PortCapabilities::NONE),
];

/// Identification metadata for the keyboard. Carried for port setup and
/// logging only; the sync engine never looks at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceProfile {
    pub vendor_id: u16,
    pub product_id: u16,
    pub model_name: String,
    pub device_type: String,
    pub auto_load: bool,
    pub ports: Vec<PortSpec>,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        DeviceProfile {
            vendor_id: 0x2AF4,
            product_id: 0x0F00,
            model_name: "LUMI Keys".to_string(),
            device_type: "controller".to_string(),
            auto_load: false,
            ports: LUMI_PORTS.to_vec(),
        }
    }
}

impl DeviceProfile {
    /// Ports the host may send scripted output to
    pub fn script_outputs(&self) -> impl Iterator<Item = &PortSpec> {
        self.ports
            .iter()
            .filter(|p| p.direction == PortDirection::Output && p.capabilities.script)
    }
}

/// Where the output port name came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSource {
    Default,
    ConfigFile(PathBuf),
    Environment,
    CommandLine,
}

impl fmt::Display for PortSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortSource::Default => write!(f, "built-in default"),
            PortSource::ConfigFile(path) => write!(f, "config file {}", path.display()),
            PortSource::Environment => write!(f, "environment variable {}", OUTPUT_PORT_VAR),
            PortSource::CommandLine => write!(f, "--output flag"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub output_port: String,
    pub output_port_source: PortSource,
    pub dry_run: bool,
    pub device: DeviceProfile,
}

impl Settings {
    /// Layer defaults, the optional settings file, `LUMISYNC_*` environment
    /// variables and finally command line flags.
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let env = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__");
        Self::load_with_env(args, Some(env))
    }

    fn load_with_env(args: &Args, env: Option<Environment>) -> Result<Self, ConfigError> {
        let profile = DeviceProfile::default();
        let port_from_env = env.is_some() && std::env::var_os(OUTPUT_PORT_VAR).is_some();

        let mut builder = Config::builder()
            .set_default("output_port", DEFAULT_OUTPUT_PORT)?
            .set_default("dry_run", false)?
            .set_default("device.vendor_id", i64::from(profile.vendor_id))?
            .set_default("device.product_id", i64::from(profile.product_id))?
            .set_default("device.model_name", profile.model_name)?
            .set_default("device.device_type", profile.device_type)?
            .set_default("device.auto_load", profile.auto_load)?;

        let mut port_from_file = false;
        if let Some(path) = &args.config {
            info!("Loading settings from {}", path.display());
            port_from_file = Config::builder()
                .add_source(File::from(path.as_path()))
                .build()?
                .get_string("output_port")
                .is_ok();
            builder = builder.add_source(File::from(path.as_path()));
        }
        if let Some(env) = env {
            builder = builder.add_source(env);
        }
        if let Some(port) = &args.output {
            builder = builder.set_override("output_port", port.as_str())?;
        }
        if args.dry_run {
            builder = builder.set_override("dry_run", true)?;
        }

        let output_port_source = match &args.config {
            _ if args.output.is_some() => PortSource::CommandLine,
            _ if port_from_env => PortSource::Environment,
            Some(path) if port_from_file => PortSource::ConfigFile(path.clone()),
            _ => PortSource::Default,
        };

        let config = builder.build()?;
        let settings = Settings {
            output_port: config.get_string("output_port")?,
            output_port_source,
            dry_run: config.get_bool("dry_run")?,
            device: DeviceProfile {
                vendor_id: get_u16(&config, "device.vendor_id")?,
                product_id: get_u16(&config, "device.product_id")?,
                model_name: config.get_string("device.model_name")?,
                device_type: config.get_string("device.device_type")?,
                auto_load: config.get_bool("device.auto_load")?,
                ports: profile.ports,
            },
        };

        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }
}

fn get_u16(config: &Config, key: &str) -> Result<u16, ConfigError> {
    let value = config.get_int(key)?;
    u16::try_from(value)
        .map_err(|_| ConfigError::Message(format!("{} out of range: {}", key, value)))
}
