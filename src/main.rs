use clap::Parser;
use lumisyncrs::{
    cli::{validate_device, Args},
    config::Settings,
    handle_device_list, logging, ConsoleHost, DryRunSink, EventLoop, FrameSink,
    MidiOutputManager, SyncEngine,
};
use std::io::{self, BufReader};
use std::process;

fn main() {
    initialize_logging();
    let args = Args::parse();

    if args.device_list {
        list_available_devices(&handle_device_list());
        return;
    }

    let settings = match Settings::load(&args) {
        Ok(settings) => settings,
        Err(e) => fail(&format!("Error loading settings: {}", e)),
    };
    log::info!(
        "Target {}: {} (vendor 0x{:04X}, product 0x{:04X}, {} scripted output port(s))",
        settings.device.device_type,
        settings.device.model_name,
        settings.device.vendor_id,
        settings.device.product_id,
        settings.device.script_outputs().count()
    );
    log::info!(
        "Output port '{}' from {}",
        settings.output_port,
        settings.output_port_source
    );

    let sink = create_sink(&settings);
    run_sync(sink);
}

fn initialize_logging() {
    match logging::init_logger() {
        Ok(path) => log::info!("Application starting, logging to {}", path.display()),
        Err(e) => {
            let _ = env_logger::try_init();
            log::warn!("File logging unavailable ({}), logging to stderr", e);
            log::info!("Application starting");
        }
    }
}

fn list_available_devices(devices: &[String]) {
    println!("Available MIDI output devices:");
    for device in devices {
        println!("  - {}", device);
    }
}

fn create_sink(settings: &Settings) -> Box<dyn FrameSink> {
    if settings.dry_run {
        log::info!("Dry run: frames will be printed, not sent");
        return Box::new(DryRunSink);
    }

    let ports = handle_device_list();
    if let Err(error_msg) =
        validate_device(&settings.output_port, &settings.output_port_source, &ports)
    {
        fail(&error_msg);
    }

    let mut output = MidiOutputManager::new();
    match output.connect_to_device(&settings.output_port) {
        Ok(()) => {
            log::info!("Connected to MIDI output: {}", settings.output_port);
            println!("Connected to MIDI output: {}", settings.output_port);
            Box::new(output)
        }
        Err(e) => fail(&format!("Error connecting to MIDI device: {}", e)),
    }
}

fn run_sync(sink: Box<dyn FrameSink>) {
    let host = ConsoleHost::new();
    let mut event_loop = EventLoop::new(host.clone(), SyncEngine::new(sink));
    host.spawn_reader(BufReader::new(io::stdin()), event_loop.control());

    println!("Enter host changes (root, scale, device, track, none, resync, quit):");
    event_loop.run();
    log::info!("Application stopped");
}

fn fail(error_msg: &str) -> ! {
    log::error!("{}", error_msg);
    eprintln!("{}", error_msg);
    process::exit(1);
}
