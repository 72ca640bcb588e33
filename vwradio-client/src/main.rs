//! vwradio-ctl: command line front end for the vwradio test rig.

use std::error::Error;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand, ValueEnum};
use clap_num::maybe_hex;
use log::{error, info};

use vwradio_client::{load_config, logging, Connection, Transport};
use vwradio_protocol::{
    DisplayMode, Key, Led, Opcode, OperationMode, Pictograph, RadioState, RamArea, RunMode,
    TunerBand, UpdState,
};

/// vwradio-ctl - Drive the vwradio AVR test rig over serial
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Serial port of the rig
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// Reply inactivity timeout in milliseconds
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    /// Configuration file path
    #[arg(short = 'f', long)]
    config: Option<PathBuf>,

    /// Directory where log files are stored
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Echo hex bytes through the rig
    Echo { data: HexBytes },
    /// Switch a status LED
    Led { led: LedArg, state: Switch },
    /// Select the rig run mode
    RunMode { mode: RunModeArg },
    /// Dump a uPD16432B state
    UpdDump {
        /// Dump the real faceplate instead of the emulator
        #[arg(long)]
        faceplate: bool,
    },
    /// Reset the emulated uPD16432B
    UpdReset,
    /// Forward one SPI transfer (hex) to a uPD16432B
    UpdSend {
        /// Send to the real faceplate instead of the emulator
        #[arg(long)]
        faceplate: bool,
        spi: HexBytes,
    },
    /// Dump the head unit state decoder
    RadioDump,
    /// Reset the head unit state decoder
    RadioReset,
    /// Feed 11 characters of VFD text to the head unit decoder
    RadioProcess { text: String },
    /// Load raw key matrix data (hex)
    RadioKeys { keys: HexBytes },
    /// Blank the faceplate display
    FaceplateClear,
    /// Look up the symbolic name of a code
    Lookup {
        table: Table,
        /// Decimal or 0x-prefixed hex
        #[arg(value_parser = maybe_hex::<u8>)]
        code: u8,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LedArg {
    Green,
    Red,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Switch {
    On,
    Off,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum RunModeArg {
    Normal,
    Test,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Table {
    Opcode,
    OperationMode,
    DisplayMode,
    TunerBand,
    Key,
    Pictograph,
    RamArea,
}

/// Bytes given as hex, e.g. `40`, `80 01 02` or `0x80,0x01`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HexBytes(Vec<u8>);

impl FromStr for HexBytes {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut out = Vec::new();
        for token in s.split(|c: char| c.is_whitespace() || c == ',' || c == ':') {
            let token = token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token);
            if token.is_empty() {
                continue;
            }
            let bytes = hex::decode(token).map_err(|e| format!("invalid hex {:?}: {}", token, e))?;
            out.extend_from_slice(&bytes);
        }
        Ok(HexBytes(out))
    }
}

fn lookup(table: Table, code: u8) -> Option<&'static str> {
    match table {
        Table::Opcode => Opcode::try_from(code).ok().map(Opcode::name),
        Table::OperationMode => OperationMode::lookup_name(code),
        Table::DisplayMode => DisplayMode::lookup_name(code),
        Table::TunerBand => TunerBand::lookup_name(code),
        Table::Key => Key::lookup_name(code),
        Table::Pictograph => Pictograph::lookup_name(code),
        Table::RamArea => RamArea::lookup_name(code),
    }
}

fn print_lookup(table: Table, code: u8) {
    match lookup(table, code) {
        Some(name) => println!("{}", name),
        None => println!("unknown code {} (0x{:02X})", code, code),
    }
}

fn hex_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| hex::encode_upper([*b]))
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_upd_state(state: &UpdState) {
    println!("ram_area:  {} (0x{:02X})", state.ram_area, state.ram_area.code());
    println!("ram_size:  {}", state.ram_size);
    println!("address:   0x{:02X}", state.address);
    println!("increment: {}", state.increment);
    for area in [RamArea::DisplayData, RamArea::Pictograph, RamArea::Chargen] {
        let dirty = if state.is_dirty(area) { " (dirty)" } else { "" };
        println!("{}{}:", area, dirty);
        for (row, chunk) in state.ram(area).chunks(16).enumerate() {
            println!("  {:02X}: {}", row * 16, hex_string(chunk));
        }
    }
}

fn print_radio_state(state: &RadioState) {
    println!("operation_mode: {}", state.operation_mode);
    println!("display_mode:   {}", state.display_mode);
    println!("safe_tries:     {}", state.safe_tries);
    println!("safe_code:      {}", state.safe_code);
    println!(
        "sound:          bass={} treble={} mid={} bal={} fade={}",
        state.sound_bass, state.sound_treble, state.sound_midrange, state.sound_balance, state.sound_fade
    );
    println!("tape_side:      {}", state.tape_side);
    println!(
        "cd:             disc={} track={} cue_pos={}",
        state.cd_disc, state.cd_track, state.cd_cue_pos
    );
    println!(
        "tuner:          band={} freq={} preset={}",
        state.tuner_band, state.tuner_freq, state.tuner_preset
    );
    println!("display:        {:?}", state.display_text());
}

fn run<T: Transport>(conn: &mut Connection<T>, cmd: Cmd) -> Result<(), Box<dyn Error>> {
    match cmd {
        Cmd::Echo { data } => {
            let reply = conn.echo(&data.0)?;
            println!("{}", hex_string(&reply));
        }
        Cmd::Led { led, state } => {
            let led = match led {
                LedArg::Green => Led::Green,
                LedArg::Red => Led::Red,
            };
            conn.set_led(led, matches!(state, Switch::On))?;
        }
        Cmd::RunMode { mode } => {
            let mode = match mode {
                RunModeArg::Normal => RunMode::Normal,
                RunModeArg::Test => RunMode::Test,
            };
            conn.set_run_mode(mode)?;
        }
        Cmd::UpdDump { faceplate } => {
            let state = if faceplate {
                conn.faceplate_upd_dump_state()?
            } else {
                conn.emulated_upd_dump_state()?
            };
            print_upd_state(&state);
        }
        Cmd::UpdReset => conn.emulated_upd_reset()?,
        Cmd::UpdSend { faceplate, spi } => {
            if faceplate {
                conn.faceplate_upd_send_command(&spi.0)?;
            } else {
                conn.emulated_upd_send_command(&spi.0)?;
            }
        }
        Cmd::RadioDump => print_radio_state(&conn.radio_state_dump()?),
        Cmd::RadioReset => conn.radio_state_reset()?,
        Cmd::RadioProcess { text } => conn.radio_state_process(text.as_bytes())?,
        Cmd::RadioKeys { keys } => conn.radio_load_key_data(&keys.0)?,
        Cmd::FaceplateClear => conn.faceplate_clear_display()?,
        Cmd::Lookup { table, code } => print_lookup(table, code),
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let settings = load_config(args.config.as_deref())?;
    let log_dir = args.log_dir.clone().or_else(|| settings.log_dir.clone());
    logging::init_logging(log_dir.as_deref(), args.verbose, settings.log_level.as_deref())?;

    // Lookups need no rig.
    if let Cmd::Lookup { table, code } = args.command {
        print_lookup(table, code);
        return Ok(());
    }

    // Command line takes precedence over file and environment.
    let mut config = settings.connection;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(baud) = args.baud {
        config.baud_rate = baud;
    }
    if let Some(ms) = args.timeout_ms {
        config.timeout = std::time::Duration::from_millis(ms);
    }

    let mut conn = Connection::open(&config)?;
    info!("Connected to {}", config.port);
    if let Err(e) = run(&mut conn, args.command) {
        error!("{}", e);
        return Err(e);
    }
    Ok(())
}
