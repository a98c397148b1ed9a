/*
This code is part of the HydroStreamer river routing tools.
Authors: HydroStreamer developers
Created: 16/10/2026
Last Modified: 16/10/2026
License: MIT
*/

use hydrostreamer_common::configs::get_configs;
use hydrostreamer_common::utils::{get_formatted_elapsed_time, print_welcome, Progress};
use hydrostreamer_routing::metrics::network_metrics;
use hydrostreamer_routing::{read_network, TopologyOptions};
use std::fs::File;
use std::io::{BufWriter, Error, ErrorKind, Write};
use std::time::Instant;
use std::{env, path};

/// This tool calculates common stream network indices for each segment of a
/// river network (`--input`) and writes them as a JSON array (`--output`).
///
/// | Index Name | Description |
/// | :- | :- |
/// | OUTLET | riverID of the outlet segment, used as basin identifier |
/// | TRIB_ID | Unique tributary identifying value |
/// | DIST2MOUTH | Distance to outlet (i.e., mouth node) |
/// | DS_NODES | Number of downstream segments |
/// | TUCL | Total upstream channel length |
/// | MAXUPSDIST | Maximum upstream distance |
/// | HORTON | Horton stream order |
/// | STRAHLER | Strahler stream order |
/// | SHREVE | Shreve stream magnitude |
/// | HACK | Hack stream order |
/// | MAINSTREAM | Whether the segment is the main stream trunk of its basin |
/// | IS_OUTLET | Whether the segment is an outlet |
///
/// Input without `NEXT` links has its topology derived from line geometry
/// using the snap distance (`--snap`). Every segment needs a reach length,
/// either its line geometry or an explicit `length`.
fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    if args.len() <= 1 || args[1].trim() == "help" {
        // print help
        help();
        return;
    }

    if args[1].trim() == "run" {
        if let Err(e) = run(&args) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    if args[1].trim() == "version" {
        // print version information
        version();
    }
}

fn help() {
    let mut ext = "";
    if cfg!(target_os = "windows") {
        ext = ".exe";
    }

    let exe_name = &format!("river_network_analysis{}", ext);
    let sep: String = path::MAIN_SEPARATOR.to_string();
    let s = r#"
    river_network_analysis Help

    This tool calculates stream orders and flow distances of a river network.

    The following commands are recognized:
    help       Prints help information.
    run        Runs the tool.
    version    Prints the tool version information.

    The following flags can be used with the 'run' command:
    -i, --input        Name of the input segment collection (JSON).
    -o, --output       Name of the output metrics file (JSON).
    --snap             Snap distance used to join line ends, in xy units.

    Input/output file names can be fully qualified, or can rely on the
    working directory contained in the settings.json file.

    Example Usage:
    >> .*EXE_NAME run --input=rivers.json -o=network_analysis.json --snap=1.0
    "#
    .replace("*", &sep)
    .replace("EXE_NAME", exe_name);
    println!("{}", s);
}

fn version() {
    const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");
    println!(
        "river_network_analysis v{} by the HydroStreamer developers.",
        VERSION.unwrap_or("Unknown version")
    );
}

fn get_tool_name() -> String {
    String::from("RiverNetworkAnalysis") // This should be camel case and is a reference to the tool name.
}

fn run(args: &Vec<String>) -> Result<(), Error> {
    let tool_name = get_tool_name();

    // Read in the environment variables and get the necessary values
    let configurations = get_configs()?;

    let mut input_file = String::new();
    let mut output_file = String::new();
    let mut snap_distance: Option<f64> = None;

    // read the arguments
    if args.len() <= 2 {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "Tool run with no parameters.",
        ));
    }
    for i in 0..args.len() {
        let arg = args[i].replace("\"", "").replace("\'", "");
        let vec = arg.split("=").collect::<Vec<&str>>(); // in case an equals sign was used
        let keyval = vec.len() > 1;
        let flag_val = vec[0].to_lowercase().replace("--", "-");
        let value = if keyval {
            vec[1].to_string()
        } else {
            args.get(i + 1).cloned().unwrap_or_default()
        };
        if flag_val == "-i" || flag_val == "-input" {
            input_file = value;
        } else if flag_val == "-o" || flag_val == "-output" {
            output_file = value;
        } else if flag_val == "-snap" {
            snap_distance = Some(value.trim().parse::<f64>().map_err(|_| {
                Error::new(
                    ErrorKind::InvalidInput,
                    format!("Error parsing {} value '{}'", flag_val, value),
                )
            })?);
        }
    }

    if input_file.is_empty() || output_file.is_empty() {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "Both an input (--input) and an output (-o) file must be specified.",
        ));
    }

    if configurations.verbose_mode {
        print_welcome(&tool_name);
    }

    let start = Instant::now();

    let input_file = configurations.resolve_path(&input_file);
    let output_file = configurations.resolve_path(&output_file);

    if configurations.verbose_mode {
        println!("Reading data...")
    };
    let mut network = read_network(&input_file)?;
    if !network.has_topology() {
        let options = match snap_distance {
            Some(d) => TopologyOptions::with_snap_distance(d),
            None => TopologyOptions::default(),
        };
        network = network.build_topology(&options)?;
    }

    let metrics = network_metrics(&network)?;
    if configurations.verbose_mode {
        let num_outlets = metrics.iter().filter(|m| m.is_outlet).count();
        let max_order = metrics.iter().map(|m| m.strahler).max().unwrap_or(0);
        println!(
            "{} segments, {} outlets, highest Strahler order {}",
            metrics.len(),
            num_outlets,
            max_order
        );
    }

    // one record per line
    let f = File::create(&output_file)?;
    let mut writer = BufWriter::new(f);
    let mut progress = Progress::new(metrics.len());
    writeln!(writer, "[")?;
    for (i, m) in metrics.iter().enumerate() {
        let record = serde_json::to_string(m).map_err(|e| Error::new(ErrorKind::InvalidData, e))?;
        let sep = if i + 1 < metrics.len() { "," } else { "" };
        writeln!(writer, "  {}{}", record, sep)?;
        if configurations.verbose_mode {
            if let Some(p) = progress.update(i + 1) {
                println!("Saving data: {}%", p);
            }
        }
    }
    writeln!(writer, "]")?;
    writer.flush()?;

    let elapsed_time = get_formatted_elapsed_time(start);
    if configurations.verbose_mode {
        println!("Output file written: {}", output_file.display());
        println!("{}", &format!("Elapsed Time (including I/O): {}", elapsed_time));
    }

    Ok(())
}
