/*
This code is part of the HydroStreamer river routing tools.
Authors: HydroStreamer developers
Created: 16/10/2026
Last Modified: 16/10/2026
License: MIT
*/

use hydrostreamer_common::configs::get_configs;
use hydrostreamer_common::utils::{get_formatted_elapsed_time, print_welcome};
use hydrostreamer_routing::{read_network, upstream, write_network, RiverId, TopologyOptions};
use std::io::{Error, ErrorKind};
use std::time::Instant;
use std::{env, path};

/// This tool extracts the part of a river network that drains through one
/// segment (`--id`): the segment itself and every segment upstream of it.
/// Within the output the selected segment is the only outlet. The input
/// (`--input`) and output (`--output`) are JSON segment collections; input
/// without `NEXT` links has its topology derived from line geometry using
/// the snap distance (`--snap`).
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

    let exe_name = &format!("upstream_network{}", ext);
    let sep: String = path::MAIN_SEPARATOR.to_string();
    let s = r#"
    upstream_network Help

    This tool extracts the river network upstream of a segment.

    The following commands are recognized:
    help       Prints help information.
    run        Runs the tool.
    version    Prints the tool version information.

    The following flags can be used with the 'run' command:
    -i, --input        Name of the input segment collection (JSON).
    --id               riverID of the segment draining the extracted network.
    -o, --output       Name of the output segment collection (JSON).
    --snap             Snap distance used to join line ends, in xy units.

    Input/output file names can be fully qualified, or can rely on the
    working directory contained in the settings.json file.

    Example Usage:
    >> .*EXE_NAME run --input=rivers.json --id=1034 -o=basin.json
    "#
    .replace("*", &sep)
    .replace("EXE_NAME", exe_name);
    println!("{}", s);
}

fn version() {
    const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");
    println!(
        "upstream_network v{} by the HydroStreamer developers.",
        VERSION.unwrap_or("Unknown version")
    );
}

fn get_tool_name() -> String {
    String::from("UpstreamNetwork") // This should be camel case and is a reference to the tool name.
}

fn run(args: &Vec<String>) -> Result<(), Error> {
    let tool_name = get_tool_name();

    // Read in the environment variables and get the necessary values
    let configurations = get_configs()?;

    let mut input_file = String::new();
    let mut output_file = String::new();
    let mut river_id = String::new();
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
        } else if flag_val == "-id" {
            river_id = value;
        } else if flag_val == "-snap" {
            snap_distance = Some(value.trim().parse::<f64>().map_err(|_| {
                Error::new(
                    ErrorKind::InvalidInput,
                    format!("Error parsing {} value '{}'", flag_val, value),
                )
            })?);
        }
    }

    if input_file.is_empty() || output_file.is_empty() || river_id.is_empty() {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "An input (--input), an output (-o) and a segment (--id) must be specified.",
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

    let basin = upstream(&network, &RiverId::new(river_id.trim()))?;
    if configurations.verbose_mode {
        println!(
            "{} of {} segments drain through {}",
            basin.len(),
            network.len(),
            river_id
        );
        println!("Saving data...")
    };
    write_network(&basin, &output_file)?;

    let elapsed_time = get_formatted_elapsed_time(start);
    if configurations.verbose_mode {
        println!("Output file written: {}", output_file.display());
        println!("{}", &format!("Elapsed Time (including I/O): {}", elapsed_time));
    }

    Ok(())
}
